//! Retailer API: login and delivery schedule.

mod client;
mod types;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

pub use client::{BASE_URL, BarboraClient, DELIVERIES_PATH, LOGIN_PATH};
pub use types::{DeliverySchedule, DeliverySlot, ScheduleError, is_truthy};

/// Login credentials, fixed for the lifetime of a run.
///
/// The password never leaves the crate and is redacted from `Debug`.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Form body of the login request. "Remember me" is always off.
    pub(crate) fn login_form(&self) -> [(&str, &str); 3] {
        [
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("rememberMe", "false"),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// Operations the run needs from the retailer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Retailer: Send + Sync {
    /// Logs in; the session keeps whatever cookies the server hands out.
    async fn login(&self) -> Result<()>;

    /// Fetches and parses the delivery schedule of the logged-in account.
    async fn delivery_schedule(&self) -> Result<DeliverySchedule>;
}
