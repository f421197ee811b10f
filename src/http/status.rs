//! Non-2xx HTTP responses as a typed, non-retryable error.

use reqwest::{Method, StatusCode};

/// A request reached the server but came back with a non-success status.
///
/// Never retried: the request already succeeded at the transport level.
#[derive(Debug)]
pub struct StatusError {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
}

impl StatusError {
    pub fn new(method: Method, path: impl Into<String>, status: StatusCode) -> Self {
        Self {
            method,
            path: path.into(),
            status,
        }
    }

    /// A short hint for the user, when the status has an obvious cause.
    fn hint(&self) -> Option<&'static str> {
        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Some("check the --email and --password credentials")
            }
            StatusCode::TOO_MANY_REQUESTS => Some("too many requests, try again later"),
            s if s.is_server_error() => Some("the service is having trouble"),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} returned HTTP {}", self.method, self.path, self.status)?;
        if let Some(hint) = self.hint() {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}
