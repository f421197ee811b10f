//! Persistent HTTP session with retry and status handling.

mod session;
mod status;

pub use session::{
    CONNECT_TIMEOUT, HttpResponse, HttpSession, READ_TIMEOUT, RequestOptions, SLOW_READ_TIMEOUT,
};
pub use status::StatusError;
