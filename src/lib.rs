pub mod app;
pub mod config;
pub mod http;
pub mod notify;
pub mod retailer;
pub mod retry;
