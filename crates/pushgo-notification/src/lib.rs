#![forbid(unsafe_code)]

pub mod aps;
pub mod config;
pub mod headers;
pub mod notification;

mod error;

pub use error::Error;
pub use notification::Notification;
