pub mod app;
pub mod config;
pub mod error;
pub mod status;
pub mod utils;

pub use error::{PayloadError, PollError, Result};
