pub mod config;
pub mod error;
pub mod types;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use types::*;
