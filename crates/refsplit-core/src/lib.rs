pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, OutputFormat, SplitConfig};
pub use error::{ExitCode, RefsplitError, Result};
pub use models::*;
