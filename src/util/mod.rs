//! Utility modules for bunpack

pub mod logging;

pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
