pub mod config;
pub mod core;
pub mod error;
pub mod notify;
pub mod planner;
pub mod reminder;
pub mod storage;

pub use error::{ConfigError, StorageError, StoreError};
pub use planner::Planner;

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether debug logging is active, shared between the logger filter and the config.
static DEBUG_LOGGING: AtomicBool = AtomicBool::new(false);

pub fn set_debug_logging(enabled: bool) {
    DEBUG_LOGGING.store(enabled, Ordering::Relaxed);
}

pub fn debug_logging() -> bool {
    DEBUG_LOGGING.load(Ordering::Relaxed)
}
