//! Logging setup and conditional logging macros.
//!
//! The embedding application calls [`init_logging`] once at startup; the
//! default level is Info and `RUST_LOG` overrides it. Chatty code paths
//! (cache hits, table invalidation) use the `log_*!` macros below, gated by
//! a module-level `ENABLE_LOGS` const so a noisy module can be silenced
//! without touching its call sites:
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::log_debug;
//!
//! log_debug!("query cache hit");
//! ```

/// Initialize env_logger. Reads `RUST_LOG`, defaults to Info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

/// Debug-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
