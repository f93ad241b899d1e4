//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, LOG_FORMAT, LogFormat};

/// Initialize logging filtered by `RUST_LOG` (default `info`), formatted per
/// `LOG_FORMAT` (`json` unless set to `pretty`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
