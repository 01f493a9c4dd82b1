//! Papersift Core - Common infrastructure for the papersift pipeline
//!
//! HTTP plumbing (shared client + runtime behind a blocking interface),
//! retry with backoff, logging and progress reporting.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;

// Re-exports for convenience
pub use http::{FetchError, HttpConfig, SHARED_RUNTIME, get_text, http_config, set_http_config};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{backoff_duration, retry_with_backoff};
