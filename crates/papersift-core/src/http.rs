//! Blocking HTTP GET over a shared async client.
//!
//! Uses async reqwest internally with tokio::time::timeout for request
//! deadlines, but presents a sync interface so the pipeline stays
//! single-threaded outside of the network layer.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Global HTTP settings, set once at startup (config file + CLI overrides).
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Deadline for a whole request (send + body)
    pub timeout: Duration,
    /// Retry attempts after the first failure
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the global HTTP settings. Only the first call takes effect.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring {config:?}");
    }
}

/// Current HTTP settings (defaults if never set).
pub fn http_config() -> HttpConfig {
    *HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Error types for HTTP fetches
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Request exceeded the configured deadline
    Timeout(Duration),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Timeout(d) => write!(f, "request timed out after {}s", d.as_secs()),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            // Client errors won't change on retry; 429 and 5xx might
            Self::Http { status, .. } => !matches!(status, Some(400 | 401 | 403 | 404)),
            Self::Timeout(_) => true,
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("papersift/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET `url` with query parameters, returning the body as text.
///
/// Non-2xx responses become [`FetchError::Http`] with the status set.
pub fn get_text(url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
    let timeout = http_config().timeout;

    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            SHARED_CLIENT
                .get(url)
                .query(query)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| FetchError::from_reqwest(&e))?
                .text()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    })
}
