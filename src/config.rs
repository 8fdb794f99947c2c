use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "PlateScan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// OCR.space parse endpoint used when none is configured.
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

const DATA_DIR_ENV: &str = "PLATESCAN_DATA_DIR";
const OCR_ENDPOINT_ENV: &str = "PLATESCAN_OCR_ENDPOINT";
const OCR_API_KEY_ENV: &str = "PLATESCAN_OCR_API_KEY";
const OCR_TIMEOUT_ENV: &str = "PLATESCAN_OCR_TIMEOUT_SECS";

/// Get the application data directory.
/// `PLATESCAN_DATA_DIR` wins; otherwise ~/PlateScan/ (or ./PlateScan when
/// no home directory can be determined).
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the saved-plates database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("plates.db")
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "platescan_lib=debug,platescan=debug,info"
    } else {
        "info"
    }
}

/// OCR provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub endpoint: String,
    /// Only required once an HTTP client is actually built.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
        }
    }
}

impl OcrConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs = match lookup(OCR_TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid OCR timeout, using default");
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            endpoint: lookup(OCR_ENDPOINT_ENV)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            api_key: lookup(OCR_API_KEY_ENV).filter(|k| !k.trim().is_empty()),
            timeout_secs,
        }
    }
}
