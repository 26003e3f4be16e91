use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_STORAGE_KEY: &str = "cardbase.preferences";
pub const DEFAULT_SESSION_KEY: &str = "cardbase.search";
pub const DEFAULT_DATA_DIR: &str = ".cardbase";
pub const DEFAULT_VALIDATION_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Client-side settings shared by the store, the HTTP adapter and the deck
/// validation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Key of the durable snapshot.
    pub storage_key: String,
    /// Key of the session-lifetime search blob.
    pub session_key: String,
    pub data_dir: PathBuf,
    pub validation_debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            validation_debounce: Duration::from_millis(DEFAULT_VALIDATION_DEBOUNCE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read `CARDBASE_*` variables, falling back to defaults for anything
    /// missing or unparsable.
    pub fn from_env() -> Self {
        Self {
            api_url: try_load("CARDBASE_API_URL", DEFAULT_API_URL.to_string()),
            storage_key: try_load("CARDBASE_STORAGE_KEY", DEFAULT_STORAGE_KEY.to_string()),
            session_key: try_load("CARDBASE_SESSION_KEY", DEFAULT_SESSION_KEY.to_string()),
            data_dir: PathBuf::from(try_load(
                "CARDBASE_DATA_DIR",
                DEFAULT_DATA_DIR.to_string(),
            )),
            validation_debounce: Duration::from_millis(try_load(
                "CARDBASE_VALIDATION_DEBOUNCE_MS",
                DEFAULT_VALIDATION_DEBOUNCE_MS,
            )),
            request_timeout: Duration::from_secs(try_load(
                "CARDBASE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_validation_debounce(mut self, window: Duration) -> Self {
        self.validation_debounce = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `api_url` joined with `path`, without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
