use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const LOCAL_BASE_URL: &str = "http://localhost:5500";
pub const DEPLOYED_BASE_URL: &str = "https://nefrobd-web.onrender.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub session_path: PathBuf,
    pub download_dir: PathBuf,
}

impl ClientConfig {
    pub fn load() -> Self {
        Self {
            base_url: resolve_base_url(),
            timeout: Duration::from_millis(try_load("NEFRO_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            session_path: resolve_session_path(),
            download_dir: env::var("NEFRO_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Explicit `NEFRO_BASE_URL` wins; otherwise `NEFRO_ENV=local` picks the
/// development server and anything else the deployed host.
pub fn resolve_base_url() -> String {
    if let Ok(url) = env::var("NEFRO_BASE_URL") {
        return url.trim_end_matches('/').to_string();
    }

    match env::var("NEFRO_ENV").as_deref() {
        Ok("local") => LOCAL_BASE_URL.to_string(),
        _ => DEPLOYED_BASE_URL.to_string(),
    }
}

pub fn resolve_session_path() -> PathBuf {
    if let Ok(path) = env::var("NEFRO_SESSION_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/session.json")
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            base_url: DEPLOYED_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_path: PathBuf::from("data/session.json"),
            download_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let config = config().with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn timeout_override_replaces_default() {
        let config = config().with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
