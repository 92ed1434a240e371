use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GUESTBOOK_API_URL is not a valid URL: {0}")]
    ApiUrl(#[from] url::ParseError),
    #[error("GUESTBOOK_ADDR is not a valid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("GUESTBOOK_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    Timeout(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the guestbook backend; `/api/entries` is resolved against it.
    pub api_url: Url,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("GUESTBOOK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let listen_addr = lookup("GUESTBOOK_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let request_timeout = match lookup("GUESTBOOK_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Timeout(raw)),
            },
        };

        Ok(Self {
            api_url: Url::parse(&api_url)?,
            listen_addr: listen_addr.parse()?,
            request_timeout,
        })
    }

    /// The list/create endpoint, keeping any path prefix on `api_url`.
    pub fn entries_url(&self) -> Result<Url, url::ParseError> {
        let mut base = self.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("api/entries")
    }
}
