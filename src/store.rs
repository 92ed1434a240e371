//! Entry Store Client
//!
//! Talks to the guestbook backend's `/api/entries` endpoints. Nothing is
//! cached; every call goes over the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::models::{Entry, NewEntry};

/// Shown when a rejected write carries no usable `error` message.
pub const SUBMIT_FAILED: &str = "Failed to post";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend responded with {0}")]
    Status(StatusCode),
    #[error("backend rejected entry ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Entries in the order the backend returns them.
    async fn fetch_entries(&self) -> Result<Vec<Entry>, StoreError>;

    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpEntryStore {
    client: Client,
    entries_url: Url,
}

impl HttpEntryStore {
    pub fn new(entries_url: Url, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, entries_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(config.entries_url()?, config.request_timeout)
    }

    pub fn entries_url(&self) -> &Url {
        &self.entries_url
    }
}

#[async_trait]
impl EntryStore for HttpEntryStore {
    async fn fetch_entries(&self) -> Result<Vec<Entry>, StoreError> {
        tracing::debug!(url = %self.entries_url, "fetching entries");

        let response = self.client.get(self.entries_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "backend refused entry list");
            return Err(StoreError::Status(status));
        }

        let entries: Vec<Entry> = response.json().await?;
        tracing::debug!(count = entries.len(), "fetched entries");
        Ok(entries)
    }

    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), StoreError> {
        tracing::debug!(url = %self.entries_url, "submitting entry");

        let response = self
            .client
            .post(self.entries_url.clone())
            .json(entry)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .error
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| SUBMIT_FAILED.to_string());

        tracing::warn!(%status, %message, "backend rejected entry");
        Err(StoreError::Rejected { status, message })
    }
}
