use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::models::{Entry, NewEntry};
use crate::store::{EntryStore, StoreError, SUBMIT_FAILED};

pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// How many successfully posted form tokens are remembered for duplicate detection.
const POSTED_TOKEN_HISTORY: usize = 1024;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// One-time token issued with the rendered form.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted,
    /// Failed client-side validation; the backend was not contacted.
    Invalid(String),
    Rejected(String),
    /// The form's token is already in flight or already posted.
    Duplicate,
}

impl SubmitOutcome {
    /// Text for the user-facing notification, if this outcome needs one.
    pub fn notice(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Invalid(msg) | SubmitOutcome::Rejected(msg) => Some(msg),
            SubmitOutcome::Posted | SubmitOutcome::Duplicate => None,
        }
    }
}

pub fn validate(form: &EntryForm) -> Result<NewEntry, String> {
    let message = form.message.trim();
    if message.is_empty() {
        return Err(EMPTY_MESSAGE.to_string());
    }
    Ok(NewEntry {
        name: form.name.trim().to_string(),
        message: message.to_string(),
    })
}

#[derive(Default)]
struct SubmitGuard {
    in_flight: HashSet<String>,
    posted: VecDeque<String>,
}

impl SubmitGuard {
    fn claim(&mut self, token: &str) -> bool {
        if self.in_flight.contains(token) || self.posted.iter().any(|t| t == token) {
            return false;
        }
        self.in_flight.insert(token.to_string());
        true
    }

    fn release(&mut self, token: &str, posted: bool) {
        self.in_flight.remove(token);
        if posted {
            if self.posted.len() == POSTED_TOKEN_HISTORY {
                self.posted.pop_front();
            }
            self.posted.push_back(token.to_string());
        }
    }
}

/// A claimed form token, released when dropped. Dropping also covers a
/// submit future cancelled mid-write, which counts as not posted.
struct Claim<'a> {
    guestbook: &'a Guestbook,
    token: &'a str,
    posted: bool,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.guestbook.lock_guard().release(self.token, self.posted);
    }
}

/// Ties the entry store to the load and submit flows. Constructed once at
/// startup and shared by every handler.
pub struct Guestbook {
    store: Arc<dyn EntryStore>,
    guard: Mutex<SubmitGuard>,
}

impl Guestbook {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            guard: Mutex::new(SubmitGuard::default()),
        }
    }

    /// Fresh entries from the backend.
    pub async fn load(&self) -> Result<Vec<Entry>, StoreError> {
        self.store.fetch_entries().await
    }

    pub async fn submit(&self, form: &EntryForm) -> SubmitOutcome {
        let entry = match validate(form) {
            Ok(entry) => entry,
            Err(notice) => {
                tracing::info!("rejected empty message");
                return SubmitOutcome::Invalid(notice);
            }
        };

        let mut claim = match form.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => match self.claim(token) {
                Some(claim) => Some(claim),
                None => {
                    tracing::info!(token, "ignored duplicate submission");
                    return SubmitOutcome::Duplicate;
                }
            },
            None => None,
        };

        let outcome = match self.store.submit_entry(&entry).await {
            Ok(()) => SubmitOutcome::Posted,
            Err(StoreError::Rejected { message, .. }) => SubmitOutcome::Rejected(message),
            Err(e) => {
                tracing::warn!("failed to submit entry: {e}");
                SubmitOutcome::Rejected(SUBMIT_FAILED.to_string())
            }
        };

        if let Some(claim) = claim.as_mut() {
            claim.posted = outcome == SubmitOutcome::Posted;
        }

        outcome
    }

    fn claim<'a>(&'a self, token: &'a str) -> Option<Claim<'a>> {
        if !self.lock_guard().claim(token) {
            return None;
        }
        Some(Claim {
            guestbook: self,
            token,
            posted: false,
        })
    }

    fn lock_guard(&self) -> std::sync::MutexGuard<'_, SubmitGuard> {
        // The guard only holds token sets, so a poisoned lock is still usable
        self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
