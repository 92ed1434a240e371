use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::guestbook::{EntryForm, Guestbook, SubmitOutcome};
use crate::models::Entry;
use crate::render::EMPTY_PLACEHOLDER;
use crate::store::SUBMIT_FAILED;

#[derive(Debug, Parser)]
#[command(name = "guestbook", version, about = "Guestbook front-end for a JSON entries backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the web front-end (default)
    Serve,
    /// Print the current entries
    List,
    /// Post a new entry, then print the refreshed list
    Post {
        #[arg(long, default_value = "")]
        name: String,
        message: String,
    },
}

/// Plain-text rendering for the terminal; no markup, so nothing to escape.
pub fn format_entries(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return format!("{EMPTY_PLACEHOLDER}\n");
    }

    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{} · {}\n", entry.name, entry.created_at.to_local_string()));
        for line in entry.message.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}

pub async fn list_entries(guestbook: &Guestbook) -> Result<()> {
    let entries = guestbook.load().await?;
    print!("{}", format_entries(&entries));
    Ok(())
}

pub async fn post_entry(guestbook: &Guestbook, name: String, message: String) -> Result<()> {
    let form = EntryForm {
        name,
        message,
        token: None,
    };

    match guestbook.submit(&form).await {
        SubmitOutcome::Posted => list_entries(guestbook).await,
        outcome => bail!("{}", outcome.notice().unwrap_or(SUBMIT_FAILED)),
    }
}
