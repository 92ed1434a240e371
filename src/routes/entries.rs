use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};

use crate::error::AppError;
use crate::guestbook::{EntryForm, SubmitOutcome};
use crate::render::render_entries;
use crate::{AppState, STATIC_HASH};

const LOAD_FAILED: &str = "The guestbook is unavailable right now.";

enum ListState {
    /// Rendered list markup.
    Loaded(String),
    /// User-facing reason the list could not be loaded.
    Failed(&'static str),
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    entries: ListState,
    notice: Option<String>,
    name: String,
    message: String,
    token: String,

    static_hash: &'static str,
}

impl IndexTemplate {
    fn new(entries: ListState) -> Self {
        Self {
            entries,
            notice: None,
            name: String::new(),
            message: String::new(),
            token: uuid::Uuid::new_v4().to_string(),
            static_hash: STATIC_HASH,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create_entry))
        .route("/entries", get(entry_list))
}

async fn load_list(state: &AppState) -> Result<ListState, AppError> {
    match state.guestbook.load().await {
        Ok(entries) => Ok(ListState::Loaded(render_entries(&entries)?)),
        Err(e) => {
            tracing::warn!("failed to load entries: {e}");
            Ok(ListState::Failed(LOAD_FAILED))
        }
    }
}

async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let template = IndexTemplate::new(load_list(&state).await?);
    Ok(Html(template.render()?))
}

async fn create_entry(
    State(state): State<AppState>,
    Form(form): Form<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.guestbook.submit(&form).await;

    let Some(notice) = outcome.notice() else {
        return Ok(Redirect::to("/").into_response());
    };

    // Keep what the user typed so they can correct it
    let template = IndexTemplate {
        notice: Some(notice.to_string()),
        name: form.name,
        message: form.message,
        ..IndexTemplate::new(load_list(&state).await?)
    };
    Ok(Html(template.render()?).into_response())
}

async fn entry_list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.guestbook.load().await?;
    Ok(Html(render_entries(&entries)?))
}
