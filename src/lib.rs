pub mod cli;
pub mod config;
pub mod error;
pub mod guestbook;
pub mod models;
pub mod render;
pub mod routes;
pub mod store;

pub const STATIC_HASH: &str = env!("STATIC_HASH");

use std::sync::Arc;

use axum::{routing::get, Router};
use axum::http::{header, HeaderValue};
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::guestbook::Guestbook;
use crate::store::EntryStore;

#[derive(Clone)]
pub struct AppState {
    pub guestbook: Arc<Guestbook>,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router around the given entry store.
pub fn build_app(store: Arc<dyn EntryStore>) -> Router {
    let state = AppState {
        guestbook: Arc::new(Guestbook::new(store)),
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::entries::router())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ))
                .service(ServeDir::new("static")),
        )
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
