//! HTTP surface: routes, handlers and application state.
//!
//! One route per dictionary plus a JSON lookup API. The handlers own the
//! boundary concerns the core stays out of: the absent-`word` form page,
//! HTML escaping of echoed input, link rewriting inside stored articles
//! and the per-client request quota.

pub mod html;
pub mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::dictionary::Dictionary;
use crate::core::resolve::{ResolveError, Resolved, TermResolver};
use rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TermResolver>,
    pub limiter: Arc<RateLimiter>,
    /// Dictionaries with an opened database; the rest 404.
    pub dictionaries: Arc<Vec<Dictionary>>,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub word: Option<String>,
}

/// Outcome of one page lookup, ready to be wrapped in a response.
pub enum Page {
    Form,
    Definitions(Resolved),
    NotFound(String),
    StorageFailure,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/:dictionary", get(lookup_html))
        .route("/api/:dictionary", get(lookup_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the lookup for one request. Shared by the HTML and JSON handlers;
/// separated from response building so it is testable without a socket.
pub async fn lookup_page(state: &AppState, dict: Dictionary, word: Option<&str>) -> Page {
    // An absent `word` means "show the empty form", not an error.
    let Some(word) = word else {
        return Page::Form;
    };
    match state.resolver.resolve(dict, word).await {
        Ok(resolved) => Page::Definitions(resolved),
        Err(err @ (ResolveError::NotFound { .. } | ResolveError::InputTooLong { .. })) => {
            info!(dictionary = %dict, error = %err, "Word not found");
            Page::NotFound(word.to_string())
        }
        Err(ResolveError::Storage(err)) => {
            error!(dictionary = %dict, error = %err, "Storage failure during lookup");
            Page::StorageFailure
        }
    }
}

fn dictionary_for(state: &AppState, slug: &str) -> Option<Dictionary> {
    Dictionary::from_slug(slug).filter(|d| state.dictionaries.contains(d))
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(html::render_index(&state.dictionaries))
}

async fn lookup_html(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(slug): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(dict) = dictionary_for(&state, &slug) else {
        return (
            StatusCode::NOT_FOUND,
            Html(html::render_message("Unknown dictionary")),
        )
            .into_response();
    };
    if !state.limiter.check(addr.ip()) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Html(html::render_message("Too many requests")),
        )
            .into_response();
    }

    match lookup_page(&state, dict, params.word.as_deref()).await {
        Page::Form => Html(html::render_form(dict)).into_response(),
        Page::Definitions(resolved) => {
            let route = format!("/{}", dict.slug());
            let entries: Vec<String> = resolved
                .definitions
                .iter()
                .map(|d| html::strip_stylesheet_tags(&html::rewrite_links(&d.body, &route)))
                .collect();
            Html(html::render_definitions(dict, &resolved.term, &entries)).into_response()
        }
        Page::NotFound(word) => Html(html::render_not_found(dict, &word)).into_response(),
        Page::StorageFailure => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(html::render_message("Internal error")),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
struct LookupResponse {
    word: String,
    resolved: String,
    definitions: Vec<String>,
}

async fn lookup_json(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(slug): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(dict) = dictionary_for(&state, &slug) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "unknown dictionary"})),
        )
            .into_response();
    };
    if !state.limiter.check(addr.ip()) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({"error": "too many requests"})),
        )
            .into_response();
    }
    let Some(word) = params.word else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "missing 'word' parameter"})),
        )
            .into_response();
    };

    match lookup_page(&state, dict, Some(&word)).await {
        Page::Definitions(resolved) => Json(LookupResponse {
            word,
            resolved: resolved.term,
            definitions: resolved
                .definitions
                .into_iter()
                .map(|d| d.body)
                .collect(),
        })
        .into_response(),
        Page::NotFound(word) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "word not found", "word": word})),
        )
            .into_response(),
        Page::StorageFailure => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "internal error"})),
        )
            .into_response(),
        // Unreachable: `word` was supplied above.
        Page::Form => StatusCode::BAD_REQUEST.into_response(),
    }
}
