//! # Weave API
//!
//! The inbound HTTP surface of a connector service:
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /` | push delivery of a run-command from the bus |
//! | `POST /v1/actions/execute/` | direct trigger: `integration_id`, `action_id`, optional `config_overrides` |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::extract::Request;
use axum::routing::post;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::ExecuteRequest;
pub use state::AppState;

/// Build the router.
///
/// Connections are served on spawned tasks, so each request span is
/// parented explicitly on [`AppState::parent_span`].
pub fn router(state: AppState) -> Router {
    let parent = state.parent_span.clone();
    Router::new()
        .route("/", post(handlers::handle_delivery))
        .route("/v1/actions/execute/", post(handlers::execute_action))
        .layer(
            TraceLayer::new_for_http().make_span_with(move |request: &Request| {
                tracing::info_span!(
                    parent: &parent,
                    "request",
                    method = %request.method(),
                    uri = %request.uri()
                )
            }),
        )
        .with_state(state)
}
