use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Request size limit for every route.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Lead API routes, without state or middleware.
///
/// `main` layers rate limiting on top; tests drive it directly.
pub fn lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/leads", post(handlers::create_lead).get(handlers::list_leads))
        .route(
            "/leads/:id",
            get(handlers::get_lead).delete(handlers::delete_lead),
        )
        .route("/leads/:id/interactions", get(handlers::list_interactions))
        .route("/leads/:id/score", post(handlers::rescore_lead))
        .route("/leads/:id/message", post(handlers::generate_message))
        .route("/add_interaction/:id", post(handlers::add_interaction))
}

/// Full application without rate limiting.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(lead_routes())
        .with_state(state)
}
