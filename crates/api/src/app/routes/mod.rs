use axum::{Router, routing::get};

pub mod inventory;
pub mod system;

/// Router for all admin endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(system::healthz))
        .nest("/inventory", inventory::router())
}
