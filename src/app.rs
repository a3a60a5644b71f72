use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/today", get(handlers::get_today))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/checkin", post(handlers::check_in))
        .route("/api/events", get(handlers::events))
        .with_state(state)
}
