use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard/stats", get(handlers::stats))
        .route("/api/dashboard/monthly-revenue", get(handlers::monthly_revenue))
        .route(
            "/api/dashboard/monthly-registrations",
            get(handlers::monthly_registrations),
        )
        .route(
            "/api/dashboard/recent-activities",
            get(handlers::recent_activities),
        )
        .with_state(state)
}
