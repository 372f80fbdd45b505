use crate::errors::AppError;
use crate::metrics;
use crate::models::{ActivityEntry, MonthPoint, StatsResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn index() -> &'static str {
    "lms dashboard backend is running"
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = metrics::summary_stats(state.store.as_ref()).await?;
    Ok(Json(stats))
}

pub async fn monthly_revenue(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthPoint>>, AppError> {
    let points = metrics::monthly_revenue(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(points))
}

pub async fn monthly_registrations(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthPoint>>, AppError> {
    let points = metrics::monthly_registrations(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(points))
}

pub async fn recent_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityEntry>>, AppError> {
    let activities = metrics::recent_activity(state.store.as_ref()).await?;
    Ok(Json(activities))
}
