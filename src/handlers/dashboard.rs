use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};

use crate::auth::middleware::AuthUser;
use crate::db::SortOrder;
use crate::dto::{DashboardQuery, DashboardResponse};
use crate::error::AppResult;
use crate::services::date_window::{find_monday, parse_date, DateWindow};
use crate::services::day_projector::project;
use crate::AppState;

/// One row per calendar day in the requested window. Defaults to the current
/// week; a lone `start_date` covers the seven days from there.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let start = match query.start_date.as_deref() {
        Some(raw) => parse_date(raw, "start_date")?,
        None => find_monday(Utc::now().date_naive()),
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => parse_date(raw, "end_date")?,
        None => start + Duration::days(6),
    };
    let window = DateWindow::new(start, end)?;

    let (from, to) = window.utc_bounds();
    let logs = state
        .store
        .activity_in_range(auth_user.id, from, to, None, SortOrder::Asc)
        .await?;

    tracing::debug!(
        user_id = %auth_user.id,
        start = %window.start,
        end = %window.end,
        entries = logs.len(),
        "Dashboard projected"
    );

    Ok(Json(DashboardResponse {
        chart_data: project(&logs, window),
    }))
}
