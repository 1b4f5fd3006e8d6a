use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::checkins::load_checkins_between;
use crate::handlers::resolve_today;
use crate::services::calendar::{month_bounds, month_grid, MonthGrid};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub today: Option<NaiveDate>,
}

/// Month view; defaults to the month containing today.
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<MonthGrid>> {
    let today = resolve_today(query.today)?;
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let (first, last) = month_bounds(year, month).map_err(AppError::Validation)?;
    let checkins = load_checkins_between(&state.db, auth_user.id, first, last).await?;

    let grid = month_grid(year, month, &checkins, today).map_err(AppError::Validation)?;
    Ok(Json(grid))
}
