use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::handlers::checkins::{load_all_checkins, load_checkin_dates, load_checkins_between};
use crate::handlers::resolve_today;
use crate::services::streak::StreakSummary;
use crate::services::trends::{range_days, summarize, trend_series, Summary, TrendSeries};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StreakQuery {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// "7d", "14d", "30d", "90d". Default: "7d"
    pub range: Option<String>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub streak: StreakSummary,
    #[serde(flatten)]
    pub summary: Summary,
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StreakQuery>,
) -> AppResult<Json<StreakSummary>> {
    let today = resolve_today(query.today)?;
    let dates = load_checkin_dates(&state.db, auth_user.id).await?;

    Ok(Json(StreakSummary::from_dates(&dates, today)))
}

pub async fn get_trends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<TrendSeries>> {
    let end = resolve_today(query.today)?;
    let start = end - Duration::days(range_days(query.range.as_deref()) - 1);

    let checkins = load_checkins_between(&state.db, auth_user.id, start, end).await?;

    Ok(Json(trend_series(&checkins, start, end)))
}

/// All-time aggregates plus the streak counters.
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StreakQuery>,
) -> AppResult<Json<SummaryResponse>> {
    let today = resolve_today(query.today)?;
    let checkins = load_all_checkins(&state.db, auth_user.id).await?;

    let dates: Vec<NaiveDate> = checkins.iter().map(|c| c.checkin_date).collect();

    Ok(Json(SummaryResponse {
        streak: StreakSummary::from_dates(&dates, today),
        summary: summarize(&checkins),
    }))
}
