use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::resolve_today;
use crate::models::checkin::{check_date, CheckIn, CheckInQuery, UpsertCheckInRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

/// Upsert by date: a second check-in for the same day replaces the first
/// and keeps its `created_at`. A missing `checkin_date` means the caller's
/// `?today=`, else the server's UTC date.
pub async fn upsert_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TodayQuery>,
    Json(body): Json<UpsertCheckInRequest>,
) -> AppResult<Json<CheckIn>> {
    let today = resolve_today(query.today)?;
    let new = body.into_new_checkin(today).map_err(AppError::Validation)?;

    let checkin = sqlx::query_as::<_, CheckIn>(
        r#"
        INSERT INTO wellness_checkins
            (id, user_id, checkin_date, mood, sleep_hours, stress_level, journal, activities)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, checkin_date) DO UPDATE SET
            mood = EXCLUDED.mood,
            sleep_hours = EXCLUDED.sleep_hours,
            stress_level = EXCLUDED.stress_level,
            journal = EXCLUDED.journal,
            activities = EXCLUDED.activities,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(new.checkin_date)
    .bind(new.mood)
    .bind(new.sleep_hours)
    .bind(new.stress_level)
    .bind(&new.journal)
    .bind(new.activities.to_db())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        checkin_date = %checkin.checkin_date,
        replaced = checkin.created_at != checkin.updated_at,
        "Check-in saved"
    );

    Ok(Json(checkin))
}

pub async fn list_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(today): Query<TodayQuery>,
    Query(query): Query<CheckInQuery>,
) -> AppResult<Json<Vec<CheckIn>>> {
    let today = resolve_today(today.today)?;
    let (start, end) = query.resolve_range(today).map_err(AppError::Validation)?;

    let checkins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM wellness_checkins
        WHERE user_id = $1 AND checkin_date BETWEEN $2 AND $3
        ORDER BY checkin_date DESC
        LIMIT $4
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .bind(query.limit())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(checkins))
}

pub async fn get_today_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TodayQuery>,
) -> AppResult<Json<CheckIn>> {
    let today = resolve_today(query.today)?;
    find_checkin(&state.db, auth_user.id, today)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No check-in for today yet".into()))
}

pub async fn get_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<CheckIn>> {
    let date = check_date(date).map_err(AppError::Validation)?;
    find_checkin(&state.db, auth_user.id, date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No check-in for {date}")))
}

/// Idempotent: deleting a missing day still returns 200.
pub async fn delete_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Value>> {
    let date = check_date(date).map_err(AppError::Validation)?;
    let result =
        sqlx::query("DELETE FROM wellness_checkins WHERE user_id = $1 AND checkin_date = $2")
            .bind(auth_user.id)
            .bind(date)
            .execute(&state.db)
            .await?;

    Ok(Json(json!({
        "deleted": result.rows_affected() > 0,
        "checkin_date": date,
    })))
}

pub async fn clear_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM wellness_checkins WHERE user_id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        removed = result.rows_affected(),
        "Cleared all check-ins"
    );

    Ok(Json(json!({ "deleted": result.rows_affected() })))
}

pub async fn find_checkin(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> AppResult<Option<CheckIn>> {
    let checkin = sqlx::query_as::<_, CheckIn>(
        "SELECT * FROM wellness_checkins WHERE user_id = $1 AND checkin_date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await?;

    Ok(checkin)
}

/// Every check-in the user owns, oldest first.
pub async fn load_all_checkins(db: &PgPool, user_id: Uuid) -> AppResult<Vec<CheckIn>> {
    let checkins = sqlx::query_as::<_, CheckIn>(
        "SELECT * FROM wellness_checkins WHERE user_id = $1 ORDER BY checkin_date ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(checkins)
}

pub async fn load_checkins_between(
    db: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<CheckIn>> {
    let checkins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM wellness_checkins
        WHERE user_id = $1 AND checkin_date BETWEEN $2 AND $3
        ORDER BY checkin_date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;

    Ok(checkins)
}

pub async fn load_checkin_dates(db: &PgPool, user_id: Uuid) -> AppResult<Vec<NaiveDate>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT checkin_date FROM wellness_checkins WHERE user_id = $1 ORDER BY checkin_date DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(dates)
}
