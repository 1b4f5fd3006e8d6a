pub mod auth;
pub mod calendar;
pub mod checkins;
pub mod export;
pub mod health;
pub mod stats;

use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};

/// The caller's local date when supplied, else the server's UTC date.
/// Client dates must sit within ±1 day of server-now.
pub fn resolve_today(client_today: Option<NaiveDate>) -> AppResult<NaiveDate> {
    check_today(client_today, Utc::now().date_naive())
}

fn check_today(client_today: Option<NaiveDate>, server_today: NaiveDate) -> AppResult<NaiveDate> {
    let Some(today) = client_today else {
        return Ok(server_today);
    };
    if (today - server_today).num_days().abs() > 1 {
        return Err(AppError::Validation(
            "today must be within ±1 day of the server date".into(),
        ));
    }
    Ok(today)
}

#[cfg(test)]
pub(crate) fn test_state(db: sqlx::PgPool) -> crate::AppState {
    crate::AppState {
        db,
        config: std::sync::Arc::new(crate::config::test_config()),
        rate_limiter: crate::auth::rate_limit::RateLimitState::default(),
    }
}

#[cfg(test)]
pub(crate) async fn seed_user(
    db: &sqlx::PgPool,
    email: &str,
) -> crate::auth::middleware::AuthUser {
    let id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash, name) VALUES ($1, $2, 'x', 'Sam')")
        .bind(id)
        .bind(email)
        .execute(db)
        .await
        .unwrap();
    crate::auth::middleware::AuthUser {
        id,
        email: email.to_string(),
    }
}
