use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::load_profile;
use crate::handlers::checkins::load_all_checkins;
use crate::services::export::{to_csv, to_json, ExportFormat};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Download every check-in the caller owns as an attachment.
pub async fn export_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let checkins = load_all_checkins(&state.db, auth_user.id).await?;

    let body = match query.format {
        ExportFormat::Csv => to_csv(&checkins)?,
        ExportFormat::Json => {
            let profile = load_profile(&state.db, auth_user.id).await?;
            to_json(&profile, &checkins).map_err(|e| AppError::Internal(e.into()))?
        }
    };

    tracing::info!(
        user_id = %auth_user.id,
        format = query.format.extension(),
        rows = checkins.len(),
        "Exported check-ins"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        query.format.filename(Utc::now().date_naive())
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Bad Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(query.format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
