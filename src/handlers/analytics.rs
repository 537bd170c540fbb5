// src/handlers/analytics.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum::Json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::analytics::AnalyticsSummary,
};

// GET /api/analytics/summary — distribuições por status, setor, região e
// etapa de funil, no escopo do ator
#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    tag = "Analytics",
    responses((status = 200, description = "Resumo do dashboard", body = AnalyticsSummary)),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.analytics_service.summary(&user).await?;

    Ok((StatusCode::OK, Json(summary)))
}
