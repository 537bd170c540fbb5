// src/handlers/assignment.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        distribution::{DirectAssignReport, DistributionReport, ManualMapReport, ReassignDueReport},
        lead::Lead,
    },
    services::distribution_service::ManualAssignmentEntry,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectAssignPayload {
    pub lead_ids: Vec<Uuid>,
    pub employee_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoDistributePayload {
    // Sem lista: distribui todos os leads do escopo do gerente
    pub lead_ids: Option<Vec<Uuid>>,
    // Sem teto: round-robin puro
    pub per_employee_cap: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualMapPayload {
    pub assignments: Vec<ManualAssignmentEntry>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/leads/assign — atribuição direta em lote
#[utoipa::path(
    post,
    path = "/api/leads/assign",
    tag = "Distribuição",
    request_body = DirectAssignPayload,
    responses(
        (status = 200, description = "Envelope com contagens e itens pulados", body = DirectAssignReport),
        (status = 403, description = "Operador fora do time do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn direct_assign(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<DirectAssignPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .distribution_service
        .direct_assign(&user, &payload.lead_ids, payload.employee_id)
        .await?;

    // Sucesso parcial responde 200: quem chama inspeciona o envelope
    Ok((StatusCode::OK, Json(report)))
}

// POST /api/leads/assign/auto — round-robin, com ou sem teto
#[utoipa::path(
    post,
    path = "/api/leads/assign/auto",
    tag = "Distribuição",
    request_body = AutoDistributePayload,
    responses(
        (status = 200, description = "Envelope com atribuídos e pulados", body = DistributionReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn auto_distribute(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AutoDistributePayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .distribution_service
        .auto_distribute(&user, payload.lead_ids.as_deref(), payload.per_employee_cap)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/leads/assign/manual-map — mapa explícito operador -> leads
#[utoipa::path(
    post,
    path = "/api/leads/assign/manual-map",
    tag = "Distribuição",
    request_body = ManualMapPayload,
    responses(
        (status = 200, description = "Resultado por entrada do mapa", body = ManualMapReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ManualMapPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .distribution_service
        .assign_manual(&user, &payload.assignments)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/leads/due — leads vencidos aguardando reciclagem
#[utoipa::path(
    get,
    path = "/api/leads/due",
    tag = "Distribuição",
    responses((status = 200, description = "Leads vencidos no escopo", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_due(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let due = app_state.reassignment_service.find_due(&user).await?;

    Ok((StatusCode::OK, Json(due)))
}

// POST /api/leads/reassign-due — recicla os vencidos do escopo
#[utoipa::path(
    post,
    path = "/api/leads/reassign-due",
    tag = "Distribuição",
    responses(
        (status = 200, description = "Contagens de redistribuídos e pulados", body = ReassignDueReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn reassign_due(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.reassignment_service.reassign_due(&user).await?;

    Ok((StatusCode::OK, Json(report)))
}
