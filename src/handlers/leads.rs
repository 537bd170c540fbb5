// src/handlers/leads.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::lead::{
        AddNotePayload, CreateLeadPayload, Lead, LeadAssignment, LogCallPayload,
        StatusUpdatePayload,
    },
};

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 409, description = "Telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.create_lead(&user, &payload).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads — listagem no escopo do ator (admin: tudo; gerente:
// criados por ele + time; operador: só os seus)
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses((status = 200, description = "Leads no escopo do ator", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.list_leads(&user).await?;

    Ok((StatusCode::OK, Json(leads)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 403, description = "Fora do escopo do ator")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get_lead(&user, id).await?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/leads/{id} — recusado enquanto houver registros dependentes
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead removido"),
        (status = 409, description = "Lead possui registros dependentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete_lead(&user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/leads/{id}/status — o coração do ciclo de vida
#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Transição inválida (kind estável no corpo)"),
        (status = 403, description = "Ator sem direito sobre o lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .update_status(&user, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/{id}/reactivate — Dead -> New
#[utoipa::path(
    post,
    path = "/api/leads/{id}/reactivate",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead reativado como New", body = Lead),
        (status = 409, description = "Lead não está descartado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.reactivate(&user, id).await?;

    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/{id}/note
#[utoipa::path(
    post,
    path = "/api/leads/{id}/note",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = AddNotePayload,
    responses((status = 204, description = "Anotação gravada")),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .lead_service
        .add_note(&user, id, &payload.note)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/leads/{id}/call — registra que uma ligação aconteceu
#[utoipa::path(
    post,
    path = "/api/leads/{id}/call",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = LogCallPayload,
    responses((status = 204, description = "Ligação registrada")),
    security(("api_jwt" = []))
)]
pub async fn log_call(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LogCallPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .lead_service
        .log_call(&user, id, payload.notes.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/leads/{id}/assignments — trilha de auditoria
#[utoipa::path(
    get,
    path = "/api/leads/{id}/assignments",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses((status = 200, description = "Histórico de atribuições", body = Vec<LeadAssignment>)),
    security(("api_jwt" = []))
)]
pub async fn assignment_history(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.lead_service.assignment_history(&user, id).await?;

    Ok((StatusCode::OK, Json(history)))
}
