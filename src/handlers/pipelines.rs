// src/handlers/pipelines.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Role,
        pipeline::{Pipeline, PipelineStage},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipelinePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Funil de Vendas Padrão")]
    pub name: String,

    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStagePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Hot")]
    pub name: String,

    #[schema(example = 1)]
    pub position: i32,

    // Peso só de relatório; nunca valida transição
    #[serde(default)]
    #[schema(example = 60)]
    pub probability: i32,
}

// POST /api/pipelines
#[utoipa::path(
    post,
    path = "/api/pipelines",
    tag = "Funis",
    request_body = CreatePipelinePayload,
    responses((status = 201, description = "Funil criado", body = Pipeline)),
    security(("api_jwt" = []))
)]
pub async fn create_pipeline(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePipelinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Configuração de funil é coisa de gestão
    if user.role == Role::Employee {
        return Err(AppError::Forbidden);
    }

    let pipeline = app_state
        .pipeline_service
        .create_pipeline(&payload.name, payload.is_default)
        .await?;

    Ok((StatusCode::CREATED, Json(pipeline)))
}

// GET /api/pipelines
#[utoipa::path(
    get,
    path = "/api/pipelines",
    tag = "Funis",
    responses((status = 200, description = "Funis configurados", body = Vec<Pipeline>)),
    security(("api_jwt" = []))
)]
pub async fn list_pipelines(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let pipelines = app_state.pipeline_service.list_pipelines().await?;

    Ok((StatusCode::OK, Json(pipelines)))
}

// POST /api/pipelines/{id}/stages
#[utoipa::path(
    post,
    path = "/api/pipelines/{id}/stages",
    tag = "Funis",
    params(("id" = Uuid, Path, description = "ID do funil")),
    request_body = AddStagePayload,
    responses(
        (status = 201, description = "Etapa adicionada", body = PipelineStage),
        (status = 409, description = "Etapa com esse nome já existe no funil")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_stage(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddStagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if user.role == Role::Employee {
        return Err(AppError::Forbidden);
    }

    let stage = app_state
        .pipeline_service
        .add_stage(id, &payload.name, payload.position, payload.probability)
        .await?;

    Ok((StatusCode::CREATED, Json(stage)))
}

// GET /api/pipelines/{id}/stages
#[utoipa::path(
    get,
    path = "/api/pipelines/{id}/stages",
    tag = "Funis",
    params(("id" = Uuid, Path, description = "ID do funil")),
    responses((status = 200, description = "Etapas em ordem de posição", body = Vec<PipelineStage>)),
    security(("api_jwt" = []))
)]
pub async fn list_stages(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let stages = app_state.pipeline_service.list_stages(id).await?;

    Ok((StatusCode::OK, Json(stages)))
}
