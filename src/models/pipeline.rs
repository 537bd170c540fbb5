// src/models/pipeline.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Funil de relatório. As etapas são nomes livres casados contra o texto
// do status do lead — o funil NÃO participa da validação de transição.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Uuid,
    #[schema(example = "Funil de Vendas Padrão")]
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    #[schema(example = "Hot")]
    pub name: String,
    #[schema(example = 1)]
    pub position: i32,
    // Peso de probabilidade (0-100), só para relatório ponderado
    #[schema(example = 60)]
    pub probability: i32,
}
