// src/db/pipeline_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pipeline::{Pipeline, PipelineStage},
};

#[derive(Clone)]
pub struct PipelineRepository {
    pool: PgPool,
}

impl PipelineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_pipeline(
        &self,
        name: &str,
        is_default: bool,
    ) -> Result<Pipeline, AppError> {
        let pipeline = sqlx::query_as::<_, Pipeline>(
            "INSERT INTO pipelines (name, is_default) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(is_default)
        .fetch_one(&self.pool)
        .await?;

        Ok(pipeline)
    }

    pub async fn find_pipeline(&self, id: Uuid) -> Result<Option<Pipeline>, AppError> {
        let pipeline = sqlx::query_as::<_, Pipeline>("SELECT * FROM pipelines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pipeline)
    }

    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>, AppError> {
        let pipelines =
            sqlx::query_as::<_, Pipeline>("SELECT * FROM pipelines ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(pipelines)
    }

    pub async fn add_stage(
        &self,
        pipeline_id: Uuid,
        name: &str,
        position: i32,
        probability: i32,
    ) -> Result<PipelineStage, AppError> {
        let stage = sqlx::query_as::<_, PipelineStage>(
            r#"
            INSERT INTO pipeline_stages (pipeline_id, name, position, probability)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(pipeline_id)
        .bind(name)
        .bind(position)
        .bind(probability)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Nome de etapa é único dentro do funil
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("A etapa '{}' já existe neste funil.", name));
                }
            }
            e.into()
        })?;

        Ok(stage)
    }

    pub async fn list_stages(&self, pipeline_id: Uuid) -> Result<Vec<PipelineStage>, AppError> {
        let stages = sqlx::query_as::<_, PipelineStage>(
            "SELECT * FROM pipeline_stages WHERE pipeline_id = $1 ORDER BY position ASC",
        )
        .bind(pipeline_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stages)
    }

    // Todas as etapas de todos os funis, para o agregador montar o mapa
    // funil -> etapas de uma vez só.
    pub async fn list_all_stages(&self) -> Result<Vec<PipelineStage>, AppError> {
        let stages = sqlx::query_as::<_, PipelineStage>(
            "SELECT * FROM pipeline_stages ORDER BY pipeline_id, position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stages)
    }
}
