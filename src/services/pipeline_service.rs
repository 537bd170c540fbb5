// src/services/pipeline_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PipelineRepository,
    models::pipeline::{Pipeline, PipelineStage},
};

#[derive(Clone)]
pub struct PipelineService {
    repo: PipelineRepository,
}

impl PipelineService {
    pub fn new(repo: PipelineRepository) -> Self {
        Self { repo }
    }

    pub async fn create_pipeline(
        &self,
        name: &str,
        is_default: bool,
    ) -> Result<Pipeline, AppError> {
        self.repo.create_pipeline(name, is_default).await
    }

    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>, AppError> {
        self.repo.list_pipelines().await
    }

    pub async fn add_stage(
        &self,
        pipeline_id: Uuid,
        name: &str,
        position: i32,
        probability: i32,
    ) -> Result<PipelineStage, AppError> {
        self.repo
            .find_pipeline(pipeline_id)
            .await?
            .ok_or(AppError::NotFound("Funil"))?;

        if !(0..=100).contains(&probability) {
            return Err(AppError::InvalidEnumValue("probability"));
        }

        self.repo
            .add_stage(pipeline_id, name, position, probability)
            .await
    }

    pub async fn list_stages(&self, pipeline_id: Uuid) -> Result<Vec<PipelineStage>, AppError> {
        self.repo
            .find_pipeline(pipeline_id)
            .await?
            .ok_or(AppError::NotFound("Funil"))?;

        self.repo.list_stages(pipeline_id).await
    }

    // Contrato com o ciclo de vida: uma etapa configurada pode validar o
    // texto de status de um lead vinculado ao funil. O funil nunca
    // restringe a transição em si — são dois eixos independentes sobre a
    // mesma entidade.
    pub async fn status_has_stage(
        &self,
        pipeline_id: Uuid,
        status_text: &str,
    ) -> Result<bool, AppError> {
        self.repo
            .find_pipeline(pipeline_id)
            .await?
            .ok_or(AppError::NotFound("Funil"))?;

        let stages = self.repo.list_stages(pipeline_id).await?;
        Ok(stages.iter().any(|s| s.name == status_text))
    }
}
