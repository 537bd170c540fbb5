// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AssignmentRepository, CallLogRepository, LeadRepository, PipelineRepository,
        UserRepository,
    },
    services::{
        analytics_service::AnalyticsService, auth::AuthService,
        authorization::AuthorizationService, distribution_service::DistributionService,
        lead_service::LeadService, pipeline_service::PipelineService,
        reassignment_service::ReassignmentService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub distribution_service: DistributionService,
    pub reassignment_service: ReassignmentService,
    pub analytics_service: AnalyticsService,
    pub pipeline_service: PipelineService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let pipeline_repo = PipelineRepository::new(db_pool.clone());
        let call_log_repo = CallLogRepository::new(db_pool.clone());

        let authz = AuthorizationService::new(user_repo.clone());
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let pipeline_service = PipelineService::new(pipeline_repo.clone());
        let lead_service = LeadService::new(
            lead_repo.clone(),
            assignment_repo.clone(),
            call_log_repo,
            pipeline_service.clone(),
            authz.clone(),
        );
        let distribution_service = DistributionService::new(lead_repo.clone(), authz.clone());
        let reassignment_service =
            ReassignmentService::new(lead_repo.clone(), assignment_repo, authz.clone());
        let analytics_service = AnalyticsService::new(lead_repo, pipeline_repo, authz);

        Ok(Self {
            db_pool,
            auth_service,
            lead_service,
            distribution_service,
            reassignment_service,
            analytics_service,
            pipeline_service,
        })
    }
}
