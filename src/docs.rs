// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::delete_lead,
        handlers::leads::update_status,
        handlers::leads::reactivate,
        handlers::leads::add_note,
        handlers::leads::log_call,
        handlers::leads::assignment_history,

        // --- Distribuição ---
        handlers::assignment::direct_assign,
        handlers::assignment::auto_distribute,
        handlers::assignment::assign_manual,
        handlers::assignment::list_due,
        handlers::assignment::reassign_due,

        // --- Funis ---
        handlers::pipelines::create_pipeline,
        handlers::pipelines::list_pipelines,
        handlers::pipelines::add_stage,
        handlers::pipelines::list_stages,

        // --- Analytics ---
        handlers::analytics::summary,
    ),
    components(
        schemas(
            models::auth::User,
            models::auth::Role,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            models::lead::Lead,
            models::lead::LeadStatus,
            models::lead::Sector,
            models::lead::Region,
            models::lead::DeadLeadReason,
            models::lead::LeadAssignment,
            models::lead::CreateLeadPayload,
            models::lead::StatusUpdatePayload,
            models::lead::AddNotePayload,
            models::lead::LogCallPayload,

            models::distribution::BatchOutcome,
            models::distribution::LeadOutcome,
            models::distribution::DirectAssignReport,
            models::distribution::DistributionReport,
            models::distribution::ManualEntryReport,
            models::distribution::ManualMapReport,
            models::distribution::ReassignDueReport,

            models::pipeline::Pipeline,
            models::pipeline::PipelineStage,

            models::analytics::AnalyticsSummary,
            models::analytics::DistributionBucket,
            models::analytics::StageBucket,

            services::distribution_service::ManualAssignmentEntry,
            handlers::assignment::DirectAssignPayload,
            handlers::assignment::AutoDistributePayload,
            handlers::assignment::ManualMapPayload,
            handlers::pipelines::CreatePipelinePayload,
            handlers::pipelines::AddStagePayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registro, login e sessão"),
        (name = "Leads", description = "Ciclo de vida do lead"),
        (name = "Distribuição", description = "Atribuição e reciclagem de leads"),
        (name = "Funis", description = "Funis de relatório e suas etapas"),
        (name = "Analytics", description = "Projeções para o dashboard"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
