// src/services/lead_service.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CallLogRepository, LeadRepository},
    models::{
        auth::{Role, User},
        lead::{
            CreateLeadPayload, DeadLeadReason, Lead, LeadAssignment, LeadPatch, LeadStatus,
            StatusUpdatePayload,
        },
    },
    services::{
        authorization::{self, AuthorizationService, LeadAction},
        pipeline_service::PipelineService,
    },
};

// Prazo padrão de reciclagem: um lead Hot/Lost sem mudança de status por
// esse período fica elegível à redistribuição.
pub const REASSIGNMENT_WINDOW_DAYS: i64 = 14;

// =============================================================================
//  VALIDADOR DE TRANSIÇÃO (puro)
// =============================================================================

// Dado o lead atual + status pedido + campos enviados, produz o patch
// completo do novo estado ou uma falha de validação. Não toca em banco:
// quem chama já passou pelo guardião de autorização.
pub fn validate_transition(
    lead: &Lead,
    payload: &StatusUpdatePayload,
    now: DateTime<Utc>,
) -> Result<LeadPatch, AppError> {
    let mut patch = LeadPatch::cleared(payload.status, lead);

    match payload.status {
        LeadStatus::FollowUp => {
            let raw = payload
                .follow_up_date
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(AppError::MissingRequiredField("followUpDate"))?;

            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::InvalidDateFormat("followUpDate"))?;

            // Aceita hoje; só rejeita datas já vencidas
            if date < now.date_naive() {
                return Err(AppError::PastDate("followUpDate"));
            }

            patch.follow_up_date = Some(date);
        }

        LeadStatus::Won => {
            let price = payload
                .selling_price
                .ok_or(AppError::MissingRequiredField("sellingPrice"))?;

            if price < Decimal::ZERO {
                return Err(AppError::InvalidEnumValue("sellingPrice"));
            }

            patch.selling_price = Some(price);
        }

        LeadStatus::Lost => {
            let reason = payload
                .loss_reason
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(AppError::MissingRequiredField("lossReason"))?;

            patch.loss_reason = Some(reason.to_string());
            patch.reassignment_date = Some(now + Duration::days(REASSIGNMENT_WINDOW_DAYS));
        }

        LeadStatus::Hot => {
            // Nenhum campo obrigatório; só arma o prazo de reciclagem
            patch.reassignment_date = Some(now + Duration::days(REASSIGNMENT_WINDOW_DAYS));
        }

        LeadStatus::Dead => {
            let raw = payload
                .dead_lead_reason
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(AppError::MissingRequiredField("deadLeadReason"))?;

            let reason = DeadLeadReason::parse(raw)
                .ok_or(AppError::InvalidEnumValue("deadLeadReason"))?;

            patch.dead_lead_reason = Some(reason);
            patch.dead_lead_date = Some(now);
            // call_attempts sobrevive ao descarte (já vem preservado do
            // LeadPatch::cleared)
        }

        LeadStatus::New => {
            // Reativação de um lead descartado: zera o histórico de
            // tentativas de ligação
            if lead.status == LeadStatus::Dead {
                patch.call_attempts = 0;
                patch.last_call_attempt = None;
            }
        }

        LeadStatus::Interested => {
            // Sem companheiros de status; tudo limpo
        }
    }

    Ok(patch)
}

// =============================================================================
//  ORQUESTRAÇÃO
// =============================================================================

#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    assignment_repo: AssignmentRepository,
    call_log_repo: CallLogRepository,
    pipeline_service: PipelineService,
    authz: AuthorizationService,
}

impl LeadService {
    pub fn new(
        lead_repo: LeadRepository,
        assignment_repo: AssignmentRepository,
        call_log_repo: CallLogRepository,
        pipeline_service: PipelineService,
        authz: AuthorizationService,
    ) -> Self {
        Self {
            lead_repo,
            assignment_repo,
            call_log_repo,
            pipeline_service,
            authz,
        }
    }

    pub async fn create_lead(
        &self,
        actor: &User,
        payload: &CreateLeadPayload,
    ) -> Result<Lead, AppError> {
        // Leads nascem pelas mãos de gerente/admin; createdBy é imutável
        if actor.role == Role::Employee {
            return Err(AppError::Forbidden);
        }

        // Atribuição inicial, se houver, precisa mirar alguém do time
        if let Some(employee_id) = payload.assigned_to {
            let team_ids = self.authz.team_ids(actor.id).await?;
            self.authz
                .ensure_assignable_target(actor, employee_id, &team_ids)
                .await?;
        }

        // Vínculo de funil é opcional, mas precisa existir. A etapa nunca
        // restringe a transição; só avisamos quando o funil não tem etapa
        // correspondente ao status inicial (o lead nasceria "Unstaged").
        if let Some(pipeline_id) = payload.pipeline_id {
            let staged = self
                .pipeline_service
                .status_has_stage(pipeline_id, LeadStatus::New.as_str())
                .await?;
            if !staged {
                tracing::warn!(
                    "Funil {} não tem etapa com o nome '{}'",
                    pipeline_id,
                    LeadStatus::New.as_str()
                );
            }
        }

        let lead = self.lead_repo.create(payload, actor.id).await?;
        tracing::info!("Lead {} criado por {}", lead.id, actor.id);

        Ok(lead)
    }

    pub async fn get_lead(&self, actor: &User, lead_id: Uuid) -> Result<Lead, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz.ensure(actor, &lead, LeadAction::View).await?;

        Ok(lead)
    }

    pub async fn list_leads(&self, actor: &User) -> Result<Vec<Lead>, AppError> {
        match actor.role {
            Role::Admin => self.lead_repo.list_all().await,
            Role::Manager => {
                let team_ids = self.authz.team_ids(actor.id).await?;
                self.lead_repo.list_for_manager(actor.id, &team_ids).await
            }
            Role::Employee => self.lead_repo.list_for_employee(actor.id).await,
        }
    }

    pub async fn assignment_history(
        &self,
        actor: &User,
        lead_id: Uuid,
    ) -> Result<Vec<LeadAssignment>, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz.ensure(actor, &lead, LeadAction::View).await?;

        self.assignment_repo.list_for_lead(lead_id).await
    }

    // PUT /leads/{id}/status
    pub async fn update_status(
        &self,
        actor: &User,
        lead_id: Uuid,
        payload: &StatusUpdatePayload,
    ) -> Result<Lead, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz
            .ensure(actor, &lead, LeadAction::UpdateStatus)
            .await?;

        let patch = validate_transition(&lead, payload, Utc::now())?;

        // Gerente mudando status em nome do operador: registra no
        // histórico quem estava com o lead e em que status, ANTES do patch
        if let Some(assignee) = lead.assigned_to {
            if assignee != actor.id {
                self.assignment_repo
                    .append(lead.id, Some(assignee), lead.status)
                    .await?;
            }
        }

        let updated = self.lead_repo.apply_patch(lead.id, &patch).await?;
        tracing::info!(
            "Lead {}: {} -> {} (por {})",
            lead.id,
            lead.status.as_str(),
            updated.status.as_str(),
            actor.id
        );

        Ok(updated)
    }

    // POST /leads/{id}/reactivate — só a partir de Dead
    pub async fn reactivate(&self, actor: &User, lead_id: Uuid) -> Result<Lead, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz
            .ensure(actor, &lead, LeadAction::UpdateStatus)
            .await?;

        if lead.status != LeadStatus::Dead {
            return Err(AppError::Conflict(
                "Apenas leads descartados podem ser reativados.".to_string(),
            ));
        }

        let payload = StatusUpdatePayload {
            status: LeadStatus::New,
            follow_up_date: None,
            selling_price: None,
            loss_reason: None,
            dead_lead_reason: None,
        };
        let patch = validate_transition(&lead, &payload, Utc::now())?;

        self.lead_repo.apply_patch(lead.id, &patch).await
    }

    pub async fn add_note(
        &self,
        actor: &User,
        lead_id: Uuid,
        note: &str,
    ) -> Result<(), AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz.ensure(actor, &lead, LeadAction::AddNote).await?;

        self.lead_repo.update_notes(lead.id, note).await
    }

    // Registra que uma ligação aconteceu. O pipeline de gravação em si é
    // assunto de outro sistema.
    pub async fn log_call(
        &self,
        actor: &User,
        lead_id: Uuid,
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz.ensure(actor, &lead, LeadAction::LogCall).await?;

        self.call_log_repo.insert(lead.id, actor.id, notes).await?;
        self.lead_repo
            .register_call_attempt(lead.id, Utc::now())
            .await
    }

    // Exclusão guardada: recusada enquanto existirem registros
    // dependentes (ligações ou vínculo de funil).
    pub async fn delete_lead(&self, actor: &User, lead_id: Uuid) -> Result<(), AppError> {
        let lead = self
            .lead_repo
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| authorization::missing_lead_error(actor))?;

        self.authz.ensure(actor, &lead, LeadAction::Delete).await?;

        if lead.pipeline_id.is_some() || self.call_log_repo.exists_for_lead(lead.id).await? {
            return Err(AppError::LeadHasDependents);
        }

        self.lead_repo.delete(lead.id).await?;
        tracing::info!("Lead {} removido por {}", lead.id, actor.id);

        Ok(())
    }
}

// =============================================================================
//  TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::{validate_transition, REASSIGNMENT_WINDOW_DAYS};
    use crate::common::error::AppError;
    use crate::models::lead::{DeadLeadReason, LeadStatus, StatusUpdatePayload};
    use crate::services::testutil::{lead_fixture, lead_with_status};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn payload(status: LeadStatus) -> StatusUpdatePayload {
        StatusUpdatePayload {
            status,
            follow_up_date: None,
            selling_price: None,
            loss_reason: None,
            dead_lead_reason: None,
        }
    }

    #[test]
    fn follow_up_requires_date() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        let err = validate_transition(&lead, &payload(LeadStatus::FollowUp), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredField("followUpDate")));
    }

    #[test]
    fn follow_up_rejects_garbage_date() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        let mut p = payload(LeadStatus::FollowUp);
        p.follow_up_date = Some("31/12/2026".to_string());

        let err = validate_transition(&lead, &p, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateFormat("followUpDate")));
    }

    #[test]
    fn follow_up_with_past_date_always_fails() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        let now = Utc::now();
        let mut p = payload(LeadStatus::FollowUp);
        p.follow_up_date = Some((now - Duration::days(1)).format("%Y-%m-%d").to_string());

        let err = validate_transition(&lead, &p, now).unwrap_err();
        assert!(matches!(err, AppError::PastDate("followUpDate")));
    }

    #[test]
    fn follow_up_accepts_today_and_clears_other_groups() {
        let mut lead = lead_with_status(Uuid::new_v4(), None, LeadStatus::Lost);
        lead.loss_reason = Some("caro demais".to_string());
        lead.reassignment_date = Some(Utc::now());

        let now = Utc::now();
        let mut p = payload(LeadStatus::FollowUp);
        p.follow_up_date = Some(now.format("%Y-%m-%d").to_string());

        let patch = validate_transition(&lead, &p, now).unwrap();
        assert_eq!(patch.status, LeadStatus::FollowUp);
        assert_eq!(patch.follow_up_date, Some(now.date_naive()));
        assert_eq!(patch.loss_reason, None);
        assert_eq!(patch.selling_price, None);
        assert_eq!(patch.reassignment_date, None);
    }

    #[test]
    fn won_requires_non_negative_price() {
        let lead = lead_fixture(Uuid::new_v4(), None);

        let err = validate_transition(&lead, &payload(LeadStatus::Won), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredField("sellingPrice")));

        let mut p = payload(LeadStatus::Won);
        p.selling_price = Some(Decimal::from(-10));
        let err = validate_transition(&lead, &p, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidEnumValue("sellingPrice")));

        p.selling_price = Some(Decimal::ZERO);
        let patch = validate_transition(&lead, &p, Utc::now()).unwrap();
        assert_eq!(patch.selling_price, Some(Decimal::ZERO));
        assert_eq!(patch.reassignment_date, None);
    }

    #[test]
    fn hot_and_lost_arm_the_recycling_window() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        let now = Utc::now();

        let patch = validate_transition(&lead, &payload(LeadStatus::Hot), now).unwrap();
        assert_eq!(
            patch.reassignment_date,
            Some(now + Duration::days(REASSIGNMENT_WINDOW_DAYS))
        );
        assert_eq!(patch.follow_up_date, None);

        let mut p = payload(LeadStatus::Lost);
        p.loss_reason = Some("concorrência".to_string());
        let patch = validate_transition(&lead, &p, now).unwrap();
        assert_eq!(patch.loss_reason, Some("concorrência".to_string()));
        assert_eq!(
            patch.reassignment_date,
            Some(now + Duration::days(REASSIGNMENT_WINDOW_DAYS))
        );
    }

    #[test]
    fn lost_requires_non_empty_reason() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        let mut p = payload(LeadStatus::Lost);
        p.loss_reason = Some("   ".to_string());

        let err = validate_transition(&lead, &p, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredField("lossReason")));
    }

    #[test]
    fn dead_requires_reason_from_fixed_set_and_keeps_attempts() {
        let mut lead = lead_fixture(Uuid::new_v4(), None);
        lead.call_attempts = 7;

        let mut p = payload(LeadStatus::Dead);
        p.dead_lead_reason = Some("Ghosting".to_string());
        let err = validate_transition(&lead, &p, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidEnumValue("deadLeadReason")));

        let now = Utc::now();
        p.dead_lead_reason = Some("Switched Off".to_string());
        let patch = validate_transition(&lead, &p, now).unwrap();
        assert_eq!(patch.dead_lead_reason, Some(DeadLeadReason::SwitchedOff));
        assert_eq!(patch.dead_lead_date, Some(now));
        assert_eq!(patch.call_attempts, 7);
    }

    #[test]
    fn reactivation_resets_call_tracking() {
        let mut lead = lead_with_status(Uuid::new_v4(), None, LeadStatus::Dead);
        lead.dead_lead_reason = Some(DeadLeadReason::NotInterested);
        lead.dead_lead_date = Some(Utc::now());
        lead.call_attempts = 5;
        lead.last_call_attempt = Some(Utc::now());

        let patch = validate_transition(&lead, &payload(LeadStatus::New), Utc::now()).unwrap();
        assert_eq!(patch.status, LeadStatus::New);
        assert_eq!(patch.dead_lead_reason, None);
        assert_eq!(patch.dead_lead_date, None);
        assert_eq!(patch.call_attempts, 0);
        assert_eq!(patch.last_call_attempt, None);
    }

    #[test]
    fn new_from_alive_status_keeps_attempt_counter() {
        let mut lead = lead_with_status(Uuid::new_v4(), None, LeadStatus::Hot);
        lead.call_attempts = 3;
        lead.reassignment_date = Some(Utc::now());

        let patch = validate_transition(&lead, &payload(LeadStatus::New), Utc::now()).unwrap();
        assert_eq!(patch.call_attempts, 3);
        assert_eq!(patch.reassignment_date, None);
    }

    #[test]
    fn every_transition_leaves_at_most_one_group_populated() {
        let now = Utc::now();
        let lead = lead_fixture(Uuid::new_v4(), None);

        let cases = vec![
            payload(LeadStatus::New),
            payload(LeadStatus::Interested),
            payload(LeadStatus::Hot),
            {
                let mut p = payload(LeadStatus::FollowUp);
                p.follow_up_date = Some((now + Duration::days(3)).format("%Y-%m-%d").to_string());
                p
            },
            {
                let mut p = payload(LeadStatus::Won);
                p.selling_price = Some(Decimal::from(900));
                p
            },
            {
                let mut p = payload(LeadStatus::Lost);
                p.loss_reason = Some("sem orçamento".to_string());
                p
            },
            {
                let mut p = payload(LeadStatus::Dead);
                p.dead_lead_reason = Some("Wrong Number".to_string());
                p
            },
        ];

        for p in cases {
            let patch = validate_transition(&lead, &p, now).unwrap();
            let groups = patch.populated_condition_groups();
            assert!(groups <= 1, "status {:?} deixou {} grupos", p.status, groups);

            // E o grupo preenchido é sempre o do status de destino
            match p.status {
                LeadStatus::FollowUp => assert!(patch.follow_up_date.is_some()),
                LeadStatus::Won => assert!(patch.selling_price.is_some()),
                LeadStatus::Lost => assert!(patch.loss_reason.is_some()),
                LeadStatus::Dead => assert!(patch.dead_lead_reason.is_some()),
                _ => assert_eq!(groups, 0),
            }
        }
    }
}
