// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{CreateLeadPayload, Lead, LeadPatch},
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO / BUSCA
    // =========================================================================

    pub async fn create(
        &self,
        payload: &CreateLeadPayload,
        created_by: Uuid,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (name, phone, email, sector, region, assigned_to, created_by, pipeline_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(payload.sector.unwrap_or_default())
        .bind(payload.region)
        .bind(payload.assigned_to)
        .bind(created_by)
        .bind(payload.pipeline_id)
        .bind(&payload.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Telefone é único globalmente
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::PhoneAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(lead)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    // =========================================================================
    //  LISTAGENS POR ESCOPO
    // =========================================================================

    pub async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(leads)
    }

    // Escopo do gerente: leads que ele criou OU atribuídos a alguém do
    // seu time.
    pub async fn list_for_manager(
        &self,
        manager_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE created_by = $1 OR assigned_to = ANY($2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(manager_id)
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE assigned_to = $1 ORDER BY created_at ASC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    // Candidatos à distribuição automática: leads do escopo do gerente,
    // não atribuídos primeiro, depois por data de criação (desempate
    // estável).
    pub async fn list_distributable(
        &self,
        manager_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE created_by = $1 OR assigned_to = ANY($2)
            ORDER BY (assigned_to IS NULL) DESC, created_at ASC
            "#,
        )
        .bind(manager_id)
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    // =========================================================================
    //  RECICLAGEM
    // =========================================================================

    // Leads "vencidos": data de redistribuição no passado E status ainda
    // reciclável. O filtro de status aqui é obrigatório — uma
    // reassignment_date órfã de um estado anterior não pode reciclar um
    // lead que já virou Won/Dead.
    pub async fn find_due_for_reassignment(
        &self,
        manager_id: Uuid,
        team_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE reassignment_date IS NOT NULL
              AND reassignment_date <= $3
              AND status IN ('HOT', 'LOST')
              AND (created_by = $1 OR assigned_to = ANY($2))
            ORDER BY reassignment_date ASC
            "#,
        )
        .bind(manager_id)
        .bind(team_ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    // Aplica o patch de transição inteiro em UM único UPDATE. Os grupos
    // condicionais não pertencentes ao novo status chegam como None e
    // são limpos na mesma escrita — nada de round-trips parciais.
    pub async fn apply_patch(&self, lead_id: Uuid, patch: &LeadPatch) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                status = $2,
                follow_up_date = $3,
                selling_price = $4,
                loss_reason = $5,
                dead_lead_reason = $6,
                dead_lead_date = $7,
                reassignment_date = $8,
                call_attempts = $9,
                last_call_attempt = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(patch.status)
        .bind(patch.follow_up_date)
        .bind(patch.selling_price)
        .bind(&patch.loss_reason)
        .bind(patch.dead_lead_reason)
        .bind(patch.dead_lead_date)
        .bind(patch.reassignment_date)
        .bind(patch.call_attempts)
        .bind(patch.last_call_attempt)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    // Troca de responsável. Usada pela distribuição (mantém a data de
    // redistribuição) e pela reciclagem (limpa).
    pub async fn update_assignment(
        &self,
        lead_id: Uuid,
        assigned_to: Option<Uuid>,
        clear_reassignment: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads SET
                assigned_to = $2,
                reassignment_date = CASE WHEN $3 THEN NULL ELSE reassignment_date END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lead_id)
        .bind(assigned_to)
        .bind(clear_reassignment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_notes(&self, lead_id: Uuid, notes: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE leads SET notes = $2, updated_at = NOW() WHERE id = $1")
            .bind(lead_id)
            .bind(notes)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // "Uma ligação aconteceu": incrementa o contador e marca o instante.
    pub async fn register_call_attempt(
        &self,
        lead_id: Uuid,
        called_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads SET
                call_attempts = call_attempts + 1,
                last_call_attempt = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lead_id)
        .bind(called_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, lead_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(lead_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
