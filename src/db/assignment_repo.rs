// src/db/assignment_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{LeadAssignment, LeadStatus},
};

// Histórico de atribuições: tabela append-only separada, uma linha por
// redistribuição (em vez de um array crescendo sem limite dentro do
// registro do lead). Serve só para auditoria e relatório.
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Registra o responsável que está SAINDO e o status do lead naquele
    // momento. employee_id é NULL quando o lead estava sem responsável.
    pub async fn append(
        &self,
        lead_id: Uuid,
        employee_id: Option<Uuid>,
        status_at_time: LeadStatus,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lead_assignments (lead_id, employee_id, status_at_time)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(lead_id)
        .bind(employee_id)
        .bind(status_at_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_lead(&self, lead_id: Uuid) -> Result<Vec<LeadAssignment>, AppError> {
        let entries = sqlx::query_as::<_, LeadAssignment>(
            "SELECT * FROM lead_assignments WHERE lead_id = $1 ORDER BY assigned_at ASC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
