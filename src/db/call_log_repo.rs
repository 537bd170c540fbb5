// src/db/call_log_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

// Superfície mínima do subsistema de ligações: o núcleo só precisa saber
// que "uma ligação aconteceu" (contagem de tentativas e trava de
// exclusão). Gravação de áudio e afins vivem fora daqui.
#[derive(Clone)]
pub struct CallLogRepository {
    pool: PgPool,
}

impl CallLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        lead_id: Uuid,
        employee_id: Uuid,
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO call_logs (lead_id, employee_id, notes) VALUES ($1, $2, $3)")
            .bind(lead_id)
            .bind(employee_id)
            .bind(notes)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Trava da exclusão guardada: lead com ligação registrada não sai do
    // banco.
    pub async fn exists_for_lead(&self, lead_id: Uuid) -> Result<bool, AppError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM call_logs WHERE lead_id = $1 LIMIT 1")
                .bind(lead_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }
}
