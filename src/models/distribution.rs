// src/models/distribution.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// --- DESFECHOS POR ITEM ---

// Operações de lote nunca abortam no primeiro problema: cada lead sai
// com um desfecho próprio e o envelope sempre responde 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum BatchOutcome {
    Assigned,
    Skipped,
    Forbidden,
    NotFound,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadOutcome {
    pub lead_id: Uuid,
    pub outcome: BatchOutcome,
    // Preenchido quando o desfecho envolve um operador (atribuído a quem,
    // ou já estava com quem)
    pub employee_id: Option<Uuid>,
    pub reason: Option<&'static str>,
}

impl LeadOutcome {
    pub fn assigned(lead_id: Uuid, employee_id: Uuid) -> Self {
        Self {
            lead_id,
            outcome: BatchOutcome::Assigned,
            employee_id: Some(employee_id),
            reason: None,
        }
    }

    pub fn skipped(lead_id: Uuid, employee_id: Option<Uuid>, reason: &'static str) -> Self {
        Self {
            lead_id,
            outcome: BatchOutcome::Skipped,
            employee_id,
            reason: Some(reason),
        }
    }

    pub fn forbidden(lead_id: Uuid) -> Self {
        Self {
            lead_id,
            outcome: BatchOutcome::Forbidden,
            employee_id: None,
            reason: Some("lead_outside_scope"),
        }
    }

    pub fn not_found(lead_id: Uuid) -> Self {
        Self {
            lead_id,
            outcome: BatchOutcome::NotFound,
            employee_id: None,
            reason: Some("lead_not_found"),
        }
    }
}

// --- ENVELOPES DE RESPOSTA ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectAssignReport {
    pub assigned_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<LeadOutcome>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub assigned_count: usize,
    pub skipped_count: usize,
    pub assigned: Vec<LeadOutcome>,
    pub skipped: Vec<LeadOutcome>,
}

// Resultado por entrada do mapa explícito operador -> leads. Uma entrada
// inválida (operador fora do time) falha sozinha, sem derrubar as demais.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryReport {
    pub employee_id: Uuid,
    pub error: Option<&'static str>,
    pub assigned_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<LeadOutcome>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualMapReport {
    pub results: Vec<ManualEntryReport>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignDueReport {
    pub reassigned_count: usize,
    pub skipped_count: usize,
}
