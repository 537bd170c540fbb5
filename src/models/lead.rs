// src/models/lead.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Ciclo de vida do lead. O texto serializado ("Follow-up" etc.) é o que
// o frontend exibe e também o que casa com nomes de etapas de pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Interested,
    Hot,
    #[serde(rename = "Follow-up")]
    FollowUp,
    Won,
    Lost,
    Dead,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Interested => "Interested",
            LeadStatus::Hot => "Hot",
            LeadStatus::FollowUp => "Follow-up",
            LeadStatus::Won => "Won",
            LeadStatus::Lost => "Lost",
            LeadStatus::Dead => "Dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_sector", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sector {
    Technology,
    Finance,
    Healthcare,
    Education,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Retail,
    Manufacturing,
    Other,
}

impl Default for Sector {
    fn default() -> Self {
        Sector::Other
    }
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Finance => "Finance",
            Sector::Healthcare => "Healthcare",
            Sector::Education => "Education",
            Sector::RealEstate => "Real Estate",
            Sector::Retail => "Retail",
            Sector::Manufacturing => "Manufacturing",
            Sector::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_region", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
        }
    }
}

// Motivo fixo de descarte. Chega como string livre no payload e é
// convertido aqui, para que valor desconhecido vire erro de domínio
// (invalid_enum_value) em vez de 422 do serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "dead_lead_reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadLeadReason {
    #[serde(rename = "Wrong Number")]
    WrongNumber,
    #[serde(rename = "Switched Off")]
    SwitchedOff,
    #[serde(rename = "Not Interested")]
    NotInterested,
    Other,
}

impl DeadLeadReason {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Wrong Number" => Some(Self::WrongNumber),
            "Switched Off" => Some(Self::SwitchedOff),
            "Not Interested" => Some(Self::NotInterested),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

// --- O LEAD ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,

    pub sector: Sector,
    pub region: Option<Region>,

    pub status: LeadStatus,

    // Campos condicionais de status
    pub follow_up_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>, example = 1500.0)]
    pub selling_price: Option<Decimal>,
    pub loss_reason: Option<String>,
    pub dead_lead_reason: Option<DeadLeadReason>,
    pub dead_lead_date: Option<DateTime<Utc>>,

    pub call_attempts: i32,
    pub last_call_attempt: Option<DateTime<Utc>>,

    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub reassignment_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,
    pub pipeline_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Registro do histórico de atribuições (tabela append-only, nunca
// consultada para autorização).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadAssignment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub status_at_time: LeadStatus,
    pub assigned_at: DateTime<Utc>,
}

// --- O PATCH DE TRANSIÇÃO ---

// Saída do validador de transição: o estado COMPLETO dos campos
// condicionais após a mudança. Aplicado como um único UPDATE, então um
// grupo não listado aqui simplesmente não existe — é assim que o
// invariante "só o grupo do status vigente fica preenchido" se sustenta.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadPatch {
    pub status: LeadStatus,
    pub follow_up_date: Option<NaiveDate>,
    pub selling_price: Option<Decimal>,
    pub loss_reason: Option<String>,
    pub dead_lead_reason: Option<DeadLeadReason>,
    pub dead_lead_date: Option<DateTime<Utc>>,
    pub reassignment_date: Option<DateTime<Utc>>,
    pub call_attempts: i32,
    pub last_call_attempt: Option<DateTime<Utc>>,
}

impl LeadPatch {
    // Patch com todos os grupos limpos; os construtores do validador
    // preenchem só o grupo exigido pelo status de destino.
    pub fn cleared(status: LeadStatus, lead: &Lead) -> Self {
        Self {
            status,
            follow_up_date: None,
            selling_price: None,
            loss_reason: None,
            dead_lead_reason: None,
            dead_lead_date: None,
            reassignment_date: None,
            call_attempts: lead.call_attempts,
            last_call_attempt: lead.last_call_attempt,
        }
    }

    // Quantos grupos condicionais o patch deixa preenchidos. O validador
    // de transição garante que nunca passa de um, casando com o status.
    pub fn populated_condition_groups(&self) -> usize {
        usize::from(self.follow_up_date.is_some())
            + usize::from(self.selling_price.is_some())
            + usize::from(self.loss_reason.is_some())
            + usize::from(self.dead_lead_reason.is_some() || self.dead_lead_date.is_some())
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(length(min = 5, message = "invalid_phone"))]
    #[schema(example = "+5511999990000")]
    pub phone: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub email: Option<String>,

    pub sector: Option<Sector>,
    pub region: Option<Region>,

    pub assigned_to: Option<Uuid>,
    pub pipeline_id: Option<Uuid>,
    pub notes: Option<String>,
}

// Corpo do PUT /api/leads/{id}/status. Datas e motivo de descarte chegam
// como texto cru: o validador de transição é quem decide se são válidos.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    pub status: LeadStatus,

    #[schema(example = "2026-12-01")]
    pub follow_up_date: Option<String>,

    #[schema(value_type = Option<f64>, example = 2500.0)]
    pub selling_price: Option<Decimal>,

    #[schema(example = "Preço acima do orçamento")]
    pub loss_reason: Option<String>,

    #[schema(example = "Switched Off")]
    pub dead_lead_reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNotePayload {
    pub note: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogCallPayload {
    pub notes: Option<String>,
}
