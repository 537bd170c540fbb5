// src/services/testutil.rs

// Fábricas de registros para os testes das regras puras (validador de
// transição, distribuição, reciclagem, guardião, agregador).

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    auth::{Role, User},
    lead::{Lead, LeadStatus, Sector},
};

pub fn user_fixture(role: Role, manager_id: Option<Uuid>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Usuário de Teste".to_string(),
        email: format!("{}@teste.local", Uuid::new_v4()),
        password_hash: "$2b$12$hash".to_string(),
        role,
        manager_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn lead_fixture(created_by: Uuid, assigned_to: Option<Uuid>) -> Lead {
    let now = Utc::now();
    Lead {
        id: Uuid::new_v4(),
        name: "Lead de Teste".to_string(),
        phone: format!("+55{}", &Uuid::new_v4().simple().to_string()[..11]),
        email: None,
        sector: Sector::Other,
        region: None,
        status: LeadStatus::New,
        follow_up_date: None,
        selling_price: None,
        loss_reason: None,
        dead_lead_reason: None,
        dead_lead_date: None,
        call_attempts: 0,
        last_call_attempt: None,
        assigned_to,
        created_by,
        reassignment_date: None,
        notes: None,
        pipeline_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn lead_with_status(created_by: Uuid, assigned_to: Option<Uuid>, status: LeadStatus) -> Lead {
    let mut lead = lead_fixture(created_by, assigned_to);
    lead.status = status;
    lead
}
