// src/services/authorization.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Role, User},
        lead::Lead,
    },
};

// Ações que podem incidir sobre um lead. O guardião é chamado por
// operação, com o lead e o time concretos em mãos — nada de liberar
// grupos de rota inteiros por papel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    View,
    UpdateStatus,
    AddNote,
    LogCall,
    Assign,
    Reassign,
    Delete,
}

// Núcleo puro do guardião.
//
// - admin: tudo, sempre.
// - gerente: qualquer ação sobre leads que criou OU atribuídos a alguém
//   do seu time.
// - operador: apenas update-status / add-note / log-call, e só nos leads
//   atribuídos a ele. Nunca ações de atribuição.
pub fn authorize(actor: &User, lead: &Lead, team_ids: &[Uuid], action: LeadAction) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => {
            lead.created_by == actor.id
                || lead
                    .assigned_to
                    .map(|assignee| team_ids.contains(&assignee))
                    .unwrap_or(false)
        }
        Role::Employee => {
            let own_lead = lead.assigned_to == Some(actor.id);
            let allowed_action = matches!(
                action,
                LeadAction::View | LeadAction::UpdateStatus | LeadAction::AddNote | LeadAction::LogCall
            );
            own_lead && allowed_action
        }
    }
}

// Lead inexistente e lead fora do escopo são indistinguíveis para quem
// não é admin: ambos respondem Forbidden, para não vazar existência.
pub fn missing_lead_error(actor: &User) -> AppError {
    match actor.role {
        Role::Admin => AppError::NotFound("Lead"),
        _ => AppError::Forbidden,
    }
}

#[derive(Clone)]
pub struct AuthorizationService {
    user_repo: UserRepository,
}

impl AuthorizationService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    // O time é lido do banco a CADA verificação — o quadro de um gerente
    // muda entre requisições.
    pub async fn team_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let team = self.user_repo.find_team(manager_id).await?;
        Ok(team.iter().map(|u| u.id).collect())
    }

    pub async fn ensure(
        &self,
        actor: &User,
        lead: &Lead,
        action: LeadAction,
    ) -> Result<(), AppError> {
        let team_ids = match actor.role {
            Role::Manager => self.team_ids(actor.id).await?,
            _ => Vec::new(),
        };

        if authorize(actor, lead, &team_ids, action) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    // Confere se o alvo de uma atribuição é um operador que o chamador
    // de fato gerencia. Admin pode mirar qualquer operador cadastrado.
    pub async fn ensure_assignable_target(
        &self,
        actor: &User,
        employee_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<(), AppError> {
        match actor.role {
            Role::Admin => {
                let target = self
                    .user_repo
                    .find_by_id(employee_id)
                    .await?
                    .ok_or(AppError::NotFound("Operador"))?;
                if target.role != Role::Employee {
                    return Err(AppError::NotFound("Operador"));
                }
                Ok(())
            }
            Role::Manager => {
                if team_ids.contains(&employee_id) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden)
                }
            }
            Role::Employee => Err(AppError::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{authorize, LeadAction};
    use crate::models::auth::Role;
    use crate::services::testutil::{lead_fixture, user_fixture};
    use uuid::Uuid;

    #[test]
    fn admin_can_do_everything() {
        let admin = user_fixture(Role::Admin, None);
        let lead = lead_fixture(Uuid::new_v4(), None);

        for action in [
            LeadAction::View,
            LeadAction::UpdateStatus,
            LeadAction::Assign,
            LeadAction::Delete,
        ] {
            assert!(authorize(&admin, &lead, &[], action));
        }
    }

    #[test]
    fn manager_owns_created_leads() {
        let manager = user_fixture(Role::Manager, None);
        let lead = lead_fixture(manager.id, None);

        assert!(authorize(&manager, &lead, &[], LeadAction::Assign));
    }

    #[test]
    fn manager_reaches_leads_assigned_within_team() {
        let manager = user_fixture(Role::Manager, None);
        let employee_id = Uuid::new_v4();
        let lead = lead_fixture(Uuid::new_v4(), Some(employee_id));

        assert!(authorize(&manager, &lead, &[employee_id], LeadAction::Reassign));
        // Mesmo lead, time que não contém o responsável: fora do escopo
        assert!(!authorize(&manager, &lead, &[Uuid::new_v4()], LeadAction::Reassign));
    }

    #[test]
    fn employee_limited_to_own_leads_and_call_actions() {
        let employee = user_fixture(Role::Employee, Some(Uuid::new_v4()));
        let own = lead_fixture(Uuid::new_v4(), Some(employee.id));
        let other = lead_fixture(Uuid::new_v4(), Some(Uuid::new_v4()));

        assert!(authorize(&employee, &own, &[], LeadAction::UpdateStatus));
        assert!(authorize(&employee, &own, &[], LeadAction::AddNote));
        assert!(authorize(&employee, &own, &[], LeadAction::LogCall));

        // Nunca ações de atribuição, nem no próprio lead
        assert!(!authorize(&employee, &own, &[], LeadAction::Assign));
        assert!(!authorize(&employee, &own, &[], LeadAction::Reassign));
        assert!(!authorize(&employee, &own, &[], LeadAction::Delete));

        // Lead de outro operador: nada
        assert!(!authorize(&employee, &other, &[], LeadAction::UpdateStatus));
    }
}
