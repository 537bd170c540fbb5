// src/services/reassignment_service.rs

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, LeadRepository},
    models::{
        auth::{Role, User},
        distribution::ReassignDueReport,
        lead::Lead,
    },
    services::authorization::AuthorizationService,
};

// =============================================================================
//  SORTEIO (puro)
// =============================================================================

// Escolhe o substituto por sorteio uniforme entre o time, excluindo quem
// está com o lead hoje. A aleatoriedade é intencional (decisão de
// produto) — não trocar por round-robin. None = ninguém elegível.
pub fn pick_replacement<R: Rng + ?Sized>(
    team_ids: &[Uuid],
    current: Option<Uuid>,
    rng: &mut R,
) -> Option<Uuid> {
    let eligible: Vec<Uuid> = team_ids
        .iter()
        .copied()
        .filter(|&id| Some(id) != current)
        .collect();

    eligible.choose(rng).copied()
}

// =============================================================================
//  ORQUESTRAÇÃO
// =============================================================================

#[derive(Clone)]
pub struct ReassignmentService {
    lead_repo: LeadRepository,
    assignment_repo: AssignmentRepository,
    authz: AuthorizationService,
}

impl ReassignmentService {
    pub fn new(
        lead_repo: LeadRepository,
        assignment_repo: AssignmentRepository,
        authz: AuthorizationService,
    ) -> Self {
        Self {
            lead_repo,
            assignment_repo,
            authz,
        }
    }

    // Leads vencidos no escopo do gerente. Operação de lote sob demanda,
    // disparada por ação humana — não existe processo de fundo; um lead
    // vencido continua vencido até alguém chamar isto.
    pub async fn find_due(&self, actor: &User) -> Result<Vec<Lead>, AppError> {
        if actor.role == Role::Employee {
            return Err(AppError::Forbidden);
        }

        let team_ids = self.authz.team_ids(actor.id).await?;
        self.lead_repo
            .find_due_for_reassignment(actor.id, &team_ids, Utc::now())
            .await
    }

    // POST /leads/reassign-due: recicla todos os vencidos do escopo.
    // Cada lead: registra no histórico quem sai + status vigente, sorteia
    // o substituto e limpa a data de redistribuição. Sem alternativa no
    // time, o lead fica sem responsável — é um skip, não um erro.
    pub async fn reassign_due(&self, actor: &User) -> Result<ReassignDueReport, AppError> {
        if actor.role == Role::Employee {
            return Err(AppError::Forbidden);
        }

        let team_ids = self.authz.team_ids(actor.id).await?;
        let due = self
            .lead_repo
            .find_due_for_reassignment(actor.id, &team_ids, Utc::now())
            .await?;

        let mut reassigned_count = 0;
        let mut skipped_count = 0;

        for lead in &due {
            // O RNG não atravessa awaits (ThreadRng não é Send)
            let replacement = {
                let mut rng = rand::thread_rng();
                pick_replacement(&team_ids, lead.assigned_to, &mut rng)
            };

            // O responsável que sai entra no histórico antes da troca
            if lead.assigned_to.is_some() {
                self.assignment_repo
                    .append(lead.id, lead.assigned_to, lead.status)
                    .await?;
            }

            match replacement {
                Some(employee_id) => {
                    self.lead_repo
                        .update_assignment(lead.id, Some(employee_id), true)
                        .await?;
                    reassigned_count += 1;
                }
                None => {
                    self.lead_repo
                        .update_assignment(lead.id, None, true)
                        .await?;
                    skipped_count += 1;
                }
            }
        }

        tracing::info!(
            "Reciclagem por {}: {} redistribuídos, {} sem alternativa",
            actor.id,
            reassigned_count,
            skipped_count
        );

        Ok(ReassignDueReport {
            reassigned_count,
            skipped_count,
        })
    }
}

// =============================================================================
//  TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::pick_replacement;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn never_picks_the_current_holder() {
        let mut rng = StdRng::seed_from_u64(42);
        let team: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let current = team[2];

        for _ in 0..200 {
            let picked = pick_replacement(&team, Some(current), &mut rng).unwrap();
            assert_ne!(picked, current);
        }
    }

    #[test]
    fn sole_holder_team_yields_no_replacement() {
        let mut rng = StdRng::seed_from_u64(7);
        let only = Uuid::new_v4();

        assert_eq!(pick_replacement(&[only], Some(only), &mut rng), None);
        assert_eq!(pick_replacement(&[], None, &mut rng), None);
    }

    #[test]
    fn unassigned_lead_can_go_to_anyone() {
        let mut rng = StdRng::seed_from_u64(3);
        let team: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let seen: HashSet<Uuid> = (0..300)
            .filter_map(|_| pick_replacement(&team, None, &mut rng))
            .collect();

        // Sorteio uniforme: em 300 rodadas todo o time aparece
        assert_eq!(seen.len(), team.len());
    }
}
