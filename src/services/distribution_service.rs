// src/services/distribution_service.rs

use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::{
        auth::{Role, User},
        distribution::{
            BatchOutcome, DirectAssignReport, DistributionReport, LeadOutcome, ManualEntryReport,
            ManualMapReport,
        },
        lead::Lead,
    },
    services::authorization::{authorize, AuthorizationService, LeadAction},
};

// Entrada do mapa explícito operador -> leads.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualAssignmentEntry {
    pub employee_id: Uuid,
    pub lead_ids: Vec<Uuid>,
}

// =============================================================================
//  PLANEJADORES (puros)
// =============================================================================

// Ordenação canônica dos candidatos: sem responsável primeiro, depois
// por data de criação ascendente (desempate estável).
pub fn order_candidates(mut leads: Vec<Lead>) -> Vec<Lead> {
    leads.sort_by_key(|l| (l.assigned_to.is_some(), l.created_at));
    leads
}

// Round-robin sem teto: candidato i vai para team[i mod |team|]. Um lead
// que já está com o operador sorteado para ele é pulado (entra na lista
// de skipped), nunca derruba o lote.
pub fn plan_round_robin(candidates: &[Lead], team_ids: &[Uuid]) -> Vec<LeadOutcome> {
    if team_ids.is_empty() {
        return candidates
            .iter()
            .map(|l| LeadOutcome::skipped(l.id, None, "no_eligible_employee"))
            .collect();
    }

    candidates
        .iter()
        .enumerate()
        .map(|(i, lead)| {
            let target = team_ids[i % team_ids.len()];
            if lead.assigned_to == Some(target) {
                LeadOutcome::skipped(lead.id, Some(target), "already_with_target")
            } else {
                LeadOutcome::assigned(lead.id, target)
            }
        })
        .collect()
}

// Round-robin com teto: percorre os operadores em ordem, entregando a
// cada um até `cap` leads da lista ordenada, e para quando acabam os
// candidatos ou o orçamento cap × |team|. Os que sobram saem como
// skipped — o envelope nunca esconde o que ficou de fora.
pub fn plan_capped(candidates: &[Lead], team_ids: &[Uuid], cap: usize) -> Vec<LeadOutcome> {
    if team_ids.is_empty() {
        return candidates
            .iter()
            .map(|l| LeadOutcome::skipped(l.id, None, "no_eligible_employee"))
            .collect();
    }

    let mut outcomes = Vec::with_capacity(candidates.len());
    let mut idx = 0;

    'team: for &employee in team_ids {
        let mut given = 0;
        while given < cap {
            if idx >= candidates.len() {
                break 'team;
            }
            let lead = &candidates[idx];
            idx += 1;

            if lead.assigned_to == Some(employee) {
                // Já está com o alvo: pula sem consumir a cota
                outcomes.push(LeadOutcome::skipped(
                    lead.id,
                    Some(employee),
                    "already_with_target",
                ));
                continue;
            }

            outcomes.push(LeadOutcome::assigned(lead.id, employee));
            given += 1;
        }
    }

    // Orçamento esgotado: o restante é reportado, não silenciado
    while idx < candidates.len() {
        outcomes.push(LeadOutcome::skipped(
            candidates[idx].id,
            None,
            "distribution_budget_exhausted",
        ));
        idx += 1;
    }

    outcomes
}

// =============================================================================
//  ORQUESTRAÇÃO
// =============================================================================

#[derive(Clone)]
pub struct DistributionService {
    lead_repo: LeadRepository,
    authz: AuthorizationService,
}

impl DistributionService {
    pub fn new(lead_repo: LeadRepository, authz: AuthorizationService) -> Self {
        Self { lead_repo, authz }
    }

    async fn team_for(&self, actor: &User) -> Result<Vec<Uuid>, AppError> {
        match actor.role {
            Role::Employee => Err(AppError::Forbidden),
            _ => self.authz.team_ids(actor.id).await,
        }
    }

    // Atribuição direta: marca assignedTo em todos os leads do lote,
    // incondicionalmente (caminho pensado para leads New/sem dono; não
    // passa pela validação de transição).
    pub async fn direct_assign(
        &self,
        actor: &User,
        lead_ids: &[Uuid],
        employee_id: Uuid,
    ) -> Result<DirectAssignReport, AppError> {
        let team_ids = self.team_for(actor).await?;
        self.authz
            .ensure_assignable_target(actor, employee_id, &team_ids)
            .await?;

        let leads = self.lead_repo.find_by_ids(lead_ids).await?;
        let found: HashMap<Uuid, &Lead> = leads.iter().map(|l| (l.id, l)).collect();

        let mut assigned_count = 0;
        let mut skipped = Vec::new();

        for &lead_id in lead_ids {
            let Some(lead) = found.get(&lead_id) else {
                skipped.push(LeadOutcome::not_found(lead_id));
                continue;
            };

            if !authorize(actor, lead, &team_ids, LeadAction::Assign) {
                skipped.push(LeadOutcome::forbidden(lead_id));
                continue;
            }

            let changed = lead.assigned_to != Some(employee_id);
            self.lead_repo
                .update_assignment(lead.id, Some(employee_id), changed)
                .await?;
            assigned_count += 1;
        }

        tracing::info!(
            "Atribuição direta por {}: {} leads para {}, {} pulados",
            actor.id,
            assigned_count,
            employee_id,
            skipped.len()
        );

        Ok(DirectAssignReport {
            assigned_count,
            skipped_count: skipped.len(),
            skipped,
        })
    }

    // Distribuição automática (round-robin, com ou sem teto por
    // operador). Sem lista explícita, distribui todos os leads do escopo
    // do gerente.
    pub async fn auto_distribute(
        &self,
        actor: &User,
        lead_ids: Option<&[Uuid]>,
        per_employee_cap: Option<u32>,
    ) -> Result<DistributionReport, AppError> {
        let team_ids = self.team_for(actor).await?;

        let mut pre_skipped = Vec::new();
        let candidates = match lead_ids {
            Some(ids) => {
                let leads = self.lead_repo.find_by_ids(ids).await?;
                let found: HashMap<Uuid, Lead> =
                    leads.into_iter().map(|l| (l.id, l)).collect();

                let mut eligible = Vec::new();
                for &id in ids {
                    match found.get(&id) {
                        None => pre_skipped.push(LeadOutcome::not_found(id)),
                        Some(lead) if !authorize(actor, lead, &team_ids, LeadAction::Assign) => {
                            pre_skipped.push(LeadOutcome::forbidden(id));
                        }
                        Some(lead) => eligible.push(lead.clone()),
                    }
                }
                order_candidates(eligible)
            }
            None => {
                self.lead_repo
                    .list_distributable(actor.id, &team_ids)
                    .await?
            }
        };

        let by_id: HashMap<Uuid, &Lead> = candidates.iter().map(|l| (l.id, l)).collect();
        let plan = match per_employee_cap {
            Some(cap) => plan_capped(&candidates, &team_ids, cap as usize),
            None => plan_round_robin(&candidates, &team_ids),
        };

        let mut assigned = Vec::new();
        let mut skipped = pre_skipped;

        for outcome in plan {
            match (outcome.outcome, outcome.employee_id) {
                (BatchOutcome::Assigned, Some(employee)) => {
                    let changed = by_id
                        .get(&outcome.lead_id)
                        .map(|l| l.assigned_to != Some(employee))
                        .unwrap_or(true);
                    self.lead_repo
                        .update_assignment(outcome.lead_id, Some(employee), changed)
                        .await?;
                    assigned.push(outcome);
                }
                _ => skipped.push(outcome),
            }
        }

        tracing::info!(
            "Distribuição automática por {}: {} atribuídos, {} pulados",
            actor.id,
            assigned.len(),
            skipped.len()
        );

        Ok(DistributionReport {
            assigned_count: assigned.len(),
            skipped_count: skipped.len(),
            assigned,
            skipped,
        })
    }

    // Mapa explícito: cada entrada é validada sozinha (operador fora do
    // time invalida só aquela entrada) e, dentro de uma entrada válida,
    // cada lead fora do escopo é pulado individualmente.
    pub async fn assign_manual(
        &self,
        actor: &User,
        entries: &[ManualAssignmentEntry],
    ) -> Result<ManualMapReport, AppError> {
        let team_ids = self.team_for(actor).await?;

        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            if self
                .authz
                .ensure_assignable_target(actor, entry.employee_id, &team_ids)
                .await
                .is_err()
            {
                results.push(ManualEntryReport {
                    employee_id: entry.employee_id,
                    error: Some("employee_not_on_team"),
                    assigned_count: 0,
                    skipped_count: 0,
                    skipped: Vec::new(),
                });
                continue;
            }

            let leads = self.lead_repo.find_by_ids(&entry.lead_ids).await?;
            let found: HashMap<Uuid, &Lead> = leads.iter().map(|l| (l.id, l)).collect();

            let mut assigned_count = 0;
            let mut skipped = Vec::new();

            for &lead_id in &entry.lead_ids {
                let Some(lead) = found.get(&lead_id) else {
                    skipped.push(LeadOutcome::not_found(lead_id));
                    continue;
                };

                if !authorize(actor, lead, &team_ids, LeadAction::Assign) {
                    skipped.push(LeadOutcome::forbidden(lead_id));
                    continue;
                }

                let changed = lead.assigned_to != Some(entry.employee_id);
                self.lead_repo
                    .update_assignment(lead.id, Some(entry.employee_id), changed)
                    .await?;
                assigned_count += 1;
            }

            results.push(ManualEntryReport {
                employee_id: entry.employee_id,
                error: None,
                assigned_count,
                skipped_count: skipped.len(),
                skipped,
            });
        }

        Ok(ManualMapReport { results })
    }
}

// =============================================================================
//  TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::{order_candidates, plan_capped, plan_round_robin};
    use crate::models::distribution::BatchOutcome;
    use crate::services::testutil::lead_fixture;
    use chrono::Duration;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn candidates(n: usize) -> Vec<crate::models::lead::Lead> {
        let creator = Uuid::new_v4();
        (0..n)
            .map(|i| {
                let mut l = lead_fixture(creator, None);
                l.created_at = l.created_at + Duration::seconds(i as i64);
                l
            })
            .collect()
    }

    #[test]
    fn round_robin_spreads_evenly() {
        let leads = candidates(7);
        let team: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let plan = plan_round_robin(&leads, &team);

        let mut per_employee: HashMap<Uuid, usize> = HashMap::new();
        for o in &plan {
            assert_eq!(o.outcome, BatchOutcome::Assigned);
            *per_employee.entry(o.employee_id.unwrap()).or_default() += 1;
        }

        // 7 leads / 3 operadores: cargas 3, 2, 2
        let mut loads: Vec<usize> = per_employee.values().copied().collect();
        loads.sort_unstable();
        assert_eq!(loads, vec![2, 2, 3]);

        // União de atribuídos + pulados cobre a entrada exatamente uma vez
        assert_eq!(plan.len(), leads.len());
        let planned: Vec<Uuid> = plan.iter().map(|o| o.lead_id).collect();
        let input: Vec<Uuid> = leads.iter().map(|l| l.id).collect();
        assert_eq!(planned, input);
    }

    #[test]
    fn round_robin_skips_lead_already_with_its_target() {
        let team: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let mut leads = candidates(4);
        // Candidato 2 cai em team[0]; já está com ele
        leads[2].assigned_to = Some(team[0]);

        let plan = plan_round_robin(&leads, &team);

        assert_eq!(plan[2].outcome, BatchOutcome::Skipped);
        assert_eq!(plan[2].reason, Some("already_with_target"));
        let assigned = plan
            .iter()
            .filter(|o| o.outcome == BatchOutcome::Assigned)
            .count();
        assert_eq!(assigned, 3);
    }

    #[test]
    fn capped_never_exceeds_per_employee_cap() {
        let leads = candidates(7);
        let team: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();

        let plan = plan_capped(&leads, &team, 2);

        let mut per_employee: HashMap<Uuid, usize> = HashMap::new();
        for o in plan.iter().filter(|o| o.outcome == BatchOutcome::Assigned) {
            *per_employee.entry(o.employee_id.unwrap()).or_default() += 1;
        }
        assert!(per_employee.values().all(|&n| n <= 2));

        // Orçamento 2 × 2 = 4; os 3 restantes saem como skipped
        let exhausted = plan
            .iter()
            .filter(|o| o.reason == Some("distribution_budget_exhausted"))
            .count();
        assert_eq!(exhausted, 3);
        assert_eq!(plan.len(), leads.len());
    }

    #[test]
    fn capped_with_zero_cap_assigns_nothing() {
        let leads = candidates(3);
        let team = vec![Uuid::new_v4()];

        let plan = plan_capped(&leads, &team, 0);

        assert!(plan.iter().all(|o| o.outcome == BatchOutcome::Skipped));
    }

    #[test]
    fn empty_team_skips_everything() {
        let leads = candidates(3);

        for plan in [plan_round_robin(&leads, &[]), plan_capped(&leads, &[], 5)] {
            assert_eq!(plan.len(), 3);
            assert!(plan
                .iter()
                .all(|o| o.reason == Some("no_eligible_employee")));
        }
    }

    #[test]
    fn candidate_order_puts_unassigned_first_then_oldest() {
        let creator = Uuid::new_v4();
        let mut a = lead_fixture(creator, Some(Uuid::new_v4()));
        let mut b = lead_fixture(creator, None);
        let mut c = lead_fixture(creator, None);

        // c é mais antigo que b; a (atribuído) é o mais antigo de todos
        a.created_at = a.created_at - Duration::days(3);
        c.created_at = c.created_at - Duration::days(2);
        b.created_at = b.created_at - Duration::days(1);

        let ordered = order_candidates(vec![a.clone(), b.clone(), c.clone()]);
        let ids: Vec<Uuid> = ordered.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }
}
