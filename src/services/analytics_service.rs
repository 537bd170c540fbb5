// src/services/analytics_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, PipelineRepository},
    models::{
        analytics::{AnalyticsSummary, DistributionBucket, StageBucket},
        auth::{Role, User},
        lead::{Lead, LeadStatus},
        pipeline::PipelineStage,
    },
    services::authorization::AuthorizationService,
};

// Ordem fixa das linhas de status no dashboard (inclui grupos zerados —
// o frontend gosta de linhas estáveis).
const STATUS_ORDER: [LeadStatus; 7] = [
    LeadStatus::New,
    LeadStatus::Interested,
    LeadStatus::Hot,
    LeadStatus::FollowUp,
    LeadStatus::Won,
    LeadStatus::Lost,
    LeadStatus::Dead,
];

// =============================================================================
//  PROJEÇÃO (pura)
// =============================================================================

// Dobra o conjunto de leads em distribuições por status, setor, região e
// etapa de funil. Recalculada sob demanda, nada incremental. Valores
// ausentes caem em chaves explícitas ("Unknown"/"Unstaged") em vez de
// estourar.
pub fn summarize(leads: &[Lead], all_stages: &[PipelineStage]) -> AnalyticsSummary {
    let mut by_status: HashMap<LeadStatus, (u64, Decimal)> = HashMap::new();
    let mut by_sector: HashMap<String, (u64, Decimal)> = HashMap::new();
    let mut by_region: HashMap<String, (u64, Decimal)> = HashMap::new();
    // etapa -> (contagem, receita, receita ponderada)
    let mut by_stage: HashMap<String, (u64, Decimal, Decimal)> = HashMap::new();

    let mut stages_by_pipeline: HashMap<Uuid, Vec<&PipelineStage>> = HashMap::new();
    for stage in all_stages {
        stages_by_pipeline
            .entry(stage.pipeline_id)
            .or_default()
            .push(stage);
    }

    for lead in leads {
        let revenue = lead.selling_price.unwrap_or(Decimal::ZERO);

        let status_entry = by_status.entry(lead.status).or_default();
        status_entry.0 += 1;
        status_entry.1 += revenue;

        let sector_entry = by_sector.entry(lead.sector.as_str().to_string()).or_default();
        sector_entry.0 += 1;
        sector_entry.1 += revenue;

        let region_key = lead
            .region
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let region_entry = by_region.entry(region_key).or_default();
        region_entry.0 += 1;
        region_entry.1 += revenue;

        // Etapa = nome de estágio do funil do lead que casa com o texto
        // do status. Lead sem funil fica fora deste agrupamento.
        if let Some(pipeline_id) = lead.pipeline_id {
            let matched = stages_by_pipeline
                .get(&pipeline_id)
                .and_then(|stages| {
                    stages
                        .iter()
                        .find(|s| s.name == lead.status.as_str())
                        .copied()
                });

            let (key, probability) = match matched {
                Some(stage) => (stage.name.clone(), stage.probability),
                None => ("Unstaged".to_string(), 0),
            };

            let weighted = revenue * Decimal::from(probability) / Decimal::ONE_HUNDRED;
            let entry = by_stage.entry(key).or_default();
            entry.0 += 1;
            entry.1 += revenue;
            entry.2 += weighted;
        }
    }

    let by_status = STATUS_ORDER
        .iter()
        .map(|status| {
            let (count, revenue) = by_status.get(status).copied().unwrap_or_default();
            DistributionBucket {
                key: status.as_str().to_string(),
                count,
                revenue,
            }
        })
        .collect();

    AnalyticsSummary {
        total_leads: leads.len() as u64,
        by_status,
        by_sector: sorted_buckets(by_sector),
        by_region: sorted_buckets(by_region),
        by_stage: sorted_stage_buckets(by_stage),
    }
}

// Maiores grupos primeiro; chave como desempate determinístico
fn sorted_buckets(groups: HashMap<String, (u64, Decimal)>) -> Vec<DistributionBucket> {
    let mut buckets: Vec<DistributionBucket> = groups
        .into_iter()
        .map(|(key, (count, revenue))| DistributionBucket { key, count, revenue })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    buckets
}

fn sorted_stage_buckets(groups: HashMap<String, (u64, Decimal, Decimal)>) -> Vec<StageBucket> {
    let mut buckets: Vec<StageBucket> = groups
        .into_iter()
        .map(|(stage, (count, revenue, weighted_revenue))| StageBucket {
            stage,
            count,
            revenue,
            weighted_revenue,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.stage.cmp(&b.stage)));
    buckets
}

// =============================================================================
//  ORQUESTRAÇÃO
// =============================================================================

#[derive(Clone)]
pub struct AnalyticsService {
    lead_repo: LeadRepository,
    pipeline_repo: PipelineRepository,
    authz: AuthorizationService,
}

impl AnalyticsService {
    pub fn new(
        lead_repo: LeadRepository,
        pipeline_repo: PipelineRepository,
        authz: AuthorizationService,
    ) -> Self {
        Self {
            lead_repo,
            pipeline_repo,
            authz,
        }
    }

    // O dashboard enxerga o mesmo escopo que a listagem de leads do ator.
    pub async fn summary(&self, actor: &User) -> Result<AnalyticsSummary, AppError> {
        let leads = match actor.role {
            Role::Admin => self.lead_repo.list_all().await?,
            Role::Manager => {
                let team_ids = self.authz.team_ids(actor.id).await?;
                self.lead_repo.list_for_manager(actor.id, &team_ids).await?
            }
            Role::Employee => self.lead_repo.list_for_employee(actor.id).await?,
        };

        let stages = self.pipeline_repo.list_all_stages().await?;

        Ok(summarize(&leads, &stages))
    }
}

// =============================================================================
//  TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::models::lead::{LeadStatus, Region, Sector};
    use crate::models::pipeline::PipelineStage;
    use crate::services::testutil::{lead_fixture, lead_with_status};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn missing_region_buckets_as_unknown() {
        let creator = Uuid::new_v4();
        let mut with_region = lead_fixture(creator, None);
        with_region.region = Some(Region::North);
        let without_region = lead_fixture(creator, None);

        let summary = summarize(&[with_region, without_region], &[]);

        let unknown = summary
            .by_region
            .iter()
            .find(|b| b.key == "Unknown")
            .expect("balde Unknown presente");
        assert_eq!(unknown.count, 1);
    }

    #[test]
    fn status_rows_are_stable_and_revenue_follows_won() {
        let creator = Uuid::new_v4();
        let mut won = lead_with_status(creator, None, LeadStatus::Won);
        won.selling_price = Some(Decimal::from(1200));
        let hot = lead_with_status(creator, None, LeadStatus::Hot);

        let summary = summarize(&[won, hot], &[]);

        // Sempre as 7 linhas, na ordem do ciclo de vida
        let keys: Vec<&str> = summary.by_status.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["New", "Interested", "Hot", "Follow-up", "Won", "Lost", "Dead"]
        );

        let won_row = summary.by_status.iter().find(|b| b.key == "Won").unwrap();
        assert_eq!(won_row.count, 1);
        assert_eq!(won_row.revenue, Decimal::from(1200));

        let new_row = summary.by_status.iter().find(|b| b.key == "New").unwrap();
        assert_eq!(new_row.count, 0);
    }

    #[test]
    fn sector_defaults_to_other() {
        let lead = lead_fixture(Uuid::new_v4(), None);
        assert_eq!(lead.sector, Sector::Other);

        let summary = summarize(&[lead], &[]);
        assert_eq!(summary.by_sector[0].key, "Other");
        assert_eq!(summary.by_sector[0].count, 1);
    }

    #[test]
    fn stage_bucketing_matches_status_text_and_weights_revenue() {
        let pipeline_id = Uuid::new_v4();
        let stages = vec![
            PipelineStage {
                id: Uuid::new_v4(),
                pipeline_id,
                name: "Hot".to_string(),
                position: 1,
                probability: 60,
            },
            PipelineStage {
                id: Uuid::new_v4(),
                pipeline_id,
                name: "Won".to_string(),
                position: 2,
                probability: 100,
            },
        ];

        let creator = Uuid::new_v4();
        let mut won = lead_with_status(creator, None, LeadStatus::Won);
        won.pipeline_id = Some(pipeline_id);
        won.selling_price = Some(Decimal::from(1000));

        // Status sem etapa correspondente no funil -> "Unstaged"
        let mut interested = lead_with_status(creator, None, LeadStatus::Interested);
        interested.pipeline_id = Some(pipeline_id);

        // Sem funil: fora do agrupamento por etapa
        let no_pipeline = lead_with_status(creator, None, LeadStatus::Hot);

        let summary = summarize(&[won, interested, no_pipeline], &stages);

        let won_stage = summary.by_stage.iter().find(|b| b.stage == "Won").unwrap();
        assert_eq!(won_stage.count, 1);
        assert_eq!(won_stage.weighted_revenue, Decimal::from(1000));

        let unstaged = summary
            .by_stage
            .iter()
            .find(|b| b.stage == "Unstaged")
            .unwrap();
        assert_eq!(unstaged.count, 1);

        assert!(summary.by_stage.iter().all(|b| b.stage != "Hot"));
    }
}
