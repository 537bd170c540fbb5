// src/models/analytics.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Um agrupamento do dashboard: contagem + receita (soma de sellingPrice
// dos leads do grupo que a possuem).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    #[schema(example = "Hot")]
    pub key: String,
    pub count: u64,
    #[schema(value_type = f64, example = 4500.0)]
    pub revenue: Decimal,
}

// Agrupamento por etapa de funil, com a receita ponderada pela
// probabilidade configurada na etapa.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageBucket {
    pub stage: String,
    pub count: u64,
    #[schema(value_type = f64)]
    pub revenue: Decimal,
    #[schema(value_type = f64)]
    pub weighted_revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_leads: u64,
    pub by_status: Vec<DistributionBucket>,
    pub by_sector: Vec<DistributionBucket>,
    pub by_region: Vec<DistributionBucket>,
    pub by_stage: Vec<StageBucket>,
}
