use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct DailyCampaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub views: i64,
    pub impressions: i64,
    pub cpm: f64,
    pub clicks: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct DailyScore {
    pub campaign_id: String,
    pub media: f64,
    pub creative: f64,
    pub effectiveness: f64,
    pub date: NaiveDate,
}

/// One `tbl_daily_campaigns` row joined with its `tbl_daily_scores` row on
/// `(campaign_id, date)`.
#[derive(Debug, Clone)]
pub struct CampaignRow {
    pub campaign_id: String,
    pub campaign_name: String,
    pub views: i64,
    pub impressions: i64,
    pub cpm: f64,
    pub clicks: i64,
    pub media: f64,
    pub creative: f64,
    pub effectiveness: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub campaign_card: CampaignCard,
    pub performance_metrics: PerformanceMetrics,
    pub volume_unit_cost_trend: VolumeUnitCostTrend,
    pub campaign_table: CampaignTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCard {
    pub campaign_name: String,
    pub range: String,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub current_metrics: CurrentMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentMetrics {
    pub impressions: i64,
    pub clicks: i64,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeUnitCostTrend {
    pub impressions_cpm: ImpressionCpm,
}

/// Daily series keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpressionCpm {
    pub impression: BTreeMap<String, i64>,
    pub cpm: BTreeMap<String, f64>,
}

/// Column-oriented rollup, one entry per campaign in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignTable {
    pub start_date: Vec<String>,
    pub end_date: Vec<String>,
    pub adin_id: Vec<String>,
    pub campaign: Vec<String>,
    pub effectiveness: Vec<f64>,
    pub media: Vec<f64>,
    pub creative: Vec<f64>,
}
