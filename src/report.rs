use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::models::{
    CampaignCard, CampaignResponse, CampaignRow, CampaignTable, CurrentMetrics, ImpressionCpm,
    PerformanceMetrics, VolumeUnitCostTrend,
};
use crate::params::{ReportWindow, DATE_FORMAT};

const RANGE_FORMAT: &str = "%d %B %Y";
const ALL_CAMPAIGNS: &str = "All";

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRollup {
    pub campaign_id: String,
    pub campaign_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub effectiveness: f64,
    pub media: f64,
    pub creative: f64,
}

pub fn current_metrics(rows: &[CampaignRow]) -> CurrentMetrics {
    let mut metrics = CurrentMetrics::default();
    let mut views = 0.0_f64;

    for row in rows {
        metrics.impressions += row.impressions;
        metrics.clicks += row.clicks;
        views += row.views as f64;
    }

    // truncated once, on the final sum
    metrics.views = views as i64;
    metrics
}

/// Builds the per-day series. Rows sharing a date overwrite each other in
/// slice order, so the last row for a date wins.
pub fn daily_trend(rows: &[CampaignRow]) -> ImpressionCpm {
    let mut trend = ImpressionCpm::default();

    for row in rows {
        let key = row.date.format(DATE_FORMAT).to_string();
        trend.impression.insert(key.clone(), row.impressions);
        trend.cpm.insert(key, row.cpm);
    }

    trend
}

/// Groups rows by campaign id, preserving the order in which each campaign
/// first appears.
pub fn rollup_by_campaign(rows: &[CampaignRow]) -> Vec<CampaignRollup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<CampaignRollup> = Vec::new();

    for row in rows {
        let position = *index.entry(row.campaign_id.as_str()).or_insert_with(|| {
            rollups.push(CampaignRollup {
                campaign_id: row.campaign_id.clone(),
                campaign_name: row.campaign_name.clone(),
                start_date: row.date,
                end_date: row.date,
                effectiveness: 0.0,
                media: 0.0,
                creative: 0.0,
            });
            rollups.len() - 1
        });

        let entry = &mut rollups[position];
        entry.start_date = entry.start_date.min(row.date);
        entry.end_date = entry.end_date.max(row.date);
        entry.effectiveness += row.effectiveness;
        entry.media += row.media;
        entry.creative += row.creative;
    }

    rollups
}

pub fn campaign_table(rollups: &[CampaignRollup]) -> CampaignTable {
    let mut table = CampaignTable::default();

    for rollup in rollups {
        table
            .start_date
            .push(rollup.start_date.format(DATE_FORMAT).to_string());
        table
            .end_date
            .push(rollup.end_date.format(DATE_FORMAT).to_string());
        table.adin_id.push(rollup.campaign_id.clone());
        table.campaign.push(rollup.campaign_name.clone());
        table.effectiveness.push(rollup.effectiveness);
        table.media.push(rollup.media);
        table.creative.push(rollup.creative);
    }

    table
}

pub fn format_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format(RANGE_FORMAT), end.format(RANGE_FORMAT))
}

/// Assembles the full report for `rows`, which must already be filtered to
/// `window`. A campaign filter with no matching rows is reported as
/// [`ApiError::NoData`].
pub fn build_response(
    window: &ReportWindow,
    rows: &[CampaignRow],
) -> Result<CampaignResponse, ApiError> {
    let campaign_name = match window.campaign_id.as_deref() {
        Some(campaign_id) => rows
            .first()
            .map(|row| row.campaign_name.clone())
            .ok_or_else(|| ApiError::NoData {
                campaign_id: campaign_id.to_string(),
                start_date: window.start_date,
                end_date: window.end_date,
            })?,
        None => ALL_CAMPAIGNS.to_string(),
    };

    let rollups = rollup_by_campaign(rows);

    Ok(CampaignResponse {
        campaign_card: CampaignCard {
            campaign_name,
            range: format_range(window.start_date, window.end_date),
            days: (window.end_date - window.start_date).num_days(),
        },
        performance_metrics: PerformanceMetrics {
            current_metrics: current_metrics(rows),
        },
        volume_unit_cost_trend: VolumeUnitCostTrend {
            impressions_cpm: daily_trend(rows),
        },
        campaign_table: campaign_table(&rollups),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(campaign_id: &str, name: &str, day: NaiveDate, impressions: i64) -> CampaignRow {
        CampaignRow {
            campaign_id: campaign_id.to_string(),
            campaign_name: name.to_string(),
            views: 10,
            impressions,
            cpm: 2.0,
            clicks: 5,
            media: 1.0,
            creative: 2.0,
            effectiveness: 3.0,
            date: day,
        }
    }

    fn window(campaign_id: Option<&str>, start: NaiveDate, end: NaiveDate) -> ReportWindow {
        ReportWindow {
            campaign_id: campaign_id.map(str::to_string),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn single_row_report_matches_expected_shape() {
        let day = date(2023, 1, 1);
        let rows = vec![row("A", "Alpha", day, 100)];
        let response = build_response(&window(None, day, day), &rows).unwrap();

        assert_eq!(response.campaign_card.campaign_name, "All");
        assert_eq!(response.campaign_card.range, "01 January 2023 - 01 January 2023");
        assert_eq!(response.campaign_card.days, 0);
        assert_eq!(
            response.performance_metrics.current_metrics,
            CurrentMetrics {
                impressions: 100,
                clicks: 5,
                views: 10
            }
        );

        let trend = &response.volume_unit_cost_trend.impressions_cpm;
        assert_eq!(trend.impression.get("2023-01-01"), Some(&100));
        assert_eq!(trend.cpm.get("2023-01-01"), Some(&2.0));

        let table = &response.campaign_table;
        assert_eq!(table.start_date, vec!["2023-01-01"]);
        assert_eq!(table.end_date, vec!["2023-01-01"]);
        assert_eq!(table.adin_id, vec!["A"]);
        assert_eq!(table.campaign, vec!["Alpha"]);
        assert_eq!(table.effectiveness, vec![3.0]);
        assert_eq!(table.media, vec![1.0]);
        assert_eq!(table.creative, vec![2.0]);
    }

    #[test]
    fn totals_track_single_row_delta() {
        let mut rows = vec![
            row("A", "Alpha", date(2023, 1, 1), 100),
            row("B", "Beta", date(2023, 1, 2), 250),
        ];
        let before = current_metrics(&rows).impressions;
        rows[1].impressions += 42;
        assert_eq!(current_metrics(&rows).impressions, before + 42);
    }

    #[test]
    fn views_truncate_after_summing() {
        let rows = vec![
            row("A", "Alpha", date(2023, 1, 1), 1),
            row("A", "Alpha", date(2023, 1, 2), 1),
        ];
        assert_eq!(current_metrics(&rows).views, 20);
    }

    #[test]
    fn trend_keeps_last_row_per_date() {
        let day = date(2023, 3, 20);
        let mut first = row("A", "Alpha", day, 100);
        first.cpm = 1.5;
        let mut second = row("B", "Beta", day, 300);
        second.cpm = 4.25;

        let trend = daily_trend(&[first, second]);
        assert_eq!(trend.impression.len(), 1);
        assert_eq!(trend.impression.get("2023-03-20"), Some(&300));
        assert_eq!(trend.cpm.get("2023-03-20"), Some(&4.25));
    }

    #[test]
    fn rollup_tracks_min_max_and_sums_in_first_seen_order() {
        let rows = vec![
            row("B", "Beta", date(2023, 1, 5), 1),
            row("A", "Alpha", date(2023, 1, 3), 1),
            row("B", "Beta", date(2023, 1, 2), 1),
            row("B", "Beta", date(2023, 1, 9), 1),
        ];
        let rollups = rollup_by_campaign(&rows);

        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].campaign_id, "B");
        assert_eq!(rollups[0].start_date, date(2023, 1, 2));
        assert_eq!(rollups[0].end_date, date(2023, 1, 9));
        assert!((rollups[0].effectiveness - 9.0).abs() < 1e-9);
        assert!((rollups[0].media - 3.0).abs() < 1e-9);
        assert!((rollups[0].creative - 6.0).abs() < 1e-9);
        assert_eq!(rollups[1].campaign_id, "A");
        assert_eq!(rollups[1].start_date, date(2023, 1, 3));
    }

    #[test]
    fn table_names_stay_aligned_with_groups() {
        let rows = vec![
            row("A", "Shared", date(2023, 1, 1), 1),
            row("B", "Shared", date(2023, 1, 1), 1),
        ];
        let table = campaign_table(&rollup_by_campaign(&rows));
        assert_eq!(table.adin_id.len(), table.campaign.len());
        assert_eq!(table.campaign, vec!["Shared", "Shared"]);
    }

    #[test]
    fn filtered_report_uses_campaign_name() {
        let rows = vec![
            row("A", "Crypto Analysis", date(2023, 3, 20), 6167),
            row("A", "Crypto Analysis", date(2023, 3, 21), 8439),
        ];
        let response =
            build_response(&window(Some("A"), date(2023, 3, 20), date(2023, 3, 30)), &rows)
                .unwrap();
        assert_eq!(response.campaign_card.campaign_name, "Crypto Analysis");
        assert_eq!(response.campaign_card.days, 10);
        assert_eq!(response.campaign_table.adin_id, vec!["A"]);
    }

    #[test]
    fn filtered_report_without_rows_is_no_data() {
        let err = build_response(&window(Some("Z"), date(2023, 1, 1), date(2023, 1, 31)), &[])
            .unwrap_err();
        assert!(matches!(err, ApiError::NoData { ref campaign_id, .. } if campaign_id == "Z"));
    }

    #[test]
    fn unfiltered_empty_report_is_zeroed() {
        let response =
            build_response(&window(None, date(2023, 1, 1), date(2023, 12, 31)), &[]).unwrap();
        assert_eq!(response.campaign_card.campaign_name, "All");
        assert_eq!(response.campaign_card.days, 364);
        assert_eq!(response.performance_metrics.current_metrics, CurrentMetrics::default());
        assert!(response.volume_unit_cost_trend.impressions_cpm.impression.is_empty());
        assert!(response.campaign_table.adin_id.is_empty());
    }

    #[test]
    fn inverted_range_reports_negative_days() {
        let response =
            build_response(&window(None, date(2023, 1, 10), date(2023, 1, 1)), &[]).unwrap();
        assert_eq!(response.campaign_card.days, -9);
        assert_eq!(response.campaign_card.range, "10 January 2023 - 01 January 2023");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let day = date(2023, 1, 1);
        let response =
            build_response(&window(None, day, day), &[row("A", "Alpha", day, 100)]).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["campaignCard"]["campaignName"], "All");
        assert_eq!(value["performanceMetrics"]["currentMetrics"]["impressions"], 100);
        assert_eq!(
            value["volumeUnitCostTrend"]["impressionsCpm"]["impression"]["2023-01-01"],
            100
        );
        assert_eq!(value["campaignTable"]["adin_id"][0], "A");
    }
}
