use anyhow::Context;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::config::Settings;
use crate::models::{CampaignRow, DailyCampaign, DailyScore};

pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let fixtures = vec![
        (
            "36963290188b",
            "Crypto Analysis",
            [
                (20, 1_204, 6_167, 315.43, 71, 50.0, 48.0, 64.0),
                (21, 1_530, 8_439, 249.44, 96, 52.0, 50.0, 61.0),
                (22, 987, 5_212, 281.10, 58, 47.0, 46.0, 66.0),
            ],
        ),
        (
            "f9bedbbf3c17d",
            "Future Vision",
            [
                (20, 2_310, 12_904, 198.72, 140, 77.0, 88.0, 54.0),
                (21, 2_045, 11_377, 205.30, 121, 74.0, 85.0, 57.0),
                (23, 1_876, 9_861, 221.95, 103, 79.0, 90.0, 52.0),
            ],
        ),
    ];

    let mut inserted = 0usize;
    for (campaign_id, campaign_name, days) in fixtures {
        for (day, views, impressions, cpm, clicks, effectiveness, media, creative) in days {
            let date = NaiveDate::from_ymd_opt(2023, 3, day).context("invalid date")?;
            upsert_campaign(
                pool,
                &DailyCampaign {
                    campaign_id: campaign_id.to_string(),
                    campaign_name: campaign_name.to_string(),
                    views,
                    impressions,
                    cpm,
                    clicks,
                    date,
                },
            )
            .await?;
            upsert_score(
                pool,
                &DailyScore {
                    campaign_id: campaign_id.to_string(),
                    media,
                    creative,
                    effectiveness,
                    date,
                },
            )
            .await?;
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn upsert_campaign(pool: &PgPool, campaign: &DailyCampaign) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tbl_daily_campaigns
        (campaign_id, campaign_name, views, impressions, cpm, clicks, date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (campaign_id, date) DO UPDATE
        SET campaign_name = EXCLUDED.campaign_name,
            views = EXCLUDED.views,
            impressions = EXCLUDED.impressions,
            cpm = EXCLUDED.cpm,
            clicks = EXCLUDED.clicks
        "#,
    )
    .bind(&campaign.campaign_id)
    .bind(&campaign.campaign_name)
    .bind(campaign.views)
    .bind(campaign.impressions)
    .bind(campaign.cpm)
    .bind(campaign.clicks)
    .bind(campaign.date)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_score(pool: &PgPool, score: &DailyScore) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tbl_daily_scores
        (campaign_id, media, creative, effectiveness, date)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (campaign_id, date) DO UPDATE
        SET media = EXCLUDED.media,
            creative = EXCLUDED.creative,
            effectiveness = EXCLUDED.effectiveness
        "#,
    )
    .bind(&score.campaign_id)
    .bind(score.media)
    .bind(score.creative)
    .bind(score.effectiveness)
    .bind(score.date)
    .execute(pool)
    .await?;
    Ok(())
}

fn campaign_rows_query(filter_by_campaign: bool) -> String {
    let mut query = String::from(
        "SELECT dc.campaign_id, dc.campaign_name, dc.views, dc.impressions, dc.cpm, dc.clicks, \
         ds.media, ds.creative, ds.effectiveness, dc.date \
         FROM tbl_daily_campaigns dc \
         JOIN tbl_daily_scores ds \
         ON dc.campaign_id = ds.campaign_id AND dc.date = ds.date \
         WHERE dc.date BETWEEN $1 AND $2",
    );

    if filter_by_campaign {
        query.push_str(" AND dc.campaign_id = $3");
    }

    query.push_str(" ORDER BY dc.date, dc.campaign_id");
    query
}

/// Joined campaign/score rows with `start_date <= date <= end_date`, ordered
/// by date then campaign id. Holds one pooled connection for the call.
pub async fn fetch_campaign_rows(
    pool: &PgPool,
    start_date: NaiveDate,
    end_date: NaiveDate,
    campaign_id: Option<&str>,
) -> Result<Vec<CampaignRow>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let query = campaign_rows_query(campaign_id.is_some());

    let mut rows = sqlx::query(&query).bind(start_date).bind(end_date);
    if let Some(value) = campaign_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(&mut *conn).await?;
    let mut campaigns = Vec::with_capacity(records.len());

    for row in records {
        campaigns.push(CampaignRow {
            campaign_id: row.try_get("campaign_id")?,
            campaign_name: row.try_get("campaign_name")?,
            views: row.try_get("views")?,
            impressions: row.try_get("impressions")?,
            cpm: row.try_get("cpm")?,
            clicks: row.try_get("clicks")?,
            media: row.try_get("media")?,
            creative: row.try_get("creative")?,
            effectiveness: row.try_get("effectiveness")?,
            date: row.try_get("date")?,
        });
    }

    Ok(campaigns)
}
