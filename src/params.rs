use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query string of `GET /campaigns/` as received. Required fields are optional
/// here so a missing value surfaces as a validation error naming the field.
#[derive(Debug, Default, Deserialize)]
pub struct CampaignQuery {
    pub campaign_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub campaign_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportWindow {
    /// Validates the raw query. `end_date` before `start_date` is accepted.
    pub fn from_query(query: CampaignQuery) -> Result<Self, ApiError> {
        let start_date = parse_date("start_date", query.start_date.as_deref())?;
        let end_date = parse_date("end_date", query.end_date.as_deref())?;
        let campaign_id = query.campaign_id.filter(|id| !id.is_empty());

        Ok(Self {
            campaign_id,
            start_date,
            end_date,
        })
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, ApiError> {
    let value =
        value.ok_or_else(|| ApiError::invalid(field, format!("Field '{field}' is required.")))?;
    let malformed = || {
        ApiError::invalid(
            field,
            format!("Date '{value}' is not in the required format 'YYYY-MM-DD'."),
        )
    };
    // chrono skips leading whitespace and accepts a signed year
    if !value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| malformed())
}
