//! Sales report handler (JSON or CSV)

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use shared::{DateRange, FieldError, FieldIssue, ValidationErrors};

use crate::error::AppResult;
use crate::services::reporting::{export_to_csv, report_rows};
use crate::AppState;

/// Days covered when no start date is given
const DEFAULT_REPORT_DAYS: i64 = 30;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

fn parse_param(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FieldError::new(field, FieldIssue::InvalidDate)),
    }
}

impl ReportQuery {
    /// End defaults to today, start to the 30 days ending there
    fn range(&self, today: NaiveDate) -> Result<DateRange, ValidationErrors> {
        let start = parse_param("start_date", self.start_date.as_deref());
        let end = parse_param("end_date", self.end_date.as_deref());

        match (start, end) {
            (Ok(start), Ok(end)) => {
                let end = end.unwrap_or(today);
                let start = match start {
                    Some(start) => start,
                    None => end
                        .checked_sub_signed(Duration::days(DEFAULT_REPORT_DAYS - 1))
                        .ok_or_else(|| {
                            ValidationErrors::single("end_date", FieldIssue::OutOfRange)
                        })?,
                };
                Ok(DateRange { start, end })
            }
            (start, end) => Err(ValidationErrors(
                [start.err(), end.err()].into_iter().flatten().collect(),
            )),
        }
    }
}

/// Per-day sales report over a date range
pub async fn get_sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let range = query.range(state.ledger.today())?;
    let report = state.ledger.range_report(range).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = export_to_csv(&report_rows(&report))?;
        let disposition = format!(
            "attachment; filename=\"sales_{}_{}.csv\"",
            report.start, report.end
        );
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}
