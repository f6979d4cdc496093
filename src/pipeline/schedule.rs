//! Treatment date handling: parsing form dates and deriving the S2
//! follow-up schedule around the surgery date.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Accepted input formats, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Pre-operative consultation happens two weeks before surgery.
const PRE_OP_OFFSET_DAYS: i64 = -14;

/// Post-operative follow-up offsets (days after surgery) with their labels.
const FOLLOW_UP_OFFSETS: &[(&str, i64)] = &[
    ("1 month", 30),
    ("6 months", 180),
    ("1 year", 365),
    ("2 years", 730),
];

/// Parse a date as entered on the form. ISO timestamps are cut to their date part.
pub fn parse_clinical_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let candidate = trimmed.get(..10).filter(|_| trimmed.contains('T')).unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}

/// `DD/MM/YYYY`, the format used on NHS correspondence.
pub fn format_uk_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Month and year, e.g. "March 2025".
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Dates of the planned pre-operative, surgical and follow-up visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpSchedule {
    pub pre_op_consultation: NaiveDate,
    pub surgery: NaiveDate,
    pub follow_ups: Vec<(&'static str, NaiveDate)>,
}

impl FollowUpSchedule {
    /// Schedule around `surgery`, `None` when any visit falls outside the
    /// representable calendar.
    pub fn from_surgery(surgery: NaiveDate) -> Option<Self> {
        let offset = |days: i64| surgery.checked_add_signed(Duration::days(days));
        let follow_ups = FOLLOW_UP_OFFSETS
            .iter()
            .map(|(label, days)| offset(*days).map(|date| (*label, date)))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            pre_op_consultation: offset(PRE_OP_OFFSET_DAYS)?,
            surgery,
            follow_ups,
        })
    }

    /// Schedule for a raw form date, `None` if it does not parse or is out of range.
    pub fn from_raw(raw: &str) -> Option<Self> {
        parse_clinical_date(raw).and_then(Self::from_surgery)
    }

    /// Plain-text lines, one visit per line.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Pre-operative consultation: {}",
                format_uk_date(self.pre_op_consultation)
            ),
            format!("Surgery: {}", format_uk_date(self.surgery)),
        ];
        lines.extend(
            self.follow_ups
                .iter()
                .map(|(label, date)| format!("Follow-up at {label}: {}", format_uk_date(*date))),
        );
        lines
    }
}
