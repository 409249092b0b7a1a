use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::frequency::{frequency_to_months, NO_RECURRENCE};
use crate::models::ScreeningResult;

pub const ABNORMAL_FLOOR_MONTHS: u32 = 6;

pub const DUE_SOON_DAYS: i64 = 30;

/// Accepts `YYYY-MM-DD` or a timestamp, with or without an offset, whose date
/// part is used.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|timestamp| timestamp.date())
        })
}

pub fn interval_for_result(interval: u32, result: Option<ScreeningResult>) -> u32 {
    match result {
        Some(ScreeningResult::Abnormal) => (interval / 2).max(ABNORMAL_FLOOR_MONTHS),
        _ => interval,
    }
}

/// `None` means the screening does not recur, or the completion date could
/// not be read.
pub fn compute_next_due(
    completed_date: &str,
    frequency: &str,
    result: Option<ScreeningResult>,
    follow_up_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    if result == Some(ScreeningResult::Abnormal) {
        if let Some(follow_up) = follow_up_date {
            return Some(follow_up);
        }
    }

    let interval = frequency_to_months(frequency);
    if interval == NO_RECURRENCE {
        return None;
    }

    let Some(completed) = parse_date(completed_date) else {
        tracing::warn!(completed_date, "unparseable completion date, next due left empty");
        return None;
    };

    let months = interval_for_result(interval, result);
    completed.checked_add_months(Months::new(months))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Upcoming,
    NoRecurrence,
}

impl DueStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DueStatus::Overdue => "overdue",
            DueStatus::DueSoon => "due soon",
            DueStatus::Upcoming => "upcoming",
            DueStatus::NoRecurrence => "no recurrence",
        }
    }
}

pub fn due_status(next_due: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    match next_due {
        None => DueStatus::NoRecurrence,
        Some(due) if due < today => DueStatus::Overdue,
        Some(due) if (due - today).num_days() <= DUE_SOON_DAYS => DueStatus::DueSoon,
        Some(_) => DueStatus::Upcoming,
    }
}
