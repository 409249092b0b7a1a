use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::catalog;
use crate::error::{StoreResult, ValidationError};
use crate::models::{
    CompletionEvent, CompletionResponse, CompletionSubmission, CompletionSummary, EventKind,
    ScreeningResult,
};
use crate::recurrence::{compute_next_due, parse_date};
use crate::store::CompletionLog;

pub const FALLBACK_FREQUENCY: &str = "Annually";
pub const HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCompletion {
    pub screening_id: String,
    pub screening_name: String,
    pub completed_date: String,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub result: ScreeningResult,
    pub result_notes: Option<String>,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate(submission: CompletionSubmission) -> Result<ValidatedCompletion, ValidationError> {
    let screening_id = required(submission.screening_id, "screeningId")?;
    let screening_name = required(submission.screening_name, "screeningName")?;
    let completed_date = required(submission.completed_date, "completedDate")?;

    let follow_up_date = optional(submission.follow_up_date).and_then(|raw| {
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            tracing::warn!(
                screening_id = %screening_id,
                follow_up_date = %raw,
                "unreadable follow-up date dropped"
            );
        }
        parsed
    });

    Ok(ValidatedCompletion {
        screening_id,
        screening_name,
        completed_date,
        provider_id: optional(submission.provider_id),
        provider_name: optional(submission.provider_name),
        result: submission.result.unwrap_or_default(),
        result_notes: optional(submission.result_notes),
        follow_up_needed: submission.follow_up_needed.unwrap_or(false),
        follow_up_date,
    })
}

/// Current cadence for a screening id, or the yearly default when the id is
/// not in the catalog.
pub fn lookup_frequency(screening_id: &str) -> String {
    match catalog::find_by_id(screening_id) {
        Some(guideline) => guideline.frequency.to_string(),
        None => {
            tracing::warn!(
                screening_id,
                fallback = FALLBACK_FREQUENCY,
                "frequency lookup failed, using fallback cadence"
            );
            FALLBACK_FREQUENCY.to_string()
        }
    }
}

pub fn plan_events(
    user_id: Uuid,
    completion: &ValidatedCompletion,
    frequency: &str,
    now: DateTime<Utc>,
) -> Vec<CompletionEvent> {
    let next_due_date = compute_next_due(
        &completion.completed_date,
        frequency,
        Some(completion.result),
        completion.follow_up_date,
    );
    let has_result = completion.result != ScreeningResult::Pending;

    let base = CompletionEvent {
        id: Uuid::new_v4(),
        user_id,
        kind: EventKind::Completed,
        screening_id: completion.screening_id.clone(),
        screening_name: completion.screening_name.clone(),
        completed_date: completion.completed_date.clone(),
        provider_id: completion.provider_id.clone(),
        provider_name: completion.provider_name.clone(),
        result: ScreeningResult::Pending,
        result_notes: if has_result {
            None
        } else {
            completion.result_notes.clone()
        },
        follow_up_needed: completion.follow_up_needed,
        follow_up_date: completion.follow_up_date,
        next_due_date,
        frequency: frequency.to_string(),
        created_at: now,
    };

    let mut events = vec![base.clone()];
    if has_result {
        events.push(CompletionEvent {
            id: Uuid::new_v4(),
            kind: EventKind::ResultRecorded,
            result: completion.result,
            result_notes: completion.result_notes.clone(),
            ..base
        });
    }
    events
}

pub async fn record_completion<L: CompletionLog>(
    log: &L,
    user_id: Uuid,
    submission: CompletionSubmission,
) -> StoreResult<CompletionResponse> {
    let completion = validate(submission)?;
    let frequency = lookup_frequency(&completion.screening_id);
    let events = plan_events(user_id, &completion, &frequency, Utc::now());

    log.append_all(&events).await?;

    let next_due_date = events.first().and_then(|event| event.next_due_date);
    tracing::info!(
        %user_id,
        screening_id = %completion.screening_id,
        result = %completion.result,
        events = events.len(),
        next_due = ?next_due_date,
        "screening completion recorded"
    );

    let message = match next_due_date {
        Some(due) => format!("Screening marked as complete. Next due on {due}."),
        None => "Screening marked as complete. No further occurrence is scheduled.".to_string(),
    };

    Ok(CompletionResponse {
        completion: CompletionSummary {
            screening_id: completion.screening_id,
            screening_name: completion.screening_name,
            completed_date: completion.completed_date,
            result: completion.result,
            next_due_date,
            follow_up_needed: completion.follow_up_needed,
        },
        message,
    })
}

pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(HISTORY_LIMIT).clamp(1, HISTORY_LIMIT)
}

pub async fn completion_history<L: CompletionLog>(
    log: &L,
    user_id: Uuid,
    limit: Option<i64>,
) -> StoreResult<Vec<CompletionEvent>> {
    log.history(user_id, clamp_history_limit(limit)).await
}

/// Most recent event per screening, preserving newest-first order.
pub fn latest_by_screening(history: &[CompletionEvent]) -> Vec<&CompletionEvent> {
    let mut seen: Vec<&str> = Vec::new();
    let mut latest = Vec::new();
    for event in history {
        if seen.contains(&event.screening_id.as_str()) {
            continue;
        }
        seen.push(&event.screening_id);
        latest.push(event);
    }
    latest
}
