use std::fmt::Write;

use chrono::NaiveDate;

use crate::completion::latest_by_screening;
use crate::models::{CompletionEvent, Importance, Recommendation};
use crate::recurrence::due_status;
use crate::risk::{assess_risk_level, RiskProfile};

pub fn build_report(
    profile: &RiskProfile,
    recommendations: &[Recommendation],
    history: &[CompletionEvent],
    today: NaiveDate,
) -> String {
    let latest = latest_by_screening(history);
    let mut output = String::new();

    let _ = writeln!(output, "# Preventive Care Plan");
    let _ = writeln!(
        output,
        "Generated {} for age {} ({}), risk level {}",
        today,
        profile.age,
        profile.gender,
        assess_risk_level(profile).as_str()
    );
    if !profile.risk_factors.is_empty() {
        let _ = writeln!(output, "Risk factors: {}", profile.risk_factors.join(", "));
    }

    for importance in [
        Importance::Essential,
        Importance::Recommended,
        Importance::Routine,
    ] {
        let group: Vec<&Recommendation> = recommendations
            .iter()
            .filter(|r| r.importance == importance)
            .collect();
        if group.is_empty() {
            continue;
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## {} screenings", capitalize(importance.as_str()));
        for recommendation in group {
            let _ = writeln!(
                output,
                "- {} (ages {}-{}, {}): {}",
                recommendation.name,
                recommendation.age_range.min,
                recommendation.age_range.max,
                recommendation.frequency,
                recommendation.description
            );
        }
    }

    if recommendations.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No screenings match this profile.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Screening Schedule");

    if latest.is_empty() {
        let _ = writeln!(output, "No completed screenings recorded yet.");
    } else {
        for event in latest.iter() {
            let due = event
                .next_due_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                output,
                "- {}: completed {} ({}), next due {} [{}]",
                event.screening_name,
                event.completed_date,
                event.result,
                due,
                due_status(event.next_due_date, today).label()
            );
        }
    }

    let never_done: Vec<&Recommendation> = recommendations
        .iter()
        .filter(|r| !latest.iter().any(|event| event.screening_id == r.id))
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Not Yet Recorded");

    if never_done.is_empty() {
        let _ = writeln!(output, "Every recommended screening has a recorded completion.");
    } else {
        for recommendation in never_done {
            let _ = writeln!(
                output,
                "- {} ({})",
                recommendation.name, recommendation.specialty_needed
            );
        }
    }

    output
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::completion::{plan_events, validate};
    use crate::models::{CompletionSubmission, Gender, ScreeningResult};
    use crate::recommend::build_recommendations;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    #[test]
    fn report_lists_groups_schedule_and_gaps() {
        let profile = RiskProfile::new(52, Gender::Male, ["smoker"]);
        let recommendations = build_recommendations(&profile);
        let completion = validate(CompletionSubmission {
            screening_id: Some("blood-pressure-screening".to_string()),
            screening_name: Some("Blood Pressure Screening".to_string()),
            completed_date: Some("2023-05-20".to_string()),
            result: Some(ScreeningResult::Normal),
            ..Default::default()
        })
        .expect("valid");
        let mut history = plan_events(Uuid::new_v4(), &completion, "Annually", Utc::now());
        history.reverse();

        let report = build_report(&profile, &recommendations, &history, today());

        assert!(report.starts_with("# Preventive Care Plan"));
        assert!(report.contains("risk level elevated"));
        assert!(report.contains("## Essential screenings"));
        assert!(report.contains("## Recommended screenings"));
        assert!(report.contains(
            "- Blood Pressure Screening: completed 2023-05-20 (normal), next due 2024-05-20 [overdue]"
        ));
        assert!(report.contains("- Lung Cancer Screening (Pulmonology)"));
        assert!(!report.contains("- Blood Pressure Screening (Primary Care)"));
    }

    #[test]
    fn empty_history_is_reported() {
        let profile = RiskProfile::new(30, Gender::Female, Vec::<String>::new());
        let report = build_report(&profile, &build_recommendations(&profile), &[], today());
        assert!(report.contains("No completed screenings recorded yet."));
        assert!(report.contains("risk level average"));
    }
}
