use crate::catalog::Guideline;
use crate::matcher::{self, is_colorectal};
use crate::models::{AgeRange, Recommendation};
use crate::risk::RiskProfile;

const EARLY_ONSET_CUTOFF: u32 = 50;
const YEARS_BEFORE_DIAGNOSIS: u32 = 10;
const ABSOLUTE_MIN_START: u32 = 25;
const FLOOR_START: u32 = 40;

pub fn build_recommendations(profile: &RiskProfile) -> Vec<Recommendation> {
    matcher::match_guidelines(profile)
        .into_iter()
        .map(|guideline| to_recommendation(guideline, profile))
        .collect()
}

pub fn to_recommendation(guideline: &Guideline, profile: &RiskProfile) -> Recommendation {
    let mut recommendation = Recommendation {
        id: guideline.id(),
        name: guideline.name.to_string(),
        description: guideline.description.to_string(),
        age_range: AgeRange {
            min: guideline.min_age,
            max: guideline.max_age,
        },
        gender: guideline.gender,
        frequency: guideline.frequency.to_string(),
        importance: guideline.grade.importance(),
        specialty_needed: guideline.specialty_needed.to_string(),
        risk_factors: guideline.risk_factors.iter().map(|s| s.to_string()).collect(),
        grade: guideline.grade,
    };

    if is_colorectal(guideline) {
        if let Some(start) = profile
            .earliest_family_diagnosis_age()
            .and_then(adjusted_colorectal_start)
        {
            recommendation.age_range.min = start;
            recommendation.description.push_str(&format!(
                " Based on your family history, screening should begin at age {start} \
                 (10 years before earliest family diagnosis, not before 25)."
            ));
        }
    }

    recommendation
}

/// Start age for colorectal screening after an early family diagnosis.
/// Returns `None` when the diagnosis was at or after 50.
pub fn adjusted_colorectal_start(earliest_diagnosis: u32) -> Option<u32> {
    if earliest_diagnosis >= EARLY_ONSET_CUTOFF {
        return None;
    }
    let before_diagnosis = earliest_diagnosis.saturating_sub(YEARS_BEFORE_DIAGNOSIS);
    Some(ABSOLUTE_MIN_START.max(before_diagnosis).max(FLOOR_START))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_by_id;
    use crate::models::{Gender, Grade, Importance};

    #[test]
    fn grades_map_to_importance() {
        let profile = RiskProfile::new(60, Gender::Male, ["smoker"]);
        let recommendations = build_recommendations(&profile);

        let lung = recommendations
            .iter()
            .find(|r| r.id == "lung-cancer-screening")
            .expect("lung screening");
        assert_eq!(lung.grade, Grade::B);
        assert_eq!(lung.importance, Importance::Recommended);

        let bp = recommendations
            .iter()
            .find(|r| r.id == "blood-pressure-screening")
            .expect("blood pressure screening");
        assert_eq!(bp.importance, Importance::Essential);

        let psa = recommendations
            .iter()
            .find(|r| r.id == "prostate-cancer-screening")
            .expect("prostate screening");
        assert_eq!(psa.importance, Importance::Routine);
    }

    #[test]
    fn start_age_formula_floors_at_forty() {
        assert_eq!(adjusted_colorectal_start(45), Some(40));
        assert_eq!(adjusted_colorectal_start(30), Some(40));
        assert_eq!(adjusted_colorectal_start(49), Some(40));
        assert_eq!(adjusted_colorectal_start(50), None);
        assert_eq!(adjusted_colorectal_start(0), Some(40));
    }

    #[test]
    fn early_family_diagnosis_adjusts_colorectal_instance_only() {
        let profile = RiskProfile::new(
            55,
            Gender::Female,
            [
                "family history colorectal cancer age < 50",
                "earliest family diagnosis age: 44",
            ],
        );
        let recommendations = build_recommendations(&profile);
        let high_risk = recommendations
            .iter()
            .find(|r| r.id == "colorectal-cancer-screening-high-risk")
            .expect("high risk tier");

        assert_eq!(high_risk.age_range.min, 40);
        assert!(high_risk.description.contains("begin at age 40"));
        assert!(high_risk
            .description
            .contains("10 years before earliest family diagnosis, not before 25"));

        let catalog_entry = find_by_id("colorectal-cancer-screening-high-risk").expect("catalog");
        assert_eq!(catalog_entry.min_age, 40);
        assert!(!catalog_entry.description.contains("begin at age"));

        let others_untouched = recommendations
            .iter()
            .filter(|r| !r.name.starts_with("Colorectal Cancer"))
            .all(|r| !r.description.contains("family history"));
        assert!(others_untouched);
    }

    #[test]
    fn late_family_diagnosis_leaves_description_alone() {
        let profile = RiskProfile::new(
            55,
            Gender::Male,
            ["earliest family diagnosis age: 62"],
        );
        let standard = build_recommendations(&profile)
            .into_iter()
            .find(|r| r.id == "colorectal-cancer-screening")
            .expect("standard tier");
        assert_eq!(standard.age_range.min, 45);
        assert_eq!(
            standard.description,
            "Average-risk screening by stool test, CT colonography, or colonoscopy."
        );
    }

    #[test]
    fn recommendations_serialize_with_camel_case_fields() {
        let profile = RiskProfile::new(30, Gender::Female, Vec::<String>::new());
        let json = serde_json::to_value(build_recommendations(&profile)).expect("json");
        let first = &json[0];
        assert!(first.get("ageRange").is_some());
        assert!(first.get("specialtyNeeded").is_some());
        assert!(first.get("riskFactors").is_some());
    }
}
