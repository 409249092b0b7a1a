use crate::catalog::{
    self, Guideline, COLORECTAL_FAMILY, COLORECTAL_HIGH_RISK, COLORECTAL_MODERATE_RISK,
    COLORECTAL_PERSONAL_HISTORY, LYNCH_FAMILY, LYNCH_SUSPECTED,
};
use crate::models::Gender;
use crate::risk::RiskProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorectalTier {
    HighRisk,
    ModerateRisk,
    PersonalHistory,
    Standard,
}

impl ColorectalTier {
    pub fn from_name(name: &str) -> Self {
        if name.contains("High Risk") {
            ColorectalTier::HighRisk
        } else if name.contains("Moderate Risk") {
            ColorectalTier::ModerateRisk
        } else if name.contains("Personal History") {
            ColorectalTier::PersonalHistory
        } else {
            ColorectalTier::Standard
        }
    }

    fn triggers(&self) -> &'static [&'static str] {
        match self {
            ColorectalTier::HighRisk => COLORECTAL_HIGH_RISK,
            ColorectalTier::ModerateRisk => COLORECTAL_MODERATE_RISK,
            ColorectalTier::PersonalHistory => COLORECTAL_PERSONAL_HISTORY,
            ColorectalTier::Standard => &[],
        }
    }

    fn applies_to(&self, profile: &RiskProfile) -> bool {
        match self {
            // Any elevated-risk trigger moves the caller off the standard tier.
            ColorectalTier::Standard => !has_elevated_colorectal_risk(profile),
            tier => profile.has_any(tier.triggers()),
        }
    }
}

pub fn is_colorectal(guideline: &Guideline) -> bool {
    guideline.name.starts_with(COLORECTAL_FAMILY)
}

fn is_lynch(guideline: &Guideline) -> bool {
    guideline.name.starts_with(LYNCH_FAMILY)
}

pub fn has_elevated_colorectal_risk(profile: &RiskProfile) -> bool {
    [
        COLORECTAL_HIGH_RISK,
        COLORECTAL_MODERATE_RISK,
        COLORECTAL_PERSONAL_HISTORY,
        LYNCH_SUSPECTED,
    ]
    .iter()
    .any(|tokens| profile.has_any(tokens))
}

/// Loose comparison of a caller token against a guideline token: exact
/// match or containment in either direction, ignoring case.
pub fn tokens_match(caller: &str, guideline: &str) -> bool {
    let caller = caller.trim().to_lowercase();
    let guideline = guideline.trim().to_lowercase();
    if caller.is_empty() || guideline.is_empty() {
        return false;
    }
    caller == guideline || caller.contains(&guideline) || guideline.contains(&caller)
}

fn passes_base_filter(guideline: &Guideline, profile: &RiskProfile) -> bool {
    let gender_ok = guideline.gender == Gender::All || guideline.gender == profile.gender;
    let age_ok = guideline.min_age <= profile.age && profile.age <= guideline.max_age;
    gender_ok && age_ok
}

fn passes_risk_filter(guideline: &Guideline, profile: &RiskProfile) -> bool {
    if is_colorectal(guideline) {
        return ColorectalTier::from_name(guideline.name).applies_to(profile);
    }
    if is_lynch(guideline) {
        return profile.has_any(LYNCH_SUSPECTED);
    }
    if guideline.is_universal() {
        return true;
    }
    if profile.risk_factors.is_empty() {
        return false;
    }

    profile.risk_factors.iter().any(|factor| {
        guideline
            .risk_factors
            .iter()
            .any(|token| tokens_match(factor, token))
    })
}

pub fn match_guidelines(profile: &RiskProfile) -> Vec<&'static Guideline> {
    catalog::all_guidelines()
        .iter()
        .filter(|guideline| passes_base_filter(guideline, profile))
        .filter(|guideline| passes_risk_filter(guideline, profile))
        .collect()
}
