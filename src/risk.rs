use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::matcher::{has_elevated_colorectal_risk, tokens_match};
use crate::models::Gender;

const EARLIEST_DIAGNOSIS_PREFIX: &str = "earliest family diagnosis age";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub age: u32,
    pub gender: Gender,
    /// Lowercase, trimmed and deduplicated, in first-seen order.
    pub risk_factors: Vec<String>,
}

impl RiskProfile {
    pub fn new<I, S>(age: u32, gender: Gender, risk_factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            age,
            gender,
            risk_factors: normalize_risk_factors(risk_factors),
        }
    }

    pub fn has_any(&self, tokens: &[&str]) -> bool {
        self.risk_factors
            .iter()
            .any(|factor| tokens.contains(&factor.as_str()))
    }

    /// Youngest age at which a relative was diagnosed, when supplied as
    /// `earliest family diagnosis age: NN`.
    pub fn earliest_family_diagnosis_age(&self) -> Option<u32> {
        self.risk_factors
            .iter()
            .filter_map(|factor| parse_earliest_diagnosis(factor))
            .min()
    }
}

pub fn normalize_risk_factors<I, S>(risk_factors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for factor in risk_factors {
        let token = factor.as_ref().trim().to_lowercase();
        if token.is_empty() || normalized.contains(&token) {
            continue;
        }
        normalized.push(token);
    }
    normalized
}

fn parse_earliest_diagnosis(token: &str) -> Option<u32> {
    let rest = token.strip_prefix(EARLIEST_DIAGNOSIS_PREFIX)?;
    let digits: String = rest
        .trim_start_matches(|c: char| c == ':' || c == '=' || c.is_whitespace())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Average,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Average => "average",
            RiskLevel::Elevated => "elevated",
            RiskLevel::High => "high",
        }
    }
}

pub fn assess_risk_level(profile: &RiskProfile) -> RiskLevel {
    if has_elevated_colorectal_risk(profile) {
        return RiskLevel::High;
    }

    let matched = catalog::all_guidelines()
        .iter()
        .filter(|guideline| !guideline.is_universal())
        .any(|guideline| {
            guideline.risk_factors.iter().any(|token| {
                profile
                    .risk_factors
                    .iter()
                    .any(|factor| tokens_match(factor, token))
            })
        });

    if matched {
        RiskLevel::Elevated
    } else {
        RiskLevel::Average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_dedupes_tokens() {
        let profile = RiskProfile::new(50, Gender::Male, ["  Smoker ", "smoker", "", "Obesity"]);
        assert_eq!(profile.risk_factors, vec!["smoker", "obesity"]);
    }

    #[test]
    fn parses_earliest_family_diagnosis_age() {
        let profile = RiskProfile::new(
            40,
            Gender::Female,
            [
                "Earliest family diagnosis age: 46",
                "earliest family diagnosis age 52",
            ],
        );
        assert_eq!(profile.earliest_family_diagnosis_age(), Some(46));

        let none = RiskProfile::new(40, Gender::Female, ["earliest family diagnosis age: ?"]);
        assert_eq!(none.earliest_family_diagnosis_age(), None);
    }

    #[test]
    fn risk_levels_follow_expected_tiers() {
        let high = RiskProfile::new(45, Gender::All, ["suspected Lynch syndrome"]);
        assert_eq!(assess_risk_level(&high), RiskLevel::High);

        let elevated = RiskProfile::new(60, Gender::All, ["former smoker"]);
        assert_eq!(assess_risk_level(&elevated), RiskLevel::Elevated);

        let average = RiskProfile::new(30, Gender::All, Vec::<String>::new());
        assert_eq!(assess_risk_level(&average), RiskLevel::Average);
    }
}
