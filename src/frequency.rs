pub const DEFAULT_INTERVAL_MONTHS: u32 = 12;

pub const NO_RECURRENCE: u32 = 0;

/// First match wins.
pub const FREQUENCY_RULES: &[(&[&str], u32)] = &[
    (&["every 10 years"], 120),
    (&["every 5 years"], 60),
    (&["every 3 years"], 36),
    (&["every 2 years", "biennial"], 24),
    (&["annual"], 12),
    (&["every 6 months"], 6),
    (&["once", "one-time"], NO_RECURRENCE),
];

pub fn frequency_to_months(text: &str) -> u32 {
    let lowered = text.to_lowercase();
    FREQUENCY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, months)| *months)
        .unwrap_or(DEFAULT_INTERVAL_MONTHS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_cadences_resolve() {
        assert_eq!(frequency_to_months("Every 10 years"), 120);
        assert_eq!(frequency_to_months("every 5 years"), 60);
        assert_eq!(frequency_to_months("Every 3 years"), 36);
        assert_eq!(frequency_to_months("Every 2 years"), 24);
        assert_eq!(frequency_to_months("Biennial mammogram"), 24);
        assert_eq!(frequency_to_months("Annually"), 12);
        assert_eq!(frequency_to_months("EVERY 6 MONTHS"), 6);
        assert_eq!(frequency_to_months("once"), 0);
        assert_eq!(frequency_to_months("One-time ultrasound"), 0);
    }

    #[test]
    fn unknown_cadence_defaults_to_a_year() {
        assert_eq!(frequency_to_months("banana"), 12);
        assert_eq!(frequency_to_months(""), 12);
    }

    #[test]
    fn earlier_rules_win_over_later_ones() {
        assert_eq!(
            frequency_to_months("Every 10 years (colonoscopy) or annually (stool test)"),
            120
        );
        assert_eq!(frequency_to_months("Once, then annually if abnormal"), 12);
        assert_eq!(frequency_to_months("Semi-annual, every 6 months"), 12);
        assert_eq!(frequency_to_months("Once, repeat while risk persists"), 0);
    }

    #[test]
    fn rule_table_keeps_its_order() {
        let months: Vec<u32> = FREQUENCY_RULES.iter().map(|(_, m)| *m).collect();
        assert_eq!(months, vec![120, 60, 36, 24, 12, 6, 0]);
    }

    #[test]
    fn catalog_cadences_are_recognised() {
        for guideline in crate::catalog::all_guidelines() {
            let lowered = guideline.frequency.to_lowercase();
            let recognised = FREQUENCY_RULES
                .iter()
                .any(|(needles, _)| needles.iter().any(|n| lowered.contains(n)));
            assert!(recognised, "{}", guideline.frequency);
        }
    }
}
