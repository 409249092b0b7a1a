use crate::models::{Gender, Grade};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guideline {
    pub name: &'static str,
    pub description: &'static str,
    pub grade: Grade,
    pub gender: Gender,
    pub min_age: u32,
    pub max_age: u32,
    pub frequency: &'static str,
    /// Normalized lowercase tokens. Empty means the screening is universal.
    pub risk_factors: &'static [&'static str],
    pub specialty_needed: &'static str,
}

impl Guideline {
    pub fn id(&self) -> String {
        slugify(self.name)
    }

    pub fn is_universal(&self) -> bool {
        self.risk_factors.is_empty()
    }
}

pub const COLORECTAL_FAMILY: &str = "Colorectal Cancer";
pub const LYNCH_FAMILY: &str = "Lynch Syndrome";

pub const COLORECTAL_HIGH_RISK: &[&str] = &[
    "family history colorectal cancer age < 50",
    "multiple first-degree relatives colorectal cancer",
    "first-degree relative colorectal cancer before 50",
];

pub const COLORECTAL_MODERATE_RISK: &[&str] = &[
    "family history colorectal cancer age 50-59",
    "first-degree relative colorectal cancer age 50-59",
];

pub const COLORECTAL_PERSONAL_HISTORY: &[&str] = &[
    "personal history colorectal polyps",
    "personal history adenomatous polyps",
    "personal history colorectal cancer",
    "inflammatory bowel disease",
    "ulcerative colitis",
    "crohn's disease",
];

pub const LYNCH_SUSPECTED: &[&str] = &[
    "3+ relatives colorectal cancer",
    "family colorectal cancer before 45",
    "family endometrial cancer before 50",
    "suspected lynch syndrome",
];

static GUIDELINES: &[Guideline] = &[
    Guideline {
        name: "Colorectal Cancer Screening",
        description: "Average-risk screening by stool test, CT colonography, or colonoscopy.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 45,
        max_age: 75,
        frequency: "Every 10 years (colonoscopy) or annually (stool test)",
        risk_factors: &[],
        specialty_needed: "Gastroenterology",
    },
    Guideline {
        name: "Colorectal Cancer Screening - High Risk",
        description: "Early colonoscopy for people with a first-degree relative diagnosed before 50 or several affected relatives.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 40,
        max_age: 75,
        frequency: "Every 5 years (colonoscopy)",
        risk_factors: COLORECTAL_HIGH_RISK,
        specialty_needed: "Gastroenterology",
    },
    Guideline {
        name: "Colorectal Cancer Screening - Moderate Risk",
        description: "Colonoscopy for people with a first-degree relative diagnosed between 50 and 59.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 40,
        max_age: 75,
        frequency: "Every 5 years (colonoscopy)",
        risk_factors: COLORECTAL_MODERATE_RISK,
        specialty_needed: "Gastroenterology",
    },
    Guideline {
        name: "Colorectal Cancer Screening - Personal History",
        description: "Surveillance colonoscopy after polyps, colorectal cancer, or inflammatory bowel disease.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 18,
        max_age: 85,
        frequency: "Every 3 years (surveillance colonoscopy)",
        risk_factors: COLORECTAL_PERSONAL_HISTORY,
        specialty_needed: "Gastroenterology",
    },
    Guideline {
        name: "Lynch Syndrome Surveillance",
        description: "Genetic counselling and frequent colonoscopy when hereditary colorectal cancer is suspected.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 20,
        max_age: 75,
        frequency: "Every 2 years (colonoscopy)",
        risk_factors: LYNCH_SUSPECTED,
        specialty_needed: "Genetic Counseling",
    },
    Guideline {
        name: "Breast Cancer Screening",
        description: "Screening mammography.",
        grade: Grade::B,
        gender: Gender::Female,
        min_age: 40,
        max_age: 74,
        frequency: "Every 2 years",
        risk_factors: &[],
        specialty_needed: "Radiology",
    },
    Guideline {
        name: "BRCA Risk Assessment",
        description: "Familial risk assessment and referral for genetic counselling.",
        grade: Grade::B,
        gender: Gender::Female,
        min_age: 18,
        max_age: 120,
        frequency: "Once",
        risk_factors: &[
            "family history breast cancer",
            "family history ovarian cancer",
            "brca mutation",
            "ashkenazi jewish ancestry",
        ],
        specialty_needed: "Genetic Counseling",
    },
    Guideline {
        name: "Cervical Cancer Screening - Cytology",
        description: "Cervical cytology (Pap test).",
        grade: Grade::A,
        gender: Gender::Female,
        min_age: 21,
        max_age: 29,
        frequency: "Every 3 years",
        risk_factors: &[],
        specialty_needed: "Gynecology",
    },
    Guideline {
        name: "Cervical Cancer Screening - HPV Testing",
        description: "High-risk HPV testing alone or with cytology.",
        grade: Grade::A,
        gender: Gender::Female,
        min_age: 30,
        max_age: 65,
        frequency: "Every 5 years",
        risk_factors: &[],
        specialty_needed: "Gynecology",
    },
    Guideline {
        name: "Lung Cancer Screening",
        description: "Low-dose CT for adults with a significant smoking history.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 50,
        max_age: 80,
        frequency: "Annually",
        risk_factors: &["smoker", "former smoker", "20 pack-year smoking history"],
        specialty_needed: "Pulmonology",
    },
    Guideline {
        name: "Abdominal Aortic Aneurysm Screening",
        description: "One-time abdominal ultrasound for men who have ever smoked.",
        grade: Grade::B,
        gender: Gender::Male,
        min_age: 65,
        max_age: 75,
        frequency: "One-time ultrasound",
        risk_factors: &["smoker", "former smoker"],
        specialty_needed: "Vascular Surgery",
    },
    Guideline {
        name: "Blood Pressure Screening",
        description: "Office blood pressure measurement with confirmation outside the clinic.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 18,
        max_age: 120,
        frequency: "Annually",
        risk_factors: &[],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Prediabetes and Type 2 Diabetes Screening",
        description: "Fasting glucose or HbA1c for adults with overweight or obesity.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 35,
        max_age: 70,
        frequency: "Every 3 years",
        risk_factors: &["overweight", "obesity"],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Statin Use Assessment",
        description: "Lipid panel and cardiovascular risk calculation.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 40,
        max_age: 75,
        frequency: "Every 5 years",
        risk_factors: &["high cholesterol", "hypertension", "diabetes", "smoker"],
        specialty_needed: "Cardiology",
    },
    Guideline {
        name: "Osteoporosis Screening",
        description: "Bone density scan (DXA).",
        grade: Grade::B,
        gender: Gender::Female,
        min_age: 65,
        max_age: 120,
        frequency: "Every 2 years",
        risk_factors: &[],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Osteoporosis Screening - Postmenopausal Risk",
        description: "Bone density scan for younger postmenopausal women with fracture risk.",
        grade: Grade::B,
        gender: Gender::Female,
        min_age: 50,
        max_age: 64,
        frequency: "Every 2 years",
        risk_factors: &[
            "low body weight",
            "early menopause",
            "parental hip fracture",
            "smoker",
        ],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Prostate Cancer Screening",
        description: "Shared decision about PSA-based screening.",
        grade: Grade::C,
        gender: Gender::Male,
        min_age: 55,
        max_age: 69,
        frequency: "Every 2 years",
        risk_factors: &[],
        specialty_needed: "Urology",
    },
    Guideline {
        name: "HIV Screening",
        description: "HIV antigen/antibody test.",
        grade: Grade::A,
        gender: Gender::All,
        min_age: 15,
        max_age: 65,
        frequency: "Once",
        risk_factors: &[],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Hepatitis C Screening",
        description: "HCV antibody test with reflex RNA.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 18,
        max_age: 79,
        frequency: "One-time",
        risk_factors: &[],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Hepatitis B Screening",
        description: "HBsAg test for adults at increased risk of infection.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 18,
        max_age: 120,
        frequency: "Once, repeat while risk persists",
        risk_factors: &[
            "injection drug use",
            "born in high-prevalence country",
            "hiv positive",
        ],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Latent Tuberculosis Screening",
        description: "Tuberculin skin test or interferon-gamma release assay.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 18,
        max_age: 120,
        frequency: "Once",
        risk_factors: &[
            "born in high-prevalence country",
            "homeless shelter resident",
            "incarceration history",
        ],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Chlamydia and Gonorrhea Screening",
        description: "Nucleic acid amplification testing.",
        grade: Grade::B,
        gender: Gender::Female,
        min_age: 15,
        max_age: 24,
        frequency: "Annually",
        risk_factors: &[],
        specialty_needed: "Gynecology",
    },
    Guideline {
        name: "Depression Screening",
        description: "Validated questionnaire such as the PHQ-9.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 12,
        max_age: 120,
        frequency: "Annually",
        risk_factors: &[],
        specialty_needed: "Primary Care",
    },
    Guideline {
        name: "Falls Prevention Assessment",
        description: "Exercise-based fall prevention for older adults at increased risk.",
        grade: Grade::B,
        gender: Gender::All,
        min_age: 65,
        max_age: 120,
        frequency: "Annually",
        risk_factors: &["history of falls", "mobility issues"],
        specialty_needed: "Physical Therapy",
    },
];

pub fn all_guidelines() -> &'static [Guideline] {
    GUIDELINES
}

pub fn find_by_id(id: &str) -> Option<&'static Guideline> {
    let wanted = id.trim().to_lowercase();
    GUIDELINES.iter().find(|guideline| guideline.id() == wanted)
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_punctuation() {
        assert_eq!(
            slugify("Colorectal Cancer Screening - High Risk"),
            "colorectal-cancer-screening-high-risk"
        );
        assert_eq!(slugify("  HIV Screening! "), "hiv-screening");
    }

    #[test]
    fn catalog_entries_are_well_formed() {
        for guideline in all_guidelines() {
            assert!(guideline.min_age <= guideline.max_age, "{}", guideline.name);
            for token in guideline.risk_factors {
                assert_eq!(token.trim().to_lowercase(), *token, "{}", guideline.name);
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<String> = all_guidelines().iter().map(Guideline::id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn finds_guideline_by_id() {
        let found = find_by_id("lung-cancer-screening").map(|g| g.frequency);
        assert_eq!(found, Some("Annually"));
        assert!(find_by_id("not-a-screening").is_none());
    }
}
