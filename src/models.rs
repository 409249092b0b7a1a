use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    All,
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::All => "all",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
}

impl Grade {
    pub fn importance(&self) -> Importance {
        match self {
            Grade::A => Importance::Essential,
            Grade::B => Importance::Recommended,
            Grade::C => Importance::Routine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Essential,
    Recommended,
    Routine,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Essential => "essential",
            Importance::Recommended => "recommended",
            Importance::Routine => "routine",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningResult {
    Normal,
    Abnormal,
    Inconclusive,
    #[default]
    Pending,
}

impl ScreeningResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningResult::Normal => "normal",
            ScreeningResult::Abnormal => "abnormal",
            ScreeningResult::Inconclusive => "inconclusive",
            ScreeningResult::Pending => "pending",
        }
    }
}

impl fmt::Display for ScreeningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreeningResult {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "normal" => Ok(ScreeningResult::Normal),
            "abnormal" => Ok(ScreeningResult::Abnormal),
            "inconclusive" => Ok(ScreeningResult::Inconclusive),
            "pending" | "" => Ok(ScreeningResult::Pending),
            other => Err(ValidationError::UnknownValue {
                field: "result",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub age_range: AgeRange,
    pub gender: Gender,
    pub frequency: String,
    pub importance: Importance,
    pub specialty_needed: String,
    pub risk_factors: Vec<String>,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Completed,
    ResultRecorded,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Completed => "completed",
            EventKind::ResultRecorded => "result_recorded",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(EventKind::Completed),
            "result_recorded" => Some(EventKind::ResultRecorded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EventKind,
    pub screening_id: String,
    pub screening_name: String,
    pub completed_date: String,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub result: ScreeningResult,
    pub result_notes: Option<String>,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub frequency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionSubmission {
    pub screening_id: Option<String>,
    pub screening_name: Option<String>,
    pub completed_date: Option<String>,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub result: Option<ScreeningResult>,
    pub result_notes: Option<String>,
    pub follow_up_needed: Option<bool>,
    pub follow_up_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub screening_id: String,
    pub screening_name: String,
    pub completed_date: String,
    pub result: ScreeningResult,
    pub next_due_date: Option<NaiveDate>,
    pub follow_up_needed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    pub completion: CompletionSummary,
    pub message: String,
}
