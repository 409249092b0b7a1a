use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{StoreResult, ValidationError};
use crate::models::{Grade, Recommendation};
use crate::store::SnapshotLog;

pub const CURRENT_VERSION: u64 = 2;
pub const DEFAULT_SNAPSHOT_LIMIT: i64 = 10;
pub const MAX_SNAPSHOT_LIMIT: i64 = 20;
const UNKNOWN_RISK_LEVEL: &str = "unknown";

fn unknown_risk_level() -> String {
    UNKNOWN_RISK_LEVEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfileSummary {
    #[serde(default = "unknown_risk_level")]
    pub level: String,
}

impl Default for RiskProfileSummary {
    fn default() -> Self {
        Self {
            level: unknown_risk_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub grade_a: usize,
    #[serde(default)]
    pub grade_b: usize,
    #[serde(default = "unknown_risk_level")]
    pub risk_level: String,
}

impl SnapshotSummary {
    pub fn from_recommendations(recommendations: &[Recommendation], risk_level: &str) -> Self {
        let count = |grade: Grade| recommendations.iter().filter(|r| r.grade == grade).count();
        Self {
            total: recommendations.len(),
            grade_a: count(Grade::A),
            grade_b: count(Grade::B),
            risk_level: risk_level.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotInput {
    pub recommendations: Vec<Recommendation>,
    pub risk_profile: RiskProfileSummary,
    pub summary: Option<SnapshotSummary>,
    pub assessment_input: Option<Value>,
    pub context_included: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub version: u64,
    pub recommendations: Vec<Recommendation>,
    pub risk_profile: RiskProfileSummary,
    pub summary: SnapshotSummary,
    pub assessment_input: Option<Value>,
    pub context_included: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub risk_profile: RiskProfileSummary,
    pub summary: SnapshotSummary,
    pub assessment_input: Option<Value>,
    pub context_included: bool,
}

pub fn prepare_snapshot(input: SnapshotInput) -> Result<SnapshotPayload, ValidationError> {
    if input.recommendations.is_empty() {
        return Err(ValidationError::EmptyRecommendations);
    }
    let summary = input.summary.unwrap_or_else(|| {
        SnapshotSummary::from_recommendations(&input.recommendations, &input.risk_profile.level)
    });
    Ok(SnapshotPayload {
        version: CURRENT_VERSION,
        recommendations: input.recommendations,
        risk_profile: input.risk_profile,
        summary,
        assessment_input: input.assessment_input,
        context_included: input.context_included.unwrap_or(false),
    })
}

pub async fn record_snapshot<S: SnapshotLog>(
    store: &S,
    user_id: Uuid,
    input: SnapshotInput,
) -> StoreResult<TimelineSnapshot> {
    let payload = prepare_snapshot(input)?;
    let record = SnapshotRecord {
        id: Uuid::new_v4(),
        user_id,
        payload: serde_json::to_value(&payload)?,
        created_at: Utc::now(),
    };
    store.append_snapshot(&record).await?;

    tracing::info!(
        %user_id,
        snapshot_id = %record.id,
        total = payload.summary.total,
        risk_level = %payload.risk_profile.level,
        "timeline snapshot stored"
    );

    Ok(TimelineSnapshot {
        id: record.id,
        created_at: record.created_at,
        recommendations: payload.recommendations,
        risk_profile: payload.risk_profile,
        summary: payload.summary,
        assessment_input: payload.assessment_input,
        context_included: payload.context_included,
    })
}

pub fn clamp_snapshot_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_SNAPSHOT_LIMIT)
        .clamp(1, MAX_SNAPSHOT_LIMIT)
}

pub async fn recent_snapshots<S: SnapshotLog>(
    store: &S,
    user_id: Uuid,
    limit: Option<i64>,
) -> StoreResult<Vec<TimelineSnapshot>> {
    let records = store
        .recent_snapshots(user_id, clamp_snapshot_limit(limit))
        .await?;
    Ok(records.into_iter().map(decode_snapshot).collect())
}

fn payload_version(payload: &Value) -> u64 {
    payload
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

/// Version 1 kept the risk level at the top level and had no summary block.
fn migrate_v1_to_v2(payload: Value) -> Value {
    let mut object = match payload {
        Value::Object(object) => object,
        _ => serde_json::Map::new(),
    };
    let level = object
        .remove("riskLevel")
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(unknown_risk_level);
    object
        .entry("riskProfile")
        .or_insert_with(|| json!({ "level": level }));
    object.insert("version".to_string(), json!(2));
    Value::Object(object)
}

pub fn migrate(payload: Value) -> Value {
    let mut payload = payload;
    if payload_version(&payload) < 2 {
        payload = migrate_v1_to_v2(payload);
    }
    payload
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LenientPayload {
    recommendations: Vec<Value>,
    risk_profile: Option<Value>,
    summary: Option<Value>,
    assessment_input: Option<Value>,
    context_included: Option<bool>,
}

pub fn decode_snapshot(record: SnapshotRecord) -> TimelineSnapshot {
    let version = payload_version(&record.payload);
    if version > CURRENT_VERSION {
        tracing::warn!(snapshot_id = %record.id, version, "snapshot written by a newer release");
    }

    let lenient: LenientPayload = serde_json::from_value(migrate(record.payload))
        .unwrap_or_else(|err| {
            tracing::warn!(snapshot_id = %record.id, error = %err, "unreadable snapshot payload");
            LenientPayload::default()
        });

    let stored = lenient.recommendations.len();
    let recommendations: Vec<Recommendation> = lenient
        .recommendations
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if recommendations.len() < stored {
        tracing::warn!(
            snapshot_id = %record.id,
            skipped = stored - recommendations.len(),
            "skipped unreadable recommendations in snapshot"
        );
    }

    let risk_profile: RiskProfileSummary = lenient
        .risk_profile
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let summary = lenient
        .summary
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_else(|| {
            SnapshotSummary::from_recommendations(&recommendations, &risk_profile.level)
        });

    TimelineSnapshot {
        id: record.id,
        created_at: record.created_at,
        recommendations,
        risk_profile,
        summary,
        assessment_input: lenient.assessment_input,
        context_included: lenient.context_included.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::Gender;
    use crate::recommend::build_recommendations;
    use crate::risk::RiskProfile;
    use crate::store::memory::MemoryStore;

    fn sample_recommendations() -> Vec<Recommendation> {
        build_recommendations(&RiskProfile::new(52, Gender::Female, ["smoker"]))
    }

    fn record(payload: Value) -> SnapshotRecord {
        SnapshotRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_recommendations_are_rejected() {
        assert_eq!(
            prepare_snapshot(SnapshotInput::default()),
            Err(ValidationError::EmptyRecommendations)
        );
    }

    #[test]
    fn summary_counts_grades() {
        let recommendations = sample_recommendations();
        let payload = prepare_snapshot(SnapshotInput {
            recommendations: recommendations.clone(),
            risk_profile: RiskProfileSummary {
                level: "elevated".to_string(),
            },
            ..Default::default()
        })
        .expect("valid");

        let grade_a = recommendations.iter().filter(|r| r.grade == Grade::A).count();
        assert_eq!(payload.version, CURRENT_VERSION);
        assert_eq!(payload.summary.total, recommendations.len());
        assert_eq!(payload.summary.grade_a, grade_a);
        assert_eq!(payload.summary.risk_level, "elevated");
        assert!(!payload.context_included);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_snapshot_limit(None), 10);
        assert_eq!(clamp_snapshot_limit(Some(0)), 1);
        assert_eq!(clamp_snapshot_limit(Some(-4)), 1);
        assert_eq!(clamp_snapshot_limit(Some(15)), 15);
        assert_eq!(clamp_snapshot_limit(Some(100)), 20);
    }

    #[test]
    fn legacy_payload_is_migrated() {
        let recommendations = sample_recommendations();
        let legacy = json!({
            "recommendations": recommendations,
            "riskLevel": "high",
            "contextIncluded": true,
        });
        let snapshot = decode_snapshot(record(legacy));
        assert_eq!(snapshot.risk_profile.level, "high");
        assert_eq!(snapshot.recommendations, recommendations);
        assert_eq!(snapshot.summary.total, recommendations.len());
        assert_eq!(snapshot.summary.risk_level, "high");
        assert!(snapshot.context_included);
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let snapshot = decode_snapshot(record(json!({ "version": 2 })));
        assert!(snapshot.recommendations.is_empty());
        assert_eq!(snapshot.risk_profile.level, "unknown");
        assert_eq!(snapshot.summary.total, 0);
        assert!(!snapshot.context_included);

        let garbage = decode_snapshot(record(json!("not an object")));
        assert!(garbage.recommendations.is_empty());
        assert_eq!(garbage.risk_profile.level, "unknown");

        let wrong_types = decode_snapshot(record(json!({
            "version": 2,
            "recommendations": "nope",
            "riskProfile": 7,
        })));
        assert!(wrong_types.recommendations.is_empty());
        assert_eq!(wrong_types.risk_profile.level, "unknown");
    }

    #[test]
    fn unreadable_recommendations_are_skipped() {
        let mut recommendations: Vec<Value> = sample_recommendations()
            .into_iter()
            .map(|r| serde_json::to_value(r).expect("json"))
            .collect();
        let expected = recommendations.len();
        recommendations.push(json!({ "name": "half-written" }));

        let snapshot = decode_snapshot(record(json!({
            "version": 2,
            "recommendations": recommendations,
            "riskProfile": { "level": "average" },
        })));
        assert_eq!(snapshot.recommendations.len(), expected);
        assert_eq!(snapshot.summary.total, expected);
    }

    #[tokio::test]
    async fn snapshots_read_newest_first() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        for level in ["average", "elevated", "high"] {
            let input = SnapshotInput {
                recommendations: sample_recommendations(),
                risk_profile: RiskProfileSummary {
                    level: level.to_string(),
                },
                context_included: Some(true),
                ..Default::default()
            };
            record_snapshot(&store, user, input).await.expect("stored");
        }

        let snapshots = recent_snapshots(&store, user, Some(2)).await.expect("read");
        let levels: Vec<&str> = snapshots
            .iter()
            .map(|s| s.risk_profile.level.as_str())
            .collect();
        assert_eq!(levels, vec!["high", "elevated"]);
        assert!(snapshots.iter().all(|s| s.context_included));

        let none = recent_snapshots(&store, Uuid::new_v4(), None).await.expect("read");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn empty_snapshot_write_stores_nothing() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let err = record_snapshot(&store, user, SnapshotInput::default())
            .await
            .expect_err("rejected");
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyRecommendations)
        ));
        assert!(recent_snapshots(&store, user, None).await.expect("read").is_empty());
    }
}
