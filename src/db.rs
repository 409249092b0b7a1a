use std::io::Read;

use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::completion::record_completion;
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{CompletionEvent, CompletionSubmission, EventKind, ScreeningResult};
use crate::store::{CompletionLog, SnapshotLog};
use crate::timeline::SnapshotRecord;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let database_url = config.database_url().ok_or(StoreError::Unavailable)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init_db(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn stored_kind(id: Uuid, raw: &str) -> EventKind {
    EventKind::from_stored(raw).unwrap_or_else(|| {
        tracing::warn!(
            event_id = %id,
            kind = raw,
            "unrecognised stored event kind, reading as completed"
        );
        EventKind::Completed
    })
}

fn stored_result(id: Uuid, raw: &str) -> ScreeningResult {
    raw.parse().unwrap_or_else(|err| {
        tracing::warn!(
            event_id = %id,
            error = %err,
            "unrecognised stored result, reading as pending"
        );
        ScreeningResult::Pending
    })
}

fn event_from_row(row: &PgRow) -> StoreResult<CompletionEvent> {
    let id: Uuid = row.try_get("id")?;
    let kind: String = row.try_get("kind")?;
    let result: String = row.try_get("result")?;
    Ok(CompletionEvent {
        id,
        user_id: row.try_get("user_id")?,
        kind: stored_kind(id, &kind),
        screening_id: row.try_get("screening_id")?,
        screening_name: row.try_get("screening_name")?,
        completed_date: row.try_get("completed_date")?,
        provider_id: row.try_get("provider_id")?,
        provider_name: row.try_get("provider_name")?,
        result: stored_result(id, &result),
        result_notes: row.try_get("result_notes")?,
        follow_up_needed: row.try_get("follow_up_needed")?,
        follow_up_date: row.try_get("follow_up_date")?,
        next_due_date: row.try_get("next_due_date")?,
        frequency: row.try_get("frequency")?,
        created_at: row.try_get("created_at")?,
    })
}

impl CompletionLog for PgStore {
    async fn append_all(&self, events: &[CompletionEvent]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for event in events {
            sqlx::query(
                r#"
                INSERT INTO preventive_care.completion_events
                (id, user_id, kind, screening_id, screening_name, completed_date,
                 provider_id, provider_name, result, result_notes, follow_up_needed,
                 follow_up_date, next_due_date, frequency, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(event.id)
            .bind(event.user_id)
            .bind(event.kind.as_str())
            .bind(&event.screening_id)
            .bind(&event.screening_name)
            .bind(&event.completed_date)
            .bind(&event.provider_id)
            .bind(&event.provider_name)
            .bind(event.result.as_str())
            .bind(&event.result_notes)
            .bind(event.follow_up_needed)
            .bind(event.follow_up_date)
            .bind(event.next_due_date)
            .bind(&event.frequency)
            .bind(event.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<CompletionEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, screening_id, screening_name, completed_date,
                   provider_id, provider_name, result, result_notes, follow_up_needed,
                   follow_up_date, next_due_date, frequency, created_at
            FROM preventive_care.completion_events
            WHERE user_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}

impl SnapshotLog for PgStore {
    async fn append_snapshot(&self, record: &SnapshotRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preventive_care.timeline_snapshots (id, user_id, payload, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_snapshots(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<SnapshotRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, payload, created_at
            FROM preventive_care.timeline_snapshots
            WHERE user_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(SnapshotRecord {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                payload: row.try_get::<Value, _>("payload")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub recorded: usize,
    pub rejected: usize,
}

/// Backfills completions from CSV. Each row goes through the same workflow
/// as a live submission; rows that fail validation are skipped.
pub async fn import_completions<R: Read, L: CompletionLog>(
    log: &L,
    user_id: Uuid,
    reader: R,
) -> StoreResult<ImportOutcome> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        screening_id: Option<String>,
        screening_name: Option<String>,
        completed_date: Option<String>,
        provider_name: Option<String>,
        result: Option<String>,
        result_notes: Option<String>,
        follow_up_date: Option<String>,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut outcome = ImportOutcome::default();

    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let line = index + 2;

        let result = match row.result.as_deref().map(str::parse::<ScreeningResult>) {
            Some(Err(err)) => {
                tracing::warn!(line, error = %err, "skipping CSV row");
                outcome.rejected += 1;
                continue;
            }
            Some(Ok(result)) => Some(result),
            None => None,
        };

        let submission = CompletionSubmission {
            screening_id: row.screening_id,
            screening_name: row.screening_name,
            completed_date: row.completed_date,
            provider_name: row.provider_name,
            result,
            result_notes: row.result_notes,
            follow_up_needed: Some(row.follow_up_date.is_some()),
            follow_up_date: row.follow_up_date,
            ..Default::default()
        };

        match record_completion(log, user_id, submission).await {
            Ok(_) => outcome.recorded += 1,
            Err(StoreError::Validation(err)) => {
                tracing::warn!(line, error = %err, "skipping CSV row");
                outcome.rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(outcome)
}

pub async fn import_csv<L: CompletionLog>(
    log: &L,
    user_id: Uuid,
    csv_path: &std::path::Path,
) -> StoreResult<ImportOutcome> {
    let file = std::fs::File::open(csv_path).map_err(csv::Error::from)?;
    import_completions(log, user_id, file).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::completion_history;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn connect_without_database_url_is_unavailable() {
        let result = PgStore::connect(&Config::from_values(None, None)).await;
        assert!(matches!(result, Err(StoreError::Unavailable)));
    }

    #[test]
    fn unknown_stored_values_read_as_defaults() {
        let id = Uuid::new_v4();
        assert_eq!(stored_kind(id, "result_recorded"), EventKind::ResultRecorded);
        assert_eq!(stored_kind(id, "completed"), EventKind::Completed);
        assert_eq!(stored_kind(id, "rescheduled"), EventKind::Completed);

        assert_eq!(stored_result(id, "abnormal"), ScreeningResult::Abnormal);
        assert_eq!(stored_result(id, "sideways"), ScreeningResult::Pending);
    }

    const SAMPLE: &str = "\
screening_id,screening_name,completed_date,provider_name,result,result_notes,follow_up_date
blood-pressure-screening,Blood Pressure Screening,2024-02-10,Dr. Okafor,normal,118/76,
lung-cancer-screening,Lung Cancer Screening,2024-03-05,,abnormal,nodule,2024-06-01
,Missing Id,2024-03-06,,,,
depression-screening,Depression Screening,2024-04-01,,sideways,,
hiv-screening,HIV Screening,2023-11-20,,,,
";

    #[tokio::test]
    async fn imports_valid_rows_and_skips_the_rest() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();

        let outcome = import_completions(&store, user, SAMPLE.as_bytes())
            .await
            .expect("import");
        assert_eq!(
            outcome,
            ImportOutcome {
                recorded: 3,
                rejected: 2
            }
        );

        let history = completion_history(&store, user, None).await.expect("history");
        // normal and abnormal rows append two events each, the pending row one.
        assert_eq!(history.len(), 5);

        let hiv = &history[0];
        assert_eq!(hiv.screening_id, "hiv-screening");
        assert_eq!(hiv.next_due_date, None);

        let lung = history
            .iter()
            .find(|e| e.screening_id == "lung-cancer-screening")
            .expect("lung row");
        assert_eq!(lung.next_due_date, chrono::NaiveDate::from_ymd_opt(2024, 6, 1));
        assert!(lung.follow_up_needed);
    }
}
