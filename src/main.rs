use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod catalog;
mod completion;
mod config;
mod db;
mod error;
mod frequency;
mod matcher;
mod models;
mod recommend;
mod recurrence;
mod report;
mod risk;
mod store;
mod timeline;

use config::Config;
use db::PgStore;
use error::StoreError;
use models::{CompletionSubmission, Gender, ScreeningResult};
use risk::RiskProfile;

#[derive(Parser)]
#[command(name = "preventive-care")]
#[command(about = "Preventive screening recommendations and recurrence tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    age: u32,
    #[arg(long, value_enum)]
    gender: Gender,
    /// Free-text risk factor; repeat for several
    #[arg(long = "risk-factor")]
    risk_factors: Vec<String>,
}

impl ProfileArgs {
    fn profile(&self) -> RiskProfile {
        RiskProfile::new(self.age, self.gender, &self.risk_factors)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// List the screening guideline catalog
    Guidelines,
    /// Recommend screenings for a risk profile
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        json: bool,
    },
    /// Compute the next due date for a completed screening
    NextDue {
        #[arg(long)]
        completed: String,
        #[arg(long)]
        frequency: String,
        #[arg(long, value_enum)]
        result: Option<ScreeningResult>,
        #[arg(long)]
        follow_up: Option<String>,
    },
    /// Record a completed screening
    Complete {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        screening_id: String,
        #[arg(long)]
        screening_name: String,
        #[arg(long)]
        completed: String,
        #[arg(long)]
        provider_id: Option<String>,
        #[arg(long)]
        provider_name: Option<String>,
        #[arg(long, value_enum)]
        result: Option<ScreeningResult>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        follow_up_needed: bool,
        #[arg(long)]
        follow_up_date: Option<String>,
    },
    /// Show recent completion events, newest first
    History {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Store a snapshot of the current recommendations
    Snapshot {
        #[arg(long)]
        user: Uuid,
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        context_included: bool,
    },
    /// Show stored recommendation snapshots, newest first
    Timeline {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Backfill completions from a CSV file
    Import {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown care plan
    Report {
        #[arg(long)]
        user: Uuid,
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, default_value = "care-plan.md")]
        out: PathBuf,
    },
}

/// `None` when no database is configured; the caller reports the feature as
/// unavailable instead of failing.
async fn open_store(config: &Config) -> anyhow::Result<Option<PgStore>> {
    match PgStore::connect(config).await {
        Ok(store) => Ok(Some(store)),
        Err(StoreError::Unavailable) => {
            tracing::warn!("DATABASE_URL is not set, storage-backed command skipped");
            println!("Feature unavailable: no database is configured.");
            Ok(None)
        }
        Err(err) => Err(err).context("failed to connect to Postgres"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::InitDb => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            store.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Guidelines => {
            for guideline in catalog::all_guidelines() {
                println!(
                    "- {} [{:?}] {} ages {}-{}, {}",
                    guideline.name,
                    guideline.grade,
                    guideline.gender,
                    guideline.min_age,
                    guideline.max_age,
                    guideline.frequency
                );
            }
        }
        Commands::Recommend { profile, json } => {
            let recommendations = recommend::build_recommendations(&profile.profile());

            if json {
                println!("{}", serde_json::to_string_pretty(&recommendations)?);
                return Ok(());
            }
            if recommendations.is_empty() {
                println!("No screenings match this profile.");
                return Ok(());
            }

            println!("Recommended screenings:");
            for recommendation in &recommendations {
                println!(
                    "- {} ({}, {}) ages {}-{}",
                    recommendation.name,
                    recommendation.importance.as_str(),
                    recommendation.frequency,
                    recommendation.age_range.min,
                    recommendation.age_range.max
                );
            }
        }
        Commands::NextDue {
            completed,
            frequency,
            result,
            follow_up,
        } => {
            let follow_up = match follow_up {
                Some(raw) => Some(
                    recurrence::parse_date(&raw)
                        .with_context(|| format!("invalid follow-up date: {raw}"))?,
                ),
                None => None,
            };
            match recurrence::compute_next_due(&completed, &frequency, result, follow_up) {
                Some(date) => println!("{date}"),
                None => println!("none"),
            }
        }
        Commands::Complete {
            user,
            screening_id,
            screening_name,
            completed,
            provider_id,
            provider_name,
            result,
            notes,
            follow_up_needed,
            follow_up_date,
        } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let submission = CompletionSubmission {
                screening_id: Some(screening_id),
                screening_name: Some(screening_name),
                completed_date: Some(completed),
                provider_id,
                provider_name,
                result,
                result_notes: notes,
                follow_up_needed: Some(follow_up_needed),
                follow_up_date,
            };
            let response = completion::record_completion(&store, user, submission).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::History { user, limit, json } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let events = completion::completion_history(&store, user, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
                return Ok(());
            }
            if events.is_empty() {
                println!("No completions recorded.");
                return Ok(());
            }

            for event in &events {
                let due = event
                    .next_due_date
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "- {} {} on {} ({}), next due {}",
                    event.kind.as_str(),
                    event.screening_name,
                    event.completed_date,
                    event.result,
                    due
                );
            }
        }
        Commands::Snapshot {
            user,
            profile,
            context_included,
        } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let profile = profile.profile();
            let input = timeline::SnapshotInput {
                recommendations: recommend::build_recommendations(&profile),
                risk_profile: timeline::RiskProfileSummary {
                    level: risk::assess_risk_level(&profile).as_str().to_string(),
                },
                summary: None,
                assessment_input: Some(serde_json::to_value(&profile)?),
                context_included: Some(context_included),
            };
            let snapshot = timeline::record_snapshot(&store, user, input).await?;
            println!(
                "Snapshot {} stored with {} recommendations.",
                snapshot.id, snapshot.summary.total
            );
        }
        Commands::Timeline { user, limit, json } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let snapshots = timeline::recent_snapshots(&store, user, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
                return Ok(());
            }
            if snapshots.is_empty() {
                println!("No snapshots stored.");
                return Ok(());
            }

            for snapshot in &snapshots {
                println!(
                    "- {} risk {}: {} screenings ({} grade A, {} grade B)",
                    snapshot.created_at.format("%Y-%m-%d %H:%M"),
                    snapshot.risk_profile.level,
                    snapshot.summary.total,
                    snapshot.summary.grade_a,
                    snapshot.summary.grade_b
                );
            }
        }
        Commands::Import { user, csv } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let outcome = db::import_csv(&store, user, &csv).await?;
            println!(
                "Recorded {} completions from {} ({} rows rejected).",
                outcome.recorded,
                csv.display(),
                outcome.rejected
            );
        }
        Commands::Report { user, profile, out } => {
            let Some(store) = open_store(&config).await? else {
                return Ok(());
            };
            let profile = profile.profile();
            let recommendations = recommend::build_recommendations(&profile);
            let history = completion::completion_history(&store, user, None).await?;
            let report = report::build_report(
                &profile,
                &recommendations,
                &history,
                Utc::now().date_naive(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
