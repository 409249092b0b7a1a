use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },

    #[error("at least one recommendation is required")]
    EmptyRecommendations,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not configured; set DATABASE_URL to enable this feature")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
