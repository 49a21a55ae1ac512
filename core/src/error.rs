use thiserror::Error;

/// Opaque failure raised by an external predictor or regressor.
/// The core never inspects it; it is handed back to the caller as-is.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct PredictorError(Box<dyn std::error::Error + Send + Sync>);

impl PredictorError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

#[derive(Error, Debug)]
pub enum AfiError {
    #[error("Ratio domain error: {field} = {value} (inputs must be finite, denominators > 0)")]
    DivisionDomain { field: &'static str, value: f64 },

    #[error("Insufficient reference data: {reason}")]
    InsufficientData { reason: String },

    #[error("Division by zero: standard deviation of '{statistic}' is {std}")]
    DivisionByZero { statistic: &'static str, std: f64 },

    #[error("Schema mismatch: field '{field}' is missing or not a finite number")]
    SchemaMismatch { field: String },

    #[error("Predictor failed: {0}")]
    Predictor(#[from] PredictorError),

    #[error("Reference statistics mismatch: {reason}")]
    StatisticsMismatch { reason: String },

    #[error("Region '{region}' not found for year {year}")]
    RegionNotFound { region: String, year: i32 },

    #[error("Reference snapshot '{snapshot_id}' not found")]
    SnapshotNotFound { snapshot_id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AfiResult<T> = Result<T, AfiError>;
