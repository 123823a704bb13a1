use thiserror::Error;

/// Errors that indicate a caller or configuration mistake.
///
/// Data-quality problems (missing metrics, null cells, degenerate ranges) are
/// never reported through this type; they are logged and defaulted locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("column '{0}' not found in table")]
    UnknownColumn(String),

    #[error("invalid window size {0}; must be at least 1")]
    InvalidWindow(usize),

    #[error("min_periods {min_periods} exceeds window {window}")]
    MinPeriodsExceedsWindow { min_periods: usize, window: usize },

    #[error("invalid ewma span {0}; must be at least 1")]
    InvalidSpan(f64),

    #[error("group keys length {keys} does not match values length {values}")]
    GroupLengthMismatch { keys: usize, values: usize },

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("total weight cannot be zero")]
    ZeroTotalWeight,

    #[error("unknown normalization method: {0}")]
    UnknownMethod(String),

    #[error("invalid stat_type: {0}")]
    UnknownStatType(String),

    #[error("unknown percentile kind: {0}")]
    UnknownPercentileKind(String),

    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("column '{0}' has no numeric values")]
    EmptyPopulation(String),

    #[error("entity {0} not present in population")]
    EntityNotFound(i64),
}

pub type Result<T> = std::result::Result<T, StatsError>;
