use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid {distribution} parameters: {reason}")]
    InvalidDistribution {
        distribution: &'static str,
        reason: String,
    },

    #[error("Calendar overflow: no day after {date}")]
    CalendarOverflow { date: NaiveDate },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
