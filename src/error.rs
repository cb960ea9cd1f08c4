use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("date {0} is outside the loaded month ({1})")]
    OutOfMonth(chrono::NaiveDate, String),

    #[error("destination name is empty")]
    EmptyDestination,

    #[error("destination '{0}' already exists")]
    DuplicateDestination(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type AppResult<T> = Result<T, AppError>;
