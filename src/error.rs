use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown report period: {0} (expected day, week, month or year)")]
    UnknownPeriod(String),

    #[error("Unknown direction: {0} (expected expense or income)")]
    UnknownDirection(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PocketError>;
