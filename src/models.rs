use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::error::PocketError;

/// Chat user id as delivered by the transport.
pub type UserId = i64;

/// Sortable text layout used for every stored timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Expense,
    Income,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Category name used when no keyword matches.
    pub fn fallback_category(&self) -> &'static str {
        match self {
            Self::Expense => "Other",
            Self::Income => "Other income",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(PocketError::UnknownDirection(s.to_string())),
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A parsed, not yet persisted transaction candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub direction: Direction,
    pub description: String,
    pub amount: f64,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub direction: Direction,
    pub keywords: Vec<String>,
}

/// Input for inserting a category; keywords are already normalized.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub direction: Direction,
    pub keywords: Vec<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: UserId,
    pub direction: Direction,
    /// Category name captured at write time.
    pub category: String,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub direction: Direction,
    pub category: String,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
}

/// Split a comma-joined keyword list into trimmed, lowercased, non-empty tokens.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() {
        assert_eq!("expense".parse::<Direction>().unwrap(), Direction::Expense);
        assert_eq!(" Income ".parse::<Direction>().unwrap(), Direction::Income);
        assert!(matches!(
            "transfer".parse::<Direction>(),
            Err(PocketError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_fallback_names() {
        assert_eq!(Direction::Expense.fallback_category(), "Other");
        assert_eq!(Direction::Income.fallback_category(), "Other income");
    }

    #[test]
    fn test_parse_keywords_normalizes() {
        assert_eq!(
            parse_keywords(" Taxi, ,METRO ,yandex food,"),
            vec!["taxi", "metro", "yandex food"]
        );
        assert!(parse_keywords(" , ").is_empty());
    }
}
