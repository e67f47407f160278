//! Storage seam between the bot and whatever persists users, categories and
//! transactions. Handlers receive a `&impl Storage` instead of reaching for a
//! global connection.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{Category, Direction, NewCategory, NewTransaction, Transaction, UserId};
use crate::period::PeriodBoundary;
use crate::reports::CategorySummary;

/// Optional filters for transaction queries. `start`/`end` are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub direction: Option<Direction>,
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn within(boundary: &PeriodBoundary) -> Self {
        Self {
            start: Some(boundary.start),
            end: Some(boundary.end),
            ..Self::default()
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

pub trait Storage {
    /// Create the user (seeding default categories) if unknown and stamp
    /// `last_activity`. Returns true when the user was created.
    fn ensure_user(&self, user: UserId, now: NaiveDateTime) -> Result<bool>;

    /// Categories in insertion order, optionally restricted to a direction.
    fn categories(&self, user: UserId, direction: Option<Direction>) -> Result<Vec<Category>>;

    fn add_category(&self, user: UserId, category: &NewCategory) -> Result<i64>;

    /// Returns false when no category with that id belongs to the user.
    fn delete_category(&self, user: UserId, id: i64) -> Result<bool>;

    fn add_transaction(&self, user: UserId, txn: &NewTransaction) -> Result<Transaction>;

    /// Insert several transactions atomically: either all are stored or none.
    fn add_transactions(&self, user: UserId, txns: &[NewTransaction]) -> Result<Vec<Transaction>>;

    /// Matching transactions, newest first.
    fn transactions(&self, user: UserId, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// Summed amounts per category name, largest first. `filter.category` is ignored.
    fn category_totals(&self, user: UserId, filter: &TransactionFilter) -> Result<Vec<CategorySummary>>;

    /// Unknown users read as enabled.
    fn notifications_enabled(&self, user: UserId) -> Result<bool>;

    /// Returns false when the user does not exist.
    fn set_notifications(&self, user: UserId, enabled: bool) -> Result<bool>;

    fn notification_users(&self) -> Result<Vec<UserId>>;
}
