use std::path::Path;

use chrono::{NaiveDateTime, Timelike};
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::categorizer::DEFAULT_CATEGORIES;
use crate::error::Result;
use crate::models::{
    parse_keywords, Category, Direction, NewCategory, NewTransaction, Transaction, UserId,
    TIMESTAMP_FORMAT,
};
use crate::reports::CategorySummary;
use crate::store::{Storage, TransactionFilter};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    notifications INTEGER NOT NULL DEFAULT 1,
    last_activity TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    direction TEXT NOT NULL CHECK (direction IN ('expense', 'income')),
    keywords TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(user_id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    direction TEXT NOT NULL CHECK (direction IN ('expense', 'income')),
    category TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    date TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(user_id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn stamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let keywords: String = row.get(4)?;
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        direction: row.get(3)?,
        keywords: parse_keywords(&keywords),
    })
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let raw: String = row.get(5)?;
    let timestamp = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        direction: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        timestamp,
    })
}

/// Build `user_id = ? AND ...` plus its bound values.
fn filter_clause(
    user: UserId,
    filter: &TransactionFilter,
    with_category: bool,
) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clause = String::from("user_id = ?");
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user)];

    if let Some(start) = &filter.start {
        clause.push_str(" AND date >= ?");
        params.push(Box::new(stamp(start)));
    }
    if let Some(end) = &filter.end {
        clause.push_str(" AND date <= ?");
        params.push(Box::new(stamp(end)));
    }
    if let Some(direction) = filter.direction {
        clause.push_str(" AND direction = ?");
        params.push(Box::new(direction));
    }
    if with_category {
        if let Some(category) = &filter.category {
            clause.push_str(" AND category = ?");
            params.push(Box::new(category.clone()));
        }
    }
    (clause, params)
}

fn insert_transaction(conn: &Connection, user: UserId, txn: &NewTransaction) -> Result<Transaction> {
    let timestamp = txn.timestamp.with_nanosecond(0).unwrap_or(txn.timestamp);
    conn.execute(
        "INSERT INTO transactions (user_id, direction, category, amount, date) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![user, txn.direction, txn.category, txn.amount, stamp(&timestamp)],
    )?;
    let id = conn.last_insert_rowid();
    info!(user, id, category = %txn.category, amount = txn.amount, "recorded transaction");
    Ok(Transaction {
        id,
        user_id: user,
        direction: txn.direction,
        category: txn.category.clone(),
        amount: txn.amount,
        timestamp,
    })
}

/// SQLite-backed `Storage`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    fn seed_default_categories(conn: &Connection, user: UserId) -> Result<()> {
        let mut stmt = conn.prepare(
            "INSERT INTO categories (user_id, name, direction, keywords) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (name, direction, keywords) in DEFAULT_CATEGORIES {
            stmt.execute(rusqlite::params![user, name, direction, keywords])?;
        }
        Ok(())
    }
}

impl Storage for SqliteStore {
    fn ensure_user(&self, user: UserId, now: NaiveDateTime) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM users WHERE user_id = ?1", [user], |_| Ok(()))
            .optional()?
            .is_some();

        if exists {
            tx.execute(
                "UPDATE users SET last_activity = ?1 WHERE user_id = ?2",
                rusqlite::params![stamp(&now), user],
            )?;
        } else {
            tx.execute(
                "INSERT INTO users (user_id, last_activity) VALUES (?1, ?2)",
                rusqlite::params![user, stamp(&now)],
            )?;
            Self::seed_default_categories(&tx, user)?;
            info!(user, "registered new user with default categories");
        }
        tx.commit()?;
        Ok(!exists)
    }

    fn categories(&self, user: UserId, direction: Option<Direction>) -> Result<Vec<Category>> {
        let sql = "SELECT id, user_id, name, direction, keywords FROM categories \
                   WHERE user_id = ?1 AND (?2 IS NULL OR direction = ?2) ORDER BY id";
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params![user, direction], row_to_category)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn add_category(&self, user: UserId, category: &NewCategory) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (user_id, name, direction, keywords) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                user,
                category.name,
                category.direction,
                category.keywords.join(",")
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(user, id, name = %category.name, "added category");
        Ok(id)
    }

    fn delete_category(&self, user: UserId, id: i64) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user],
        )?;
        Ok(removed > 0)
    }

    fn add_transaction(&self, user: UserId, txn: &NewTransaction) -> Result<Transaction> {
        insert_transaction(&self.conn, user, txn)
    }

    fn add_transactions(&self, user: UserId, txns: &[NewTransaction]) -> Result<Vec<Transaction>> {
        let tx = self.conn.unchecked_transaction()?;
        let saved = txns
            .iter()
            .map(|txn| insert_transaction(&tx, user, txn))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(saved)
    }

    fn transactions(&self, user: UserId, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let (clause, params) = filter_clause(user, filter, true);
        let sql = format!(
            "SELECT id, user_id, direction, category, amount, date FROM transactions \
             WHERE {clause} ORDER BY date DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let param_values: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_values.as_slice(), row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn category_totals(&self, user: UserId, filter: &TransactionFilter) -> Result<Vec<CategorySummary>> {
        let (clause, params) = filter_clause(user, filter, false);
        let sql = format!(
            "SELECT category, SUM(amount) AS total FROM transactions \
             WHERE {clause} GROUP BY category ORDER BY total DESC, category ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let param_values: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_values.as_slice(), |row| {
            Ok(CategorySummary {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn notifications_enabled(&self, user: UserId) -> Result<bool> {
        let flag: Option<bool> = self
            .conn
            .query_row(
                "SELECT notifications FROM users WHERE user_id = ?1",
                [user],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(true))
    }

    fn set_notifications(&self, user: UserId, enabled: bool) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE users SET notifications = ?1 WHERE user_id = ?2",
            rusqlite::params![enabled, user],
        )?;
        Ok(updated > 0)
    }

    fn notification_users(&self) -> Result<Vec<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM users WHERE notifications = 1 ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn spend(store: &SqliteStore, user: UserId, direction: Direction, category: &str, amount: f64, ts: &str) {
        store
            .add_transaction(
                user,
                &NewTransaction {
                    direction,
                    category: category.to_string(),
                    amount,
                    timestamp: at(ts),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, store) = test_store();
        let tables: Vec<String> = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["users", "categories", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, store) = test_store();
        init_db(&store.conn).unwrap();
    }

    #[test]
    fn test_ensure_user_seeds_once() {
        let (_dir, store) = test_store();
        assert!(store.ensure_user(7, at("2024-03-15 10:00:00")).unwrap());
        assert!(!store.ensure_user(7, at("2024-03-15 11:00:00")).unwrap());
        let cats = store.categories(7, None).unwrap();
        assert_eq!(cats.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(cats[0].name, "Food");
        assert!(cats[0].keywords.contains(&"groceries".to_string()));

        let last: String = store
            .conn
            .query_row("SELECT last_activity FROM users WHERE user_id = 7", [], |r| r.get(0))
            .unwrap();
        assert_eq!(last, "2024-03-15 11:00:00");
    }

    #[test]
    fn test_categories_filtered_by_direction() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-15 10:00:00")).unwrap();
        let income = store.categories(1, Some(Direction::Income)).unwrap();
        assert_eq!(
            income.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Salary", "Side job", "Gift"]
        );
        assert!(store.categories(2, None).unwrap().is_empty());
    }

    #[test]
    fn test_add_and_delete_category_scoped_to_owner() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-15 10:00:00")).unwrap();
        store.ensure_user(2, at("2024-03-15 10:00:00")).unwrap();
        let id = store
            .add_category(
                1,
                &NewCategory {
                    name: "Games".to_string(),
                    direction: Direction::Expense,
                    keywords: vec!["steam".to_string(), "console".to_string()],
                },
            )
            .unwrap();
        let added = store.categories(1, None).unwrap().pop().unwrap();
        assert_eq!(added.keywords, vec!["steam", "console"]);

        assert!(!store.delete_category(2, id).unwrap());
        assert!(store.delete_category(1, id).unwrap());
        assert!(!store.delete_category(1, id).unwrap());
    }

    #[test]
    fn test_transactions_filters_and_order() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-01 00:00:00")).unwrap();
        spend(&store, 1, Direction::Expense, "Cafe", 500.0, "2024-03-10 09:00:00");
        spend(&store, 1, Direction::Expense, "Transport", 300.0, "2024-03-14 18:00:00");
        spend(&store, 1, Direction::Income, "Salary", 50000.0, "2024-03-15 10:00:00");
        spend(&store, 1, Direction::Expense, "Cafe", 200.0, "2024-02-28 12:00:00");

        let march = TransactionFilter {
            start: Some(at("2024-03-01 00:00:00")),
            end: Some(at("2024-03-15 10:00:00")),
            ..TransactionFilter::default()
        };
        let txns = store.transactions(1, &march).unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].category, "Salary");
        assert_eq!(txns[2].timestamp, at("2024-03-10 09:00:00"));

        let expenses = store.transactions(1, &march.clone().direction(Direction::Expense)).unwrap();
        assert_eq!(expenses.len(), 2);

        let cafe = TransactionFilter {
            category: Some("Cafe".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(store.transactions(1, &cafe).unwrap().len(), 2);
        assert!(store.transactions(2, &TransactionFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_category_totals() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-01 00:00:00")).unwrap();
        spend(&store, 1, Direction::Expense, "Cafe", 500.0, "2024-03-10 09:00:00");
        spend(&store, 1, Direction::Expense, "Cafe", 250.0, "2024-03-11 09:00:00");
        spend(&store, 1, Direction::Expense, "Transport", 900.0, "2024-03-12 09:00:00");
        spend(&store, 1, Direction::Income, "Salary", 1000.0, "2024-03-12 09:00:00");

        let filter = TransactionFilter::default().direction(Direction::Expense);
        let totals = store.category_totals(1, &filter).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Transport");
        assert_eq!(totals[1].total, 750.0);
    }

    #[test]
    fn test_deleting_category_keeps_snapshot() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-01 00:00:00")).unwrap();
        spend(&store, 1, Direction::Expense, "Cafe", 500.0, "2024-03-10 09:00:00");
        let cafe = store
            .categories(1, None)
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Cafe")
            .unwrap();
        assert!(store.delete_category(1, cafe.id).unwrap());
        let txns = store.transactions(1, &TransactionFilter::default()).unwrap();
        assert_eq!(txns[0].category, "Cafe");
    }

    #[test]
    fn test_non_positive_amount_rejected_by_schema() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-01 00:00:00")).unwrap();
        let result = store.add_transaction(
            1,
            &NewTransaction {
                direction: Direction::Expense,
                category: "Cafe".to_string(),
                amount: 0.0,
                timestamp: at("2024-03-10 09:00:00"),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_transactions_is_all_or_nothing() {
        let (_dir, store) = test_store();
        store.ensure_user(1, at("2024-03-01 00:00:00")).unwrap();
        let entry = |category: &str, amount: f64| NewTransaction {
            direction: Direction::Expense,
            category: category.to_string(),
            amount,
            timestamp: at("2024-03-10 09:00:00"),
        };

        let result = store.add_transactions(1, &[entry("Cafe", 500.0), entry("Transport", 0.0)]);
        assert!(result.is_err());
        assert!(store.transactions(1, &TransactionFilter::default()).unwrap().is_empty());

        let saved = store
            .add_transactions(1, &[entry("Cafe", 500.0), entry("Transport", 300.0)])
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved[0].id < saved[1].id);
        assert_eq!(store.transactions(1, &TransactionFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_notifications() {
        let (_dir, store) = test_store();
        assert!(store.notifications_enabled(5).unwrap());
        assert!(!store.set_notifications(5, false).unwrap());

        store.ensure_user(5, at("2024-03-01 00:00:00")).unwrap();
        store.ensure_user(6, at("2024-03-01 00:00:00")).unwrap();
        assert_eq!(store.notification_users().unwrap(), vec![5, 6]);

        assert!(store.set_notifications(5, false).unwrap());
        assert!(!store.notifications_enabled(5).unwrap());
        assert_eq!(store.notification_users().unwrap(), vec![6]);
    }
}
