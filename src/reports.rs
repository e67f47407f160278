use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::Result;
use crate::models::{Direction, Transaction, UserId};
use crate::period::{period_label, resolve_period, PeriodKind};
use crate::store::{Storage, TransactionFilter};

/// Number of transactions listed under a report.
pub const RECENT_LIMIT: usize = 15;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub expense_categories: Vec<CategorySummary>,
    pub income_categories: Vec<CategorySummary>,
}

impl Aggregate {
    pub fn categories(&self, direction: Direction) -> &[CategorySummary] {
        match direction {
            Direction::Expense => &self.expense_categories,
            Direction::Income => &self.income_categories,
        }
    }
}

fn sorted_summaries(totals: BTreeMap<String, f64>) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = totals
        .into_iter()
        .map(|(category, total)| CategorySummary { category, total })
        .collect();
    // Stable sort over name-ordered input keeps ties alphabetical.
    summaries.sort_by(|a, b| b.total.total_cmp(&a.total));
    summaries
}

pub fn aggregate(transactions: &[Transaction]) -> Aggregate {
    let mut expense: BTreeMap<String, f64> = BTreeMap::new();
    let mut income: BTreeMap<String, f64> = BTreeMap::new();

    for txn in transactions {
        let bucket = match txn.direction {
            Direction::Expense => &mut expense,
            Direction::Income => &mut income,
        };
        *bucket.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
    }

    let total_income: f64 = income.values().sum();
    let total_expense: f64 = expense.values().sum();

    Aggregate {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        expense_categories: sorted_summaries(expense),
        income_categories: sorted_summaries(income),
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One pie slice as handed to a chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    pub amount: f64,
    pub pct: f64,
}

pub fn chart_slices(summaries: &[CategorySummary]) -> Vec<ChartSlice> {
    let total: f64 = summaries.iter().map(|s| s.total).sum();
    summaries
        .iter()
        .map(|s| ChartSlice {
            label: s.category.clone(),
            amount: s.total,
            pct: if total != 0.0 { s.total / total * 100.0 } else { 0.0 },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Period report
// ---------------------------------------------------------------------------

pub struct PeriodReport {
    pub label: String,
    pub summary: Aggregate,
    /// Newest first, capped at `RECENT_LIMIT`.
    pub recent: Vec<Transaction>,
    pub transaction_count: usize,
}

impl PeriodReport {
    pub fn is_truncated(&self) -> bool {
        self.transaction_count > self.recent.len()
    }
}

pub fn build_report<S: Storage>(
    store: &S,
    user: UserId,
    kind: PeriodKind,
    now: NaiveDateTime,
) -> Result<PeriodReport> {
    let boundary = resolve_period(kind, now);
    let transactions = store.transactions(user, &TransactionFilter::within(&boundary))?;
    let summary = aggregate(&transactions);
    info!(
        user,
        period = %kind,
        count = transactions.len(),
        "built report"
    );

    let transaction_count = transactions.len();
    let recent = transactions.into_iter().take(RECENT_LIMIT).collect();

    Ok(PeriodReport {
        label: period_label(kind, &boundary),
        summary,
        recent,
        transaction_count,
    })
}
