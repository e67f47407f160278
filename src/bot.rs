//! Chat-facing handlers. Every entry point takes inbound text plus the
//! current time and returns the reply the transport should send back.

use chrono::NaiveDateTime;
use tracing::info;

use crate::categorizer::resolve_category;
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::models::{parse_keywords, Direction, NewCategory, NewTransaction, Transaction, TransactionDraft, UserId};
use crate::parser::{parse_batch, parse_line};
use crate::period::PeriodKind;
use crate::reports::{build_report, chart_slices, PeriodReport};
use crate::store::Storage;

pub const HELP_TEXT: &str = "\
Commands:
  /start          register and get default categories
  /help           show this help
  /report         report for a day, week, month or year
  /categories     view, add or delete categories
  /notifications  turn daily reminders on or off

To add an expense, write: category amount
  e.g. `cafe 500` or `taxi 300r`
To add income, prefix with +: +category amount
  e.g. `+salary 50000`

Several entries can go in one message, one per line:
  cafe 500
  taxi 300
  +salary 50000

Categories are picked by keywords. Entries with no matching keyword go to
'Other' or 'Other income'.";

const USAGE_HINT: &str = "\
Could not read a transaction. Use:
  expenses: category amount
  income:   +category amount
e.g. `cafe 500` or `+salary 50000`. Send /help for details.";

const ADD_CATEGORY_USAGE: &str = "\
Use: categories add <expense|income> <name> <keywords>
e.g. `categories add expense Taxi taxi,uber,carsharing`";

pub struct Bot<'a, S: Storage> {
    store: &'a S,
    currency: &'a str,
}

impl<'a, S: Storage> Bot<'a, S> {
    pub fn new(store: &'a S, currency: &'a str) -> Self {
        Self { store, currency }
    }

    pub fn start(&self, user: UserId, now: NaiveDateTime) -> Result<String> {
        let created = self.store.ensure_user(user, now)?;
        let mut reply = String::from(
            "Hi! I keep track of your expenses and income, build reports \
             and remind you to log your spending.",
        );
        if created {
            reply.push_str("\nDefault categories have been set up for you.");
        }
        reply.push_str("\nSend /help to see how to use me.");
        Ok(reply)
    }

    /// Resolve the category for a draft, stamped at `now`.
    fn prepare(&self, user: UserId, draft: &TransactionDraft, now: NaiveDateTime) -> Result<NewTransaction> {
        let categories = self.store.categories(user, Some(draft.direction))?;
        Ok(NewTransaction {
            direction: draft.direction,
            category: resolve_category(&categories, &draft.description, draft.direction),
            amount: draft.amount,
            timestamp: now,
        })
    }

    fn confirmation(&self, txn: &Transaction) -> String {
        let sign = match txn.direction {
            Direction::Expense => "-",
            Direction::Income => "+",
        };
        format!("{sign} {} {}", txn.category, money(txn.amount, self.currency))
    }

    /// Treat free text as one or more transaction entries. A multi-line
    /// message is stored in one go: a storage failure leaves none of it.
    pub fn handle_message(&self, user: UserId, text: &str, now: NaiveDateTime) -> Result<String> {
        self.store.ensure_user(user, now)?;
        let text = text.trim();

        if !text.contains('\n') {
            return match parse_line(text) {
                Ok(draft) => {
                    let entry = self.prepare(user, &draft, now)?;
                    let txn = self.store.add_transaction(user, &entry)?;
                    Ok(format!("Added: {}", self.confirmation(&txn)))
                }
                Err(_) => Ok(USAGE_HINT.to_string()),
            };
        }

        let outcome = parse_batch(text);
        if outcome.drafts.is_empty() {
            return Ok(USAGE_HINT.to_string());
        }

        let entries = outcome
            .drafts
            .iter()
            .map(|draft| self.prepare(user, draft, now))
            .collect::<Result<Vec<_>>>()?;
        let saved = self.store.add_transactions(user, &entries)?;
        info!(
            user,
            added = saved.len(),
            skipped = outcome.rejected.len(),
            "handled batch message"
        );

        let mut lines = vec!["Added transactions:".to_string()];
        lines.extend(saved.iter().map(|txn| self.confirmation(txn)));
        lines.push(String::new());
        lines.push(format!("Total added: {}", saved.len()));
        if !outcome.rejected.is_empty() {
            lines.push(format!("Skipped unreadable lines: {}", outcome.rejected.len()));
        }
        Ok(lines.join("\n"))
    }

    pub fn report(&self, user: UserId, kind: PeriodKind, now: NaiveDateTime) -> Result<String> {
        self.store.ensure_user(user, now)?;
        let report = build_report(self.store, user, kind, now)?;
        Ok(self.render_report(&report))
    }

    fn breakdown_lines(&self, report: &PeriodReport, direction: Direction) -> Vec<String> {
        let (title, empty) = match direction {
            Direction::Expense => ("Expenses by category", "No expense data for a chart."),
            Direction::Income => ("Income by category", "No income data for a chart."),
        };
        let slices = chart_slices(report.summary.categories(direction));
        if slices.is_empty() {
            return vec![empty.to_string()];
        }
        let mut lines = vec![format!("{title}:")];
        lines.extend(slices.iter().map(|slice| {
            format!(
                "  {}: {} ({})",
                slice.label,
                money(slice.amount, self.currency),
                percent(slice.pct)
            )
        }));
        lines
    }

    pub fn render_report(&self, report: &PeriodReport) -> String {
        let summary = &report.summary;
        let mut lines = vec![
            format!("Report for {}", report.label),
            String::new(),
            format!("Income:   {}", money(summary.total_income, self.currency)),
            format!("Expenses: {}", money(summary.total_expense, self.currency)),
            format!("Balance:  {}", money(summary.balance, self.currency)),
            String::new(),
        ];
        lines.extend(self.breakdown_lines(report, Direction::Expense));
        lines.extend(self.breakdown_lines(report, Direction::Income));

        if !report.recent.is_empty() {
            lines.push(String::new());
            lines.push(
                if report.is_truncated() {
                    "Latest transactions:"
                } else {
                    "All transactions for the period:"
                }
                .to_string(),
            );
            lines.extend(report.recent.iter().map(|txn| {
                format!("{} {}", txn.timestamp.format("%d.%m.%Y %H:%M"), self.confirmation(txn))
            }));
            if report.is_truncated() {
                lines.push(format!("(showing the latest {} only)", report.recent.len()));
            }
        }
        lines.join("\n")
    }

    /// Create a category from already separated fields. `keywords` is a
    /// comma-separated list.
    pub fn create_category(
        &self,
        user: UserId,
        direction: Direction,
        name: &str,
        keywords: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        self.store.ensure_user(user, now)?;
        let name = name.trim();
        let keywords = parse_keywords(keywords);
        if name.is_empty() || keywords.is_empty() {
            return Ok(format!("A category needs a name and at least one keyword.\n{ADD_CATEGORY_USAGE}"));
        }

        self.store.add_category(
            user,
            &NewCategory {
                name: name.to_string(),
                direction,
                keywords,
            },
        )?;
        Ok(format!("Category '{name}' added."))
    }

    pub fn delete_category(&self, user: UserId, id: i64) -> Result<String> {
        if self.store.delete_category(user, id)? {
            Ok("Category deleted.".to_string())
        } else {
            Ok("Could not delete the category.".to_string())
        }
    }

    pub fn set_notifications(&self, user: UserId, enabled: bool, now: NaiveDateTime) -> Result<String> {
        self.store.ensure_user(user, now)?;
        self.store.set_notifications(user, enabled)?;
        Ok(if enabled {
            "Notifications enabled.".to_string()
        } else {
            "Notifications disabled.".to_string()
        })
    }

    pub fn notification_status(&self, user: UserId) -> Result<String> {
        let state = if self.store.notifications_enabled(user)? {
            "on"
        } else {
            "off"
        };
        Ok(format!("Daily reminders are currently {state}."))
    }
}
