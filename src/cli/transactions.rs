use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{now, Context, DirectionArg};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Direction, TIMESTAMP_FORMAT, UserId};
use crate::period::resolve_period_token;
use crate::store::{Storage, TransactionFilter};

pub fn list(
    user: Option<UserId>,
    period: Option<&str>,
    direction: Option<DirectionArg>,
    category: Option<String>,
) -> Result<()> {
    let ctx = Context::open(user)?;
    let mut filter = match period {
        Some(token) => TransactionFilter::within(&resolve_period_token(token, now())?),
        None => TransactionFilter::default(),
    };
    if let Some(direction) = direction {
        filter = filter.direction(direction.into());
    }
    filter.category = category;

    let rows = ctx.store.transactions(ctx.user, &filter)?;
    if rows.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Amount"]);
    for t in &rows {
        let amt = match t.direction {
            Direction::Expense => money(t.amount, &ctx.settings.currency).red().to_string(),
            Direction::Income => money(t.amount, &ctx.settings.currency).green().to_string(),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.timestamp.format(TIMESTAMP_FORMAT)),
            Cell::new(&t.category),
            Cell::new(amt),
        ]);
    }
    println!("Transactions ({})\n{table}", rows.len());

    // Totals ignore the category filter, so they only make sense without one.
    if filter.category.is_none() {
        let totals = ctx.store.category_totals(ctx.user, &filter)?;
        let mut by_category = Table::new();
        by_category.set_header(vec!["Category", "Total"]);
        for summary in &totals {
            by_category.add_row(vec![
                Cell::new(&summary.category),
                Cell::new(money(summary.total, &ctx.settings.currency)),
            ]);
        }
        println!("\n{}\n{by_category}", "By category".bold());
    }
    Ok(())
}
