use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::bot::Bot;
use crate::cli::{now, Context, DirectionArg};
use crate::error::Result;
use crate::models::UserId;
use crate::store::Storage;

pub fn list(user: Option<UserId>, direction: Option<DirectionArg>) -> Result<()> {
    let ctx = Context::open(user)?;
    ctx.store.ensure_user(ctx.user, now())?;
    let categories = ctx.store.categories(ctx.user, direction.map(Into::into))?;

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Keywords"]);
    for cat in categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.name),
            Cell::new(cat.direction),
            Cell::new(cat.keywords.join(", ")),
        ]);
    }
    println!("{}\n{table}", "Categories".bold());
    Ok(())
}

pub fn add(user: Option<UserId>, direction: DirectionArg, name: &str, keywords: &str) -> Result<()> {
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    println!(
        "{}",
        bot.create_category(ctx.user, direction.into(), name, keywords, now())?
    );
    Ok(())
}

pub fn delete(user: Option<UserId>, id: i64) -> Result<()> {
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    println!("{}", bot.delete_category(ctx.user, id)?);
    Ok(())
}
