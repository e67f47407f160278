use crate::bot::{Bot, HELP_TEXT};
use crate::cli::{now, Context};
use crate::error::Result;
use crate::models::UserId;

pub fn start(user: Option<UserId>) -> Result<()> {
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    println!("{}", bot.start(ctx.user, now())?);
    Ok(())
}

pub fn help() -> Result<()> {
    println!("{HELP_TEXT}");
    Ok(())
}

pub fn add(user: Option<UserId>, text: &str) -> Result<()> {
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    println!("{}", bot.handle_message(ctx.user, text, now())?);
    Ok(())
}
