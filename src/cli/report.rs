use crate::bot::Bot;
use crate::cli::{now, Context};
use crate::error::Result;
use crate::models::UserId;
use crate::period::PeriodKind;

pub fn run(user: Option<UserId>, period: &str) -> Result<()> {
    let kind: PeriodKind = period.parse()?;
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    println!("{}", bot.report(ctx.user, kind, now())?);
    Ok(())
}
