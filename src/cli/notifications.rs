use crate::bot::Bot;
use crate::cli::{now, Context, NotificationAction};
use crate::error::Result;
use crate::models::UserId;

pub fn run(user: Option<UserId>, action: NotificationAction) -> Result<()> {
    let ctx = Context::open(user)?;
    let bot = Bot::new(&ctx.store, &ctx.settings.currency);
    let reply = match action {
        NotificationAction::On => bot.set_notifications(ctx.user, true, now())?,
        NotificationAction::Off => bot.set_notifications(ctx.user, false, now())?,
        NotificationAction::Status => bot.notification_status(ctx.user)?,
    };
    println!("{reply}");
    Ok(())
}
