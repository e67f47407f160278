use std::convert::Infallible;

use colored::Colorize;

use crate::db::SqliteStore;
use crate::error::Result;
use crate::reminders::send_daily_reminders;
use crate::settings::load_settings;

/// One reminder pass; stdout stands in for the chat transport.
pub fn run() -> Result<()> {
    let settings = load_settings();
    let store = SqliteStore::open(&settings.db_path())?;
    let result = send_daily_reminders(&store, |user, text| {
        println!("{} {text}", format!("[{user}]").bold());
        Ok::<(), Infallible>(())
    })?;
    println!(
        "{} delivered, {} failed",
        result.delivered, result.failed
    );
    Ok(())
}
