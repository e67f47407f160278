pub mod categories;
pub mod init;
pub mod message;
pub mod notifications;
pub mod remind;
pub mod report;
pub mod transactions;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};

use crate::db::SqliteStore;
use crate::error::{PocketError, Result};
use crate::models::{Direction, UserId};
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "pocketbook",
    about = "Personal finance tracker driven by chat-style text entries.",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Chat user id to act as (default: settings.default_user)
    #[arg(long, global = true)]
    pub user: Option<UserId>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for pocketbook data (default: ~/Documents/pocketbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Remember this user id as the default
        #[arg(long = "default-user")]
        default_user: Option<UserId>,
    },
    /// Register the user and seed default categories.
    Start,
    /// Show usage help.
    Help,
    /// Record transactions from free text, one entry per line.
    Add {
        /// e.g. 'coffee 500' or '+salary 50000'
        text: String,
    },
    /// Period report with totals and category breakdown.
    Report {
        /// day, week, month or year
        period: String,
    },
    /// Manage keyword categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// List recorded transactions.
    Transactions {
        /// Limit to a period: day, week, month or year
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        direction: Option<DirectionArg>,
        /// Exact category name
        #[arg(long)]
        category: Option<String>,
    },
    /// Daily reminder subscription.
    Notifications {
        #[arg(value_enum)]
        action: NotificationAction,
    },
    /// Send the daily reminder to every subscribed user.
    Remind,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories of one direction (both when omitted).
    List {
        #[arg(long)]
        direction: Option<DirectionArg>,
    },
    /// Add a category: <expense|income> <name> <comma-separated keywords>
    Add {
        #[arg(value_enum)]
        direction: DirectionArg,
        /// Category name, quoted if it has spaces
        name: String,
        /// e.g. 'taxi,uber,carsharing'
        keywords: String,
    },
    /// Delete a category by id.
    Delete { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Expense,
    Income,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Expense => Direction::Expense,
            DirectionArg::Income => Direction::Income,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NotificationAction {
    On,
    Off,
    Status,
}

/// Settings, store and acting user shared by the command handlers.
pub struct Context {
    pub settings: Settings,
    pub store: SqliteStore,
    pub user: UserId,
}

impl Context {
    pub fn open(user: Option<UserId>) -> Result<Self> {
        let settings = load_settings();
        let user = user.or(settings.default_user).ok_or_else(|| {
            PocketError::Other(
                "No user given: pass --user or run `pocketbook init --default-user <id>`".to_string(),
            )
        })?;
        let store = SqliteStore::open(&settings.db_path())?;
        Ok(Self {
            settings,
            store,
            user,
        })
    }
}

pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
