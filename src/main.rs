mod bot;
mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod parser;
mod period;
mod reminders;
mod reports;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{CategoriesCommands, Cli, Commands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let user = cli.user;

    let result = match cli.command {
        Commands::Init {
            data_dir,
            default_user,
        } => cli::init::run(data_dir, default_user),
        Commands::Start => cli::message::start(user),
        Commands::Help => cli::message::help(),
        Commands::Add { text } => cli::message::add(user, &text),
        Commands::Report { period } => cli::report::run(user, &period),
        Commands::Categories { command } => match command {
            CategoriesCommands::List { direction } => cli::categories::list(user, direction),
            CategoriesCommands::Add {
                direction,
                name,
                keywords,
            } => cli::categories::add(user, direction, &name, &keywords),
            CategoriesCommands::Delete { id } => cli::categories::delete(user, id),
        },
        Commands::Transactions {
            period,
            direction,
            category,
        } => cli::transactions::list(user, period.as_deref(), direction, category),
        Commands::Notifications { action } => cli::notifications::run(user, action),
        Commands::Remind => cli::remind::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
