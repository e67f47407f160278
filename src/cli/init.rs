use std::path::PathBuf;

use crate::db::SqliteStore;
use crate::error::Result;
use crate::models::UserId;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, default_user: Option<UserId>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if default_user.is_some() {
        settings.default_user = default_user;
    }
    save_settings(&settings)?;

    std::fs::create_dir_all(&settings.data_dir)?;
    SqliteStore::open(&settings.db_path())?;

    println!("Initialized pocketbook at {}", settings.data_dir);
    Ok(())
}

fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
