use std::fmt::Display;

use tracing::{error, info};

use crate::error::Result;
use crate::models::UserId;
use crate::store::Storage;

pub const REMINDER_TEXT: &str = "Don't forget to log today's expenses and income!";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReminderRun {
    pub delivered: usize,
    pub failed: usize,
}

/// One reminder pass over every subscribed user. Delivery failures are
/// logged and counted; the pass carries on with the next user.
pub fn send_daily_reminders<S, F, E>(store: &S, mut deliver: F) -> Result<ReminderRun>
where
    S: Storage,
    F: FnMut(UserId, &str) -> std::result::Result<(), E>,
    E: Display,
{
    let users = store.notification_users()?;
    info!(count = users.len(), "sending daily reminders");

    let mut run = ReminderRun::default();
    for user in users {
        match deliver(user, REMINDER_TEXT) {
            Ok(()) => {
                info!(user, "reminder delivered");
                run.delivered += 1;
            }
            Err(e) => {
                error!(user, error = %e, "reminder delivery failed");
                run.failed += 1;
            }
        }
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use chrono::NaiveDateTime;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-15 21:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_only_subscribed_users_reminded() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        for user in [1, 2, 3] {
            store.ensure_user(user, now()).unwrap();
        }
        store.set_notifications(2, false).unwrap();

        let mut seen = Vec::new();
        let run = send_daily_reminders(&store, |user, text| {
            seen.push((user, text.to_string()));
            Ok::<(), String>(())
        })
        .unwrap();

        assert_eq!(run, ReminderRun { delivered: 2, failed: 0 });
        assert_eq!(seen.iter().map(|(u, _)| *u).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(seen[0].1, REMINDER_TEXT);
    }

    #[test]
    fn test_failures_do_not_stop_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        for user in [10, 11, 12] {
            store.ensure_user(user, now()).unwrap();
        }

        let run = send_daily_reminders(&store, |user, _| {
            if user == 11 {
                Err("chat blocked by user")
            } else {
                Ok(())
            }
        })
        .unwrap();
        assert_eq!(run, ReminderRun { delivered: 2, failed: 1 });
    }

    #[test]
    fn test_no_users() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        let run = send_daily_reminders(&store, |_, _| Ok::<(), String>(())).unwrap();
        assert_eq!(run, ReminderRun::default());
    }
}
