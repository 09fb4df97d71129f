//! Login session persistence.
//!
//! The session is a single record: the bearer token handed out by the album
//! server and the instant it was stored.  A session is valid for
//! [`SESSION_LIFETIME_DAYS`] days from the login instant; exactly at the
//! boundary it is already expired.  Expiry is never pushed anywhere -- callers
//! discover it the next time they ask.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use crate::database::Database;
use crate::error::Result;

/// How long a stored token stays usable, in days.
pub const SESSION_LIFETIME_DAYS: i64 = 30;

/// Snapshot of the persisted session.
///
/// Invariant (enforced by [`Database::set_token`]): `login_time` is `Some`
/// if and only if `token` is.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub login_time: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session is usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.login_time) {
            (Some(_), Some(login)) => now < login + Duration::days(SESSION_LIFETIME_DAYS),
            _ => false,
        }
    }

    /// Whole days of validity left at `now`, clamped to zero.
    pub fn remaining_days_at(&self, now: DateTime<Utc>) -> i64 {
        match (&self.token, self.login_time) {
            (Some(_), Some(login)) => {
                let expiry = login + Duration::days(SESSION_LIFETIME_DAYS);
                (expiry - now).num_days().max(0)
            }
            _ => 0,
        }
    }
}

impl Database {
    /// Read the persisted session.
    pub fn session(&self) -> Result<Session> {
        let (token, login_time): (Option<String>, Option<String>) = self.conn().query_row(
            "SELECT token, login_time FROM session WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let login_time = match login_time {
            Some(s) => Some(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc)),
            None => None,
        };

        Ok(Session { token, login_time })
    }

    /// Convenience accessor for the stored token.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.session()?.token)
    }

    /// Store or clear the bearer token.
    ///
    /// A non-empty token also records the current instant as the login time.
    /// `None` or an empty string clears both fields.
    pub fn set_token(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(t) if !t.is_empty() => self.set_token_at(t, Utc::now()),
            _ => {
                self.conn().execute(
                    "UPDATE session SET token = NULL, login_time = NULL WHERE id = 1",
                    [],
                )?;
                tracing::debug!("session cleared");
                Ok(())
            }
        }
    }

    /// Store a token with an explicit login instant.
    pub fn set_token_at(&self, token: &str, login_time: DateTime<Utc>) -> Result<()> {
        self.conn().execute(
            "UPDATE session SET token = ?1, login_time = ?2 WHERE id = 1",
            params![token, login_time.to_rfc3339()],
        )?;
        tracing::debug!(login_time = %login_time.to_rfc3339(), "session stored");
        Ok(())
    }

    /// Whether a token is stored and still inside its validity window.
    pub fn is_logged_in(&self) -> Result<bool> {
        self.is_logged_in_at(Utc::now())
    }

    /// [`Database::is_logged_in`] against an explicit clock.
    pub fn is_logged_in_at(&self, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.session()?.is_valid_at(now))
    }

    /// Whole days of validity left, 0 when there is no session.
    pub fn remaining_days(&self) -> Result<i64> {
        self.remaining_days_at(Utc::now())
    }

    /// [`Database::remaining_days`] against an explicit clock.
    pub fn remaining_days_at(&self, now: DateTime<Utc>) -> Result<i64> {
        Ok(self.session()?.remaining_days_at(now))
    }

    /// Clear the session.
    pub fn logout(&self) -> Result<()> {
        self.set_token(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn fresh_database_has_no_session() {
        let (_dir, db) = open_test_db();

        assert_eq!(db.token().unwrap(), None);
        assert!(!db.is_logged_in().unwrap());
        assert_eq!(db.remaining_days().unwrap(), 0);
    }

    #[test]
    fn token_round_trip_and_clear() {
        let (_dir, db) = open_test_db();

        db.set_token(Some("tok-1")).unwrap();
        let session = db.session().unwrap();
        assert_eq!(session.token.as_deref(), Some("tok-1"));
        assert!(session.login_time.is_some());
        assert!(db.is_logged_in().unwrap());

        // Replacing keeps the invariant.
        db.set_token(Some("tok-2")).unwrap();
        assert_eq!(db.token().unwrap().as_deref(), Some("tok-2"));

        // Clearing via None drops both fields.
        db.set_token(None).unwrap();
        let session = db.session().unwrap();
        assert_eq!(session.token, None);
        assert_eq!(session.login_time, None);

        // An empty token clears too.
        db.set_token(Some("tok-3")).unwrap();
        db.set_token(Some("")).unwrap();
        assert_eq!(db.token().unwrap(), None);
    }

    #[test]
    fn session_expires_exactly_at_the_boundary() {
        let (_dir, db) = open_test_db();

        let login = Utc::now();
        db.set_token_at("abc", login).unwrap();

        let boundary = login + Duration::days(SESSION_LIFETIME_DAYS);
        assert!(db.is_logged_in_at(boundary - Duration::seconds(1)).unwrap());
        assert!(!db.is_logged_in_at(boundary).unwrap());
        assert!(!db.is_logged_in_at(boundary + Duration::days(1)).unwrap());
    }

    #[test]
    fn remaining_days_counts_down_to_zero() {
        let (_dir, db) = open_test_db();

        let login = Utc::now();
        db.set_token_at("abc", login).unwrap();

        assert_eq!(db.remaining_days_at(login).unwrap(), 30);
        assert_eq!(db.remaining_days_at(login + Duration::days(15)).unwrap(), 15);
        // Fractional days are floored.
        assert_eq!(
            db.remaining_days_at(login + Duration::days(29) + Duration::hours(12))
                .unwrap(),
            0
        );
        assert_eq!(db.remaining_days_at(login + Duration::days(30)).unwrap(), 0);
        // Clamped after expiry, never negative.
        assert_eq!(db.remaining_days_at(login + Duration::days(45)).unwrap(), 0);
    }

    #[test]
    fn logout_clears_the_session() {
        let (_dir, db) = open_test_db();

        db.set_token(Some("abc")).unwrap();
        assert!(db.is_logged_in().unwrap());

        db.logout().unwrap();
        assert!(!db.is_logged_in().unwrap());
        assert_eq!(db.session().unwrap().login_time, None);
    }

    #[test]
    fn session_survives_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.set_token(Some("persisted")).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.token().unwrap().as_deref(), Some("persisted"));
    }
}
