//! v001 -- Initial schema creation.
//!
//! Creates the single-row `session` table and seeds its row so later code can
//! always `UPDATE` instead of upserting.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Session (single row, id always 1)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS session (
    id         INTEGER PRIMARY KEY CHECK (id = 1),
    token      TEXT,                        -- bearer token, NULL when logged out
    login_time TEXT                         -- ISO-8601 / RFC-3339, NULL iff token is NULL
);

INSERT OR IGNORE INTO session (id, token, login_time) VALUES (1, NULL, NULL);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
