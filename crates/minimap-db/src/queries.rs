use crate::Database;
use anyhow::Result;
use minimap_types::models::{NotificationLogRow, NotificationTokenRow, UserRow, WebhookEventRow};
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Idempotent upsert keyed on fid. Returns the stored row.
    pub fn upsert_user(
        &self,
        fid: i64,
        username: &str,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (fid, username, display_name, avatar_url, updated_at)
                 VALUES (?1, ?2, ?3, ?4, datetime('now'))
                 ON CONFLICT(fid) DO UPDATE SET
                     username = excluded.username,
                     display_name = excluded.display_name,
                     avatar_url = excluded.avatar_url,
                     updated_at = excluded.updated_at",
                rusqlite::params![fid, username, display_name, avatar_url],
            )?;
            query_user(conn, fid)?.ok_or_else(|| anyhow::anyhow!("User {} vanished after upsert", fid))
        })
    }

    pub fn get_user(&self, fid: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, fid))
    }

    // -- Notification tokens --

    /// Store the token for a user, replacing any prior tokens for that fid.
    /// Last write wins when two frame-added events race; the provider only
    /// honors the newest token anyway.
    pub fn upsert_token(&self, fid: i64, token: &str, url: &str) -> Result<NotificationTokenRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM notification_tokens WHERE fid = ?1", [fid])?;
            tx.execute(
                "INSERT INTO notification_tokens (fid, token, url, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))",
                rusqlite::params![fid, token, url],
            )?;
            tx.commit()?;

            query_tokens(conn, fid)?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("Token for fid {} vanished after upsert", fid))
        })
    }

    /// Delete one token row if `token` is given, otherwise all rows for the
    /// fid. Returns the number of rows deleted.
    pub fn delete_tokens(&self, fid: i64, token: Option<&str>) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let deleted = match token {
                Some(token) => conn.execute(
                    "DELETE FROM notification_tokens WHERE fid = ?1 AND token = ?2",
                    rusqlite::params![fid, token],
                )?,
                None => conn.execute("DELETE FROM notification_tokens WHERE fid = ?1", [fid])?,
            };
            Ok(deleted)
        })
    }

    pub fn list_tokens(&self, fid: i64) -> Result<Vec<NotificationTokenRow>> {
        self.with_conn(|conn| query_tokens(conn, fid))
    }

    /// Batch-fetch tokens for a set of fids.
    pub fn list_tokens_for_fids(&self, fids: &[i64]) -> Result<Vec<NotificationTokenRow>> {
        if fids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=fids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT fid, token, url, updated_at FROM notification_tokens WHERE fid IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = fids
                .iter()
                .map(|fid| fid as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), token_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Webhook audit trail --

    pub fn insert_webhook_event(
        &self,
        event_type: &str,
        fid: Option<i64>,
        data: &str,
        processed: bool,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO webhook_events (event_type, fid, data, processed)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![event_type, fid, data, processed],
            )?;
            Ok(())
        })
    }

    pub fn recent_webhook_events(&self, limit: u32) -> Result<Vec<WebhookEventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, event_type, fid, data, processed, received_at
                 FROM webhook_events ORDER BY id DESC LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(WebhookEventRow {
                        id: row.get(0)?,
                        event_type: row.get(1)?,
                        fid: row.get(2)?,
                        data: row.get(3)?,
                        processed: row.get(4)?,
                        received_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Notification delivery logs --

    pub fn insert_notification_log(
        &self,
        notification_id: Option<&str>,
        fid: i64,
        success: bool,
        data: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notification_logs (notification_id, fid, success, data)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![notification_id, fid, success, data],
            )?;
            Ok(())
        })
    }

    pub fn count_notification_logs(&self, fid: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM notification_logs WHERE fid = ?1",
                [fid],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    pub fn notification_logs(&self, fid: i64) -> Result<Vec<NotificationLogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, notification_id, fid, success, data, created_at
                 FROM notification_logs WHERE fid = ?1 ORDER BY id",
            )?;

            let rows = stmt
                .query_map([fid], |row| {
                    Ok(NotificationLogRow {
                        id: row.get(0)?,
                        notification_id: row.get(1)?,
                        fid: row.get(2)?,
                        success: row.get(3)?,
                        data: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, fid: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT fid, username, display_name, avatar_url, updated_at FROM users WHERE fid = ?1",
    )?;

    let row = stmt
        .query_row([fid], |row| {
            Ok(UserRow {
                fid: row.get(0)?,
                username: row.get(1)?,
                display_name: row.get(2)?,
                avatar_url: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_tokens(conn: &Connection, fid: i64) -> Result<Vec<NotificationTokenRow>> {
    let mut stmt = conn.prepare(
        "SELECT fid, token, url, updated_at FROM notification_tokens WHERE fid = ?1",
    )?;

    let rows = stmt
        .query_map([fid], token_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn token_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<NotificationTokenRow, rusqlite::Error> {
    Ok(NotificationTokenRow {
        fid: row.get(0)?,
        token: row.get(1)?,
        url: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    /// Insert a token row directly, bypassing the replace-for-fid upsert.
    /// Models legacy data where a user accumulated several tokens.
    fn insert_raw_token(db: &Database, fid: i64, token: &str, url: &str) {
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notification_tokens (fid, token, url) VALUES (?1, ?2, ?3)",
                rusqlite::params![fid, token, url],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn upsert_user_is_idempotent_on_fid() {
        let db = db();

        let row = db.upsert_user(42, "alice", None, None).unwrap();
        assert_eq!(row.username, "alice");

        let row = db
            .upsert_user(42, "alice2", Some("Alice"), Some("https://img/a.png"))
            .unwrap();
        assert_eq!(row.username, "alice2");
        assert_eq!(row.display_name.as_deref(), Some("Alice"));

        // Still exactly one row for the fid
        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM users WHERE fid = 42", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn upsert_token_replaces_all_prior_tokens_for_fid() {
        let db = db();
        insert_raw_token(&db, 42, "old-1", "https://x/n");
        insert_raw_token(&db, 42, "old-2", "https://x/n");

        let row = db.upsert_token(42, "fresh", "https://x/n").unwrap();
        assert_eq!(row.token, "fresh");

        let tokens = db.list_tokens(42).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "fresh");
    }

    #[test]
    fn upsert_token_twice_leaves_one_row() {
        let db = db();
        db.upsert_token(7, "tok", "https://x/n").unwrap();
        db.upsert_token(7, "tok", "https://x/n").unwrap();

        assert_eq!(db.list_tokens(7).unwrap().len(), 1);
    }

    #[test]
    fn delete_tokens_scopes_by_token_when_given() {
        let db = db();
        insert_raw_token(&db, 42, "t1", "https://x/n");
        insert_raw_token(&db, 42, "t2", "https://x/n");
        insert_raw_token(&db, 43, "t3", "https://x/n");

        assert_eq!(db.delete_tokens(42, Some("t1")).unwrap(), 1);
        assert_eq!(db.list_tokens(42).unwrap().len(), 1);

        // No token: everything for the fid goes
        assert_eq!(db.delete_tokens(42, None).unwrap(), 1);
        assert!(db.list_tokens(42).unwrap().is_empty());

        // Other users untouched
        assert_eq!(db.list_tokens(43).unwrap().len(), 1);
    }

    #[test]
    fn list_tokens_for_fids_batches() {
        let db = db();
        insert_raw_token(&db, 1, "a", "https://x/n");
        insert_raw_token(&db, 2, "b", "https://x/n");
        insert_raw_token(&db, 3, "c", "https://x/n");

        let rows = db.list_tokens_for_fids(&[1, 3]).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(db.list_tokens_for_fids(&[]).unwrap().is_empty());
    }

    #[test]
    fn webhook_events_are_append_only_records() {
        let db = db();
        db.insert_webhook_event("frame.added", Some(42), r#"{"event":"frame.added"}"#, true)
            .unwrap();
        db.insert_webhook_event("unknown", None, r#"{"foo":1}"#, false)
            .unwrap();

        let events = db.recent_webhook_events(10).unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert_eq!(events[0].event_type, "unknown");
        assert!(!events[0].processed);
        assert_eq!(events[1].fid, Some(42));
        assert!(events[1].processed);
    }

    #[test]
    fn notification_logs_record_receipts() {
        let db = db();
        db.insert_notification_log(Some("n-1"), 42, true, r#"{"notification_id":"n-1"}"#)
            .unwrap();
        db.insert_notification_log(None, 42, false, r#"{}"#).unwrap();

        assert_eq!(db.count_notification_logs(42).unwrap(), 2);
        assert_eq!(db.count_notification_logs(99).unwrap(), 0);

        let logs = db.notification_logs(42).unwrap();
        assert_eq!(logs[0].notification_id.as_deref(), Some("n-1"));
        assert!(logs[0].success);
        assert!(logs[1].notification_id.is_none());
        assert!(!logs[1].success);
    }
}
