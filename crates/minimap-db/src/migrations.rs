use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            fid             INTEGER PRIMARY KEY,
            username        TEXT NOT NULL,
            display_name    TEXT,
            avatar_url      TEXT,
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS notification_tokens (
            fid             INTEGER NOT NULL,
            token           TEXT NOT NULL,
            url             TEXT NOT NULL,
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(fid, token)
        );

        CREATE INDEX IF NOT EXISTS idx_tokens_fid
            ON notification_tokens(fid);

        -- Append-only audit trail, one row per received webhook
        CREATE TABLE IF NOT EXISTS webhook_events (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            event_type      TEXT NOT NULL,
            fid             INTEGER,
            data            TEXT NOT NULL,
            processed       INTEGER NOT NULL DEFAULT 0,
            received_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Delivery receipts reported by the provider
        CREATE TABLE IF NOT EXISTS notification_logs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            notification_id TEXT,
            fid             INTEGER NOT NULL,
            success         INTEGER NOT NULL,
            data            TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
