//! Handles schema setup for SQLite: chats and messages tables.
//! Run this at startup; safe to call repeatedly (idempotent).

use anyhow::Result;
use sqlx::{Executor, SqlitePool};

/// AUTOINCREMENT keeps ids strictly increasing and never reused, so a chat id
/// stays unique across the lifetime of the store even after deletes.
const CREATE_CHATS: &str = r#"
CREATE TABLE IF NOT EXISTS chats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    created_at DATETIME NOT NULL
);
"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    sender TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    FOREIGN KEY (chat_id) REFERENCES chats(id)
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages(chat_id);
CREATE INDEX IF NOT EXISTS idx_chats_created_at ON chats(created_at);
"#;

/// Runs all required migrations for the SQLite backend.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_CHATS).await?;
    pool.execute(CREATE_MESSAGES).await?;
    pool.execute(CREATE_INDICES).await?;

    Ok(())
}
