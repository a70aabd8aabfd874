//! Chat and message persistence over SQLite.
//!
//! All access goes through the [`ChatStore`] trait so handlers stay agnostic
//! of the backing store; [`SqliteChatStore`] is the only production
//! implementation.

pub mod migration;
mod sqlite;
mod types;

pub use sqlite::SqliteChatStore;
pub use types::{ChatSummary, Message, Sender};

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Prefix of the title every chat is created with. A chat still carrying it
/// has not been renamed from its first user message yet.
pub const PLACEHOLDER_TITLE_PREFIX: &str = "Chat •";

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// All chats, newest-created first.
    async fn list_chats(&self) -> Result<Vec<ChatSummary>>;

    /// Full history for one chat, oldest first. Empty for an absent chat;
    /// callers that care about existence use [`ChatStore::chat_exists`].
    async fn get_messages(&self, chat_id: i64) -> Result<Vec<Message>>;

    async fn chat_exists(&self, chat_id: i64) -> Result<bool>;

    /// Returns the id of the new chat.
    async fn create_chat(&self, title: &str, created_at: DateTime<Utc>) -> Result<i64>;

    async fn append_message(
        &self,
        chat_id: i64,
        sender: Sender,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn rename_chat(&self, chat_id: i64, title: &str) -> Result<()>;

    /// Rename the chat only if its title still carries
    /// [`PLACEHOLDER_TITLE_PREFIX`]. Returns whether a rename happened.
    async fn rename_if_placeholder(&self, chat_id: i64, title: &str) -> Result<bool>;

    /// Remove a chat together with all of its messages.
    async fn delete_chat(&self, chat_id: i64) -> Result<()>;
}

/// Open the database pool, creating the file on first run. WAL mode plus a
/// busy timeout serialize writers from concurrent requests at the storage
/// layer.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        // Orphan message rows are documented, allowed behavior and cascade on
        // delete is performed with explicit statements, not a DB-enforced
        // foreign key (see spec.md). sqlx enables foreign key enforcement by
        // default, so disable it to match the documented store contract.
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
