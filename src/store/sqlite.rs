//! Implements [`ChatStore`] for SQLite.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};

use super::types::{ChatSummary, Message, Sender};
use super::{ChatStore, PLACEHOLDER_TITLE_PREFIX};

pub struct SqliteChatStore {
    pool: SqlitePool,
}

impl SqliteChatStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
        // id breaks ties between chats created within the same second.
        let rows = sqlx::query("SELECT id, title FROM chats ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChatSummary {
                id: row.get("id"),
                title: row.get("title"),
            })
            .collect())
    }

    async fn get_messages(&self, chat_id: i64) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT sender, text, created_at
            FROM messages
            WHERE chat_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            let sender: String = row.get("sender");
            let created_at: NaiveDateTime = row.get("created_at");
            messages.push(Message {
                sender: sender.parse()?,
                text: row.get("text"),
                created_at: Utc.from_utc_datetime(&created_at),
            });
        }

        Ok(messages)
    }

    async fn chat_exists(&self, chat_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chats WHERE id = ?)")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_chat(&self, title: &str, created_at: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query("INSERT INTO chats (title, created_at) VALUES (?, ?) RETURNING id")
            .bind(title)
            .bind(created_at.naive_utc())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("id"))
    }

    async fn append_message(
        &self,
        chat_id: i64,
        sender: Sender,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        // No existence check on chat_id; a bad caller produces an orphaned row.
        sqlx::query("INSERT INTO messages (chat_id, sender, text, created_at) VALUES (?, ?, ?, ?)")
            .bind(chat_id)
            .bind(sender.as_str())
            .bind(text)
            .bind(created_at.naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn rename_chat(&self, chat_id: i64, title: &str) -> Result<()> {
        sqlx::query("UPDATE chats SET title = ? WHERE id = ?")
            .bind(title)
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn rename_if_placeholder(&self, chat_id: i64, title: &str) -> Result<bool> {
        // Single conditional UPDATE: two racing first sends rename at most once.
        let result = sqlx::query("UPDATE chats SET title = ? WHERE id = ? AND title LIKE ?")
            .bind(title)
            .bind(chat_id)
            .bind(format!("{PLACEHOLDER_TITLE_PREFIX}%"))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<()> {
        // Messages and the chat row go in one transaction, all-or-nothing.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::migration::run_migrations;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn test_store() -> SqliteChatStore {
        // Match the production connection contract: foreign key enforcement is
        // off so orphan message rows are permitted (see spec.md / connect()).
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("create in-memory sqlite");
        run_migrations(&pool).await.expect("run migrations");
        // Idempotency: a second run must be a no-op, not an error.
        run_migrations(&pool).await.expect("re-run migrations");

        SqliteChatStore::new(pool)
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, secs).unwrap()
    }

    #[tokio::test]
    async fn test_list_chats_newest_first() {
        let store = test_store().await;

        let older = store.create_chat("Chat • Mar 14, 12:00 PM", at(0)).await.unwrap();
        let newer = store.create_chat("Chat • Mar 14, 12:00 PM", at(5)).await.unwrap();

        let chats = store.list_chats().await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, newer);
        assert_eq!(chats[1].id, older);
    }

    #[tokio::test]
    async fn test_list_chats_ties_broken_by_id() {
        let store = test_store().await;

        let first = store.create_chat("Chat • a", at(0)).await.unwrap();
        let second = store.create_chat("Chat • b", at(0)).await.unwrap();

        assert!(second > first, "ids are strictly increasing");
        let chats = store.list_chats().await.unwrap();
        assert_eq!(chats[0].id, second);
    }

    #[tokio::test]
    async fn test_messages_ordered_oldest_first() {
        let store = test_store().await;
        let chat_id = store.create_chat("Chat • t", at(0)).await.unwrap();

        store.append_message(chat_id, Sender::Ai, "hello", at(0)).await.unwrap();
        store.append_message(chat_id, Sender::User, "hi", at(1)).await.unwrap();
        store.append_message(chat_id, Sender::Ai, "how can I help?", at(2)).await.unwrap();

        let messages = store.get_messages(chat_id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].sender, Sender::Ai);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[2].text, "how can I help?");
        assert!(messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_get_messages_absent_chat_is_empty() {
        let store = test_store().await;
        assert!(store.get_messages(999).await.unwrap().is_empty());
        assert!(!store.chat_exists(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_message_does_not_validate_chat() {
        let store = test_store().await;

        // Documented contract: the store accepts the row and the caller owns
        // the orphan.
        store.append_message(42, Sender::User, "stray", at(0)).await.unwrap();
        assert_eq!(store.get_messages(42).await.unwrap().len(), 1);
        assert!(!store.chat_exists(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_chat_cascades_and_restores_count() {
        let store = test_store().await;
        let keep = store.create_chat("Chat • keep", at(0)).await.unwrap();
        let before = store.list_chats().await.unwrap().len();

        let doomed = store.create_chat("Chat • doomed", at(1)).await.unwrap();
        store.append_message(doomed, Sender::Ai, "hello", at(1)).await.unwrap();
        store.append_message(doomed, Sender::User, "bye", at(2)).await.unwrap();

        store.delete_chat(doomed).await.unwrap();

        assert_eq!(store.list_chats().await.unwrap().len(), before);
        assert!(!store.chat_exists(doomed).await.unwrap());
        assert!(store.get_messages(doomed).await.unwrap().is_empty(), "no orphaned messages");
        assert!(store.chat_exists(keep).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_if_placeholder_fires_once() {
        let store = test_store().await;
        let chat_id = store.create_chat("Chat • Mar 14, 12:00 PM", at(0)).await.unwrap();

        assert!(store.rename_if_placeholder(chat_id, "first message").await.unwrap());
        assert!(!store.rename_if_placeholder(chat_id, "second message").await.unwrap());

        let chats = store.list_chats().await.unwrap();
        assert_eq!(chats[0].title, "first message");
    }

    #[tokio::test]
    async fn test_rename_chat_is_unconditional() {
        let store = test_store().await;
        let chat_id = store.create_chat("Chat • x", at(0)).await.unwrap();

        store.rename_chat(chat_id, "renamed").await.unwrap();
        store.rename_chat(chat_id, "renamed again").await.unwrap();

        let chats = store.list_chats().await.unwrap();
        assert_eq!(chats[0].title, "renamed again");
    }
}
