// Request handlers: each one composes the chat store and, for sends, the
// completion provider. Anything that does not render a page resolves via
// redirect, so a plain browser form drives the whole interface.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::error::{ApiResult, IntoApiError};
use super::render;
use crate::llm::CompletionProvider;
use crate::state::AppState;
use crate::store::{ChatStore, Sender, PLACEHOLDER_TITLE_PREFIX};

/// Synthetic opener stored as the first message of every new chat.
const GREETING: &str =
    "Hey there! 👋 I'm your AI assistant. Ask me anything and I'll do my best to help! 🚀";

/// Longest excerpt of the first user message used as a chat title.
const TITLE_EXCERPT_CHARS: usize = 35;

#[derive(Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub message: String,
}

fn chat_url(chat_id: i64) -> String {
    format!("/chat/{chat_id}")
}

/// Title for a brand-new chat, e.g. "Chat • Aug 07, 03:15 PM".
fn placeholder_title() -> String {
    format!("{} {}", PLACEHOLDER_TITLE_PREFIX, Local::now().format("%b %d, %I:%M %p"))
}

/// Excerpt of the first user message, capped at 35 characters.
fn derive_title(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_EXCERPT_CHARS).collect();
    if text.chars().count() > TITLE_EXCERPT_CHARS {
        title.push_str("...");
    }
    title
}

pub async fn home(State(state): State<AppState>) -> ApiResult<Redirect> {
    let chats = state.store.list_chats().await.into_api_error("Failed to list chats")?;

    Ok(match chats.first() {
        Some(latest) => Redirect::to(&chat_url(latest.id)),
        None => Redirect::to("/new_chat"),
    })
}

pub async fn view_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> ApiResult<Response> {
    let exists = state
        .store
        .chat_exists(chat_id)
        .await
        .into_api_error("Failed to look up chat")?;
    if !exists {
        return Ok(Redirect::to("/").into_response());
    }

    let chats = state.store.list_chats().await.into_api_error("Failed to list chats")?;
    let messages = state
        .store
        .get_messages(chat_id)
        .await
        .into_api_error("Failed to load messages")?;
    let page = render::chat_page(&chats, &messages, chat_id)
        .into_api_error("Failed to render chat page")?;

    Ok(Html(page).into_response())
}

pub async fn new_chat(State(state): State<AppState>) -> ApiResult<Redirect> {
    let now = Utc::now();
    let chat_id = state
        .store
        .create_chat(&placeholder_title(), now)
        .await
        .into_api_error("Failed to create chat")?;
    state
        .store
        .append_message(chat_id, Sender::Ai, GREETING, now)
        .await
        .into_api_error("Failed to store greeting")?;

    info!("created chat {}", chat_id);
    Ok(Redirect::to(&chat_url(chat_id)))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Form(form): Form<SendForm>,
) -> ApiResult<Redirect> {
    let text = form.message.trim();
    if text.is_empty() {
        return Ok(Redirect::to(&chat_url(chat_id)));
    }

    state
        .store
        .append_message(chat_id, Sender::User, text, Utc::now())
        .await
        .into_api_error("Failed to store user message")?;

    // Fail-soft: a provider failure becomes a displayable reply, never a 5xx.
    let reply = match state.completions.complete(text).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("completion failed: {}", err);
            format!("Sorry, I encountered an error: {err}")
        }
    };

    state
        .store
        .append_message(chat_id, Sender::Ai, &reply, Utc::now())
        .await
        .into_api_error("Failed to store reply")?;

    let renamed = state
        .store
        .rename_if_placeholder(chat_id, &derive_title(text))
        .await
        .into_api_error("Failed to rename chat")?;
    if renamed {
        info!("chat {} titled from first message", chat_id);
    }

    Ok(Redirect::to(&chat_url(chat_id)))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> ApiResult<Redirect> {
    state
        .store
        .delete_chat(chat_id)
        .await
        .into_api_error("Failed to delete chat")?;
    info!("deleted chat {}", chat_id);

    let remaining = state.store.list_chats().await.into_api_error("Failed to list chats")?;
    Ok(match remaining.first() {
        Some(latest) => Redirect::to(&chat_url(latest.id)),
        None => Redirect::to("/new_chat"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_keeps_short_text() {
        assert_eq!(derive_title("Hello"), "Hello");
    }

    #[test]
    fn test_derive_title_exact_limit_is_untouched() {
        let text = "a".repeat(35);
        assert_eq!(derive_title(&text), text);
    }

    #[test]
    fn test_derive_title_truncates_with_ellipsis() {
        let text = "Hello world, this is a long test message exceeding thirty-five characters";
        let title = derive_title(text);

        let expected: String = text.chars().take(35).collect();
        assert_eq!(title, format!("{expected}..."));
        assert_eq!(title.chars().count(), 38);
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let text = "é".repeat(40);
        let title = derive_title(&text);
        assert_eq!(title.chars().count(), 38);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_placeholder_title_carries_prefix() {
        assert!(placeholder_title().starts_with(PLACEHOLDER_TITLE_PREFIX));
    }
}
