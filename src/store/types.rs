use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Attribution of one conversation turn. Stored as `"user"` / `"ai"` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

impl std::str::FromStr for Sender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "ai" => Ok(Sender::Ai),
            other => bail!("unknown sender: {other}"),
        }
    }
}

/// One row of the sidebar chat list.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub id: i64,
    pub title: String,
}

/// One turn of a conversation. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
