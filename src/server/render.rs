//! HTML rendering for the chat page.

use minijinja::{context, Environment};
use once_cell::sync::Lazy;

use crate::store::{ChatSummary, Message};

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("chat.html", include_str!("../../templates/chat.html"))
        .expect("chat.html template parses");
    env
});

/// Render the full page: sidebar with every chat plus the current
/// conversation's history. The `.html` template name keeps auto-escaping on,
/// so message text is safe to echo back.
pub fn chat_page(
    chats: &[ChatSummary],
    messages: &[Message],
    current_chat: i64,
) -> Result<String, minijinja::Error> {
    let tmpl = TEMPLATES.get_template("chat.html")?;
    tmpl.render(context! {
        chats => chats,
        messages => messages,
        current_chat => current_chat,
    })
}
