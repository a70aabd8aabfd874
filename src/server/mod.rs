//! HTTP server for the chat interface.
//!
//! Routes:
//! - GET  /                 - redirect to the latest chat (or a new one)
//! - GET  /chat/{chat_id}   - render a conversation
//! - GET  /new_chat         - create a chat and redirect to it
//! - POST /send/{chat_id}   - store a user message and the model reply
//! - POST /delete/{chat_id} - drop a chat and its messages

pub mod error;
mod handlers;
mod render;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/chat/{chat_id}", get(handlers::view_chat))
        .route("/new_chat", get(handlers::new_chat))
        .route("/send/{chat_id}", post(handlers::send_message))
        .route("/delete/{chat_id}", post(handlers::delete_chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until shutdown.
pub async fn run(state: AppState) -> Result<()> {
    let bind_address = state.config.bind_address();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
