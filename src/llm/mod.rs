pub mod openrouter;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use self::openrouter::OpenRouterClient;

/// One role/content turn on the provider wire. Forwarded verbatim; stored
/// messages carry a timestamp on top of this.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key not configured. Set CHAT_API_KEY in your environment.")]
    MissingApiKey,
    /// Provider answered with a non-success status; the status is relayed to
    /// the caller.
    #[error("API request failed")]
    Provider {
        status: u16,
    },
    #[error("completion transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the message list to the provider and returns the first choice's
    /// text.
    async fn complete(&self, messages: &[ProviderMessage]) -> Result<String, CompletionError>;
}

pub fn new_client(args: &Args) -> Arc<dyn CompletionClient> {
    Arc::new(OpenRouterClient::from_args(args))
}
