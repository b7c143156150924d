use async_trait::async_trait;
use log::error;
use reqwest::{ Client as HttpClient, header::AUTHORIZATION };
use serde::{ Deserialize, Serialize };

use super::{ CompletionClient, CompletionError, ProviderMessage };
use crate::cli::Args;

/// OpenAI-compatible chat-completions client. OpenRouter is the default
/// endpoint; any provider speaking the same wire format works through
/// `--chat-base-url`.
pub struct OpenRouterClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    referer: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn from_args(args: &Args) -> Self {
        Self {
            http: HttpClient::new(),
            api_key: Some(args.chat_api_key.clone()).filter(|key| !key.is_empty()),
            model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            referer: args.chat_referer.clone(),
            temperature: args.chat_temperature,
            max_tokens: args.chat_max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, messages: &[ProviderMessage]) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self.http
            .post(&self.base_url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header("HTTP-Referer", &self.referer)
            .json(&req)
            .send().await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Completion provider error ({}): {}", status, body);
            return Err(CompletionError::Provider { status: status.as_u16() });
        }

        let data = resp
            .json::<ChatCompletionResponse>().await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let reply = data.choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_else(|| "No response received".to_string());

        Ok(reply)
    }
}
