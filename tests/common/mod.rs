//! Shared helpers: a mock completion provider and an app spawner.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{ AtomicUsize, Ordering };

use axum::{
    extract::State,
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use serde_json::{ json, Value };
use tokio::net::TcpListener;

use support_desk::cli::Args;
use support_desk::llm::new_client;
use support_desk::server::api::{ build_router, AppState };
use support_desk::state::conversations::ConversationStore;
use support_desk::state::tickets::TicketStore;
use support_desk::storage::create_kv_store;

/// Mock OpenAI-compatible completion provider bound to an ephemeral port.
pub struct MockProvider {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

#[derive(Clone)]
struct MockState {
    reply: String,
    fail_status: Option<u16>,
    hits: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Provider that answers every request with the given reply text.
    pub async fn new(reply: &str) -> Self {
        Self::start(reply, None).await
    }

    /// Provider that answers every request with the given error status.
    pub async fn failing(status: u16) -> Self {
        Self::start("", Some(status)).await
    }

    async fn start(reply: &str, fail_status: Option<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let state = MockState {
            reply: reply.to_string(),
            fail_status,
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(mock_chat_completions))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits, _handle: handle }
    }

    /// Full chat-completions URL, usable as `--chat-base-url`.
    pub fn completions_url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// Number of requests the provider has seen.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn mock_chat_completions(
    State(state): State<MockState>,
    Json(req): Json<Value>
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = state.fail_status {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, Json(json!({ "error": { "message": "mock failure" } }))).into_response();
    }

    let model = req
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    Json(
        json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": state.reply },
                    "finish_reason": "stop"
                }
            ]
        })
    ).into_response()
}

pub fn test_args(chat_base_url: &str, api_key: &str) -> Args {
    Args {
        storage_type: "memory".to_string(),
        storage_host: "redis://127.0.0.1:6379".to_string(),
        storage_redis_prefix: "support_desk:".to_string(),
        storage_redis_scan_count: 100,
        chat_api_key: api_key.to_string(),
        chat_base_url: chat_base_url.to_string(),
        chat_model: "openai/gpt-4o-mini".to_string(),
        chat_temperature: 0.7,
        chat_max_tokens: 1000,
        chat_referer: "http://localhost:3000".to_string(),
        system_prompt: "You are a professional customer-service assistant. Reply helpfully and courteously.".to_string(),
        chat_error_reply: "Sorry, an error occurred. Please try again.".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        tls_cert_path: None,
        tls_key_path: None,
        enable_tls: false,
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Builds the full application state against an in-memory backend and serves
/// it on an ephemeral port.
pub async fn spawn_app(args: Args) -> TestApp {
    let kv = create_kv_store(&args).unwrap();
    let conversations = Arc::new(ConversationStore::load(kv.clone()).await.unwrap());
    let tickets = Arc::new(TicketStore::load(kv.clone()).await.unwrap());
    let completion = new_client(&args);

    let state = AppState {
        conversations,
        tickets,
        kv,
        completion,
        args,
    };

    let app = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    }
}
