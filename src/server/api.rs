use crate::cli::Args;
use crate::llm::{ CompletionClient, CompletionError, ProviderMessage };
use crate::models::chat::{ ChatMessage, Conversation };
use crate::models::ticket::Ticket;
use crate::state::{ export_snapshot, ExportSnapshot };
use crate::state::conversations::ConversationStore;
use crate::state::tickets::{ AdvanceOutcome, TicketCounts, TicketStore };
use crate::storage::KvStore;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ Path, State },
    response::{ IntoResponse, Response },
    http::StatusCode,
    Json,
};
use serde::{ Deserialize, Serialize };
use thiserror::Error as ThisError;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationStore>,
    pub tickets: Arc<TicketStore>,
    pub kv: Arc<dyn KvStore>,
    pub completion: Arc<dyn CompletionClient>,
    pub args: Args,
}

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("API key not configured. Set CHAT_API_KEY in your environment.")]
    MissingConfig,
    #[error("API request failed")]
    Upstream(StatusCode),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingConfig => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(status) => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingApiKey => ApiError::MissingConfig,
            CompletionError::Provider { status } =>
                ApiError::Upstream(
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
                ),
            CompletionError::Transport(msg) => {
                error!("Completion transport error: {}", msg);
                ApiError::Internal
            }
        }
    }
}

impl From<Box<dyn Error + Send + Sync>> for ApiError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        error!("Internal error: {}", err);
        ApiError::Internal
    }
}

#[derive(Deserialize)]
pub struct ChatProxyRequest {
    pub messages: Vec<ProviderMessage>,
}

#[derive(Serialize)]
struct ChatProxyResponse {
    reply: String,
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize)]
struct SendMessageResponse {
    messages: Vec<ChatMessage>,
    conversation: Conversation,
}

#[derive(Serialize)]
struct TicketListResponse {
    tickets: Vec<Ticket>,
    counts: TicketCounts,
}

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub customer: String,
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    message: String,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route(
            "/api/conversations",
            get(list_conversations_handler).post(create_conversation_handler)
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages_handler).post(send_message_handler)
        )
        .route("/api/tickets", get(list_tickets_handler).post(create_ticket_handler))
        .route("/api/tickets/{id}/advance", post(advance_ticket_handler))
        .route("/api/export", get(export_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/reset", post(reset_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    state: AppState
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let args = state.args.clone();
    let app = build_router(state);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_deref().unwrap_or_default();
        let key_path = args.tls_key_path.as_deref().unwrap_or_default();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        info!("Starting HTTP server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// Stateless proxy to the completion provider: forwards the message list
/// as-is and relays the extracted reply or the provider's failure status.
async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatProxyRequest>
) -> Result<Json<ChatProxyResponse>, ApiError> {
    let reply = state.completion.complete(&req.messages).await?;
    Ok(Json(ChatProxyResponse { reply }))
}

async fn list_conversations_handler(State(state): State<AppState>) -> Json<Vec<Conversation>> {
    Json(state.conversations.list().await)
}

async fn create_conversation_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state.conversations.create(&req.title).await?;
    Ok(Json(conversation))
}

async fn list_messages_handler(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    if state.conversations.get(&id).await.is_none() {
        return Err(ApiError::NotFound);
    }
    let messages = state.conversations.messages(&id).await?;
    Ok(Json(messages))
}

/// The original client's send flow, server-side: record the user turn, ask
/// the provider with the system prompt plus full history, record the reply.
/// A provider failure is recorded as the configured fallback reply instead
/// of failing the request.
async fn send_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>
) -> Result<Json<SendMessageResponse>, ApiError> {
    if state.conversations.get(&id).await.is_none() {
        return Err(ApiError::NotFound);
    }

    let (user_message, _) = state.conversations.append_message(&id, "user", &req.content).await?;

    let mut provider_messages = vec![ProviderMessage {
        role: "system".to_string(),
        content: state.args.system_prompt.clone(),
    }];
    let history = state.conversations.messages(&id).await?;
    provider_messages.extend(
        history.iter().map(|message| ProviderMessage {
            role: message.role.clone(),
            content: message.content.clone(),
        })
    );

    let reply = match state.completion.complete(&provider_messages).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Completion failed for conversation {}: {}", id, e);
            state.args.chat_error_reply.clone()
        }
    };

    let (assistant_message, _) = state.conversations.append_message(&id, "assistant", &reply).await?;
    let conversation = state.conversations.get(&id).await.ok_or(ApiError::NotFound)?;

    Ok(
        Json(SendMessageResponse {
            messages: vec![user_message, assistant_message],
            conversation,
        })
    )
}

async fn list_tickets_handler(State(state): State<AppState>) -> Json<TicketListResponse> {
    Json(TicketListResponse {
        tickets: state.tickets.list().await,
        counts: state.tickets.counts().await,
    })
}

async fn create_ticket_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state.tickets.create(&req.title, &req.customer).await?;
    Ok(Json(ticket))
}

async fn advance_ticket_handler(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Ticket>, ApiError> {
    match state.tickets.advance(&id).await? {
        AdvanceOutcome::Advanced(ticket) => Ok(Json(ticket)),
        AdvanceOutcome::AlreadyResolved =>
            Err(ApiError::Conflict("ticket is already resolved".to_string())),
        AdvanceOutcome::NotFound => Err(ApiError::NotFound),
    }
}

async fn export_handler(State(state): State<AppState>) -> Json<ExportSnapshot> {
    Json(export_snapshot(&state.conversations, &state.tickets).await)
}

async fn clear_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.kv.clear().await?;
    state.conversations.forget().await;
    state.tickets.forget().await;
    info!("Cleared all stored data");
    Ok(
        Json(StatusResponse {
            success: true,
            message: "All data cleared".to_string(),
        })
    )
}

async fn reset_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.kv.clear().await?;
    state.conversations.forget().await;
    state.tickets.reseed().await?;
    info!("Reset stored data to the example set");
    Ok(
        Json(StatusResponse {
            success: true,
            message: "Demo data reset".to_string(),
        })
    )
}
