use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Storage Args ---
    /// Key-value storage backend for application state (memory, redis)
    #[arg(long, env = "STORAGE_TYPE", default_value = "memory")]
    pub storage_type: String,

    /// Storage host endpoint for the redis backend (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "STORAGE_HOST", default_value = "redis://127.0.0.1:6379")]
    pub storage_host: String,

    /// Prefix for Redis storage keys.
    #[arg(long, env = "STORAGE_REDIS_PREFIX", default_value = "support_desk:")]
    pub storage_redis_prefix: String,

    /// Batch size for the Redis SCAN command when clearing storage.
    #[arg(long, env = "STORAGE_REDIS_SCAN_COUNT", default_value = "100")]
    pub storage_redis_scan_count: usize,

    // --- Completion Provider Args ---
    /// API key for the completion provider. Chat requests fail with a
    /// configuration error while this is unset.
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Chat completions endpoint of the provider.
    #[arg(
        long,
        env = "CHAT_BASE_URL",
        default_value = "https://openrouter.ai/api/v1/chat/completions"
    )]
    pub chat_base_url: String,

    /// Model name requested from the provider.
    #[arg(long, env = "CHAT_MODEL", default_value = "openai/gpt-4o-mini")]
    pub chat_model: String,

    /// Sampling temperature sent with every completion request.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub chat_temperature: f32,

    /// Maximum completion tokens requested from the provider.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "1000")]
    pub chat_max_tokens: u32,

    /// Referer URL reported to the provider.
    #[arg(long, env = "CHAT_REFERER", default_value = "http://localhost:3000")]
    pub chat_referer: String,

    /// System prompt prepended to the conversation history on the send flow.
    #[arg(
        long,
        env = "SYSTEM_PROMPT",
        default_value = "You are a professional customer-service assistant. Reply helpfully and courteously."
    )]
    pub system_prompt: String,

    /// Assistant reply recorded in the conversation when the provider call fails.
    #[arg(
        long,
        env = "CHAT_ERROR_REPLY",
        default_value = "Sorry, an error occurred. Please try again."
    )]
    pub chat_error_reply: String,

    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
