pub mod cli;
pub mod llm;
pub mod models;
pub mod server;
pub mod state;
pub mod storage;

use cli::Args;
use log::info;
use server::{ api::AppState, Server };
use state::conversations::ConversationStore;
use state::tickets::TicketStore;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Storage Type: {}", args.storage_type);
    if args.storage_type.to_lowercase() == "redis" {
        info!("Storage Host: {}", args.storage_host);
    }
    info!("Completion Endpoint: {}", args.chat_base_url);
    info!("Completion Model: {}", args.chat_model);
    info!("API Key Configured: {}", !args.chat_api_key.is_empty());
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let kv = storage::initialize_kv_store(&args)?;
    let conversations = Arc::new(ConversationStore::load(kv.clone()).await?);
    let tickets = Arc::new(TicketStore::load(kv.clone()).await?);
    let completion = llm::new_client(&args);

    let state = AppState {
        conversations,
        tickets,
        kv,
        completion,
        args: args.clone(),
    };

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state);
    server.run().await?;

    Ok(())
}
