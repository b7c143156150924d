pub mod memory;
pub mod redis;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;
use crate::cli::Args;

/// Key-value persistence for application state. Values are opaque serialized
/// blobs; the stores above this layer decide the schema.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;

    async fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn remove(&self, key: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Removes every key owned by this store.
    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub fn create_kv_store(args: &Args) -> Result<Arc<dyn KvStore>, Box<dyn Error + Send + Sync>> {
    match args.storage_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(memory::MemoryKvStore::new())),
        "redis" => {
            let store = redis::RedisKvStore::new(args.clone())?;
            Ok(Arc::new(store))
        }
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported storage type: {}", args.storage_type)
                    )
                )
            ),
    }
}

pub fn initialize_kv_store(
    args: &Args
) -> Result<Arc<dyn KvStore>, Box<dyn Error + Send + Sync>> {
    info!("Application state will be stored in: {}", args.storage_type);
    create_kv_store(args)
}
