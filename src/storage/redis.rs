use async_trait::async_trait;
use crate::cli::Args;
use crate::storage::KvStore;
use std::error::Error;
use redis::{ Client, AsyncCommands };

pub struct RedisKvStore {
    client: Client,
    key_prefix: String,
    scan_count: usize,
}

impl RedisKvStore {
    pub fn new(args: Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            client: Client::open(args.storage_host.as_str())?,
            key_prefix: args.storage_redis_prefix,
            scan_count: args.storage_redis_scan_count,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(self.prefixed(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set(self.prefixed(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let _: i64 = conn.del(self.prefixed(key)).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis
                ::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(&mut conn).await?;

            if !keys.is_empty() {
                let _: i64 = conn.del(keys).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(())
    }
}
