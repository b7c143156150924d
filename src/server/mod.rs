pub mod api;

use std::error::Error;

pub struct Server {
    addr: String,
    state: api::AppState,
}

impl Server {
    pub fn new(addr: String, state: api::AppState) -> Self {
        Self { addr, state }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.state.clone()).await
    }
}
