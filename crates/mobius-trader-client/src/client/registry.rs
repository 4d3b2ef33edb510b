//! Registry of initialised clients, one per broker.

use std::collections::HashMap;
use std::sync::Arc;

use super::MobiusTrader;
use crate::config::ClientConfig;
use crate::transport::{HttpTransport, RpcTransport};
use crate::types::ClientResult;

/// Caches one client per broker id so metadata tables are loaded once.
pub struct ClientRegistry<T: RpcTransport = HttpTransport> {
    clients: HashMap<u64, Arc<MobiusTrader<T>>>,
}

impl<T: RpcTransport> Default for ClientRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry<HttpTransport> {
    /// Get the client for `config.broker_id`, connecting over HTTP on first
    /// access.
    pub async fn get_or_connect(
        &mut self,
        config: ClientConfig,
    ) -> ClientResult<Arc<MobiusTrader<HttpTransport>>> {
        self.get_or_init(config, HttpTransport::new).await
    }
}

impl<T: RpcTransport> ClientRegistry<T> {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Get the client for `config.broker_id`, building its transport with
    /// `make_transport` and loading metadata on first access.
    pub async fn get_or_init<F>(
        &mut self,
        config: ClientConfig,
        make_transport: F,
    ) -> ClientResult<Arc<MobiusTrader<T>>>
    where
        F: FnOnce(&ClientConfig) -> ClientResult<T>,
    {
        if let Some(client) = self.clients.get(&config.broker_id) {
            return Ok(client.clone());
        }

        config.validate()?;
        let broker_id = config.broker_id;
        tracing::info!("Connecting broker {broker_id} at {}", config.endpoint());

        let transport = make_transport(&config)?;
        let mut client = MobiusTrader::with_transport(config, transport);
        client.init().await?;

        let client = Arc::new(client);
        self.clients.insert(broker_id, client.clone());
        Ok(client)
    }

    pub fn get(&self, broker_id: u64) -> Option<Arc<MobiusTrader<T>>> {
        self.clients.get(&broker_id).cloned()
    }

    /// Drop the cached client. Returns it if one was present.
    pub fn remove(&mut self, broker_id: u64) -> Option<Arc<MobiusTrader<T>>> {
        let client = self.clients.remove(&broker_id);
        if client.is_some() {
            tracing::info!("Dropped client for broker {broker_id}");
        }
        client
    }

    pub fn clear(&mut self) {
        tracing::info!("Dropping {} cached client(s)", self.clients.len());
        self.clients.clear();
    }

    /// Number of cached clients.
    pub fn count(&self) -> usize {
        self.clients.len()
    }
}
