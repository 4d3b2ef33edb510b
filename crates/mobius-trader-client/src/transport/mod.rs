//! Transport layer for JSON-RPC calls to the server.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::ClientResult;

pub mod framing;
pub mod http;

pub use http::HttpTransport;

/// A channel able to carry one JSON-RPC call and return its `result`.
///
/// Implementations surface connection failures as `ClientError::Transport`
/// and server error payloads as `ClientError::Server`, without retrying.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value>;
}
