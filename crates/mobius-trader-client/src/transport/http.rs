//! JSON-RPC over HTTP with basic authentication.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::types::{ClientError, ClientResult};

use super::framing::{decode_response, encode_request};
use super::RpcTransport;

/// HTTP transport to the server's JSON-RPC endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    authorization: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            authorization: basic_auth(config.broker_id, &config.password),
        })
    }

    /// Point the transport at a different URL, e.g. a local mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        let request = encode_request(method, params);
        tracing::debug!("-> {method} [{}]", request.id);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // A failed status is only a server error when it carries a JSON-RPC
        // error member; anything else is a transport failure.
        let reply: Value = match serde_json::from_str(&body) {
            Ok(reply) if status.is_success() || carries_error(&reply) => reply,
            Err(e) if status.is_success() => {
                return Err(ClientError::Transport(format!("Invalid JSON reply: {e}")))
            }
            _ => return Err(ClientError::Transport(format!("HTTP {status}"))),
        };

        let result = decode_response(reply);
        if let Err(ClientError::Server(err)) = &result {
            tracing::warn!("<- {method} failed: {err}");
        }
        result
    }
}

fn carries_error(reply: &Value) -> bool {
    reply.get("error").is_some_and(|error| !error.is_null())
}

/// `Authorization` header value for a broker.
pub fn basic_auth(broker_id: u64, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{broker_id}:{password}"));
    format!("Basic {token}")
}

/// POST a JSON body to an arbitrary URL and decode the JSON reply. Any
/// status other than 200 is a transport error.
pub async fn post_json<B, R>(url: &str, body: &B, timeout_ms: u64) -> ClientResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = reqwest::Client::new()
        .post(url)
        .timeout(Duration::from_millis(timeout_ms))
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ClientError::Transport(format!("HTTP {status} from {url}")));
    }

    Ok(response.json().await?)
}
