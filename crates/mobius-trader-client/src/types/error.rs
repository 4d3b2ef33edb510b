//! Error types and JSON-RPC error codes for the client.

use mobius_trader::{LookupKey, QueryError};

use super::message::JsonRpcErrorObject;

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Client-side error codes, outside the range the server uses.
pub mod client_error_codes {
    pub const TRANSPORT: i64 = -32000;
    pub const CONFIG: i64 = -32001;
    pub const NOT_FOUND: i64 = -32002;
    pub const NOT_ENOUGH_MONEY: i64 = -32003;
    pub const AUTH: i64 = -32004;
}

/// All errors that can occur while talking to the server.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Connection, HTTP, or body-decoding failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error payload returned by the server, kept verbatim.
    #[error("Server error: {0}")]
    Server(JsonRpcErrorObject),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(LookupKey),

    #[error("Currency not found: {0}")]
    CurrencyNotFound(LookupKey),

    #[error("Not enough money: {available} available, {requested} requested")]
    NotEnoughMoney { available: f64, requested: i64 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    pub fn code(&self) -> i64 {
        use client_error_codes::*;
        use error_codes::*;
        match self {
            ClientError::Transport(_) => TRANSPORT,
            ClientError::Server(err) => err.code,
            ClientError::Config(_) => CONFIG,
            ClientError::Query(_) => INVALID_PARAMS,
            ClientError::Json(_) => PARSE_ERROR,
            ClientError::SymbolNotFound(_) | ClientError::CurrencyNotFound(_) => NOT_FOUND,
            ClientError::NotEnoughMoney { .. } => NOT_ENOUGH_MONEY,
            ClientError::Auth(_) => AUTH,
            ClientError::UnexpectedResponse(_) => INTERNAL_ERROR,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_keeps_its_code() {
        let err = ClientError::Server(JsonRpcErrorObject {
            code: -32010,
            message: "Account not found".to_string(),
            data: None,
            error: Some("AccountNotFound".into()),
        });
        assert_eq!(err.code(), -32010);
        assert_eq!(
            err.to_string(),
            "Server error: AccountNotFound (-32010: Account not found)"
        );
    }

    #[test]
    fn test_client_side_codes() {
        let err = ClientError::SymbolNotFound(LookupKey::ById(3));
        assert_eq!(err.code(), client_error_codes::NOT_FOUND);
        assert_eq!(err.to_string(), "Symbol not found: #3");

        let err = ClientError::from(QueryError::MissingContext);
        assert_eq!(err.code(), error_codes::INVALID_PARAMS);
    }
}
