//! Encoding of requests and decoding of JSON-RPC replies.

use serde_json::Value;

use crate::types::{
    error_codes, ClientError, ClientResult, JsonRpcErrorObject, JsonRpcRequest, RequestId,
};

/// Build a request with a fresh id.
pub fn encode_request(method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest::new(RequestId::random(), method, params)
}

/// Extract the `result` of a reply, or its `error` as `ClientError::Server`.
pub fn decode_response(reply: Value) -> ClientResult<Value> {
    let mut obj = match reply {
        Value::Object(obj) => obj,
        other => {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected a JSON-RPC object, got {other}"
            )))
        }
    };

    match obj.remove("error") {
        Some(Value::Null) | None => {}
        Some(error) => return Err(ClientError::Server(error_object(error))),
    }

    obj.remove("result").ok_or_else(|| {
        ClientError::UnexpectedResponse("reply carries neither result nor error".to_string())
    })
}

fn error_object(error: Value) -> JsonRpcErrorObject {
    match serde_json::from_value::<JsonRpcErrorObject>(error.clone()) {
        Ok(obj) => obj,
        Err(_) => JsonRpcErrorObject {
            code: error_codes::INTERNAL_ERROR,
            message: match &error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            data: None,
            error: Some(error),
        },
    }
}
