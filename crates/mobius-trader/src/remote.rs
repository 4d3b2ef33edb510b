//! The remote-call capability queries are executed through.

use async_trait::async_trait;
use serde_json::Value;

/// Name of the server method that evaluates a compiled query.
pub const SEARCH_METHOD: &str = "Search";

/// Anything able to invoke a named method on the brokerage server.
///
/// Authentication, serialization, timeouts and network failures belong to
/// the implementor; errors come back unchanged through `Self::Error`.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    type Error: Send;

    async fn call(&self, method: &str, params: Value) -> Result<Value, Self::Error>;
}

#[async_trait]
impl<T: RemoteCall + ?Sized> RemoteCall for std::sync::Arc<T> {
    type Error = T::Error;

    async fn call(&self, method: &str, params: Value) -> Result<Value, Self::Error> {
        (**self).call(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl RemoteCall for Echo {
        type Error = String;

        async fn call(&self, method: &str, params: Value) -> Result<Value, String> {
            Ok(json!({ "method": method, "params": params }))
        }
    }

    #[test]
    fn test_shared_caller_forwards() {
        let caller = Arc::new(Echo);
        let reply = tokio_test::block_on(caller.call(SEARCH_METHOD, json!([1]))).unwrap();
        assert_eq!(reply, json!({ "method": "Search", "params": [1] }));
    }
}
