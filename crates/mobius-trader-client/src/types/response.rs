//! Typed views of server replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Money state of one account number, as returned by `MoneyInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoneyInfo {
    #[serde(default)]
    pub free: f64,
    #[serde(default)]
    pub credit: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MoneyInfo {
    /// Money that can leave the account.
    pub fn withdrawable(&self) -> f64 {
        self.free - self.credit
    }
}

/// Reply of the terminal's `/get-jwt` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraderAuthResult {
    #[serde(default)]
    pub jwt: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Extract the `Ticket` of a balance-like operation result.
pub fn ticket_of(result: &Value) -> Option<i64> {
    result
        .get("Ticket")
        .and_then(Value::as_i64)
        .filter(|ticket| *ticket != 0)
}
