//! Parameter objects for the pass-through API methods.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mobius_trader::{AccountNumberType, TradeCmd};

/// Session type used for trading passwords.
pub const SESSION_TYPE_TRADER: i64 = 0;
/// Session type used for withdrawal passwords.
pub const SESSION_TYPE_WITHDRAW: i64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuotesParams {
    pub symbols: Vec<String>,
}

/// Fields of a new client account. Only `email` and `name` are required by
/// the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub agent_account: Option<i64>,
    pub country: String,
    pub city: String,
    pub phone: String,
    pub state: String,
    pub zip_code: String,
    pub address: String,
    pub comment: String,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A trading account number to open under an existing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewAccountNumber {
    pub account_id: i64,
    pub leverage: i64,
    pub settings_template: String,
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "Type")]
    pub kind: AccountNumberType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PasswordSetParams {
    pub account_id: i64,
    pub login: Value,
    pub password: String,
    pub session_type: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PasswordCheckParams {
    pub login: Value,
    pub password: String,
    pub session_type: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoneyInfoParams {
    pub account_numbers: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Balance, bonus and credit operations share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BalanceParams {
    pub account_number_id: i64,
    pub amount: i64,
    pub comment: String,
}

/// An order opened on behalf of a trader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderOpen {
    pub account_number_id: i64,
    pub symbol_id: i64,
    pub volume: i64,
    pub trade_cmd: TradeCmd,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub sl: i64,
    #[serde(default)]
    pub tp: i64,
    #[serde(default)]
    pub comment: String,
}

impl OrderOpen {
    /// A market order with no stops.
    pub fn market(
        account_number_id: i64,
        symbol_id: i64,
        volume: i64,
        trade_cmd: TradeCmd,
    ) -> Self {
        Self {
            account_number_id,
            symbol_id,
            volume,
            trade_cmd,
            price: 0,
            sl: 0,
            tp: 0,
            comment: String::new(),
        }
    }
}

/// Body of the terminal's `/get-jwt` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderAuthParams {
    pub login: String,
    pub password: String,
    pub ip: String,
    pub agent: String,
}
