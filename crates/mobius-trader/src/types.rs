//! Core data types for the MobiusTrader API surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trade command codes carried in the `TradeCmd` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum TradeCmd {
    Buy = 0,
    Sell = 1,
    BuyLimit = 2,
    SellLimit = 3,
    BuyStop = 4,
    SellStop = 5,
    Balance = 6,
    Credit = 7,
}

impl From<TradeCmd> for i64 {
    fn from(cmd: TradeCmd) -> Self {
        cmd as i64
    }
}

impl From<TradeCmd> for Value {
    fn from(cmd: TradeCmd) -> Self {
        Value::from(cmd as i64)
    }
}

impl TryFrom<i64> for TradeCmd {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TradeCmd::Buy),
            1 => Ok(TradeCmd::Sell),
            2 => Ok(TradeCmd::BuyLimit),
            3 => Ok(TradeCmd::SellLimit),
            4 => Ok(TradeCmd::BuyStop),
            5 => Ok(TradeCmd::SellStop),
            6 => Ok(TradeCmd::Balance),
            7 => Ok(TradeCmd::Credit),
            other => Err(format!("unknown trade command {other}")),
        }
    }
}

/// Kind of a trading account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum AccountNumberType {
    Test = 0,
    Real = 1,
    Demo = 2,
    Tis = 3,
    Invest = 4,
}

impl From<AccountNumberType> for i64 {
    fn from(kind: AccountNumberType) -> Self {
        kind as i64
    }
}

impl From<AccountNumberType> for Value {
    fn from(kind: AccountNumberType) -> Self {
        Value::from(kind as i64)
    }
}

impl TryFrom<i64> for AccountNumberType {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AccountNumberType::Test),
            1 => Ok(AccountNumberType::Real),
            2 => Ok(AccountNumberType::Demo),
            3 => Ok(AccountNumberType::Tis),
            4 => Ok(AccountNumberType::Invest),
            other => Err(format!("unknown account number type {other}")),
        }
    }
}

/// Logical tables a search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchContext {
    Accounts,
    AccountNumbers,
    BinaryOptions,
    Orders,
}

impl SearchContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchContext::Accounts => "Accounts",
            SearchContext::AccountNumbers => "AccountNumbers",
            SearchContext::BinaryOptions => "BinaryOptions",
            SearchContext::Orders => "Orders",
        }
    }
}

impl std::fmt::Display for SearchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SearchContext> for String {
    fn from(ctx: SearchContext) -> Self {
        ctx.as_str().to_string()
    }
}

/// How a symbol or currency is looked up in the metadata tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    ById(i64),
    ByName(String),
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKey::ById(id) => write!(f, "#{id}"),
            LookupKey::ByName(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for LookupKey {
    fn from(id: i64) -> Self {
        LookupKey::ById(id)
    }
}

impl From<&str> for LookupKey {
    fn from(name: &str) -> Self {
        LookupKey::ByName(name.to_string())
    }
}

impl From<String> for LookupKey {
    fn from(name: String) -> Self {
        LookupKey::ByName(name)
    }
}

/// A row of the symbol table returned by `SymbolsGet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SymbolInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub fractional_digits: u32,
    #[serde(default)]
    pub margin_currency_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row of the currency table returned by `CurrenciesGet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrencyInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub volume_fractional_digits: u32,
    #[serde(default)]
    pub deposit_fractional_digits: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors raised while compiling a query.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Search context is not set")]
    MissingContext,

    #[error("Malformed grouping at entry {position}: {reason}")]
    MalformedGrouping { position: usize, reason: String },

    #[error("Unbalanced parenthesis at offset {position}")]
    UnbalancedParenthesis { position: usize },
}

/// Convenience result type.
pub type QueryResult<T> = Result<T, QueryError>;
