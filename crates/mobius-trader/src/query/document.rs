//! The compiled search document and the immutable `Query` wrapping it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::remote::{RemoteCall, SEARCH_METHOD};
use crate::result::ResultSet;

use super::expr::ExprTree;

/// Columns selected when the caller never sets a projection.
pub const DEFAULT_SELECT: &[&str] = &[
    "Ticket",
    "SymbolId",
    "Comment",
    "OpenTime",
    "CloseTime",
    "TradeCmd",
    "AccountNumberId",
    "Sl",
    "Tp",
    "Volume",
    "OpenPrice",
    "ClosePrice",
    "Commission",
    "Swap",
    "Profit",
];

/// One entry of the `Select` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    Column(String),
    Computed {
        #[serde(rename = "Expr")]
        expr: ExprTree,
        #[serde(rename = "As")]
        alias: String,
    },
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(SortDir::Asc),
            "DESC" => Ok(SortDir::Desc),
            other => Err(format!("unknown sort direction \"{other}\"")),
        }
    }
}

/// The parameter object of the `Search` method. Unset optional fields are
/// omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryDocument {
    pub context: String,
    pub select: Vec<Projection>,
    #[serde(rename = "Where")]
    pub where_clause: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDir>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub float_mode: bool,
}

/// A compiled, immutable search.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    document: QueryDocument,
}

impl Query {
    pub(crate) fn new(document: QueryDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &QueryDocument {
        &self.document
    }

    /// The wire form of this query.
    pub fn to_value(&self) -> Value {
        // A struct of strings, lists and integers always serializes.
        serde_json::to_value(&self.document).unwrap_or_default()
    }

    /// Send the query through `caller` and wrap whatever rows come back.
    ///
    /// Failures of the call are returned as they were produced.
    pub async fn execute<C>(&self, caller: &C) -> Result<ResultSet, C::Error>
    where
        C: RemoteCall + ?Sized,
    {
        tracing::debug!("Executing search on {}", self.document.context);
        let rows = caller.call(SEARCH_METHOD, self.to_value()).await?;
        Ok(ResultSet::new(rows))
    }
}

impl Serialize for Query {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}
