//! Search query compiler, expression parser, result sets and fixed-point
//! helpers for the MobiusTrader brokerage JSON-RPC API.

pub mod metadata;
pub mod query;
pub mod remote;
pub mod result;
pub mod scaling;
pub mod types;

pub use metadata::MetadataTables;
pub use query::*;
pub use remote::{RemoteCall, SEARCH_METHOD};
pub use result::ResultSet;
pub use scaling::{to_float, to_int};
pub use types::*;
