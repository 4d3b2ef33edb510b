//! MobiusTrader API client: JSON-RPC over HTTP, broker metadata, money and
//! order operations, plus the `mt7` command line.

pub mod cli;
pub mod client;
pub mod config;
pub mod transport;
pub mod types;

pub use client::{ClientRegistry, MobiusTrader};
pub use config::{resolve_config, ClientConfig, ConfigOverrides};
pub use transport::{HttpTransport, RpcTransport};
pub use types::{ClientError, ClientResult};
