//! Broker clients.

pub mod registry;
pub mod trader;

pub use registry::ClientRegistry;
pub use trader::MobiusTrader;
