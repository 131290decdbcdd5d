pub mod config;
pub mod models;
pub mod processor;
pub mod yahoo_client;

// Re-exports (public API)
pub use models::{EquityContract, OptionsChain};
pub use processor::flatten_equity_chain;
pub use yahoo_client::YahooClient;
