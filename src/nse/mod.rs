pub mod config;
pub mod models;
pub mod nse_client;
pub mod processor;

// Re-exports (public API)
pub use models::{ContractInfo, IndexChainPayload, Records, SideQuote, StrikeEntry};
pub use nse_client::{select_expiry, NSEClient};
pub use processor::flatten_index_chain;
