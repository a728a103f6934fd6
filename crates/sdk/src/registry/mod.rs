//! Provider registry.
//!
//! - [`MarketClient`] maps provider names to fully decorated providers
//! - [`ChainBuilder`] assembles a decorator chain around an upstream integration

mod chain;
mod client;

pub use chain::ChainBuilder;
pub use client::MarketClient;
