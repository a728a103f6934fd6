//! Quote provider abstraction and upstream integrations.
//!
//! This module contains:
//! - The `QuoteProvider` trait every integration and decorator implements
//! - Concrete integrations for CoinGecko (crypto) and Yahoo Finance (stocks)
//!
//! # Architecture
//!
//! The provider system is designed to be:
//! - **Closed under composition**: decorators implement `QuoteProvider` too,
//!   so any stacking order is valid
//! - **Provider-agnostic**: nothing outside an integration knows its wire format

mod body;
mod buffer_pool;
mod traits;

pub mod coingecko;
pub mod yahoo;

pub use buffer_pool::BufferPool;
pub use traits::QuoteProvider;
