//! Market data models
//!
//! - `quote` - The normalized quote shape returned by every provider
//! - `types` - Asset classification used to pick a provider

mod quote;
mod types;

pub use quote::Quote;
pub use types::AssetType;
