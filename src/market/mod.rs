//! Market data model, exchange client, and test double.

pub mod client;
pub mod mock;
pub mod types;

pub use client::{ExchangeClient, MarketDataProvider};
pub use types::{Market, MarketStatus, Selection, SelectionId};
