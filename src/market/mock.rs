//! Mock market-data provider for unit testing.
//!
//! Provides an in-memory [`MarketDataProvider`] that can be loaded with
//! market snapshots and failure modes without any network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::MarketError;
use crate::pricing::PriceLevel;

use super::client::MarketDataProvider;
use super::types::{Market, MarketStatus, Selection, SelectionId};

/// Configuration for mock provider behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail every fetch with a generic error.
    pub fail_fetch: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock market-data provider for testing.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    /// Mock configuration.
    config: MockConfig,
    /// Markets by market id.
    markets: Arc<Mutex<HashMap<String, Market>>>,
}

impl MockProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            markets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Install or replace a market snapshot.
    pub fn set_market(&self, market: Market) {
        let mut markets = self.markets.lock().unwrap();
        markets.insert(market.market_id.clone(), market);
    }

    /// Remove a market, simulating settlement/removal from the exchange.
    pub fn remove_market(&self, market_id: &str) {
        self.markets.lock().unwrap().remove(market_id);
    }

    /// Clear all mock data.
    pub fn clear(&self) {
        self.markets.lock().unwrap().clear();
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_market(&self, market_id: &str) -> Result<Market, MarketError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_fetch {
            return Err(MarketError::FetchFailed {
                market_id: market_id.to_string(),
                reason: "mock fetch failure".to_string(),
            });
        }

        let markets = self.markets.lock().unwrap();
        markets
            .get(market_id)
            .cloned()
            .ok_or_else(|| MarketError::MarketNotFound {
                market_id: market_id.to_string(),
            })
    }
}

/// Builder for mock selections with two-sided depth.
pub struct SelectionBuilder {
    id: SelectionId,
    name: String,
    backs: Vec<PriceLevel>,
    lays: Vec<PriceLevel>,
    last_price_traded: Option<Decimal>,
}

impl SelectionBuilder {
    /// Create a builder for the given selection.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: SelectionId(id),
            name: name.into(),
            backs: Vec::new(),
            lays: Vec::new(),
            last_price_traded: None,
        }
    }

    /// Add a back level.
    pub fn back(mut self, price: Decimal, size: Decimal) -> Self {
        self.backs.push(PriceLevel::new(price, size));
        self
    }

    /// Add a lay level.
    pub fn lay(mut self, price: Decimal, size: Decimal) -> Self {
        self.lays.push(PriceLevel::new(price, size));
        self
    }

    /// Set the last traded price.
    pub fn last_traded(mut self, price: Decimal) -> Self {
        self.last_price_traded = Some(price);
        self
    }

    /// Build the selection. Back levels are sorted best-first (descending),
    /// lay levels best-first (ascending), matching the exchange wire order.
    pub fn build(mut self) -> Selection {
        self.backs.sort_by(|a, b| b.price.cmp(&a.price));
        self.lays.sort_by(|a, b| a.price.cmp(&b.price));

        Selection {
            id: self.id,
            name: self.name,
            available_to_back: self.backs,
            available_to_lay: self.lays,
            last_price_traded: self.last_price_traded,
        }
    }
}

/// Build a mock market from selections, open by default.
pub fn mock_market(market_id: &str, name: &str, selections: Vec<Selection>) -> Market {
    Market {
        market_id: market_id.to_string(),
        market_name: name.to_string(),
        status: MarketStatus::Open,
        selections,
    }
}
