//! Exchange REST API client and the market-data provider seam.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::MarketError;
use crate::pricing::PriceLevel;

use super::types::{Market, MarketStatus, Selection, SelectionId};

/// Source of market snapshots.
///
/// The engine only ever pulls a full market by identifier; retries and
/// timeouts live behind this seam, not in the engine.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current snapshot of one market.
    async fn fetch_market(&self, market_id: &str) -> Result<Market, MarketError>;
}

/// Betting-exchange REST API client.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the betting API.
    base_url: String,
    /// Application key sent with every request.
    app_key: String,
    /// Session token sent with every request.
    session_token: String,
}

/// Market book response from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketBookResponse {
    /// Market identifier.
    #[serde(rename = "marketId")]
    pub market_id: Option<String>,
    /// Market name.
    #[serde(rename = "marketName")]
    pub market_name: Option<String>,
    /// Market status string.
    pub status: Option<String>,
    /// Runner books.
    pub runners: Option<Vec<RunnerResponse>>,
}

/// Single runner book in the market response.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerResponse {
    /// Exchange selection identifier.
    #[serde(rename = "selectionId")]
    pub selection_id: i64,
    /// Runner name.
    #[serde(rename = "runnerName")]
    pub runner_name: Option<String>,
    /// Two-sided depth.
    pub ex: Option<ExchangePrices>,
    /// Last traded price.
    #[serde(rename = "lastPriceTraded")]
    pub last_price_traded: Option<String>,
}

/// Back and lay depth for one runner.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangePrices {
    /// Back-side levels, best price first.
    #[serde(rename = "availableToBack", default)]
    pub available_to_back: Vec<LevelResponse>,
    /// Lay-side levels, best price first.
    #[serde(rename = "availableToLay", default)]
    pub available_to_lay: Vec<LevelResponse>,
}

/// Single price level in the wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelResponse {
    /// Price at this level.
    pub price: String,
    /// Size available at this level.
    pub size: String,
}

impl ExchangeClient {
    /// Create a new exchange client from config.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(std::time::Duration::from_millis(500))
            .tcp_nodelay(true)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: config.exchange_base_url.clone(),
            app_key: config.exchange_app_key.clone(),
            session_token: config.exchange_session_token.clone(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert an API market book into the domain model.
    fn convert_market(
        &self,
        market_id: &str,
        response: MarketBookResponse,
    ) -> Result<Market, MarketError> {
        let status_str = response.status.unwrap_or_default();
        let status: MarketStatus = status_str.parse().map_err(|_| {
            MarketError::ParseError(format!("unknown market status: {status_str:?}"))
        })?;

        let selections = response
            .runners
            .unwrap_or_default()
            .into_iter()
            .map(|runner| {
                let (backs, lays) = match runner.ex {
                    Some(ex) => (
                        parse_levels(&ex.available_to_back),
                        parse_levels(&ex.available_to_lay),
                    ),
                    None => (Vec::new(), Vec::new()),
                };

                Selection {
                    id: SelectionId(runner.selection_id),
                    name: runner.runner_name.unwrap_or_default(),
                    available_to_back: backs,
                    available_to_lay: lays,
                    last_price_traded: runner
                        .last_price_traded
                        .as_deref()
                        .and_then(|p| p.parse().ok()),
                }
            })
            .collect();

        Ok(Market {
            market_id: response.market_id.unwrap_or_else(|| market_id.to_string()),
            market_name: response.market_name.unwrap_or_default(),
            status,
            selections,
        })
    }
}

/// Parse wire levels into domain levels, dropping anything unparseable or
/// outside exchange bounds.
fn parse_levels(levels: &[LevelResponse]) -> Vec<PriceLevel> {
    levels
        .iter()
        .filter_map(|level| {
            let price: Decimal = level.price.parse().ok()?;
            let size: Decimal = level.size.parse().ok()?;
            match PriceLevel::validated(price, size) {
                Ok(level) if level.size > Decimal::ZERO => Some(level),
                Ok(_) => None,
                Err(_) => {
                    warn!(%price, %size, "dropping out-of-bounds price level");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for ExchangeClient {
    #[instrument(skip(self), fields(market_id = %market_id))]
    async fn fetch_market(&self, market_id: &str) -> Result<Market, MarketError> {
        let url = format!("{}/markets/{}/book", self.base_url, market_id);

        let response = self
            .http
            .get(&url)
            .header("X-Application", &self.app_key)
            .header("X-Authentication", &self.session_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::MarketNotFound {
                market_id: market_id.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(MarketError::FetchFailed {
                market_id: market_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let book: MarketBookResponse = response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("failed to parse market book: {e}")))?;

        let market = self.convert_market(market_id, book)?;
        debug!(
            market_id = %market.market_id,
            status = %market.status,
            num_selections = market.selections.len(),
            "fetched market snapshot"
        );

        Ok(market)
    }
}
