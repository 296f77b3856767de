//! HTTP price feed for the centralized exchange leg

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::*;
use std::time::Duration;
use tracing::{debug, warn};
use crate::{
    errors::{BotError, BotResult},
    network::{retry_with_backoff, PriceSource, RetryConfig},
    types::PriceQuote,
};

/// Reads `{"symbol": "...", "price": "3012.45"}` style tickers from
/// `GET <base_url>?symbol=<symbol>`. The price may be a string or a number.
///
/// The quote is stamped with the exchange's own time (`closeTime`, `time`
/// or `timestamp`, in epoch milliseconds) when the ticker carries one, so a
/// lagging exchange shows up as a stale quote. Tickers without a time field
/// are stamped on receipt.
pub struct HttpPriceSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpPriceSource {
    pub fn new(base_url: impl Into<String>) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                BotError::Network {
                    message: "Failed to build HTTP client".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig {
                max_attempts: 5,
                initial_delay_ms: 200,
                ..Default::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

fn parse_price(json: &serde_json::Value) -> anyhow::Result<Decimal> {
    let field = json
        .get("price")
        .ok_or_else(|| anyhow::anyhow!("Missing 'price' field in response"))?;
    let price = match field {
        serde_json::Value::String(s) => Decimal::from_str(s).context("Failed to parse price string")?,
        serde_json::Value::Number(n) => {
            Decimal::from_str(&n.to_string()).context("Failed to parse price number")?
        }
        other => anyhow::bail!("Unexpected price value: {}", other),
    };
    Ok(price)
}

/// Exchange-side time of the ticker, if it reports one.
fn parse_timestamp(json: &serde_json::Value) -> Option<DateTime<Utc>> {
    let millis = ["closeTime", "time", "timestamp"]
        .iter()
        .filter_map(|key| json.get(*key))
        .find_map(|value| match value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        })?;
    Utc.timestamp_millis_opt(millis).single()
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn get_price(&self, symbol: &str) -> BotResult<PriceQuote> {
        let operation = || async {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[("symbol", symbol)])
                .send()
                .await
                .context("HTTP request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("⚠️ Price API returned error status {}: {}", status, body);
                return Err(anyhow::anyhow!("Price API error: {} - {}", status, body));
            }

            let json: serde_json::Value = response
                .json()
                .await
                .context("Failed to parse JSON response")?;

            Ok((parse_price(&json)?, parse_timestamp(&json)))
        };

        let (price, exchange_time) =
            retry_with_backoff(operation, &self.retry, &format!("{} price fetch", symbol)).await?;
        let timestamp = exchange_time.unwrap_or_else(|| {
            debug!(symbol, "Ticker has no exchange time, stamping on receipt");
            Utc::now()
        });
        debug!(symbol, %price, %timestamp, "CEX price fetched");

        Ok(PriceQuote {
            symbol: symbol.to_string(),
            price,
            timestamp,
        })
    }
}
