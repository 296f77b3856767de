//! Advisory service trait and HTTP client

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use crate::errors::{BotError, BotResult};
use crate::types::{AdvisoryRequest, AdvisoryResponse};

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn advise(&self, request: &AdvisoryRequest) -> BotResult<AdvisoryResponse>;
}

/// POSTs the request as JSON and reads a JSON verdict back.
pub struct HttpAdvisoryClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpAdvisoryClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Network {
                message: "Failed to build advisory HTTP client".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }
}

/// Accepts a bare JSON object or free text with one embedded object.
/// Everything from the first `{` to the last `}` is parsed.
pub fn parse_advisory_response(body: &str) -> BotResult<AdvisoryResponse> {
    if let Ok(response) = serde_json::from_str::<AdvisoryResponse>(body.trim()) {
        return Ok(response);
    }
    let start = body.find('{');
    let end = body.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&body[start..=end])
            .map_err(|e| BotError::parsing("advisory response JSON", e)),
        _ => Err(BotError::parsing(
            "advisory response",
            anyhow::anyhow!("no JSON object in response body"),
        )),
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisoryClient {
    async fn advise(&self, request: &AdvisoryRequest) -> BotResult<AdvisoryResponse> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("advisory request failed")
            .map_err(|e| BotError::Advisory {
                message: format!("{:#}", e),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("⚠️ Advisory service returned {}: {}", status, body);
            return Err(BotError::Advisory {
                message: format!("HTTP {}", status),
            });
        }

        debug!(opportunity_id = %request.opportunity_id, "Advisory response received");
        parse_advisory_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            opportunity_id: "opp-1".into(),
            cex_price: dec!(3030),
            dex_price: dec!(3000),
            spread_pct: dec!(1),
            gas_cost: dec!(2),
            gross_profit: dec!(10),
            net_profit: dec!(8),
            position_size: dec!(1000),
            rule_confidence: 95,
            volatility_pct: dec!(0.4),
            historical_win_rate_pct: dec!(60),
            current_exposure: dec!(0),
        }
    }

    #[test]
    fn parses_bare_json() {
        let response = parse_advisory_response(
            r#"{"shouldExecute": true, "confidence": 85, "reasoning": "clean spread", "riskNote": "low"}"#,
        )
        .unwrap();
        assert!(response.should_execute);
        assert_eq!(response.confidence, 85);
        assert_eq!(response.risk_note, "low");
    }

    #[test]
    fn extracts_embedded_object_and_clamps_confidence() {
        let body = "Here is my analysis:\n```json\n{\"shouldExecute\": false, \"confidence\": 140.6, \"riskAssessment\": \"thin book\"}\n```";
        let response = parse_advisory_response(body).unwrap();
        assert!(!response.should_execute);
        assert_eq!(response.confidence, 100);
        assert_eq!(response.risk_note, "thin book");
        assert_eq!(response.reasoning, "");
    }

    #[test]
    fn negative_confidence_clamps_to_zero() {
        let response = parse_advisory_response(r#"{"shouldExecute": true, "confidence": -3}"#).unwrap();
        assert_eq!(response.confidence, 0);
    }

    #[test]
    fn malformed_body_is_parse_error() {
        assert!(matches!(
            parse_advisory_response("I think you should buy."),
            Err(BotError::DataParsing { .. })
        ));
        assert!(matches!(
            parse_advisory_response("{\"shouldExecute\": \"yes\"}"),
            Err(BotError::DataParsing { .. })
        ));
    }

    #[tokio::test]
    async fn posts_request_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/advise")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "opportunityId": "opp-1",
                "ruleConfidence": 95
            })))
            .with_status(200)
            .with_body(r#"{"shouldExecute": true, "confidence": 77, "reasoning": "ok"}"#)
            .create_async()
            .await;

        let client = HttpAdvisoryClient::new(
            format!("{}/advise", server.url()),
            Some("secret".into()),
            Duration::from_secs(2),
        )
        .unwrap();
        let response = client.advise(&request()).await.unwrap();
        assert_eq!(response.confidence, 77);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_advisory_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/advise")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpAdvisoryClient::new(format!("{}/advise", server.url()), None, Duration::from_secs(2)).unwrap();
        assert!(matches!(client.advise(&request()).await, Err(BotError::Advisory { .. })));
    }
}
