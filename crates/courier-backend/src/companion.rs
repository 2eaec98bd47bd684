//! Companion health service client
//!
//! The companion ("IoT") service runs on a separate port next to the
//! backend and simulates field-device telemetry. Its lifecycle is tied to a
//! delivery: `start_sampling` when one begins, `sample` while it runs,
//! `stop_sampling` when it completes.

use serde_json::json;
use std::time::Duration;
use tracing::debug;

use courier_core::{CourierError, OrderId, Result, RiderId};

use crate::client::{decode, expect_success, transport_error};
use crate::wire::HealthRunDto;

// ----------------------------------------------------------------------------
// Companion Client
// ----------------------------------------------------------------------------

/// Stateless HTTP client for the companion health service.
#[derive(Debug, Clone)]
pub struct CompanionClient {
    http: reqwest::Client,
    base_url: String,
}

impl CompanionClient {
    /// Build a client for `http://{host}:{port}` with an explicit request
    /// timeout.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CourierError::transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: format!("http://{}:{}", host.trim(), port),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `/start`: begin sampling for the given rider and order.
    pub async fn start_sampling(&self, rider_name: &str, order: OrderId) -> Result<()> {
        let endpoint = format!("{}/start", self.base_url);
        debug!(%endpoint, %order, "starting companion sampling");
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "riderName": rider_name, "orderId": order.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, "/start")
    }

    /// PUT `/stop`: end the sampling session for the rider.
    pub async fn stop_sampling(&self, rider: RiderId) -> Result<()> {
        let endpoint = format!("{}/stop", self.base_url);
        debug!(%endpoint, %rider, "stopping companion sampling");
        let response = self
            .http
            .put(&endpoint)
            .json(&json!({ "riderId": rider.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, "/stop")
    }

    /// POST `/run` with no body; returns the raw status string, or `None`
    /// when the service replies without a result.
    pub async fn sample(&self) -> Result<Option<String>> {
        let endpoint = format!("{}/run", self.base_url);
        let response = self.http.post(&endpoint).send().await.map_err(transport_error)?;
        let reply: HealthRunDto = decode(response, "/run").await?;
        Ok(reply.result)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn companion_uses_its_own_port() {
        let client = CompanionClient::new("10.0.0.5", 3001, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.5:3001");
    }

    #[test]
    fn run_reply_without_result_is_none() {
        let reply: HealthRunDto = serde_json::from_str("{}").unwrap();
        assert!(reply.result.is_none());
        let reply: HealthRunDto =
            serde_json::from_str(r#"{ "result": "very positive" }"#).unwrap();
        assert_eq!(reply.result.as_deref(), Some("very positive"));
    }
}
