//! Delivery backend client
//!
//! One method per backend endpoint, each a single HTTP round trip with no
//! retry. Non-2xx replies become `NetworkError::Status`, transport faults
//! become `NetworkError::Transport`, and `success=false` bodies on order
//! actions become `NetworkError::Rejected`. Every request shares the
//! client-wide timeout from `Timings`.

use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use courier_core::{CourierError, NetworkError, Order, OrderId, Result, RiderId};

use crate::wire::{
    DeliveryRecord, Earnings, ExperienceDto, LoginDto, LoginOutcome, MeDto, Nft, NftDto,
    OrderActionDto, OrderDto, RiderIdDto,
};

// ----------------------------------------------------------------------------
// Backend Client
// ----------------------------------------------------------------------------

/// Stateless HTTP client for the delivery backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
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

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// POST `/login` with credentials; returns the token pair and the email
    /// the backend has on record.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let endpoint = format!("{}/login", self.base_url);
        debug!(%endpoint, "logging in");
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;
        let login: LoginDto = decode(response, "/login").await?;
        Ok(LoginOutcome {
            access_token: login.session.access_token,
            refresh_token: login.session.refresh_token,
            email: login.user.email,
        })
    }

    /// POST `/rider-id` to resolve the numeric rider id from the email.
    /// Issued immediately after login.
    pub async fn rider_id(&self, email: &str) -> Result<RiderId> {
        let endpoint = format!("{}/rider-id", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(transport_error)?;
        let reply: RiderIdDto = decode(response, "/rider-id").await?;
        Ok(RiderId::new(reply.id))
    }

    /// GET `/me` with the bearer token; used to check whether a persisted
    /// token is still valid at startup.
    pub async fn me(&self, token: &str) -> Result<String> {
        let endpoint = format!("{}/me", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        let me: MeDto = decode(response, "/me").await?;
        Ok(me.user.email)
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// GET `/orders/pending`, the global pending list shown to idle riders.
    pub async fn pending_orders(&self) -> Result<Vec<Order>> {
        let endpoint = format!("{}/orders/pending", self.base_url);
        debug!(%endpoint, "fetching pending orders");
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        let orders: Vec<OrderDto> = decode(response, "/orders/pending").await?;
        Ok(orders.into_iter().map(Order::from).collect())
    }

    /// GET `/orders/pending/{riderId}`, the rider-scoped active order used
    /// to resume an in-progress delivery at startup.
    pub async fn active_orders(&self, rider: RiderId) -> Result<Vec<Order>> {
        let endpoint = format!("{}/orders/pending/{}", self.base_url, rider);
        debug!(%endpoint, "checking for active order");
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        let orders: Vec<OrderDto> = decode(response, "/orders/pending/{riderId}").await?;
        Ok(orders.into_iter().map(Order::from).collect())
    }

    /// POST `/update-order` to claim a pending order. A `success=false`
    /// body (order already taken, usually) is an error for the caller.
    pub async fn accept_order(&self, rider: RiderId, order: OrderId) -> Result<Order> {
        let endpoint = format!("{}/update-order", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "riderId": rider.value(), "orderId": order.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        let reply: OrderActionDto = decode(response, "/update-order").await?;
        order_from_action(reply, "accept")
    }

    /// POST `/complete-order` to finish the current delivery.
    pub async fn complete_order(&self, rider: RiderId, order: OrderId) -> Result<Order> {
        let endpoint = format!("{}/complete-order", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "riderId": rider.value(), "orderId": order.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        let reply: OrderActionDto = decode(response, "/complete-order").await?;
        order_from_action(reply, "complete")
    }

    // ------------------------------------------------------------------
    // Post-completion side effects (best-effort, caller orchestrated)
    // ------------------------------------------------------------------

    /// POST `/check-nft`, asks the backend to evaluate badge eligibility.
    pub async fn check_nft(&self, rider: RiderId) -> Result<()> {
        let endpoint = format!("{}/check-nft", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "riderId": rider.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, "/check-nft")
    }

    /// PUT `/rider/update-expierence`. The path typo is the backend's; do
    /// not fix it here.
    pub async fn update_experience(&self, rider: RiderId) -> Result<()> {
        let endpoint = format!("{}/rider/update-expierence", self.base_url);
        let response = self
            .http
            .put(&endpoint)
            .json(&json!({ "riderId": rider.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, "/rider/update-expierence")
    }

    /// POST `/upload-order-on-bc`, pushes the completed order to the ledger
    /// service. Scheduled 20 s after completion by the runtime.
    pub async fn upload_order_to_ledger(&self, rider: RiderId, order: OrderId) -> Result<()> {
        let endpoint = format!("{}/upload-order-on-bc", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "riderId": rider.value(), "orderId": order.value() }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, "/upload-order-on-bc")
    }

    // ------------------------------------------------------------------
    // Profile, history, earnings
    // ------------------------------------------------------------------

    /// GET `/rider/{riderName}/experience`. Raw value; the badge view clamps
    /// it to 100 for display.
    pub async fn experience(&self, rider_name: &str) -> Result<f64> {
        let endpoint = format!("{}/rider/{}/experience", self.base_url, rider_name);
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        let xp: ExperienceDto = decode(response, "/rider/{riderName}/experience").await?;
        Ok(xp.value())
    }

    /// GET `/rider/{riderId}/nfts`.
    pub async fn nfts(&self, rider: RiderId) -> Result<Vec<Nft>> {
        let endpoint = format!("{}/rider/{}/nfts", self.base_url, rider);
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        let nfts: Vec<NftDto> = decode(response, "/rider/{riderId}/nfts").await?;
        Ok(nfts.into_iter().map(Nft::from).collect())
    }

    /// GET `/rider/{riderName}/deliveries`.
    pub async fn deliveries(&self, rider_name: &str) -> Result<Vec<DeliveryRecord>> {
        let endpoint = format!("{}/rider/{}/deliveries", self.base_url, rider_name);
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        decode(response, "/rider/{riderName}/deliveries").await
    }

    /// GET `/rider/{riderName}/earnings`.
    pub async fn earnings(&self, rider_name: &str) -> Result<Earnings> {
        let endpoint = format!("{}/rider/{}/earnings", self.base_url, rider_name);
        let response = self.http.get(&endpoint).send().await.map_err(transport_error)?;
        decode(response, "/rider/{riderName}/earnings").await
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

pub(crate) fn transport_error(err: reqwest::Error) -> CourierError {
    CourierError::Network(NetworkError::Transport {
        reason: err.to_string(),
    })
}

/// Check the status line and decode the JSON body.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T> {
    let response = check_status(response, endpoint)?;
    response
        .json::<T>()
        .await
        .map_err(|e| {
            CourierError::Network(NetworkError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
        })
}

pub(crate) fn check_status(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response> {
    let status: StatusCode = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CourierError::status(status.as_u16(), endpoint))
    }
}

pub(crate) fn expect_success(response: reqwest::Response, endpoint: &str) -> Result<()> {
    check_status(response, endpoint).map(|_| ())
}

fn order_from_action(reply: OrderActionDto, action: &str) -> Result<Order> {
    if !reply.success {
        return Err(CourierError::rejected(
            reply
                .error
                .unwrap_or_else(|| format!("backend refused to {} order", action)),
        ));
    }
    reply
        .order
        .map(Order::from)
        .ok_or_else(|| {
            CourierError::Network(NetworkError::MalformedResponse {
                endpoint: format!("/{}-order", action),
                reason: "success reply without order body".to_string(),
            })
        })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::OrderActionDto;

    #[test]
    fn base_url_trims_host_whitespace() {
        let client = BackendClient::new(" 10.0.0.5 ", 3000, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.5:3000");
    }

    #[test]
    fn rejected_action_surfaces_backend_error() {
        let reply: OrderActionDto =
            serde_json::from_str(r#"{ "success": false, "error": "already assigned" }"#).unwrap();
        let err = order_from_action(reply, "accept").unwrap_err();
        assert!(err.to_string().contains("already assigned"));
    }

    #[test]
    fn successful_action_without_order_is_malformed() {
        let reply: OrderActionDto = serde_json::from_str(r#"{ "success": true }"#).unwrap();
        let err = order_from_action(reply, "complete").unwrap_err();
        assert!(matches!(
            err,
            CourierError::Network(NetworkError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn successful_action_returns_normalized_order() {
        let reply: OrderActionDto = serde_json::from_str(
            r#"{
                "success": true,
                "order": {
                    "id": 7,
                    "destination": "Corso Buenos Aires 33",
                    "destinationCoords": { "latitude": 45.48, "longitude": 9.21 },
                    "status": "assigned",
                    "rider_id": 4
                }
            }"#,
        )
        .unwrap();
        let order = order_from_action(reply, "accept").unwrap();
        assert_eq!(order.id.value(), 7);
        assert_eq!(order.delivery_address, "Corso Buenos Aires 33");
    }
}
