//! Wire formats for the delivery backend
//!
//! The backend is loose about shapes: pending orders arrive either in the
//! raw upstream layout (`destination`, `destinationCoords`) or already
//! flattened (`delivery_address`, `dest_lat`, `dest_long`), and the
//! experience endpoint returns either a bare number or an object. Every DTO
//! here normalizes into the domain types from `courier-core` so nothing
//! outside this module sees the difference.

use serde::Deserialize;

use courier_core::{Order, OrderId, OrderStatus, RiderId};

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CoordsDto {
    pub latitude: f64,
    pub longitude: f64,
}

/// A pending or assigned order in either of the two upstream layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderDto {
    Upstream {
        id: u64,
        destination: String,
        #[serde(rename = "destinationCoords")]
        destination_coords: CoordsDto,
        status: String,
        #[serde(default)]
        rider_id: Option<u64>,
    },
    Flattened {
        id: u64,
        delivery_address: String,
        dest_lat: f64,
        dest_long: f64,
        status: String,
        #[serde(default)]
        rider_id: Option<u64>,
    },
}

/// Map a wire status string onto the known enum, case-insensitively.
/// Anything unrecognized is treated as still pending.
fn parse_status(status: &str) -> OrderStatus {
    match status.trim().to_lowercase().as_str() {
        "assigned" => OrderStatus::Assigned,
        "completed" => OrderStatus::Completed,
        _ => OrderStatus::Pending,
    }
}

impl From<OrderDto> for Order {
    fn from(dto: OrderDto) -> Self {
        match dto {
            OrderDto::Upstream {
                id,
                destination,
                destination_coords,
                status,
                rider_id,
            } => Order {
                id: OrderId::new(id),
                delivery_address: destination,
                destination_lat: destination_coords.latitude,
                destination_lng: destination_coords.longitude,
                status: parse_status(&status),
                rider_id: rider_id.map(RiderId::new),
            },
            OrderDto::Flattened {
                id,
                delivery_address,
                dest_lat,
                dest_long,
                status,
                rider_id,
            } => Order {
                id: OrderId::new(id),
                delivery_address,
                destination_lat: dest_lat,
                destination_lng: dest_long,
                status: parse_status(&status),
                rider_id: rider_id.map(RiderId::new),
            },
        }
    }
}

/// Reply shape of `/update-order` and `/complete-order`.
#[derive(Debug, Deserialize)]
pub struct OrderActionDto {
    pub success: bool,
    #[serde(default)]
    pub order: Option<OrderDto>,
    #[serde(default)]
    pub error: Option<String>,
}

// ----------------------------------------------------------------------------
// Authentication
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SessionDto {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginDto {
    pub session: SessionDto,
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct RiderIdDto {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct MeDto {
    pub user: UserDto,
}

/// Normalized outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub email: String,
}

// ----------------------------------------------------------------------------
// Profile / Badge
// ----------------------------------------------------------------------------

/// Experience arrives as a bare number from newer backends and wrapped in an
/// object from older ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExperienceDto {
    Bare(f64),
    Wrapped { experience: f64 },
}

impl ExperienceDto {
    pub fn value(&self) -> f64 {
        match self {
            ExperienceDto::Bare(xp) => *xp,
            ExperienceDto::Wrapped { experience } => *experience,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NftDto {
    pub id: String,
    pub uri: String,
}

/// A collected badge NFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nft {
    pub id: String,
    pub image_uri: String,
}

impl From<NftDto> for Nft {
    fn from(dto: NftDto) -> Self {
        Nft {
            id: dto.id,
            image_uri: dto.uri,
        }
    }
}

// ----------------------------------------------------------------------------
// History / Earnings
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeliveryRecord {
    pub id: u64,
    pub delivery_address: String,
    pub delivery_date: String,
    pub result: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Earnings {
    pub total: f64,
    pub weekly: f64,
    #[serde(rename = "weeklyData", default)]
    pub weekly_data: Vec<f64>,
}

// ----------------------------------------------------------------------------
// Companion Service
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HealthRunDto {
    #[serde(default)]
    pub result: Option<String>,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_order_shape_normalizes() {
        let json = r#"{
            "id": 12,
            "destination": "Via Torino 4",
            "destinationCoords": { "latitude": 45.46, "longitude": 9.19 },
            "status": "pending"
        }"#;
        let order: Order = serde_json::from_str::<OrderDto>(json).unwrap().into();
        assert_eq!(order.id, OrderId::new(12));
        assert_eq!(order.delivery_address, "Via Torino 4");
        assert_eq!(order.destination_lat, 45.46);
        assert_eq!(order.destination_lng, 9.19);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.rider_id, None);
    }

    #[test]
    fn flattened_order_shape_normalizes_identically() {
        let json = r#"{
            "id": 12,
            "delivery_address": "Via Torino 4",
            "dest_lat": 45.46,
            "dest_long": 9.19,
            "status": "assigned",
            "rider_id": 3
        }"#;
        let order: Order = serde_json::from_str::<OrderDto>(json).unwrap().into();
        assert_eq!(order.id, OrderId::new(12));
        assert_eq!(order.delivery_address, "Via Torino 4");
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.rider_id, Some(RiderId::new(3)));
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        assert_eq!(parse_status("IN FLIGHT"), OrderStatus::Pending);
        assert_eq!(parse_status("Completed"), OrderStatus::Completed);
    }

    #[test]
    fn order_action_reply_tolerates_missing_order() {
        let json = r#"{ "success": false, "error": "already assigned" }"#;
        let reply: OrderActionDto = serde_json::from_str(json).unwrap();
        assert!(!reply.success);
        assert!(reply.order.is_none());
        assert_eq!(reply.error.as_deref(), Some("already assigned"));
    }

    #[test]
    fn experience_accepts_both_shapes() {
        let bare: ExperienceDto = serde_json::from_str("42.5").unwrap();
        assert_eq!(bare.value(), 42.5);
        let wrapped: ExperienceDto = serde_json::from_str(r#"{ "experience": 87 }"#).unwrap();
        assert_eq!(wrapped.value(), 87.0);
    }

    #[test]
    fn earnings_default_to_empty_week() {
        let json = r#"{ "total": 120.0, "weekly": 35.5 }"#;
        let earnings: Earnings = serde_json::from_str(json).unwrap();
        assert!(earnings.weekly_data.is_empty());
    }

    #[test]
    fn login_reply_deserializes() {
        let json = r#"{
            "session": { "access_token": "at", "refresh_token": "rt" },
            "user": { "email": "mario.rossi@x.com" }
        }"#;
        let login: LoginDto = serde_json::from_str(json).unwrap();
        assert_eq!(login.session.access_token, "at");
        assert_eq!(login.user.email, "mario.rossi@x.com");
    }
}
