//! Core identity and order types
//!
//! Newtype wrappers keep rider and order identifiers from being mixed up in
//! the HTTP layer, where both travel as bare integers.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// ----------------------------------------------------------------------------
// Rider Identifier
// ----------------------------------------------------------------------------

/// Numeric rider identifier assigned by the backend at sign-in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RiderId(pub u64);

impl RiderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RiderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidRiderId {
                value: s.to_string(),
            })
    }
}

// ----------------------------------------------------------------------------
// Order Identifier
// ----------------------------------------------------------------------------

/// Numeric order identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidOrderId {
                value: s.to_string(),
            })
    }
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

/// Backend-visible state of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Assigned => write!(f, "assigned"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A delivery order as the client sees it.
///
/// The upstream API uses two different field layouts for the same order
/// (see `courier-backend::wire`); both normalize into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub delivery_address: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub status: OrderStatus,
    pub rider_id: Option<RiderId>,
}

impl Order {
    /// Orders occasionally arrive with NaN coordinates when the backend has
    /// no geocode for the address yet. Such orders cannot be navigated to.
    pub fn has_valid_destination(&self) -> bool {
        self.destination_lat.is_finite() && self.destination_lng.is_finite()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
