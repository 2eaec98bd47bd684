//! Courier core domain model
//!
//! This crate provides the foundational types for the Courier rider client:
//! rider/order identities, the delivery order shape, the health-sample model
//! polled from the companion device service, the shared error taxonomy, and
//! the timing constants that drive the polling loops. It performs no I/O.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod errors;
pub mod health;
pub mod session;
pub mod timings;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use errors::{CourierError, NetworkError, Result, SessionStoreError, ValidationError};
pub use health::{HealthSample, HealthStatus};
pub use session::{display_name_from_email, Session};
pub use timings::Timings;
pub use types::{Order, OrderId, OrderStatus, RiderId};
