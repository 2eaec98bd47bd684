//! Courier runtime
//!
//! Owns the delivery lifecycle: the online/idle/delivering state machine,
//! the two polling loops (pending orders while idle, health samples while
//! delivering), and the best-effort side-effect chain that follows a
//! completed delivery. The UI drives it over a command channel and observes
//! it over an event channel; all state mutation happens on the single
//! runtime task.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod effects;
pub mod events;
pub mod lifecycle;
pub mod runtime;
pub mod scheduler;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use events::{AppEvent, Command};
pub use lifecycle::{DeliveryPhase, Lifecycle};
pub use runtime::{CourierRuntime, RuntimeHandle};
pub use scheduler::{Generation, PollingScheduler};
