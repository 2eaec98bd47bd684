//! Commands and events crossing the runtime boundary
//!
//! The UI sends `Command`s in and receives `AppEvent`s out; the polling
//! loops report back privately over `PollEvent`, which carries the
//! generation token the scheduler uses to discard stale results.

use courier_core::{HealthSample, Order, OrderId};

use crate::scheduler::Generation;

// ----------------------------------------------------------------------------
// Commands (UI → runtime)
// ----------------------------------------------------------------------------

/// A request from the user interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GoOnline,
    GoOffline,
    AcceptOrder(OrderId),
    RejectOrder(OrderId),
    CompleteOrder,
    Shutdown,
}

// ----------------------------------------------------------------------------
// App Events (runtime → UI)
// ----------------------------------------------------------------------------

/// A state change the user interface should render.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    WentOnline,
    WentOffline,
    /// The pending list was replaced wholesale by a fresh poll.
    PendingReplaced { orders: Vec<Order> },
    OrderAccepted { order: Order },
    OrderCompleted { order: Order },
    /// An in-progress delivery was recovered at startup.
    DeliveryResumed { order: Order },
    HealthUpdated { sample: HealthSample },
    /// A command failed; the lifecycle did not change.
    Error { message: String },
}

// ----------------------------------------------------------------------------
// Poll Events (polling tasks → runtime)
// ----------------------------------------------------------------------------

/// A result from a spawned poll tick. The generation identifies the loop
/// activation that produced it; results from dead generations are dropped
/// without effect.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PollEvent {
    PendingFetched {
        generation: Generation,
        orders: Vec<Order>,
    },
    HealthSampled {
        generation: Generation,
        report: String,
    },
}
