//! Courier backend clients
//!
//! Thin request/response wrappers around the delivery backend
//! (`http://{host}:3000`), the companion health service
//! (`http://{host}:3001`) and the raw-TCP debug link used for ad hoc field
//! device testing. No retry logic lives here; callers decide what a failure
//! means for the delivery lifecycle.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod client;
pub mod companion;
pub mod debug;
pub mod wire;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use client::BackendClient;
pub use companion::CompanionClient;
pub use debug::{DebugLink, DebugLinkError, DebugReader, DebugWriter};
pub use wire::{DeliveryRecord, Earnings, LoginOutcome, Nft};
