//! Courier CLI library
//!
//! Components of the Courier terminal client: argument parsing, layered
//! configuration, the persisted session store, the interactive delivery
//! loop and the read-only views.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod views;

pub use app::CourierApp;
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use session::SessionStore;
