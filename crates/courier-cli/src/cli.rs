//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Data directory for session persistence
    #[arg(short, long)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in against a backend host and persist the session
    Login {
        /// Backend host (IP or hostname)
        host: String,
        /// Rider email
        email: String,
        /// Password; prompted on stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Clear the persisted session
    Logout,
    /// Show the signed-in rider
    Whoami,
    /// Start the interactive delivery loop
    Ride,
    /// List completed deliveries
    Deliveries,
    /// Show total and weekly earnings
    Earnings,
    /// Show experience, badge level and collected badges
    Badge,
    /// Open a raw-TCP debug console to a field device
    Debug {
        /// Device host (IP or hostname)
        host: String,
        /// Device port
        port: u16,
    },
}
