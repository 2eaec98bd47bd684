//! Courier CLI entry point

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::error;

use courier_cli::{
    app::CourierApp,
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_configuration(&cli)?;
    config.cli.verbose |= cli.verbose;
    setup_logging(config.cli.verbose);

    let data_dir = resolve_data_dir(&cli)?;
    let app = CourierApp::new(config.clone(), &data_dir);

    let outcome = match cli.command {
        Commands::Login {
            host,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            app.login(&host, &email, &password).await
        }
        Commands::Logout => app.logout(),
        Commands::Whoami => app.whoami(),
        Commands::Ride => app.ride().await,
        Commands::Deliveries => app.deliveries().await,
        Commands::Earnings => app.earnings().await,
        Commands::Badge => app.badge().await,
        Commands::Debug { host, port } => {
            courier_cli::console::run(&host, port, config.timings.debug_connect_timeout()).await
        }
    };

    if let Err(e) = outcome {
        error!("command failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Load configuration from an explicit file or the default location
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    }
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(PathBuf::from(dir));
    }
    AppConfig::default_data_dir()
        .ok_or_else(|| CliError::Config("cannot determine home directory".to_string()))
}

fn prompt_password() -> Result<String> {
    print!("password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
