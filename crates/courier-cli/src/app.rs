//! Application wiring
//!
//! Glues config, session store, backend clients and the runtime together
//! behind one method per subcommand. The interactive `ride` loop bridges
//! stdin lines to runtime commands and prints the event stream; everything
//! after startup degrades to a printed message instead of exiting.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use courier_backend::{BackendClient, CompanionClient};
use courier_core::{
    display_name_from_email, CourierError, NetworkError, OrderId, RiderId, Session,
    ValidationError,
};
use courier_runtime::{AppEvent, CourierRuntime, RuntimeHandle};

use crate::config::AppConfig;
use crate::error::Result;
use crate::session::SessionStore;
use crate::views;

// ----------------------------------------------------------------------------
// Courier App
// ----------------------------------------------------------------------------

pub struct CourierApp {
    config: AppConfig,
    store: SessionStore,
}

impl CourierApp {
    pub fn new(config: AppConfig, data_dir: &Path) -> Self {
        Self {
            config,
            store: SessionStore::new(data_dir),
        }
    }

    fn backend_for(&self, host: &str) -> Result<BackendClient> {
        Ok(BackendClient::new(
            host,
            self.config.backend.port,
            self.config.timings.http_timeout(),
        )?)
    }

    fn companion_for(&self, host: &str) -> Result<CompanionClient> {
        Ok(CompanionClient::new(
            host,
            self.config.backend.companion_port,
            self.config.timings.http_timeout(),
        )?)
    }

    /// Load the persisted session and refuse to proceed unless it carries
    /// everything the delivery flow needs.
    fn signed_in_session(&self) -> Result<Session> {
        let session = self.store.load()?;
        if !session.is_complete() {
            return Err(CourierError::not_signed_in("run `courier login` first").into());
        }
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Sign-in / sign-out
    // ------------------------------------------------------------------

    pub async fn login(&self, host: &str, email: &str, password: &str) -> Result<()> {
        let host = host.trim();
        if host.is_empty() {
            return Err(CourierError::from(ValidationError::InvalidHost {
                value: host.to_string(),
            })
            .into());
        }

        let backend = self.backend_for(host)?;
        let outcome = backend.login(email, password).await?;
        let rider_name = display_name_from_email(&outcome.email);
        let rider_id = backend.rider_id(&outcome.email).await?;

        let session = Session {
            host: Some(host.to_string()),
            rider_id: Some(rider_id),
            rider_name: Some(rider_name.clone()),
            email: Some(outcome.email),
            auth_token: Some(outcome.access_token),
            refresh_token: Some(outcome.refresh_token),
        };
        self.store.save(&session)?;
        info!(%rider_id, "session persisted");
        println!("signed in as {} (rider {})", rider_name, rider_id);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        println!("signed out");
        Ok(())
    }

    pub fn whoami(&self) -> Result<()> {
        let session = self.store.load()?;
        if !session.is_complete() {
            println!("not signed in");
            return Ok(());
        }
        println!(
            "{} (rider {}) @ {}",
            session.rider_name().unwrap_or("?"),
            session
                .rider_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "?".to_string()),
            session.host().unwrap_or("?"),
        );
        if let Some(email) = &session.email {
            println!("email: {}", email);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interactive delivery loop
    // ------------------------------------------------------------------

    pub async fn ride(&self) -> Result<()> {
        let session = self.signed_in_session()?;
        let host = session.host().unwrap_or_default().to_string();
        let rider_id = session.rider_id.unwrap_or(RiderId::new(0));
        let rider_name = session.rider_name().unwrap_or_default().to_string();

        let backend = self.backend_for(&host)?;
        self.verify_token(&backend, &session).await?;
        let companion = self.companion_for(&host)?;

        let (runtime, handle, mut events) = CourierRuntime::new(
            backend,
            companion,
            rider_id,
            rider_name.clone(),
            self.config.timings.clone(),
        );
        let runtime_task = tokio::spawn(runtime.run());

        println!("riding as {} (rider {})", rider_name, rider_id);
        print_ride_help();

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => print_event(&event),
                    None => break,
                },
                line = stdin.next_line() => match line? {
                    Some(line) => {
                        if !dispatch_ride_command(&handle, line.trim()).await {
                            break;
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        let _ = handle.shutdown().await;
        let _ = runtime_task.await;
        println!("bye");
        Ok(())
    }

    /// Check the persisted token against `/me`. An auth failure means the
    /// session is dead; anything else is only a warning (the backend may be
    /// briefly unreachable).
    async fn verify_token(&self, backend: &BackendClient, session: &Session) -> Result<()> {
        let Some(token) = &session.auth_token else {
            return Err(CourierError::not_signed_in("no auth token stored").into());
        };
        match backend.me(token).await {
            Ok(_) => Ok(()),
            Err(CourierError::Network(NetworkError::Status { code, .. }))
                if code == 401 || code == 403 =>
            {
                Err(CourierError::not_signed_in("session expired, run `courier login` again")
                    .into())
            }
            Err(err) => {
                warn!(%err, "could not verify session token");
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    pub async fn deliveries(&self) -> Result<()> {
        let session = self.signed_in_session()?;
        let backend = self.backend_for(session.host().unwrap_or_default())?;
        let records = backend
            .deliveries(session.rider_name().unwrap_or_default())
            .await?;
        print!("{}", views::render_deliveries(&records));
        Ok(())
    }

    pub async fn earnings(&self) -> Result<()> {
        let session = self.signed_in_session()?;
        let backend = self.backend_for(session.host().unwrap_or_default())?;
        let earnings = backend
            .earnings(session.rider_name().unwrap_or_default())
            .await?;
        print!(
            "{}",
            views::render_earnings(&earnings, self.config.cli.bar_width)
        );
        Ok(())
    }

    pub async fn badge(&self) -> Result<()> {
        let session = self.signed_in_session()?;
        let backend = self.backend_for(session.host().unwrap_or_default())?;
        let rider_name = session.rider_name().unwrap_or_default();
        let rider_id = session.rider_id.unwrap_or(RiderId::new(0));

        let experience = backend.experience(rider_name).await?;
        // the badge list is best-effort; the ledger service behind it is
        // often down in lab deployments
        let nfts = match backend.nfts(rider_id).await {
            Ok(nfts) => nfts,
            Err(err) => {
                warn!(%err, "could not fetch badges");
                Vec::new()
            }
        };
        print!("{}", views::render_badge(experience, &nfts));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Ride Loop Helpers
// ----------------------------------------------------------------------------

fn print_ride_help() {
    println!("commands: online | offline | accept <id> | reject <id> | complete | help | quit");
}

/// Returns false when the loop should end.
async fn dispatch_ride_command(handle: &RuntimeHandle, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let result = match (parts.next(), parts.next()) {
        (None, _) => return true,
        (Some("quit"), _) | (Some("exit"), _) => return false,
        (Some("help"), _) => {
            print_ride_help();
            return true;
        }
        (Some("online"), None) => handle.go_online().await,
        (Some("offline"), None) => handle.go_offline().await,
        (Some("complete"), None) => handle.complete_order().await,
        (Some("accept"), Some(id)) => match id.parse::<OrderId>() {
            Ok(id) => handle.accept_order(id).await,
            Err(err) => {
                println!("{}", err);
                return true;
            }
        },
        (Some("reject"), Some(id)) => match id.parse::<OrderId>() {
            Ok(id) => handle.reject_order(id).await,
            Err(err) => {
                println!("{}", err);
                return true;
            }
        },
        _ => {
            println!("unknown command, type `help`");
            return true;
        }
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            // the runtime task is gone, nothing left to drive
            println!("{}", err);
            false
        }
    }
}

fn print_event(event: &AppEvent) {
    match event {
        AppEvent::WentOnline => println!("you are online; watching for orders"),
        AppEvent::WentOffline => println!("you are offline"),
        AppEvent::PendingReplaced { orders } => print!("{}", views::render_pending(orders)),
        AppEvent::OrderAccepted { order } => println!(
            "accepted order #{} -> {}",
            order.id.value(),
            order.delivery_address
        ),
        AppEvent::OrderCompleted { order } => {
            println!("completed order #{}", order.id.value())
        }
        AppEvent::DeliveryResumed { order } => println!(
            "resumed delivery of order #{} -> {}",
            order.id.value(),
            order.delivery_address
        ),
        AppEvent::HealthUpdated { sample } => println!("{}", views::render_health(sample)),
        AppEvent::Error { message } => println!("error: {}", message),
    }
}
