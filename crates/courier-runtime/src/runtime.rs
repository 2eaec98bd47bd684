//! Runtime task
//!
//! The single task that owns the lifecycle state machine, the polling
//! scheduler and all network clients. The UI talks to it through a
//! `RuntimeHandle` and renders the `AppEvent` stream it emits. Poll ticks
//! report back over an internal channel tagged with their generation, so a
//! response that arrives after its loop was stopped is discarded before it
//! can touch state.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use courier_backend::{BackendClient, CompanionClient};
use courier_core::{CourierError, Order, OrderId, Result, RiderId, Timings};

use crate::effects::spawn_completion_chain;
use crate::events::{AppEvent, Command, PollEvent};
use crate::lifecycle::Lifecycle;
use crate::scheduler::PollingScheduler;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const APP_EVENT_CHANNEL_CAPACITY: usize = 256;

// ----------------------------------------------------------------------------
// Runtime Handle
// ----------------------------------------------------------------------------

/// Cloneable command-side handle to a running `CourierRuntime`.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
}

impl RuntimeHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CourierError::channel_error("runtime task is gone"))
    }

    pub async fn go_online(&self) -> Result<()> {
        self.send(Command::GoOnline).await
    }

    pub async fn go_offline(&self) -> Result<()> {
        self.send(Command::GoOffline).await
    }

    pub async fn accept_order(&self, order: OrderId) -> Result<()> {
        self.send(Command::AcceptOrder(order)).await
    }

    pub async fn reject_order(&self, order: OrderId) -> Result<()> {
        self.send(Command::RejectOrder(order)).await
    }

    pub async fn complete_order(&self) -> Result<()> {
        self.send(Command::CompleteOrder).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }
}

// ----------------------------------------------------------------------------
// Courier Runtime
// ----------------------------------------------------------------------------

/// Owns all mutable delivery state for one signed-in rider.
pub struct CourierRuntime {
    rider: RiderId,
    rider_name: String,
    backend: BackendClient,
    companion: CompanionClient,
    timings: Timings,
    lifecycle: Lifecycle,
    scheduler: PollingScheduler,
    command_rx: mpsc::Receiver<Command>,
    poll_tx: mpsc::UnboundedSender<PollEvent>,
    poll_rx: mpsc::UnboundedReceiver<PollEvent>,
    app_tx: mpsc::Sender<AppEvent>,
    running: bool,
}

impl CourierRuntime {
    /// Build a runtime plus its command handle and event stream. Nothing
    /// runs until `run` is awaited (usually on a spawned task).
    pub fn new(
        backend: BackendClient,
        companion: CompanionClient,
        rider: RiderId,
        rider_name: String,
        timings: Timings,
    ) -> (Self, RuntimeHandle, mpsc::Receiver<AppEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (app_tx, app_rx) = mpsc::channel(APP_EVENT_CHANNEL_CAPACITY);
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let runtime = Self {
            rider,
            rider_name,
            backend,
            companion,
            timings,
            lifecycle: Lifecycle::new(),
            scheduler: PollingScheduler::new(),
            command_rx,
            poll_tx,
            poll_rx,
            app_tx,
            running: true,
        };
        (
            runtime,
            RuntimeHandle {
                commands: command_tx,
            },
            app_rx,
        )
    }

    /// Main loop. Checks for an in-progress delivery first, then serves
    /// commands and poll results until shutdown.
    pub async fn run(mut self) {
        info!(rider = %self.rider, "runtime starting");
        self.try_resume().await;

        while self.running {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(event) = self.poll_rx.recv() => self.handle_poll_event(event),
            }
        }

        self.scheduler.shutdown();
        info!(rider = %self.rider, "runtime stopped");
    }

    // ------------------------------------------------------------------
    // Startup recovery
    // ------------------------------------------------------------------

    /// If the backend still holds an order assigned to this rider, resume
    /// straight into the delivering state instead of starting offline.
    async fn try_resume(&mut self) {
        let orders = match self.backend.active_orders(self.rider).await {
            Ok(orders) => orders,
            Err(err) => {
                debug!(%err, "active-order check failed, starting offline");
                return;
            }
        };
        let Some(order) = orders.into_iter().next() else {
            return;
        };

        info!(order = %order.id, "resuming in-progress delivery");
        if let Err(err) = self.lifecycle.resume(order.clone()) {
            warn!(%err, "could not resume delivery");
            return;
        }
        self.start_companion_sampling(order.id);
        self.start_health_loop();
        self.emit(AppEvent::DeliveryResumed { order });
    }

    // ------------------------------------------------------------------
    // Command handling
    // ------------------------------------------------------------------

    async fn handle_command(&mut self, command: Command) {
        debug!(?command, phase = self.lifecycle.phase().name(), "command");
        match command {
            Command::GoOnline => self.handle_go_online(),
            Command::GoOffline => self.handle_go_offline(),
            Command::AcceptOrder(order) => self.handle_accept(order).await,
            Command::RejectOrder(order) => self.handle_reject(order),
            Command::CompleteOrder => self.handle_complete().await,
            Command::Shutdown => {
                self.scheduler.shutdown();
                self.running = false;
            }
        }
    }

    fn handle_go_online(&mut self) {
        if let Err(err) = self.lifecycle.go_online() {
            self.emit_error(err);
            return;
        }
        self.start_order_loop();
        self.emit(AppEvent::WentOnline);
    }

    fn handle_go_offline(&mut self) {
        let was_delivering = self.lifecycle.is_delivering();
        self.scheduler.shutdown();
        self.lifecycle.go_offline();
        if was_delivering {
            // the order stays assigned on the backend and is picked up again
            // by the resume path at next startup
            let companion = self.companion.clone();
            let rider = self.rider;
            tokio::spawn(async move {
                if let Err(err) = companion.stop_sampling(rider).await {
                    warn!(%err, "failed to stop companion sampling");
                }
            });
        }
        self.emit(AppEvent::WentOffline);
    }

    async fn handle_accept(&mut self, order: OrderId) {
        if !self.lifecycle.is_idle() {
            self.emit_error(CourierError::invalid_transition(
                "can only accept while idle",
            ));
            return;
        }
        let confirmed = match self.backend.accept_order(self.rider, order).await {
            Ok(confirmed) => confirmed,
            Err(err) => {
                self.emit_error(err);
                return;
            }
        };
        self.scheduler.stop_order_loop();
        if let Err(err) = self.lifecycle.accept(confirmed.clone()) {
            self.emit_error(err);
            return;
        }
        self.start_companion_sampling(confirmed.id);
        self.start_health_loop();
        self.emit(AppEvent::OrderAccepted { order: confirmed });
    }

    fn handle_reject(&mut self, order: OrderId) {
        if let Err(err) = self.lifecycle.reject(order) {
            self.emit_error(err);
            return;
        }
        self.emit(AppEvent::PendingReplaced {
            orders: self.lifecycle.pending_orders().to_vec(),
        });
    }

    async fn handle_complete(&mut self) {
        let Some(current) = self.lifecycle.current_order() else {
            self.emit_error(CourierError::invalid_transition(
                "no delivery in progress to complete",
            ));
            return;
        };
        let order_id = current.id;
        let completed: Order = match self.backend.complete_order(self.rider, order_id).await {
            Ok(completed) => completed,
            Err(err) => {
                self.emit_error(err);
                return;
            }
        };
        self.scheduler.stop_health_loop();
        if let Err(err) = self.lifecycle.complete() {
            self.emit_error(err);
            return;
        }
        spawn_completion_chain(
            self.backend.clone(),
            self.companion.clone(),
            self.rider,
            order_id,
            self.timings.ledger_upload_delay(),
        );
        self.start_order_loop();
        self.emit(AppEvent::OrderCompleted { order: completed });
    }

    // ------------------------------------------------------------------
    // Poll handling
    // ------------------------------------------------------------------

    fn handle_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::PendingFetched { generation, orders } => {
                if !self.scheduler.is_live(generation) {
                    debug!(generation = generation.value(), "dropping stale order poll");
                    return;
                }
                if self.lifecycle.replace_pending(orders.clone()) {
                    self.emit(AppEvent::PendingReplaced { orders });
                }
            }
            PollEvent::HealthSampled { generation, report } => {
                if !self.scheduler.is_live(generation) {
                    debug!(generation = generation.value(), "dropping stale health sample");
                    return;
                }
                if let Some(sample) = self.lifecycle.apply_health(&report) {
                    self.emit(AppEvent::HealthUpdated { sample });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Loop wiring
    // ------------------------------------------------------------------

    fn start_order_loop(&mut self) {
        let backend = self.backend.clone();
        let poll_tx = self.poll_tx.clone();
        self.scheduler
            .start_order_loop(self.timings.order_poll_interval(), move |generation| {
                let backend = backend.clone();
                let poll_tx = poll_tx.clone();
                async move {
                    match backend.pending_orders().await {
                        Ok(orders) => {
                            let _ = poll_tx.send(PollEvent::PendingFetched { generation, orders });
                        }
                        Err(err) => warn!(%err, "pending-orders poll failed"),
                    }
                }
            });
    }

    fn start_health_loop(&mut self) {
        let companion = self.companion.clone();
        let poll_tx = self.poll_tx.clone();
        self.scheduler.start_health_loop(
            self.timings.health_warmup(),
            self.timings.health_first_sample(),
            self.timings.health_sample_interval(),
            move |generation| {
                let companion = companion.clone();
                let poll_tx = poll_tx.clone();
                async move {
                    match companion.sample().await {
                        Ok(Some(report)) => {
                            let _ = poll_tx.send(PollEvent::HealthSampled { generation, report });
                        }
                        Ok(None) => debug!("companion replied without a reading"),
                        Err(err) => warn!(%err, "health sample failed"),
                    }
                }
            },
        );
    }

    fn start_companion_sampling(&self, order: OrderId) {
        let companion = self.companion.clone();
        let rider_name = self.rider_name.clone();
        tokio::spawn(async move {
            if let Err(err) = companion.start_sampling(&rider_name, order).await {
                warn!(%order, %err, "failed to start companion sampling");
            }
        });
    }

    // ------------------------------------------------------------------
    // Event emission
    // ------------------------------------------------------------------

    fn emit(&self, event: AppEvent) {
        if let Err(err) = self.app_tx.try_send(event) {
            warn!(%err, "dropping app event, UI is not draining");
        }
    }

    fn emit_error(&self, err: CourierError) {
        warn!(%err, "command failed");
        self.emit(AppEvent::Error {
            message: err.to_string(),
        });
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
