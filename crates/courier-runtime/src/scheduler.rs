//! Polling scheduler
//!
//! Two independent periodic loops, each identified by a generation token.
//! Starting a loop bumps the generation; stopping it aborts the task. Ticks
//! are spawned rather than awaited in line, so a slow response never delays
//! the next scheduled tick (last write wins, as the backend expects). A
//! result that arrives after its loop was stopped carries a dead generation
//! and is discarded by the runtime, so no queued tick can act after
//! cancellation.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

// ----------------------------------------------------------------------------
// Generation Token
// ----------------------------------------------------------------------------

/// Identity of one activation of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(pub(crate) u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

// ----------------------------------------------------------------------------
// Loop Handles
// ----------------------------------------------------------------------------

#[derive(Debug)]
struct LoopHandle {
    generation: Generation,
    handle: JoinHandle<()>,
}

impl LoopHandle {
    fn abort(self) {
        self.handle.abort();
    }
}

// ----------------------------------------------------------------------------
// Polling Scheduler
// ----------------------------------------------------------------------------

/// Owns the order-polling and health-polling loops.
#[derive(Debug, Default)]
pub struct PollingScheduler {
    next_generation: u64,
    order_loop: Option<LoopHandle>,
    health_loop: Option<LoopHandle>,
}

impl PollingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> Generation {
        self.next_generation += 1;
        Generation(self.next_generation)
    }

    /// Whether a generation belongs to a currently running loop. Everything
    /// else is stale and must be dropped silently.
    pub fn is_live(&self, generation: Generation) -> bool {
        self.order_loop
            .as_ref()
            .map(|l| l.generation == generation)
            .unwrap_or(false)
            || self
                .health_loop
                .as_ref()
                .map(|l| l.generation == generation)
                .unwrap_or(false)
    }

    pub fn order_loop_running(&self) -> bool {
        self.order_loop.is_some()
    }

    pub fn health_loop_running(&self) -> bool {
        self.health_loop.is_some()
    }

    pub fn order_generation(&self) -> Option<Generation> {
        self.order_loop.as_ref().map(|l| l.generation)
    }

    pub fn health_generation(&self) -> Option<Generation> {
        self.health_loop.as_ref().map(|l| l.generation)
    }

    /// Start (or restart) the pending-orders loop: one tick immediately,
    /// then one every `interval`. Active only while online and idle.
    pub fn start_order_loop<F, Fut>(&mut self, interval: Duration, tick: F) -> Generation
    where
        F: Fn(Generation) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop_order_loop();
        let generation = self.bump();
        debug!(generation = generation.value(), "starting order poll loop");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                tokio::spawn(tick(generation));
            }
        });

        self.order_loop = Some(LoopHandle { generation, handle });
        generation
    }

    /// Start (or restart) the health loop: armed after `warmup`, first
    /// sample a further `first_delay` later, then one every `interval`.
    /// Active only while delivering.
    pub fn start_health_loop<F, Fut>(
        &mut self,
        warmup: Duration,
        first_delay: Duration,
        interval: Duration,
        tick: F,
    ) -> Generation
    where
        F: Fn(Generation) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop_health_loop();
        let generation = self.bump();
        debug!(generation = generation.value(), "starting health poll loop");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(warmup).await;
            tokio::time::sleep(first_delay).await;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                tokio::spawn(tick(generation));
            }
        });

        self.health_loop = Some(LoopHandle { generation, handle });
        generation
    }

    /// Stop the order loop immediately; queued results become stale.
    pub fn stop_order_loop(&mut self) {
        if let Some(handle) = self.order_loop.take() {
            debug!(
                generation = handle.generation.value(),
                "stopping order poll loop"
            );
            handle.abort();
        }
    }

    /// Stop the health loop immediately; queued results become stale.
    pub fn stop_health_loop(&mut self) {
        if let Some(handle) = self.health_loop.take() {
            debug!(
                generation = handle.generation.value(),
                "stopping health poll loop"
            );
            handle.abort();
        }
    }

    /// Unconditional teardown.
    pub fn shutdown(&mut self) {
        self.stop_order_loop();
        self.stop_health_loop();
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    fn recorder() -> (
        mpsc::UnboundedSender<(Generation, Duration)>,
        mpsc::UnboundedReceiver<(Generation, Duration)>,
        Instant,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, rx, Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn order_loop_ticks_immediately_then_on_cadence() {
        let mut scheduler = PollingScheduler::new();
        let (tx, mut rx, start) = recorder();

        scheduler.start_order_loop(Duration::from_secs(60), move |generation| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((generation, Instant::now() - start));
            }
        });

        tokio::time::sleep(Duration::from_secs(121)).await;
        scheduler.shutdown();

        let mut offsets = Vec::new();
        while let Ok((_, offset)) = rx.try_recv() {
            offsets.push(offset.as_secs());
        }
        assert_eq!(offsets, vec![0, 60, 120]);
    }

    #[tokio::test(start_paused = true)]
    async fn health_loop_warms_up_before_first_sample() {
        let mut scheduler = PollingScheduler::new();
        let (tx, mut rx, start) = recorder();

        scheduler.start_health_loop(
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(5),
            move |generation| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((generation, Instant::now() - start));
                }
            },
        );

        tokio::time::sleep(Duration::from_secs(26)).await;
        scheduler.shutdown();

        let mut offsets = Vec::new();
        while let Ok((_, offset)) = rx.try_recv() {
            offsets.push(offset.as_secs());
        }
        // armed at 5s, first sample 10s later, then every 5s
        assert_eq!(offsets, vec![15, 20, 25]);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_a_loop_kills_its_generation() {
        let mut scheduler = PollingScheduler::new();
        let (tx, mut rx, _) = recorder();

        let generation = scheduler.start_order_loop(Duration::from_secs(60), move |g| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((g, Duration::ZERO));
            }
        });
        assert!(scheduler.is_live(generation));

        scheduler.stop_order_loop();
        assert!(!scheduler.is_live(generation));

        // no further ticks fire after cancellation
        tokio::time::sleep(Duration::from_secs(180)).await;
        let ticks: usize = std::iter::from_fn(|| rx.try_recv().ok()).count();
        assert!(ticks <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_bumps_generation() {
        let mut scheduler = PollingScheduler::new();

        let first = scheduler.start_order_loop(Duration::from_secs(60), |_| async {});
        let second = scheduler.start_order_loop(Duration::from_secs(60), |_| async {});

        assert_ne!(first, second);
        assert!(!scheduler.is_live(first));
        assert!(scheduler.is_live(second));
    }

    #[tokio::test(start_paused = true)]
    async fn order_and_health_generations_are_independent() {
        let mut scheduler = PollingScheduler::new();

        let order_gen = scheduler.start_order_loop(Duration::from_secs(60), |_| async {});
        let health_gen = scheduler.start_health_loop(
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(5),
            |_| async {},
        );

        assert!(scheduler.is_live(order_gen));
        assert!(scheduler.is_live(health_gen));

        scheduler.stop_health_loop();
        assert!(scheduler.is_live(order_gen));
        assert!(!scheduler.is_live(health_gen));
    }
}
