//! Post-completion side-effect chain
//!
//! After a delivery completes, four follow-up calls run on a detached task:
//! stop the companion sampler, ask the backend to evaluate badge
//! eligibility, bump the rider's experience, and (after a fixed delay) push
//! the order to the ledger service. Every step is best-effort: a failure is
//! logged at warn and the chain moves on. The rider's flow never blocks on
//! any of this.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use courier_backend::{BackendClient, CompanionClient};
use courier_core::{OrderId, RiderId};

/// Spawn the post-completion chain for one finished order. Returns the task
/// handle so tests can await it; the runtime just drops it.
pub fn spawn_completion_chain(
    backend: BackendClient,
    companion: CompanionClient,
    rider: RiderId,
    order: OrderId,
    ledger_delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(%rider, %order, "running post-completion chain");

        if let Err(err) = companion.stop_sampling(rider).await {
            warn!(%order, %err, "failed to stop companion sampling");
        }

        if let Err(err) = backend.check_nft(rider).await {
            warn!(%order, %err, "badge eligibility check failed");
        }

        if let Err(err) = backend.update_experience(rider).await {
            warn!(%order, %err, "experience update failed");
        }

        tokio::time::sleep(ledger_delay).await;
        if let Err(err) = backend.upload_order_to_ledger(rider, order).await {
            warn!(%order, %err, "ledger upload failed");
        }
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // 127.0.0.1:1 refuses connections immediately, so every step fails fast.
    fn dead_backend() -> BackendClient {
        BackendClient::new("127.0.0.1", 1, Duration::from_secs(1)).unwrap()
    }

    fn dead_companion() -> CompanionClient {
        CompanionClient::new("127.0.0.1", 1, Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn chain_completes_even_when_every_step_fails() {
        let handle = spawn_completion_chain(
            dead_backend(),
            dead_companion(),
            RiderId::new(4),
            OrderId::new(7),
            Duration::from_millis(1),
        );
        handle.await.unwrap();
    }
}
