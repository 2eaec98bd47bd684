//! Delivery lifecycle state machine
//!
//! A single tagged union replaces the original trio of `online` /
//! `delivering` / `currentOrder` flags so the illegal combinations
//! (delivering without an order, delivering with a pending list) cannot be
//! constructed. All methods are synchronous and side-effect free; the
//! runtime task decides what network calls and timer changes each
//! transition implies.

use courier_core::{CourierError, HealthSample, Order, OrderId, Result};

// ----------------------------------------------------------------------------
// Delivery Phase
// ----------------------------------------------------------------------------

/// Where the rider is in the delivery flow.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryPhase {
    /// Signed in but not accepting work.
    Offline,
    /// Online and waiting; `pending` is replaced wholesale on every poll.
    Idle { pending: Vec<Order> },
    /// On the road with exactly one order.
    Delivering { order: Order, health: HealthSample },
}

impl DeliveryPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryPhase::Offline => "offline",
            DeliveryPhase::Idle { .. } => "idle",
            DeliveryPhase::Delivering { .. } => "delivering",
        }
    }
}

// ----------------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------------

/// The state machine itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    phase: DeliveryPhase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: DeliveryPhase::Offline,
        }
    }

    pub fn phase(&self) -> &DeliveryPhase {
        &self.phase
    }

    pub fn is_online(&self) -> bool {
        !matches!(self.phase, DeliveryPhase::Offline)
    }

    pub fn is_delivering(&self) -> bool {
        matches!(self.phase, DeliveryPhase::Delivering { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DeliveryPhase::Idle { .. })
    }

    pub fn current_order(&self) -> Option<&Order> {
        match &self.phase {
            DeliveryPhase::Delivering { order, .. } => Some(order),
            _ => None,
        }
    }

    pub fn pending_orders(&self) -> &[Order] {
        match &self.phase {
            DeliveryPhase::Idle { pending } => pending,
            _ => &[],
        }
    }

    pub fn health(&self) -> HealthSample {
        match &self.phase {
            DeliveryPhase::Delivering { health, .. } => health.clone(),
            _ => HealthSample::default(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Offline → Idle. A no-op when already idle; refused mid-delivery.
    pub fn go_online(&mut self) -> Result<()> {
        match &self.phase {
            DeliveryPhase::Offline => {
                self.phase = DeliveryPhase::Idle {
                    pending: Vec::new(),
                };
                Ok(())
            }
            DeliveryPhase::Idle { .. } => Ok(()),
            DeliveryPhase::Delivering { .. } => Err(CourierError::invalid_transition(
                "already online and delivering",
            )),
        }
    }

    /// Any state → Offline. Force-clears the current order and pending set.
    pub fn go_offline(&mut self) {
        self.phase = DeliveryPhase::Offline;
    }

    /// Idle → Delivering with the order the backend confirmed. The pending
    /// set is cleared wholesale and health resets to the default.
    pub fn accept(&mut self, order: Order) -> Result<()> {
        match &self.phase {
            DeliveryPhase::Idle { .. } => {
                self.phase = DeliveryPhase::Delivering {
                    order,
                    health: HealthSample::default(),
                };
                Ok(())
            }
            DeliveryPhase::Offline => {
                Err(CourierError::invalid_transition("cannot accept while offline"))
            }
            DeliveryPhase::Delivering { .. } => Err(CourierError::invalid_transition(
                "already delivering an order",
            )),
        }
    }

    /// Remove one order from the pending set, locally only. No backend call
    /// is made for a rejection.
    pub fn reject(&mut self, id: OrderId) -> Result<()> {
        match &mut self.phase {
            DeliveryPhase::Idle { pending } => {
                pending.retain(|o| o.id != id);
                Ok(())
            }
            _ => Err(CourierError::invalid_transition(
                "can only reject while idle",
            )),
        }
    }

    /// Delivering → Idle(empty). Returns the completed order; health resets
    /// to the default regardless of its value at completion time.
    pub fn complete(&mut self) -> Result<Order> {
        match std::mem::replace(&mut self.phase, DeliveryPhase::Offline) {
            DeliveryPhase::Delivering { order, .. } => {
                self.phase = DeliveryPhase::Idle {
                    pending: Vec::new(),
                };
                Ok(order)
            }
            other => {
                self.phase = other;
                Err(CourierError::invalid_transition(
                    "no delivery in progress to complete",
                ))
            }
        }
    }

    /// Startup path: a previously assigned in-progress order was found, so
    /// the machine resumes directly into Delivering.
    pub fn resume(&mut self, order: Order) -> Result<()> {
        match &self.phase {
            DeliveryPhase::Offline => {
                self.phase = DeliveryPhase::Delivering {
                    order,
                    health: HealthSample::default(),
                };
                Ok(())
            }
            _ => Err(CourierError::invalid_transition(
                "can only resume from offline at startup",
            )),
        }
    }

    // ------------------------------------------------------------------
    // Poll results
    // ------------------------------------------------------------------

    /// Replace the pending set wholesale with a fresh poll result. Returns
    /// false (and changes nothing) outside the idle state, which is how
    /// late results from a stopped loop get dropped.
    pub fn replace_pending(&mut self, orders: Vec<Order>) -> bool {
        match &mut self.phase {
            DeliveryPhase::Idle { pending } => {
                *pending = orders;
                true
            }
            _ => false,
        }
    }

    /// Overwrite the health sample with a fresh companion report. Returns
    /// the new sample while delivering, `None` otherwise.
    pub fn apply_health(&mut self, report: &str) -> Option<HealthSample> {
        match &mut self.phase {
            DeliveryPhase::Delivering { health, .. } => {
                *health = HealthSample::from_report(report);
                Some(health.clone())
            }
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{OrderStatus, RiderId};

    fn order(id: u64) -> Order {
        Order {
            id: OrderId::new(id),
            delivery_address: format!("Via Test {}", id),
            destination_lat: 45.46,
            destination_lng: 9.19,
            status: OrderStatus::Pending,
            rider_id: None,
        }
    }

    #[test]
    fn starts_offline() {
        let lc = Lifecycle::new();
        assert!(!lc.is_online());
        assert!(!lc.is_delivering());
        assert!(lc.current_order().is_none());
        assert!(lc.pending_orders().is_empty());
    }

    #[test]
    fn accept_clears_pending_and_sets_current() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.replace_pending(vec![order(3), order(7), order(9)]);

        lc.accept(order(7)).unwrap();

        assert!(lc.is_delivering());
        assert_eq!(lc.current_order().unwrap().id, OrderId::new(7));
        assert!(lc.pending_orders().is_empty());
    }

    #[test]
    fn delivering_implies_order_present() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.accept(order(1)).unwrap();
        assert!(lc.is_delivering());
        assert!(lc.current_order().is_some());
        assert!(lc.pending_orders().is_empty());
    }

    #[test]
    fn go_offline_resets_everything() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.accept(order(5)).unwrap();
        lc.apply_health("VERY NEGATIVE").unwrap();

        lc.go_offline();

        assert!(!lc.is_online());
        assert!(!lc.is_delivering());
        assert!(lc.current_order().is_none());
        assert!(lc.pending_orders().is_empty());
        assert_eq!(lc.health(), HealthSample::default());
    }

    #[test]
    fn complete_resets_health_and_returns_to_idle() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.accept(order(5)).unwrap();
        lc.apply_health("VERY POSITIVE").unwrap();
        assert_eq!(lc.health().level, 5);

        let done = lc.complete().unwrap();

        assert_eq!(done.id, OrderId::new(5));
        assert!(lc.is_idle());
        assert_eq!(lc.health(), HealthSample::default());
    }

    #[test]
    fn reject_is_local_and_keeps_the_rest() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.replace_pending(vec![order(3), order(7), order(9)]);

        lc.reject(OrderId::new(7)).unwrap();

        let ids: Vec<u64> = lc.pending_orders().iter().map(|o| o.id.value()).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn poll_results_are_dropped_outside_idle() {
        let mut lc = Lifecycle::new();
        assert!(!lc.replace_pending(vec![order(1)]));

        lc.go_online().unwrap();
        lc.accept(order(2)).unwrap();
        assert!(!lc.replace_pending(vec![order(1)]));
        assert!(lc.pending_orders().is_empty());
    }

    #[test]
    fn health_reports_are_dropped_outside_delivering() {
        let mut lc = Lifecycle::new();
        assert!(lc.apply_health("POSITIVE").is_none());
        lc.go_online().unwrap();
        assert!(lc.apply_health("POSITIVE").is_none());
    }

    #[test]
    fn unrecognized_health_report_defaults_level_keeps_label() {
        let mut lc = Lifecycle::new();
        lc.go_online().unwrap();
        lc.accept(order(1)).unwrap();

        let sample = lc.apply_health("very positive").unwrap();
        assert_eq!(sample.level, 5);

        let sample = lc.apply_health("UNKNOWN").unwrap();
        assert_eq!(sample.level, 3);
        assert_eq!(sample.label, "UNKNOWN");
    }

    #[test]
    fn invalid_transitions_are_refused() {
        let mut lc = Lifecycle::new();
        assert!(lc.accept(order(1)).is_err());
        assert!(lc.complete().is_err());
        assert!(lc.reject(OrderId::new(1)).is_err());

        lc.go_online().unwrap();
        lc.accept(order(1)).unwrap();
        assert!(lc.go_online().is_err());
        assert!(lc.accept(order(2)).is_err());
        assert!(lc.resume(order(3)).is_err());
    }

    #[test]
    fn resume_enters_delivering_from_offline() {
        let mut lc = Lifecycle::new();
        let mut active = order(11);
        active.status = OrderStatus::Assigned;
        active.rider_id = Some(RiderId::new(4));

        lc.resume(active).unwrap();

        assert!(lc.is_delivering());
        assert_eq!(lc.current_order().unwrap().id, OrderId::new(11));
    }
}
