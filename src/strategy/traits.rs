// src/strategy/traits.rs

use std::fmt::Debug;

/// Defines the reorder decision of a continuous-review replenishment rule.
///
/// We require `Send` + `Sync` so one rule can be evaluated from many worker threads.
pub trait ReorderRule: Debug + Send + Sync {
    /// Stock on hand at the start of the horizon.
    fn initial_on_hand(&self) -> f64;

    /// How much to order given today's inventory position (on-hand + on-order).
    ///
    /// Returns `None` when no order should be placed.
    fn order_for(&self, inventory_position: f64) -> Option<f64>;
}
