// src/strategy/policy.rs

use crate::error::{PlannerError, PlannerResult};
use crate::strategy::traits::ReorderRule;
use serde::Serialize;
use std::fmt;

/// A continuous-review (R, Q) rule: order Q whenever the inventory position is at or below R.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Policy {
    reorder_point: u32,
    order_quantity: u32,
}

impl Policy {
    /// Builds a policy, rejecting R < 0 and Q <= 0.
    pub fn new(reorder_point: i64, order_quantity: i64) -> PlannerResult<Self> {
        let invalid = |reason| PlannerError::InvalidPolicy {
            reorder_point,
            order_quantity,
            reason,
        };
        if reorder_point < 0 {
            return Err(invalid("reorder point must be >= 0"));
        }
        if order_quantity <= 0 {
            return Err(invalid("order quantity must be > 0"));
        }
        let reorder_point =
            u32::try_from(reorder_point).map_err(|_| invalid("reorder point too large"))?;
        let order_quantity =
            u32::try_from(order_quantity).map_err(|_| invalid("order quantity too large"))?;
        Ok(Self {
            reorder_point,
            order_quantity,
        })
    }

    pub fn reorder_point(&self) -> u32 {
        self.reorder_point
    }

    pub fn order_quantity(&self) -> u32 {
        self.order_quantity
    }

    /// R + Q, the policy footprint used for tie-breaking.
    pub fn footprint(&self) -> u64 {
        u64::from(self.reorder_point) + u64::from(self.order_quantity)
    }
}

impl ReorderRule for Policy {
    /// Starts just replenished: R + Q on hand.
    fn initial_on_hand(&self) -> f64 {
        self.footprint() as f64
    }

    fn order_for(&self, inventory_position: f64) -> Option<f64> {
        if inventory_position <= f64::from(self.reorder_point) {
            Some(f64::from(self.order_quantity))
        } else {
            None
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(R={}, Q={})", self.reorder_point, self.order_quantity)
    }
}
