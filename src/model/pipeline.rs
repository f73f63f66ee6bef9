// src/model/pipeline.rs

use std::collections::VecDeque;

/// A replenishment order that has been placed but not yet received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenOrder {
    pub quantity: f64,
    pub due_day: usize,
}

/// Orders in transit from the supplier.
///
/// Lead time is fixed, so due days are non-decreasing from front to back and
/// arrivals only ever come off the front.
#[derive(Debug, Clone, Default)]
pub struct OrderPipeline {
    buffer: VecDeque<OpenOrder>,
    on_order: f64,
}

impl OrderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step 1: Pop every order due on or before `day`.
    /// Call this at the START of the day. Returns the quantity received.
    pub fn pop_arrivals(&mut self, day: usize) -> f64 {
        let mut received = 0.0;
        while let Some(order) = self.buffer.front() {
            if order.due_day > day {
                break;
            }
            received += order.quantity;
            self.buffer.pop_front();
        }
        self.on_order -= received;
        if self.buffer.is_empty() {
            // Drop accumulated rounding once nothing is in transit.
            self.on_order = 0.0;
        }
        received
    }

    /// Step 2: A new order enters the pipeline.
    pub fn push_order(&mut self, quantity: f64, due_day: usize) {
        debug_assert!(
            self.buffer.back().map_or(true, |o| o.due_day <= due_day),
            "orders must be pushed in due-day order"
        );
        self.buffer.push_back(OpenOrder { quantity, due_day });
        self.on_order += quantity;
    }

    /// Total quantity ordered but not yet received.
    pub fn on_order(&self) -> f64 {
        self.on_order
    }
}
