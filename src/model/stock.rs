// src/model/stock.rs

use crate::model::pipeline::OrderPipeline;

/// What happened to one day's demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fulfilment {
    pub sold: f64,
    pub short: f64,
}

/// Inventory state of the single stocking point under lost sales.
#[derive(Debug, Clone)]
pub struct StockPoint {
    pub on_hand: f64,
    pub pipeline: OrderPipeline,
}

impl StockPoint {
    pub fn new(initial_on_hand: f64) -> Self {
        Self {
            on_hand: initial_on_hand,
            pipeline: OrderPipeline::new(),
        }
    }

    /// Step 1: Receive every order due today.
    pub fn receive_due(&mut self, day: usize) -> f64 {
        let quantity = self.pipeline.pop_arrivals(day);
        self.on_hand += quantity;
        quantity
    }

    /// Step 2: Serve today's demand from stock.
    ///
    /// Anything that cannot be served is lost; on-hand never drops below zero.
    pub fn serve_demand(&mut self, demand: f64) -> Fulfilment {
        let sold = demand.min(self.on_hand);
        self.on_hand -= sold;
        if self.on_hand < 0.0 {
            self.on_hand = 0.0;
        }
        Fulfilment {
            sold,
            short: demand - sold,
        }
    }

    /// On-hand plus on-order. Lost sales keep backlog at zero.
    pub fn inventory_position(&self) -> f64 {
        self.on_hand + self.pipeline.on_order()
    }

    /// Step 3: Release an order due on `due_day`.
    pub fn place_order(&mut self, quantity: f64, due_day: usize) {
        self.pipeline.push_order(quantity, due_day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_is_lost_and_stock_floors_at_zero() {
        let mut stock = StockPoint::new(10.0);
        let f = stock.serve_demand(14.5);
        assert_eq!(f.sold, 10.0);
        assert_eq!(f.short, 4.5);
        assert_eq!(stock.on_hand, 0.0);

        let f = stock.serve_demand(3.0);
        assert_eq!(f.sold, 0.0);
        assert_eq!(f.short, 3.0);
        assert_eq!(stock.on_hand, 0.0);
    }

    #[test]
    fn position_counts_goods_in_transit() {
        let mut stock = StockPoint::new(20.0);
        stock.place_order(42.0, 5);
        assert_eq!(stock.inventory_position(), 62.0);
        stock.serve_demand(5.0);
        assert_eq!(stock.inventory_position(), 57.0);
        assert_eq!(stock.receive_due(4), 0.0);
        assert_eq!(stock.receive_due(5), 42.0);
        assert_eq!(stock.on_hand, 57.0);
        assert_eq!(stock.inventory_position(), 57.0);
    }
}
