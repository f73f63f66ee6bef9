// src/simulation/engine.rs

use crate::io::demand::DemandTrajectory;
use crate::model::stock::StockPoint;
use crate::simulation::config::InventoryParams;
use crate::strategy::traits::ReorderRule;

/// Outcome of one policy over one demand trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    /// End-of-day inventory position, after the reorder decision.
    pub inventory_positions: Vec<f64>,
    /// End-of-day on-hand stock.
    pub closing_stock: Vec<f64>,
    pub stockout_days: u32,
    pub units_short: f64,
    pub total_demand: f64,
    pub orders_placed: u32,
    pub holding_cost: f64,
    pub ordering_cost: f64,
}

impl SimulationRun {
    pub fn horizon(&self) -> usize {
        self.inventory_positions.len()
    }

    pub fn total_cost(&self) -> f64 {
        self.holding_cost + self.ordering_cost
    }

    pub fn cost_per_day(&self) -> f64 {
        per_day(self.total_cost(), self.horizon())
    }

    pub fn holding_cost_per_day(&self) -> f64 {
        per_day(self.holding_cost, self.horizon())
    }

    pub fn ordering_cost_per_day(&self) -> f64 {
        per_day(self.ordering_cost, self.horizon())
    }

    /// Fill rate: share of demanded units served from stock.
    /// A run without demand has nothing to miss and scores 1.
    pub fn fill_rate(&self) -> f64 {
        if self.total_demand <= 0.0 {
            1.0
        } else {
            1.0 - self.units_short / self.total_demand
        }
    }
}

fn per_day(amount: f64, horizon: usize) -> f64 {
    if horizon == 0 {
        0.0
    } else {
        amount / horizon as f64
    }
}

/// Simulates a continuous-review rule day by day under lost sales.
///
/// Each day:
/// 1. receive orders due today,
/// 2. serve demand, losing whatever stock cannot cover,
/// 3. order if the inventory position is at or below the reorder point (one order per
///    day, due `lead_time_days` later; zero lead time means it lands immediately),
/// 4. pay holding on end-of-day stock.
pub fn simulate<P: ReorderRule + ?Sized>(
    rule: &P,
    params: &InventoryParams,
    demand: &DemandTrajectory,
) -> SimulationRun {
    let horizon = demand.len();
    let mut stock = StockPoint::new(rule.initial_on_hand());
    let mut run = SimulationRun {
        inventory_positions: Vec::with_capacity(horizon),
        closing_stock: Vec::with_capacity(horizon),
        stockout_days: 0,
        units_short: 0.0,
        total_demand: 0.0,
        orders_placed: 0,
        holding_cost: 0.0,
        ordering_cost: 0.0,
    };

    for (day, &today) in demand.days().iter().enumerate() {
        // MORNING: arrivals
        stock.receive_due(day);

        // DAY: demand
        let served = stock.serve_demand(today);
        run.total_demand += today;
        if served.short > 0.0 {
            run.stockout_days += 1;
            run.units_short += served.short;
        }

        // EVENING: review
        if let Some(quantity) = rule.order_for(stock.inventory_position()) {
            run.orders_placed += 1;
            run.ordering_cost += params.order_cost;
            if params.lead_time_days == 0 {
                stock.on_hand += quantity;
            } else {
                stock.place_order(quantity, day + params.lead_time_days);
            }
        }

        // NIGHT: holding
        run.holding_cost += params.holding_cost * stock.on_hand;
        run.inventory_positions.push(stock.inventory_position());
        run.closing_stock.push(stock.on_hand);
    }

    run
}
