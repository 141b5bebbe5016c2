//! Cash and inventory state of a backtest run.

/// Per-period inventory holding cost rate once fully stale.
pub const INVENTORY_RISK_RATE: f64 = 0.001;
/// Periods of continuous holding until the holding cost reaches its cap.
pub const INVENTORY_RISK_RAMP: f64 = 30.0;

/// Mutable accounting state owned by a single backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryState {
    /// Cash balance.
    pub cash: f64,
    /// Units held.
    pub position: u32,
    /// Aggregate cost of the open position.
    pub cost_basis: f64,
    /// Consecutive periods the position has been held without a sale.
    pub periods_stale: u32,
    /// Cumulative holding cost charged against cash.
    pub inventory_risk_cost: f64,
    /// Realized P&L of each closed trade.
    pub realized_pnls: Vec<f64>,
}

impl InventoryState {
    /// Creates a flat state with `initial_cash`.
    #[must_use]
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            position: 0,
            cost_basis: 0.0,
            periods_stale: 0,
            inventory_risk_cost: 0.0,
            realized_pnls: Vec::new(),
        }
    }

    /// Average cost per unit held, 0 when flat.
    #[must_use]
    pub fn average_cost(&self) -> f64 {
        if self.position == 0 {
            0.0
        } else {
            self.cost_basis / f64::from(self.position)
        }
    }

    /// Buys `size` units at `unit_cost` if cash covers it.
    ///
    /// Returns the total cost debited, or `None` when cash is insufficient.
    pub fn buy(&mut self, size: u32, unit_cost: f64) -> Option<f64> {
        let cost = unit_cost * f64::from(size);
        if size == 0 || self.cash < cost {
            return None;
        }
        self.cash -= cost;
        self.cost_basis += cost;
        self.position += size;
        Some(cost)
    }

    /// Sells `size` units (capped at the position) at `trade_price`,
    /// crediting `trade_price * net_multiplier` per unit.
    ///
    /// Returns `(proceeds, realized_pnl)`. Any sale resets the staleness
    /// counter.
    pub fn sell(&mut self, size: u32, trade_price: f64, net_multiplier: f64) -> (f64, f64) {
        let size = size.min(self.position);
        let units = f64::from(size);
        let avg_cost = self.average_cost();
        let pnl = (trade_price - avg_cost) * units;
        let proceeds = trade_price * net_multiplier * units;

        self.cash += proceeds;
        self.cost_basis -= avg_cost * units;
        self.position -= size;
        if self.position == 0 {
            self.cost_basis = 0.0;
        }
        self.periods_stale = 0;
        self.realized_pnls.push(pnl);
        (proceeds, pnl)
    }

    /// Charges the holding cost for one period of open inventory marked at
    /// `mark_price`. No-op when flat.
    ///
    /// Returns the amount charged.
    pub fn accrue_inventory_risk(&mut self, mark_price: f64) -> f64 {
        if self.position == 0 {
            return 0.0;
        }
        self.periods_stale += 1;
        let ramp = (f64::from(self.periods_stale) / INVENTORY_RISK_RAMP).min(1.0);
        let penalty = f64::from(self.position) * mark_price * INVENTORY_RISK_RATE * ramp;
        self.cash -= penalty;
        self.inventory_risk_cost += penalty;
        penalty
    }

    /// Cash plus inventory marked at `mark_price`.
    #[must_use]
    pub fn equity(&self, mark_price: f64) -> f64 {
        self.cash + f64::from(self.position) * mark_price
    }
}
