//! Per-tick work budget
//!
//! Caps how many chunk generations and boundary refreshes one scheduler tick
//! may perform, so a tick's cost stays bounded however much work is queued.

/// Work quotas for a single tick
#[derive(Clone, Copy, Debug)]
pub struct TickBudget {
    max_generations: u32,
    max_refreshes: u32,
    generations: u32,
    refreshes: u32,
}

impl TickBudget {
    /// Create a fresh budget
    ///
    /// # Arguments
    /// * `max_generations` - Jobs that may be dequeued this tick
    /// * `max_refreshes` - Boundary refreshes that may be applied this tick
    pub fn new(max_generations: u32, max_refreshes: u32) -> Self {
        Self { max_generations, max_refreshes, generations: 0, refreshes: 0 }
    }

    /// Spend one generation slot; false once the quota is used up
    pub fn try_generation(&mut self) -> bool {
        if self.generations < self.max_generations {
            self.generations += 1;
            true
        } else {
            false
        }
    }

    /// Spend one refresh slot; false once the quota is used up
    pub fn try_refresh(&mut self) -> bool {
        if self.refreshes < self.max_refreshes {
            self.refreshes += 1;
            true
        } else {
            false
        }
    }

}
