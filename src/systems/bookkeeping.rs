use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::{FoodKind, TurnMetrics, World},
};

/// Normalizes the per-turn records and computes the turn's summary metrics.
/// Runs last so every other system's output is visible.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.bookkeeping.hungry_populations.sort();
        world.bookkeeping.hungry_populations.dedup();
        world.bookkeeping.thirsty_populations.sort();
        world.bookkeeping.thirsty_populations.dedup();

        let food_total = FoodKind::ALL
            .iter()
            .map(|&kind| world.resources.food.supply(kind).value.total())
            .sum();
        world.bookkeeping.metrics = Some(TurnMetrics {
            total_population: world.total_population(),
            deaths: world.bookkeeping.deaths.len(),
            expired_entries: world.bookkeeping.expired_stock.len(),
            clean_water: world.resources.water.clean.total(),
            food_total,
        });
        Ok(())
    }
}
