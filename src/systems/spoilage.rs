use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::{ExpiredStockRecord, World},
};

/// Removes food stock entries whose expiry date has passed and subtracts
/// their quantities from the matching food totals. Totals are not clamped;
/// a batch that was already eaten leaves a deficit.
pub struct SpoilageSystem;

impl SpoilageSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpoilageSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SpoilageSystem {
    fn name(&self) -> &str {
        "spoilage"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let stock = std::mem::take(&mut world.resources.food.stock);
        let (expired, fresh): (Vec<_>, Vec<_>) = stock
            .into_iter()
            .partition(|entry| entry.expires_at <= ctx.date);
        world.resources.food.stock = fresh;

        for entry in expired {
            for (&kind, &amount) in &entry.quantities {
                world
                    .resources
                    .food
                    .supply_mut(kind)
                    .value
                    .increment_total(-amount);
            }
            world.bookkeeping.expired_stock.push(ExpiredStockRecord {
                expired_on: entry.expires_at,
                quantities: entry.quantities,
            });
        }
        Ok(())
    }
}
