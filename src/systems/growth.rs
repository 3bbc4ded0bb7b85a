use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::{Branch, FoodKind, Grade, Purity, World},
};

/// Folds every cell's growth rate into its total, in a fixed total order:
/// shared resources first, then populations in ascending id, then the
/// research rates. Effects that depend on this turn's totals always see a
/// fully grown world.
pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.resources.energy.apply_growth();
        for grade in Grade::ALL {
            world.resources.electronics.cell_mut(grade).apply_growth();
        }
        for purity in Purity::ALL {
            world.resources.water.cell_mut(purity).apply_growth();
        }
        for kind in FoodKind::ALL {
            world.resources.food.supply_mut(kind).value.apply_growth();
        }
        for group in world.populations.values_mut() {
            group.happiness.apply_growth();
            group.quantity.apply_growth();
        }
        for branch in Branch::ALL {
            world.tech.rate_mut(branch).apply_growth();
        }
        Ok(())
    }
}
