use anyhow::Result;

use crate::{
    effect::Effect,
    engine::{System, SystemContext},
    world::World,
};

/// Edge-triggered threshold crossing detection. Each threshold stores the
/// level it held on the previous turn; a crossing flips the level and fires
/// the matching effect list exactly once. Thresholds are evaluated in
/// ascending order per group, groups in ascending id, so several thresholds
/// may fire in the same turn in a deterministic order.
pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        let mut fired: Vec<(String, Vec<Effect>)> = Vec::new();
        for group in world.populations.values_mut() {
            let quantity = group.quantity.total();
            for (&threshold, effect) in group.effects.iter_mut() {
                let level = quantity >= threshold as f64;
                if level == effect.active {
                    continue;
                }
                effect.active = level;
                let effects = if level {
                    effect.on_activate.clone()
                } else {
                    effect.on_deactivate.clone()
                };
                fired.push((format!("{} at {}", group.name, threshold), effects));
            }
        }

        for (label, effects) in fired {
            for effect in &effects {
                if let Err(err) = world.apply_effect(effect) {
                    world
                        .bookkeeping
                        .effect_failures
                        .push(format!("{label}: {err}"));
                }
            }
        }
        Ok(())
    }
}
