use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::{CauseOfDeath, DeathRecord, FoodKind, PopulationId, World},
};

const METER_MAX: f64 = 100.0;
const METER_REFILL: f64 = 25.0;
const METER_DROP: f64 = 10.0;
const CLEAN_WATER_PER_PERSON: f64 = 0.5;

/// Person-level upkeep. Each group draws its food demand (per-kind
/// depletion rate times headcount) and a clean-water ration from the shared
/// totals. A met need refills the matching meter; an unmet need drains it.
/// A person whose meter reaches zero dies: removed from the group, the
/// group's quantity decremented by one.
pub struct NeedsSystem;

impl NeedsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NeedsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for NeedsSystem {
    fn name(&self) -> &str {
        "needs"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        let ids: Vec<PopulationId> = world.populations.keys().copied().collect();
        for id in ids {
            let headcount = world
                .populations
                .get(&id)
                .expect("population group should exist")
                .persons
                .len() as f64;
            if headcount == 0.0 {
                continue;
            }

            let mut food_met = true;
            for kind in FoodKind::ALL {
                let supply = world.resources.food.supply_mut(kind);
                let demand = headcount * supply.depletion_rate;
                if demand <= 0.0 {
                    continue;
                }
                let available = supply.value.total();
                if available >= demand {
                    supply.value.increment_total(-demand);
                } else {
                    food_met = false;
                    if available > 0.0 {
                        supply.value.set_total(0.0);
                    }
                }
            }

            let clean = &mut world.resources.water.clean;
            let water_demand = headcount * CLEAN_WATER_PER_PERSON;
            let water_met = if clean.total() >= water_demand {
                clean.increment_total(-water_demand);
                true
            } else {
                if clean.total() > 0.0 {
                    clean.set_total(0.0);
                }
                false
            };

            let group = world
                .populations
                .get_mut(&id)
                .expect("population group should exist");
            if !food_met {
                world.bookkeeping.hungry_populations.push(group.name.clone());
            }
            if !water_met {
                world
                    .bookkeeping
                    .thirsty_populations
                    .push(group.name.clone());
            }

            let mut dead: Vec<(String, CauseOfDeath)> = Vec::new();
            group.persons.retain_mut(|person| {
                if food_met {
                    person.food_meter = (person.food_meter + METER_REFILL).min(METER_MAX);
                } else {
                    person.food_meter -= METER_DROP;
                }
                if water_met {
                    person.clean_water_meter =
                        (person.clean_water_meter + METER_REFILL).min(METER_MAX);
                } else {
                    person.clean_water_meter -= METER_DROP;
                }

                if person.food_meter <= 0.0 {
                    dead.push((person.name.clone(), CauseOfDeath::Starvation));
                    false
                } else if person.clean_water_meter <= 0.0 {
                    dead.push((person.name.clone(), CauseOfDeath::Dehydration));
                    false
                } else {
                    true
                }
            });

            if !dead.is_empty() {
                group.quantity.increment_total(-(dead.len() as f64));
            }
            for (name, cause) in dead {
                world.bookkeeping.deaths.push(DeathRecord {
                    population: id,
                    name,
                    cause,
                });
            }
        }
        Ok(())
    }
}
