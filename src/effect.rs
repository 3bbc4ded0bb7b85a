use serde::{Deserialize, Serialize};

use crate::world::{Branch, FoodKind, Grade, PopulationId, Purity};

/// Addresses a single resource cell anywhere in the state graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRef {
    Energy,
    Electronics(Grade),
    Water(Purity),
    Food(FoodKind),
    Happiness(PopulationId),
    Quantity(PopulationId),
    ResearchRate(Branch),
}

/// A declarative state mutation. Effects carry no references into the world;
/// the target is resolved when the effect is applied, so technology and
/// threshold tables stay plain data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    IncrementGrowth { target: ResourceRef, amount: f64 },
    IncrementTotal { target: ResourceRef, amount: f64 },
    IncrementHappinessAll { amount: f64 },
}

/// A named batch of effects run at a fixed point of every turn, in
/// registration order. Researched technologies append these.
#[derive(Debug, Clone)]
pub struct TurnHook {
    pub name: String,
    pub effects: Vec<Effect>,
}
