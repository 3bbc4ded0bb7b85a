use crate::effect::{Effect, ResourceRef};
use crate::world::{Branch, FoodKind, Grade, Purity};

/// A researchable technology. `effects` run exactly once at research time;
/// `turn_start` / `turn_end` are registered as recurring hooks.
#[derive(Debug, Clone, Copy)]
pub struct TechDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub branch: Branch,
    pub cost: f64,
    pub tier: u8,
    pub description: &'static str,
    pub effects: &'static [Effect],
    pub turn_start: &'static [Effect],
    pub turn_end: &'static [Effect],
}

pub const TECH_TREE: &[TechDefinition] = &[
    // engineering
    TechDefinition {
        id: "water_filtration",
        name: "Basic Water Filtration",
        branch: Branch::Engineering,
        cost: 8.0,
        tier: 1,
        description: "Cleans one unit of water per turn",
        effects: &[
            Effect::IncrementGrowth {
                target: ResourceRef::Water(Purity::Clean),
                amount: 1.0,
            },
            Effect::IncrementGrowth {
                target: ResourceRef::Water(Purity::Dirty),
                amount: -1.0,
            },
        ],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "scrap_generator",
        name: "Scrap Generator",
        branch: Branch::Engineering,
        cost: 14.0,
        tier: 1,
        description: "Burns one unit of scrap for two units of energy at the start of every turn",
        effects: &[],
        turn_start: &[
            Effect::IncrementTotal {
                target: ResourceRef::Electronics(Grade::Scrap),
                amount: -1.0,
            },
            Effect::IncrementTotal {
                target: ResourceRef::Energy,
                amount: 2.0,
            },
        ],
        turn_end: &[],
    },
    TechDefinition {
        id: "solar_array",
        name: "Salvaged Solar Array",
        branch: Branch::Engineering,
        cost: 24.0,
        tier: 2,
        description: "Adds three units of energy per turn",
        effects: &[Effect::IncrementGrowth {
            target: ResourceRef::Energy,
            amount: 3.0,
        }],
        turn_start: &[],
        turn_end: &[],
    },
    // survival
    TechDefinition {
        id: "foraging",
        name: "Fruit and Vegetable Foraging",
        branch: Branch::Survival,
        cost: 10.0,
        tier: 1,
        description: "Adds one unit of fruits and vegetables per turn",
        effects: &[Effect::IncrementGrowth {
            target: ResourceRef::Food(FoodKind::FruitVegetables),
            amount: 1.0,
        }],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "campfire",
        name: "Campfire",
        branch: Branch::Survival,
        cost: 2.0,
        tier: 1,
        description: "Warmth and cooked meals raise the happiness of every population by 10",
        effects: &[Effect::IncrementHappinessAll { amount: 10.0 }],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "smokehouse",
        name: "Smokehouse",
        branch: Branch::Survival,
        cost: 16.0,
        tier: 2,
        description: "Preserved meat adds protein and fat every turn",
        effects: &[
            Effect::IncrementGrowth {
                target: ResourceRef::Food(FoodKind::Protein),
                amount: 0.5,
            },
            Effect::IncrementGrowth {
                target: ResourceRef::Food(FoodKind::Fat),
                amount: 0.25,
            },
        ],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "rain_catchers",
        name: "Rain Catchers",
        branch: Branch::Survival,
        cost: 12.0,
        tier: 2,
        description: "Collects two units of untreated water per turn",
        effects: &[Effect::IncrementGrowth {
            target: ResourceRef::Water(Purity::Dirty),
            amount: 2.0,
        }],
        turn_start: &[],
        turn_end: &[],
    },
    // science
    TechDefinition {
        id: "electronics_recycling",
        name: "Basic Electronics Recycling",
        branch: Branch::Science,
        cost: 15.0,
        tier: 1,
        description: "Adds one common electronic component per turn for two units of scrap",
        effects: &[
            Effect::IncrementGrowth {
                target: ResourceRef::Electronics(Grade::Common),
                amount: 1.0,
            },
            Effect::IncrementTotal {
                target: ResourceRef::Electronics(Grade::Scrap),
                amount: -2.0,
            },
        ],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "field_lab",
        name: "Field Laboratory",
        branch: Branch::Science,
        cost: 18.0,
        tier: 2,
        description: "A shared workbench speeds up research in every branch",
        effects: &[
            Effect::IncrementGrowth {
                target: ResourceRef::ResearchRate(Branch::Engineering),
                amount: 0.25,
            },
            Effect::IncrementGrowth {
                target: ResourceRef::ResearchRate(Branch::Survival),
                amount: 0.25,
            },
            Effect::IncrementGrowth {
                target: ResourceRef::ResearchRate(Branch::Science),
                amount: 0.25,
            },
        ],
        turn_start: &[],
        turn_end: &[],
    },
    TechDefinition {
        id: "archive_recovery",
        name: "Archive Recovery",
        branch: Branch::Science,
        cost: 26.0,
        tier: 2,
        description: "Recovered archives yield extra science at the end of every turn",
        effects: &[],
        turn_start: &[],
        turn_end: &[Effect::IncrementTotal {
            target: ResourceRef::ResearchRate(Branch::Science),
            amount: 0.5,
        }],
    },
];

pub fn definition(id: &str) -> Option<&'static TechDefinition> {
    TECH_TREE.iter().find(|def| def.id == id)
}

pub fn branch_catalog(branch: Branch) -> impl Iterator<Item = &'static TechDefinition> {
    TECH_TREE.iter().filter(move |def| def.branch == branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tech_ids_are_unique() {
        for (i, a) in TECH_TREE.iter().enumerate() {
            for b in &TECH_TREE[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate tech id {}", a.id);
            }
        }
    }

    #[test]
    fn costs_are_positive() {
        for def in TECH_TREE {
            assert!(def.cost > 0.0, "{} must have a positive cost", def.id);
        }
    }

    #[test]
    fn every_branch_has_a_tier_one_entry() {
        for branch in Branch::ALL {
            assert!(
                branch_catalog(branch).any(|def| def.tier == 1),
                "{branch} has no tier 1 technology"
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let def = definition("water_filtration").expect("known tech");
        assert_eq!(def.branch, Branch::Engineering);
        assert!(definition("cold_fusion").is_none());
    }
}
