use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::cell::ResourceCell;
use crate::effect::{Effect, ResourceRef};
use crate::error::GameError;
use crate::world::{
    ElectronicsStore, FoodKind, FoodStockEntry, FoodStore, FoodSupply, Person, PopulationGroup,
    PopulationId, ResearchState, ResourceBundle, ThresholdEffect, WaterStore, World,
};

fn default_days_per_turn() -> u32 {
    1
}

fn default_happiness() -> CellInit {
    CellInit {
        total: 100.0,
        growth: 0.0,
    }
}

fn default_rate() -> CellInit {
    CellInit {
        total: 1.0,
        growth: 1.0,
    }
}

const PERSON_METER_START: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CellInit {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub growth: f64,
}

impl CellInit {
    fn build(self) -> ResourceCell {
        ResourceCell::new(self.total, self.growth)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdInit {
    pub threshold: u64,
    pub description: String,
    #[serde(default)]
    pub on_activate: Vec<Effect>,
    #[serde(default)]
    pub on_deactivate: Vec<Effect>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopulationInit {
    pub id: PopulationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub count: u32,
    #[serde(default = "default_happiness")]
    pub happiness: CellInit,
    #[serde(default)]
    pub quantity_growth: f64,
    #[serde(default)]
    pub effects: Vec<ThresholdInit>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ElectronicsInit {
    #[serde(default)]
    pub scrap: CellInit,
    #[serde(default)]
    pub common: CellInit,
    #[serde(default)]
    pub rare: CellInit,
    #[serde(default)]
    pub legendary: CellInit,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WaterInit {
    #[serde(default)]
    pub dirty: CellInit,
    #[serde(default)]
    pub clean: CellInit,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FoodSupplyInit {
    #[serde(default)]
    pub value: CellInit,
    pub depletion_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockInit {
    pub quantities: BTreeMap<FoodKind, f64>,
    pub expires_at: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodInit {
    pub fruit_vegetables: FoodSupplyInit,
    pub dairy: FoodSupplyInit,
    pub protein: FoodSupplyInit,
    pub fat: FoodSupplyInit,
    #[serde(default)]
    pub stock: Vec<StockInit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesInit {
    #[serde(default)]
    pub energy: CellInit,
    #[serde(default)]
    pub electronics: ElectronicsInit,
    #[serde(default)]
    pub water: WaterInit,
    pub food: FoodInit,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResearchInit {
    #[serde(default = "default_rate")]
    pub engineering: CellInit,
    #[serde(default = "default_rate")]
    pub survival: CellInit,
    #[serde(default = "default_rate")]
    pub science: CellInit,
}

impl Default for ResearchInit {
    fn default() -> Self {
        Self {
            engineering: default_rate(),
            survival: default_rate(),
            science: default_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default = "default_days_per_turn")]
    pub days_per_turn: u32,
    #[serde(default)]
    pub turns: Option<u64>,
    pub populations: Vec<PopulationInit>,
    pub resources: ResourcesInit,
    #[serde(default)]
    pub research: ResearchInit,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let deserializer = serde_yaml::Deserializer::from_str(&data);
        let scenario: Scenario = serde_yaml::with::singleton_map_recursive::deserialize(deserializer)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.populations.is_empty() {
            return Err(GameError::InvalidScenario(
                "scenario must define at least one population group".into(),
            ));
        }
        if self.days_per_turn == 0 {
            return Err(GameError::InvalidScenario(
                "days_per_turn must be at least 1".into(),
            ));
        }

        let mut known_ids = Vec::new();
        for population in &self.populations {
            if known_ids.contains(&population.id) {
                return Err(GameError::InvalidScenario(format!(
                    "population id {} defined more than once",
                    population.id
                )));
            }
            known_ids.push(population.id);
        }

        if self.populations.iter().map(|p| p.count as u64).sum::<u64>() == 0 {
            return Err(GameError::InvalidScenario(
                "total population must be greater than zero".into(),
            ));
        }

        for population in &self.populations {
            let mut seen_thresholds = Vec::new();
            for effect in &population.effects {
                if effect.threshold == 0 {
                    return Err(GameError::InvalidThreshold {
                        population: population.name.clone(),
                        threshold: effect.threshold,
                        reason: "threshold must be greater than zero".into(),
                    });
                }
                if seen_thresholds.contains(&effect.threshold) {
                    return Err(GameError::InvalidThreshold {
                        population: population.name.clone(),
                        threshold: effect.threshold,
                        reason: "threshold defined more than once".into(),
                    });
                }
                seen_thresholds.push(effect.threshold);

                for target in effect
                    .on_activate
                    .iter()
                    .chain(effect.on_deactivate.iter())
                    .filter_map(population_target)
                {
                    if !known_ids.contains(&target) {
                        return Err(GameError::UnknownPopulation(target));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn build_world(&self) -> Result<World, GameError> {
        self.validate()?;

        let resources = ResourceBundle {
            energy: self.resources.energy.build(),
            electronics: ElectronicsStore {
                scrap: self.resources.electronics.scrap.build(),
                common: self.resources.electronics.common.build(),
                rare: self.resources.electronics.rare.build(),
                legendary: self.resources.electronics.legendary.build(),
            },
            water: WaterStore {
                dirty: self.resources.water.dirty.build(),
                clean: self.resources.water.clean.build(),
            },
            food: FoodStore {
                fruit_vegetables: build_supply(self.resources.food.fruit_vegetables),
                dairy: build_supply(self.resources.food.dairy),
                protein: build_supply(self.resources.food.protein),
                fat: build_supply(self.resources.food.fat),
                stock: self
                    .resources
                    .food
                    .stock
                    .iter()
                    .map(|entry| FoodStockEntry {
                        quantities: entry.quantities.clone(),
                        expires_at: entry.expires_at,
                    })
                    .collect(),
            },
        };

        let tech = ResearchState {
            engineering_rate: self.research.engineering.build(),
            survival_rate: self.research.survival.build(),
            science_rate: self.research.science.build(),
            researched: Vec::new(),
        };

        let mut world = World::new(self.start_date, self.days_per_turn, resources, tech);
        for population in &self.populations {
            let effects = population
                .effects
                .iter()
                .map(|init| {
                    (
                        init.threshold,
                        ThresholdEffect::new(
                            init.description.clone(),
                            init.on_activate.clone(),
                            init.on_deactivate.clone(),
                        ),
                    )
                })
                .collect();
            let persons = (0..population.count)
                .map(|i| Person {
                    name: format!("Survivor {}", i + 1),
                    age: 16 + (i * 7) % 48,
                    food_meter: PERSON_METER_START,
                    clean_water_meter: PERSON_METER_START,
                })
                .collect();
            world.add_population(PopulationGroup {
                id: population.id,
                name: population.name.clone(),
                description: population.description.clone(),
                happiness: population.happiness.build(),
                quantity: ResourceCell::new(population.count as f64, population.quantity_growth),
                effects,
                persons,
            });
        }
        Ok(world)
    }

    pub fn turns(&self, override_turns: Option<u64>) -> u64 {
        override_turns.or(self.turns).unwrap_or(30)
    }

    /// Built-in default scenario: one founding settlement four weeks from a
    /// supply drop running out.
    pub fn aftermath() -> Self {
        let start_date =
            NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid built-in start date");
        Self {
            name: "aftermath".into(),
            description: Some(
                "The original survivors, well prepared and set on rebuilding society".into(),
            ),
            start_date,
            days_per_turn: 1,
            turns: Some(30),
            populations: vec![PopulationInit {
                id: 1,
                name: "First Survivors".into(),
                description: "Well prepared and focused on recreating a working settlement".into(),
                count: 10,
                happiness: CellInit {
                    total: 100.0,
                    growth: 0.0,
                },
                quantity_growth: 0.0,
                effects: vec![
                    ThresholdInit {
                        threshold: 20,
                        description: "The survivors take heart from the settlement's growth"
                            .into(),
                        on_activate: vec![Effect::IncrementTotal {
                            target: ResourceRef::Happiness(1),
                            amount: 10.0,
                        }],
                        on_deactivate: vec![Effect::IncrementTotal {
                            target: ResourceRef::Happiness(1),
                            amount: -10.0,
                        }],
                    },
                    ThresholdInit {
                        threshold: 40,
                        description: "Hope spreads, speeding up science research".into(),
                        on_activate: vec![Effect::IncrementGrowth {
                            target: ResourceRef::ResearchRate(crate::world::Branch::Science),
                            amount: 0.4,
                        }],
                        on_deactivate: vec![Effect::IncrementGrowth {
                            target: ResourceRef::ResearchRate(crate::world::Branch::Science),
                            amount: -0.4,
                        }],
                    },
                ],
            }],
            resources: ResourcesInit {
                energy: CellInit::default(),
                electronics: ElectronicsInit {
                    scrap: CellInit {
                        total: 10.0,
                        growth: 0.0,
                    },
                    common: CellInit {
                        total: 10.0,
                        growth: 0.0,
                    },
                    rare: CellInit::default(),
                    legendary: CellInit::default(),
                },
                water: WaterInit {
                    dirty: CellInit {
                        total: 70.0,
                        growth: 0.0,
                    },
                    clean: CellInit::default(),
                },
                food: FoodInit {
                    fruit_vegetables: FoodSupplyInit {
                        value: CellInit {
                            total: 10.0,
                            growth: 0.0,
                        },
                        depletion_rate: 0.3,
                    },
                    dairy: FoodSupplyInit {
                        value: CellInit {
                            total: 10.0,
                            growth: 0.0,
                        },
                        depletion_rate: 0.1,
                    },
                    protein: FoodSupplyInit {
                        value: CellInit {
                            total: 10.0,
                            growth: 0.0,
                        },
                        depletion_rate: 0.5,
                    },
                    fat: FoodSupplyInit {
                        value: CellInit {
                            total: 10.0,
                            growth: 0.0,
                        },
                        depletion_rate: 0.4,
                    },
                    stock: vec![StockInit {
                        quantities: BTreeMap::from([(FoodKind::Fat, 10.0), (FoodKind::Protein, 20.0)]),
                        expires_at: start_date
                            .checked_add_days(Days::new(28))
                            .expect("expiry date in range"),
                    }],
                },
            },
            research: ResearchInit::default(),
        }
    }
}

fn build_supply(init: FoodSupplyInit) -> FoodSupply {
    FoodSupply {
        value: init.value.build(),
        depletion_rate: init.depletion_rate,
    }
}

fn population_target(effect: &Effect) -> Option<PopulationId> {
    match effect {
        Effect::IncrementGrowth { target, .. } | Effect::IncrementTotal { target, .. } => {
            match target {
                ResourceRef::Happiness(id) | ResourceRef::Quantity(id) => Some(*id),
                _ => None,
            }
        }
        Effect::IncrementHappinessAll { .. } => None,
    }
}
