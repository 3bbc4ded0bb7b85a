use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cell::{CellReading, ResourceCell};
use crate::effect::{Effect, ResourceRef, TurnHook};
use crate::error::GameError;
use crate::technology::{self, TechDefinition};

pub type PopulationId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Scrap,
    Common,
    Rare,
    Legendary,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Scrap, Grade::Common, Grade::Rare, Grade::Legendary];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purity {
    Dirty,
    Clean,
}

impl Purity {
    pub const ALL: [Purity; 2] = [Purity::Dirty, Purity::Clean];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    FruitVegetables,
    Dairy,
    Protein,
    Fat,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [
        FoodKind::FruitVegetables,
        FoodKind::Dairy,
        FoodKind::Protein,
        FoodKind::Fat,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Engineering,
    Survival,
    Science,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::Engineering, Branch::Survival, Branch::Science];
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Engineering => write!(f, "engineering"),
            Branch::Survival => write!(f, "survival"),
            Branch::Science => write!(f, "science"),
        }
    }
}

/// One row of a population's sparse effect table: fires `on_activate` when
/// `quantity.total` crosses the threshold upward and `on_deactivate` when it
/// crosses back down. `active` is the level seen on the previous turn, so
/// the detection is edge-triggered.
#[derive(Debug, Clone)]
pub struct ThresholdEffect {
    pub description: String,
    pub on_activate: Vec<Effect>,
    pub on_deactivate: Vec<Effect>,
    pub(crate) active: bool,
}

impl ThresholdEffect {
    pub fn new(
        description: String,
        on_activate: Vec<Effect>,
        on_deactivate: Vec<Effect>,
    ) -> Self {
        Self {
            description,
            on_activate,
            on_deactivate,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// An individual survivor. Meters run 0..=100 and drain while the group's
/// food or clean-water demand goes unmet; the person dies when either meter
/// reaches zero.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub food_meter: f64,
    pub clean_water_meter: f64,
}

#[derive(Debug)]
pub struct PopulationGroup {
    pub id: PopulationId,
    pub name: String,
    pub description: String,
    pub happiness: ResourceCell,
    pub quantity: ResourceCell,
    pub(crate) effects: BTreeMap<u64, ThresholdEffect>,
    pub(crate) persons: Vec<Person>,
}

impl PopulationGroup {
    pub fn effects(&self) -> &BTreeMap<u64, ThresholdEffect> {
        &self.effects
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn persons_mut(&mut self) -> &mut Vec<Person> {
        &mut self.persons
    }
}

/// One food category: the live total plus the per-person per-turn demand.
#[derive(Debug)]
pub struct FoodSupply {
    pub value: ResourceCell,
    pub depletion_rate: f64,
}

/// A perishable batch. Its quantities are already counted in the per-kind
/// totals; expiry removes the batch and subtracts them back out.
#[derive(Debug, Clone)]
pub struct FoodStockEntry {
    pub quantities: BTreeMap<FoodKind, f64>,
    pub expires_at: NaiveDate,
}

#[derive(Debug)]
pub struct ElectronicsStore {
    pub scrap: ResourceCell,
    pub common: ResourceCell,
    pub rare: ResourceCell,
    pub legendary: ResourceCell,
}

impl ElectronicsStore {
    pub fn cell(&self, grade: Grade) -> &ResourceCell {
        match grade {
            Grade::Scrap => &self.scrap,
            Grade::Common => &self.common,
            Grade::Rare => &self.rare,
            Grade::Legendary => &self.legendary,
        }
    }

    pub fn cell_mut(&mut self, grade: Grade) -> &mut ResourceCell {
        match grade {
            Grade::Scrap => &mut self.scrap,
            Grade::Common => &mut self.common,
            Grade::Rare => &mut self.rare,
            Grade::Legendary => &mut self.legendary,
        }
    }
}

#[derive(Debug)]
pub struct WaterStore {
    pub dirty: ResourceCell,
    pub clean: ResourceCell,
}

impl WaterStore {
    pub fn cell(&self, purity: Purity) -> &ResourceCell {
        match purity {
            Purity::Dirty => &self.dirty,
            Purity::Clean => &self.clean,
        }
    }

    pub fn cell_mut(&mut self, purity: Purity) -> &mut ResourceCell {
        match purity {
            Purity::Dirty => &mut self.dirty,
            Purity::Clean => &mut self.clean,
        }
    }
}

#[derive(Debug)]
pub struct FoodStore {
    pub fruit_vegetables: FoodSupply,
    pub dairy: FoodSupply,
    pub protein: FoodSupply,
    pub fat: FoodSupply,
    pub stock: Vec<FoodStockEntry>,
}

impl FoodStore {
    pub fn supply(&self, kind: FoodKind) -> &FoodSupply {
        match kind {
            FoodKind::FruitVegetables => &self.fruit_vegetables,
            FoodKind::Dairy => &self.dairy,
            FoodKind::Protein => &self.protein,
            FoodKind::Fat => &self.fat,
        }
    }

    pub fn supply_mut(&mut self, kind: FoodKind) -> &mut FoodSupply {
        match kind {
            FoodKind::FruitVegetables => &mut self.fruit_vegetables,
            FoodKind::Dairy => &mut self.dairy,
            FoodKind::Protein => &mut self.protein,
            FoodKind::Fat => &mut self.fat,
        }
    }
}

#[derive(Debug)]
pub struct ResourceBundle {
    pub energy: ResourceCell,
    pub electronics: ElectronicsStore,
    pub water: WaterStore,
    pub food: FoodStore,
}

/// The three research branches, each with a rate cell accumulating research
/// points through the growth step.
#[derive(Debug)]
pub struct ResearchState {
    pub engineering_rate: ResourceCell,
    pub survival_rate: ResourceCell,
    pub science_rate: ResourceCell,
    pub(crate) researched: Vec<String>,
}

impl ResearchState {
    pub fn rate(&self, branch: Branch) -> &ResourceCell {
        match branch {
            Branch::Engineering => &self.engineering_rate,
            Branch::Survival => &self.survival_rate,
            Branch::Science => &self.science_rate,
        }
    }

    pub fn rate_mut(&mut self, branch: Branch) -> &mut ResourceCell {
        match branch {
            Branch::Engineering => &mut self.engineering_rate,
            Branch::Survival => &mut self.survival_rate,
            Branch::Science => &mut self.science_rate,
        }
    }

    pub fn researched(&self) -> &[String] {
        &self.researched
    }

    pub fn is_researched(&self, tech_id: &str) -> bool {
        self.researched.iter().any(|id| id == tech_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseOfDeath {
    Starvation,
    Dehydration,
}

impl fmt::Display for CauseOfDeath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CauseOfDeath::Starvation => write!(f, "starvation"),
            CauseOfDeath::Dehydration => write!(f, "dehydration"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeathRecord {
    pub population: PopulationId,
    pub name: String,
    pub cause: CauseOfDeath,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiredStockRecord {
    pub expired_on: NaiveDate,
    pub quantities: BTreeMap<FoodKind, f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TurnMetrics {
    pub total_population: u64,
    pub deaths: usize,
    pub expired_entries: usize,
    pub clean_water: f64,
    pub food_total: f64,
}

/// Per-turn records written by the systems and cleared at the start of every
/// turn. Failed effect applications land here instead of aborting the turn.
#[derive(Debug, Default)]
pub struct BookkeepingState {
    pub deaths: Vec<DeathRecord>,
    pub expired_stock: Vec<ExpiredStockRecord>,
    pub hungry_populations: Vec<String>,
    pub thirsty_populations: Vec<String>,
    pub effect_failures: Vec<String>,
    pub metrics: Option<TurnMetrics>,
}

impl BookkeepingState {
    pub(crate) fn begin_turn(&mut self) {
        self.deaths.clear();
        self.expired_stock.clear();
        self.hungry_populations.clear();
        self.thirsty_populations.clear();
        self.effect_failures.clear();
        self.metrics = None;
    }
}

/// Root aggregate owning the population groups, the resource bundle, the
/// research state and the turn-hook lists. One instance per game session,
/// owned by the caller and passed into the engine by reference.
#[derive(Debug)]
pub struct World {
    turn: u64,
    start_date: NaiveDate,
    days_per_turn: u32,
    playing: bool,
    pub(crate) populations: BTreeMap<PopulationId, PopulationGroup>,
    pub(crate) resources: ResourceBundle,
    pub(crate) tech: ResearchState,
    pub(crate) on_turn_start: Vec<TurnHook>,
    pub(crate) on_turn_end: Vec<TurnHook>,
    pub(crate) bookkeeping: BookkeepingState,
}

impl World {
    pub fn new(
        start_date: NaiveDate,
        days_per_turn: u32,
        resources: ResourceBundle,
        tech: ResearchState,
    ) -> Self {
        Self {
            turn: 0,
            start_date,
            days_per_turn,
            playing: false,
            populations: BTreeMap::new(),
            resources,
            tech,
            on_turn_start: Vec::new(),
            on_turn_end: Vec::new(),
            bookkeeping: BookkeepingState::default(),
        }
    }

    pub fn add_population(&mut self, group: PopulationGroup) {
        self.populations.insert(group.id, group);
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn days_per_turn(&self) -> u32 {
        self.days_per_turn
    }

    /// Calendar date reached after `turn` completed turns.
    pub fn date_of_turn(&self, turn: u64) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(turn * self.days_per_turn as u64))
            .expect("simulation date overflow")
    }

    pub fn current_date(&self) -> NaiveDate {
        self.date_of_turn(self.turn)
    }

    pub fn advance_time(&mut self) {
        self.turn += 1;
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn start(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub(crate) fn begin_turn(&mut self) {
        self.bookkeeping.begin_turn();
    }

    pub fn bookkeeping(&self) -> &BookkeepingState {
        &self.bookkeeping
    }

    pub fn population_ids(&self) -> Vec<PopulationId> {
        self.populations.keys().copied().collect()
    }

    pub fn population(&self, id: PopulationId) -> Option<&PopulationGroup> {
        self.populations.get(&id)
    }

    pub fn population_mut(&mut self, id: PopulationId) -> Option<&mut PopulationGroup> {
        self.populations.get_mut(&id)
    }

    pub fn resources(&self) -> &ResourceBundle {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceBundle {
        &mut self.resources
    }

    pub fn tech(&self) -> &ResearchState {
        &self.tech
    }

    pub fn tech_mut(&mut self) -> &mut ResearchState {
        &mut self.tech
    }

    pub fn on_turn_start(&self) -> &[TurnHook] {
        &self.on_turn_start
    }

    pub fn on_turn_end(&self) -> &[TurnHook] {
        &self.on_turn_end
    }

    pub fn register_turn_start(&mut self, hook: TurnHook) {
        self.on_turn_start.push(hook);
    }

    pub fn register_turn_end(&mut self, hook: TurnHook) {
        self.on_turn_end.push(hook);
    }

    pub fn total_population(&self) -> u64 {
        self.populations
            .values()
            .map(|group| group.quantity.total().max(0.0) as u64)
            .sum()
    }

    pub fn cell(&self, target: ResourceRef) -> Result<&ResourceCell, GameError> {
        Ok(match target {
            ResourceRef::Energy => &self.resources.energy,
            ResourceRef::Electronics(grade) => self.resources.electronics.cell(grade),
            ResourceRef::Water(purity) => self.resources.water.cell(purity),
            ResourceRef::Food(kind) => &self.resources.food.supply(kind).value,
            ResourceRef::Happiness(id) => {
                &self
                    .populations
                    .get(&id)
                    .ok_or(GameError::UnknownPopulation(id))?
                    .happiness
            }
            ResourceRef::Quantity(id) => {
                &self
                    .populations
                    .get(&id)
                    .ok_or(GameError::UnknownPopulation(id))?
                    .quantity
            }
            ResourceRef::ResearchRate(branch) => self.tech.rate(branch),
        })
    }

    pub fn cell_mut(&mut self, target: ResourceRef) -> Result<&mut ResourceCell, GameError> {
        Ok(match target {
            ResourceRef::Energy => &mut self.resources.energy,
            ResourceRef::Electronics(grade) => self.resources.electronics.cell_mut(grade),
            ResourceRef::Water(purity) => self.resources.water.cell_mut(purity),
            ResourceRef::Food(kind) => &mut self.resources.food.supply_mut(kind).value,
            ResourceRef::Happiness(id) => {
                &mut self
                    .populations
                    .get_mut(&id)
                    .ok_or(GameError::UnknownPopulation(id))?
                    .happiness
            }
            ResourceRef::Quantity(id) => {
                &mut self
                    .populations
                    .get_mut(&id)
                    .ok_or(GameError::UnknownPopulation(id))?
                    .quantity
            }
            ResourceRef::ResearchRate(branch) => self.tech.rate_mut(branch),
        })
    }

    /// Applies one effect descriptor to the state graph.
    pub fn apply_effect(&mut self, effect: &Effect) -> Result<(), GameError> {
        match effect {
            Effect::IncrementGrowth { target, amount } => {
                self.cell_mut(*target)?.increment_per_turn(*amount);
            }
            Effect::IncrementTotal { target, amount } => {
                self.cell_mut(*target)?.increment_total(*amount);
            }
            Effect::IncrementHappinessAll { amount } => {
                for group in self.populations.values_mut() {
                    group.happiness.increment_total(*amount);
                }
            }
        }
        Ok(())
    }

    /// Researches a technology: checks the branch's accumulated research
    /// points against the cost, deducts exactly the cost, applies the tech's
    /// one-shot effects and registers its recurring hooks. Non-repeatable;
    /// there is no un-research and no rollback.
    pub fn research(&mut self, tech_id: &str) -> Result<&'static TechDefinition, GameError> {
        let def = technology::definition(tech_id)
            .ok_or_else(|| GameError::UnknownTechnology(tech_id.to_string()))?;
        if self.tech.is_researched(def.id) {
            return Err(GameError::AlreadyResearched(def.id.to_string()));
        }
        let available = self.tech.rate(def.branch).total();
        if available < def.cost {
            return Err(GameError::InsufficientResearch {
                branch: def.branch,
                needed: def.cost,
                available,
            });
        }

        self.tech.rate_mut(def.branch).increment_total(-def.cost);
        for effect in def.effects {
            self.apply_effect(effect)?;
        }
        if !def.turn_start.is_empty() {
            self.on_turn_start.push(TurnHook {
                name: def.name.to_string(),
                effects: def.turn_start.to_vec(),
            });
        }
        if !def.turn_end.is_empty() {
            self.on_turn_end.push(TurnHook {
                name: def.name.to_string(),
                effects: def.turn_end.to_vec(),
            });
        }
        self.tech.researched.push(def.id.to_string());
        Ok(def)
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let populations = self
            .populations
            .values()
            .map(|group| PopulationSnapshot {
                id: group.id,
                name: group.name.clone(),
                happiness: group.happiness.reading(),
                quantity: group.quantity.reading(),
                persons: group.persons.len(),
                active_thresholds: group
                    .effects
                    .iter()
                    .filter(|(_, effect)| effect.active)
                    .map(|(&threshold, _)| threshold)
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            scenario: scenario.to_string(),
            turn: self.turn,
            date: self.current_date(),
            playing: self.playing,
            total_population: self.total_population(),
            populations,
            resources: ResourceSnapshot {
                energy: self.resources.energy.reading(),
                electronics: ElectronicsSnapshot {
                    scrap: self.resources.electronics.scrap.reading(),
                    common: self.resources.electronics.common.reading(),
                    rare: self.resources.electronics.rare.reading(),
                    legendary: self.resources.electronics.legendary.reading(),
                },
                water: WaterSnapshot {
                    dirty: self.resources.water.dirty.reading(),
                    clean: self.resources.water.clean.reading(),
                },
                food: FoodSnapshot {
                    fruit_vegetables: self.resources.food.fruit_vegetables.value.reading(),
                    dairy: self.resources.food.dairy.value.reading(),
                    protein: self.resources.food.protein.value.reading(),
                    fat: self.resources.food.fat.value.reading(),
                    stock: self
                        .resources
                        .food
                        .stock
                        .iter()
                        .map(|entry| StockSnapshot {
                            quantities: entry.quantities.clone(),
                            expires_at: entry.expires_at,
                        })
                        .collect(),
                },
            },
            research: ResearchSnapshot {
                engineering_rate: self.tech.engineering_rate.reading(),
                survival_rate: self.tech.survival_rate.reading(),
                science_rate: self.tech.science_rate.reading(),
                researched: self.tech.researched.clone(),
            },
            deaths: self.bookkeeping.deaths.clone(),
            expired_stock: self.bookkeeping.expired_stock.clone(),
            hungry_populations: self.bookkeeping.hungry_populations.clone(),
            thirsty_populations: self.bookkeeping.thirsty_populations.clone(),
            effect_failures: self.bookkeeping.effect_failures.clone(),
            metrics: self.bookkeeping.metrics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationSnapshot {
    pub id: PopulationId,
    pub name: String,
    pub happiness: CellReading,
    pub quantity: CellReading,
    pub persons: usize,
    pub active_thresholds: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElectronicsSnapshot {
    pub scrap: CellReading,
    pub common: CellReading,
    pub rare: CellReading,
    pub legendary: CellReading,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaterSnapshot {
    pub dirty: CellReading,
    pub clean: CellReading,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockSnapshot {
    pub quantities: BTreeMap<FoodKind, f64>,
    pub expires_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodSnapshot {
    pub fruit_vegetables: CellReading,
    pub dairy: CellReading,
    pub protein: CellReading,
    pub fat: CellReading,
    pub stock: Vec<StockSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchSnapshot {
    pub engineering_rate: CellReading,
    pub survival_rate: CellReading,
    pub science_rate: CellReading,
    pub researched: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSnapshot {
    pub energy: CellReading,
    pub electronics: ElectronicsSnapshot,
    pub water: WaterSnapshot,
    pub food: FoodSnapshot,
}

/// Serializable read-model of the whole world, built once per turn for
/// observers and the CLI report stream.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub turn: u64,
    pub date: NaiveDate,
    pub playing: bool,
    pub total_population: u64,
    pub populations: Vec<PopulationSnapshot>,
    pub resources: ResourceSnapshot,
    pub research: ResearchSnapshot,
    pub deaths: Vec<DeathRecord>,
    pub expired_stock: Vec<ExpiredStockRecord>,
    pub hungry_populations: Vec<String>,
    pub thirsty_populations: Vec<String>,
    pub effect_failures: Vec<String>,
    pub metrics: Option<TurnMetrics>,
}
