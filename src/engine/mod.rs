use anyhow::Result;
use chrono::NaiveDate;

use crate::world::{World, WorldSnapshot};

pub struct EngineSettings {
    pub scenario_name: String,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            settings: self.settings,
        }
    }
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    /// Runs one full turn: every registered system in order, then the clock.
    /// Each call moves state forward; nothing about it is idempotent.
    pub fn advance_turn(&mut self, world: &mut World) -> Result<TurnSummary> {
        let turn = world.turn() + 1;
        let date = world.date_of_turn(turn);
        world.begin_turn();
        let ctx = SystemContext {
            turn,
            date,
            scenario_name: &self.settings.scenario_name,
        };
        for system in &mut self.systems {
            system.run(&ctx, world)?;
        }
        world.advance_time();

        Ok(TurnSummary {
            turn,
            date,
            total_population: world.total_population(),
            deaths: world.bookkeeping().deaths.len(),
            expired_entries: world.bookkeeping().expired_stock.len(),
        })
    }

    /// Runs up to `turns` turns, stopping early if something clears the
    /// world's playing flag.
    pub fn run(&mut self, world: &mut World, turns: u64) -> Result<()> {
        self.run_with_hook(world, turns, |_| {})
    }

    /// Like `run`, but hands a snapshot to the observer after every turn.
    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        turns: u64,
        mut hook: impl FnMut(WorldSnapshot),
    ) -> Result<()> {
        world.start();
        for _ in 0..turns {
            if !world.playing() {
                break;
            }
            self.advance_turn(world)?;
            hook(world.snapshot(&self.settings.scenario_name));
        }
        world.stop();
        Ok(())
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }
}

pub struct SystemContext<'a> {
    pub turn: u64,
    pub date: NaiveDate,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct TurnSummary {
    pub turn: u64,
    pub date: NaiveDate,
    pub total_population: u64,
    pub deaths: usize,
    pub expired_entries: usize,
}
