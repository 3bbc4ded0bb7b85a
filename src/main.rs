use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use refuge::{
    engine::{EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
    systems::{
        BookkeepingSystem, GrowthSystem, NeedsSystem, PopulationSystem, SpoilageSystem,
        TurnEndSystem, TurnStartSystem,
    },
};

#[derive(Debug, Parser)]
#[command(author, version, about = "refuge colony simulation runner")]
struct Cli {
    /// Path to a scenario YAML file (built-in 'aftermath' scenario when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override turn count (uses the scenario default when omitted)
    #[arg(long)]
    turns: Option<u64>,

    /// Emit one JSON snapshot per turn instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::aftermath(),
    };
    let mut world = scenario.build_world()?;
    let turns = scenario.turns(cli.turns);

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
    };
    let mut engine = EngineBuilder::new(settings)
        .with_system(TurnStartSystem::new())
        .with_system(GrowthSystem::new())
        .with_system(PopulationSystem::new())
        .with_system(SpoilageSystem::new())
        .with_system(TurnEndSystem::new())
        .with_system(NeedsSystem::new())
        .with_system(BookkeepingSystem::new())
        .build();

    if cli.json {
        engine.run_with_hook(&mut world, turns, |snapshot| {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("snapshot serialization failed: {err}"),
            }
        })?;
    } else {
        engine.run_with_hook(&mut world, turns, |snapshot| {
            for warning in &snapshot.effect_failures {
                eprintln!("[warn] turn {}: {warning}", snapshot.turn);
            }
            for record in &snapshot.expired_stock {
                println!(
                    "turn {:>3}: food stock from {} spoiled",
                    snapshot.turn, record.expired_on
                );
            }
            for death in &snapshot.deaths {
                println!(
                    "turn {:>3}: {} (group {}) died of {}",
                    snapshot.turn, death.name, death.population, death.cause
                );
            }
        })?;
        println!(
            "Scenario '{}' completed after {} turns. Final population: {}",
            scenario.name,
            world.turn(),
            world.total_population()
        );
    }
    Ok(())
}
