pub mod cell;
pub mod effect;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod systems;
pub mod technology;
pub mod world;

pub use cell::{CellReading, ResourceCell};
pub use engine::{Engine, EngineBuilder, EngineSettings, TurnSummary};
pub use error::GameError;
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{World, WorldSnapshot};
