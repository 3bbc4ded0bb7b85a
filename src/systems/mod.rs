mod bookkeeping;
mod growth;
mod hooks;
mod needs;
mod population;
mod spoilage;

pub use bookkeeping::BookkeepingSystem;
pub use growth::GrowthSystem;
pub use hooks::{TurnEndSystem, TurnStartSystem};
pub use needs::NeedsSystem;
pub use population::PopulationSystem;
pub use spoilage::SpoilageSystem;
