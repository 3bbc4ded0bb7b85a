use refuge::{
    effect::ResourceRef,
    engine::{Engine, EngineBuilder, EngineSettings},
    scenario::Scenario,
    systems::{
        BookkeepingSystem, GrowthSystem, NeedsSystem, PopulationSystem, SpoilageSystem,
        TurnEndSystem, TurnStartSystem,
    },
    world::{Branch, Purity},
};
use tokio_stream::StreamExt;

fn build_engine(scenario_name: &str) -> Engine {
    let settings = EngineSettings {
        scenario_name: scenario_name.into(),
    };
    EngineBuilder::new(settings)
        .with_system(TurnStartSystem::new())
        .with_system(GrowthSystem::new())
        .with_system(PopulationSystem::new())
        .with_system(SpoilageSystem::new())
        .with_system(TurnEndSystem::new())
        .with_system(NeedsSystem::new())
        .with_system(BookkeepingSystem::new())
        .build()
}

#[tokio::test]
async fn subscribers_observe_engine_driven_mutations() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.resources_mut().energy.increment_per_turn(2.0);

    let mut rx = world.cell(ResourceRef::Energy).unwrap().subscribe();
    rx.borrow_and_update();

    let mut engine = build_engine(&scenario.name);
    engine.run(&mut world, 3).unwrap();

    assert!(rx.has_changed().unwrap());
    let reading = *rx.borrow_and_update();
    assert_eq!(reading.total, 6.0);
    assert_eq!(reading.growth, 2.0);
}

#[tokio::test]
async fn stream_yields_the_latest_reading() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();

    let mut stream = world
        .cell(ResourceRef::Water(Purity::Dirty))
        .unwrap()
        .stream();
    let initial = stream.next().await.expect("feed alive");
    assert_eq!(initial.total, 70.0);

    world
        .cell_mut(ResourceRef::Water(Purity::Dirty))
        .unwrap()
        .increment_total(-5.0);
    let updated = stream.next().await.expect("feed alive");
    assert_eq!(updated.total, 65.0);
}

#[tokio::test]
async fn research_publishes_the_deduction_to_rate_subscribers() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.tech_mut().survival_rate.set_total(5.0);

    let mut rx = world
        .cell(ResourceRef::ResearchRate(Branch::Survival))
        .unwrap()
        .subscribe();
    rx.borrow_and_update();

    world.research("campfire").unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().total, 3.0);
}
