use refuge::{
    engine::{Engine, EngineBuilder, EngineSettings},
    error::GameError,
    scenario::Scenario,
    systems::{
        BookkeepingSystem, GrowthSystem, NeedsSystem, PopulationSystem, SpoilageSystem,
        TurnEndSystem, TurnStartSystem,
    },
    world::Branch,
};

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

#[test]
fn research_points_accrue_until_a_tech_is_affordable() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    // rate starts at 1 with growth 1; water filtration costs 8
    let err = world.research("water_filtration").unwrap_err();
    assert!(matches!(err, GameError::InsufficientResearch { .. }));

    engine.run(&mut world, 7).unwrap();
    assert_eq!(world.tech().engineering_rate.total(), 8.0);

    world.research("water_filtration").unwrap();
    assert_eq!(world.tech().engineering_rate.total(), 0.0);
    assert!(world.tech().is_researched("water_filtration"));
    assert_eq!(world.resources().water.clean.growth(), 1.0);
    assert_eq!(world.resources().water.dirty.growth(), -1.0);
}

#[test]
fn filtration_moves_water_from_dirty_to_clean() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.tech_mut().engineering_rate.set_total(8.0);
    world.research("water_filtration").unwrap();

    let dirty_before = world.resources().water.dirty.total();
    let mut engine = build_engine(&scenario.name);
    engine.run(&mut world, 4).unwrap();

    assert_eq!(world.resources().water.dirty.total(), dirty_before - 4.0);
}

#[test]
fn morale_threshold_boosts_the_science_rate() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.population_mut(1).unwrap().quantity.set_total(45.0);

    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    // both the 20 and the 40 threshold activated this turn
    let group = world.population(1).unwrap();
    assert!(group.effects()[&20].is_active());
    assert!(group.effects()[&40].is_active());
    assert_eq!(world.tech().science_rate.growth(), 1.4);
}

#[test]
fn turn_end_hooks_pay_out_after_the_growth_step() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.tech_mut().science_rate.set_total(26.0);
    world.research("archive_recovery").unwrap();
    assert_eq!(world.on_turn_end().len(), 1);

    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    // 0 after the deduction, +1 growth, +0.5 from the hook
    assert_eq!(world.tech().science_rate.total(), 1.5);
}

#[test]
fn each_branch_spends_its_own_points() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.tech_mut().survival_rate.set_total(2.0);
    world.research("campfire").unwrap();

    assert_eq!(world.tech().rate(Branch::Survival).total(), 0.0);
    // the other branches are untouched
    assert_eq!(world.tech().rate(Branch::Engineering).total(), 1.0);
    assert_eq!(world.tech().rate(Branch::Science).total(), 1.0);
}
