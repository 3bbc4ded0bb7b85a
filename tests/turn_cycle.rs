use refuge::{
    effect::ResourceRef,
    engine::{Engine, EngineBuilder, EngineSettings},
    scenario::Scenario,
    systems::{
        BookkeepingSystem, GrowthSystem, NeedsSystem, PopulationSystem, SpoilageSystem,
        TurnEndSystem, TurnStartSystem,
    },
    world::{CauseOfDeath, Purity},
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
fn growth_is_applied_every_turn() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.resources_mut().energy.increment_per_turn(2.0);

    let mut engine = build_engine(&scenario.name);
    engine.run(&mut world, 3).unwrap();

    assert_eq!(world.resources().energy.total(), 6.0);
    // research points accrue through the same step
    assert_eq!(world.tech().engineering_rate.total(), 4.0);
}

#[test]
fn observer_hook_fires_once_per_turn() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    let mut turns = Vec::new();
    engine
        .run_with_hook(&mut world, 6, |snapshot| turns.push(snapshot.turn))
        .unwrap();

    assert_eq!(turns, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn upward_crossing_activates_exactly_once() {
    // quantity starts at 10 with a threshold at 20; +15 across turns must
    // trigger the activation bonus exactly once
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    for _ in 0..3 {
        world
            .population_mut(1)
            .unwrap()
            .quantity
            .increment_total(5.0);
        engine.advance_turn(&mut world).unwrap();
    }

    let group = world.population(1).unwrap();
    assert_eq!(group.quantity.total(), 25.0);
    assert_eq!(group.happiness.total(), 110.0);
    assert!(group.effects()[&20].is_active());
    assert!(!group.effects()[&40].is_active());
}

#[test]
fn oscillation_fires_one_pair_per_round_trip() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    for _ in 0..3 {
        world.population_mut(1).unwrap().quantity.set_total(25.0);
        engine.advance_turn(&mut world).unwrap();
        assert_eq!(world.population(1).unwrap().happiness.total(), 110.0);

        world.population_mut(1).unwrap().quantity.set_total(10.0);
        engine.advance_turn(&mut world).unwrap();
        assert_eq!(world.population(1).unwrap().happiness.total(), 100.0);
    }
}

#[test]
fn group_starting_above_a_threshold_activates_on_the_first_turn() {
    let mut scenario = Scenario::aftermath();
    scenario.populations[0].count = 25;
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    engine.advance_turn(&mut world).unwrap();

    let group = world.population(1).unwrap();
    assert!(group.effects()[&20].is_active());
    assert_eq!(group.happiness.total(), 110.0);
}

#[test]
fn expired_stock_is_removed_and_subtracted() {
    let mut scenario = Scenario::aftermath();
    // expire the supply drop one day in; silence consumption so the expiry
    // arithmetic is the only thing moving food totals
    scenario.resources.food.stock[0].expires_at = scenario
        .start_date
        .checked_add_days(chrono::Days::new(1))
        .unwrap();
    scenario.resources.food.fruit_vegetables.depletion_rate = 0.0;
    scenario.resources.food.dairy.depletion_rate = 0.0;
    scenario.resources.food.protein.depletion_rate = 0.0;
    scenario.resources.food.fat.depletion_rate = 0.0;

    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    assert!(world.resources().food.stock.is_empty());
    assert_eq!(world.resources().food.fat.value.total(), 0.0);
    // more was promised than remained; the deficit is visible, not clamped
    assert_eq!(world.resources().food.protein.value.total(), -10.0);
    assert_eq!(world.bookkeeping().expired_stock.len(), 1);
}

#[test]
fn stock_with_a_future_expiry_survives_the_turn() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    assert_eq!(world.resources().food.stock.len(), 1);
    assert!(world.bookkeeping().expired_stock.is_empty());
}

#[test]
fn person_dies_when_a_meter_reaches_zero() {
    // no clean water exists, so water meters drain every turn
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    for person in world.population_mut(1).unwrap().persons_mut() {
        person.clean_water_meter = 10.0;
    }

    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    let group = world.population(1).unwrap();
    assert!(group.persons().is_empty());
    assert_eq!(group.quantity.total(), 0.0);
    assert_eq!(world.bookkeeping().deaths.len(), 10);
    assert!(world
        .bookkeeping()
        .deaths
        .iter()
        .all(|death| death.cause == CauseOfDeath::Dehydration));
    assert_eq!(world.total_population(), 0);
}

#[test]
fn met_needs_refill_meters_instead_of_draining_them() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    // enough clean water for 10 people at 0.5 a head
    world
        .cell_mut(ResourceRef::Water(Purity::Clean))
        .unwrap()
        .set_total(50.0);
    for person in world.population_mut(1).unwrap().persons_mut() {
        person.clean_water_meter = 40.0;
    }

    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    let group = world.population(1).unwrap();
    assert_eq!(group.persons().len(), 10);
    assert!(group
        .persons()
        .iter()
        .all(|person| person.clean_water_meter == 65.0));
    assert_eq!(world.resources().water.clean.total(), 45.0);
}

#[test]
fn researched_hooks_run_at_the_start_of_every_turn() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.tech_mut().engineering_rate.set_total(20.0);
    world.research("scrap_generator").unwrap();

    let mut engine = build_engine(&scenario.name);
    engine.run(&mut world, 2).unwrap();

    assert_eq!(world.resources().energy.total(), 4.0);
    assert_eq!(world.resources().electronics.scrap.total(), 8.0);
}

#[test]
fn run_clears_the_playing_flag_and_single_stepping_still_works() {
    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    let mut engine = build_engine(&scenario.name);

    engine.run(&mut world, 2).unwrap();
    assert!(!world.playing());
    assert_eq!(world.turn(), 2);

    // a paused world can still be advanced one turn at a time
    let summary = engine.advance_turn(&mut world).unwrap();
    assert_eq!(summary.turn, 3);
    assert_eq!(world.turn(), 3);
}

#[test]
fn failed_effects_are_recorded_and_the_turn_continues() {
    use refuge::effect::{Effect, TurnHook};

    let scenario = Scenario::aftermath();
    let mut world = scenario.build_world().unwrap();
    world.register_turn_start(TurnHook {
        name: "ghost town bonus".into(),
        effects: vec![Effect::IncrementTotal {
            target: ResourceRef::Happiness(42),
            amount: 1.0,
        }],
    });
    world.resources_mut().energy.increment_per_turn(1.0);

    let mut engine = build_engine(&scenario.name);
    engine.advance_turn(&mut world).unwrap();

    assert_eq!(world.bookkeeping().effect_failures.len(), 1);
    // the rest of the turn still ran
    assert_eq!(world.resources().energy.total(), 1.0);
    assert_eq!(world.turn(), 1);
}
