//! Integration tests for the monthly step orchestrator.

use bevy_ecs::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use water_core::{
    AgentBundle, AgentId, AgentSubset, Attribute, Attributes, ConditionalUpdate, Config,
    RegimeHorizon, Role, ScoringRule, SimError, Subsystem, TimeCondition, WaterModel,
};
use water_events::{ClockField, Regime, SimClock};

/// Flag written by the nature side and read by the human side.
#[derive(Resource, Default)]
struct FloodFlag(bool);

/// Nature stub that raises the flag and logs its call.
struct FlagNature {
    log: Rc<RefCell<Vec<String>>>,
}

impl Subsystem for FlagNature {
    fn name(&self) -> &str {
        "nature"
    }

    fn step(&mut self, world: &mut World) -> Result<(), SimError> {
        world.resource_mut::<FloodFlag>().0 = true;
        self.log.borrow_mut().push("nature".to_string());
        Ok(())
    }
}

/// Human stub that records whether it saw the flag, then lowers it.
struct FlagHuman {
    log: Rc<RefCell<Vec<String>>>,
}

impl Subsystem for FlagHuman {
    fn name(&self) -> &str {
        "human"
    }

    fn step(&mut self, world: &mut World) -> Result<(), SimError> {
        let mut flag = world.resource_mut::<FloodFlag>();
        self.log.borrow_mut().push(format!("human saw flag={}", flag.0));
        flag.0 = false;
        Ok(())
    }
}

fn flagged_model(year: i32, month: u8) -> (WaterModel, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut model = WaterModel::new(
        SimClock::new(year, month).unwrap(),
        RegimeHorizon::default(),
        Box::new(FlagNature { log: Rc::clone(&log) }),
        Box::new(FlagHuman { log: Rc::clone(&log) }),
    );
    model.world_mut().insert_resource(FloodFlag::default());
    (model, log)
}

/// Test that nature's effects are visible to the human step of the same tick.
#[test]
fn test_nature_runs_before_human() {
    let (mut model, log) = flagged_model(1990, 1);

    let log_for_update = Rc::clone(&log);
    model.register(ConditionalUpdate::new(
        "record",
        TimeCondition::always(),
        move |_world| {
            log_for_update.borrow_mut().push("update".to_string());
            Ok(())
        },
    ));

    model.tick().unwrap();
    model.tick().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "nature",
            "human saw flag=true",
            "update",
            "nature",
            "human saw flag=true",
            "update",
        ]
    );
}

/// Test that scoring fires once per year across two years of ticks.
#[test]
fn test_scoring_fires_each_december() {
    let (mut model, _log) = flagged_model(1990, 1);
    model.world_mut().spawn(AgentBundle::new(
        0,
        Role::Farmer,
        Attributes::new().with(Attribute::S, 2.0).with(Attribute::E, 3.0),
    ));
    model.register(ScoringRule::default().into_update(TimeCondition::when(ClockField::Month, 12)));

    let mut fired_at = Vec::new();
    for _ in 0..24 {
        let report = model.tick().unwrap();
        if !report.fired.is_empty() {
            assert_eq!(report.fired, vec!["update_scores"]);
            fired_at.push(report.clock.date.to_string());
        }
    }
    assert_eq!(fired_at, vec!["1990-12", "1991-12"]);

    let farmers = AgentSubset::select(model.world_mut(), Role::Farmer).unwrap();
    let payoff = farmers.read(model.world(), Attribute::Payoff).unwrap();
    assert_eq!(payoff.values().copied().collect::<Vec<_>>(), vec![6.0]);
}

/// Test that a scoring failure surfaces from the step and names the agent.
#[test]
fn test_scoring_failure_propagates() {
    let (mut model, _log) = flagged_model(1990, 12);
    model.world_mut().spawn(AgentBundle::new(
        4,
        Role::Farmer,
        Attributes::new().with(Attribute::S, 2.0),
    ));
    model.register(ScoringRule::default().into_update(TimeCondition::when(ClockField::Month, 12)));

    let err = model.tick().unwrap_err();
    assert_eq!(err.to_string(), "agent #4 has no value for attribute 'e'");
    assert_eq!(model.clock().date.to_string(), "1990-12");
}

/// Test that a failed December can be repaired and retried at the same tick.
#[test]
fn test_scoring_retry_after_repair() {
    let (mut model, log) = flagged_model(1990, 12);
    model.world_mut().spawn(AgentBundle::new(
        4,
        Role::Farmer,
        Attributes::new().with(Attribute::S, 2.0),
    ));
    model.register(ScoringRule::default().into_update(TimeCondition::when(ClockField::Month, 12)));

    assert!(matches!(
        model.tick(),
        Err(SimError::AttributeMissing {
            attribute: Attribute::E,
            ..
        })
    ));

    let world = model.world_mut();
    let mut query = world.query::<(&AgentId, &mut Attributes)>();
    for (id, mut attrs) in query.iter_mut(world) {
        if *id == AgentId(4) {
            attrs.set(Attribute::E, 0.5);
        }
    }

    let report = model.tick().unwrap();
    assert_eq!(report.clock.date.to_string(), "1990-12");
    assert_eq!(report.fired, vec!["update_scores"]);
    assert_eq!(model.clock().date.to_string(), "1991-01");

    let farmers = AgentSubset::select(model.world_mut(), Role::Farmer).unwrap();
    let payoff = farmers.read(model.world(), Attribute::Payoff).unwrap();
    assert_eq!(payoff[&AgentId(4)], 1.0);
    // Both subsystems ran on each attempt
    assert_eq!(log.borrow().len(), 4);
}

/// Test that running past the study period halts on the first out-of-range year.
#[test]
fn test_run_halts_at_horizon() {
    let (mut model, log) = flagged_model(2008, 11);

    let result = model.run(5);
    assert!(matches!(
        result,
        Err(SimError::OutOfHorizon {
            year: 2009,
            last_year: 2008
        })
    ));
    assert_eq!(model.clock().date.to_string(), "2009-01");
    assert_eq!(model.clock().tick, 2);
    // Subsystems ran for November and December only
    assert_eq!(log.borrow().len(), 4);
}

/// Test that the default model runs its whole study period.
#[test]
fn test_default_model_full_period() {
    let mut config = Config::default();
    config.agents.farmers = 10;
    config.agents.provinces = 2;

    let mut model = WaterModel::from_config(&config).unwrap();
    let ticks = model.remaining_ticks();
    assert_eq!(ticks, 30 * 12);
    assert_eq!(model.run(ticks).unwrap(), ticks);
    assert_eq!(model.remaining_ticks(), 0);
    assert!(model.institution().is_err());

    let snapshot = model.snapshot();
    let farmers: Vec<_> = snapshot.agents_with_role("farmer").collect();
    assert_eq!(farmers.len(), 10);
    for farmer in &farmers {
        let s = farmer.attributes["s"];
        let e = farmer.attributes["e"];
        assert!((0.0..=1.0).contains(&s));
        assert!((farmer.attributes["payoff"] - s * e).abs() < 1e-12);
    }
    for province in snapshot.agents_with_role("province") {
        assert!(!province.attributes.contains_key("payoff"));
        assert!(!province.attributes.contains_key("s"));
    }
}

/// Test that the regime seen by each step follows the year bands.
#[test]
fn test_regimes_across_study_period() {
    let (mut model, _log) = flagged_model(1987, 12);
    assert_eq!(model.tick().unwrap().regime, Regime::Unregulated);
    assert_eq!(model.tick().unwrap().regime, Regime::Was87);

    let (mut model, _log) = flagged_model(1998, 12);
    assert_eq!(model.tick().unwrap().regime, Regime::Was87);
    assert_eq!(model.tick().unwrap().regime, Regime::Ubr98);
}
