//! Hosting sessions on a local executor, started by the autostart scan.

use std::rc::Rc;

use edge_executor::LocalExecutor;
use fermenter::adapters::executor::{LocalSessions, VesselEntry};
use fermenter::adapters::sim::{ManualClock, SimVessel, Trace, run_until_complete};
use fermenter::app::autostart::autostart;
use fermenter::app::supervisor::SessionOutcome;
use fermenter::config::{AutoStart, LogicKind, LogicSettings};
use fermenter::vessel::Vessel;
use serde_json::{Value, json};

use crate::rig::{TIMER, actuator, secs, sensor, vessel_id};

fn props(v: Value) -> serde_json::Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => unreachable!(),
    }
}

/// Vessel `name` reading `name-temp` and heating with `name-heater`.
fn heated(name: &str) -> Vessel {
    let mut v = Vessel::new(vessel_id(name), sensor(&format!("{name}-temp")));
    v.heater = Some(actuator(&format!("{name}-heater")));
    v
}

fn sim(clock: &Rc<ManualClock>, names: &[&str]) -> SimVessel {
    names.iter().fold(SimVessel::new(clock.clone()), |hw, name| {
        hw.with_sensor(sensor(&format!("{name}-temp")), Trace::constant(Some(15.0)))
            .with_actuator(actuator(&format!("{name}-heater")))
    })
}

#[test]
fn autostart_runs_marked_vessels_until_stopped() {
    let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
    let clock = Rc::new(ManualClock::new());
    let hw = Rc::new(sim(&clock, &["f1", "f2", "f3"]));
    let mut sessions = LocalSessions::new(&executor, hw.clone(), clock.clone());

    let yes = LogicSettings::from_props(&props(json!({ "AutoStart": "Yes" }))).unwrap();
    let no = LogicSettings::from_props(&props(json!({ "AutoStart": "No" }))).unwrap();
    sessions.register(VesselEntry::new(heated("f1"), LogicKind::Hysteresis, yes.clone()));
    sessions.register(VesselEntry::new(heated("f2"), LogicKind::Hysteresis, no));
    sessions.register(VesselEntry::new(heated("f3"), LogicKind::SpundingHysteresis, yes));

    let entries = sessions.autostart_entries();
    assert_eq!(entries.iter().map(|e| e.vessel.as_str()).collect::<Vec<_>>(), ["f1", "f2", "f3"]);
    assert_eq!(entries[1].autostart, AutoStart::No);

    let report = autostart(&entries, &mut sessions);
    assert_eq!(report.started, [vessel_id("f1"), vessel_id("f3")]);

    // a second scan finds them running
    let again = autostart(&sessions.autostart_entries(), &mut sessions);
    assert!(again.started.is_empty());
    assert_eq!(again.already_running, [vessel_id("f1"), vessel_id("f3")]);

    run_until_complete(&clock, executor.run(clock.sleep_until(secs(10)))).unwrap();
    assert!(hw.is_on(&actuator("f1-heater")));
    assert!(!hw.is_on(&actuator("f2-heater")));
    assert!(hw.is_on(&actuator("f3-heater")));

    assert!(sessions.stop(&vessel_id("f1")));
    assert!(sessions.stop(&vessel_id("f3")));
    assert!(!sessions.stop(&vessel_id("f2")));

    run_until_complete(&clock, executor.run(clock.sleep_until(secs(20)))).unwrap();
    assert!(!hw.is_on(&actuator("f1-heater")));
    assert!(!hw.is_on(&actuator("f3-heater")));
}

#[test]
fn failed_session_can_be_restarted() {
    let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
    let clock = Rc::new(ManualClock::new());
    let hw = Rc::new(SimVessel::new(clock.clone()).with_actuator(actuator("f1-heater")));
    let mut sessions = LocalSessions::new(&executor, hw, clock.clone());
    sessions.register(VesselEntry::new(heated("f1"), LogicKind::Hysteresis, LogicSettings::default()));

    // no temperature sensor registered: the first read fails
    let task = sessions.spawn(&vessel_id("f1")).unwrap();
    let outcome = run_until_complete(&clock, executor.run(task)).unwrap();
    assert!(matches!(outcome, SessionOutcome::Failed(_)));
    assert!(!sessions.is_running(&vessel_id("f1")));

    let _restarted = sessions.spawn(&vessel_id("f1")).unwrap();
    assert!(sessions.is_running(&vessel_id("f1")));
}

#[test]
fn restart_waits_for_the_old_shutdown_to_finish() {
    let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
    let clock = Rc::new(ManualClock::new());
    let pump = actuator("pump");
    let hw = Rc::new(
        SimVessel::new(clock.clone())
            .with_sensor(sensor("temp"), Trace::constant(Some(20.0)))
            .with_actuator(pump.clone())
            .with_activity(Trace::constant(TIMER)),
    );
    let mut sessions = LocalSessions::new(&executor, hw.clone(), clock.clone());
    let mut vessel = Vessel::new(vessel_id("f1"), sensor("temp"));
    vessel.agitator = Some(pump.clone());
    sessions.register(VesselEntry::new(vessel, LogicKind::Hysteresis, LogicSettings::default()));
    let id = vessel_id("f1");

    sessions.spawn(&id).unwrap().detach();
    // the pump rests from 600 to 660
    run_until_complete(&clock, executor.run(clock.sleep_until(secs(605)))).unwrap();
    assert!(!hw.is_on(&pump));
    assert!(sessions.stop(&id));

    // still inside the rest hold: the vessel is not free yet
    assert!(sessions.is_running(&id));
    let err = sessions.spawn(&id).unwrap_err();
    assert!(err.to_string().contains("still shutting down"), "{err:#}");
    let report = autostart(
        &[fermenter::app::autostart::AutostartEntry {
            vessel: id.clone(),
            autostart: AutoStart::Yes,
        }],
        &mut sessions,
    );
    assert_eq!(report.already_running, [id.clone()]);

    run_until_complete(&clock, executor.run(clock.sleep_until(secs(661)))).unwrap();
    assert!(!sessions.is_running(&id));

    sessions.spawn(&id).unwrap().detach();
    run_until_complete(&clock, executor.run(clock.sleep_until(secs(900)))).unwrap();
    assert!(hw.is_on(&pump));
    assert_eq!(hw.edges(&pump), [(0, true), (600, false), (661, true)]);
}
