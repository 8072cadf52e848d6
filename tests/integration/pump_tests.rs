//! Pump duty cycle and overtemperature hold.

use fermenter::adapters::sim::{Trace, stop_at};
use fermenter::app::activity::StepActivity;
use fermenter::app::ports::Clock;
use fermenter::config::LogicKind;
use fermenter::session::RunFlag;

use crate::rig::{Rig, TIMER, actuator, secs};

fn pump_rig(temp: Trace<Option<f32>>, activity: StepActivity) -> Rig {
    Rig::new(temp)
        .with_pump()
        .scripted(|hw| hw.with_activity(Trace::constant(activity)))
}

#[test]
fn rests_for_rest_time_after_each_work_interval_while_timer_runs() {
    let rig = pump_rig(Trace::constant(Some(20.0)), TIMER);

    rig.run(LogicKind::Hysteresis, 1400);

    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges[..5], [(0, true), (600, false), (660, true), (1260, false), (1320, true)]);
    // stopped inside the third work interval
    let (at, on) = edges[5];
    assert!(!on && (1400..=1401).contains(&at), "{edges:?}");
    assert_eq!(edges.len(), 6);
}

#[test]
fn keeps_circulating_while_ramping() {
    let rig = pump_rig(Trace::constant(Some(20.0)), StepActivity::Ramping);

    rig.run(LogicKind::Hysteresis, 1300);

    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges[0], (0, true));
    assert_eq!(edges.len(), 2, "{edges:?}");
    assert!(!edges[1].1 && edges[1].0 >= 1300);
}

#[test]
fn rest_only_starts_once_the_timer_is_running() {
    let rig = Rig::new(Trace::constant(Some(20.0))).with_pump().scripted(|hw| {
        hw.with_activity(Trace::constant(StepActivity::Ramping).then(700, TIMER))
    });

    rig.run(LogicKind::Hysteresis, 1300);

    // first interval ends at 600 during the ramp; the next one at 1200 rests
    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges[..3], [(0, true), (1200, false), (1260, true)]);
}

#[test]
fn overtemperature_overrides_the_duty_cycle() {
    let rig = pump_rig(
        Trace::constant(Some(20.0)).then(100, Some(90.0)).then(200, Some(20.0)),
        TIMER,
    );

    rig.run(LogicKind::Hysteresis, 500);

    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges[..3], [(0, true), (100, false), (200, true)]);
    assert_eq!(edges.len(), 4, "{edges:?}");
}

#[test]
fn pump_switched_on_by_hand_is_forced_off_while_too_hot() {
    let rig = pump_rig(Trace::constant(Some(95.0)), StepActivity::Idle);
    let running = RunFlag::new();
    let pump = actuator("pump");

    rig.run_with(LogicKind::Hysteresis, &running, async {
        rig.clock.sleep(secs(50)).await;
        rig.hw.set_manually(&pump, true);
        stop_at(&rig.clock, secs(100), &running).await;
    });

    let switches = rig.hw.switches(&pump);
    assert!(switches.iter().all(|&(_, on)| !on), "{switches:?}");
    let (first, _) = switches[0];
    assert!((50..=51).contains(&first), "{switches:?}");
    assert!(!rig.hw.is_on(&pump));
}

#[test]
fn zero_rest_time_disables_duty_cycling() {
    let rig = pump_rig(Trace::constant(Some(20.0)), TIMER).configured(|c| c.pump_rest_secs = 0);

    rig.run(LogicKind::Hysteresis, 2000);

    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges.len(), 2, "{edges:?}");
    assert_eq!(edges[0], (0, true));
}

#[test]
fn short_work_interval_cycles_quickly() {
    let rig = pump_rig(Trace::constant(Some(20.0)), TIMER).configured(|c| {
        c.pump_work_secs = 10;
        c.pump_rest_secs = 5;
    });

    rig.run(LogicKind::Hysteresis, 40);

    let edges = rig.hw.edges(&actuator("pump"));
    assert_eq!(edges[..5], [(0, true), (10, false), (15, true), (25, false), (30, true)]);
}
