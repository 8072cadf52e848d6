//! Test rig: one simulated vessel plus the helpers to run a session on it.
//!
//! Every session runs in virtual time on a [`ManualClock`], so a run of
//! twenty minutes costs microseconds and command timestamps are exact.

use core::time::Duration;
use std::rc::Rc;

use fermenter::adapters::sim::{ManualClock, SimVessel, Trace, run_until_complete, stop_at};
use fermenter::app::activity::StepActivity;
use fermenter::app::supervisor::{SessionOutcome, VesselSupervisor};
use fermenter::config::{ControlConfig, LogicKind};
use fermenter::session::{RunFlag, Session};
use fermenter::vessel::{ActuatorId, SensorId, Vessel, VesselId};

pub fn vessel_id(s: &str) -> VesselId {
    VesselId::new(s).unwrap()
}

pub fn sensor(s: &str) -> SensorId {
    SensorId::new(s).unwrap()
}

pub fn actuator(s: &str) -> ActuatorId {
    ActuatorId::new(s).unwrap()
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

pub const TIMER: StepActivity = StepActivity::TimerRunning(Duration::from_secs(3600));

pub struct Rig {
    pub clock: Rc<ManualClock>,
    pub hw: SimVessel,
    pub vessel: Vessel,
    pub config: ControlConfig,
}

#[allow(dead_code)]
impl Rig {
    /// Vessel `f1` with temperature sensor `temp` reading `temp`.
    pub fn new(temp: Trace<Option<f32>>) -> Self {
        let clock = Rc::new(ManualClock::new());
        let hw = SimVessel::new(clock.clone()).with_sensor(sensor("temp"), temp);
        Self {
            clock,
            hw,
            vessel: Vessel::new(vessel_id("f1"), sensor("temp")),
            config: ControlConfig::default(),
        }
    }

    pub fn with_heater(mut self) -> Self {
        self.vessel.heater = Some(actuator("heater"));
        self.hw = self.hw.with_actuator(actuator("heater"));
        self
    }

    pub fn with_cooler(mut self) -> Self {
        self.vessel.cooler = Some(actuator("cooler"));
        self.hw = self.hw.with_actuator(actuator("cooler"));
        self
    }

    pub fn with_pump(mut self) -> Self {
        self.vessel.agitator = Some(actuator("pump"));
        self.hw = self.hw.with_actuator(actuator("pump"));
        self
    }

    /// Valve `valve` and pressure sensor `pressure` reading `pressure`.
    pub fn with_spunding(mut self, pressure: Trace<Option<f32>>) -> Self {
        self.vessel.valve = Some(actuator("valve"));
        self.vessel.pressure_sensor = Some(sensor("pressure"));
        self.hw = self
            .hw
            .with_actuator(actuator("valve"))
            .with_sensor(sensor("pressure"), pressure);
        self
    }

    pub fn scripted(mut self, f: impl FnOnce(SimVessel) -> SimVessel) -> Self {
        self.hw = f(self.hw);
        self
    }

    pub fn configured(mut self, f: impl FnOnce(&mut ControlConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Run a session of `kind`, asking it to stop at `stop_secs`.
    pub fn run(&self, kind: LogicKind, stop_secs: u64) -> SessionOutcome {
        let running = RunFlag::new();
        self.run_with(kind, &running, stop_at(&self.clock, secs(stop_secs), &running))
    }

    /// Run a session of `kind` alongside `driver`, which may poke the
    /// simulation or clear `running`.
    pub fn run_with(&self, kind: LogicKind, running: &RunFlag, driver: impl Future<Output = ()>) -> SessionOutcome {
        let session = Session {
            vessel: &self.vessel,
            config: &self.config,
            hw: &self.hw,
            clock: &*self.clock,
            running,
        };
        let supervisor = VesselSupervisor::new(session, kind);
        let (outcome, ()) = run_until_complete(&self.clock, futures_lite::future::zip(supervisor.run(), driver))
            .expect("session stalled");
        outcome
    }

    pub fn now(&self) -> Duration {
        fermenter::app::ports::Clock::now(&*self.clock)
    }
}
