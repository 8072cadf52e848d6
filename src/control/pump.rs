//! Agitation pump duty cycle with overtemperature hold.
//!
//! ```text
//!            ┌───────────── work interval elapsed, timer running ──────┐
//!            │                                                         ▼
//!   ┌────────┴──────┐   work interval elapsed, no timer   ┌─────────────────┐
//!   │  RunningPump  │◀──────────── (keep running) ─────── │   RestingPump   │
//!   │   pump on     │◀──────────── rest elapsed ───────── │   pump off      │
//!   └───────┬───────┘                                     └─────────────────┘
//!           │ value >= max_pump_temp (checked every second)
//!           ▼
//!   ┌───────────────┐
//!   │ OvertempHold  │── value < max_pump_temp ──▶ RunningPump
//!   │   pump off    │
//!   └───────────────┘
//! ```
//!
//! The overtemperature check runs before anything else on every pass, and
//! once per second inside the work interval.  A rest only starts when the
//! work interval ran its full length and the active step's countdown timer
//! is running; during a ramp the pump keeps circulating.  The rest itself
//! is a committed hold and runs to completion.
//!
//! With a zero work interval or zero rest duration duty cycling is off and
//! the pump runs continuously, subject only to the overtemperature hold.

use core::cell::Cell;

use log::info;

use crate::app::ports::{Clock, VesselPorts};
use crate::error::Result;
use crate::session::Session;
use crate::vessel::ActuatorId;

use super::{TICK, Tag, force_off, read_sensor, state_or_off, switch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpPhase {
    RunningPump,
    RestingPump,
    OvertempHold,
}

/// Why the work interval ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkEnd {
    Elapsed,
    Overtemp,
    Stopped,
}

/// Pump loop for one vessel.
pub struct PumpController<'a, H, C> {
    session: Session<'a, H, C>,
    tag: Tag<'a>,
    phase: Cell<PumpPhase>,
}

impl<'a, H: VesselPorts, C: Clock> PumpController<'a, H, C> {
    pub fn new(session: Session<'a, H, C>) -> Self {
        let tag = Tag::new("PUMP", &session);
        Self {
            session,
            tag,
            phase: Cell::new(PumpPhase::RunningPump),
        }
    }

    pub fn phase(&self) -> PumpPhase {
        self.phase.get()
    }

    /// Run until the session stops or the sensor fails, then switch the
    /// pump off.  A vessel without an agitator returns immediately.
    pub async fn run(&self) -> Result<()> {
        let Some(pump) = self.session.vessel.agitator.as_ref() else {
            info!("{}: no agitator configured, pump control idle", self.tag);
            return Ok(());
        };

        let cfg = self.session.config;
        if cfg.pump_duty_cycle_enabled() {
            info!(
                "{}: duty cycle {}s work / {}s rest, max {:.1}",
                self.tag, cfg.pump_work_secs, cfg.pump_rest_secs, cfg.max_pump_temp
            );
        } else {
            info!("{}: duty cycle disabled, continuous below {:.1}", self.tag, cfg.max_pump_temp);
        }

        let result = self.control_loop(pump).await;
        force_off(self.session.hw, Some(pump), self.tag).await;
        result
    }

    async fn control_loop(&self, pump: &ActuatorId) -> Result<()> {
        let Session {
            vessel,
            config,
            hw,
            clock,
            running,
        } = self.session;
        let duty_cycle = config.pump_duty_cycle_enabled();

        while running.is_running() {
            let pump_on = state_or_off(hw, Some(pump), self.tag).await;
            let temp = read_sensor(hw, &vessel.sensor).await?;

            if temp >= config.max_pump_temp {
                self.enter(PumpPhase::OvertempHold);
                if pump_on {
                    info!("{}: {temp:.1} >= {:.1}, pump held off", self.tag, config.max_pump_temp);
                    switch(hw, pump, false, self.tag).await;
                }
                clock.sleep(TICK).await;
                continue;
            }

            self.enter(PumpPhase::RunningPump);
            if !pump_on {
                switch(hw, pump, true, self.tag).await;
            }

            if !duty_cycle {
                clock.sleep(TICK).await;
                continue;
            }

            if self.work_interval().await? != WorkEnd::Elapsed {
                continue;
            }

            if hw.step_activity(&vessel.id).await.is_timer_running() {
                self.enter(PumpPhase::RestingPump);
                switch(hw, pump, false, self.tag).await;
                clock.sleep(config.pump_rest_duration()).await;
            }
        }
        Ok(())
    }

    /// Keep the pump running for the work interval, polling once a second
    /// for overtemperature and a stop request.
    async fn work_interval(&self) -> Result<WorkEnd> {
        let Session {
            vessel,
            config,
            hw,
            clock,
            running,
        } = self.session;
        let deadline = clock.now() + config.pump_work_interval();

        while clock.now() < deadline {
            clock.sleep(TICK).await;
            if !running.is_running() {
                return Ok(WorkEnd::Stopped);
            }
            if read_sensor(hw, &vessel.sensor).await? >= config.max_pump_temp {
                return Ok(WorkEnd::Overtemp);
            }
        }
        Ok(WorkEnd::Elapsed)
    }

    fn enter(&self, next: PumpPhase) {
        let prev = self.phase.replace(next);
        if prev != next {
            info!("{}: {prev:?} -> {next:?}", self.tag);
        }
    }
}
