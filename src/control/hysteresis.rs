//! Heater / cooler hysteresis control.
//!
//! Each actuator has its own pair of thresholds relative to the live
//! target `t`:
//!
//! ```text
//!   heater on   when  v + heater_offset_on  <= t
//!   heater off  when  v + heater_offset_off >= t
//!   cooler on   when  v >= t + cooler_offset_on
//!   cooler off  when  v <= t + cooler_offset_off
//! ```
//!
//! Between the two thresholds the actuator keeps its current state, which
//! is what stops it short-cycling around the target.

use log::info;

use crate::app::ports::{Clock, VesselPorts};
use crate::config::ControlConfig;
use crate::error::{Error, Result};
use crate::session::Session;

use super::{TICK, Tag, force_off, read_sensor, state_or_off, switch};

/// Commands decided for one tick.  `None` leaves the actuator alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Switching {
    pub heater: Option<bool>,
    pub cooler: Option<bool>,
}

/// Apply the four threshold rules to one snapshot.
///
/// The rules are evaluated independently, but each pair is gated on the
/// actuator's current state, so at most one command per actuator comes out.
pub fn evaluate(cfg: &ControlConfig, value: f32, target: f32, heater_on: bool, cooler_on: bool) -> Switching {
    let mut out = Switching::default();

    if !heater_on && value + cfg.heater_offset_on <= target {
        out.heater = Some(true);
    }
    if heater_on && value + cfg.heater_offset_off >= target {
        out.heater = Some(false);
    }

    if !cooler_on && value >= cfg.cooler_offset_on + target {
        out.cooler = Some(true);
    }
    if cooler_on && value <= cfg.cooler_offset_off + target {
        out.cooler = Some(false);
    }

    out
}

/// Temperature loop for one vessel.
pub struct TemperatureController<'a, H, C> {
    session: Session<'a, H, C>,
    tag: Tag<'a>,
}

impl<'a, H: VesselPorts, C: Clock> TemperatureController<'a, H, C> {
    pub fn new(session: Session<'a, H, C>) -> Self {
        let tag = Tag::new("TEMP", &session);
        Self { session, tag }
    }

    /// Run until the session stops or the sensor fails, then switch heater
    /// and cooler off.
    pub async fn run(&self) -> Result<()> {
        info!("{}: hysteresis control started", self.tag);
        let result = self.control_loop().await;
        self.shutdown().await;
        result
    }

    async fn control_loop(&self) -> Result<()> {
        while self.session.running.is_running() {
            self.tick().await?;
            self.session.clock.sleep(TICK).await;
        }
        Ok(())
    }

    /// One evaluation: read, decide, command.  Returns what was decided.
    pub async fn tick(&self) -> Result<Switching> {
        let Session { vessel, config, hw, .. } = self.session;

        let value = read_sensor(hw, &vessel.sensor).await?;
        let target = hw
            .target_temperature(&vessel.id)
            .await
            .map_err(|e| Error::Context(vessel.id.clone(), e))?;

        let heater_on = state_or_off(hw, vessel.heater.as_ref(), self.tag).await;
        let cooler_on = state_or_off(hw, vessel.cooler.as_ref(), self.tag).await;

        let decided = evaluate(config, value, target, heater_on, cooler_on);

        if let (Some(on), Some(id)) = (decided.heater, vessel.heater.as_ref()) {
            info!("{}: {value:.2} vs target {target:.2}, heater {}", self.tag, on_off(on));
            switch(hw, id, on, self.tag).await;
        }
        if let (Some(on), Some(id)) = (decided.cooler, vessel.cooler.as_ref()) {
            info!("{}: {value:.2} vs target {target:.2}, cooler {}", self.tag, on_off(on));
            switch(hw, id, on, self.tag).await;
        }

        Ok(decided)
    }

    async fn shutdown(&self) {
        let Session { vessel, hw, .. } = self.session;
        force_off(hw, vessel.heater.as_ref(), self.tag).await;
        force_off(hw, vessel.cooler.as_ref(), self.tag).await;
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
