//! Spunding: bleed headspace pressure through a relief valve.
//!
//! Idle ticks compare the vessel pressure with `target + spunding_offset`.
//! Crossing that line starts a release: the valve opens for
//! `valve_release`, closes for `valve_pause`, and pressure is read again.
//! Bursts repeat until pressure is back below the *target* itself, so the
//! offset only decides when to start.  A zero target disables spunding.
//!
//! Release and pause holds are committed once begun; a stop request is
//! seen between bursts.

use log::info;

use crate::app::ports::{Clock, VesselPorts};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::vessel::{ActuatorId, SensorId};

use super::{TICK, Tag, force_off, read_sensor, switch};

/// Pressure loop for one vessel.
pub struct PressureReliefController<'a, H, C> {
    session: Session<'a, H, C>,
    tag: Tag<'a>,
}

impl<'a, H: VesselPorts, C: Clock> PressureReliefController<'a, H, C> {
    pub fn new(session: Session<'a, H, C>) -> Self {
        let tag = Tag::new("SPUND", &session);
        Self { session, tag }
    }

    /// Run until the session stops or a read fails, then close the valve.
    /// Without both a valve and a pressure sensor there is nothing to do.
    pub async fn run(&self) -> Result<()> {
        let vessel = self.session.vessel;
        let (Some(valve), Some(sensor)) = (vessel.valve.as_ref(), vessel.pressure_sensor.as_ref()) else {
            info!("{}: no valve or pressure sensor defined", self.tag);
            return Ok(());
        };

        let hw = self.session.hw;
        switch(hw, valve, false, self.tag).await;
        let result = self.control_loop(valve, sensor).await;
        force_off(hw, Some(valve), self.tag).await;
        result
    }

    async fn control_loop(&self, valve: &ActuatorId, sensor: &SensorId) -> Result<()> {
        let Session {
            vessel,
            config,
            hw,
            clock,
            running,
        } = self.session;

        while running.is_running() {
            let target = hw
                .target_pressure(&vessel.id)
                .await
                .map_err(|e| Error::Context(vessel.id.clone(), e))?;
            let pressure = read_sensor(hw, sensor).await?;

            if target != 0.0 && pressure >= target + config.spunding_offset {
                info!(
                    "{}: {pressure:.2} >= {target:.2} + {:.2}, releasing",
                    self.tag, config.spunding_offset
                );
                self.release(valve, sensor, target, pressure).await?;
            }

            clock.sleep(TICK).await;
        }
        Ok(())
    }

    /// Burst until pressure drops below `target`.  Returns the burst count.
    async fn release(&self, valve: &ActuatorId, sensor: &SensorId, target: f32, mut pressure: f32) -> Result<u32> {
        let Session {
            config,
            hw,
            clock,
            running,
            ..
        } = self.session;
        let mut bursts = 0;

        while pressure >= target && running.is_running() {
            switch(hw, valve, true, self.tag).await;
            clock.sleep(config.valve_release()).await;
            switch(hw, valve, false, self.tag).await;
            clock.sleep(config.valve_pause()).await;

            bursts += 1;
            pressure = read_sensor(hw, sensor).await?;
        }

        info!("{}: {bursts} burst(s), pressure now {pressure:.2}", self.tag);
        Ok(bursts)
    }
}
