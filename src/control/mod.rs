//! Control loops: one async task per concern.
//!
//! Each controller borrows a [`Session`] and runs until the session's
//! [`RunFlag`](crate::session::RunFlag) is cleared or a sensor read fails.
//! On the way out every controller switches off the actuators it owns,
//! whatever the reason for leaving.
//!
//! Error policy shared by all loops:
//!
//! | failure                     | handling                         |
//! |-----------------------------|----------------------------------|
//! | sensor / target unavailable | returned, ends the session       |
//! | actuator command            | `warn!`, loop carries on         |
//! | actuator state query        | `debug!`, treated as off         |

pub mod hysteresis;
pub mod pump;
pub mod spunding;

use core::fmt;
use core::time::Duration;

use log::{debug, warn};

use crate::app::ports::{ActuatorGateway, SensorGateway};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::vessel::{ActuatorId, SensorId, VesselId};

/// Steady-state loop period.
pub const TICK: Duration = Duration::from_secs(1);

/// Log prefix: `SUBSYSTEM[vessel]`.
#[derive(Clone, Copy)]
pub(crate) struct Tag<'a> {
    pub subsystem: &'static str,
    pub vessel: &'a VesselId,
}

impl<'a> Tag<'a> {
    pub fn new<H, C>(subsystem: &'static str, session: &Session<'a, H, C>) -> Self {
        Self {
            subsystem,
            vessel: &session.vessel.id,
        }
    }
}

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.subsystem, self.vessel)
    }
}

/// Read a sensor; any failure is fatal to the caller's loop.
pub(crate) async fn read_sensor(hw: &impl SensorGateway, id: &SensorId) -> Result<f32> {
    hw.read_sensor(id)
        .await
        .map_err(|e| Error::Sensor(id.clone(), e))
}

/// Last-known actuator state.  Unconfigured or unreadable reads as off.
pub(crate) async fn state_or_off(hw: &impl ActuatorGateway, id: Option<&ActuatorId>, tag: Tag<'_>) -> bool {
    let Some(id) = id else {
        return false;
    };
    match hw.actuator_state(id).await {
        Ok(on) => on,
        Err(e) => {
            debug!("{tag}: state of {id} unavailable ({e}), assuming off");
            false
        }
    }
}

/// Command an actuator.  Failures are logged and swallowed; returns
/// whether the host accepted the command.
pub(crate) async fn switch(hw: &impl ActuatorGateway, id: &ActuatorId, on: bool, tag: Tag<'_>) -> bool {
    let result = if on {
        hw.actuator_on(id).await
    } else {
        hw.actuator_off(id).await
    };
    match result {
        Ok(()) => {
            debug!("{tag}: {id} {}", if on { "on" } else { "off" });
            true
        }
        Err(e) => {
            warn!("{tag}: switching {id} {} failed: {e}", if on { "on" } else { "off" });
            false
        }
    }
}

/// Unconditional off for shutdown paths.  Unset ids are skipped.
pub(crate) async fn force_off(hw: &impl ActuatorGateway, id: Option<&ActuatorId>, tag: Tag<'_>) {
    if let Some(id) = id {
        switch(hw, id, false, tag).await;
    }
}
