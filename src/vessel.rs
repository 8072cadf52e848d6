//! Vessel identity and wiring.
//!
//! A [`Vessel`] names the sensors and actuators one fermentation vessel is
//! wired to.  The registry that owns vessels lives in the host; a session
//! only borrows one for its lifetime.  Every actuator and the pressure
//! sensor are optional: an unset id means "not fitted", and the controllers
//! skip it instead of failing.

use core::fmt;
use core::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum identifier length in bytes.
pub const MAX_ID_LEN: usize = 32;

type IdString = heapless::String<MAX_ID_LEN>;

fn parse_id(raw: &str) -> Result<IdString, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::EmptyId);
    }
    let mut s = IdString::new();
    s.push_str(raw).map_err(|()| ConfigError::IdTooLong)?;
    Ok(s)
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(IdString);

        impl $name {
            pub fn new(raw: &str) -> Result<Self, ConfigError> {
                parse_id(raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ConfigError;

            fn try_from(raw: &str) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Host-assigned vessel identifier.
    VesselId
);
id_type!(
    /// Host-assigned sensor identifier.
    SensorId
);
id_type!(
    /// Host-assigned actuator identifier.
    ActuatorId
);

/// One fermentation vessel's wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub id: VesselId,
    /// Primary temperature probe.  Required: every controller reads it.
    pub sensor: SensorId,
    /// Secondary sensor shown on displays (e.g. a floating hydrometer).
    /// Never read by the controllers.
    #[serde(default)]
    pub display_sensor: Option<SensorId>,
    #[serde(default)]
    pub heater: Option<ActuatorId>,
    #[serde(default)]
    pub cooler: Option<ActuatorId>,
    /// Agitation / recirculation pump.
    #[serde(default)]
    pub agitator: Option<ActuatorId>,
    #[serde(default)]
    pub pressure_sensor: Option<SensorId>,
    /// Spunding relief valve.
    #[serde(default)]
    pub valve: Option<ActuatorId>,
}

impl Vessel {
    /// A vessel with only its temperature probe wired.
    pub fn new(id: VesselId, sensor: SensorId) -> Self {
        Self {
            id,
            sensor,
            display_sensor: None,
            heater: None,
            cooler: None,
            agitator: None,
            pressure_sensor: None,
            valve: None,
        }
    }

    /// Every configured actuator, in shutdown order.
    pub fn actuators(&self) -> impl Iterator<Item = &ActuatorId> {
        [&self.heater, &self.cooler, &self.agitator, &self.valve]
            .into_iter()
            .flatten()
    }

    /// Spunding needs both a relief valve and a pressure sensor.
    pub fn has_spunding(&self) -> bool {
        self.valve.is_some() && self.pressure_sensor.is_some()
    }
}
