//! Control configuration parameters
//!
//! All tunable parameters for one vessel's control session.  The host
//! stores them as a loosely typed property map per vessel; they are parsed
//! once at session start into an immutable [`ControlConfig`] snapshot.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::vessel::SensorId;

/// Allowed values for the valve release and pause selects (seconds).
pub const VALVE_TIMING_OPTIONS: core::ops::RangeInclusive<u8> = 1..=5;

/// Tunable offsets and durations, read once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    // --- Heater band ---
    /// Heater switches on when `value + heater_offset_on <= target`.
    pub heater_offset_on: f32,
    /// Heater switches off when `value + heater_offset_off >= target`.
    pub heater_offset_off: f32,

    // --- Cooler band ---
    /// Cooler switches on when `value >= target + cooler_offset_on`.
    pub cooler_offset_on: f32,
    /// Cooler switches off when `value <= target + cooler_offset_off`.
    pub cooler_offset_off: f32,

    // --- Pump ---
    /// Pump is held off at or above this temperature
    pub max_pump_temp: f32,
    /// Seconds of pumping between rests
    pub pump_work_secs: u32,
    /// Seconds the pump rests while a step timer is running
    pub pump_rest_secs: u32,

    // --- Spunding ---
    /// Pressure above target that triggers a release
    pub spunding_offset: f32,
    /// Seconds the valve stays open per burst
    pub valve_release_secs: u8,
    /// Seconds between bursts
    pub valve_pause_secs: u8,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            heater_offset_on: 0.0,
            heater_offset_off: 0.0,
            cooler_offset_on: 0.0,
            cooler_offset_off: 0.0,

            max_pump_temp: 88.0,
            pump_work_secs: 600, // 10 min
            pump_rest_secs: 60,

            spunding_offset: 0.0,
            valve_release_secs: 1,
            valve_pause_secs: 2,
        }
    }
}

impl ControlConfig {
    pub fn pump_work_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.pump_work_secs))
    }

    pub fn pump_rest_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.pump_rest_secs))
    }

    pub fn valve_release(&self) -> Duration {
        Duration::from_secs(u64::from(self.valve_release_secs))
    }

    pub fn valve_pause(&self) -> Duration {
        Duration::from_secs(u64::from(self.valve_pause_secs))
    }

    /// A zero work interval or a zero rest duration turns duty cycling off;
    /// the pump then runs continuously apart from overtemperature holds.
    /// Either one being zero is enough, as in the host plugin's own check.
    pub fn pump_duty_cycle_enabled(&self) -> bool {
        self.pump_work_secs > 0 && self.pump_rest_secs > 0
    }

    /// Contract violations that make a band degenerate.  Not rejected: the
    /// supervisor logs them and runs with the values as given.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.heater_offset_on < self.heater_offset_off {
            out.push("HeaterOffsetOn is below HeaterOffsetOff; heater band is inverted");
        }
        if self.cooler_offset_on < self.cooler_offset_off {
            out.push("CoolerOffsetOn is below CoolerOffsetOff; cooler band is inverted");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Logic kinds and autostart
// ---------------------------------------------------------------------------

/// Which controllers a vessel session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicKind {
    /// Temperature hysteresis plus pump duty cycle.
    Hysteresis,
    /// Spunding pressure relief plus temperature hysteresis.
    SpundingHysteresis,
}

impl LogicKind {
    /// Name the logic is registered under in the host.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hysteresis => "Fermenter Hysteresis",
            Self::SpundingHysteresis => "Fermenter Spunding Hysteresis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Hysteresis, Self::SpundingHysteresis]
            .into_iter()
            .find(|k| k.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoStart {
    Yes,
    #[default]
    No,
}

/// Everything parsed from a vessel's host property map.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicSettings {
    pub control: ControlConfig,
    pub autostart: AutoStart,
    /// `sensor2`: display-only sensor, copied onto the vessel.
    pub display_sensor: Option<SensorId>,
}

impl Default for LogicSettings {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            autostart: AutoStart::No,
            display_sensor: None,
        }
    }
}

impl LogicSettings {
    /// Parse the host's property map.  Missing, `null` and empty values fall
    /// back to defaults; numbers may arrive as JSON numbers or strings.
    pub fn from_props(props: &Map<String, Value>) -> Result<Self, ConfigError> {
        let d = ControlConfig::default();
        let control = ControlConfig {
            heater_offset_on: number(props, "HeaterOffsetOn", d.heater_offset_on.into())? as f32,
            heater_offset_off: number(props, "HeaterOffsetOff", d.heater_offset_off.into())? as f32,
            cooler_offset_on: number(props, "CoolerOffsetOn", d.cooler_offset_on.into())? as f32,
            cooler_offset_off: number(props, "CoolerOffsetOff", d.cooler_offset_off.into())? as f32,
            max_pump_temp: number(props, "Max_Pump_Temp", d.max_pump_temp.into())? as f32,
            pump_work_secs: seconds(props, "Rest_Interval", d.pump_work_secs)?,
            pump_rest_secs: seconds(props, "Rest_Time", d.pump_rest_secs)?,
            spunding_offset: number(props, "SpundingOffsetOpen", d.spunding_offset.into())? as f32,
            valve_release_secs: valve_option(props, "ValveRelease", d.valve_release_secs)?,
            valve_pause_secs: valve_option(props, "Pause", d.valve_pause_secs)?,
        };

        let autostart = match text(props, "AutoStart") {
            None | Some("No") => AutoStart::No,
            Some("Yes") => AutoStart::Yes,
            Some(_) => return Err(ConfigError::InvalidOption("AutoStart")),
        };

        let display_sensor = text(props, "sensor2").map(SensorId::new).transpose()?;

        Ok(Self {
            control,
            autostart,
            display_sensor,
        })
    }
}

// ── Property helpers ──────────────────────────────────────────

/// Non-empty string value, trimmed.
fn text<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number(props: &Map<String, Value>, key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = match props.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or(ConfigError::InvalidNumber(key))
}

fn seconds(props: &Map<String, Value>, key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let secs = number(props, key, f64::from(default))?;
    if secs < 0.0 || secs > f64::from(u32::MAX) {
        return Err(ConfigError::InvalidNumber(key));
    }
    Ok(secs.round() as u32)
}

fn valve_option(props: &Map<String, Value>, key: &'static str, default: u8) -> Result<u8, ConfigError> {
    let secs = number(props, key, f64::from(default))?;
    if secs.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&secs) {
        return Err(ConfigError::InvalidOption(key));
    }
    let secs = secs as u8;
    if !VALVE_TIMING_OPTIONS.contains(&secs) {
        return Err(ConfigError::InvalidOption(key));
    }
    Ok(secs)
}
