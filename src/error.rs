//! Unified error types for the fermenter control engine.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! supervisor's error handling uniform.  Leaf variants are `Copy`; the
//! top-level error carries the id of the sensor or vessel involved so the
//! session-ending log line says which one failed.

use core::fmt;

use crate::vessel::{SensorId, VesselId};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the engine funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned no value.  Fatal to a session.
    Sensor(SensorId, SensorError),
    /// The vessel context could not supply a live target.  Fatal to a session.
    Context(VesselId, ContextError),
    /// An actuator command failed.  Logged; never ends a session.
    Actuator(ActuatorError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(id, e) => write!(f, "sensor {id}: {e}"),
            Self::Context(id, e) => write!(f, "vessel {id}: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The gateway does not know the sensor id.
    NotFound,
    /// The gateway call itself failed.
    ReadFailed,
    /// The sensor exists but has no current value.
    MissingValue,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::MissingValue => write!(f, "no current value"),
        }
    }
}

// ---------------------------------------------------------------------------
// Vessel context errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The registry has no vessel with this id.
    UnknownVessel,
    /// The live target temperature is unavailable.
    TargetTemperatureUnavailable,
    /// The live target pressure is unavailable.
    TargetPressureUnavailable,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVessel => write!(f, "unknown vessel"),
            Self::TargetTemperatureUnavailable => write!(f, "target temperature unavailable"),
            Self::TargetPressureUnavailable => write!(f, "target pressure unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The gateway does not know the actuator id.
    NotFound,
    /// The on/off command was rejected or not confirmed.
    CommandFailed,
    /// The last-known state could not be queried.
    StateUnavailable,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::CommandFailed => write!(f, "command failed"),
            Self::StateUnavailable => write!(f, "state unavailable"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// The `&'static str` names the offending property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric property is not a number, or is negative where it must not be.
    InvalidNumber(&'static str),
    /// A select property holds a value outside its option list.
    InvalidOption(&'static str),
    /// An identifier exceeds [`MAX_ID_LEN`](crate::vessel::MAX_ID_LEN) bytes.
    IdTooLong,
    /// An identifier is empty.
    EmptyId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber(prop) => write!(f, "{prop}: not a valid number"),
            Self::InvalidOption(prop) => write!(f, "{prop}: value not in option list"),
            Self::IdTooLong => write!(f, "identifier too long"),
            Self::EmptyId => write!(f, "identifier is empty"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
