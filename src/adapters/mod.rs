//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                       | Connects to                  |
//! |------------|----------------------------------|------------------------------|
//! | `executor` | SessionLauncher                  | `edge-executor` local tasks  |
//! | `sim`      | SensorGateway, ActuatorGateway,  | Scripted traces, virtual time|
//! |            | VesselContext, Clock             |                              |
//! | `time`     | Clock                            | `Instant` + reactor timers   |
//!
//! `sim` is only built with the `sim` feature (on by default) or in tests.

pub mod executor;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod time;
