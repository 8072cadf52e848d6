//! Fermentation vessel control engine.
//!
//! Runs the temperature hysteresis, agitation pump duty cycle and spunding
//! pressure relief loops for one vessel per session.  The host platform
//! supplies sensors, actuators, targets and time through the port traits in
//! [`app::ports`]; everything here is plain async Rust on top of them.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod session;
pub mod vessel;
