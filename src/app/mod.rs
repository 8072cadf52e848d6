//! Application core: session orchestration over port traits.
//!
//! The supervisor composes the control loops for one vessel; autostart
//! decides which vessels to start when the host comes up.  All interaction
//! with sensors, actuators and the host's registries happens through the
//! **port traits** in [`ports`], keeping this layer fully testable with the
//! simulation adapter.

pub mod activity;
pub mod autostart;
pub mod ports;
pub mod supervisor;
