//! Port traits: the hexagonal boundary between control logic and the host.
//!
//! ```text
//!   Host adapter ──▶ Port trait ──▶ Controllers / VesselSupervisor
//! ```
//!
//! The host platform implements these traits over its own sensor, actor
//! and fermenter registries.  Controllers consume them via generics, so the
//! control core never touches hardware or the host's data model directly.
//!
//! All methods take `&self`: the controllers of one vessel run
//! concurrently on one thread and share the same gateway.  Implementations
//! that keep mutable state use interior mutability.
//!
//! ## Contract notes
//!
//! - The core imposes no timeouts.  A gateway call that never resolves
//!   blocks the loop that issued it; bounding that is the adapter's job.
//! - `actuator_on` / `actuator_off` must be idempotent: shutdown calls
//!   `actuator_off` unconditionally, possibly more than once.

use core::time::Duration;

use crate::error::{ActuatorError, ContextError, SensorError};
use crate::vessel::{ActuatorId, SensorId, VesselId};

use super::activity::StepActivity;

// ───────────────────────────────────────────────────────────────
// Sensor port (host → core)
// ───────────────────────────────────────────────────────────────

/// Read-side port for sensor values.
pub trait SensorGateway {
    /// Latest value of `id`.  A sensor that exists but has no value yet
    /// must return [`SensorError::MissingValue`], not a sentinel.
    async fn read_sensor(&self, id: &SensorId) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (core → host)
// ───────────────────────────────────────────────────────────────

/// Write-side port for on/off actuators.
pub trait ActuatorGateway {
    /// Switch `id` on.  Resolves once the host has accepted the command.
    async fn actuator_on(&self, id: &ActuatorId) -> Result<(), ActuatorError>;

    /// Switch `id` off.  Resolves once the host has accepted the command.
    async fn actuator_off(&self, id: &ActuatorId) -> Result<(), ActuatorError>;

    /// Last commanded or observed state of `id`.
    async fn actuator_state(&self, id: &ActuatorId) -> Result<bool, ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Vessel context port (host → core)
// ───────────────────────────────────────────────────────────────

/// Live per-vessel values owned by the host's fermenter registry.
pub trait VesselContext {
    /// Current target temperature.  May change between ticks.
    async fn target_temperature(&self, vessel: &VesselId) -> Result<f32, ContextError>;

    /// Current target pressure.  Zero disables spunding.
    async fn target_pressure(&self, vessel: &VesselId) -> Result<f32, ContextError>;

    /// What the vessel's active process step is doing right now.
    /// Adapters that cannot tell report [`StepActivity::Idle`].
    async fn step_activity(&self, vessel: &VesselId) -> StepActivity;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and the only way controllers wait.
///
/// Production uses [`SystemClock`](crate::adapters::time::SystemClock);
/// tests use the `sim` feature's `ManualClock`, which
/// jumps straight to the next deadline.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now(&self) -> Duration;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Everything a vessel session needs from the host, in one bound.
pub trait VesselPorts: SensorGateway + ActuatorGateway + VesselContext {}

impl<T: SensorGateway + ActuatorGateway + VesselContext> VesselPorts for T {}

// ───────────────────────────────────────────────────────────────
// Session launcher (core → host)
// ───────────────────────────────────────────────────────────────

/// The host's start command for a vessel's control logic.
///
/// Start failures are host failures (unknown vessel, plugin not loaded,
/// ...) and opaque to the core, hence `anyhow`.
pub trait SessionLauncher {
    /// Whether a session for `vessel` is currently running.
    fn is_running(&self, vessel: &VesselId) -> bool;

    /// Start a session for `vessel`.
    fn start(&mut self, vessel: &VesselId) -> anyhow::Result<()>;
}
