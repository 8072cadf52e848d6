//! Vessel supervisor: the session boundary.
//!
//! [`VesselSupervisor`] starts the controllers a vessel's logic needs,
//! runs them concurrently on the current task, and owns the shutdown
//! guarantee: however the session ends, every configured actuator is
//! commanded off before [`run`](VesselSupervisor::run) returns.
//!
//! ```text
//!   Hysteresis            TemperatureController ─┐
//!                         PumpController ────────┴─▶ zip ─▶ shutdown
//!
//!   SpundingHysteresis    PressureReliefController ─┐
//!                         TemperatureController ────┴─▶ zip ─▶ shutdown
//! ```
//!
//! A controller that fails clears the shared flag, so its sibling winds
//! down within a tick (or after the hold it is in).  The first failure
//! becomes the session outcome.

use core::cell::RefCell;
use core::future::Future;

use futures_lite::future;
use log::{error, info, warn};

use crate::config::LogicKind;
use crate::control::hysteresis::TemperatureController;
use crate::control::pump::PumpController;
use crate::control::spunding::PressureReliefController;
use crate::control::{Tag, force_off};
use crate::error::{Error, Result};
use crate::session::Session;

use super::ports::{Clock, VesselPorts};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The run flag was cleared from outside.
    Stopped,
    /// A controller failed; carries the first failure.
    Failed(Error),
}

/// Runs one vessel's control session.
pub struct VesselSupervisor<'a, H, C> {
    session: Session<'a, H, C>,
    kind: LogicKind,
    tag: Tag<'a>,
}

impl<'a, H: VesselPorts, C: Clock> VesselSupervisor<'a, H, C> {
    pub fn new(session: Session<'a, H, C>, kind: LogicKind) -> Self {
        let tag = Tag::new("SESSION", &session);
        Self { session, kind, tag }
    }

    /// Run the session to completion.  Never panics on controller failure;
    /// the failure is logged and returned as [`SessionOutcome::Failed`].
    pub async fn run(&self) -> SessionOutcome {
        info!("{}: starting {}", self.tag, self.kind.name());
        for w in self.session.config.warnings() {
            warn!("{}: {w}", self.tag);
        }

        let first_failure = RefCell::new(None);
        let temperature = TemperatureController::new(self.session);

        match self.kind {
            LogicKind::Hysteresis => {
                let pump = PumpController::new(self.session);
                future::zip(
                    self.guard(temperature.run(), &first_failure),
                    self.guard(pump.run(), &first_failure),
                )
                .await;
            }
            LogicKind::SpundingHysteresis => {
                let pressure = PressureReliefController::new(self.session);
                future::zip(
                    self.guard(pressure.run(), &first_failure),
                    self.guard(temperature.run(), &first_failure),
                )
                .await;
            }
        }

        let outcome = match first_failure.into_inner() {
            Some(e) => {
                error!("{}: {} error: {e}", self.tag, self.kind.name());
                SessionOutcome::Failed(e)
            }
            None => {
                info!("{}: stopped", self.tag);
                SessionOutcome::Stopped
            }
        };

        self.shutdown().await;
        outcome
    }

    /// Await one controller; on failure stop its siblings and keep the
    /// error if it is the first.
    async fn guard(&self, controller: impl Future<Output = Result<()>>, first_failure: &RefCell<Option<Error>>) {
        if let Err(e) = controller.await {
            self.session.running.stop();
            let mut slot = first_failure.borrow_mut();
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    }

    /// Clear the flag and switch off everything the vessel has.  Command
    /// failures are logged by `force_off`; shutdown carries on regardless.
    async fn shutdown(&self) {
        let Session { vessel, hw, running, .. } = self.session;
        running.stop();
        for id in vessel.actuators() {
            force_off(hw, Some(id), self.tag).await;
        }
    }
}
