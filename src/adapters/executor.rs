//! Session host on an `edge-executor` local executor.
//!
//! [`LocalSessions`] owns a snapshot of the host's vessel registry and
//! spawns one task per running session on a borrowed
//! [`LocalExecutor`](edge_executor::LocalExecutor).  Everything runs on the
//! executor's thread: the gateway and clock are shared through `Rc` and
//! each session's run flag is kept here so the host can stop it later.
//!
//! A stopped session still owns its vessel until its task has finished the
//! hold it was in and switched everything off.  Until then the vessel
//! counts as running and cannot be started again, so an old shutdown never
//! switches off a new session's actuators.
//!
//! ```text
//!   host registry ──▶ VesselEntry ──▶ LocalSessions::spawn ──▶ Task<SessionOutcome>
//!                                           │
//!                                           └── SessionHandle (stop / is_running)
//! ```

use core::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context as _, bail};
use edge_executor::{LocalExecutor, Task};
use log::info;

use crate::app::autostart::AutostartEntry;
use crate::app::ports::{Clock, SessionLauncher, VesselPorts};
use crate::app::supervisor::{SessionOutcome, VesselSupervisor};
use crate::config::{AutoStart, ControlConfig, LogicKind, LogicSettings};
use crate::session::{RunFlag, Session};
use crate::vessel::{Vessel, VesselId};

/// One registry row: wiring, logic and its settings.
#[derive(Debug, Clone)]
pub struct VesselEntry {
    pub vessel: Vessel,
    pub kind: LogicKind,
    pub config: ControlConfig,
    pub autostart: AutoStart,
}

impl VesselEntry {
    /// A display sensor in `settings` overrides the vessel's own.
    pub fn new(mut vessel: Vessel, kind: LogicKind, settings: LogicSettings) -> Self {
        if let Some(display) = settings.display_sensor {
            vessel.display_sensor = Some(display);
        }
        Self {
            vessel,
            kind,
            config: settings.control,
            autostart: settings.autostart,
        }
    }
}

/// Host-side view of one spawned session.
struct SessionHandle {
    running: Rc<RunFlag>,
    finished: Rc<Cell<bool>>,
}

impl SessionHandle {
    /// Live until the task has returned or been dropped.
    fn is_live(&self) -> bool {
        !self.finished.get()
    }
}

/// Marks its session finished when the task's future is dropped, whether
/// it ran to completion or was cancelled.
struct FinishGuard(Rc<Cell<bool>>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

/// Spawns and tracks vessel sessions on a local executor.
///
/// `'e` is the borrow of the executor, `'a` the lifetime its tasks may
/// capture.
pub struct LocalSessions<'e, 'a, H, C, const N: usize = 64> {
    executor: &'e LocalExecutor<'a, N>,
    hw: Rc<H>,
    clock: Rc<C>,
    vessels: HashMap<VesselId, Rc<VesselEntry>>,
    sessions: HashMap<VesselId, SessionHandle>,
}

impl<'e, 'a, H, C, const N: usize> LocalSessions<'e, 'a, H, C, N>
where
    H: VesselPorts + 'a,
    C: Clock + 'a,
{
    pub fn new(executor: &'e LocalExecutor<'a, N>, hw: Rc<H>, clock: Rc<C>) -> Self {
        Self {
            executor,
            hw,
            clock,
            vessels: HashMap::new(),
            sessions: HashMap::new(),
        }
    }

    /// Add or replace a vessel.  A running session keeps the entry it
    /// started with.
    pub fn register(&mut self, entry: VesselEntry) {
        self.vessels.insert(entry.vessel.id.clone(), Rc::new(entry));
    }

    /// Registry snapshot for [`autostart`](crate::app::autostart::autostart),
    /// in id order.
    pub fn autostart_entries(&self) -> Vec<AutostartEntry> {
        let mut entries: Vec<_> = self
            .vessels
            .values()
            .map(|e| AutostartEntry {
                vessel: e.vessel.id.clone(),
                autostart: e.autostart,
            })
            .collect();
        entries.sort_by(|a, b| a.vessel.cmp(&b.vessel));
        entries
    }

    /// Start a session for `id` and hand back its task.  Dropping the task
    /// cancels the session without the shutdown pass; detach it or run it
    /// to completion.
    pub fn spawn(&mut self, id: &VesselId) -> anyhow::Result<Task<SessionOutcome>> {
        let entry = self
            .vessels
            .get(id)
            .cloned()
            .with_context(|| format!("unknown vessel {id}"))?;
        if let Some(handle) = self.sessions.get(id).filter(|h| h.is_live()) {
            if handle.running.is_running() {
                bail!("vessel {id} already has a running session");
            }
            bail!("vessel {id} is still shutting down");
        }

        let running = Rc::new(RunFlag::new());
        let finished = Rc::new(Cell::new(false));
        self.sessions.insert(
            id.clone(),
            SessionHandle {
                running: running.clone(),
                finished: finished.clone(),
            },
        );
        let guard = FinishGuard(finished);

        let hw = self.hw.clone();
        let clock = self.clock.clone();
        info!("SESSIONS: spawning {} for {id}", entry.kind.name());

        Ok(self.executor.spawn(async move {
            let session = Session {
                vessel: &entry.vessel,
                config: &entry.config,
                hw: &*hw,
                clock: &*clock,
                running: &running,
            };
            let outcome = VesselSupervisor::new(session, entry.kind).run().await;
            drop(guard);
            outcome
        }))
    }

    /// Ask the session for `id` to stop.  Returns `false` if none was
    /// running or a stop was already requested.  The session keeps the
    /// vessel until its shutdown pass is done.
    pub fn stop(&mut self, id: &VesselId) -> bool {
        let Some(handle) = self.sessions.get(id).filter(|h| h.is_live()) else {
            return false;
        };
        let stopped = handle.running.stop();
        if stopped {
            info!("SESSIONS: stop requested for {id}");
        }
        stopped
    }

    /// Whether a session for `id` still holds the vessel, including one
    /// that was stopped or failed and is still shutting down.
    pub fn is_running(&self, id: &VesselId) -> bool {
        self.sessions.get(id).is_some_and(SessionHandle::is_live)
    }

    /// Whether the session for `id` is live but has been asked to stop.
    pub fn is_stopping(&self, id: &VesselId) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|h| h.is_live() && !h.running.is_running())
    }
}

impl<'a, H, C, const N: usize> SessionLauncher for LocalSessions<'_, 'a, H, C, N>
where
    H: VesselPorts + 'a,
    C: Clock + 'a,
{
    fn is_running(&self, vessel: &VesselId) -> bool {
        LocalSessions::is_running(self, vessel)
    }

    fn start(&mut self, vessel: &VesselId) -> anyhow::Result<()> {
        self.spawn(vessel)?.detach();
        Ok(())
    }
}
