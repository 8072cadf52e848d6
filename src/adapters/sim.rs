//! Host-side simulation adapter.
//!
//! Lets whole control sessions run on the host in virtual time:
//!
//! - [`ManualClock`] never waits.  A sleeping future records its deadline
//!   and returns `Pending`; [`run_until_complete`] then jumps the clock to
//!   the earliest recorded deadline and polls again.  Hours of session time
//!   run in microseconds and every timestamp is exact.
//! - [`SimVessel`] implements all three gateway ports from scripted,
//!   piecewise-constant [`Trace`]s and records every actuator command with
//!   the virtual time it was issued at.  Failures can be injected per
//!   actuator.
//!
//! The driver is a plain poll loop, so only futures that wait on this
//! clock (or on something woken by it) make progress.

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::{Pin, pin};
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll, Waker};
use core::time::Duration;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::task::Wake;

use crate::app::activity::StepActivity;
use crate::app::ports::{ActuatorGateway, Clock, SensorGateway, VesselContext};
use crate::error::{ActuatorError, ContextError, SensorError};
use crate::session::RunFlag;
use crate::vessel::{ActuatorId, SensorId, VesselId};

// ───────────────────────────────────────────────────────────────
// Virtual clock
// ───────────────────────────────────────────────────────────────

/// Virtual time, advanced only by [`ManualClock::advance`].
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleepers: RefCell<Vec<(Duration, Waker)>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to the earliest pending deadline and wake everything due by
    /// then.  Returns `false` when nothing is waiting on the clock.
    pub fn advance(&self) -> bool {
        let due: Vec<Waker> = {
            let mut sleepers = self.sleepers.borrow_mut();
            let Some(next) = sleepers.iter().map(|(at, _)| *at).min() else {
                return false;
            };
            if next > self.now.get() {
                self.now.set(next);
            }
            let now = self.now.get();
            let mut due = Vec::new();
            sleepers.retain(|(at, waker)| {
                if *at <= now {
                    due.push(waker.clone());
                    false
                } else {
                    true
                }
            });
            due
        };
        // Wake outside the borrow: a waker may poll straight back into us.
        for waker in due {
            waker.wake();
        }
        true
    }

    /// Resolve once virtual time reaches `at`.
    pub fn sleep_until(&self, at: Duration) -> Sleep<'_> {
        Sleep {
            clock: self,
            deadline: at,
            registered: false,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_until(self.now.get() + duration).await;
    }
}

/// Future returned by [`ManualClock::sleep_until`].
pub struct Sleep<'a> {
    clock: &'a ManualClock,
    deadline: Duration,
    registered: bool,
}

impl Future for Sleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.clock.now.get() >= this.deadline {
            return Poll::Ready(());
        }
        // Entries stay until their deadline passes, so one is enough.
        if !this.registered {
            this.clock
                .sleepers
                .borrow_mut()
                .push((this.deadline, cx.waker().clone()));
            this.registered = true;
        }
        Poll::Pending
    }
}

/// Waker that only records that it was woken.
#[derive(Default)]
struct WakeFlag(AtomicBool);

impl Wake for WakeFlag {
    fn wake(self: Arc<Self>) {
        self.0.store(true, Ordering::Release);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.store(true, Ordering::Release);
    }
}

/// Drive `fut` to completion in virtual time.
///
/// Polls again straight away while something inside `fut` (an executor
/// task, say) has been woken; otherwise advances `clock` to its next
/// deadline.  Returns `None` if `fut` stalls: pending, not woken, and with
/// nothing waiting on the clock.
pub fn run_until_complete<F: Future>(clock: &ManualClock, fut: F) -> Option<F::Output> {
    let mut fut = pin!(fut);
    let flag = Arc::new(WakeFlag::default());
    let waker = Waker::from(flag.clone());
    let mut cx = Context::from_waker(&waker);
    loop {
        if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
            return Some(out);
        }
        if flag.0.swap(false, Ordering::AcqRel) {
            continue;
        }
        if !clock.advance() {
            return None;
        }
    }
}

/// Clear `running` once virtual time reaches `at`.  Zip it with a session
/// to stop that session from outside.
pub async fn stop_at(clock: &ManualClock, at: Duration, running: &RunFlag) {
    clock.sleep_until(at).await;
    running.stop();
}

// ───────────────────────────────────────────────────────────────
// Scripted values
// ───────────────────────────────────────────────────────────────

/// Piecewise-constant value over virtual time.
#[derive(Debug, Clone)]
pub struct Trace<T> {
    /// `(from, value)`, sorted by `from`.  Never empty.
    points: Vec<(Duration, T)>,
}

impl<T: Clone> Trace<T> {
    pub fn constant(value: T) -> Self {
        Self {
            points: vec![(Duration::ZERO, value)],
        }
    }

    /// From `secs` onwards the value is `value`.
    #[must_use]
    pub fn then(mut self, secs: u64, value: T) -> Self {
        let at = Duration::from_secs(secs);
        let idx = self.points.partition_point(|(from, _)| *from <= at);
        self.points.insert(idx, (at, value));
        self
    }

    pub fn at(&self, now: Duration) -> T {
        let idx = self.points.partition_point(|(from, _)| *from <= now);
        self.points[idx.saturating_sub(1)].1.clone()
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated vessel
// ───────────────────────────────────────────────────────────────

/// One recorded actuator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub at: Duration,
    pub actuator: ActuatorId,
    pub on: bool,
}

/// Scripted host for one or more vessels.  Targets and step activity are
/// shared by every vessel id it is asked about.
pub struct SimVessel {
    clock: Rc<ManualClock>,
    sensors: HashMap<SensorId, Trace<Option<f32>>>,
    target_temperature: Trace<Option<f32>>,
    target_pressure: Trace<Option<f32>>,
    activity: Trace<StepActivity>,
    states: RefCell<HashMap<ActuatorId, bool>>,
    commands: RefCell<Vec<Command>>,
    rejecting: RefCell<HashSet<ActuatorId>>,
    unreadable: RefCell<HashSet<ActuatorId>>,
    sensor_reads: Cell<usize>,
}

impl SimVessel {
    pub fn new(clock: Rc<ManualClock>) -> Self {
        Self {
            clock,
            sensors: HashMap::new(),
            target_temperature: Trace::constant(Some(20.0)),
            target_pressure: Trace::constant(Some(0.0)),
            activity: Trace::constant(StepActivity::Idle),
            states: RefCell::new(HashMap::new()),
            commands: RefCell::new(Vec::new()),
            rejecting: RefCell::new(HashSet::new()),
            unreadable: RefCell::new(HashSet::new()),
            sensor_reads: Cell::new(0),
        }
    }

    // ── Scripting ─────────────────────────────────────────────

    /// `None` in the trace reads as a sensor without a value.
    #[must_use]
    pub fn with_sensor(mut self, id: SensorId, trace: Trace<Option<f32>>) -> Self {
        self.sensors.insert(id, trace);
        self
    }

    /// Register an actuator, initially off.
    #[must_use]
    pub fn with_actuator(self, id: ActuatorId) -> Self {
        self.states.borrow_mut().insert(id, false);
        self
    }

    #[must_use]
    pub fn with_target_temperature(mut self, trace: Trace<Option<f32>>) -> Self {
        self.target_temperature = trace;
        self
    }

    #[must_use]
    pub fn with_target_pressure(mut self, trace: Trace<Option<f32>>) -> Self {
        self.target_pressure = trace;
        self
    }

    #[must_use]
    pub fn with_activity(mut self, trace: Trace<StepActivity>) -> Self {
        self.activity = trace;
        self
    }

    /// Make on/off commands for `id` fail from now on.
    pub fn reject_commands(&self, id: &ActuatorId) {
        self.rejecting.borrow_mut().insert(id.clone());
    }

    /// Make state queries for `id` fail from now on.
    pub fn hide_state(&self, id: &ActuatorId) {
        self.unreadable.borrow_mut().insert(id.clone());
    }

    /// Flip an actuator behind the controllers' back, as a user would from
    /// the host UI.  Not recorded as a command.
    pub fn set_manually(&self, id: &ActuatorId, on: bool) {
        self.states.borrow_mut().insert(id.clone(), on);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn is_on(&self, id: &ActuatorId) -> bool {
        self.states.borrow().get(id).copied().unwrap_or(false)
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    /// `(seconds, on)` for every accepted command to `id`.
    pub fn switches(&self, id: &ActuatorId) -> Vec<(u64, bool)> {
        self.commands
            .borrow()
            .iter()
            .filter(|c| &c.actuator == id)
            .map(|c| (c.at.as_secs(), c.on))
            .collect()
    }

    /// Like [`switches`](Self::switches) but with repeated commands to the
    /// same state collapsed: the actuator's visible on/off edges.
    pub fn edges(&self, id: &ActuatorId) -> Vec<(u64, bool)> {
        let mut out: Vec<(u64, bool)> = Vec::new();
        let mut state = false;
        for (at, on) in self.switches(id) {
            if on != state {
                out.push((at, on));
                state = on;
            }
        }
        out
    }

    pub fn sensor_reads(&self) -> usize {
        self.sensor_reads.get()
    }

    fn command(&self, id: &ActuatorId, on: bool) -> Result<(), ActuatorError> {
        let mut states = self.states.borrow_mut();
        let Some(state) = states.get_mut(id) else {
            return Err(ActuatorError::NotFound);
        };
        if self.rejecting.borrow().contains(id) {
            return Err(ActuatorError::CommandFailed);
        }
        *state = on;
        self.commands.borrow_mut().push(Command {
            at: self.clock.now(),
            actuator: id.clone(),
            on,
        });
        Ok(())
    }
}

impl SensorGateway for SimVessel {
    async fn read_sensor(&self, id: &SensorId) -> Result<f32, SensorError> {
        self.sensor_reads.set(self.sensor_reads.get() + 1);
        let trace = self.sensors.get(id).ok_or(SensorError::NotFound)?;
        trace.at(self.clock.now()).ok_or(SensorError::MissingValue)
    }
}

impl ActuatorGateway for SimVessel {
    async fn actuator_on(&self, id: &ActuatorId) -> Result<(), ActuatorError> {
        self.command(id, true)
    }

    async fn actuator_off(&self, id: &ActuatorId) -> Result<(), ActuatorError> {
        self.command(id, false)
    }

    async fn actuator_state(&self, id: &ActuatorId) -> Result<bool, ActuatorError> {
        if self.unreadable.borrow().contains(id) {
            return Err(ActuatorError::StateUnavailable);
        }
        self.states.borrow().get(id).copied().ok_or(ActuatorError::NotFound)
    }
}

impl VesselContext for SimVessel {
    async fn target_temperature(&self, _vessel: &VesselId) -> Result<f32, ContextError> {
        self.target_temperature
            .at(self.clock.now())
            .ok_or(ContextError::TargetTemperatureUnavailable)
    }

    async fn target_pressure(&self, _vessel: &VesselId) -> Result<f32, ContextError> {
        self.target_pressure
            .at(self.clock.now())
            .ok_or(ContextError::TargetPressureUnavailable)
    }

    async fn step_activity(&self, _vessel: &VesselId) -> StepActivity {
        self.activity.at(self.clock.now())
    }
}
