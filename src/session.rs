//! Cooperative cancellation for one control session.
//!
//! Every controller of a session holds a reference to the same
//! [`RunFlag`] and checks it at the top of each loop iteration.  Clearing
//! it is the only way a session is asked to stop; nothing is interrupted
//! mid-sleep.
//!
//! A [`Session`] bundles what one vessel's controllers share for the
//! duration of a run: the vessel wiring, the config snapshot, the host
//! ports, the clock and the flag.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::ControlConfig;
use crate::vessel::Vessel;

/// Shared `running` flag.  Starts set; once cleared it stays cleared.
#[derive(Debug)]
pub struct RunFlag(AtomicBool);

impl RunFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag.  Returns `true` if this call is the one that stopped
    /// the session.
    pub fn stop(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one running control session.
pub struct Session<'a, H, C> {
    pub vessel: &'a Vessel,
    pub config: &'a ControlConfig,
    pub hw: &'a H,
    pub clock: &'a C,
    pub running: &'a RunFlag,
}

// Manual impls: every field is a shared reference, whatever `H` and `C` are.
impl<H, C> Clone for Session<'_, H, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H, C> Copy for Session<'_, H, C> {}
