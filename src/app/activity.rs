//! Active process-step classification.
//!
//! The pump only rests while a step's countdown timer is running, never
//! while the vessel is ramping towards its target.  Hosts that expose only
//! a status string can classify it with [`StepActivity::from_status_text`].

use core::time::Duration;

/// What the vessel's active step is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepActivity {
    /// No active step.
    #[default]
    Idle,
    /// A step is active but still heading for its target.
    Ramping,
    /// A step's countdown timer is running, with this much left.
    TimerRunning(Duration),
}

impl StepActivity {
    pub fn is_timer_running(self) -> bool {
        matches!(self, Self::TimerRunning(_))
    }

    /// Classify a step status line.  Text that starts with a `HH:MM:SS`
    /// countdown is a running timer; any other non-blank text is a ramp.
    /// The countdown must be at the very start: leading whitespace makes it
    /// a ramp.
    pub fn from_status_text(text: Option<&str>) -> Self {
        match text {
            None => Self::Idle,
            Some(t) if t.trim().is_empty() => Self::Idle,
            Some(t) => parse_countdown(t).map_or(Self::Ramping, Self::TimerRunning),
        }
    }
}

/// Parse a leading `DD:DD:DD`.  Trailing text is ignored.
fn parse_countdown(text: &str) -> Option<Duration> {
    let b = text.as_bytes();
    if b.len() < 8 || b[2] != b':' || b[5] != b':' {
        return None;
    }
    let pair = |i: usize| -> Option<u64> {
        let (hi, lo) = (b[i], b[i + 1]);
        (hi.is_ascii_digit() && lo.is_ascii_digit())
            .then(|| u64::from(hi - b'0') * 10 + u64::from(lo - b'0'))
    };
    let (h, m, s) = (pair(0)?, pair(3)?, pair(6)?);
    Some(Duration::from_secs(h * 3600 + m * 60 + s))
}
