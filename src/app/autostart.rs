//! Autostart scan.
//!
//! Runs once at host start-up over a snapshot of the vessel registry and
//! asks the host to start every vessel marked `AutoStart = Yes` that is not
//! already running.  Each vessel is independent: a failed start is logged
//! and recorded, and the scan moves on.

use log::{error, info};

use crate::config::AutoStart;
use crate::vessel::VesselId;

use super::ports::SessionLauncher;

/// One row of the registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutostartEntry {
    pub vessel: VesselId,
    pub autostart: AutoStart,
}

/// What the scan did, per vessel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutostartReport {
    pub started: Vec<VesselId>,
    pub already_running: Vec<VesselId>,
    pub failed: Vec<VesselId>,
}

/// Start every autostart vessel that is not running yet.
pub fn autostart(entries: &[AutostartEntry], launcher: &mut impl SessionLauncher) -> AutostartReport {
    info!("AUTOSTART: scanning {} vessel(s)", entries.len());
    let mut report = AutostartReport::default();

    for entry in entries.iter().filter(|e| e.autostart == AutoStart::Yes) {
        let id = &entry.vessel;
        if launcher.is_running(id) {
            info!("AUTOSTART: {id} already running");
            report.already_running.push(id.clone());
            continue;
        }
        match launcher.start(id) {
            Ok(()) => {
                info!("AUTOSTART: started {id}");
                report.started.push(id.clone());
            }
            Err(e) => {
                error!("AUTOSTART: failed to start {id}: {e:#}");
                report.failed.push(id.clone());
            }
        }
    }

    report
}
