//! One polling run: log in, fetch the schedule, notify every available slot.

use anyhow::Result;
use log::{debug, info};

use crate::notify::Notifier;
use crate::retailer::Retailer;

/// Where a run currently is. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Authenticated,
    ScheduleFetched,
    Notified,
    Done,
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// The schedule body was flagged `ok`
    pub schedule_ok: bool,
    /// Hour entries in the schedule, available or not
    pub slots_seen: usize,
    /// Notifications sent, one per available slot
    pub notified: usize,
}

struct Run {
    state: RunState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: RunState::Start,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Drives a single run to completion. Any error ends the run right away;
/// notifications already sent stay sent.
#[tracing::instrument(skip(retailer, notifier))]
pub async fn run<R: Retailer, N: Notifier>(retailer: &R, notifier: &N) -> Result<RunReport> {
    let mut run = Run::new();
    let mut report = RunReport::default();

    retailer.login().await?;
    run.advance(RunState::Authenticated);

    let schedule = retailer.delivery_schedule().await?;
    run.advance(RunState::ScheduleFetched);
    report.schedule_ok = schedule.ok;
    report.slots_seen = schedule.slots.len();

    if !schedule.ok {
        info!("Delivery schedule not available, nothing to report");
    }

    for slot in schedule.available_slots() {
        notifier.send(&slot.message()).await?;
        run.advance(RunState::Notified);
        report.notified += 1;
    }

    run.advance(RunState::Done);
    info!(
        "Found {} available slot(s) out of {}",
        report.notified, report.slots_seen
    );
    Ok(report)
}
