//! Live rotation session state

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scheduler state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
}

/// The scheduler's live state
///
/// Only the scheduler task mutates a session. Handles receive copies via
/// [`RotationScheduler::snapshot`](super::RotationScheduler::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Whether a rotation is in progress
    pub running: bool,

    /// Pages shown in the current (or last) session
    pub page_view_count: u64,

    /// Index of the address on display, absent before the first pick
    pub current_index: Option<usize>,

    /// Whole seconds until the next rotation, for operator feedback
    pub time_left_secs: u64,

    /// When the current session started
    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn state(&self) -> SchedulerState {
        if self.running {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Fresh running session
    pub(crate) fn begin(now: DateTime<Utc>) -> Self {
        Self {
            running: true,
            started_at: Some(now),
            ..Self::default()
        }
    }

    /// Return to idle, keeping the page count for reporting
    pub(crate) fn end(&mut self) {
        *self = Self {
            page_view_count: self.page_view_count,
            ..Self::default()
        };
    }
}
