//! Status events emitted by the rotation scheduler

use std::time::Duration;

/// Events emitted by the scheduler for operator feedback
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// Session started
    Started {
        address_count: usize,
    },

    /// A new address is on display
    Rotated {
        /// Sequential page counter within the session, starting at 1
        view_number: u64,
        index: usize,
        address: String,
        /// Drawn dwell duration
        dwell: Duration,
    },

    /// Countdown tick
    Countdown {
        seconds_left: u64,
    },

    /// Countdown reached zero; the next address is due
    Advancing,

    /// Session stopped
    Stopped {
        pages_viewed: u64,
    },
}

impl SchedulerEvent {
    /// Human-readable status line
    pub fn status_line(&self) -> String {
        match self {
            SchedulerEvent::Started { address_count } => {
                format!("Rotation started with {} address(es)", address_count)
            }
            SchedulerEvent::Rotated {
                view_number,
                address,
                dwell,
                ..
            } => format!(
                "Page #{}: {} ({:.1}s)",
                view_number,
                address,
                dwell.as_secs_f64()
            ),
            SchedulerEvent::Countdown { seconds_left } => {
                format!("Next page in {}s", seconds_left)
            }
            SchedulerEvent::Advancing => "Loading next page...".to_string(),
            SchedulerEvent::Stopped { pages_viewed } => {
                format!("Rotation stopped after {} page(s)", pages_viewed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines_carry_payloads() {
        let rotated = SchedulerEvent::Rotated {
            view_number: 3,
            index: 0,
            address: "https://a.test".into(),
            dwell: Duration::from_millis(7300),
        };
        assert_eq!(rotated.status_line(), "Page #3: https://a.test (7.3s)");
        assert_eq!(
            SchedulerEvent::Countdown { seconds_left: 4 }.status_line(),
            "Next page in 4s"
        );
        assert_eq!(
            SchedulerEvent::Stopped { pages_viewed: 12 }.status_line(),
            "Rotation stopped after 12 page(s)"
        );
    }
}
