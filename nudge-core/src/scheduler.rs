//! Rate-limited submission of the report to the IN endpoint.

use crate::transport::Transport;
use xinput_proto::{EndpointAddress, Report};

/// Scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Minimum spacing between submissions, in milliseconds.
    pub period_ms: u64,
}

/// One report per USB frame.
pub const DEFAULT_SCHEDULER_CONFIG: SchedulerConfig = SchedulerConfig { period_ms: 1 };

/// What a call to [`TransmissionScheduler::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    /// The current period slot has already been used.
    NotDue,
    /// Device not configured, suspended, or IN endpoint unknown.
    NotReady,
    /// The previous transfer is still in flight.
    Busy,
    /// The stack refused the submission.
    Rejected,
    /// Report queued for transfer.
    Sent,
}

/// Paces report submissions on a fixed period grid.
///
/// The deadline advances additively, so a late slot does not shift the
/// grid. If the caller stalls for several periods the missed slots are
/// skipped rather than replayed back to back.
///
/// Remote wakeup is requested once per suspend, on the first due slot.
#[derive(Debug, Clone)]
pub struct TransmissionScheduler {
    config: SchedulerConfig,
    next_send_ms: u64,
    wakeup_requested: bool,
}

impl TransmissionScheduler {
    #[must_use]
    pub const fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            next_send_ms: 0,
            wakeup_requested: false,
        }
    }

    /// Send `report` on `endpoint` if a slot is due and the stack allows it.
    ///
    /// A due slot is consumed even when the send does not happen.
    pub fn poll<T: Transport>(
        &mut self,
        now_ms: u64,
        transport: &mut T,
        endpoint: Option<EndpointAddress>,
        report: &Report,
    ) -> SendOutcome {
        if now_ms < self.next_send_ms {
            return SendOutcome::NotDue;
        }
        self.advance(now_ms);

        if transport.suspended() {
            if !self.wakeup_requested {
                transport.remote_wakeup();
                self.wakeup_requested = true;
            }
        } else {
            self.wakeup_requested = false;
        }

        let Some(endpoint) = endpoint else {
            return SendOutcome::NotReady;
        };
        if !transport.ready() {
            return SendOutcome::NotReady;
        }
        if transport.busy(endpoint) || !transport.claim(endpoint) {
            return SendOutcome::Busy;
        }

        let sent = transport.submit(endpoint, &report.to_bytes());
        transport.release(endpoint);

        if sent {
            SendOutcome::Sent
        } else {
            SendOutcome::Rejected
        }
    }

    fn advance(&mut self, now_ms: u64) {
        let period = self.config.period_ms.max(1);
        self.next_send_ms += period;
        if self.next_send_ms <= now_ms {
            let missed = (now_ms - self.next_send_ms) / period + 1;
            self.next_send_ms += missed * period;
        }
    }

    /// Earliest time the next slot opens.
    #[must_use]
    pub const fn next_send_ms(&self) -> u64 {
        self.next_send_ms
    }
}

impl Default for TransmissionScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEDULER_CONFIG)
    }
}
