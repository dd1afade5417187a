use chrono::{DateTime, Duration, Utc};

/// Coalesces bursts of interaction events into at most one recomputation per
/// window. The contract is independent of how many events arrive inside the
/// window.
#[derive(Clone, Debug)]
pub struct DebounceGate {
    window: Duration,
    last_fired: Option<DateTime<Utc>>,
    pending: bool,
}

impl DebounceGate {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::milliseconds(window_ms as i64),
            last_fired: None,
            pending: false,
        }
    }

    /// Notes that an event arrived. Returns true when the caller should run a
    /// recomputation now; otherwise the trigger is held as pending.
    pub fn notify(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_fired {
            Some(last) if now - last < self.window => {
                self.pending = true;
                false
            }
            _ => {
                self.last_fired = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Polled after the window elapses to flush a held trigger.
    pub fn take_pending(&mut self, now: DateTime<Utc>) -> bool {
        if self.pending {
            if let Some(last) = self.last_fired {
                if now - last >= self.window {
                    self.last_fired = Some(now);
                    self.pending = false;
                    return true;
                }
            }
        }
        false
    }
}
