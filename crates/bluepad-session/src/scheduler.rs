//! Output scheduling: one in-flight command, coalesced re-sends and the
//! rumble keep-alive.
//!
//! The scheduler is a plain state machine. It performs no I/O and no locking;
//! the session keeps it behind a mutex and calls the transport with the lock
//! released, so producers arriving mid-send see `busy` and coalesce into
//! `pending`.
//!
//! ```text
//! submit (idle)  -> write, busy, Transmission
//! submit (busy)  -> write, pending
//! poll   (busy)  -> nothing
//! poll   (idle)  -> keep-alive check; if pending: busy, Transmission
//! complete       -> idle
//! ```

use std::time::{Duration, Instant};

use bluepad_hid_ds4_protocol::{COMMAND_LEN, CommandBuffer};

/// An active rumble is re-sent once this much time passes without a send.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_millis(500);

/// Owned copy of the command buffer taken at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    bytes: [u8; COMMAND_LEN],
}

impl Transmission {
    pub fn as_bytes(&self) -> &[u8; COMMAND_LEN] {
        &self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct OutputScheduler {
    buffer: CommandBuffer,
    busy: bool,
    pending: bool,
    last_send: Instant,
}

impl OutputScheduler {
    pub fn new(buffer: CommandBuffer, now: Instant) -> Self {
        Self {
            buffer,
            busy: false,
            pending: false,
            last_send: now,
        }
    }

    pub fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    /// Direct buffer access for feedback writes; pair with [`Self::mark_pending`].
    pub fn buffer_mut(&mut self) -> &mut CommandBuffer {
        &mut self.buffer
    }

    /// Mutation path: apply `mutate`, then send now if idle or defer if busy.
    pub fn submit(
        &mut self,
        now: Instant,
        mutate: impl FnOnce(&mut CommandBuffer),
    ) -> Option<Transmission> {
        mutate(&mut self.buffer);
        if self.busy {
            self.pending = true;
            None
        } else {
            Some(self.begin(now))
        }
    }

    /// Flag the buffer as changed without sending.
    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Tick path: flush pending changes, re-arming an active rumble first when
    /// the keep-alive window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Transmission> {
        if self.busy {
            return None;
        }
        if self.buffer.rumble_active()
            && now.saturating_duration_since(self.last_send) >= KEEP_ALIVE_INTERVAL
        {
            self.pending = true;
        }
        if self.pending {
            Some(self.begin(now))
        } else {
            None
        }
    }

    /// The transport call for the last [`Transmission`] has returned.
    pub fn complete(&mut self) {
        self.busy = false;
    }

    pub fn reset_last_send(&mut self, now: Instant) {
        self.last_send = now;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_send(&self) -> Instant {
        self.last_send
    }

    fn begin(&mut self, now: Instant) -> Transmission {
        self.busy = true;
        self.pending = false;
        self.last_send = now;
        Transmission {
            bytes: *self.buffer.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(now: Instant) -> OutputScheduler {
        OutputScheduler::new(CommandBuffer::default(), now)
    }

    #[test]
    fn test_submit_while_idle_sends() {
        let now = Instant::now();
        let mut sched = scheduler(now);
        let sent = sched.submit(now, |buf| buf.set_rumble(10, 20));
        assert!(sched.is_busy());
        assert_eq!(sent.map(|t| t.as_bytes()[8]), Some(10));
    }

    #[test]
    fn test_submit_while_busy_coalesces() {
        let now = Instant::now();
        let mut sched = scheduler(now);
        assert!(sched.submit(now, |buf| buf.set_rumble(1, 1)).is_some());
        for level in 2..10 {
            assert!(sched.submit(now, |buf| buf.set_rumble(level, level)).is_none());
        }
        assert!(sched.is_pending());
        assert!(sched.poll(now).is_none(), "busy blocks the flush");

        sched.complete();
        let flushed = sched.poll(now);
        assert_eq!(flushed.map(|t| t.as_bytes()[8]), Some(9));
        sched.complete();
        assert!(sched.poll(now).is_none());
    }

    #[test]
    fn test_keep_alive_window() {
        let t = Instant::now();
        let mut sched = scheduler(t);
        assert!(sched.submit(t, |buf| buf.set_rumble(0, 0x40)).is_some());
        sched.complete();

        assert!(sched.poll(t + Duration::from_millis(499)).is_none());
        assert!(sched.poll(t + Duration::from_millis(500)).is_some());
        sched.complete();
        assert!(sched.poll(t + Duration::from_millis(600)).is_none());
    }

    #[test]
    fn test_no_keep_alive_when_motors_off() {
        let t = Instant::now();
        let mut sched = scheduler(t);
        assert!(sched.poll(t + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_mark_pending_flushes_once() {
        let t = Instant::now();
        let mut sched = scheduler(t);
        sched.mark_pending();
        sched.mark_pending();
        assert!(sched.poll(t).is_some());
        sched.complete();
        assert!(sched.poll(t).is_none());
        assert_eq!(sched.last_send(), t);
    }
}
