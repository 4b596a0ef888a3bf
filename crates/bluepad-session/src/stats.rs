//! Session counters.
//!
//! All counters use `Ordering::Relaxed`; they are diagnostics and carry no
//! synchronization duties.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Input reports decoded and published.
    pub reports_decoded: u64,
    /// Input reports rejected by the decoder.
    pub reports_rejected: u64,
    /// Command buffers handed to the transport.
    pub commands_sent: u64,
    /// Handshake fragments handed to the transport.
    pub handshake_fragments_sent: u64,
    /// Transport calls that returned an error.
    pub transport_errors: u64,
    /// Mutations folded into a pending re-send because a send was in flight.
    pub coalesced_writes: u64,
    /// Ticks that found the output lock held and did nothing.
    pub ticks_skipped: u64,
}

#[derive(Debug, Default)]
pub struct SessionStats {
    reports_decoded: AtomicU64,
    reports_rejected: AtomicU64,
    commands_sent: AtomicU64,
    handshake_fragments_sent: AtomicU64,
    transport_errors: AtomicU64,
    coalesced_writes: AtomicU64,
    ticks_skipped: AtomicU64,
}

impl SessionStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports_decoded: AtomicU64::new(0),
            reports_rejected: AtomicU64::new(0),
            commands_sent: AtomicU64::new(0),
            handshake_fragments_sent: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            coalesced_writes: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn inc_report_decoded(&self) {
        self.reports_decoded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_report_rejected(&self) {
        self.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_handshake_fragment_sent(&self) {
        self.handshake_fragments_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_coalesced_write(&self) {
        self.coalesced_writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_tick_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reports_decoded: self.reports_decoded.load(Ordering::Relaxed),
            reports_rejected: self.reports_rejected.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            handshake_fragments_sent: self.handshake_fragments_sent.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            coalesced_writes: self.coalesced_writes.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_increments() {
        let stats = SessionStats::new();
        stats.inc_command_sent();
        stats.inc_command_sent();
        stats.inc_tick_skipped();
        stats.inc_report_rejected();

        let snap = stats.snapshot();
        assert_eq!(snap.commands_sent, 2);
        assert_eq!(snap.ticks_skipped, 1);
        assert_eq!(snap.reports_rejected, 1);
        assert_eq!(snap.reports_decoded, 0);
    }

    #[test]
    fn test_snapshot_serializes() -> Result<(), serde_json::Error> {
        let snap = StatsSnapshot {
            coalesced_writes: 3,
            ..StatsSnapshot::default()
        };
        let json = serde_json::to_string(&snap)?;
        assert!(json.contains("\"coalesced_writes\":3"));
        Ok(())
    }
}
