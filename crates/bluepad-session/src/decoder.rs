//! Stateful input decoding: packet counter, idle tracking and the
//! quick-disconnect gesture on top of the pure protocol parser.

use std::time::{Duration, Instant};

use bluepad_hid_ds4_protocol::{
    Ds4ProtocolResult, InputSnapshot, apply_quick_disconnect, parse_input_report,
};

/// Inactivity tracking for an externally owned idle timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdleState {
    pub idle: bool,
    /// When the pad last went from active to idle.
    pub since: Option<Instant>,
}

/// Quick-disconnect chord tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    pub active: bool,
    /// When the chord was first seen held.
    pub since: Option<Instant>,
}

impl GestureState {
    /// How long the chord has been held, if it is held.
    pub fn held_for(&self, now: Instant) -> Option<Duration> {
        if !self.active {
            return None;
        }
        self.since.map(|since| now.saturating_duration_since(since))
    }
}

/// One decoded report plus whether the disconnect chord was held in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub snapshot: InputSnapshot,
    pub quick_disconnect: bool,
}

#[derive(Debug, Default)]
pub struct InputDecoder {
    packet_counter: u64,
    idle: IdleState,
    gesture: GestureState,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one raw report received at `now`.
    ///
    /// Rejected reports leave the counter, idle and gesture state untouched.
    ///
    /// # Errors
    ///
    /// Returns the protocol error for short or foreign reports.
    pub fn decode(&mut self, raw: &[u8], now: Instant) -> Ds4ProtocolResult<Decoded> {
        let mut snapshot = parse_input_report(raw)?;

        self.packet_counter = self.packet_counter.wrapping_add(1);
        snapshot.packet_counter = self.packet_counter;

        let quick_disconnect = apply_quick_disconnect(&mut snapshot);

        if snapshot.is_pad_active() {
            self.idle.idle = false;
        } else if !self.idle.idle {
            self.idle = IdleState {
                idle: true,
                since: Some(now),
            };
        }

        match (quick_disconnect, self.gesture.active) {
            (true, false) => {
                tracing::debug!(packet = self.packet_counter, "quick-disconnect chord held");
                self.gesture = GestureState {
                    active: true,
                    since: Some(now),
                };
            }
            (false, true) => {
                tracing::debug!(packet = self.packet_counter, "quick-disconnect chord released");
                self.gesture = GestureState::default();
            }
            _ => {}
        }

        Ok(Decoded {
            snapshot,
            quick_disconnect,
        })
    }

    pub fn packet_counter(&self) -> u64 {
        self.packet_counter
    }

    pub fn idle_state(&self) -> IdleState {
        self.idle
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture
    }
}
