//! Drip-fed service-discovery handshake.
//!
//! One fragment goes out per call so each call maps onto one transport round
//! trip instead of a blocking bulk send.

use bluepad_hid_ds4_protocol::HANDSHAKE_FRAGMENTS;

/// Result of one [`Handshake::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Transmit this fragment now.
    Fragment(&'static [u8]),
    /// Every fragment has been handed out.
    Complete,
}

/// Cursor over an ordered, immutable fragment list.
///
/// The cursor runs from 0 to `len + 1`: the call that finds it at `len`
/// reports completion and moves it one past the end, where it stays.
#[derive(Debug, Clone)]
pub struct Handshake {
    fragments: &'static [&'static [u8]],
    cursor: usize,
}

impl Handshake {
    pub fn new(fragments: &'static [&'static [u8]]) -> Self {
        Self {
            fragments,
            cursor: 0,
        }
    }

    /// Hand out the next fragment, or report completion.
    pub fn advance(&mut self) -> HandshakeStep {
        if let Some(fragment) = self.fragments.get(self.cursor) {
            self.cursor += 1;
            return HandshakeStep::Fragment(fragment);
        }
        if self.cursor == self.fragments.len() {
            self.cursor += 1;
        } else {
            tracing::debug!(cursor = self.cursor, "handshake already complete");
        }
        HandshakeStep::Complete
    }

    pub fn is_complete(&self) -> bool {
        self.cursor > self.fragments.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new(&HANDSHAKE_FRAGMENTS)
    }
}
