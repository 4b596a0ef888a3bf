//! Seams to the radio transport and the input consumer.
//!
//! The session never talks to a Bluetooth stack directly: commands go out
//! through [`Transport::send_command`] and decoded snapshots are pushed into an
//! [`InputSink`].

use bluepad_hid_ds4_protocol::{InputSnapshot, channel_ids};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection handle allocated by the transport for one paired controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle(pub u16);

/// L2CAP channel a payload is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    ServiceDiscovery,
    HidControl,
    HidInterrupt,
}

impl Channel {
    /// Channel identifier on the wire.
    pub const fn id(self) -> u16 {
        match self {
            Self::ServiceDiscovery => channel_ids::SERVICE_DISCOVERY,
            Self::HidControl => channel_ids::HID_CONTROL,
            Self::HidInterrupt => channel_ids::HID_INTERRUPT,
        }
    }
}

/// Link state as tracked by the device lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Errors reported by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Device disconnected")]
    Disconnected,

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Fire-and-forget command primitive provided by the radio stack.
///
/// Implementations must return once the payload has been handed off; the
/// session clears its busy flag as soon as this call returns.
pub trait Transport: Send + Sync {
    /// Queue `payload` on `channel` of the connection `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload could not be handed to the link.
    fn send_command(
        &self,
        handle: DeviceHandle,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

/// Consumer of decoded input snapshots.
pub trait InputSink: Send + Sync {
    /// Take ownership of one snapshot. Called synchronously per report.
    fn publish(&self, snapshot: InputSnapshot);
}

impl<F> InputSink for F
where
    F: Fn(InputSnapshot) + Send + Sync,
{
    fn publish(&self, snapshot: InputSnapshot) {
        self(snapshot);
    }
}

/// Recording doubles for tests and simulators.
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// One payload captured by [`RecordingTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentCommand {
        pub handle: DeviceHandle,
        pub channel: Channel,
        pub payload: Vec<u8>,
    }

    /// Transport that records every payload. Clones share the same history.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingTransport {
        history: Arc<Mutex<Vec<SentCommand>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent sends fail with [`TransportError::Disconnected`].
        /// Failed sends are not recorded.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn history(&self) -> Vec<SentCommand> {
            self.history.lock().clone()
        }

        /// Payloads sent on `channel`, in order.
        pub fn payloads_on(&self, channel: Channel) -> Vec<Vec<u8>> {
            self.history
                .lock()
                .iter()
                .filter(|cmd| cmd.channel == channel)
                .map(|cmd| cmd.payload.clone())
                .collect()
        }

        pub fn count_on(&self, channel: Channel) -> usize {
            self.history
                .lock()
                .iter()
                .filter(|cmd| cmd.channel == channel)
                .count()
        }

        pub fn clear(&self) {
            self.history.lock().clear();
        }
    }

    impl Transport for RecordingTransport {
        fn send_command(
            &self,
            handle: DeviceHandle,
            channel: Channel,
            payload: &[u8],
        ) -> Result<(), TransportError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(TransportError::Disconnected);
            }
            self.history.lock().push(SentCommand {
                handle,
                channel,
                payload: payload.to_vec(),
            });
            Ok(())
        }
    }

    /// Sink that keeps every published snapshot. Clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        snapshots: Arc<Mutex<Vec<InputSnapshot>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn snapshots(&self) -> Vec<InputSnapshot> {
            self.snapshots.lock().clone()
        }

        pub fn last(&self) -> Option<InputSnapshot> {
            self.snapshots.lock().last().cloned()
        }

        pub fn len(&self) -> usize {
            self.snapshots.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.snapshots.lock().is_empty()
        }
    }

    impl InputSink for RecordingSink {
        fn publish(&self, snapshot: InputSnapshot) {
            self.snapshots.lock().push(snapshot);
        }
    }
}
