//! Session driver for a DualShock 4 paired over Bluetooth.
//!
//! One [`Ds4Session`] per connected controller. It replays the
//! service-discovery handshake, decodes raw input reports into
//! [`InputSnapshot`](bluepad_hid_ds4_protocol::InputSnapshot)s for an
//! [`InputSink`], and schedules rumble and light bar commands through a
//! [`Transport`] with at most one command in flight.
//!
//! ```text
//! raw report -> InputDecoder -> InputSink
//! tick / rumble -> FeedbackState / CommandBuffer -> OutputScheduler -> Transport
//! ```
//!
//! # Example
//!
//! ```rust
//! use bluepad_session::prelude::*;
//! use bluepad_session::transport::mock::{RecordingSink, RecordingTransport};
//!
//! let transport = RecordingTransport::new();
//! let session = Ds4Session::new(
//!     DeviceHandle(1),
//!     transport.clone(),
//!     SessionConfig::default(),
//!     RecordingSink::new(),
//! );
//! session.start();
//! while !session.advance_handshake() {}
//! session.assign_player_slot(Some(1));
//! session.rumble(0x80, 0x20);
//! assert!(session.accepts_commands());
//! assert_eq!(session.command_buffer().rumble(), (0x80, 0x20));
//! ```

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod feedback;
pub mod handshake;
pub mod prelude;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod transport;

pub use config::{ConfigSource, SessionConfig, SessionConfigBuilder, SharedConfig};
pub use decoder::{Decoded, GestureState, IdleState, InputDecoder};
pub use error::{SessionError, SessionResult};
pub use feedback::FeedbackState;
pub use handshake::{Handshake, HandshakeStep};
pub use scheduler::{KEEP_ALIVE_INTERVAL, OutputScheduler, Transmission};
pub use session::Ds4Session;
pub use stats::{SessionStats, StatsSnapshot};
pub use transport::{Channel, ConnectionState, DeviceHandle, InputSink, Transport, TransportError};
