//! Convenience re-exports for session users.

pub use crate::config::{ConfigSource, SessionConfig, SessionConfigBuilder, SharedConfig};
pub use crate::decoder::{GestureState, IdleState};
pub use crate::error::{SessionError, SessionResult};
pub use crate::session::Ds4Session;
pub use crate::stats::StatsSnapshot;
pub use crate::transport::{
    Channel, ConnectionState, DeviceHandle, InputSink, Transport, TransportError,
};
pub use bluepad_hid_ds4_protocol::{BatteryLevel, Buttons, InputSnapshot, UpdateRate};
