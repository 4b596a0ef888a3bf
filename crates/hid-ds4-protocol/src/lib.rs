//! DualShock 4 Bluetooth HID protocol: input decoding, command layout and
//! service-discovery handshake payloads.
//!
//! This crate is intentionally I/O-free and allocation-free. It provides pure
//! functions and fixed-size types that can be tested without hardware; all
//! session state (packet counters, scheduling, locking) lives in
//! `bluepad-session`.
//!
//! # Wire overview
//!
//! Incoming reports are raw L2CAP frames as delivered by the radio transport.
//! The DS4 extended input report (`0x11`) starts at byte 9, preceded by the
//! 8-byte ACL/L2CAP header and the `0xA1` HIDP transaction byte. Outbound
//! commands are a fixed 79-byte `0xA2 0x11 ...` frame, see [`output`].

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod input;
pub mod output;
pub mod sdp;

pub use ids::{
    channel_ids, is_dualshock4, product_ids, product_name, report_ids, SONY_VENDOR_ID,
};
pub use input::{
    apply_quick_disconnect, parse_input_report, BatteryLevel, Buttons, HatDirection,
    InputSnapshot, StickPosition, MIN_INPUT_REPORT_LEN, NORMALIZED_REPORT_LEN,
};
pub use output::{
    CommandBuffer, LightbarColor, UpdateRate, COMMAND_LEN, LOW_BATTERY_FLASH_INTERVAL,
};
pub use sdp::HANDSHAKE_FRAGMENTS;

use thiserror::Error;

/// Errors produced while decoding DualShock 4 reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ds4ProtocolError {
    #[error("report too short: got {got} bytes, need {need}")]
    TooShort { got: usize, need: usize },

    #[error("unexpected report id {got:#04x}")]
    UnexpectedReportId { got: u8 },
}

pub type Ds4ProtocolResult<T> = Result<T, Ds4ProtocolError>;
