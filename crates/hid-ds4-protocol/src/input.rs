//! DualShock 4 extended input report decoding.
//!
//! All functions are pure and allocation-free.
//!
//! # Raw frame layout
//!
//! Offsets are relative to the frame handed over by the radio transport
//! (8-byte ACL/L2CAP header included):
//!
//! | Offset | Field                                                  |
//! |--------|--------------------------------------------------------|
//! | 8      | HIDP header `0xA1`                                     |
//! | 9      | report ID `0x11`                                       |
//! | 10–11  | Bluetooth report flags                                 |
//! | 12–15  | sticks LX, LY, RX, RY (`0x80` = center)                |
//! | 16     | low nibble hat (0–7, 8 = released), high nibble face   |
//! | 17     | L1 R1 L2 R2 Share Options L3 R3                        |
//! | 18     | bit 0 PS, bit 1 touchpad click, bits 2–7 frame counter |
//! | 19–20  | L2 / R2 analog                                         |
//! | 21–40  | timestamp, temperature, gyro, accelerometer            |
//! | 41     | battery                                                |
//! | 42–86  | touchpad fingers and status                            |
//!
//! Bytes 11..=86 are copied verbatim into [`InputSnapshot::report`], which
//! then has the shape of a bare `0x11` report.

#![deny(static_mut_refs)]

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ids::report_ids;
use crate::{Ds4ProtocolError, Ds4ProtocolResult};

/// Raw offset of the report ID byte.
pub const REPORT_ID_OFFSET: usize = 9;
/// Raw offset of the left stick X axis.
pub const LEFT_STICK_X_OFFSET: usize = 12;
/// Raw offset of the left stick Y axis.
pub const LEFT_STICK_Y_OFFSET: usize = 13;
/// Raw offset of the right stick X axis.
pub const RIGHT_STICK_X_OFFSET: usize = 14;
/// Raw offset of the right stick Y axis.
pub const RIGHT_STICK_Y_OFFSET: usize = 15;
/// Raw offset of the hat / face button byte.
pub const HAT_OFFSET: usize = 16;
/// Raw offset of the shoulder / menu button byte.
pub const SHOULDER_OFFSET: usize = 17;
/// Raw offset of the PS / touchpad click byte.
pub const SYSTEM_OFFSET: usize = 18;
/// Raw offset of the L2 analog value.
pub const LEFT_TRIGGER_OFFSET: usize = 19;
/// Raw offset of the R2 analog value.
pub const RIGHT_TRIGGER_OFFSET: usize = 20;
/// Raw offset of the battery byte.
pub const BATTERY_OFFSET: usize = 41;

/// First raw byte of the window copied into the normalized report.
pub const PAYLOAD_START: usize = 11;
/// Last raw byte (inclusive) of the window copied into the normalized report.
pub const PAYLOAD_END: usize = 86;
/// Length of the copied window.
pub const PAYLOAD_LEN: usize = PAYLOAD_END - PAYLOAD_START + 1;

/// Shortest raw frame that carries every decoded field.
pub const MIN_INPUT_REPORT_LEN: usize = PAYLOAD_END + 1;

/// Length of the normalized report carried by [`InputSnapshot`].
pub const NORMALIZED_REPORT_LEN: usize = 78;
/// Slot of the report ID inside the normalized report.
pub const NORMALIZED_REPORT_ID_SLOT: usize = 0;
/// Destination offset of the copied window inside the normalized report.
pub const NORMALIZED_PAYLOAD_OFFSET: usize = 2;

const _: () = assert!(NORMALIZED_PAYLOAD_OFFSET + PAYLOAD_LEN == NORMALIZED_REPORT_LEN);

/// Resting value of every stick axis.
pub const STICK_CENTER: u8 = 0x80;

/// Distance from center (or from zero for triggers) still counted as idle.
///
/// DS4 sticks rarely settle on exactly `0x80`.
pub const STICK_IDLE_TOLERANCE: u8 = 0x10;

const PS_BIT: u8 = 0x01;
const HAT_MASK: u8 = 0x0F;

bitflags! {
    /// Normalized button bitmask.
    ///
    /// Bits 0–13 mirror the controller's own button bits; the d-pad bits are
    /// synthesized from the hat switch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        const SQUARE     = 1 << 0;
        const CROSS      = 1 << 1;
        const CIRCLE     = 1 << 2;
        const TRIANGLE   = 1 << 3;
        const L1         = 1 << 4;
        const R1         = 1 << 5;
        const L2         = 1 << 6;
        const R2         = 1 << 7;
        const SHARE      = 1 << 8;
        const OPTIONS    = 1 << 9;
        const L3         = 1 << 10;
        const R3         = 1 << 11;
        /// System / home button.
        const PS         = 1 << 12;
        const TOUCHPAD   = 1 << 13;
        const DPAD_UP    = 1 << 16;
        const DPAD_RIGHT = 1 << 17;
        const DPAD_DOWN  = 1 << 18;
        const DPAD_LEFT  = 1 << 19;

        /// All directional bits.
        const DPAD = Self::DPAD_UP.bits()
            | Self::DPAD_RIGHT.bits()
            | Self::DPAD_DOWN.bits()
            | Self::DPAD_LEFT.bits();

        /// The quick-disconnect chord: L1 + R1 + PS.
        const QUICK_DISCONNECT = Self::L1.bits() | Self::R1.bits() | Self::PS.bits();
    }
}

/// Hat switch position, clockwise from up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum HatDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    /// Released. The hardware reports 8; anything above 7 lands here.
    #[default]
    Neutral,
}

impl HatDirection {
    /// Decode the hat nibble.
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => Self::Up,
            1 => Self::UpRight,
            2 => Self::Right,
            3 => Self::DownRight,
            4 => Self::Down,
            5 => Self::DownLeft,
            6 => Self::Left,
            7 => Self::UpLeft,
            _ => Self::Neutral,
        }
    }

    /// D-pad bits for this direction.
    pub fn buttons(self) -> Buttons {
        match self {
            Self::Up => Buttons::DPAD_UP,
            Self::UpRight => Buttons::DPAD_UP | Buttons::DPAD_RIGHT,
            Self::Right => Buttons::DPAD_RIGHT,
            Self::DownRight => Buttons::DPAD_RIGHT | Buttons::DPAD_DOWN,
            Self::Down => Buttons::DPAD_DOWN,
            Self::DownLeft => Buttons::DPAD_DOWN | Buttons::DPAD_LEFT,
            Self::Left => Buttons::DPAD_LEFT,
            Self::UpLeft => Buttons::DPAD_LEFT | Buttons::DPAD_UP,
            Self::Neutral => Buttons::empty(),
        }
    }
}

/// Coarse battery level exposed to consumers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum BatteryLevel {
    Dying = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    #[default]
    Full = 4,
}

impl BatteryLevel {
    /// Levels strictly below this one make the light bar flash.
    pub const LOW_THRESHOLD: Self = Self::Medium;

    /// Scale the raw battery byte: `(raw + 2) / 2`, i.e. 1..=128.
    pub const fn scaled(raw: u8) -> u8 {
        raw / 2 + 1
    }

    /// Bucket a scaled level (see [`BatteryLevel::scaled`]).
    pub const fn from_scaled(level: u8) -> Self {
        match level {
            0..=12 => Self::Dying,
            13..=37 => Self::Low,
            38..=63 => Self::Medium,
            64..=102 => Self::High,
            _ => Self::Full,
        }
    }

    /// Decode the raw battery byte.
    pub const fn from_raw(raw: u8) -> Self {
        Self::from_scaled(Self::scaled(raw))
    }

    /// Whether the light bar should flash for this level.
    pub fn is_low(self) -> bool {
        self < Self::LOW_THRESHOLD
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`BatteryLevel::as_u8`]; unknown values saturate to `Full`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dying,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Full,
        }
    }
}

/// Two-axis stick position, `0x00..=0xFF` with `0x80` at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StickPosition {
    pub x: u8,
    pub y: u8,
}

impl StickPosition {
    pub const CENTER: Self = Self {
        x: STICK_CENTER,
        y: STICK_CENTER,
    };

    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Whether both axes sit within `tolerance` of center.
    pub fn is_centered(self, tolerance: u8) -> bool {
        self.x.abs_diff(STICK_CENTER) <= tolerance && self.y.abs_diff(STICK_CENTER) <= tolerance
    }
}

impl Default for StickPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

/// One decoded input report.
///
/// Produced per raw report and handed to the consumer; never retained by the
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Monotonic per-session packet counter (0 until a session stamps it).
    pub packet_counter: u64,
    pub buttons: Buttons,
    pub hat: HatDirection,
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub battery: BatteryLevel,
    /// Normalized `0x11` report: report ID in slot 0, raw bytes 11..=86 from offset 2.
    pub report: [u8; NORMALIZED_REPORT_LEN],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            packet_counter: 0,
            buttons: Buttons::empty(),
            hat: HatDirection::Neutral,
            left_stick: StickPosition::CENTER,
            right_stick: StickPosition::CENTER,
            left_trigger: 0,
            right_trigger: 0,
            battery: BatteryLevel::Full,
            report: [0u8; NORMALIZED_REPORT_LEN],
        }
    }
}

impl InputSnapshot {
    /// Report ID carried in the normalized report.
    pub fn report_id(&self) -> u8 {
        self.report[NORMALIZED_REPORT_ID_SLOT]
    }

    /// Any button held, any stick off center or any trigger pulled.
    pub fn is_pad_active(&self) -> bool {
        !self.buttons.is_empty()
            || !self.left_stick.is_centered(STICK_IDLE_TOLERANCE)
            || !self.right_stick.is_centered(STICK_IDLE_TOLERANCE)
            || self.left_trigger > STICK_IDLE_TOLERANCE
            || self.right_trigger > STICK_IDLE_TOLERANCE
    }
}

/// Decode a raw extended input frame.
///
/// Frames shorter than [`MIN_INPUT_REPORT_LEN`] are rejected rather than read
/// out of bounds; bytes beyond that length are ignored.
pub fn parse_input_report(data: &[u8]) -> Ds4ProtocolResult<InputSnapshot> {
    let raw: &[u8; MIN_INPUT_REPORT_LEN] = data
        .get(..MIN_INPUT_REPORT_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(Ds4ProtocolError::TooShort {
            got: data.len(),
            need: MIN_INPUT_REPORT_LEN,
        })?;

    let report_id = raw[REPORT_ID_OFFSET];
    if report_id != report_ids::EXTENDED {
        return Err(Ds4ProtocolError::UnexpectedReportId { got: report_id });
    }

    let battery = BatteryLevel::from_raw(raw[BATTERY_OFFSET]);

    let hat_byte = raw[HAT_OFFSET];
    let face = u32::from(hat_byte >> 4);
    let shoulder = u32::from(raw[SHOULDER_OFFSET]);
    let system = u32::from(raw[SYSTEM_OFFSET] & 0x03);
    let mut buttons = Buttons::from_bits_truncate(face | (shoulder << 4) | (system << 12));

    // The hat field has no release bit of its own: clear first, then apply.
    let hat = HatDirection::from_raw(hat_byte & HAT_MASK);
    buttons.remove(Buttons::DPAD);
    buttons.insert(hat.buttons());

    let mut report = [0u8; NORMALIZED_REPORT_LEN];
    report[NORMALIZED_REPORT_ID_SLOT] = report_id;
    report[NORMALIZED_PAYLOAD_OFFSET..].copy_from_slice(&raw[PAYLOAD_START..=PAYLOAD_END]);

    Ok(InputSnapshot {
        packet_counter: 0,
        buttons,
        hat,
        left_stick: StickPosition::new(raw[LEFT_STICK_X_OFFSET], raw[LEFT_STICK_Y_OFFSET]),
        right_stick: StickPosition::new(raw[RIGHT_STICK_X_OFFSET], raw[RIGHT_STICK_Y_OFFSET]),
        left_trigger: raw[LEFT_TRIGGER_OFFSET],
        right_trigger: raw[RIGHT_TRIGGER_OFFSET],
        battery,
        report,
    })
}

/// Detect the quick-disconnect chord and hide PS from the snapshot.
///
/// Returns `true` when L1, R1 and PS are all held. PS is then cleared both in
/// [`InputSnapshot::buttons`] and in the normalized report so consumers never
/// see it as an ordinary press.
pub fn apply_quick_disconnect(snapshot: &mut InputSnapshot) -> bool {
    if !snapshot.buttons.contains(Buttons::QUICK_DISCONNECT) {
        return false;
    }
    snapshot.buttons.remove(Buttons::PS);
    let system_slot = SYSTEM_OFFSET - PAYLOAD_START + NORMALIZED_PAYLOAD_OFFSET;
    if let Some(byte) = snapshot.report.get_mut(system_slot) {
        *byte &= !PS_BIT;
    }
    true
}

/// Build a well-formed idle frame: report ID set, sticks centered, hat
/// released, battery full.
///
/// Used by fixtures and simulators as a base to patch individual fields into.
pub fn neutral_raw_report() -> [u8; MIN_INPUT_REPORT_LEN] {
    let mut raw = [0u8; MIN_INPUT_REPORT_LEN];
    raw[8] = report_ids::HIDP_DATA_INPUT;
    raw[REPORT_ID_OFFSET] = report_ids::EXTENDED;
    raw[10] = 0xC0;
    raw[LEFT_STICK_X_OFFSET] = STICK_CENTER;
    raw[LEFT_STICK_Y_OFFSET] = STICK_CENTER;
    raw[RIGHT_STICK_X_OFFSET] = STICK_CENTER;
    raw[RIGHT_STICK_Y_OFFSET] = STICK_CENTER;
    raw[HAT_OFFSET] = 0x08;
    raw[BATTERY_OFFSET] = 0xFF;
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn with_hat(value: u8) -> [u8; MIN_INPUT_REPORT_LEN] {
        let mut raw = neutral_raw_report();
        raw[HAT_OFFSET] = value;
        raw
    }

    #[test]
    fn test_hat_table() -> TestResult {
        let expected = [
            Buttons::DPAD_UP,
            Buttons::DPAD_UP | Buttons::DPAD_RIGHT,
            Buttons::DPAD_RIGHT,
            Buttons::DPAD_RIGHT | Buttons::DPAD_DOWN,
            Buttons::DPAD_DOWN,
            Buttons::DPAD_DOWN | Buttons::DPAD_LEFT,
            Buttons::DPAD_LEFT,
            Buttons::DPAD_LEFT | Buttons::DPAD_UP,
        ];
        for (value, dpad) in (0u8..).zip(expected) {
            let snapshot = parse_input_report(&with_hat(value))?;
            assert_eq!(snapshot.buttons & Buttons::DPAD, dpad, "hat value {value}");
        }
        Ok(())
    }

    #[test]
    fn test_hat_released_sets_no_direction() -> TestResult {
        for value in 8u8..=15 {
            let snapshot = parse_input_report(&with_hat(value))?;
            assert_eq!(snapshot.hat, HatDirection::Neutral);
            assert!((snapshot.buttons & Buttons::DPAD).is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_face_buttons_do_not_leak_into_dpad() -> TestResult {
        // Triangle + square held, hat released.
        let snapshot = parse_input_report(&with_hat(0x98))?;
        assert_eq!(snapshot.buttons, Buttons::SQUARE | Buttons::TRIANGLE);
        Ok(())
    }

    #[test]
    fn test_shoulder_and_system_bits() -> TestResult {
        let mut raw = neutral_raw_report();
        raw[SHOULDER_OFFSET] = 0b0000_0011;
        raw[SYSTEM_OFFSET] = 0b1111_1101; // frame counter + PS
        let snapshot = parse_input_report(&raw)?;
        assert_eq!(
            snapshot.buttons,
            Buttons::L1 | Buttons::R1 | Buttons::PS
        );
        Ok(())
    }

    #[test]
    fn test_battery_examples() {
        assert_eq!(BatteryLevel::scaled(0), 1);
        assert_eq!(BatteryLevel::scaled(254), 128);
        assert_eq!(BatteryLevel::scaled(255), 128);
        assert_eq!(BatteryLevel::from_raw(254), BatteryLevel::Full);
        assert_eq!(BatteryLevel::from_raw(0), BatteryLevel::Dying);
        assert!(BatteryLevel::Low.is_low());
        assert!(!BatteryLevel::Medium.is_low());
    }

    #[test]
    fn test_battery_u8_roundtrip() {
        for level in [
            BatteryLevel::Dying,
            BatteryLevel::Low,
            BatteryLevel::Medium,
            BatteryLevel::High,
            BatteryLevel::Full,
        ] {
            assert_eq!(BatteryLevel::from_u8(level.as_u8()), level);
        }
    }

    #[test]
    fn test_too_short() {
        let err = parse_input_report(&[0u8; 41]).err();
        assert_eq!(
            err,
            Some(Ds4ProtocolError::TooShort {
                got: 41,
                need: MIN_INPUT_REPORT_LEN
            })
        );
    }

    #[test]
    fn test_wrong_report_id() {
        let mut raw = neutral_raw_report();
        raw[REPORT_ID_OFFSET] = 0x01;
        assert_eq!(
            parse_input_report(&raw).err(),
            Some(Ds4ProtocolError::UnexpectedReportId { got: 0x01 })
        );
    }

    #[test]
    fn test_payload_window_copied() -> TestResult {
        let mut raw = neutral_raw_report();
        raw[PAYLOAD_START] = 0x5A;
        raw[PAYLOAD_END] = 0xA5;
        let snapshot = parse_input_report(&raw)?;
        assert_eq!(snapshot.report_id(), report_ids::EXTENDED);
        assert_eq!(snapshot.report[NORMALIZED_PAYLOAD_OFFSET], 0x5A);
        assert_eq!(snapshot.report[NORMALIZED_REPORT_LEN - 1], 0xA5);
        assert_eq!(snapshot.report[1], 0);
        Ok(())
    }

    #[test]
    fn test_quick_disconnect_clears_ps() -> TestResult {
        let mut raw = neutral_raw_report();
        raw[SHOULDER_OFFSET] = 0b0000_0011;
        raw[SYSTEM_OFFSET] = 0x01;
        let mut snapshot = parse_input_report(&raw)?;
        assert!(apply_quick_disconnect(&mut snapshot));
        assert!(!snapshot.buttons.contains(Buttons::PS));
        assert!(snapshot.buttons.contains(Buttons::L1 | Buttons::R1));
        assert_eq!(snapshot.report[9] & PS_BIT, 0);
        Ok(())
    }

    #[test]
    fn test_partial_chord_leaves_ps() -> TestResult {
        let mut raw = neutral_raw_report();
        raw[SHOULDER_OFFSET] = 0b0000_0001; // L1 only
        raw[SYSTEM_OFFSET] = 0x01;
        let mut snapshot = parse_input_report(&raw)?;
        assert!(!apply_quick_disconnect(&mut snapshot));
        assert!(snapshot.buttons.contains(Buttons::PS));
        Ok(())
    }

    #[test]
    fn test_pad_activity() -> TestResult {
        let idle = parse_input_report(&neutral_raw_report())?;
        assert!(!idle.is_pad_active());

        let mut raw = neutral_raw_report();
        raw[LEFT_STICK_X_OFFSET] = 0x84; // within tolerance
        assert!(!parse_input_report(&raw)?.is_pad_active());

        raw[LEFT_STICK_X_OFFSET] = 0xF0;
        assert!(parse_input_report(&raw)?.is_pad_active());

        let mut raw = neutral_raw_report();
        raw[RIGHT_TRIGGER_OFFSET] = 0xFF;
        assert!(parse_input_report(&raw)?.is_pad_active());
        Ok(())
    }
}
