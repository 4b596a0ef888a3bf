//! DualShock 4 command buffer layout.
//!
//! All functions are pure and allocation-free.
//!
//! # Protocol notes
//!
//! Output travels on the HID interrupt channel as a 79-byte frame: the HIDP
//! `DATA | OUTPUT` header followed by the 78-byte extended report `0x11`.
//!
//! ```text
//! Byte 0:      0xA2 (HIDP header)
//! Byte 1:      0x11 (report ID)
//! Byte 2:      0x80 | poll interval (input update rate)
//! Byte 4:      feature enable mask (rumble, light bar, flash)
//! Byte 7:      small (right, high-frequency) motor
//! Byte 8:      large (left, low-frequency) motor
//! Bytes 9–11:  light bar R, G, B
//! Bytes 12–13: flash on / flash off duration (10 ms units)
//! Remaining:   reserved, zero
//! ```
//!
//! The frame is built once per session and mutated in place; only byte values
//! change, never the length.

#![deny(static_mut_refs)]

use serde::{Deserialize, Serialize};

use crate::ids::report_ids;

/// Wire size of the outbound command frame.
pub const COMMAND_LEN: usize = 79;

/// Byte offsets inside the command frame.
pub mod offsets {
    pub const TRANSACTION_HEADER: usize = 0;
    pub const REPORT_ID: usize = 1;
    pub const UPDATE_RATE: usize = 2;
    pub const FEATURE_FLAGS: usize = 4;
    pub const RUMBLE_SMALL: usize = 7;
    pub const RUMBLE_LARGE: usize = 8;
    pub const LIGHTBAR_RED: usize = 9;
    pub const LIGHTBAR_GREEN: usize = 10;
    pub const LIGHTBAR_BLUE: usize = 11;
    pub const FLASH_ON: usize = 12;
    pub const FLASH_OFF: usize = 13;
}

/// Enables rumble, light bar and flash fields in every command.
pub const FEATURE_FLAGS: u8 = 0xF7;

/// On/off duration written to both flash bytes while the battery is low.
pub const LOW_BATTERY_FLASH_INTERVAL: u8 = 0x40;

/// Input report rate requested from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRate {
    Fastest,
    #[default]
    Fast,
    Slow,
    Slowest,
}

impl UpdateRate {
    /// Value of the update-rate byte.
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Fastest => 0x80,
            Self::Fast => 0x84,
            Self::Slow => 0x88,
            Self::Slowest => 0x90,
        }
    }

    /// Nominal poll interval in milliseconds (0 = as fast as the link allows).
    pub const fn interval_ms(self) -> u8 {
        self.as_byte() & 0x3F
    }
}

/// Light bar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LightbarColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LightbarColor {
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color for an assigned player slot.
    ///
    /// `brightness` is used as-is for the slot's channel(s), everything else
    /// stays at zero: 1 blue, 2 green, 3 yellow, 4 cyan, unassigned red.
    pub const fn for_player_slot(slot: Option<u8>, brightness: u8) -> Self {
        match slot {
            Some(1) => Self::new(0, 0, brightness),
            Some(2) => Self::new(0, brightness, 0),
            Some(3) => Self::new(brightness, brightness, 0),
            Some(4) => Self::new(0, brightness, brightness),
            _ => Self::new(brightness, 0, 0),
        }
    }
}

/// The mutable outbound command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuffer {
    bytes: [u8; COMMAND_LEN],
}

impl CommandBuffer {
    /// Build the fixed template with the given update rate, motors stopped and
    /// light bar off.
    pub fn new(rate: UpdateRate) -> Self {
        let mut bytes = [0u8; COMMAND_LEN];
        bytes[offsets::TRANSACTION_HEADER] = report_ids::HIDP_DATA_OUTPUT;
        bytes[offsets::REPORT_ID] = report_ids::EXTENDED;
        bytes[offsets::UPDATE_RATE] = rate.as_byte();
        bytes[offsets::FEATURE_FLAGS] = FEATURE_FLAGS;
        Self { bytes }
    }

    pub fn set_update_rate(&mut self, rate: UpdateRate) {
        self.bytes[offsets::UPDATE_RATE] = rate.as_byte();
    }

    pub fn update_rate_byte(&self) -> u8 {
        self.bytes[offsets::UPDATE_RATE]
    }

    /// Write both motor intensities.
    pub fn set_rumble(&mut self, large: u8, small: u8) {
        self.bytes[offsets::RUMBLE_LARGE] = large;
        self.bytes[offsets::RUMBLE_SMALL] = small;
    }

    /// Current `(large, small)` motor intensities.
    pub fn rumble(&self) -> (u8, u8) {
        (
            self.bytes[offsets::RUMBLE_LARGE],
            self.bytes[offsets::RUMBLE_SMALL],
        )
    }

    /// Whether either motor is currently commanded on.
    pub fn rumble_active(&self) -> bool {
        let (large, small) = self.rumble();
        large != 0 || small != 0
    }

    /// Write the light bar color; returns `true` if any byte changed.
    pub fn set_lightbar(&mut self, color: LightbarColor) -> bool {
        let changed = self.lightbar() != color;
        self.bytes[offsets::LIGHTBAR_RED] = color.r;
        self.bytes[offsets::LIGHTBAR_GREEN] = color.g;
        self.bytes[offsets::LIGHTBAR_BLUE] = color.b;
        changed
    }

    pub fn lightbar(&self) -> LightbarColor {
        LightbarColor::new(
            self.bytes[offsets::LIGHTBAR_RED],
            self.bytes[offsets::LIGHTBAR_GREEN],
            self.bytes[offsets::LIGHTBAR_BLUE],
        )
    }

    /// Write the same duration to both flash bytes; returns `true` if any byte changed.
    pub fn set_flash(&mut self, interval: u8) -> bool {
        let changed = self.flash() != (interval, interval);
        self.bytes[offsets::FLASH_ON] = interval;
        self.bytes[offsets::FLASH_OFF] = interval;
        changed
    }

    /// Current `(on, off)` flash durations.
    pub fn flash(&self) -> (u8, u8) {
        (
            self.bytes[offsets::FLASH_ON],
            self.bytes[offsets::FLASH_OFF],
        )
    }

    pub fn as_bytes(&self) -> &[u8; COMMAND_LEN] {
        &self.bytes
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(UpdateRate::default())
    }
}
