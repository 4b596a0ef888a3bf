//! DualShock 4 USB/Bluetooth identifiers, report IDs and L2CAP channels.
//!
//! ## Verification status
//!
//! VID/PID values match the Linux kernel `hid-ids.h`
//! (`USB_VENDOR_ID_SONY = 0x054c`,
//! `USB_DEVICE_ID_SONY_PS4_CONTROLLER = 0x05c4`,
//! `USB_DEVICE_ID_SONY_PS4_CONTROLLER_2 = 0x09cc`,
//! `USB_DEVICE_ID_SONY_PS4_CONTROLLER_DONGLE = 0x0ba0`).
//! The controller reports the same IDs in its Device ID SDP record when
//! paired over Bluetooth.

#![deny(static_mut_refs)]

/// Sony Interactive Entertainment vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

/// Known DualShock 4 product IDs.
pub mod product_ids {
    /// First-generation DualShock 4 (CUH-ZCT1).
    pub const DS4_V1: u16 = 0x05C4;
    /// Second-generation DualShock 4 (CUH-ZCT2, light bar visible through the touchpad).
    pub const DS4_V2: u16 = 0x09CC;
    /// Sony wireless USB adapter presenting a DS4.
    pub const DS4_WIRELESS_ADAPTER: u16 = 0x0BA0;
}

/// Report identifiers and HIDP transaction headers.
pub mod report_ids {
    /// HIDP `DATA | INPUT` transaction header preceding every input report.
    pub const HIDP_DATA_INPUT: u8 = 0xA1;
    /// HIDP `DATA | OUTPUT` transaction header preceding every output report.
    pub const HIDP_DATA_OUTPUT: u8 = 0xA2;
    /// Extended Bluetooth input/output report (full sensor data, light bar, rumble).
    pub const EXTENDED: u8 = 0x11;
}

/// L2CAP channel identifiers handed to the transport's `send_command`.
pub mod channel_ids {
    /// Service discovery (SDP) channel, used only by the handshake.
    pub const SERVICE_DISCOVERY: u16 = 0x0001;
    /// HID control channel.
    pub const HID_CONTROL: u16 = 0x0011;
    /// HID interrupt channel, carries input reports and output commands.
    pub const HID_INTERRUPT: u16 = 0x0013;
}

/// Returns `true` if the VID/PID pair identifies a DualShock 4.
pub fn is_dualshock4(vid: u16, pid: u16) -> bool {
    vid == SONY_VENDOR_ID
        && matches!(
            pid,
            product_ids::DS4_V1 | product_ids::DS4_V2 | product_ids::DS4_WIRELESS_ADAPTER
        )
}

/// Returns the product name for a known DualShock 4 PID, or `None`.
pub fn product_name(pid: u16) -> Option<&'static str> {
    match pid {
        product_ids::DS4_V1 => Some("DualShock 4 (CUH-ZCT1)"),
        product_ids::DS4_V2 => Some("DualShock 4 (CUH-ZCT2)"),
        product_ids::DS4_WIRELESS_ADAPTER => Some("DualShock 4 USB Wireless Adapter"),
        _ => None,
    }
}
