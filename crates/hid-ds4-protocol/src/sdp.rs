//! Service-discovery handshake payloads.
//!
//! Three SDP `ServiceSearchAttributeResponse` PDUs (transaction IDs 1–3)
//! carrying the host's HID service record, split with continuation state. The
//! controller walks them one round trip at a time during bring-up. They are
//! transmitted byte-for-byte; do not edit individual bytes.

#![deny(static_mut_refs)]

const FRAGMENT_0: [u8; 99] = [
    0x07, 0x00, 0x01, 0x00, 0x5E, 0x00, 0x59, 0x36, 0x01, 0x0A, 0x36, 0x01,
    0x07, 0x09, 0x00, 0x00, 0x0A, 0x00, 0x01, 0x00, 0x01, 0x09, 0x00, 0x01,
    0x35, 0x03, 0x19, 0x11, 0x24, 0x09, 0x00, 0x04, 0x35, 0x0D, 0x35, 0x06,
    0x19, 0x01, 0x00, 0x09, 0x00, 0x11, 0x35, 0x03, 0x19, 0x00, 0x11, 0x09,
    0x00, 0x05, 0x35, 0x03, 0x19, 0x10, 0x02, 0x09, 0x00, 0x06, 0x35, 0x09,
    0x09, 0x65, 0x6E, 0x09, 0x00, 0x6A, 0x09, 0x01, 0x00, 0x09, 0x00, 0x09,
    0x35, 0x08, 0x35, 0x06, 0x19, 0x11, 0x24, 0x09, 0x01, 0x00, 0x09, 0x00,
    0x0D, 0x35, 0x0F, 0x35, 0x0D, 0x35, 0x06, 0x19, 0x01, 0x00, 0x09, 0x00,
    0x02, 0x00, 0x59,
];

const FRAGMENT_1: [u8; 100] = [
    0x07, 0x00, 0x02, 0x00, 0x5F, 0x00, 0x5A, 0x13, 0x35, 0x03, 0x19, 0x00,
    0x11, 0x09, 0x01, 0x00, 0x25, 0x13, 0x57, 0x69, 0x72, 0x65, 0x6C, 0x65,
    0x73, 0x73, 0x20, 0x43, 0x6F, 0x6E, 0x74, 0x72, 0x6F, 0x6C, 0x6C, 0x65,
    0x72, 0x09, 0x01, 0x01, 0x25, 0x0F, 0x47, 0x61, 0x6D, 0x65, 0x20, 0x43,
    0x6F, 0x6E, 0x74, 0x72, 0x6F, 0x6C, 0x6C, 0x65, 0x72, 0x09, 0x01, 0x02,
    0x25, 0x1E, 0x53, 0x6F, 0x6E, 0x79, 0x20, 0x49, 0x6E, 0x74, 0x65, 0x72,
    0x61, 0x63, 0x74, 0x69, 0x76, 0x65, 0x20, 0x45, 0x6E, 0x74, 0x65, 0x72,
    0x74, 0x61, 0x69, 0x6E, 0x6D, 0x65, 0x6E, 0x74, 0x09, 0x02, 0x01, 0x09,
    0x01, 0x02, 0x00, 0xB3,
];

const FRAGMENT_2: [u8; 98] = [
    0x07, 0x00, 0x03, 0x00, 0x5D, 0x00, 0x5A, 0x00, 0x09, 0x02, 0x02, 0x08,
    0x08, 0x09, 0x02, 0x03, 0x08, 0x00, 0x09, 0x02, 0x04, 0x28, 0x00, 0x09,
    0x02, 0x05, 0x28, 0x01, 0x09, 0x02, 0x06, 0x35, 0x22, 0x35, 0x20, 0x08,
    0x22, 0x25, 0x1C, 0x05, 0x01, 0x09, 0x05, 0xA1, 0x01, 0x85, 0x01, 0x09,
    0x30, 0x09, 0x31, 0x09, 0x32, 0x09, 0x35, 0x15, 0x00, 0x26, 0xFF, 0x00,
    0x75, 0x08, 0x95, 0x04, 0x81, 0x02, 0xC0, 0x09, 0x02, 0x07, 0x35, 0x08,
    0x35, 0x06, 0x09, 0x04, 0x09, 0x09, 0x01, 0x00, 0x09, 0x02, 0x0B, 0x09,
    0x01, 0x00, 0x09, 0x02, 0x0C, 0x09, 0x1F, 0x40, 0x09, 0x02, 0x0E, 0x28,
    0x00, 0x00,
];

/// Handshake fragments in transmission order.
pub static HANDSHAKE_FRAGMENTS: [&[u8]; 3] = [&FRAGMENT_0, &FRAGMENT_1, &FRAGMENT_2];
