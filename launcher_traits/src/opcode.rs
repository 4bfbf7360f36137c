//! Raw protocol byte values shared by every transport.
//!
//! The same bit positions are sent as commands and read back as status.

pub const NONE: u8 = 0x00;
pub const DOWN: u8 = 0x01;
pub const UP: u8 = 0x02;
pub const LEFT: u8 = 0x04;
pub const RIGHT: u8 = 0x08;
pub const FIRE: u8 = 0x10;
pub const STOP: u8 = 0x20;
pub const STATUS_REQUEST: u8 = 0x40;

/// Bits that drive one of the two axes.
pub const MOTION_MASK: u8 = DOWN | UP | LEFT | RIGHT;
