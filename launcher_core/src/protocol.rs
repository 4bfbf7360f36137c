//! The one-byte launcher protocol.
//!
//! `DeviceStatus` holds the bit positions. `Command` and `Status` are two
//! readings of the same bits: what we send, and what the device reports back.

use std::fmt;

use bitflags::bitflags;
use launcher_traits::opcode;

use crate::axis::{Axis, Direction};

bitflags! {
    /// Bit positions shared by outgoing commands and incoming status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceStatus: u8 {
        const DOWN = opcode::DOWN;
        const UP = opcode::UP;
        const LEFT = opcode::LEFT;
        const RIGHT = opcode::RIGHT;
        const FIRE = opcode::FIRE;
        const STOP = opcode::STOP;
        const STATUS_REQUEST = opcode::STATUS_REQUEST;
    }
}

impl DeviceStatus {
    pub const NONE: Self = Self::empty();
    pub const MOTION: Self = Self::from_bits_retain(opcode::MOTION_MASK);

    /// The motion bit driving `axis` towards `dir`.
    pub fn motion(axis: Axis, dir: Direction) -> Self {
        match (axis, dir) {
            (Axis::Theta, Direction::Positive) => Self::DOWN,
            (Axis::Theta, Direction::Negative) => Self::UP,
            (Axis::Phi, Direction::Positive) => Self::LEFT,
            (Axis::Phi, Direction::Negative) => Self::RIGHT,
        }
    }

    /// Axis and direction of a single motion bit.
    pub fn motion_parts(self) -> Option<(Axis, Direction)> {
        match self.intersection(Self::MOTION) {
            m if m == Self::DOWN => Some((Axis::Theta, Direction::Positive)),
            m if m == Self::UP => Some((Axis::Theta, Direction::Negative)),
            m if m == Self::LEFT => Some((Axis::Phi, Direction::Positive)),
            m if m == Self::RIGHT => Some((Axis::Phi, Direction::Negative)),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        let unknown = self.bits() & !Self::all().bits();
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{unknown:#04x}")?;
        }
        Ok(())
    }
}

/// An outgoing opcode. Only well-formed single-action commands can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command(DeviceStatus);

impl Command {
    pub const NONE: Command = Command(DeviceStatus::NONE);
    pub const STOP: Command = Command(DeviceStatus::STOP);
    pub const FIRE: Command = Command(DeviceStatus::FIRE);
    pub const STATUS_REQUEST: Command = Command(DeviceStatus::STATUS_REQUEST);
    pub const DOWN: Command = Command(DeviceStatus::DOWN);
    pub const UP: Command = Command(DeviceStatus::UP);
    pub const LEFT: Command = Command(DeviceStatus::LEFT);
    pub const RIGHT: Command = Command(DeviceStatus::RIGHT);

    pub fn motion(axis: Axis, dir: Direction) -> Self {
        Command(DeviceStatus::motion(axis, dir))
    }

    #[inline]
    pub fn bits(self) -> DeviceStatus {
        self.0
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self.0.bits()
    }

    /// Axis and direction when this is a motion command.
    pub fn motion_parts(self) -> Option<(Axis, Direction)> {
        self.0.motion_parts()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A status byte as reported by the device: set bits are actions still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status(DeviceStatus);

impl Status {
    pub const IDLE: Status = Status(DeviceStatus::NONE);

    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        Status(DeviceStatus::from_bits_retain(byte))
    }

    /// Status we assume right after sending `cmd`, before the device answers.
    pub(crate) fn expected_after(cmd: Command) -> Self {
        Status(cmd.bits() & (DeviceStatus::MOTION | DeviceStatus::FIRE))
    }

    #[inline]
    pub fn bits(self) -> DeviceStatus {
        self.0
    }

    #[inline]
    pub fn contains(self, bit: DeviceStatus) -> bool {
        self.0.contains(bit)
    }

    pub fn is_idle(self) -> bool {
        !self.0.intersects(DeviceStatus::MOTION | DeviceStatus::FIRE)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_values_match_the_wire() {
        assert_eq!(Command::DOWN.to_byte(), 0x01);
        assert_eq!(Command::UP.to_byte(), 0x02);
        assert_eq!(Command::LEFT.to_byte(), 0x04);
        assert_eq!(Command::RIGHT.to_byte(), 0x08);
        assert_eq!(Command::FIRE.to_byte(), 0x10);
        assert_eq!(Command::STOP.to_byte(), 0x20);
        assert_eq!(Command::STATUS_REQUEST.to_byte(), 0x40);
        assert_eq!(Command::NONE.to_byte(), 0x00);
    }

    #[test]
    fn motion_mapping_round_trips() {
        for axis in Axis::ALL {
            for dir in [Direction::Positive, Direction::Negative] {
                assert_eq!(Command::motion(axis, dir).motion_parts(), Some((axis, dir)));
            }
        }
        assert_eq!(Command::FIRE.motion_parts(), None);
        assert_eq!((DeviceStatus::UP | DeviceStatus::LEFT).motion_parts(), None);
    }

    #[test]
    fn status_reading() {
        let s = Status::from_byte(0x11);
        assert!(s.contains(DeviceStatus::DOWN));
        assert!(s.contains(DeviceStatus::FIRE));
        assert!(!s.is_idle());
        assert!(Status::from_byte(0x20).is_idle());
        assert_eq!(s.to_string(), "DOWN|FIRE");
        assert_eq!(Status::from_byte(0x80).to_string(), "0x80");
        assert_eq!(Status::IDLE.to_string(), "NONE");
    }

    #[test]
    fn expected_status_after_commands() {
        assert_eq!(Status::expected_after(Command::LEFT).bits(), DeviceStatus::LEFT);
        assert_eq!(Status::expected_after(Command::FIRE).bits(), DeviceStatus::FIRE);
        assert!(Status::expected_after(Command::STOP).is_idle());
    }
}
