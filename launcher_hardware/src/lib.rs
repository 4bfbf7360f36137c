pub mod error;
pub mod sim;
#[cfg(feature = "hardware")]
pub mod usb;

pub use sim::{FRAME_LOG_CAP, SimParams, SimulatedLauncher};
#[cfg(feature = "hardware")]
pub use usb::{UsbLauncher, UsbSettings};

/// Size of the outgoing control transfer; only the first byte carries data.
pub const COMMAND_FRAME_LEN: usize = 8;

/// Pad an opcode into the fixed-size frame the device expects.
#[inline]
pub fn command_frame(byte: u8) -> [u8; COMMAND_FRAME_LEN] {
    let mut frame = [0u8; COMMAND_FRAME_LEN];
    frame[0] = byte;
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_traits::opcode;

    #[test]
    fn frame_is_zero_padded() {
        let f = command_frame(opcode::FIRE);
        assert_eq!(f[0], 0x10);
        assert!(f[1..].iter().all(|&b| b == 0));
        assert_eq!(f.len(), COMMAND_FRAME_LEN);
    }
}
