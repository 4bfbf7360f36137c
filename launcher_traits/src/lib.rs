pub mod clock;
pub mod opcode;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// One-byte command/status channel to the launcher.
///
/// The device answers the most recent command, so callers request status
/// (by sending the status-request opcode) before every `read_status`.
pub trait Transport {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn send_command(&mut self, byte: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn read_status(&mut self) -> Result<u8, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).open()
    }
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).close()
    }
    fn send_command(&mut self, byte: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send_command(byte)
    }
    fn read_status(&mut self) -> Result<u8, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_status()
    }
}
