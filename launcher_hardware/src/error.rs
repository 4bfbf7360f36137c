use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("launcher {vendor:#06x}:{product:#06x} not found")]
    NotFound { vendor: u16, product: u16 },
    #[error("usb error: {0}")]
    Usb(String),
    #[error("transfer timeout")]
    Timeout,
    #[error("device not open")]
    NotOpen,
    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
