//! Maps `Box<dyn Error>` from the transport boundary to typed `LauncherError`.
//!
//! `launcher_traits::Transport` uses `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `launcher_hardware::HwError`.

use crate::error::LauncherError;

/// Map a transport error raised during normal I/O.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> LauncherError {
    #[cfg(feature = "hardware-errors")]
    {
        use launcher_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => LauncherError::ProtocolTimeout,
                HwError::NotFound { .. } | HwError::NotOpen => {
                    LauncherError::TransportUnavailable(hw.to_string())
                }
                other => LauncherError::Hardware(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        LauncherError::ProtocolTimeout
    } else {
        LauncherError::Hardware(s)
    }
}

/// Map a failure to open the transport. Every open failure is fatal.
pub fn map_open_error(e: &(dyn std::error::Error + 'static)) -> LauncherError {
    match map_hw_error(e) {
        LauncherError::TransportUnavailable(msg) => LauncherError::TransportUnavailable(msg),
        _ => LauncherError::TransportUnavailable(e.to_string()),
    }
}
