//! USB transport for the real launcher (libusb via `rusb`).

use std::time::Duration;

use launcher_traits::{Transport, opcode};
use rusb::{DeviceHandle, GlobalContext};
use tracing::{debug, info, trace, warn};

use crate::command_frame;
use crate::error::{HwError, Result};

/// Class-specific, host-to-device, recipient interface.
const REQUEST_TYPE_OUT: u8 = 0x21;
/// HID SET_REPORT.
const REQUEST_SET_REPORT: u8 = 0x09;

#[derive(Debug, Clone)]
pub struct UsbSettings {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface: u8,
    /// wValue of the control transfer carrying each command
    pub control_value: u16,
    /// Interrupt IN endpoint the status byte arrives on
    pub endpoint_in: u8,
    pub timeout: Duration,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            vendor_id: 0x0a81,
            product_id: 0x0701,
            interface: 0,
            control_value: 0x0001,
            endpoint_in: 0x81,
            timeout: Duration::from_millis(1000),
        }
    }
}

pub struct UsbLauncher {
    settings: UsbSettings,
    handle: Option<DeviceHandle<GlobalContext>>,
}

fn map_usb(e: rusb::Error) -> HwError {
    match e {
        rusb::Error::Timeout => HwError::Timeout,
        other => HwError::Usb(other.to_string()),
    }
}

impl UsbLauncher {
    pub fn new(settings: UsbSettings) -> Self {
        Self {
            settings,
            handle: None,
        }
    }

    fn handle(&self) -> Result<&DeviceHandle<GlobalContext>> {
        self.handle.as_ref().ok_or(HwError::NotOpen)
    }

    fn claim(&mut self) -> Result<()> {
        let s = &self.settings;
        let mut handle = rusb::open_device_with_vid_pid(s.vendor_id, s.product_id).ok_or(
            HwError::NotFound {
                vendor: s.vendor_id,
                product: s.product_id,
            },
        )?;
        // Not every platform can report driver state; treat that as "no driver".
        if handle.kernel_driver_active(s.interface).unwrap_or(false) {
            debug!(interface = s.interface, "detaching kernel driver");
            handle.detach_kernel_driver(s.interface).map_err(map_usb)?;
        }
        handle.claim_interface(s.interface).map_err(map_usb)?;
        handle
            .set_alternate_setting(s.interface, 0)
            .map_err(map_usb)?;
        self.handle = Some(handle);
        Ok(())
    }

    fn send(&self, byte: u8) -> Result<()> {
        let frame = command_frame(byte);
        let written = self
            .handle()?
            .write_control(
                REQUEST_TYPE_OUT,
                REQUEST_SET_REPORT,
                self.settings.control_value,
                0,
                &frame,
                self.settings.timeout,
            )
            .map_err(map_usb)?;
        trace!(cmd = byte, written, "usb command");
        Ok(())
    }

    fn read(&self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = self
            .handle()?
            .read_interrupt(self.settings.endpoint_in, &mut buf, self.settings.timeout)
            .map_err(map_usb)?;
        if n != 1 {
            return Err(HwError::Protocol(format!("expected 1 status byte, got {n}")));
        }
        trace!(status = buf[0], "usb status");
        Ok(buf[0])
    }
}

impl Transport for UsbLauncher {
    fn open(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.claim()?;
        // Smoke test the channel in both directions before handing it out.
        self.send(opcode::NONE)?;
        self.send(opcode::STATUS_REQUEST)?;
        self.read()?;
        info!(
            vendor = self.settings.vendor_id,
            product = self.settings.product_id,
            "usb launcher opened"
        );
        Ok(())
    }

    fn close(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.release_interface(self.settings.interface) {
                warn!(error = %e, "release_interface failed");
                return Err(Box::new(map_usb(e)));
            }
            debug!("usb launcher closed");
        }
        Ok(())
    }

    fn send_command(
        &mut self,
        byte: u8,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.send(byte)?)
    }

    fn read_status(&mut self) -> std::result::Result<u8, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read()?)
    }
}
