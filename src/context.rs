//! Opened FT-X device handle.
//!
//! [`FtdiDevice`] owns the claimed USB interface for the duration of a
//! serialization session. The interface and device are released when the
//! handle is dropped, whichever way the session ends.

use std::time::Duration;

use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::{self, DeviceInfo, MaybeFuture};

use crate::constants::*;
use crate::error::{Error, Result};

/// Default control transfer timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// bcdDevice reported by FT-X series chips.
const FTX_RELEASE_NUMBER: u16 = 0x1000;

/// USB interface carrying the UART (FT230X has only one).
const INTERFACE_NUM: u8 = 0;

/// Port index used in vendor requests for interface A.
const USB_INDEX: u16 = 1;

/// An opened FTDI USB device.
///
/// ```no_run
/// use ftdi_serializer::{find_serializable_device, FtdiDevice, Identity};
///
/// let candidate = find_serializable_device(&Identity::defaults())?;
/// let mut dev = FtdiDevice::from_device_info(candidate.info)?;
/// # Ok::<(), ftdi_serializer::Error>(())
/// ```
pub struct FtdiDevice {
    #[allow(dead_code)] // Kept to ensure the USB device stays open
    device: nusb::Device,
    interface: nusb::Interface,
    timeout: Duration,
}

impl std::fmt::Debug for FtdiDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtdiDevice")
            .field("interface", &INTERFACE_NUM)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FtdiDevice {
    /// Open a device from an already-discovered [`nusb::DeviceInfo`].
    ///
    /// Detaches any kernel driver, claims the UART interface and resets
    /// the chip.
    pub fn from_device_info(dev_info: DeviceInfo) -> Result<Self> {
        let device = dev_info.open().wait()?;

        let bcd = device.device_descriptor().device_version();
        if bcd != FTX_RELEASE_NUMBER {
            log::warn!("bcdDevice {bcd:#06x} is not an FT-X chip, EEPROM layout may differ");
        }

        let interface = device.detach_and_claim_interface(INTERFACE_NUM).wait()?;

        let mut ftdi = Self {
            device,
            interface,
            timeout: DEFAULT_TIMEOUT,
        };
        ftdi.usb_reset()?;

        Ok(ftdi)
    }

    /// Set the control transfer timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Reset the chip's SIO state.
    pub fn usb_reset(&mut self) -> Result<()> {
        self.control_out(SIO_RESET_REQUEST, SIO_RESET_SIO, USB_INDEX)
    }

    /// Set the latency timer value in milliseconds (1-255).
    pub fn set_latency_timer(&self, latency_ms: u8) -> Result<()> {
        if latency_ms < 1 {
            return Err(Error::InvalidArgument("latency must be between 1 and 255"));
        }
        self.control_out(SIO_SET_LATENCY_TIMER_REQUEST, latency_ms as u16, USB_INDEX)
    }
}

// ---- Internal USB helpers ----

impl FtdiDevice {
    /// Send a vendor OUT control transfer to the device.
    pub(crate) fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                self.timeout,
            )
            .wait()?;
        Ok(())
    }

    /// Send a vendor IN control transfer to the device.
    pub(crate) fn control_in(
        &self,
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    ) -> Result<Vec<u8>> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()?;
        Ok(data)
    }
}

impl Drop for FtdiDevice {
    fn drop(&mut self) {
        log::debug!("releasing USB interface {INTERFACE_NUM}");
    }
}
