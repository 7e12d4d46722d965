//! EEPROM USB I/O operations: reading and writing the physical EEPROM.

use crate::constants::*;
use crate::context::FtdiDevice;
use crate::error::{Error, Result};

use super::layout::EepromImage;

/// Latency timer value MProg sets before programming.
const PROGRAMMING_LATENCY: u8 = 0x77;

/// Access to a device's configuration EEPROM.
///
/// Implemented by [`FtdiDevice`]; the serialization session only talks to
/// the device through this trait.
pub trait EepromAccess {
    /// Read the whole EEPROM image.
    fn read_eeprom(&mut self) -> Result<EepromImage>;

    /// Commit `image` to the device.
    fn write_eeprom(&mut self, image: &EepromImage) -> Result<()>;
}

impl FtdiDevice {
    /// Read a single 16-bit EEPROM location.
    pub fn read_eeprom_location(&self, addr: u16) -> Result<u16> {
        let data = self.control_in(SIO_READ_EEPROM_REQUEST, 0, addr, 2)?;
        if data.len() < 2 {
            return Err(Error::Eeprom(format!(
                "EEPROM read at word {addr:#x} failed: short transfer"
            )));
        }
        Ok((data[0] as u16) | ((data[1] as u16) << 8))
    }

    /// Write a single 16-bit EEPROM location.
    pub fn write_eeprom_location(&self, addr: u16, value: u16) -> Result<()> {
        self.control_out(SIO_WRITE_EEPROM_REQUEST, value, addr)
    }
}

impl EepromAccess for FtdiDevice {
    /// Performs one control transfer per 16-bit word of the image.
    fn read_eeprom(&mut self) -> Result<EepromImage> {
        let mut buf = vec![0u8; FTX_EEPROM_SIZE];
        for (i, word) in buf.chunks_exact_mut(2).enumerate() {
            let value = self.read_eeprom_location(i as u16)?;
            word.copy_from_slice(&value.to_le_bytes());
        }
        log::debug!("read {FTX_EEPROM_SIZE} byte EEPROM image");
        EepromImage::from_bytes(&buf)
    }

    /// Writes the configuration area, the only part serialization
    /// touches, using the initialization sequence observed from FTDI's
    /// MProg tool. The factory configuration words are skipped.
    fn write_eeprom(&mut self, image: &EepromImage) -> Result<()> {
        self.usb_reset()?;
        if let Err(e) = self.set_latency_timer(PROGRAMMING_LATENCY) {
            log::debug!("could not set latency timer before programming: {e}");
        }

        let buf = image.as_bytes();
        for i in 0..FTX_CONFIG_AREA_SIZE / 2 {
            if FTX_FACTORY_AREA_WORDS.contains(&i) {
                continue;
            }
            let val = (buf[i * 2] as u16) | ((buf[i * 2 + 1] as u16) << 8);
            log::trace!("EEPROM word {i:#04x} <- {val:#06x}");
            self.write_eeprom_location(i as u16, val)?;
        }

        log::debug!("wrote {FTX_CONFIG_AREA_SIZE} byte configuration area");
        Ok(())
    }
}
