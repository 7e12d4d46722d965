//! Power and pin-function settings written alongside the strings.

use crate::constants::*;
use crate::error::{Error, Result};

use super::layout::{offset, EepromImage};

/// Max power and CBUS pin functions for an FT230X.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareConfig {
    /// Maximum bus current in mA, stored in 2 mA units.
    pub max_power_ma: u16,
    /// Function of CBUS0..CBUS3, see [`cbusx`].
    pub cbus: [u8; FT230X_CBUS_PINS],
}

impl Default for HardwareConfig {
    /// 500 mA with every CBUS pin available as a GPIO.
    fn default() -> Self {
        Self {
            max_power_ma: MAX_BUS_POWER_MA,
            cbus: [cbusx::IOMODE; FT230X_CBUS_PINS],
        }
    }
}

impl HardwareConfig {
    /// Set the maximum bus current.
    pub fn max_power(mut self, milliamps: u16) -> Self {
        self.max_power_ma = milliamps;
        self
    }

    /// Set the function of one CBUS pin.
    pub fn cbus(mut self, pin: usize, function: u8) -> Self {
        if let Some(slot) = self.cbus.get_mut(pin) {
            *slot = function;
        }
        self
    }

    /// Check the values against what the chip accepts.
    pub fn validate(&self) -> Result<()> {
        if self.max_power_ma > MAX_BUS_POWER_MA {
            return Err(Error::InvalidArgument("max power above 500 mA"));
        }
        if self.cbus.iter().any(|&f| f > cbusx::AWAKE) {
            return Err(Error::InvalidArgument("unknown CBUS function"));
        }
        Ok(())
    }

    /// Write the settings into the image header.
    pub fn apply(&self, image: &mut EepromImage) -> Result<()> {
        self.validate()?;
        let max_power = (self.max_power_ma / MAX_POWER_MILLIAMP_PER_UNIT) as u8;
        image.set_u8(offset::MAX_POWER, max_power)?;
        image.write_bytes(offset::CBUS_MUX, &self.cbus)?;
        log::debug!(
            "max power {} mA, CBUS functions {:?}",
            self.max_power_ma,
            self.cbus
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_500ma_gpio() {
        let mut image = EepromImage::default();
        HardwareConfig::default().apply(&mut image).unwrap();
        let header = image.header();
        assert_eq!(header.max_power, 250);
        assert_eq!(header.max_power_ma(), 500);
        assert_eq!(header.cbus_mux, [8, 8, 8, 8, 0, 0, 0]);
    }

    #[test]
    fn only_max_power_and_cbus_change() {
        let mut image = EepromImage::from_bytes(&[0x5A; FTX_EEPROM_SIZE]).unwrap();
        HardwareConfig::default()
            .cbus(1, cbusx::TXLED)
            .apply(&mut image)
            .unwrap();
        for (i, &b) in image.as_bytes().iter().enumerate() {
            match i {
                0x09 => assert_eq!(b, 250),
                0x1A | 0x1C | 0x1D => assert_eq!(b, cbusx::IOMODE),
                0x1B => assert_eq!(b, cbusx::TXLED),
                _ => assert_eq!(b, 0x5A, "byte {i:#x} changed"),
            }
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut image = EepromImage::default();
        let err = HardwareConfig::default().max_power(502).apply(&mut image);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        let err = HardwareConfig::default().cbus(0, 22).apply(&mut image);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        assert_eq!(image, EepromImage::default());
    }

    #[test]
    fn cbus_pin_out_of_range_is_ignored() {
        assert_eq!(HardwareConfig::default().cbus(7, 0), HardwareConfig::default());
    }
}
