//! A complete serialization session.
//!
//! [`Serializer::run`] reads the image, rewrites strings and hardware
//! settings in memory, seals the checksum, and only then writes the image
//! back. Any failure before the write leaves the device untouched.

use crate::eeprom::{
    checksum, EepromAccess, EepromImage, HardwareConfig, Patcher, Placement, StringField,
};
use crate::error::Result;

/// Manufacturer string programmed into Copilot Lite boards.
pub const DEFAULT_MANUFACTURER: &str = "BayLibre";

/// Product string programmed into Copilot Lite boards.
pub const DEFAULT_PRODUCT: &str = "BayLibre Copilot Lite V1.1";

/// Outcome of a serialization session.
#[derive(Debug, Clone)]
pub struct Report {
    /// The preserved serial number, if the image carried a readable one.
    pub serial: Option<String>,
    /// Final placement of the string descriptors.
    pub placement: Placement,
    /// Checksum stored in the image.
    pub checksum: u16,
    /// The image that was (or, for a dry run, would be) written.
    pub image: EepromImage,
}

/// Strings and hardware settings to program.
#[derive(Debug, Clone)]
pub struct Serializer {
    patcher: Patcher,
    hardware: HardwareConfig,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(
            Patcher::new(DEFAULT_MANUFACTURER, DEFAULT_PRODUCT),
            HardwareConfig::default(),
        )
    }
}

impl Serializer {
    /// Create a serializer from its two parts.
    pub fn new(patcher: Patcher, hardware: HardwareConfig) -> Self {
        Self { patcher, hardware }
    }

    /// The string patcher.
    pub fn patcher(&self) -> &Patcher {
        &self.patcher
    }

    /// The hardware settings.
    pub fn hardware(&self) -> &HardwareConfig {
        &self.hardware
    }

    /// Build the final image from the one read off the device.
    pub fn prepare(&self, mut image: EepromImage) -> Result<Report> {
        if let Err(e) = checksum::verify(&image) {
            log::warn!("image read from device: {e}");
        }

        let placement = self.patcher.patch(&mut image)?;
        self.hardware.apply(&mut image)?;
        let csum = checksum::seal(&mut image)?;

        let serial = match image.string(StringField::Serial) {
            Ok(serial) => serial,
            Err(e) => {
                log::warn!("could not decode the preserved serial number: {e}");
                None
            }
        };

        Ok(Report {
            serial,
            placement,
            checksum: csum,
            image,
        })
    }

    /// Build the final image without writing it.
    pub fn dry_run(&self, device: &mut impl EepromAccess) -> Result<Report> {
        let image = device.read_eeprom()?;
        self.prepare(image)
    }

    /// Serialize the device.
    pub fn run(&self, device: &mut impl EepromAccess) -> Result<Report> {
        let report = self.dry_run(device)?;
        device.write_eeprom(&report.image)?;
        log::info!(
            "programmed {:?} / {:?}, serial {:?}",
            self.patcher.manufacturer(),
            self.patcher.product(),
            report.serial
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::eeprom::{descriptor, DescriptorSlot};
    use crate::error::Error;

    /// An in-memory device.
    struct MemoryEeprom {
        image: EepromImage,
        writes: usize,
    }

    impl EepromAccess for MemoryEeprom {
        fn read_eeprom(&mut self) -> Result<EepromImage> {
            Ok(self.image.clone())
        }

        fn write_eeprom(&mut self, image: &EepromImage) -> Result<()> {
            self.image = image.clone();
            self.writes += 1;
            Ok(())
        }
    }

    fn factory_device() -> MemoryEeprom {
        let mut image = EepromImage::default();
        image.set_u16(0x02, FTDI_VID).unwrap();
        image.set_u16(0x04, pid::FT230X).unwrap();
        image.set_u8(0x09, 45).unwrap();
        let serial = descriptor::encode("DK0ABCDE", 64).unwrap();
        image.write_bytes(0xCE, &serial).unwrap();
        image
            .set_slot(
                StringField::Serial,
                DescriptorSlot {
                    offset: 0xCE,
                    len: serial.len(),
                },
            )
            .unwrap();
        MemoryEeprom { image, writes: 0 }
    }

    #[test]
    fn run_programs_copilot_lite() {
        let mut dev = factory_device();
        let report = Serializer::default().run(&mut dev).unwrap();

        assert_eq!(dev.writes, 1);
        assert_eq!(report.serial.as_deref(), Some("DK0ABCDE"));
        assert_eq!(report.placement.serial.offset, 232);

        let header = dev.image.header();
        assert_eq!(header.vendor_id, FTDI_VID);
        assert_eq!(header.max_power_ma(), 500);
        assert_eq!(&header.cbus_mux[..4], &[cbusx::IOMODE; 4]);
        assert_eq!(
            dev.image.string(StringField::Product).unwrap().as_deref(),
            Some(DEFAULT_PRODUCT)
        );
        checksum::verify(&dev.image).unwrap();
    }

    #[test]
    fn dry_run_does_not_write() {
        let mut dev = factory_device();
        let before = dev.image.clone();
        let report = Serializer::default().dry_run(&mut dev).unwrap();
        assert_eq!(dev.writes, 0);
        assert_eq!(dev.image, before);
        assert_ne!(report.image, before);
    }

    #[test]
    fn failure_skips_write_back() {
        let mut dev = factory_device();
        let serializer = Serializer::new(
            Patcher::new(DEFAULT_MANUFACTURER, DEFAULT_PRODUCT).serial_capacity(4),
            HardwareConfig::default(),
        );
        let err = serializer.run(&mut dev).unwrap_err();
        assert!(matches!(err, Error::SerialTooLong { .. }));
        assert_eq!(dev.writes, 0);
    }

    #[test]
    fn table_reaching_checksum_is_rejected() {
        let mut dev = factory_device();
        let serializer = Serializer::new(
            Patcher::new(DEFAULT_MANUFACTURER, "x".repeat(30)),
            HardwareConfig::default(),
        );
        // 0xA0 + 18 + 62 + 18 = 0x102, past the checksum word
        let err = serializer.run(&mut dev).unwrap_err();
        assert!(matches!(err, Error::ChecksumOverlap { end: 0x102, .. }));
        assert_eq!(dev.writes, 0);
    }

    #[test]
    fn rerun_on_serialized_device_is_stable() {
        let mut dev = factory_device();
        let first = Serializer::default().run(&mut dev).unwrap();
        let second = Serializer::default().run(&mut dev).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(second.serial.as_deref(), Some("DK0ABCDE"));
    }
}
