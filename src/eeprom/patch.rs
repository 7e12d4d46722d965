//! In-place patching of the string descriptor table.
//!
//! The patcher rewrites the manufacturer and product strings of an image
//! read back from a device while keeping its factory-assigned serial number
//! descriptor byte for byte. All three descriptors are packed from the start
//! of the String Descriptor Space in manufacturer, product, serial order and
//! the header pointer/length pairs are updated to match. Everything else in
//! the image is left alone.

use crate::constants::*;
use crate::error::{Error, Result};

use super::descriptor;
use super::layout::{DescriptorSlot, EepromImage, StringField};

/// Default scratch space for the preserved serial number descriptor.
pub const DEFAULT_SERIAL_CAPACITY: usize = 64;

/// Highest offset a one-byte descriptor pointer can hold, plus one.
const POINTER_LIMIT: usize = u8::MAX as usize + 1;

/// Where the three string descriptors ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub manufacturer: DescriptorSlot,
    pub product: DescriptorSlot,
    pub serial: DescriptorSlot,
}

impl Placement {
    /// Pack descriptors of the given sizes contiguously from `table_offset`.
    ///
    /// Fails with [`Error::TableOverflow`] if the serial descriptor would
    /// end past `limit`, or if a descriptor would start beyond what a
    /// pointer byte can address.
    pub fn compute(
        table_offset: usize,
        limit: usize,
        manufacturer_len: usize,
        product_len: usize,
        serial_len: usize,
    ) -> Result<Self> {
        let manufacturer = DescriptorSlot {
            offset: table_offset,
            len: manufacturer_len,
        };
        let product = DescriptorSlot {
            offset: manufacturer.end(),
            len: product_len,
        };
        let serial = DescriptorSlot {
            offset: product.end(),
            len: serial_len,
        };

        if serial.end() > limit {
            return Err(Error::TableOverflow {
                end: serial.end(),
                limit,
            });
        }
        // Offsets only grow, so checking the last one covers all three
        if serial.offset >= POINTER_LIMIT {
            return Err(Error::TableOverflow {
                end: serial.offset,
                limit: POINTER_LIMIT,
            });
        }

        Ok(Self {
            manufacturer,
            product,
            serial,
        })
    }

    /// First byte past the table.
    pub fn end(&self) -> usize {
        self.serial.end()
    }

    /// The slots paired with their header fields, in table order.
    pub fn slots(&self) -> [(StringField, DescriptorSlot); 3] {
        [
            (StringField::Manufacturer, self.manufacturer),
            (StringField::Product, self.product),
            (StringField::Serial, self.serial),
        ]
    }
}

/// Rewrites the identification strings of an EEPROM image.
///
/// # Example
///
/// ```
/// use ftdi_serializer::eeprom::{EepromImage, Patcher};
///
/// let mut image = EepromImage::default();
/// let placement = Patcher::new("BayLibre", "BayLibre Copilot Lite V1.1")
///     .patch(&mut image)?;
/// assert_eq!(placement.product.offset, 178);
/// # Ok::<(), ftdi_serializer::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Patcher {
    manufacturer: String,
    product: String,
    serial_capacity: usize,
    string_capacity: usize,
}

impl Patcher {
    /// Create a patcher writing the given manufacturer and product strings.
    pub fn new(manufacturer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            product: product.into(),
            serial_capacity: DEFAULT_SERIAL_CAPACITY,
            string_capacity: MAX_STRING_DESCRIPTOR_SIZE,
        }
    }

    /// Limit the size of the serial descriptor that can be preserved.
    pub fn serial_capacity(mut self, capacity: usize) -> Self {
        self.serial_capacity = capacity;
        self
    }

    /// Limit the encoded size of the manufacturer and product descriptors.
    pub fn string_capacity(mut self, capacity: usize) -> Self {
        self.string_capacity = capacity;
        self
    }

    /// The manufacturer string to write.
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// The product string to write.
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Rewrite the string descriptor table of `image`.
    ///
    /// Every check runs before the first write, so on error the image is
    /// unchanged. It must still not be written to the device.
    pub fn patch(&self, image: &mut EepromImage) -> Result<Placement> {
        let serial = self.preserved_serial(image)?;
        let manufacturer = self.encode(StringField::Manufacturer, &self.manufacturer)?;
        let product = self.encode(StringField::Product, &self.product)?;

        let placement = Placement::compute(
            FTX_STRING_TABLE_OFFSET,
            FTX_EEPROM_SIZE,
            manufacturer.len(),
            product.len(),
            serial.len(),
        )?;

        image.write_bytes(placement.manufacturer.offset, &manufacturer)?;
        image.write_bytes(placement.product.offset, &product)?;
        image.write_bytes(placement.serial.offset, &serial)?;
        for (field, slot) in placement.slots() {
            image.set_slot(field, slot)?;
        }

        log::info!(
            "string table: manufacturer {:#x}+{}, product {:#x}+{}, serial {:#x}+{}",
            placement.manufacturer.offset,
            placement.manufacturer.len,
            placement.product.offset,
            placement.product.len,
            placement.serial.offset,
            placement.serial.len,
        );

        Ok(placement)
    }

    /// Copy the serial number descriptor out of the image.
    fn preserved_serial(&self, image: &EepromImage) -> Result<Vec<u8>> {
        let slot = image.slot(StringField::Serial)?;
        if slot.len > self.serial_capacity {
            return Err(Error::SerialTooLong {
                size: slot.len,
                capacity: self.serial_capacity,
            });
        }

        let serial = image.bytes_at(slot.offset, slot.len)?.to_vec();
        if serial.len() >= 2 && serial[1] != STRING_DESCRIPTOR_TYPE {
            log::warn!(
                "serial descriptor at {:#x} has type {:#04x}, preserving it as is",
                slot.offset,
                serial[1]
            );
        }
        Ok(serial)
    }

    fn encode(&self, field: StringField, source: &str) -> Result<Vec<u8>> {
        descriptor::encode(source, self.string_capacity).map_err(|e| Error::EncodingFailed {
            field: field.name(),
            source: Box::new(e),
        })
    }
}
