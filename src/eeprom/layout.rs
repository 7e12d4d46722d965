//! Fixed FT-X EEPROM layout: field offsets, the image buffer, and
//! bounds-checked little-endian accessors.
//!
//! The header is never overlaid as a struct. Each field is read and written
//! through an explicit offset so the layout does not depend on how the
//! compiler packs anything.

use std::fmt;
use std::ops::Range;

use crate::constants::*;
use crate::error::{Error, Result};

/// Byte offsets of the FT-X header fields.
pub mod offset {
    /// Misc configuration word.
    pub const MISC_CONFIG: usize = 0x00;
    /// USB vendor ID.
    pub const VENDOR_ID: usize = 0x02;
    /// USB product ID.
    pub const PRODUCT_ID: usize = 0x04;
    /// Release number (bcdDevice).
    pub const RELEASE_NUMBER: usize = 0x06;
    /// Configuration descriptor attributes.
    pub const CONFIG_DESCRIPTOR: usize = 0x08;
    /// Max power in 2 mA units.
    pub const MAX_POWER: usize = 0x09;
    /// Device and peripheral control word.
    pub const DEVICE_CONTROL: usize = 0x0A;
    /// DBUS/CBUS drive control.
    pub const BUS_CONTROL: usize = 0x0C;
    /// Manufacturer descriptor pointer (length follows).
    pub const MANUFACTURER_STRING: usize = 0x0E;
    /// Product descriptor pointer (length follows).
    pub const PRODUCT_STRING: usize = 0x10;
    /// Serial number descriptor pointer (length follows).
    pub const SERIAL_STRING: usize = 0x12;
    /// I2C slave address.
    pub const I2C_ADDRESS: usize = 0x14;
    /// I2C device ID, 3 bytes.
    pub const I2C_DEVICE_ID: usize = 0x16;
    /// CBUS mux control, 7 bytes.
    pub const CBUS_MUX: usize = 0x1A;
}

/// Number of CBUS mux bytes in the header.
pub const CBUS_MUX_LEN: usize = 7;

/// Configuration descriptor bit: device is self powered.
const CONFIG_SELF_POWERED: u8 = 0x40;
/// Configuration descriptor bit: remote wakeup supported.
const CONFIG_REMOTE_WAKEUP: u8 = 0x20;

/// One of the three string descriptors referenced by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringField {
    /// Manufacturer name.
    Manufacturer,
    /// Product description.
    Product,
    /// Serial number.
    Serial,
}

impl StringField {
    /// Offset of the pointer byte; the length byte follows it.
    pub fn pointer_offset(self) -> usize {
        match self {
            Self::Manufacturer => offset::MANUFACTURER_STRING,
            Self::Product => offset::PRODUCT_STRING,
            Self::Serial => offset::SERIAL_STRING,
        }
    }

    /// Human readable field name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer",
            Self::Product => "product",
            Self::Serial => "serial number",
        }
    }
}

/// Location of a string descriptor inside the image, as recorded by a
/// header pointer/length pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorSlot {
    /// Byte offset of the descriptor in the image.
    pub offset: usize,
    /// Total descriptor size, including the 2-byte prefix.
    pub len: usize,
}

impl DescriptorSlot {
    /// First byte past the descriptor.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Byte range covered by the descriptor.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Decoded view of the FT-X EEPROM header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EepromHeader {
    pub misc_config: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub release_number: u16,
    pub config_descriptor: u8,
    /// Raw max power value, in 2 mA units.
    pub max_power: u8,
    pub device_control: u16,
    pub bus_control: u8,
    pub manufacturer: DescriptorSlot,
    pub product: DescriptorSlot,
    pub serial: DescriptorSlot,
    pub i2c_address: u16,
    pub i2c_device_id: [u8; 3],
    pub cbus_mux: [u8; CBUS_MUX_LEN],
}

impl EepromHeader {
    /// Decode the header fields from the first bytes of an image.
    pub fn parse(raw: &[u8; FTX_HEADER_SIZE]) -> Self {
        let word = |at: usize| u16::from_le_bytes([raw[at], raw[at + 1]]);
        let slot = |at: usize| DescriptorSlot {
            offset: raw[at] as usize,
            len: raw[at + 1] as usize,
        };

        let mut i2c_device_id = [0u8; 3];
        i2c_device_id.copy_from_slice(&raw[offset::I2C_DEVICE_ID..offset::I2C_DEVICE_ID + 3]);
        let mut cbus_mux = [0u8; CBUS_MUX_LEN];
        cbus_mux.copy_from_slice(&raw[offset::CBUS_MUX..offset::CBUS_MUX + CBUS_MUX_LEN]);

        Self {
            misc_config: word(offset::MISC_CONFIG),
            vendor_id: word(offset::VENDOR_ID),
            product_id: word(offset::PRODUCT_ID),
            release_number: word(offset::RELEASE_NUMBER),
            config_descriptor: raw[offset::CONFIG_DESCRIPTOR],
            max_power: raw[offset::MAX_POWER],
            device_control: word(offset::DEVICE_CONTROL),
            bus_control: raw[offset::BUS_CONTROL],
            manufacturer: slot(offset::MANUFACTURER_STRING),
            product: slot(offset::PRODUCT_STRING),
            serial: slot(offset::SERIAL_STRING),
            i2c_address: word(offset::I2C_ADDRESS),
            i2c_device_id,
            cbus_mux,
        }
    }

    /// Maximum bus current in mA.
    pub fn max_power_ma(&self) -> u16 {
        self.max_power as u16 * MAX_POWER_MILLIAMP_PER_UNIT
    }

    /// Device is self-powered (vs bus-powered).
    pub fn self_powered(&self) -> bool {
        self.config_descriptor & CONFIG_SELF_POWERED != 0
    }

    /// Device supports USB remote wakeup.
    pub fn remote_wakeup(&self) -> bool {
        self.config_descriptor & CONFIG_REMOTE_WAKEUP != 0
    }
}

/// The full FT-X EEPROM image, held in RAM between read and write-back.
#[derive(Clone, PartialEq, Eq)]
pub struct EepromImage {
    buf: [u8; FTX_EEPROM_SIZE],
}

impl fmt::Debug for EepromImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EepromImage")
            .field("header", &self.header())
            .finish_non_exhaustive()
    }
}

impl Default for EepromImage {
    fn default() -> Self {
        Self {
            buf: [0u8; FTX_EEPROM_SIZE],
        }
    }
}

impl EepromImage {
    /// Wrap a raw image.
    ///
    /// Fails with [`Error::InvalidImage`] unless `data` is exactly
    /// [`FTX_EEPROM_SIZE`] bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let buf: [u8; FTX_EEPROM_SIZE] = data.try_into().map_err(|_| Error::InvalidImage {
            len: data.len(),
            expected: FTX_EEPROM_SIZE,
        })?;
        Ok(Self { buf })
    }

    /// The raw image.
    pub fn as_bytes(&self) -> &[u8; FTX_EEPROM_SIZE] {
        &self.buf
    }

    /// Decode the header.
    pub fn header(&self) -> EepromHeader {
        let mut raw = [0u8; FTX_HEADER_SIZE];
        raw.copy_from_slice(&self.buf[..FTX_HEADER_SIZE]);
        EepromHeader::parse(&raw)
    }

    /// Read one byte.
    pub fn u8_at(&self, at: usize) -> Result<u8> {
        self.buf.get(at).copied().ok_or_else(|| out_of_bounds(at, 1))
    }

    /// Write one byte.
    pub fn set_u8(&mut self, at: usize, value: u8) -> Result<()> {
        let byte = self.buf.get_mut(at).ok_or_else(|| out_of_bounds(at, 1))?;
        *byte = value;
        Ok(())
    }

    /// Read a little-endian 16-bit word.
    pub fn u16_at(&self, at: usize) -> Result<u16> {
        let raw = self.bytes_at(at, 2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    /// Write a little-endian 16-bit word.
    pub fn set_u16(&mut self, at: usize, value: u16) -> Result<()> {
        self.write_bytes(at, &value.to_le_bytes())
    }

    /// Borrow `len` bytes starting at `at`.
    pub fn bytes_at(&self, at: usize, len: usize) -> Result<&[u8]> {
        at.checked_add(len)
            .and_then(|end| self.buf.get(at..end))
            .ok_or_else(|| out_of_bounds(at, len))
    }

    /// Copy `data` into the image at `at`.
    pub fn write_bytes(&mut self, at: usize, data: &[u8]) -> Result<()> {
        let dst = at
            .checked_add(data.len())
            .and_then(|end| self.buf.get_mut(at..end))
            .ok_or_else(|| out_of_bounds(at, data.len()))?;
        dst.copy_from_slice(data);
        Ok(())
    }

    /// The pointer/length pair recorded for `field`.
    pub fn slot(&self, field: StringField) -> Result<DescriptorSlot> {
        let at = field.pointer_offset();
        Ok(DescriptorSlot {
            offset: self.u8_at(at)? as usize,
            len: self.u8_at(at + 1)? as usize,
        })
    }

    /// Record a new pointer/length pair for `field`.
    ///
    /// Both values must fit in a single byte.
    pub fn set_slot(&mut self, field: StringField, slot: DescriptorSlot) -> Result<()> {
        let pointer = u8::try_from(slot.offset)
            .map_err(|_| Error::InvalidArgument("descriptor pointer does not fit in a byte"))?;
        let len = u8::try_from(slot.len)
            .map_err(|_| Error::InvalidArgument("descriptor length does not fit in a byte"))?;
        let at = field.pointer_offset();
        self.set_u8(at, pointer)?;
        self.set_u8(at + 1, len)
    }

    /// Decode the string stored for `field`, if its descriptor is present.
    pub fn string(&self, field: StringField) -> Result<Option<String>> {
        let slot = self.slot(field)?;
        if slot.len < 2 {
            return Ok(None);
        }
        let raw = self.bytes_at(slot.offset, slot.len)?;
        super::descriptor::decode(raw).map(Some)
    }
}

fn out_of_bounds(at: usize, len: usize) -> Error {
    Error::Eeprom(format!(
        "access of {len} bytes at {at:#x} is outside the {FTX_EEPROM_SIZE} byte image"
    ))
}
