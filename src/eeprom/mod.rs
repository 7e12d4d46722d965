//! FT-X EEPROM support: layout, string descriptors, patching, and I/O.
//!
//! The EEPROM on FTDI chips stores device identification, USB descriptor
//! strings, pin configuration, and other settings. This module provides:
//!
//! - [`EepromImage`] - The raw image with bounds-checked field access.
//! - [`descriptor`] - String descriptor encoding.
//! - [`Patcher`] - Rewrite the string table, preserving the serial number.
//! - [`HardwareConfig`] - Max power and CBUS pin functions.
//! - [`checksum`] - Compute, verify and seal the image checksum.
//! - [`EepromAccess`] - Reading/writing the physical EEPROM, implemented
//!   for [`FtdiDevice`](crate::FtdiDevice).

pub mod checksum;
pub mod descriptor;
mod hardware;
mod io;
pub mod layout;
mod patch;

pub use hardware::HardwareConfig;
pub use io::EepromAccess;
pub use layout::{DescriptorSlot, EepromHeader, EepromImage, StringField};
pub use patch::{Patcher, Placement, DEFAULT_SERIAL_CAPACITY};
