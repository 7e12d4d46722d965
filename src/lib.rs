//! Serialize the configuration EEPROM of FTDI FT-X USB-UART bridges.
//!
//! The crate reads the EEPROM of a single connected FT230X, rewrites its
//! manufacturer and product strings while keeping the factory-assigned
//! serial number, sets max power and CBUS pin functions, and writes the
//! image back in one pass. It uses [nusb](https://crates.io/crates/nusb)
//! as the USB backend, so no C dependencies or `libusb` are required.
//!
//! # Quick Start
//!
//! ```no_run
//! use ftdi_serializer::{find_serializable_device, FtdiDevice, Identity, Serializer};
//!
//! let candidate = find_serializable_device(&Identity::defaults())?;
//! let mut dev = FtdiDevice::from_device_info(candidate.info)?;
//! let report = Serializer::default().run(&mut dev)?;
//! println!("serialized {:?}", report.serial);
//! # Ok::<(), ftdi_serializer::Error>(())
//! ```
//!
//! The in-memory part works without a device:
//!
//! ```
//! use ftdi_serializer::eeprom::{EepromImage, Patcher, StringField};
//!
//! let mut image = EepromImage::default();
//! Patcher::new("BayLibre", "BayLibre Copilot Lite V1.1").patch(&mut image)?;
//! assert_eq!(
//!     image.string(StringField::Manufacturer)?.as_deref(),
//!     Some("BayLibre")
//! );
//! # Ok::<(), ftdi_serializer::Error>(())
//! ```

pub mod constants;
pub mod context;
pub mod device_info;
pub mod eeprom;
pub mod error;
pub mod serialize;

// ---- Convenience re-exports ----

pub use constants::FTDI_VID;
pub use context::FtdiDevice;
pub use device_info::{find_devices, find_serializable_device, Candidate, Identity, MatchKind};
pub use eeprom::{EepromAccess, EepromImage, HardwareConfig, Patcher};
pub use error::{Error, Result};
pub use serialize::{Report, Serializer};
