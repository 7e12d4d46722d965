//! Device discovery.
//!
//! Serialization must only ever touch one board, so discovery does not pick
//! "the first" device: it counts every connected FT230X whose USB strings
//! match one of the accepted [`Identity`] values and fails unless exactly
//! one does.

use std::num::NonZeroU8;
use std::time::Duration;

use nusb::{self, DeviceInfo, MaybeFuture};

use crate::constants::{pid, FTDI_VID};
use crate::error::{Error, Result};

/// USB string descriptor read timeout.
const STRING_TIMEOUT: Duration = Duration::from_secs(1);

/// US English, the language FTDI chips report their strings in.
const LANGUAGE_ID: u16 = 0x0409;

/// How the product string of an [`Identity`] is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole product string must be equal.
    Exact,
    /// The product string must start with the expected text.
    Prefix,
}

/// A manufacturer/product string pair identifying a device that may be
/// serialized.
///
/// Comparisons are case-sensitive. The manufacturer always has to match
/// exactly.
///
/// # Example
///
/// ```
/// use ftdi_serializer::Identity;
///
/// let id = Identity::prefix("BayLibre", "BayLibre Copilot Lite");
/// assert!(id.matches("BayLibre", "BayLibre Copilot Lite V1.1"));
/// assert!(!id.matches("baylibre", "BayLibre Copilot Lite V1.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Expected USB manufacturer string.
    pub manufacturer: String,
    /// Expected USB product string, or its prefix.
    pub product: String,
    /// How `product` is compared.
    pub kind: MatchKind,
}

impl Identity {
    /// Match a manufacturer and an exact product string.
    pub fn exact(manufacturer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            product: product.into(),
            kind: MatchKind::Exact,
        }
    }

    /// Match a manufacturer and a product string prefix.
    pub fn prefix(manufacturer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            product: product.into(),
            kind: MatchKind::Prefix,
        }
    }

    /// A blank FT230X straight from the factory, or an already serialized
    /// Copilot Lite.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::exact("FTDI", "FT230X Basic UART"),
            Self::prefix("BayLibre", "BayLibre Copilot Lite"),
        ]
    }

    /// Whether a device reporting these strings matches.
    pub fn matches(&self, manufacturer: &str, product: &str) -> bool {
        if manufacturer != self.manufacturer {
            return false;
        }
        match self.kind {
            MatchKind::Exact => product == self.product,
            MatchKind::Prefix => product.starts_with(self.product.as_str()),
        }
    }
}

/// The single device discovery settled on.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The device, ready to be opened.
    pub info: DeviceInfo,
    /// USB manufacturer string.
    pub manufacturer: String,
    /// USB product string.
    pub product: String,
    /// USB serial number string, if the device reports one.
    pub serial: Option<String>,
}

/// List all connected FTDI devices matching the given vendor and product IDs.
pub fn find_devices(vendor: u16, product: u16) -> Result<Vec<DeviceInfo>> {
    let devices: Vec<DeviceInfo> = nusb::list_devices()
        .wait()?
        .filter(|d| d.vendor_id() == vendor && d.product_id() == product)
        .collect();
    Ok(devices)
}

/// Find the one connected FT230X matching any of `identities`.
///
/// Each candidate is opened temporarily to read its string descriptors.
/// Fails with [`Error::DeviceNotFound`] if none match and with
/// [`Error::MultipleDevices`] if more than one does.
pub fn find_serializable_device(identities: &[Identity]) -> Result<Candidate> {
    let mut matching = Vec::new();

    for info in find_devices(FTDI_VID, pid::FT230X)? {
        let device = info.open().wait()?;
        let desc = device.device_descriptor();
        let read = |idx: Option<NonZeroU8>| -> Result<Option<String>> {
            match idx {
                Some(idx) => Ok(Some(
                    device
                        .get_string_descriptor(idx, LANGUAGE_ID, STRING_TIMEOUT)
                        .wait()?,
                )),
                None => Ok(None),
            }
        };

        let manufacturer = read(desc.manufacturer_string_index())?.unwrap_or_default();
        let product = read(desc.product_string_index())?.unwrap_or_default();
        let serial = read(desc.serial_number_string_index())?;
        log::debug!("candidate {manufacturer:?} / {product:?} / serial {serial:?}");

        if identities.iter().any(|id| id.matches(&manufacturer, &product)) {
            matching.push(Candidate {
                info,
                manufacturer,
                product,
                serial,
            });
        }
    }

    select_one(matching)
}

/// Enforce the "exactly one device" rule.
pub(crate) fn select_one<T>(mut matching: Vec<T>) -> Result<T> {
    log::info!("found {} matching device(s)", matching.len());
    match matching.len() {
        0 => Err(Error::DeviceNotFound),
        1 => Ok(matching.remove(0)),
        n => Err(Error::MultipleDevices(n)),
    }
}
