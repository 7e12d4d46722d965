//! FT-X EEPROM checksum.

use crate::constants::*;
use crate::error::{Error, Result};

use super::layout::{EepromImage, StringField};

/// Compute the checksum of the configuration area.
///
/// The algorithm is: XOR each 16-bit word, then rotate-left-1 the accumulator.
/// Starting seed is 0xAAAA. The user area is not part of the checksum.
pub fn checksum(image: &EepromImage) -> u16 {
    let buf = image.as_bytes();
    let mut csum: u16 = 0xAAAA;
    let mut i = 0;
    while i < FTX_CHECKSUM_OFFSET / 2 {
        if i == FTX_USER_AREA_WORDS.start {
            i = FTX_USER_AREA_WORDS.end;
        }
        let value = (buf[i * 2] as u16) | ((buf[i * 2 + 1] as u16) << 8);
        csum ^= value;
        csum = csum.rotate_left(1);
        i += 1;
    }
    csum
}

/// The checksum currently stored in the image.
pub fn stored(image: &EepromImage) -> Result<u16> {
    image.u16_at(FTX_CHECKSUM_OFFSET)
}

/// Check the stored checksum against the computed one.
pub fn verify(image: &EepromImage) -> Result<()> {
    let stored = stored(image)?;
    let computed = checksum(image);
    if stored != computed {
        return Err(Error::EepromChecksum { stored, computed });
    }
    Ok(())
}

/// Store a fresh checksum in the image.
///
/// Fails with [`Error::ChecksumOverlap`] if a string descriptor extends
/// into the checksum word, since sealing would corrupt it.
pub fn seal(image: &mut EepromImage) -> Result<u16> {
    for field in [StringField::Manufacturer, StringField::Product, StringField::Serial] {
        let slot = image.slot(field)?;
        if slot.len > 0 && slot.end() > FTX_CHECKSUM_OFFSET {
            return Err(Error::ChecksumOverlap {
                end: slot.end(),
                checksum: FTX_CHECKSUM_OFFSET,
            });
        }
    }

    let csum = checksum(image);
    image.set_u16(FTX_CHECKSUM_OFFSET, csum)?;
    log::debug!("sealed EEPROM image with checksum {csum:#06x}");
    Ok(csum)
}
