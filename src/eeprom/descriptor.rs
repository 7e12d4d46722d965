//! String descriptor encoding.
//!
//! The EEPROM stores strings as USB string descriptors: a length byte, a
//! type byte (0x03), then one content byte followed by a zero byte per
//! source character. Only the ASCII subset is representable; each byte of
//! the source string becomes one character.

use crate::constants::{MAX_STRING_DESCRIPTOR_SIZE, STRING_DESCRIPTOR_TYPE};
use crate::error::{Error, Result};

/// Size of the descriptor for a string of `chars` bytes.
#[inline]
pub fn encoded_len(chars: usize) -> usize {
    2 + chars * 2
}

/// Encode `source` as a string descriptor into `out`.
///
/// Returns the number of bytes written, which is also the value stored in
/// the first byte. Fails with [`Error::InsufficientBuffer`] if `out` cannot
/// hold the 2-byte prefix, and with [`Error::Truncated`] if the whole string
/// does not fit `out` or would not fit a single descriptor. Nothing is
/// written on failure.
///
/// Non-ASCII input is not rejected: each UTF-8 byte is stored as its own
/// character.
pub fn encode_into(source: &str, out: &mut [u8]) -> Result<usize> {
    if out.len() < 2 {
        return Err(Error::InsufficientBuffer {
            capacity: out.len(),
        });
    }

    let capacity = out.len().min(MAX_STRING_DESCRIPTOR_SIZE);
    let total_len = encoded_len(source.len());
    if total_len > capacity {
        return Err(Error::Truncated {
            needed: total_len,
            capacity,
        });
    }

    out[0] = total_len as u8;
    out[1] = STRING_DESCRIPTOR_TYPE;
    for (pair, ch) in out[2..total_len].chunks_exact_mut(2).zip(source.bytes()) {
        pair[0] = ch;
        pair[1] = 0x00;
    }

    Ok(total_len)
}

/// Encode `source` as a string descriptor of at most `capacity` bytes.
pub fn encode(source: &str, capacity: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; capacity.min(MAX_STRING_DESCRIPTOR_SIZE)];
    let len = encode_into(source, &mut out)?;
    out.truncate(len);
    Ok(out)
}

/// Decode a string descriptor back into a string.
///
/// Only the low byte of each character is kept. The size byte must match
/// the slice and the type byte must be 0x03.
pub fn decode(descriptor: &[u8]) -> Result<String> {
    let (&size, rest) = descriptor
        .split_first()
        .ok_or_else(|| Error::Eeprom("empty string descriptor".into()))?;
    if size as usize != descriptor.len() || size < 2 || size % 2 != 0 {
        return Err(Error::Eeprom(format!(
            "string descriptor size {size} does not match its {} byte slot",
            descriptor.len()
        )));
    }
    if rest[0] != STRING_DESCRIPTOR_TYPE {
        return Err(Error::Eeprom(format!(
            "unexpected descriptor type {:#04x}",
            rest[0]
        )));
    }

    Ok(rest[1..].chunks_exact(2).map(|pair| pair[0] as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_manufacturer() {
        let out = encode("BayLibre", 64).unwrap();
        assert_eq!(out.len(), 18);
        assert_eq!(out[0], 18);
        assert_eq!(out[1], 0x03);
        assert_eq!(&out[2..6], &[b'B', 0, b'a', 0]);
        assert_eq!(decode(&out).unwrap(), "BayLibre");
    }

    #[test]
    fn encode_empty_string() {
        assert_eq!(encode("", 2).unwrap(), vec![2, 3]);
    }

    #[test]
    fn capacity_below_prefix_is_rejected() {
        for capacity in 0..2 {
            let err = encode("", capacity).unwrap_err();
            assert!(matches!(err, Error::InsufficientBuffer { .. }));
        }
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut out = [0xFFu8; 10];
        assert_eq!(encode_into("FTDI", &mut out).unwrap(), 10);
        assert_eq!(out, [10, 3, b'F', 0, b'T', 0, b'D', 0, b'I', 0]);
    }

    #[test]
    fn one_byte_short_is_truncated_error() {
        let mut out = [0xFFu8; 9];
        let err = encode_into("FTDI", &mut out).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                needed: 10,
                capacity: 9
            }
        ));
        // Nothing written on failure
        assert_eq!(out, [0xFF; 9]);
    }

    #[test]
    fn longest_string_fits_one_byte_size() {
        let s = "x".repeat(126);
        let out = encode(&s, 512).unwrap();
        assert_eq!(out.len(), 254);
        assert_eq!(out[0], 254);

        let s = "x".repeat(127);
        let err = encode(&s, 512).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                needed: 256,
                capacity: 255
            }
        ));
    }

    #[test]
    fn non_ascii_is_encoded_bytewise() {
        // "é" is two UTF-8 bytes, so it becomes two characters
        let out = encode("é", 16).unwrap();
        assert_eq!(out, vec![6, 3, 0xC3, 0, 0xA9, 0]);
    }

    #[test]
    fn decode_rejects_bad_prefix() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[4, 3, b'A']).is_err());
        assert!(decode(&[4, 1, b'A', 0]).is_err());
    }
}
