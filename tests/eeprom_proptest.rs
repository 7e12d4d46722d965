//! Property-based tests for string descriptor encoding and table patching.
//!
//! Uses `proptest` to generate random identification strings and images and
//! verify the properties the serializer relies on: descriptors decode back
//! to their source, patching is deterministic, and nothing outside the
//! header and the rewritten table changes.

use ftdi_serializer::constants::{FTX_EEPROM_SIZE, FTX_HEADER_SIZE, FTX_STRING_TABLE_OFFSET};
use ftdi_serializer::eeprom::descriptor::{decode, encode};
use ftdi_serializer::eeprom::{DescriptorSlot, EepromImage, Patcher, Placement, StringField};
use ftdi_serializer::Error;
use proptest::prelude::*;

/// Printable ASCII short enough for the pointer bytes to stay in range
/// when used for both manufacturer and product.
fn short_ascii_string() -> impl Strategy<Value = String> {
    "[ -~]{0,20}"
}

/// Random image with a valid serial descriptor recorded in the header.
fn image_with_serial() -> impl Strategy<Value = EepromImage> {
    (
        prop::collection::vec(any::<u8>(), FTX_EEPROM_SIZE),
        "[A-Z0-9]{0,31}",
        0xA0usize..0xF0,
    )
        .prop_map(|(mut raw, serial, at)| {
            let desc = encode(&serial, 64).unwrap();
            raw[at..at + desc.len()].copy_from_slice(&desc);
            let mut image = EepromImage::from_bytes(&raw).unwrap();
            image
                .set_slot(
                    StringField::Serial,
                    DescriptorSlot {
                        offset: at,
                        len: desc.len(),
                    },
                )
                .unwrap();
            image
        })
}

proptest! {
    /// Size byte, type byte and payload all follow the source string.
    #[test]
    fn encode_decode_round_trip(s in "[ -~]{0,126}") {
        let out = encode(&s, 255).unwrap();
        prop_assert_eq!(out.len(), 2 + 2 * s.len());
        prop_assert_eq!(out[0] as usize, out.len());
        prop_assert_eq!(out[1], 3);
        prop_assert!(out[2..].chunks(2).all(|pair| pair[1] == 0));
        prop_assert_eq!(decode(&out).unwrap(), s);
    }

    /// A capacity below the 2-byte prefix always fails, whatever the input.
    #[test]
    fn tiny_capacity_fails(s in short_ascii_string(), capacity in 0usize..2) {
        let err = encode(&s, capacity).unwrap_err();
        prop_assert!(matches!(err, Error::InsufficientBuffer { .. }), "expected InsufficientBuffer, got {:?}", err);
    }

    /// Strings that do not fit are rejected instead of cut short.
    #[test]
    fn never_truncates_silently(s in "[a-z]{1,60}", capacity in 2usize..120) {
        match encode(&s, capacity) {
            Ok(out) => prop_assert_eq!(decode(&out).unwrap(), s),
            Err(Error::Truncated { needed, .. }) => {
                prop_assert!(needed > capacity);
                prop_assert_eq!(needed, 2 + 2 * s.len());
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    /// Patching twice with the same strings gives the same image.
    #[test]
    fn patch_is_idempotent(
        image in image_with_serial(),
        manufacturer in short_ascii_string(),
        product in short_ascii_string(),
    ) {
        let patcher = Patcher::new(manufacturer, product);
        let mut once = image;
        patcher.patch(&mut once).unwrap();
        let mut twice = once.clone();
        patcher.patch(&mut twice).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Only the header and the rewritten table may differ, and the serial
    /// descriptor moves unchanged.
    #[test]
    fn patch_preserves_everything_else(
        image in image_with_serial(),
        manufacturer in short_ascii_string(),
        product in short_ascii_string(),
    ) {
        let original = image.clone();
        let old_serial = original.slot(StringField::Serial).unwrap();
        let old_serial_bytes = original
            .bytes_at(old_serial.offset, old_serial.len)
            .unwrap()
            .to_vec();

        let mut patched = image;
        let placement = Patcher::new(manufacturer, product).patch(&mut patched).unwrap();

        for i in 0..FTX_EEPROM_SIZE {
            let touched = i < FTX_HEADER_SIZE
                || (FTX_STRING_TABLE_OFFSET..placement.end()).contains(&i);
            if !touched {
                prop_assert_eq!(
                    patched.as_bytes()[i],
                    original.as_bytes()[i],
                    "byte {:#x} changed",
                    i
                );
            }
        }
        for i in (0..FTX_HEADER_SIZE).filter(|i| !(0x0E..0x14).contains(i)) {
            prop_assert_eq!(patched.as_bytes()[i], original.as_bytes()[i]);
        }
        prop_assert_eq!(
            patched.bytes_at(placement.serial.offset, placement.serial.len).unwrap(),
            &old_serial_bytes[..]
        );
    }

    /// Descriptor ranges are strictly ordered and pairwise disjoint.
    #[test]
    fn placement_is_ordered_and_disjoint(m in 2usize..256, p in 2usize..256, s in 0usize..256) {
        match Placement::compute(FTX_STRING_TABLE_OFFSET, FTX_EEPROM_SIZE, m, p, s) {
            Ok(placement) => {
                prop_assert!(placement.manufacturer.offset < placement.product.offset);
                prop_assert!(placement.product.offset < placement.serial.offset);
                prop_assert!(placement.manufacturer.end() <= placement.product.offset);
                prop_assert!(placement.product.end() <= placement.serial.offset);
                prop_assert!(placement.serial.offset < 0x100);
            }
            Err(Error::TableOverflow { .. }) => {
                prop_assert!(FTX_STRING_TABLE_OFFSET + m + p >= 0x100);
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }
}

/// Placement for the Copilot Lite strings with a 16-byte serial.
#[test]
fn copilot_lite_pointer_pairs() {
    let mut raw = vec![0u8; FTX_EEPROM_SIZE];
    let serial = encode("A5XK3RJ", 64).unwrap();
    assert_eq!(serial.len(), 16);
    raw[0xD0..0xE0].copy_from_slice(&serial);
    raw[0x12] = 0xD0;
    raw[0x13] = 16;
    let mut image = EepromImage::from_bytes(&raw).unwrap();

    Patcher::new("BayLibre", "BayLibre Copilot Lite V1.1")
        .patch(&mut image)
        .unwrap();

    let bytes = image.as_bytes();
    assert_eq!((bytes[0x0E], bytes[0x0F]), (160, 18));
    assert_eq!((bytes[0x10], bytes[0x11]), (178, 54));
    assert_eq!((bytes[0x12], bytes[0x13]), (232, 16));
    assert_eq!(&bytes[232..248], &serial[..]);
}

/// A table that cannot be placed is refused before anything is written.
#[test]
fn overflow_leaves_image_unchanged() {
    let raw: Vec<u8> = (0..FTX_EEPROM_SIZE).map(|i| i as u8).collect();
    let mut image = EepromImage::from_bytes(&raw).unwrap();
    let before = image.clone();

    let long = "L".repeat(126);
    let err = Patcher::new(long.as_str(), long.as_str())
        .serial_capacity(255)
        .patch(&mut image)
        .unwrap_err();
    assert!(matches!(err, Error::TableOverflow { .. }));
    assert_eq!(image, before);
}
