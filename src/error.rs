//! Error types for the serializer.

/// The error type for EEPROM serialization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the nusb USB layer.
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    /// A USB transfer error.
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    /// A descriptor read failed.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] nusb::GetDescriptorError),

    /// No matching device was found.
    #[error("device not found")]
    DeviceNotFound,

    /// More than one matching device is connected.
    #[error("{0} matching devices found, expected exactly one")]
    MultipleDevices(usize),

    /// Invalid argument(s) were provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The output region cannot even hold a descriptor prefix.
    #[error("descriptor buffer too small: {capacity} bytes, need at least 2")]
    InsufficientBuffer {
        /// Capacity of the output region.
        capacity: usize,
    },

    /// The string does not fit the output region or a single descriptor.
    #[error("string descriptor needs {needed} bytes but only {capacity} are available")]
    Truncated {
        /// Encoded size the full string would need.
        needed: usize,
        /// Usable capacity.
        capacity: usize,
    },

    /// Encoding one of the identification strings failed.
    #[error("failed to encode the {field} string: {source}")]
    EncodingFailed {
        /// Which string was being encoded.
        field: &'static str,
        /// The encoder error.
        #[source]
        source: Box<Error>,
    },

    /// The serial number descriptor read from the image is larger than the
    /// scratch space reserved for it.
    #[error("serial descriptor of {size} bytes exceeds the {capacity} byte limit")]
    SerialTooLong {
        /// Size recorded in the header.
        size: usize,
        /// Scratch capacity.
        capacity: usize,
    },

    /// The descriptors do not fit the string descriptor space.
    #[error("string descriptor table overflows: reaches {end}, limit {limit}")]
    TableOverflow {
        /// Offset that does not fit under `limit`.
        end: usize,
        /// Bound that was exceeded.
        limit: usize,
    },

    /// The supplied buffer is not a valid EEPROM image.
    #[error("invalid EEPROM image: {len} bytes, expected {expected}")]
    InvalidImage {
        /// Supplied length.
        len: usize,
        /// Required length.
        expected: usize,
    },

    /// An EEPROM-related error.
    #[error("EEPROM error: {0}")]
    Eeprom(String),

    /// EEPROM checksum verification failed.
    #[error("EEPROM checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    EepromChecksum {
        /// Checksum found in the image.
        stored: u16,
        /// Checksum computed over the image.
        computed: u16,
    },

    /// The string descriptors reach into the checksum word.
    #[error("string descriptors end at {end:#x}, overlapping the checksum at {checksum:#x}")]
    ChecksumOverlap {
        /// First byte past the descriptor table.
        end: usize,
        /// Checksum offset.
        checksum: usize,
    },
}

/// A specialized `Result` type for serializer operations.
pub type Result<T> = std::result::Result<T, Error>;
