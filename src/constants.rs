//! Protocol and EEPROM layout constants for FT-X devices.
//!
//! These constants define the USB identifiers, vendor request codes and
//! the fixed geometry of the FT-X configuration EEPROM.

// ---- FTDI Vendor ID and known Product IDs ----

/// Default FTDI vendor ID.
pub const FTDI_VID: u16 = 0x0403;

/// Known FTDI product IDs.
pub mod pid {
    /// FT230X / FT231X / FT234XD.
    pub const FT230X: u16 = 0x6015;
}

// ---- SIO vendor request codes ----

/// Reset the port.
pub(crate) const SIO_RESET_REQUEST: u8 = 0x00;
/// Set latency timer.
pub(crate) const SIO_SET_LATENCY_TIMER_REQUEST: u8 = 0x09;
/// Read EEPROM.
pub(crate) const SIO_READ_EEPROM_REQUEST: u8 = 0x90;
/// Write EEPROM.
pub(crate) const SIO_WRITE_EEPROM_REQUEST: u8 = 0x91;

/// SIO reset (device reset).
pub(crate) const SIO_RESET_SIO: u16 = 0;

// ---- EEPROM geometry ----

/// Size of the FT-X MTP memory image in bytes.
pub const FTX_EEPROM_SIZE: usize = 2048;

/// Size of the fixed EEPROM header in bytes.
pub const FTX_HEADER_SIZE: usize = 0x24;

/// Start of the String Descriptor Space.
pub const FTX_STRING_TABLE_OFFSET: usize = 0xA0;

/// End of the configuration area covered by the checksum.
pub const FTX_CONFIG_AREA_SIZE: usize = 0x100;

/// Offset of the checksum word (last word of the configuration area).
pub const FTX_CHECKSUM_OFFSET: usize = FTX_CONFIG_AREA_SIZE - 2;

/// Word range of the user area, excluded from the checksum.
pub(crate) const FTX_USER_AREA_WORDS: std::ops::Range<usize> = 0x12..0x40;

/// Word range of the factory configuration, never written back.
pub(crate) const FTX_FACTORY_AREA_WORDS: std::ops::Range<usize> = 0x40..0x50;

/// USB string descriptor type tag.
pub const STRING_DESCRIPTOR_TYPE: u8 = 0x03;

/// Largest string descriptor whose size fits the one-byte length field.
pub const MAX_STRING_DESCRIPTOR_SIZE: usize = 0xFF;

/// Max power is stored as value * 2 mA.
pub(crate) const MAX_POWER_MILLIAMP_PER_UNIT: u16 = 2;

/// Largest bus current a USB 2.0 device may request.
pub const MAX_BUS_POWER_MA: u16 = 500;

/// Number of CBUS pins on the FT230X.
pub const FT230X_CBUS_PINS: usize = 4;

// ---- CBUS pin function enumerations ----

/// CBUS pin functions for FT230X.
pub mod cbusx {
    /// Tristate (high-Z).
    pub const TRISTATE: u8 = 0;
    /// TX LED.
    pub const TXLED: u8 = 1;
    /// RX LED.
    pub const RXLED: u8 = 2;
    /// TX/RX LED.
    pub const TXRXLED: u8 = 3;
    /// Power Enable.
    pub const PWREN: u8 = 4;
    /// Sleep.
    pub const SLEEP: u8 = 5;
    /// Drive low.
    pub const DRIVE_0: u8 = 6;
    /// Drive high.
    pub const DRIVE_1: u8 = 7;
    /// IO mode.
    pub const IOMODE: u8 = 8;
    /// TX Data Enable.
    pub const TXDEN: u8 = 9;
    /// 24 MHz clock output.
    pub const CLK24: u8 = 10;
    /// 12 MHz clock output.
    pub const CLK12: u8 = 11;
    /// 6 MHz clock output.
    pub const CLK6: u8 = 12;
    /// Battery detect.
    pub const BAT_DETECT: u8 = 13;
    /// Battery detect (negative).
    pub const BAT_DETECT_NEG: u8 = 14;
    /// I2C TX empty.
    pub const I2C_TXE: u8 = 15;
    /// I2C RX full.
    pub const I2C_RXF: u8 = 16;
    /// VBUS sense.
    pub const VBUS_SENSE: u8 = 17;
    /// Bitbang write.
    pub const BB_WR: u8 = 18;
    /// Bitbang read.
    pub const BB_RD: u8 = 19;
    /// Timestamp.
    pub const TIME_STAMP: u8 = 20;
    /// Awake signal.
    pub const AWAKE: u8 = 21;
}
