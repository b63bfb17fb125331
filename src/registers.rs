//! Register-level wire contract shared by the IS31FL373x family.
//!
//! The register space is split into four pages selected through a lock/command
//! pair: every page switch writes the unlock value to [`UNLOCK_REGISTER`] and
//! the page number to [`COMMAND_REGISTER`]. The lock re-arms after a single
//! command write, so both steps repeat on every switch.

/// Write-lock register; accepts [`UNLOCK_VALUE`] to arm one command write.
pub const UNLOCK_REGISTER: u8 = 0xFE;

/// Command register; an armed write here selects the active page.
pub const COMMAND_REGISTER: u8 = 0xFD;

/// Value that unlocks [`COMMAND_REGISTER`] for exactly one write.
pub const UNLOCK_VALUE: u8 = 0xC5;

/// Register pages behind the command register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Page {
    /// LED on/off control bits, one bit per LED, two bytes per row.
    LedControl = 0x00,
    /// PWM intensity, one byte per LED.
    Pwm = 0x01,
    /// Auto-breath mode assignment (engine not driven by this crate).
    AutoBreath = 0x02,
    /// Configuration, global current, and reset.
    Function = 0x03,
}

/// Configuration register offset within [`Page::Function`].
pub const CONFIGURATION_REGISTER: u8 = 0x00;

/// Configuration bit 0: software shutdown released, normal operation.
pub const CONFIGURATION_NORMAL_OPERATION: u8 = 0b0000_0001;

/// Global current control register offset within [`Page::Function`].
pub const GLOBAL_CURRENT_REGISTER: u8 = 0x01;

/// Reset register offset within [`Page::Function`]; reading it resets the
/// chip to its power-on state.
pub const RESET_REGISTER: u8 = 0x11;

/// Register-address span of one matrix row. Fixed at 16 for every family
/// member, including the 12-column chips, which leave the tail of each row
/// unused.
pub const ROW_STRIDE: u8 = 16;

/// Base 7-bit bus address; the ADDR pin patterns are OR'd into the low bits.
pub const BASE_ADDRESS: u8 = 0x50;

/// Delay after triggering a reset before the chip accepts traffic again.
pub const RESET_SETTLE_MS: u32 = 10;
