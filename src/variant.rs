//! Compile-time chip selection and per-variant address translation.
//!
//! The family exposes no identification register, so the chip variant cannot
//! be probed at runtime; the integrator names it at construction time by
//! picking one of the marker types here. Each marker implements [`Variant`],
//! which carries the matrix geometry and the hardware-pin to register-address
//! translation.
//!
//! Translation is shared arithmetic with one replaceable step: the provided
//! [`Variant::register_for_pins`] / [`Variant::pins_for_register`] methods
//! implement the fixed 16-byte row stride, and call
//! [`Variant::column_offset`] / [`Variant::column_for_offset`] for the
//! column-to-offset step. Only [`Is31fl3737`] overrides that step, for the
//! discontinuity in the middle of each of its register rows.

use crate::registers::{BASE_ADDRESS, ROW_STRIDE};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Is31fl3733 {}
    impl Sealed for super::Is31fl3737 {}
    impl Sealed for super::Is31fl3737B {}
}

/// Wiring of an ADDR pin, which selects the device's bus address.
///
/// The IS31FL3733 has two such pins; the IS31FL3737 and IS31FL3737B have
/// one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddrPin {
    /// Pin tied to ground.
    Gnd,
    /// Pin tied to the supply rail.
    Vcc,
    /// Pin tied to the SDA line.
    Sda,
    /// Pin tied to the SCL line.
    Scl,
}

impl AddrPin {
    /// Two-bit address field used by the dual-ADDR-pin IS31FL3733.
    const fn two_bit_pattern(self) -> u8 {
        match self {
            Self::Gnd => 0b00,
            Self::Vcc => 0b01,
            Self::Sda => 0b10,
            Self::Scl => 0b11,
        }
    }

    /// Four-bit address field used by the single-ADDR-pin chips.
    ///
    /// The pin-to-bits relationship is hardware-defined and non-sequential;
    /// these are the four patterns the chip actually decodes, not a binary
    /// count.
    const fn four_bit_pattern(self) -> u8 {
        match self {
            Self::Gnd => 0b0000,
            Self::Scl => 0b0101,
            Self::Sda => 0b1010,
            Self::Vcc => 0b1111,
        }
    }
}

/// Capability set of one chip variant: geometry plus address translation.
///
/// Sealed; the three implementations below are the whole family.
pub trait Variant: sealed::Sealed {
    /// Logical matrix width (columns actually bonded out).
    const WIDTH: usize;
    /// Logical matrix height (rows).
    const HEIGHT: usize;
    /// Logical pixel count, `WIDTH * HEIGHT`.
    const PIXEL_COUNT: usize;

    /// Column-to-offset step of the translation, taking the 1-based `cs`
    /// pin to its offset within a register row.
    #[must_use]
    fn column_offset(cs: u8) -> u8 {
        cs - 1
    }

    /// Inverse of [`Self::column_offset`].
    #[must_use]
    fn column_for_offset(offset: u8) -> u8 {
        offset + 1
    }

    /// Register address for 1-based hardware pins `cs` (column, from 1) and
    /// `sw` (row, from 1).
    ///
    /// Every variant uses the full [`ROW_STRIDE`] per row even when fewer
    /// columns exist; the unused addresses must never be written, so callers
    /// pass only pins that exist on this variant.
    #[must_use]
    fn register_for_pins(cs: u8, sw: u8) -> u8 {
        (sw - 1) * ROW_STRIDE + Self::column_offset(cs)
    }

    /// Recover the 1-based `(cs, sw)` pins for a register address previously
    /// produced by [`Self::register_for_pins`]. Addresses inside a variant's
    /// unused ranges are not valid inputs.
    #[must_use]
    fn pins_for_register(address: u8) -> (u8, u8) {
        (
            Self::column_for_offset(address % ROW_STRIDE),
            address / ROW_STRIDE + 1,
        )
    }
}

/// IS31FL3733: 16 x 12 matrix, two ADDR pins, no register discontinuity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Is31fl3733;

impl Variant for Is31fl3733 {
    const WIDTH: usize = 16;
    const HEIGHT: usize = 12;
    const PIXEL_COUNT: usize = 192; // 16 * 12
}

impl Is31fl3733 {
    /// 7-bit bus address for the given ADDR1/ADDR2 wiring.
    #[must_use]
    pub const fn bus_address(addr1: AddrPin, addr2: AddrPin) -> u8 {
        BASE_ADDRESS | (addr2.two_bit_pattern() << 2) | addr1.two_bit_pattern()
    }
}

/// IS31FL3737: 12 x 12 matrix, one ADDR pin, and a jump in the middle of
/// every register row: columns 7..=12 land at offsets 8..=13, leaving
/// per-row offsets 6, 7, 14, 15 permanently unused.
#[derive(Clone, Copy, Debug, Default)]
pub struct Is31fl3737;

impl Variant for Is31fl3737 {
    const WIDTH: usize = 12;
    const HEIGHT: usize = 12;
    const PIXEL_COUNT: usize = 144; // 12 * 12

    fn column_offset(cs: u8) -> u8 {
        if cs >= 7 { cs + 1 } else { cs - 1 }
    }

    fn column_for_offset(offset: u8) -> u8 {
        if offset >= 8 { offset - 1 } else { offset + 1 }
    }
}

impl Is31fl3737 {
    /// 7-bit bus address for the given ADDR wiring.
    #[must_use]
    pub const fn bus_address(addr: AddrPin) -> u8 {
        BASE_ADDRESS | addr.four_bit_pattern()
    }
}

/// IS31FL3737B: 12 x 12 matrix, one ADDR pin, plain stride-16 rows like the
/// IS31FL3733.
#[derive(Clone, Copy, Debug, Default)]
pub struct Is31fl3737B;

impl Variant for Is31fl3737B {
    const WIDTH: usize = 12;
    const HEIGHT: usize = 12;
    const PIXEL_COUNT: usize = 144; // 12 * 12
}

impl Is31fl3737B {
    /// 7-bit bus address for the given ADDR wiring.
    #[must_use]
    pub const fn bus_address(addr: AddrPin) -> u8 {
        BASE_ADDRESS | addr.four_bit_pattern()
    }
}
