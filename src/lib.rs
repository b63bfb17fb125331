//! Buffered driver for the IS31FL373x family of I2C LED matrix controllers
//! (IS31FL3733, IS31FL3737, IS31FL3737B).
//!
//! The three chips share one register architecture - four pages behind an
//! unlock/command pair - but differ in matrix size and in how logical
//! columns land in register space. Every variant strides its register rows
//! by 16 bytes regardless of its true column count, and the IS31FL3737
//! additionally jumps over two addresses in the middle of each row. Writing
//! into those unused addresses silently corrupts the chip's internal address
//! pointer, so this crate routes every pixel through a per-variant address
//! translation and never performs flat copies into register space.
//!
//! # Glossary
//!
//! - **Logical pixel:** one LED as addressed by the public `(x, y)` or
//!   linear-index API, independent of its register location.
//! - **Stride:** the fixed 16-byte register span of one matrix row.
//! - **Pin offset:** a caller-configured shift applied to logical
//!   coordinates before hardware-pin conversion, for cross-variant
//!   pin-compatible wiring.
//! - **Custom layout:** a caller-supplied table mapping logical indices to
//!   hardware pin pairs, bypassing the rectangular model (see
//!   [`PixelLayout`]).
//! - **Canvas:** several chips chained into one logical rectangle (see
//!   [`Canvas`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use is31fl373x::{AddrPin, Device, Is31fl3737, Result};
//!
//! fn checkerboard<I2C: I2c>(i2c: I2C, delay: &mut impl DelayNs) -> Result<()> {
//!     // Pure-data construction; the bus is not touched until initialize.
//!     let mut matrix = Device::<Is31fl3737, _>::new(i2c, AddrPin::Gnd);
//!     matrix.initialize(delay)?;
//!
//!     for y in 0..matrix.height() as i32 {
//!         for x in 0..matrix.width() as i32 {
//!             if (x + y) % 2 == 0 {
//!                 matrix.set_pixel_at(x, y, 80);
//!             }
//!         }
//!     }
//!     matrix.show()
//! }
//! ```
//!
//! Devices also implement [`embedded_graphics::draw_target::DrawTarget`]
//! with [`Gray8`](embedded_graphics::pixelcolor::Gray8) color, so lines,
//! shapes, and text render straight into the frame buffer.
//!
//! # Execution model
//!
//! Strictly single-threaded, synchronous, blocking. Every bus transaction
//! completes or fails before the call returns; failures surface as
//! [`Error`] values, never panics. Retries are the caller's policy.
//!
//! # Cargo features
//!
//! - `defmt`: derive `defmt::Format` on public types and emit a few
//!   `defmt` debug statements from initialization.

#![cfg_attr(not(test), no_std)]

pub mod canvas;
pub mod device;
mod error;
pub mod layout;
pub mod registers;
pub mod variant;

pub use crate::canvas::{Canvas, CanvasLayout};
pub use crate::device::{Device, Matrix};
pub use crate::error::{Error, Result};
pub use crate::layout::{PinPair, PixelLayout};
pub use crate::variant::{AddrPin, Is31fl3733, Is31fl3737, Is31fl3737B, Variant};
