//! A device abstraction for one IS31FL373x LED matrix controller.
//!
//! [`Device`] owns an in-memory intensity buffer sized to the chip's logical
//! matrix and a bus object implementing [`embedded_hal::i2c::I2c`]. Drawing
//! calls mutate only the buffer; [`Device::show`] translates every buffered
//! pixel to its physical register address and transmits the frame.
//!
//! Construction is pure data - no bus traffic happens until
//! [`Device::initialize`], which allocates the buffer and runs the chip's
//! reset/enable/configure sequence. A device whose initialization failed (or
//! never ran) stays inert: pixel writes and `show` are silent no-ops.
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use is31fl373x::{AddrPin, Device, Is31fl3733, Result};
//!
//! fn corner_dot<I2C: I2c>(i2c: I2C, delay: &mut impl DelayNs) -> Result<()> {
//!     let mut matrix = Device::<Is31fl3733, _>::new(i2c, AddrPin::Gnd, AddrPin::Gnd);
//!     matrix.initialize(delay)?;
//!     matrix.set_master_brightness(128);
//!     matrix.set_pixel_at(0, 0, 255);
//!     matrix.show()?;
//!     Ok(())
//! }
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::{Gray8, GrayColor},
    prelude::{OriginDimensions, Pixel, Size},
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use heapless::Vec;

use crate::error::{Error, Result};
use crate::layout::PinPair;
use crate::registers::{
    COMMAND_REGISTER, CONFIGURATION_NORMAL_OPERATION, CONFIGURATION_REGISTER,
    GLOBAL_CURRENT_REGISTER, Page, RESET_REGISTER, RESET_SETTLE_MS, UNLOCK_REGISTER, UNLOCK_VALUE,
};
use crate::variant::{AddrPin, Is31fl3733, Is31fl3737, Is31fl3737B, Variant};

/// Largest logical pixel count in the family (IS31FL3733, 16 x 12).
const MAX_PIXEL_COUNT: usize = 192;

/// Global current value a device starts with until the caller overrides it.
const DEFAULT_GLOBAL_CURRENT: u8 = 128;

/// Capability set shared by every chip variant's [`Device`], object-safe so
/// heterogeneous devices can sit behind one [`Canvas`](crate::Canvas).
pub trait Matrix {
    /// Logical matrix width in pixels.
    fn width(&self) -> usize;
    /// Logical matrix height in pixels.
    fn height(&self) -> usize;
    /// Allocate the frame buffer and run the chip's init sequence.
    fn initialize(&mut self, delay: &mut dyn DelayNs) -> Result<()>;
    /// Buffer one pixel; out-of-range coordinates are silently dropped.
    fn set_pixel_at(&mut self, x: i32, y: i32, pwm: u8);
    /// Zero the frame buffer.
    fn clear(&mut self);
    /// Transmit the frame buffer to the chip.
    fn show(&mut self) -> Result<()>;
    /// Set the hardware global current, writing through when initialized.
    fn set_global_current(&mut self, current: u8) -> Result<()>;
    /// Set the software master brightness applied to subsequent writes.
    fn set_master_brightness(&mut self, brightness: u8);
    /// Number of buffered pixels with a non-zero intensity.
    fn non_zero_pixel_count(&self) -> u16;
}

/// Driver for one chip, generic over the [`Variant`] marker and the bus.
///
/// The `'m` lifetime is the borrow of an optional caller-owned custom pixel
/// layout (see [`Device::set_layout`]); it is inferred as `'static` when no
/// layout is used.
pub struct Device<'m, V: Variant, I2C> {
    i2c: I2C,
    address: u8,
    buffer: Vec<u8, MAX_PIXEL_COUNT>,
    global_current: u8,
    master_brightness: u8,
    cs_offset: u8,
    sw_offset: u8,
    layout: Option<&'m [PinPair]>,
    _variant: PhantomData<V>,
}

impl<I2C> Device<'_, Is31fl3733, I2C> {
    /// Driver for an IS31FL3733 with the given ADDR1/ADDR2 wiring.
    #[must_use]
    pub fn new(i2c: I2C, addr1: AddrPin, addr2: AddrPin) -> Self {
        Self::with_address(i2c, Is31fl3733::bus_address(addr1, addr2))
    }
}

impl<I2C> Device<'_, Is31fl3737, I2C> {
    /// Driver for an IS31FL3737 with the given ADDR wiring.
    #[must_use]
    pub fn new(i2c: I2C, addr: AddrPin) -> Self {
        Self::with_address(i2c, Is31fl3737::bus_address(addr))
    }
}

impl<I2C> Device<'_, Is31fl3737B, I2C> {
    /// Driver for an IS31FL3737B with the given ADDR wiring.
    #[must_use]
    pub fn new(i2c: I2C, addr: AddrPin) -> Self {
        Self::with_address(i2c, Is31fl3737B::bus_address(addr))
    }
}

impl<'m, V: Variant, I2C> Device<'m, V, I2C> {
    /// Driver with a precomputed 7-bit bus address.
    ///
    /// Prefer the per-chip `new` constructors; this exists for buses with
    /// address translators in between.
    #[must_use]
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: Vec::new(),
            global_current: DEFAULT_GLOBAL_CURRENT,
            master_brightness: u8::MAX,
            cs_offset: 0,
            sw_offset: 0,
            layout: None,
            _variant: PhantomData,
        }
    }

    /// Consume the driver and hand the bus object back.
    #[must_use]
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Logical matrix width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        V::WIDTH
    }

    /// Logical matrix height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        V::HEIGHT
    }

    /// 7-bit bus address this driver talks to.
    #[must_use]
    pub const fn i2c_address(&self) -> u8 {
        self.address
    }

    /// Whether [`Device::initialize`] has completed successfully.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Currently configured hardware global current.
    #[must_use]
    pub const fn global_current(&self) -> u8 {
        self.global_current
    }

    /// Currently configured software master brightness.
    #[must_use]
    pub const fn master_brightness(&self) -> u8 {
        self.master_brightness
    }

    /// Set the software master brightness (255 = unscaled).
    ///
    /// Applies to pixel writes from this point on; already-buffered values
    /// keep the scale they were written with.
    pub fn set_master_brightness(&mut self, brightness: u8) {
        self.master_brightness = brightness;
    }

    /// Shift all logical coordinates by `(cs_offset, sw_offset)` before
    /// hardware-pin conversion.
    ///
    /// Lets this driver address a pin-compatible chip whose pin labeling
    /// starts at a different base. Purely a coordinate shift; stride and
    /// per-variant remapping are unaffected.
    pub fn set_coordinate_offset(&mut self, cs_offset: u8, sw_offset: u8) {
        self.cs_offset = cs_offset;
        self.sw_offset = sw_offset;
    }

    /// Borrow a custom pixel layout, replacing any previous one; `None`
    /// restores the rectangular model.
    ///
    /// While a layout is set, [`Device::show`] ignores the rectangular
    /// mapping and writes buffer slot `i` to the LED wired at `layout[i]`
    /// (after applying the coordinate offset). Draw by linear index with
    /// [`Device::set_pixel_by_index`]. The table is caller-owned and must
    /// outlive its use by this device.
    pub fn set_layout(&mut self, layout: Option<&'m [PinPair]>) {
        self.layout = layout;
    }

    /// Whether a non-empty custom layout is active.
    #[must_use]
    pub fn is_custom_layout_active(&self) -> bool {
        self.active_layout().is_some()
    }

    /// Entry count of the active custom layout (0 without one).
    #[must_use]
    pub fn layout_size(&self) -> usize {
        self.active_layout().map_or(0, <[PinPair]>::len)
    }

    /// Buffer the intensity for the pixel at `(x, y)`.
    ///
    /// Out-of-range coordinates (including negative ones) are silently
    /// dropped, as are writes while uninitialized. The stored value is
    /// scaled by the master brightness.
    pub fn set_pixel_at(&mut self, x: i32, y: i32, pwm: u8) {
        if x < 0 || y < 0 || x >= V::WIDTH as i32 || y >= V::HEIGHT as i32 {
            return;
        }
        self.set_pixel_by_index(y as usize * V::WIDTH + x as usize, pwm);
    }

    /// Buffer the intensity for the pixel at a linear index, the drawing
    /// model for custom layouts. Same scaling and silent-drop policy as
    /// [`Device::set_pixel_at`].
    pub fn set_pixel_by_index(&mut self, index: usize, pwm: u8) {
        let scaled = scale_intensity(pwm, self.master_brightness);
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot = scaled;
        }
    }

    /// Zero the frame buffer. No bus traffic until the next `show`.
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Buffered intensity at `(x, y)`, 0 when out of range or uninitialized.
    #[must_use]
    pub fn pixel_value(&self, x: usize, y: usize) -> u8 {
        if x >= V::WIDTH || y >= V::HEIGHT {
            return 0;
        }
        self.pixel_value_by_index(y * V::WIDTH + x)
    }

    /// Buffered intensity at a linear index, 0 when out of range.
    #[must_use]
    pub fn pixel_value_by_index(&self, index: usize) -> u8 {
        self.buffer.get(index).copied().unwrap_or(0)
    }

    /// Number of buffered pixels with a non-zero intensity.
    #[must_use]
    pub fn non_zero_pixel_count(&self) -> u16 {
        self.buffer.iter().filter(|&&value| value != 0).count() as u16
    }

    /// Sum of all buffered intensities.
    #[must_use]
    pub fn pixel_sum(&self) -> u16 {
        self.buffer.iter().map(|&value| u16::from(value)).sum()
    }

    /// Register address for the logical coordinate `(x, y)` on this variant,
    /// with the configured coordinate offset applied.
    ///
    /// Input must lie within the (offset-shifted) matrix; callers validate
    /// before translating.
    #[must_use]
    pub fn coord_to_register(&self, x: usize, y: usize) -> u8 {
        let cs = x as u8 + self.cs_offset + 1;
        let sw = y as u8 + self.sw_offset + 1;
        V::register_for_pins(cs, sw)
    }

    /// Logical coordinate for a register address previously produced by
    /// [`Device::coord_to_register`]. Addresses in a variant's unused ranges
    /// are not valid inputs.
    #[must_use]
    pub fn register_to_coord(&self, register: u8) -> (usize, usize) {
        let (cs, sw) = V::pins_for_register(register);
        (
            usize::from(cs - 1 - self.cs_offset),
            usize::from(sw - 1 - self.sw_offset),
        )
    }

    fn active_layout(&self) -> Option<&'m [PinPair]> {
        self.layout.filter(|table| !table.is_empty())
    }
}

impl<V: Variant, I2C: I2c> Device<'_, V, I2C> {
    /// Bring the chip from power-on (or any unknown state) to normal
    /// operation.
    ///
    /// Allocates and zeroes the frame buffer, resets the chip, enables every
    /// LED control register, releases software shutdown, programs the global
    /// current, and leaves the PWM page selected for subsequent [`show`]
    /// calls. Safe to call again on an already-initialized device.
    ///
    /// On failure the buffer is released again, so the device stays inert
    /// and [`Device::is_initialized`] stays `false`.
    ///
    /// [`show`]: Device::show
    pub fn initialize(&mut self, delay: &mut (impl DelayNs + ?Sized)) -> Result<()> {
        self.buffer
            .resize(V::PIXEL_COUNT, 0)
            .map_err(|()| Error::BufferAllocation)?;
        self.buffer.fill(0);
        match self.configure_chip(delay) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "is31fl373x: device at {=u8:#x} configured, {=usize} pixels",
                    self.address,
                    V::PIXEL_COUNT
                );
                Ok(())
            }
            Err(error) => {
                self.buffer.clear();
                Err(error)
            }
        }
    }

    fn configure_chip(&mut self, delay: &mut (impl DelayNs + ?Sized)) -> Result<()> {
        // Reading the reset register restores power-on defaults.
        self.select_page(Page::Function)?;
        let _ = self.read_register(RESET_REGISTER)?;
        delay.delay_ms(RESET_SETTLE_MS);

        // PWM values are invisible until the matching control bits are set,
        // so enable every LED up front; brightness is controlled per pixel.
        self.select_page(Page::LedControl)?;
        for register in 0..V::HEIGHT as u8 * 2 {
            self.write_register(register, 0xFF)?;
        }

        self.select_page(Page::Function)?;
        self.write_register(CONFIGURATION_REGISTER, CONFIGURATION_NORMAL_OPERATION)?;
        self.write_register(GLOBAL_CURRENT_REGISTER, self.global_current)?;

        self.select_page(Page::Pwm)
    }

    /// Transmit the frame buffer to the chip.
    ///
    /// Each buffered pixel is translated to its register address
    /// independently; register addresses are not contiguous across columns
    /// on every variant, and the unused stride padding must never be
    /// written. Read-only with respect to the buffer; a no-op while
    /// uninitialized.
    pub fn show(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.select_page(Page::Pwm)?;
        if let Some(table) = self.active_layout() {
            for (index, pin) in table.iter().enumerate().take(self.buffer.len()) {
                let register =
                    V::register_for_pins(pin.cs + self.cs_offset, pin.sw + self.sw_offset);
                let value = self.buffer[index];
                self.write_register(register, value)?;
            }
        } else {
            for y in 0..V::HEIGHT {
                for x in 0..V::WIDTH {
                    let register = self.coord_to_register(x, y);
                    let value = self.buffer[y * V::WIDTH + x];
                    self.write_register(register, value)?;
                }
            }
        }
        Ok(())
    }

    /// Set the hardware global current (device-wide output current).
    ///
    /// Stored always; written to the function page immediately when the
    /// device is initialized, and during every [`Device::initialize`].
    pub fn set_global_current(&mut self, current: u8) -> Result<()> {
        self.global_current = current;
        if self.is_initialized() {
            self.select_page(Page::Function)?;
            self.write_register(GLOBAL_CURRENT_REGISTER, current)?;
        }
        Ok(())
    }

    /// Select a register page: unlock write, then command write. The lock
    /// re-arms after one command, so both steps run on every call.
    fn select_page(&mut self, page: Page) -> Result<()> {
        self.write_register(UNLOCK_REGISTER, UNLOCK_VALUE)?;
        self.write_register(COMMAND_REGISTER, page as u8)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|error| Error::I2c(error.kind()))
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut value = [0_u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(|error| Error::I2c(error.kind()))?;
        Ok(value[0])
    }
}

impl<V: Variant, I2C: I2c> Matrix for Device<'_, V, I2C> {
    fn width(&self) -> usize {
        V::WIDTH
    }

    fn height(&self) -> usize {
        V::HEIGHT
    }

    fn initialize(&mut self, delay: &mut dyn DelayNs) -> Result<()> {
        Device::initialize(self, delay)
    }

    fn set_pixel_at(&mut self, x: i32, y: i32, pwm: u8) {
        Device::set_pixel_at(self, x, y, pwm);
    }

    fn clear(&mut self) {
        Device::clear(self);
    }

    fn show(&mut self) -> Result<()> {
        Device::show(self)
    }

    fn set_global_current(&mut self, current: u8) -> Result<()> {
        Device::set_global_current(self, current)
    }

    fn set_master_brightness(&mut self, brightness: u8) {
        Device::set_master_brightness(self, brightness);
    }

    fn non_zero_pixel_count(&self) -> u16 {
        Device::non_zero_pixel_count(self)
    }
}

impl<V: Variant, I2C> OriginDimensions for Device<'_, V, I2C> {
    fn size(&self) -> Size {
        Size::new(V::WIDTH as u32, V::HEIGHT as u32)
    }
}

/// Grayscale draw target over the frame buffer, so text and primitives from
/// `embedded-graphics` funnel through the same pixel-set path. Drawing never
/// fails; off-matrix pixels clip silently.
impl<V: Variant, I2C> DrawTarget for Device<'_, V, I2C> {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel_at(point.x, point.y, color.luma());
        }
        Ok(())
    }
}

/// Master-brightness scaling: integer `pwm * brightness / 255`.
const fn scale_intensity(pwm: u8, brightness: u8) -> u8 {
    ((pwm as u16 * brightness as u16) / 255) as u8
}
