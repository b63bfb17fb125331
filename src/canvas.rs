//! Chain several matrix devices into one logical drawing surface.
//!
//! A [`Canvas`] borrows a caller-owned list of device slots and routes each
//! canvas coordinate to the device whose extent contains it, walking the
//! chain in order. Devices keep their own buffers and flush independently;
//! the canvas only translates coordinates and fans out the global
//! operations.
//!
//! ```rust,no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use is31fl373x::{AddrPin, Canvas, CanvasLayout, Device, Is31fl3737B, Matrix, Result};
//!
//! fn sign<A: I2c, B: I2c>(left: A, right: B, delay: &mut impl DelayNs) -> Result<()> {
//!     let mut left = Device::<Is31fl3737B, _>::new(left, AddrPin::Gnd);
//!     let mut right = Device::<Is31fl3737B, _>::new(right, AddrPin::Vcc);
//!     let mut slots: [Option<&mut dyn Matrix>; 2] = [Some(&mut left), Some(&mut right)];
//!     let mut canvas = Canvas::new(24, 12, &mut slots, CanvasLayout::Horizontal);
//!
//!     canvas.initialize(delay)?;
//!     canvas.set_pixel(23, 11, 255); // bottom-right corner of the right chip
//!     canvas.show()
//! }
//! ```

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::{Gray8, GrayColor},
    prelude::{OriginDimensions, Pixel, Size},
};
use embedded_hal::delay::DelayNs;

use crate::device::Matrix;
use crate::error::{Error, Result};

/// Chaining axis of a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanvasLayout {
    /// Devices laid out left to right; x walks the chain, y passes through.
    Horizontal,
    /// Devices stacked top to bottom; y walks the chain, x passes through.
    Vertical,
}

/// N devices presented as one addressable rectangle.
///
/// The slot list is borrowed, never owned: dropping the canvas leaves the
/// devices untouched. An empty (`None`) slot is a configuration error -
/// [`Canvas::initialize`] fails on it - but at drawing time coordinates that
/// reach it are just dropped, consistent with the per-device out-of-range
/// policy.
pub struct Canvas<'d, 'm> {
    devices: &'d mut [Option<&'m mut (dyn Matrix + 'm)>],
    width: u16,
    height: u16,
    layout: CanvasLayout,
}

impl<'d, 'm> Canvas<'d, 'm> {
    /// View `devices` as a `width` x `height` surface chained along
    /// `layout`.
    ///
    /// The declared extent should be covered by the member devices along the
    /// chaining axis; coordinates outside every device's range are dropped
    /// rather than diagnosed.
    #[must_use]
    pub fn new(
        width: u16,
        height: u16,
        devices: &'d mut [Option<&'m mut (dyn Matrix + 'm)>],
        layout: CanvasLayout,
    ) -> Self {
        Self {
            devices,
            width,
            height,
            layout,
        }
    }

    /// Declared canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Declared canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Chaining axis.
    #[must_use]
    pub const fn layout(&self) -> CanvasLayout {
        self.layout
    }

    /// Number of device slots, occupied or not.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Initialize every member device.
    ///
    /// All-or-nothing in its status: any empty slot or device failure makes
    /// the whole canvas report failure (the first error encountered).
    /// Devices that initialized before a later failure stay initialized;
    /// there is no rollback.
    pub fn initialize(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        let mut result = Ok(());
        for slot in self.devices.iter_mut() {
            match slot {
                Some(device) => {
                    if let Err(error) = device.initialize(&mut *delay) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("is31fl373x: canvas member failed to initialize");
                        if result.is_ok() {
                            result = Err(error);
                        }
                    }
                }
                None => {
                    if result.is_ok() {
                        result = Err(Error::NullDevice);
                    }
                }
            }
        }
        result
    }

    /// Buffer one pixel in canvas coordinates.
    ///
    /// The coordinate is routed to the device whose extent contains it;
    /// coordinates outside the canvas, past the chained devices, or landing
    /// on an empty slot are silently dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, pwm: u8) {
        if let Some((device, local_x, local_y)) = self.device_for_coordinate(x, y) {
            device.set_pixel_at(local_x, local_y, pwm);
        }
    }

    /// Flush every member device's buffer to its chip.
    ///
    /// Devices update independently and in slot order; the first error is
    /// reported after all members were attempted.
    pub fn show(&mut self) -> Result<()> {
        let mut result = Ok(());
        for device in self.occupied_slots() {
            if let Err(error) = device.show() {
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    }

    /// Zero every member device's frame buffer.
    pub fn clear(&mut self) {
        for device in self.occupied_slots() {
            device.clear();
        }
    }

    /// Set the hardware global current on every member device.
    pub fn set_global_current(&mut self, current: u8) -> Result<()> {
        let mut result = Ok(());
        for device in self.occupied_slots() {
            if let Err(error) = device.set_global_current(current) {
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    }

    /// Set the software master brightness on every member device.
    pub fn set_master_brightness(&mut self, brightness: u8) {
        for device in self.occupied_slots() {
            device.set_master_brightness(brightness);
        }
    }

    /// Non-zero buffered pixels across all member devices.
    #[must_use]
    pub fn total_non_zero_pixel_count(&self) -> u32 {
        self.devices
            .iter()
            .filter_map(|slot| slot.as_deref())
            .map(|device| u32::from(device.non_zero_pixel_count()))
            .sum()
    }

    /// Resolve a canvas coordinate to `(device, local_x, local_y)`.
    ///
    /// Walks the chain accumulating each device's own extent along the
    /// chaining axis. An empty slot ends the walk: its extent is unknown, so
    /// nothing past it can be attributed.
    fn device_for_coordinate(
        &mut self,
        x: i32,
        y: i32,
    ) -> Option<(&mut (dyn Matrix + 'm), i32, i32)> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        let layout = self.layout;
        let mut cursor = 0_i32;
        for slot in self.devices.iter_mut() {
            let device = match slot {
                Some(device) => device,
                None => return None,
            };
            let extent = match layout {
                CanvasLayout::Horizontal => device.width() as i32,
                CanvasLayout::Vertical => device.height() as i32,
            };
            let along = match layout {
                CanvasLayout::Horizontal => x,
                CanvasLayout::Vertical => y,
            };
            if along < cursor + extent {
                let (local_x, local_y) = match layout {
                    CanvasLayout::Horizontal => (x - cursor, y),
                    CanvasLayout::Vertical => (x, y - cursor),
                };
                return Some((&mut **device, local_x, local_y));
            }
            cursor += extent;
        }
        None
    }

    fn occupied_slots(&mut self) -> impl Iterator<Item = &mut (dyn Matrix + 'm)> {
        self.devices.iter_mut().filter_map(|slot| slot.as_deref_mut())
    }
}

impl OriginDimensions for Canvas<'_, '_> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

/// Grayscale draw target spanning the whole chain; drawing never fails and
/// unroutable pixels clip silently.
impl DrawTarget for Canvas<'_, '_> {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.luma());
        }
        Ok(())
    }
}
