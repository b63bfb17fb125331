#![allow(missing_docs)]
//! Bus-level tests for the buffered display pipeline, driven against a mock
//! I2C transport with byte-exact transaction expectations.

use embedded_graphics::{Drawable, Pixel, pixelcolor::Gray8, prelude::Point};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use is31fl373x::{AddrPin, Device, Is31fl3733, Is31fl3737, Is31fl3737B, PinPair};

const UNLOCK: [u8; 2] = [0xFE, 0xC5];

fn select_page(address: u8, page: u8) -> [I2cTransaction; 2] {
    [
        I2cTransaction::write(address, UNLOCK.to_vec()),
        I2cTransaction::write(address, vec![0xFD, page]),
    ]
}

/// The full wire trace of `initialize`: reset, enable-all, configuration,
/// global current, PWM page left selected.
fn init_transactions(address: u8, height: u8, global_current: u8) -> Vec<I2cTransaction> {
    let mut transactions = Vec::new();
    transactions.extend(select_page(address, 3));
    transactions.push(I2cTransaction::write_read(address, vec![0x11], vec![0x00]));
    transactions.extend(select_page(address, 0));
    for register in 0..height * 2 {
        transactions.push(I2cTransaction::write(address, vec![register, 0xFF]));
    }
    transactions.extend(select_page(address, 3));
    transactions.push(I2cTransaction::write(address, vec![0x00, 0x01]));
    transactions.push(I2cTransaction::write(address, vec![0x01, global_current]));
    transactions.extend(select_page(address, 1));
    transactions
}

#[test]
fn init_sequence_matches_wire_contract() {
    let expectations = init_transactions(0x50, 12, 128);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3733, _>::new(i2c, AddrPin::Gnd, AddrPin::Gnd);
    assert!(!device.is_initialized());

    device.initialize(&mut NoopDelay::new()).unwrap();
    assert!(device.is_initialized());

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn init_writes_configured_global_current() {
    let expectations = init_transactions(0x5A, 12, 42);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737, _>::new(i2c, AddrPin::Sda);
    // Uninitialized: the value is only stored, no bus traffic yet.
    device.set_global_current(42).unwrap();
    assert_eq!(device.global_current(), 42);

    device.initialize(&mut NoopDelay::new()).unwrap();

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn init_is_idempotent() {
    let mut expectations = init_transactions(0x50, 12, 128);
    expectations.extend(init_transactions(0x50, 12, 128));
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737B, _>::new(i2c, AddrPin::Gnd);

    device.initialize(&mut NoopDelay::new()).unwrap();
    device.set_pixel_at(0, 0, 200);
    device.initialize(&mut NoopDelay::new()).unwrap();

    // Re-running must not leak or grow the buffer; it re-zeroes it.
    assert!(device.is_initialized());
    assert_eq!(device.non_zero_pixel_count(), 0);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn master_brightness_scales_at_write_time() {
    let expectations = init_transactions(0x50, 12, 128);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737B, _>::new(i2c, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();

    // Full brightness stores the input unscaled.
    device.set_pixel_at(0, 0, 173);
    assert_eq!(device.pixel_value(0, 0), 173);

    device.set_master_brightness(128);
    for input in [1_u16, 17, 100, 200, 255] {
        device.set_pixel_at(1, 0, input as u8);
        let stored = u16::from(device.pixel_value(1, 0));
        assert_eq!(stored, input * 128 / 255);
        assert!(stored < input, "scaled value must drop below the input");
    }

    // Earlier pixels keep the scale they were written with.
    assert_eq!(device.pixel_value(0, 0), 173);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn out_of_range_writes_are_dropped() {
    let expectations = init_transactions(0x50, 12, 128);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3733, _>::new(i2c, AddrPin::Gnd, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();

    for (x, y) in [
        (-1, 0),
        (0, -1),
        (16, 0),
        (0, 12),
        (1000, 1000),
        (i32::MIN, 5),
        (5, i32::MAX),
    ] {
        device.set_pixel_at(x, y, 255);
    }
    device.set_pixel_by_index(192, 255);

    assert_eq!(device.non_zero_pixel_count(), 0);
    assert_eq!(device.pixel_sum(), 0);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn clear_zeroes_everything() {
    let expectations = init_transactions(0x50, 12, 128);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737B, _>::new(i2c, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();

    for index in 0..144 {
        device.set_pixel_by_index(index, 7);
    }
    assert_eq!(device.non_zero_pixel_count(), 144);

    device.clear();
    assert_eq!(device.non_zero_pixel_count(), 0);
    assert_eq!(device.pixel_sum(), 0);
    for y in 0..12 {
        for x in 0..12 {
            assert_eq!(device.pixel_value(x, y), 0);
        }
    }

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn uninitialized_device_is_inert() {
    // No expectations: nothing here may touch the bus.
    let i2c = I2cMock::new(&[]);
    let mut device = Device::<Is31fl3737, _>::new(i2c, AddrPin::Gnd);

    device.set_pixel_at(3, 3, 255);
    device.set_pixel_by_index(0, 255);
    device.clear();
    device.show().unwrap();

    assert!(!device.is_initialized());
    assert_eq!(device.pixel_value(3, 3), 0);
    assert_eq!(device.pixel_value_by_index(0), 0);
    assert_eq!(device.non_zero_pixel_count(), 0);
    assert_eq!(device.pixel_sum(), 0);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn show_translates_every_cell_around_the_gap() {
    let address = 0x50;
    let mut expectations = init_transactions(address, 12, 128);
    expectations.extend(select_page(address, 1));
    // Row-major walk; the expected addresses re-derive the jump directly.
    for y in 0..12_u8 {
        for x in 0..12_u8 {
            let register = y * 16 + if x < 6 { x } else { x + 2 };
            let value = if (x, y) == (6, 0) {
                200
            } else if (x, y) == (11, 11) {
                55
            } else {
                0
            };
            expectations.push(I2cTransaction::write(address, vec![register, value]));
        }
    }

    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737, _>::new(i2c, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();
    device.set_pixel_at(6, 0, 200);
    device.set_pixel_at(11, 11, 55);
    device.show().unwrap();

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn show_applies_coordinate_offset() {
    let address = 0x50;
    let mut expectations = init_transactions(address, 12, 128);
    expectations.extend(select_page(address, 1));
    for y in 0..12_u8 {
        for x in 0..12_u8 {
            let register = y * 16 + (x + 2);
            expectations.push(I2cTransaction::write(address, vec![register, 0]));
        }
    }

    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737B, _>::new(i2c, AddrPin::Gnd);
    device.set_coordinate_offset(2, 0);
    device.initialize(&mut NoopDelay::new()).unwrap();
    device.show().unwrap();

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn custom_layout_drives_show_by_index() {
    let address = 0x50;
    const RING: [PinPair; 4] = [
        PinPair::new(1, 1),
        PinPair::new(16, 1),
        PinPair::new(1, 12),
        PinPair::new(16, 12),
    ];
    let mut expectations = init_transactions(address, 12, 128);
    expectations.extend(select_page(address, 1));
    for (register, value) in [(0_u8, 10_u8), (15, 20), (176, 30), (191, 40)] {
        expectations.push(I2cTransaction::write(address, vec![register, value]));
    }

    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3733, _>::new(i2c, AddrPin::Gnd, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();
    device.set_layout(Some(&RING));
    assert!(device.is_custom_layout_active());
    assert_eq!(device.layout_size(), 4);

    for (index, value) in [10, 20, 30, 40].into_iter().enumerate() {
        device.set_pixel_by_index(index, value);
    }
    device.show().unwrap();

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn oversized_layout_is_capped_to_buffer() {
    let address = 0x50;
    let pins = vec![PinPair::new(1, 1); 150];
    let mut expectations = init_transactions(address, 12, 128);
    expectations.extend(select_page(address, 1));
    // 3737B buffers 144 pixels; entries past that are ignored.
    for _ in 0..144 {
        expectations.push(I2cTransaction::write(address, vec![0, 0]));
    }

    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737B, _>::new(i2c, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();
    device.set_layout(Some(&pins));
    device.show().unwrap();

    device.set_layout(None);
    assert!(!device.is_custom_layout_active());
    assert_eq!(device.layout_size(), 0);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn global_current_writes_through_once_initialized() {
    let address = 0x55;
    let mut expectations = init_transactions(address, 12, 128);
    expectations.extend(select_page(address, 3));
    expectations.push(I2cTransaction::write(address, vec![0x01, 64]));

    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3737, _>::new(i2c, AddrPin::Scl);
    device.initialize(&mut NoopDelay::new()).unwrap();
    device.set_global_current(64).unwrap();
    assert_eq!(device.global_current(), 64);

    let mut i2c = device.release();
    i2c.done();
}

#[test]
fn draw_target_funnels_into_the_frame_buffer() {
    let expectations = init_transactions(0x50, 12, 128);
    let i2c = I2cMock::new(&expectations);
    let mut device = Device::<Is31fl3733, _>::new(i2c, AddrPin::Gnd, AddrPin::Gnd);
    device.initialize(&mut NoopDelay::new()).unwrap();

    Pixel(Point::new(2, 3), Gray8::new(200)).draw(&mut device).unwrap();
    // Off-matrix pixels clip silently instead of erroring.
    Pixel(Point::new(-4, 99), Gray8::new(200)).draw(&mut device).unwrap();

    assert_eq!(device.pixel_value(2, 3), 200);
    assert_eq!(device.non_zero_pixel_count(), 1);

    let mut i2c = device.release();
    i2c.done();
}
