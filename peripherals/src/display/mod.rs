//! Pixel display driver.
//!
//! The device has no framebuffer that software can read back: a pixel is set
//! by storing its x and y coordinates followed by its color, and stays
//! invisible until the update register is written. The device itself is the
//! only record of what is on screen.

mod raster;

pub use raster::Line;

use typestate::Mmio;
use typestate::ReadPure;
use typestate::ReadWrite;
use typestate::Readable;
use typestate::RegisterPort;
use typestate::Writable;
use typestate::WriteOnly;
use typestate_macro::RawReg;

use crate::color::Color;
use crate::memory_map;
use crate::memory_map::CANVAS_HEIGHT;
use crate::memory_map::CANVAS_WIDTH;

/// Display Control Register
#[repr(transparent)]
#[derive(Clone, Copy, RawReg, PartialEq, Eq, Debug)]
pub struct DisplayControl(pub u32);

impl DisplayControl {
    pub const ENABLE: Self = Self(1 << 0);
}

/// Display Status Register
#[repr(transparent)]
#[derive(Clone, Copy, RawReg, PartialEq, Eq, Debug)]
pub struct DisplayStatus(pub u32);

impl DisplayStatus {
    pub const READY: Self = Self(1 << 0);
}

const CTRL: ReadWrite<DisplayControl, { memory_map::display::CTRL }> = ReadWrite::new();
const STATUS: ReadPure<DisplayStatus, { memory_map::display::STATUS }> = ReadPure::new();
const X: WriteOnly<u32, { memory_map::display::X }> = WriteOnly::new();
const Y: WriteOnly<u32, { memory_map::display::Y }> = WriteOnly::new();
const COLOR: WriteOnly<Color, { memory_map::display::COLOR }> = WriteOnly::new();
const UPDATE: WriteOnly<u32, { memory_map::display::UPDATE }> = WriteOnly::new();

#[derive(Debug)]
pub struct Display<P> {
    port: P,
}

impl<P: RegisterPort> Display<P> {
    pub const WIDTH: u32 = CANVAS_WIDTH;
    pub const HEIGHT: u32 = CANVAS_HEIGHT;

    pub const fn new(port: P) -> Self {
        Self { port }
    }

    /// Overwrites the control register with just the enable bit.
    pub fn init(&mut self) {
        CTRL.write(&self.port, DisplayControl::ENABLE);
    }

    pub fn enable(&mut self) {
        CTRL.set_bits(&self.port, DisplayControl::ENABLE);
    }

    pub fn disable(&mut self) {
        CTRL.clear_bits(&self.port, DisplayControl::ENABLE);
    }

    pub fn is_enabled(&self) -> bool {
        CTRL.read(&self.port).contains(DisplayControl::ENABLE)
    }

    pub fn is_ready(&self) -> bool {
        STATUS.read(&self.port).contains(DisplayStatus::READY)
    }

    pub const fn contains(x: u32, y: u32) -> bool {
        x < CANVAS_WIDTH && y < CANVAS_HEIGHT
    }

    /// Stores x, y and color, in that order.
    ///
    /// Coordinates outside the canvas are dropped without touching any
    /// register: no clamping, no wrapping, no error.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if !Self::contains(x, y) {
            return;
        }
        X.write(&self.port, x);
        Y.write(&self.port, y);
        COLOR.write(&self.port, color);
    }

    /// Makes every pixel written so far visible.
    pub fn commit(&mut self) {
        UPDATE.write(&self.port, 1);
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

impl Display<Mmio> {
    /// # Safety
    /// The display window at [`memory_map::DISPLAY_BASE`] must be mapped.
    pub const unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new(memory_map::DISPLAY_BASE) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::DISPLAY_BASE;
    use crate::sim::SimBus;

    #[test]
    fn set_pixel_writes_the_triplet_in_order() {
        let bus = SimBus::new();
        let mut display = Display::new(bus.port(DISPLAY_BASE));
        display.init();
        bus.clear_writes();

        display.set_pixel(299, 399, Color::CYAN);

        assert_eq!(
            bus.writes(),
            [
                (DISPLAY_BASE + 0xC, 299),
                (DISPLAY_BASE + 0x10, 399),
                (DISPLAY_BASE + 0x14, 0x00FF_FF),
            ]
        );
        assert_eq!(bus.painted(), [(299, 399)]);
    }

    #[test]
    fn out_of_canvas_pixels_issue_no_writes() {
        let bus = SimBus::new();
        let mut display = Display::new(bus.port(DISPLAY_BASE));

        for (x, y) in [(300, 0), (0, 400), (300, 400), (u32::MAX, 5), (5, u32::MAX)] {
            display.set_pixel(x, y, Color::WHITE);
        }

        assert!(bus.writes().is_empty());
        assert!(bus.faults().is_empty());
    }

    #[test]
    fn enable_and_disable_touch_only_bit_zero() {
        let bus = SimBus::new();
        bus.write(DISPLAY_BASE, 0xF0);
        let mut display = Display::new(bus.port(DISPLAY_BASE));

        display.enable();
        assert_eq!(bus.read(DISPLAY_BASE), 0xF1);
        display.disable();
        assert_eq!(bus.read(DISPLAY_BASE), 0xF0);

        display.init();
        assert_eq!(bus.read(DISPLAY_BASE), 0x01);
        assert!(display.is_enabled());
    }

    #[test]
    fn pixels_show_up_only_after_commit() {
        let bus = SimBus::new();
        let mut display = Display::new(bus.port(DISPLAY_BASE));
        display.init();
        assert!(display.is_ready());

        display.set_pixel(1, 2, Color::RED);
        assert_eq!(bus.pixel(1, 2), Some(Color::BLACK));
        assert_eq!(bus.commits(), 0);
        display.commit();

        assert_eq!(bus.commits(), 1);
        assert_eq!(bus.pixel(1, 2), Some(Color::RED));
        assert_eq!(bus.writes().last(), Some(&(DISPLAY_BASE + 0x18, 1)));
    }

    #[test]
    fn ready_flag_follows_the_device() {
        let bus = SimBus::new();
        let display = Display::new(bus.port(DISPLAY_BASE));

        bus.set_display_ready(false);
        assert!(!display.is_ready());
        bus.set_display_ready(true);
        assert!(display.is_ready());
    }
}
