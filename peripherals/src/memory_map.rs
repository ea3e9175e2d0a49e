//! Physical layout of the SoC peripheral block.
//!
//! Every device owns one 256-byte window; register offsets below are relative
//! to the window base.

pub const UART_BASE: usize = 0x0200_0000;
pub const GPIO_BASE: usize = 0x0200_0100;
pub const TIMER_BASE: usize = 0x0200_0200;
pub const WAVE_BASE: usize = 0x0200_0300;
pub const DISPLAY_BASE: usize = 0x0200_0400;

pub const WINDOW_SIZE: usize = 0x100;

pub mod uart {
    pub const DATA: usize = 0x0;
}

pub mod gpio {
    pub const DIRECTION: usize = 0x0;
    pub const OUTPUT: usize = 0x4;
    pub const INPUT: usize = 0x8;
}

pub mod timer {
    pub const COUNT: usize = 0x0;
    pub const CONTROL: usize = 0x4;
    pub const COMPARE: usize = 0x8;
    pub const STATUS: usize = 0xC;
}

pub mod wave {
    pub const CONTROL: usize = 0x0;
    pub const FREQUENCY: usize = 0x4;
    pub const AMPLITUDE: usize = 0x8;
    pub const PHASE: usize = 0xC;
    pub const DUTY: usize = 0x10;
}

pub mod display {
    pub const CTRL: usize = 0x0;
    pub const STATUS: usize = 0x4;
    pub const X: usize = 0xC;
    pub const Y: usize = 0x10;
    pub const COLOR: usize = 0x14;
    pub const UPDATE: usize = 0x18;
}

pub const CANVAS_WIDTH: u32 = 300;
pub const CANVAS_HEIGHT: u32 = 400;

/// Device windows, in address order.
pub const DEVICES: [(&str, usize); 5] = [
    ("uart", UART_BASE),
    ("gpio", GPIO_BASE),
    ("timer", TIMER_BASE),
    ("wave", WAVE_BASE),
    ("display", DISPLAY_BASE),
];

/// Name of the device whose window contains `addr`.
pub fn device_at(addr: usize) -> Option<&'static str> {
    DEVICES
        .iter()
        .find(|(_, base)| (*base..*base + WINDOW_SIZE).contains(&addr))
        .map(|(name, _)| *name)
}

const _: () = {
    let mut i = 1;
    while i < DEVICES.len() {
        assert!(
            DEVICES[i - 1].1 + WINDOW_SIZE <= DEVICES[i].1,
            "peripheral windows overlap"
        );
        i += 1;
    }
};
