#![cfg_attr(not(test), no_std)]
//! Drivers for the SoC's memory-mapped peripherals.
//!
//! Every driver is generic over a [`RegisterPort`], so the same code runs
//! against real hardware through [`Mmio`] and against the host model in
//! [`sim`] (feature `sim`, always built for tests).
//!
//! | device  | driver              |
//! |---------|---------------------|
//! | UART    | [`Uart`]            |
//! | GPIO    | [`Gpio`]            |
//! | timer   | [`Timer`]           |
//! | wave    | [`Wave`]            |
//! | display | [`Display`]         |
//!
//! Drivers take `&mut self` for anything that writes a control register, so
//! a read-modify-write sequence cannot interleave with another one on the
//! same driver. To share a driver between contexts, put it behind a
//! [`mutex::SpinLock`] the way [`console`] does.

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod color;
pub mod console;
pub mod display;
pub mod gpio;
pub mod memory_map;
pub mod selftest;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod timer;
pub mod uart;
pub mod wave;

pub use color::Color;
pub use display::Display;
pub use gpio::Gpio;
pub use gpio::Pins;
pub use selftest::SelfTestError;
pub use timer::Timer;
pub use timer::TimerError;
pub use typestate::Mmio;
pub use typestate::RegisterPort;
pub use uart::Uart;
pub use wave::Wave;
pub use wave::Waveform;
