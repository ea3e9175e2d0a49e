use typestate::Mmio;
use typestate::ReadPure;
use typestate::ReadWrite;
use typestate::Readable;
use typestate::RegisterPort;
use typestate::Writable;
use typestate_macro::RawReg;

use crate::memory_map;

/// One bit per pin.
#[repr(transparent)]
#[derive(Clone, Copy, RawReg, PartialEq, Eq, Debug)]
pub struct Pins(pub u32);

impl Pins {
    pub const ALL: Self = Self(u32::MAX);

    /// Single pin `n`, taken modulo 32.
    pub const fn pin(n: u32) -> Self {
        Self(1 << (n & 31))
    }
}

/// 1 = output, 0 = input.
const DIRECTION: ReadWrite<Pins, { memory_map::gpio::DIRECTION }> = ReadWrite::new();
const OUTPUT: ReadWrite<Pins, { memory_map::gpio::OUTPUT }> = ReadWrite::new();
const INPUT: ReadPure<Pins, { memory_map::gpio::INPUT }> = ReadPure::new();

#[derive(Debug)]
pub struct Gpio<P> {
    port: P,
}

impl<P: RegisterPort> Gpio<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    pub fn set_direction(&mut self, outputs: Pins) {
        DIRECTION.write(&self.port, outputs);
    }

    pub fn direction(&self) -> Pins {
        DIRECTION.read(&self.port)
    }

    pub fn write(&mut self, value: Pins) {
        OUTPUT.write(&self.port, value);
    }

    pub fn output(&self) -> Pins {
        OUTPUT.read(&self.port)
    }

    pub fn read(&self) -> Pins {
        INPUT.read(&self.port)
    }

    /// Drives `pins` high, leaving the other outputs as they are.
    pub fn set_pins(&mut self, pins: Pins) {
        OUTPUT.set_bits(&self.port, pins);
    }

    /// Drives `pins` low, leaving the other outputs as they are.
    pub fn clear_pins(&mut self, pins: Pins) {
        OUTPUT.clear_bits(&self.port, pins);
    }
}

impl Gpio<Mmio> {
    /// # Safety
    /// The GPIO window at [`memory_map::GPIO_BASE`] must be mapped.
    pub const unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new(memory_map::GPIO_BASE) })
    }
}
