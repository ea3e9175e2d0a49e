use core::fmt;

use typestate::Mmio;
use typestate::RegisterPort;
use typestate::Writable;
use typestate::WriteOnly;

use crate::memory_map;

const DATA: WriteOnly<u32, { memory_map::uart::DATA }> = WriteOnly::new();

/// Transmit-only UART. The device accepts a byte on every store to its data
/// register, so there is no ready flag to poll.
#[derive(Debug)]
pub struct Uart<P> {
    port: P,
}

impl<P: RegisterPort> Uart<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    pub fn putc(&self, byte: u8) {
        DATA.write(&self.port, byte as u32);
    }

    pub fn puts(&self, s: &str) {
        for &b in s.as_bytes() {
            self.putc(b);
        }
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

impl Uart<Mmio> {
    /// # Safety
    /// The UART window at [`memory_map::UART_BASE`] must be mapped.
    pub const unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new(memory_map::UART_BASE) })
    }
}

impl<P: RegisterPort> fmt::Write for Uart<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s);
        Ok(())
    }
}
