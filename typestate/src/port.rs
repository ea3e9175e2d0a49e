use core::ptr::read_volatile;
use core::ptr::write_volatile;

/// Word-wide access to one peripheral's register window.
///
/// Offsets are relative to the peripheral base. Both operations take `&self`:
/// device registers are shared state that the hardware mutates on its own, so
/// the port behaves like interior-mutable memory.
///
/// Implementations must perform every access exactly once and in program
/// order relative to other accesses through the same port. No error is
/// reported; an invalid address cannot be detected in software.
pub trait RegisterPort {
    fn read(&self, offset: usize) -> u32;
    fn write(&self, offset: usize, value: u32);
}

impl<P: RegisterPort + ?Sized> RegisterPort for &P {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Volatile MMIO port rooted at a fixed physical base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    /// `base` must be the start of a device register window that stays mapped
    /// (and uncached) for the program lifetime, and every offset later passed
    /// to [`RegisterPort::read`] / [`RegisterPort::write`] must stay inside
    /// that window and be 4-byte aligned.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    #[inline]
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn addr(&self, offset: usize) -> usize {
        self.base.wrapping_add(offset)
    }
}

impl RegisterPort for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // Safety: guaranteed by the contract of `Mmio::new`.
        unsafe { read_volatile(self.addr(offset) as *const u32) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // Safety: guaranteed by the contract of `Mmio::new`.
        unsafe { write_volatile(self.addr(offset) as *mut u32, value) }
    }
}
