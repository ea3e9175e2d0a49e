use core::fmt;
use core::marker::PhantomData;

use crate::RawReg;
use crate::RegisterPort;

/// Readable register **without side effects** (safe to poll).
///
/// Access is still a single port read; this type only expresses the contract
/// that repeated reads do not change device state.
pub struct ReadPure<T, const OFF: usize>(PhantomData<T>);

/// Write-only register (no read API exposed).
pub struct WriteOnly<T, const OFF: usize>(PhantomData<T>);

/// Read/write register.
pub struct ReadWrite<T, const OFF: usize>(PhantomData<T>);

/// Status register with write-1-to-clear semantics.
///
/// Writing 0 to a bit is a no-op on the device, so the only write operation
/// exposed is [`acknowledge`](Self::acknowledge), which clears exactly the
/// bits set in its mask.
pub struct WriteOneToClear<T, const OFF: usize>(PhantomData<T>);

/// A register at a fixed offset inside a peripheral window.
pub trait Register {
    type T: RawReg;
    const OFFSET: usize;
}

/// Port-readable capability.
pub trait Readable: Register {
    /// Performs a single read of the register.
    #[inline]
    fn read<P: RegisterPort + ?Sized>(&self, port: &P) -> Self::T {
        Self::T::from_raw(port.read(Self::OFFSET))
    }
}

/// Port-writable capability.
pub trait Writable: Register {
    /// Performs a single write of the register.
    #[inline]
    fn write<P: RegisterPort + ?Sized>(&self, port: &P, val: Self::T) {
        port.write(Self::OFFSET, val.to_raw())
    }
}

macro_rules! register_handle {
    ($($Handle:ident),+ $(,)?) => {
        $(
            impl<T, const OFF: usize> $Handle<T, OFF> {
                #[inline]
                pub const fn new() -> Self {
                    Self(PhantomData)
                }
            }

            impl<T, const OFF: usize> Default for $Handle<T, OFF> {
                #[inline]
                fn default() -> Self {
                    Self::new()
                }
            }

            impl<T, const OFF: usize> Clone for $Handle<T, OFF> {
                #[inline]
                fn clone(&self) -> Self {
                    *self
                }
            }

            impl<T, const OFF: usize> Copy for $Handle<T, OFF> {}

            impl<T, const OFF: usize> fmt::Debug for $Handle<T, OFF> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($Handle), "@{:#x}"), OFF)
                }
            }

            impl<T: RawReg, const OFF: usize> Register for $Handle<T, OFF> {
                type T = T;
                const OFFSET: usize = OFF;
            }
        )+
    };
}

register_handle!(ReadPure, WriteOnly, ReadWrite, WriteOneToClear);

impl<T: RawReg, const OFF: usize> Readable for ReadPure<T, OFF> {}
impl<T: RawReg, const OFF: usize> Readable for ReadWrite<T, OFF> {}
impl<T: RawReg, const OFF: usize> Readable for WriteOneToClear<T, OFF> {}

impl<T: RawReg, const OFF: usize> Writable for WriteOnly<T, OFF> {}
impl<T: RawReg, const OFF: usize> Writable for ReadWrite<T, OFF> {}

impl<T: RawReg, const OFF: usize> ReadWrite<T, OFF> {
    /// Sets the bits specified by `mask` (read-modify-write).
    #[inline]
    pub fn set_bits<P: RegisterPort + ?Sized>(&self, port: &P, mask: T) {
        let current = port.read(OFF);
        port.write(OFF, current | mask.to_raw());
    }

    /// Clears the bits specified by `mask` (read-modify-write).
    #[inline]
    pub fn clear_bits<P: RegisterPort + ?Sized>(&self, port: &P, mask: T) {
        let current = port.read(OFF);
        port.write(OFF, current & !mask.to_raw());
    }

    /// Toggles the bits specified by `mask` (read-modify-write).
    #[inline]
    pub fn toggle_bits<P: RegisterPort + ?Sized>(&self, port: &P, mask: T) {
        let current = port.read(OFF);
        port.write(OFF, current ^ mask.to_raw());
    }

    /// Reads the register, passes the value through `f` and writes the result
    /// back. Exactly one read and one write reach the port.
    #[inline]
    pub fn modify<P, F>(&self, port: &P, f: F)
    where
        P: RegisterPort + ?Sized,
        F: FnOnce(T) -> T,
    {
        let current = self.read(port);
        self.write(port, f(current));
    }
}

impl<T: RawReg, const OFF: usize> WriteOneToClear<T, OFF> {
    /// Clears the status bits set in `mask` by writing them as 1.
    ///
    /// Bits that are 0 in `mask` are left untouched on the device.
    #[inline]
    pub fn acknowledge<P: RegisterPort + ?Sized>(&self, port: &P, mask: T) {
        port.write(OFF, mask.to_raw());
    }
}
