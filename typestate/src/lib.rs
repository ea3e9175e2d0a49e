#![cfg_attr(not(test), no_std)]
//! MMIO typestate wrapper.
//!
//! This crate provides small handle types for memory-mapped registers that
//! encode readable / writable capabilities at the type level (typestate).
//!
//! Registers are reached through a [`RegisterPort`]: the real implementation
//! ([`Mmio`]) performs volatile loads and stores at `base + offset` so the
//! compiler never elides or reorders them, while tests can substitute a
//! simulated bus that records every access.
//!
//! # Typestates
//! - [`ReadPure<T, OFF>`]: readable **without side effects** (safe to poll).
//! - [`WriteOnly<T, OFF>`]: writable, no read API is exposed.
//! - [`ReadWrite<T, OFF>`]: both readable and writable, with read-modify-write helpers.
//! - [`WriteOneToClear<T, OFF>`]: status register; bits are cleared by writing 1
//!   through [`WriteOneToClear::acknowledge`], there is no plain write.
//!
//! # Safety
//! These handles do not validate that the underlying address actually maps to
//! device registers. It is **your** responsibility to create [`Mmio`] ports at
//! the correct, valid MMIO address and to follow the device's access rules.

extern crate self as typestate;

pub mod bitflags;
mod port;
mod read_write;

pub use port::Mmio;
pub use port::RegisterPort;
pub use read_write::ReadPure;
pub use read_write::ReadWrite;
pub use read_write::Readable;
pub use read_write::Register;
pub use read_write::Writable;
pub use read_write::WriteOneToClear;
pub use read_write::WriteOnly;

/// A value that travels over the 32-bit register bus.
///
/// Implemented for `u32`, for every `bitregs!` type, and for
/// `#[repr(transparent)]` newtypes through `#[derive(typestate_macro::RawReg)]`.
/// Every 32-bit pattern must be a valid value of the implementing type.
pub trait RawReg: Copy {
    fn to_raw(self) -> u32;
    fn from_raw(raw: u32) -> Self;
}

impl RawReg for u32 {
    #[inline]
    fn to_raw(self) -> u32 {
        self
    }

    #[inline]
    fn from_raw(raw: u32) -> Self {
        raw
    }
}
