use core::marker::PhantomData;

pub trait FieldSpec<Reg> {
    const OFF: u32;
    const SZ: u32;
}

pub struct Field<Reg, const OFF: u32, const SZ: u32>(pub PhantomData<Reg>);

impl<Reg, const OFF: u32, const SZ: u32> FieldSpec<Reg> for Field<Reg, OFF, SZ> {
    const OFF: u32 = OFF;
    const SZ: u32 = SZ;
}

impl<Reg, const OFF: u32, const SZ: u32> Field<Reg, OFF, SZ> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<Reg, const OFF: u32, const SZ: u32> Clone for Field<Reg, OFF, SZ> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Reg, const OFF: u32, const SZ: u32> Copy for Field<Reg, OFF, SZ> {}

/// Mask covering bits `msb..=lsb`, computed at full width.
#[doc(hidden)]
#[inline]
pub const fn mask(msb: u32, lsb: u32) -> u128 {
    (u128::MAX >> (127 - (msb - lsb))) << lsb
}

/// bitregs macro
///
/// - Integer types: u8 / u16 / u32 (anything that fits the 32-bit port)
/// - Bit ranges: `@[MSB:LSB]` (ARM-like)
/// - Reserved: `reserved@[..] [res0|res1|ignore]`
/// - Compile-time checks:
///   * Every item fits into the register width
///   * Enum values fit the declared width
/// - `bits()` **applies res0/res1 policy**; `[ignore]` bits pass through
///   verbatim, which is what single-field read-modify-write needs
/// - `new()`/`Default` start with res1 bits set, res0 cleared
/// - Implements [`RawReg`](crate::RawReg), so the type can sit behind any
///   register handle
///
/// Usage:
/// 'Foo::from_raw(port_value).set_enum(Foo::bar2, Bar2::baz1).bits();'
///
/// Example:
/// ```rust
/// use typestate::bitregs;
/// bitregs!{
///     pub struct Foo: u32 {
///         pub bar1@[3:0],
///         reserved@[7:4] [res0],
///         pub bar2@[9:8] as Bar2 {
///             baz1 = 0b01,
///             baz2 = 0b10,
///             baz3 = 0b11,
///         },
///         reserved@[31:10] [ignore],
///     }
/// }
/// ```
#[macro_export]
macro_rules! bitregs {
    // Entry: `struct Name : Ty { ... }`
    ( $(#[$m:meta])* $vis:vis struct $Name:ident : $ty:ty { $($body:tt)* } ) => {
        $(#[$m])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        $vis struct $Name($ty);

        impl $Name {
            // --- Construction -------------------------------------------------
            /// Construct from raw bits (unchecked).
            #[inline] pub const fn from_bits(bits: $ty) -> Self { Self(bits) }

            /// Default constructor obeying reserved rules:
            /// - [res1] bits are set to 1
            /// - [res0] bits are set to 0
            #[inline] pub const fn new() -> Self { Self(Self::__RES1_MASK) }

            // --- Raw I/O ------------------------------------------------------
            /// Returns bits **with res0/res1 policy applied**.
            #[inline] pub const fn bits(self) -> $ty {
                (self.0 & !Self::__RES0_MASK) | Self::__RES1_MASK
            }

            /// Replace raw bits (builder style).
            #[inline] pub const fn with_bits(mut self, bits: $ty) -> Self { self.0 = bits; self }

            // --- Type-level field API ----------------------------------------
            /// Generic getter via a value-level field marker.
            #[inline]
            pub fn get<F>(&self, _f: F) -> $ty
            where
                F: $crate::bitflags::FieldSpec<$Name>,
            {
                let val = $crate::bitflags::mask(F::SZ - 1, 0) as $ty;
                (self.0 >> F::OFF) & val
            }

            /// `true` when any bit of the field is set.
            #[inline]
            pub fn is_set<F>(&self, f: F) -> bool
            where
                F: $crate::bitflags::FieldSpec<$Name>,
            {
                self.get(f) != 0
            }

            /// Generic setter via a value-level field marker (builder style).
            ///
            /// `v` is truncated to the field width; bits outside the field are
            /// left exactly as they were.
            #[inline]
            pub fn set<F>(mut self, _f: F, v: $ty) -> Self
            where
                F: $crate::bitflags::FieldSpec<$Name>,
            {
                let val = $crate::bitflags::mask(F::SZ - 1, 0) as $ty;
                let mask: $ty = val << F::OFF;
                self.0 = (self.0 & !mask) | ((v & val) << F::OFF);
                self
            }

            /// Enum getter (returns `Option<Enum>`).
            #[inline]
            pub fn get_enum<F, E>(&self, f: F) -> Option<E>
            where
                F: $crate::bitflags::FieldSpec<$Name>,
                E: ::core::convert::TryFrom<$ty>,
            {
                ::core::convert::TryFrom::try_from(self.get(f)).ok()
            }

            /// Enum setter (builder style).
            #[inline]
            pub fn set_enum<F, E>(self, f: F, e: E) -> Self
            where
                F: $crate::bitflags::FieldSpec<$Name>,
                E: Copy + Into<$ty>,
            {
                self.set(f, e.into())
            }

            /// Mask of all [res0] bits (forced to 0 by `bits()`/`new()`).
            const __RES0_MASK: $ty = $crate::bitregs!(@collect res0 <$ty> (0 as $ty) ; $($body)*);
            /// Mask of all [res1] bits (forced to 1 by `bits()`/`new()`).
            const __RES1_MASK: $ty = $crate::bitregs!(@collect res1 <$ty> (0 as $ty) ; $($body)*);
        }

        impl ::core::default::Default for $Name {
            #[inline] fn default() -> Self { Self::new() }
        }

        impl $crate::RawReg for $Name {
            #[inline] fn to_raw(self) -> u32 { self.bits() as u32 }
            #[inline] fn from_raw(raw: u32) -> Self { Self(raw as $ty) }
        }

        const _: () = assert!(
            ::core::mem::size_of::<$ty>() <= ::core::mem::size_of::<u32>(),
            "bitregs: register wider than the 32-bit port"
        );

        // Simple Debug
        impl ::core::fmt::Debug for $Name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::write!(f, concat!(stringify!($Name), "({:#x})"), self.0)
            }
        }

        // --- Expand fields & reserved items ----------------------------------
        $crate::bitregs!{ @fields $Name : $ty ; $($body)* }
    };

    (@resattr res0) => {};
    (@resattr res1) => {};
    (@resattr ignore) => {};
    (@resattr $other:ident) => {
        compile_error!("bitregs: reserved attribute must be one of [res0|res1|ignore]");
    };

    (@check $ty:ty ; $msb:literal $lsb:literal) => {
        const _: () = assert!(
            $msb >= $lsb && ($msb as u32) < (::core::mem::size_of::<$ty>() as u32) * 8,
            "bitregs: bit range out of register width"
        );
    };

    // =========================
    // Field/Reserved expansion
    // =========================

    (@fields $Name:ident : $ty:ty ; ) => {};

    // ---- reserved @[MSB:LSB]
    (@fields $Name:ident : $ty:ty ;
        reserved @ [ $msb:literal : $lsb:literal ] [ $attr:ident ] $(, $($rest:tt)*)?
    ) => {
        $crate::bitregs!{ @resattr $attr }
        $crate::bitregs!{ @check $ty ; $msb $lsb }
        $crate::bitregs!{ @fields $Name : $ty ; $($($rest)*)? }
    };

    // ---- enum field @[MSB:LSB]
    (@fields $Name:ident : $ty:ty ;
        $fvis:vis $Field:ident @ [ $msb:literal : $lsb:literal ] as $E:ident
        { $($V:ident = $val:expr),+ $(,)? } $(, $($rest:tt)*)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        $fvis enum $E { $( $V = $val ),+ }

        impl From<$E> for $ty {
            #[inline] fn from(e: $E) -> $ty { e as $ty }
        }

        impl ::core::convert::TryFrom<$ty> for $E {
            type Error = $ty;
            fn try_from(raw: $ty) -> Result<Self, $ty> {
                $( if raw == $E::$V as $ty { return Ok($E::$V); } )+
                Err(raw)
            }
        }

        const _: () = {
            $( assert!(
                ($val as u128) <= $crate::bitflags::mask($msb - $lsb, 0),
                "bitregs: enum value does not fit its field"
            ); )+
        };

        impl $Name {
            /// Value-level field marker (associated const)
            #[allow(non_upper_case_globals)]
            $fvis const $Field: $crate::bitflags::Field<$Name, { $lsb }, { $msb - $lsb + 1 }> =
                $crate::bitflags::Field::new();
        }
        $crate::bitregs!{ @check $ty ; $msb $lsb }
        $crate::bitregs!{ @fields $Name : $ty ; $($($rest)*)? }
    };

    // ---- plain field @[MSB:LSB]
    (@fields $Name:ident : $ty:ty ;
        $fvis:vis $Field:ident @ [ $msb:literal : $lsb:literal ] $(, $($rest:tt)*)?
    ) => {
        impl $Name {
            /// Value-level field marker (associated const)
            #[allow(non_upper_case_globals)]
            $fvis const $Field: $crate::bitflags::Field<$Name, { $lsb }, { $msb - $lsb + 1 }> =
                $crate::bitflags::Field::new();
        }
        $crate::bitregs!{ @check $ty ; $msb $lsb }
        $crate::bitregs!{ @fields $Name : $ty ; $($($rest)*)? }
    };

    // =========================
    // Helpers: reserved masks
    // =========================

    (@res res0 res0 <$ty:ty> $msb:literal $lsb:literal) => { ($crate::bitflags::mask($msb, $lsb) as $ty) };
    (@res res1 res1 <$ty:ty> $msb:literal $lsb:literal) => { ($crate::bitflags::mask($msb, $lsb) as $ty) };
    (@res $k:ident $attr:ident <$ty:ty> $msb:literal $lsb:literal) => { (0 as $ty) };

    (@collect $k:ident <$ty:ty> $acc:expr ; ) => { $acc };
    (@collect $k:ident <$ty:ty> $acc:expr ;
        reserved @ [ $msb:literal : $lsb:literal ] [ $attr:ident ] $(, $($rest:tt)*)?
    ) => {
        $crate::bitregs!(@collect $k <$ty> ($acc | $crate::bitregs!(@res $k $attr <$ty> $msb $lsb)) ; $($($rest)*)?)
    };
    (@collect $k:ident <$ty:ty> $acc:expr ;
        $fvis:vis $Field:ident @ [ $msb:literal : $lsb:literal ]
        $(as $E:ident { $($V:ident = $val:expr),+ $(,)? })? $(, $($rest:tt)*)?
    ) => {
        $crate::bitregs!(@collect $k <$ty> $acc ; $($($rest)*)?)
    };
}

#[cfg(test)]
mod test {
    use crate::RawReg;

    bitregs! {
        pub(super) struct Timer: u32 {
            pub period@[7:0],
            reserved@[15:8] [res0],
            pub enable@[16:16],
            reserved@[23:17] [ignore],
            reserved@[31:24] [res1],
        }
    }

    bitregs! {
        pub(super) struct Status: u16 {
            pub state@[2:0] as State {
                Idle = 0b000,
                Busy = 0b001,
                Done = 0b010,
                Fault = 0b011,
            },
            reserved@[7:3] [res0],
            pub error@[8:8],
            reserved@[13:9] [ignore],
            reserved@[15:14] [res1],
        }
    }

    #[test]
    fn bitregs_applies_reserved_policies() {
        let reg = Timer::new().set(Timer::period, 0xAA).set(Timer::enable, 1);

        assert_eq!(reg.bits(), 0xFF01_00AA);
        assert_eq!(reg.get(Timer::period), 0xAA);
        assert_eq!(reg.get(Timer::enable), 1);
        assert!(reg.is_set(Timer::enable));
    }

    #[test]
    fn bitregs_enum_roundtrip() {
        let mut reg = Status::new().set_enum(Status::state, State::Done);

        assert_eq!(reg.get_enum(Status::state), Some(State::Done));
        assert_eq!(reg.bits() & 0xC000, 0xC000);
        assert_eq!(reg.bits() & 0x00F8, 0);

        reg = reg.with_bits(0x01FF);
        assert_eq!(reg.get(Status::error), 1);
        assert_eq!(reg.bits() & 0x00F8, 0);
    }

    #[test]
    fn bitregs_enum_invalid_pattern_returns_none() {
        let reg = Status::new().set(Status::state, 0b111);

        assert_eq!(reg.get_enum(Status::state), None::<State>);
    }

    #[test]
    fn set_truncates_and_keeps_neighbours() {
        let reg = Timer::from_bits(0x00FE_0000).set(Timer::period, 0x1_23);

        assert_eq!(reg.get(Timer::period), 0x23);
        assert_eq!(reg.bits() & 0x00FE_0000, 0x00FE_0000);
    }

    #[test]
    fn raw_reg_passes_ignored_bits_through() {
        let reg = Timer::from_raw(0x00AB_0000);

        assert_eq!(reg.get(Timer::enable), 1);
        assert_eq!(reg.to_raw(), 0xFFAB_0000);
    }
}
