use typestate::RawReg;

/// 24-bit packed RGB, as the display's color register takes it.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    const CHANNEL: u32 = 0xFF;
    const MASK: u32 = 0x00FF_FFFF;

    /// Packs `(r << 16) | (g << 8) | b`, each channel masked to 8 bits.
    pub const fn rgb(r: u32, g: u32, b: u32) -> Self {
        Self(((r & Self::CHANNEL) << 16) | ((g & Self::CHANNEL) << 8) | (b & Self::CHANNEL))
    }

    /// Keeps the low 24 bits of `raw`.
    pub const fn from_packed(raw: u32) -> Self {
        Self(raw & Self::MASK)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl RawReg for Color {
    #[inline]
    fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn from_raw(raw: u32) -> Self {
        Self::from_packed(raw)
    }
}
