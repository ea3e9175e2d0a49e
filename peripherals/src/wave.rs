use typestate::Mmio;
use typestate::ReadWrite;
use typestate::Readable;
use typestate::RegisterPort;
use typestate::Writable;
use typestate::bitregs;

use crate::memory_map;

bitregs! {
    /// Wave generator control word.
    pub struct WaveControl: u32 {
        pub enable@[0:0],
        pub waveform@[3:1] as Waveform {
            Sine = 0,
            Square = 1,
            Triangle = 2,
            Sawtooth = 3,
        },
        reserved@[31:4] [ignore],
    }
}

pub const DEFAULT_FREQUENCY: u32 = 1000;
pub const DEFAULT_AMPLITUDE: u32 = 255;
pub const DEFAULT_PHASE: u32 = 0;
pub const DEFAULT_DUTY: u32 = 50;

const CONTROL: ReadWrite<WaveControl, { memory_map::wave::CONTROL }> = ReadWrite::new();
/// Hz
const FREQUENCY: ReadWrite<u32, { memory_map::wave::FREQUENCY }> = ReadWrite::new();
/// 0..=255
const AMPLITUDE: ReadWrite<u32, { memory_map::wave::AMPLITUDE }> = ReadWrite::new();
/// degrees, 0..=359
const PHASE: ReadWrite<u32, { memory_map::wave::PHASE }> = ReadWrite::new();
/// percent, 0..=100
const DUTY: ReadWrite<u32, { memory_map::wave::DUTY }> = ReadWrite::new();

/// Waveform generator driver.
///
/// Parameter setters write the register verbatim; range limits are the
/// device's business.
#[derive(Debug)]
pub struct Wave<P> {
    port: P,
}

impl<P: RegisterPort> Wave<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    /// Disables output and loads the default parameters.
    pub fn init(&mut self) {
        CONTROL.write(&self.port, WaveControl::new());
        FREQUENCY.write(&self.port, DEFAULT_FREQUENCY);
        AMPLITUDE.write(&self.port, DEFAULT_AMPLITUDE);
        PHASE.write(&self.port, DEFAULT_PHASE);
        DUTY.write(&self.port, DEFAULT_DUTY);
    }

    pub fn enable(&mut self) {
        CONTROL.modify(&self.port, |c| c.set(WaveControl::enable, 1));
    }

    pub fn disable(&mut self) {
        CONTROL.modify(&self.port, |c| c.set(WaveControl::enable, 0));
    }

    pub fn is_enabled(&self) -> bool {
        CONTROL.read(&self.port).is_set(WaveControl::enable)
    }

    /// Replaces the 3-bit type field with `code & 0x7`. Codes 4..=7 are
    /// stored as given; the device treats them as sine.
    pub fn set_type(&mut self, code: u32) {
        CONTROL.modify(&self.port, |c| c.set(WaveControl::waveform, code & 0x7));
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        CONTROL.modify(&self.port, |c| c.set_enum(WaveControl::waveform, waveform));
    }

    /// `None` when the type field holds an undefined code.
    pub fn waveform(&self) -> Option<Waveform> {
        CONTROL.read(&self.port).get_enum(WaveControl::waveform)
    }

    pub fn control(&self) -> WaveControl {
        CONTROL.read(&self.port)
    }

    pub fn set_frequency(&mut self, hz: u32) {
        FREQUENCY.write(&self.port, hz);
    }

    pub fn frequency(&self) -> u32 {
        FREQUENCY.read(&self.port)
    }

    pub fn set_amplitude(&mut self, amplitude: u32) {
        AMPLITUDE.write(&self.port, amplitude);
    }

    pub fn amplitude(&self) -> u32 {
        AMPLITUDE.read(&self.port)
    }

    pub fn set_phase(&mut self, degrees: u32) {
        PHASE.write(&self.port, degrees);
    }

    pub fn phase(&self) -> u32 {
        PHASE.read(&self.port)
    }

    pub fn set_duty(&mut self, percent: u32) {
        DUTY.write(&self.port, percent);
    }

    pub fn duty(&self) -> u32 {
        DUTY.read(&self.port)
    }
}

impl Wave<Mmio> {
    /// # Safety
    /// The wave generator window at [`memory_map::WAVE_BASE`] must be mapped.
    pub const unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new(memory_map::WAVE_BASE) })
    }
}
