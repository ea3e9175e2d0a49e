//! Host-side model of the peripheral block.
//!
//! [`SimBus`] decodes absolute addresses into the five device models and
//! hands out [`SimPort`]s that drivers use exactly like an [`Mmio`] port.
//! Every write is logged; reads are not. Each access counts as one bus cycle
//! and advances the timer, so a driver polling the timer makes progress.
//!
//! [`Mmio`]: typestate::Mmio

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use mutex::SpinLock;
use typestate::RegisterPort;

use crate::color::Color;
use crate::memory_map;
use crate::memory_map::CANVAS_HEIGHT;
use crate::memory_map::CANVAS_WIDTH;

/// An access the device refused. Recorded, never raised through the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// No register at this address.
    Unmapped { addr: usize },
    /// Store to a register the device only lets software read.
    ReadOnly { addr: usize, value: u32 },
    /// Store the device rejected because of its value.
    OutOfRange { addr: usize, value: u32 },
}

/// Why a device model turned an access down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reject {
    Unmapped,
    ReadOnly,
    OutOfRange,
}

impl Reject {
    fn at(self, addr: usize, value: u32) -> BusFault {
        match self {
            Reject::Unmapped => BusFault::Unmapped { addr },
            Reject::ReadOnly => BusFault::ReadOnly { addr, value },
            Reject::OutOfRange => BusFault::OutOfRange { addr, value },
        }
    }
}

trait Device {
    fn read(&mut self, offset: usize) -> Result<u32, Reject>;
    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject>;
}

#[derive(Debug, Default)]
struct UartModel {
    out: String,
}

impl Device for UartModel {
    fn read(&mut self, offset: usize) -> Result<u32, Reject> {
        match offset {
            memory_map::uart::DATA => Ok(0),
            _ => Err(Reject::Unmapped),
        }
    }

    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject> {
        match offset {
            memory_map::uart::DATA => {
                self.out.push((value & 0xFF) as u8 as char);
                Ok(())
            }
            _ => Err(Reject::Unmapped),
        }
    }
}

#[derive(Debug, Default)]
struct GpioModel {
    direction: u32,
    output: u32,
    input: u32,
}

impl Device for GpioModel {
    fn read(&mut self, offset: usize) -> Result<u32, Reject> {
        match offset {
            memory_map::gpio::DIRECTION => Ok(self.direction),
            memory_map::gpio::OUTPUT => Ok(self.output),
            memory_map::gpio::INPUT => Ok(self.input),
            _ => Err(Reject::Unmapped),
        }
    }

    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject> {
        match offset {
            memory_map::gpio::DIRECTION => self.direction = value,
            memory_map::gpio::OUTPUT => self.output = value,
            memory_map::gpio::INPUT => return Err(Reject::ReadOnly),
            _ => return Err(Reject::Unmapped),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct TimerModel {
    count: u32,
    control: u32,
    compare: u32,
    status: u32,
}

impl TimerModel {
    const ENABLE: u32 = 1 << 0;
    const INTERRUPT: u32 = 1 << 1;
    const RELOAD: u32 = 1 << 2;
    const MATCH: u32 = 1 << 0;

    fn tick(&mut self) {
        if self.control & Self::ENABLE == 0 {
            return;
        }
        self.count = self.count.wrapping_add(1);
        if self.count == self.compare {
            self.status |= Self::MATCH;
            if self.control & Self::RELOAD != 0 {
                self.count = 0;
            }
        }
    }

    fn interrupt_pending(&self) -> bool {
        self.control & Self::INTERRUPT != 0 && self.status & Self::MATCH != 0
    }
}

impl Default for TimerModel {
    fn default() -> Self {
        Self {
            count: 0,
            control: 0,
            compare: u32::MAX,
            status: 0,
        }
    }
}

impl Device for TimerModel {
    fn read(&mut self, offset: usize) -> Result<u32, Reject> {
        match offset {
            memory_map::timer::COUNT => Ok(self.count),
            memory_map::timer::CONTROL => Ok(self.control),
            memory_map::timer::COMPARE => Ok(self.compare),
            memory_map::timer::STATUS => Ok(self.status),
            _ => Err(Reject::Unmapped),
        }
    }

    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject> {
        match offset {
            memory_map::timer::COUNT => self.count = value,
            memory_map::timer::CONTROL => self.control = value,
            memory_map::timer::COMPARE => self.compare = value,
            // write 1 to clear
            memory_map::timer::STATUS => self.status &= !value,
            _ => return Err(Reject::Unmapped),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct WaveModel {
    control: u32,
    frequency: u32,
    amplitude: u32,
    phase: u32,
    duty: u32,
}

impl Default for WaveModel {
    fn default() -> Self {
        Self {
            control: 0,
            frequency: crate::wave::DEFAULT_FREQUENCY,
            amplitude: crate::wave::DEFAULT_AMPLITUDE,
            phase: crate::wave::DEFAULT_PHASE,
            duty: crate::wave::DEFAULT_DUTY,
        }
    }
}

impl Device for WaveModel {
    fn read(&mut self, offset: usize) -> Result<u32, Reject> {
        match offset {
            memory_map::wave::CONTROL => Ok(self.control),
            memory_map::wave::FREQUENCY => Ok(self.frequency),
            memory_map::wave::AMPLITUDE => Ok(self.amplitude),
            memory_map::wave::PHASE => Ok(self.phase),
            memory_map::wave::DUTY => Ok(self.duty),
            _ => Err(Reject::Unmapped),
        }
    }

    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject> {
        match offset {
            memory_map::wave::CONTROL => self.control = value,
            memory_map::wave::FREQUENCY => self.frequency = value,
            memory_map::wave::AMPLITUDE => self.amplitude = value.min(255),
            memory_map::wave::PHASE => self.phase = value % 360,
            memory_map::wave::DUTY => self.duty = value.min(100),
            _ => return Err(Reject::Unmapped),
        }
        Ok(())
    }
}

/// Pixels land in `back` as their color is stored and become visible in
/// `front` on update.
#[derive(Debug)]
struct DisplayModel {
    control: u32,
    status: u32,
    x: u32,
    y: u32,
    color: u32,
    back: Vec<u32>,
    front: Vec<u32>,
    painted: Vec<(u32, u32)>,
    commits: u32,
}

impl DisplayModel {
    const ENABLE: u32 = 1 << 0;
    const READY: u32 = 1 << 0;

    fn index(x: u32, y: u32) -> usize {
        (y * CANVAS_WIDTH + x) as usize
    }
}

impl Default for DisplayModel {
    fn default() -> Self {
        let pixels = (CANVAS_WIDTH * CANVAS_HEIGHT) as usize;
        Self {
            control: 0,
            status: Self::READY,
            x: 0,
            y: 0,
            color: 0,
            back: vec![0; pixels],
            front: vec![0; pixels],
            painted: Vec::new(),
            commits: 0,
        }
    }
}

impl Device for DisplayModel {
    fn read(&mut self, offset: usize) -> Result<u32, Reject> {
        match offset {
            memory_map::display::CTRL => Ok(self.control),
            memory_map::display::STATUS => Ok(self.status),
            memory_map::display::X => Ok(self.x),
            memory_map::display::Y => Ok(self.y),
            memory_map::display::COLOR => Ok(self.color),
            _ => Err(Reject::Unmapped),
        }
    }

    fn write(&mut self, offset: usize, value: u32) -> Result<(), Reject> {
        match offset {
            memory_map::display::CTRL => self.control = value,
            memory_map::display::STATUS => return Err(Reject::ReadOnly),
            memory_map::display::X if value >= CANVAS_WIDTH => return Err(Reject::OutOfRange),
            memory_map::display::X => self.x = value,
            memory_map::display::Y if value >= CANVAS_HEIGHT => return Err(Reject::OutOfRange),
            memory_map::display::Y => self.y = value,
            memory_map::display::COLOR => {
                self.color = value;
                if self.control & Self::ENABLE != 0 {
                    self.back[Self::index(self.x, self.y)] = value & 0x00FF_FFFF;
                    self.painted.push((self.x, self.y));
                }
            }
            memory_map::display::UPDATE => {
                self.front.copy_from_slice(&self.back);
                self.commits += 1;
            }
            _ => return Err(Reject::Unmapped),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Soc {
    uart: UartModel,
    gpio: GpioModel,
    timer: TimerModel,
    wave: WaveModel,
    display: DisplayModel,
    writes: Vec<(usize, u32)>,
    faults: Vec<BusFault>,
}

impl Soc {
    fn decode(&mut self, addr: usize) -> Option<(&mut dyn Device, usize)> {
        let base = addr & !(memory_map::WINDOW_SIZE - 1);
        let offset = addr - base;
        let device: &mut dyn Device = match base {
            memory_map::UART_BASE => &mut self.uart,
            memory_map::GPIO_BASE => &mut self.gpio,
            memory_map::TIMER_BASE => &mut self.timer,
            memory_map::WAVE_BASE => &mut self.wave,
            memory_map::DISPLAY_BASE => &mut self.display,
            _ => return None,
        };
        Some((device, offset))
    }

    fn read(&mut self, addr: usize) -> u32 {
        let result = match self.decode(addr) {
            Some((device, offset)) => device.read(offset),
            None => Err(Reject::Unmapped),
        };
        let value = result.unwrap_or_else(|reject| {
            self.faults.push(reject.at(addr, 0));
            0
        });
        self.timer.tick();
        value
    }

    fn write(&mut self, addr: usize, value: u32) {
        self.writes.push((addr, value));
        let result = match self.decode(addr) {
            Some((device, offset)) => device.write(offset, value),
            None => Err(Reject::Unmapped),
        };
        if let Err(reject) = result {
            self.faults.push(reject.at(addr, value));
        }
        self.timer.tick();
    }
}

/// The simulated SoC.
#[derive(Debug, Default)]
pub struct SimBus {
    soc: SpinLock<Soc>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Port for the device window starting at `base`.
    pub fn port(&self, base: usize) -> SimPort<'_> {
        SimPort { bus: self, base }
    }

    pub fn read(&self, addr: usize) -> u32 {
        self.soc.lock().read(addr)
    }

    pub fn write(&self, addr: usize, value: u32) {
        self.soc.lock().write(addr, value)
    }

    /// One bus cycle with no access.
    pub fn tick(&self) {
        self.soc.lock().timer.tick();
    }

    /// Every store so far as `(address, value)`, oldest first.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.soc.lock().writes.clone()
    }

    /// Forgets logged writes and painted pixels. Device state is kept.
    pub fn clear_writes(&self) {
        let mut soc = self.soc.lock();
        soc.writes.clear();
        soc.display.painted.clear();
    }

    pub fn faults(&self) -> Vec<BusFault> {
        self.soc.lock().faults.clone()
    }

    pub fn uart_output(&self) -> String {
        self.soc.lock().uart.out.clone()
    }

    pub fn set_gpio_input(&self, value: u32) {
        self.soc.lock().gpio.input = value;
    }

    /// Raises status bits as the timer hardware would.
    pub fn force_timer_status(&self, bits: u32) {
        self.soc.lock().timer.status |= bits;
    }

    pub fn timer_interrupt_pending(&self) -> bool {
        self.soc.lock().timer.interrupt_pending()
    }

    pub fn set_display_ready(&self, ready: bool) {
        let mut soc = self.soc.lock();
        if ready {
            soc.display.status |= DisplayModel::READY;
        } else {
            soc.display.status &= !DisplayModel::READY;
        }
    }

    /// Visible color at `(x, y)` as of the last update; `None` off-canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= CANVAS_WIDTH || y >= CANVAS_HEIGHT {
            return None;
        }
        let soc = self.soc.lock();
        Some(Color::from_packed(soc.display.front[DisplayModel::index(x, y)]))
    }

    /// Coordinates of every color store that hit an enabled display, in order.
    pub fn painted(&self) -> Vec<(u32, u32)> {
        self.soc.lock().display.painted.clone()
    }

    pub fn commits(&self) -> u32 {
        self.soc.lock().display.commits
    }
}

/// A [`SimBus`] seen from one device window.
#[derive(Debug, Clone, Copy)]
pub struct SimPort<'a> {
    bus: &'a SimBus,
    base: usize,
}

impl SimPort<'_> {
    pub fn base(&self) -> usize {
        self.base
    }
}

impl RegisterPort for SimPort<'_> {
    fn read(&self, offset: usize) -> u32 {
        self.bus.read(self.base + offset)
    }

    fn write(&self, offset: usize, value: u32) {
        self.bus.write(self.base + offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::*;

    #[test]
    fn unmapped_accesses_become_faults() {
        let bus = SimBus::new();

        assert_eq!(bus.read(0x1000), 0);
        bus.write(DISPLAY_BASE + WINDOW_SIZE, 5);
        bus.write(TIMER_BASE + 0x10, 1);

        assert_eq!(
            bus.faults(),
            [
                BusFault::Unmapped { addr: 0x1000 },
                BusFault::Unmapped { addr: DISPLAY_BASE + WINDOW_SIZE },
                BusFault::Unmapped { addr: TIMER_BASE + 0x10 },
            ]
        );
        assert_eq!(bus.writes().len(), 2);
    }

    #[test]
    fn read_only_registers_ignore_stores() {
        let bus = SimBus::new();
        bus.set_gpio_input(0x3);

        bus.write(GPIO_BASE + gpio::INPUT, 0xFF);
        bus.write(DISPLAY_BASE + display::STATUS, 0);

        assert_eq!(bus.read(GPIO_BASE + gpio::INPUT), 0x3);
        assert_eq!(bus.read(DISPLAY_BASE + display::STATUS), 1);
        assert_eq!(
            bus.faults(),
            [
                BusFault::ReadOnly { addr: GPIO_BASE + gpio::INPUT, value: 0xFF },
                BusFault::ReadOnly { addr: DISPLAY_BASE + display::STATUS, value: 0 },
            ]
        );
    }

    #[test]
    fn display_rejects_out_of_range_coordinates() {
        let bus = SimBus::new();
        bus.write(DISPLAY_BASE + display::X, 10);

        bus.write(DISPLAY_BASE + display::X, 300);
        bus.write(DISPLAY_BASE + display::Y, 400);

        assert_eq!(bus.read(DISPLAY_BASE + display::X), 10);
        assert_eq!(
            bus.faults(),
            [
                BusFault::OutOfRange { addr: DISPLAY_BASE + display::X, value: 300 },
                BusFault::OutOfRange { addr: DISPLAY_BASE + display::Y, value: 400 },
            ]
        );
    }

    #[test]
    fn disabled_display_paints_nothing() {
        let bus = SimBus::new();

        bus.write(DISPLAY_BASE + display::X, 1);
        bus.write(DISPLAY_BASE + display::COLOR, 0xFF);
        bus.write(DISPLAY_BASE + display::UPDATE, 1);

        assert!(bus.painted().is_empty());
        assert_eq!(bus.pixel(1, 0), Some(Color::BLACK));
        assert_eq!(bus.pixel(300, 0), None);
    }

    #[test]
    fn timer_counts_only_while_enabled() {
        let bus = SimBus::new();
        for _ in 0..5 {
            bus.tick();
        }
        assert_eq!(bus.read(TIMER_BASE + timer::COUNT), 0);

        bus.write(TIMER_BASE + timer::COMPARE, 100);
        bus.write(TIMER_BASE + timer::CONTROL, 0b001);
        bus.tick();
        bus.tick();

        // the control store itself was one cycle
        assert_eq!(bus.read(TIMER_BASE + timer::COUNT), 3);
    }

    #[test]
    fn timer_without_reload_keeps_counting_past_match() {
        let bus = SimBus::new();
        bus.write(TIMER_BASE + timer::COMPARE, 2);
        bus.write(TIMER_BASE + timer::CONTROL, 0b001);
        bus.tick();
        bus.tick();

        assert_eq!(bus.read(TIMER_BASE + timer::STATUS), 1);
        assert_eq!(bus.read(TIMER_BASE + timer::COUNT), 4);
        assert!(!bus.timer_interrupt_pending());
    }

    #[test]
    fn wave_model_clamps_parameters() {
        let bus = SimBus::new();

        bus.write(WAVE_BASE + wave::AMPLITUDE, 1000);
        bus.write(WAVE_BASE + wave::PHASE, 360);
        bus.write(WAVE_BASE + wave::DUTY, 101);

        assert_eq!(bus.read(WAVE_BASE + wave::AMPLITUDE), 255);
        assert_eq!(bus.read(WAVE_BASE + wave::PHASE), 0);
        assert_eq!(bus.read(WAVE_BASE + wave::DUTY), 100);
        assert_eq!(bus.read(WAVE_BASE + wave::FREQUENCY), 1000);
    }

    #[test]
    fn ports_offset_into_their_window() {
        let bus = SimBus::new();
        let port = bus.port(GPIO_BASE);

        port.write(gpio::OUTPUT, 0x42);

        assert_eq!(port.base(), GPIO_BASE);
        assert_eq!(bus.read(GPIO_BASE + gpio::OUTPUT), 0x42);
        assert_eq!(bus.writes(), [(GPIO_BASE + gpio::OUTPUT, 0x42)]);
    }
}
