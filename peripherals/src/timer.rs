use typestate::Mmio;
use typestate::ReadPure;
use typestate::ReadWrite;
use typestate::Readable;
use typestate::RegisterPort;
use typestate::Writable;
use typestate::WriteOneToClear;
use typestate_macro::RawReg;

use crate::memory_map;

/// Timer Control Register
#[repr(transparent)]
#[derive(Clone, Copy, RawReg, PartialEq, Eq, Debug)]
pub struct TimerControl(pub u32);

impl TimerControl {
    pub const ENABLE: Self = Self(1 << 0);
    pub const INTERRUPT: Self = Self(1 << 1);
    pub const AUTO_RELOAD: Self = Self(1 << 2);
}

/// Timer Status Register (write 1 to clear)
#[repr(transparent)]
#[derive(Clone, Copy, RawReg, PartialEq, Eq, Debug)]
pub struct TimerStatus(pub u32);

impl TimerStatus {
    /// Count reached the compare value.
    pub const MATCH: Self = Self(1 << 0);
}

const COUNT: ReadPure<u32, { memory_map::timer::COUNT }> = ReadPure::new();
const CONTROL: ReadWrite<TimerControl, { memory_map::timer::CONTROL }> = ReadWrite::new();
const COMPARE: ReadWrite<u32, { memory_map::timer::COMPARE }> = ReadWrite::new();
const STATUS: WriteOneToClear<TimerStatus, { memory_map::timer::STATUS }> =
    WriteOneToClear::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// No match was observed within the poll budget.
    Timeout { polls: u32 },
}

#[derive(Debug)]
pub struct Timer<P> {
    port: P,
}

impl<P: RegisterPort> Timer<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    /// Loads `compare` and leaves the timer disabled with no pending match.
    pub fn init(&mut self, compare: u32) {
        COMPARE.write(&self.port, compare);
        CONTROL.write(&self.port, TimerControl::empty());
        STATUS.acknowledge(&self.port, TimerStatus::MATCH);
    }

    /// Starts counting with interrupt and auto-reload set, in one control write.
    pub fn enable(&mut self) {
        CONTROL.write(
            &self.port,
            TimerControl::ENABLE | TimerControl::INTERRUPT | TimerControl::AUTO_RELOAD,
        );
    }

    pub fn disable(&mut self) {
        CONTROL.write(&self.port, TimerControl::empty());
    }

    /// Raw status word. Reading it has no side effects.
    pub fn get_status(&self) -> u32 {
        STATUS.read(&self.port).bits()
    }

    pub fn is_matched(&self) -> bool {
        STATUS.read(&self.port).contains(TimerStatus::MATCH)
    }

    /// Acknowledges the match flag. Other status bits are written as 0 and
    /// therefore stay untouched.
    pub fn clear_status(&mut self) {
        STATUS.acknowledge(&self.port, TimerStatus::MATCH);
    }

    pub fn count(&self) -> u32 {
        COUNT.read(&self.port)
    }

    pub fn compare(&self) -> u32 {
        COMPARE.read(&self.port)
    }

    pub fn control(&self) -> TimerControl {
        CONTROL.read(&self.port)
    }

    pub fn is_enabled(&self) -> bool {
        self.control().contains(TimerControl::ENABLE)
    }

    /// Polls the match flag at most `max_polls` times.
    ///
    /// Returns how many polls it took. The flag is left set; acknowledge it
    /// with [`clear_status`](Self::clear_status).
    pub fn wait_for_match(&self, max_polls: u32) -> Result<u32, TimerError> {
        for polls in 1..=max_polls {
            if self.is_matched() {
                return Ok(polls);
            }
            core::hint::spin_loop();
        }
        Err(TimerError::Timeout { polls: max_polls })
    }
}

impl Timer<Mmio> {
    /// # Safety
    /// The timer window at [`memory_map::TIMER_BASE`] must be mapped.
    pub const unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new(memory_map::TIMER_BASE) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::TIMER_BASE;
    use crate::sim::SimBus;

    #[test]
    fn init_leaves_a_known_disabled_state() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));

        timer.init(1234);

        assert_eq!(timer.compare(), 1234);
        assert!(!timer.is_enabled());
        assert_eq!(timer.get_status(), 0);
        assert_eq!(
            bus.writes(),
            [(TIMER_BASE + 0x8, 1234), (TIMER_BASE + 0x4, 0), (TIMER_BASE + 0xC, 1)]
        );
    }

    #[test]
    fn enable_is_a_single_control_write() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));

        timer.enable();

        assert_eq!(bus.writes(), [(TIMER_BASE + 0x4, 0b111)]);
        timer.disable();
        assert_eq!(timer.control(), TimerControl(0));
    }

    #[test]
    fn clear_status_after_match_reads_zero() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        timer.init(5);
        timer.enable();

        timer.wait_for_match(100).unwrap();
        assert_ne!(timer.get_status(), 0);

        timer.clear_status();
        assert_eq!(timer.get_status(), 0);
        assert_eq!(bus.writes().last(), Some(&(TIMER_BASE + 0xC, 1)));
    }

    #[test]
    fn clear_status_writes_one_not_zero() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        bus.force_timer_status(0b101);

        timer.clear_status();

        assert_eq!(timer.get_status(), 0b100);
        assert!(!timer.is_matched());
    }

    #[test]
    fn wait_for_match_gives_up() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        timer.init(1_000_000);
        timer.enable();

        assert_eq!(timer.wait_for_match(10), Err(TimerError::Timeout { polls: 10 }));
        assert_eq!(timer.wait_for_match(0), Err(TimerError::Timeout { polls: 0 }));
    }

    #[test]
    fn auto_reload_restarts_the_count() {
        let bus = SimBus::new();
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        timer.init(3);
        timer.enable();

        let polls = timer.wait_for_match(50).unwrap();

        assert!(polls <= 4);
        assert!(timer.count() < 3);
        assert!(bus.timer_interrupt_pending());
    }
}
