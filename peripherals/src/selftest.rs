//! Peripheral bring-up sequences.
//!
//! Each routine narrates over the UART and drives one device through its
//! normal life cycle. Timer waits are bounded by [`POLL_BUDGET`].

use typestate::RegisterPort;

use crate::color::Color;
use crate::display::Display;
use crate::timer::Timer;
use crate::timer::TimerError;
use crate::uart::Uart;
use crate::wave::Wave;
use crate::wave::Waveform;

/// Polls allowed per timer wait before giving up.
pub const POLL_BUDGET: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestError {
    Timer(TimerError),
    DisplayNotReady,
}

impl From<TimerError> for SelfTestError {
    fn from(err: TimerError) -> Self {
        SelfTestError::Timer(err)
    }
}

pub fn uart_greeting<U: RegisterPort>(uart: &Uart<U>) -> Result<(), SelfTestError> {
    uart.puts("\n=== UART Test ===\n");
    uart.puts("Testing individual characters: ");
    for &b in b"Hello\n" {
        uart.putc(b);
    }
    uart.puts("Testing string output: Hello, World!\n");
    uart.puts("UART test completed.\n");
    Ok(())
}

/// Counts to `cycles` once, then leaves the timer disabled and acknowledged.
pub fn timer_round<U, T>(uart: &Uart<U>, timer: &mut Timer<T>, cycles: u32) -> Result<(), SelfTestError>
where
    U: RegisterPort,
    T: RegisterPort,
{
    uart.puts("\n=== Timer Test ===\n");
    timer.init(cycles);
    timer.enable();
    uart.puts("Waiting for timer...\n");
    timer.wait_for_match(POLL_BUDGET)?;
    uart.puts("Timer matched!\n");
    timer.clear_status();
    timer.disable();
    uart.puts("Timer cleared and disabled.\n");
    Ok(())
}

/// One-shot delay. The timer is stopped afterwards so its count cannot run
/// past the next, possibly smaller, compare value.
fn pause<T: RegisterPort>(timer: &mut Timer<T>, cycles: u32) -> Result<(), TimerError> {
    timer.init(cycles);
    timer.enable();
    timer.wait_for_match(POLL_BUDGET)?;
    timer.clear_status();
    timer.disable();
    Ok(())
}

/// Steps the generator through every waveform, holding each for a while.
pub fn wave_sweep<U, W, T>(
    uart: &Uart<U>,
    wave: &mut Wave<W>,
    timer: &mut Timer<T>,
) -> Result<(), SelfTestError>
where
    U: RegisterPort,
    W: RegisterPort,
    T: RegisterPort,
{
    uart.puts("\n=== Wave Generator Test ===\n");
    wave.init();

    uart.puts("Testing Sine Wave...\n");
    wave.set_waveform(Waveform::Sine);
    wave.set_frequency(100);
    wave.set_amplitude(255);
    wave.set_phase(0);
    wave.enable();
    pause(timer, 100)?;

    uart.puts("Testing Square Wave...\n");
    wave.set_waveform(Waveform::Square);
    wave.set_duty(75);
    pause(timer, 20)?;

    uart.puts("Testing Triangle Wave...\n");
    wave.set_waveform(Waveform::Triangle);
    pause(timer, 100)?;

    uart.puts("Testing Sawtooth Wave...\n");
    wave.set_waveform(Waveform::Sawtooth);
    pause(timer, 100)?;

    wave.disable();
    uart.puts("Wave generator test completed.\n");
    Ok(())
}

/// Background, filled block, frame and both diagonals.
pub fn display_pattern<U, D>(uart: &Uart<U>, display: &mut Display<D>) -> Result<(), SelfTestError>
where
    U: RegisterPort,
    D: RegisterPort,
{
    uart.puts("\n=== Display Test ===\n");
    if !display.is_ready() {
        return Err(SelfTestError::DisplayNotReady);
    }
    display.init();

    let (w, h) = (Display::<D>::WIDTH, Display::<D>::HEIGHT);
    display.clear(Color::BLACK);
    display.fill_rect(20, 20, 100, 60, Color::RED);
    display.draw_rect(10, 10, w - 20, h - 20, Color::WHITE);
    display.draw_line(0, 0, w - 1, h - 1, Color::GREEN);
    display.draw_line(w - 1, 0, 0, h - 1, Color::BLUE);
    uart.puts("Display test completed.\n");
    Ok(())
}

pub fn run_all<U, T, W, D>(
    uart: &Uart<U>,
    timer: &mut Timer<T>,
    wave: &mut Wave<W>,
    display: &mut Display<D>,
) -> Result<(), SelfTestError>
where
    U: RegisterPort,
    T: RegisterPort,
    W: RegisterPort,
    D: RegisterPort,
{
    uart.puts("Comprehensive Peripheral Test Program\n");
    uart_greeting(uart)?;
    timer_round(uart, timer, 1000)?;
    timer_round(uart, timer, 5000)?;
    wave_sweep(uart, wave, timer)?;
    display_pattern(uart, display)?;
    uart.puts("\nAll tests completed successfully!\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::*;
    use crate::sim::SimBus;

    #[test]
    fn greeting_text() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));

        uart_greeting(&uart).unwrap();

        let out = bus.uart_output();
        assert!(out.contains("Testing individual characters: Hello\n"));
        assert!(out.ends_with("UART test completed.\n"));
    }

    #[test]
    fn timer_round_leaves_timer_idle() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));
        let mut timer = Timer::new(bus.port(TIMER_BASE));

        timer_round(&uart, &mut timer, 50).unwrap();

        assert!(!timer.is_enabled());
        assert_eq!(timer.get_status(), 0);
        assert!(bus.uart_output().contains("Timer matched!\n"));
    }

    #[test]
    fn timer_round_reports_timeout() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));
        let mut timer = Timer::new(bus.port(TIMER_BASE));

        let err = timer_round(&uart, &mut timer, u32::MAX).unwrap_err();

        assert_eq!(err, SelfTestError::Timer(TimerError::Timeout { polls: POLL_BUDGET }));
        assert!(!bus.uart_output().contains("Timer matched!"));
    }

    #[test]
    fn wave_sweep_ends_disabled_on_sawtooth() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        let mut wave = Wave::new(bus.port(WAVE_BASE));

        wave_sweep(&uart, &mut wave, &mut timer).unwrap();

        assert!(!wave.is_enabled());
        assert_eq!(wave.waveform(), Some(Waveform::Sawtooth));
        assert_eq!((wave.frequency(), wave.duty()), (100, 75));
        let types: Vec<u32> = bus
            .writes()
            .into_iter()
            .filter(|&(addr, _)| addr == WAVE_BASE + crate::memory_map::wave::CONTROL)
            .map(|(_, value)| (value >> 1) & 0x7)
            .collect();
        assert_eq!(types, [0, 0, 0, 1, 2, 3, 3]);
    }

    #[test]
    fn display_pattern_requires_ready() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));
        let mut display = Display::new(bus.port(DISPLAY_BASE));
        bus.set_display_ready(false);

        assert_eq!(display_pattern(&uart, &mut display), Err(SelfTestError::DisplayNotReady));
        assert!(bus.writes().iter().all(|&(addr, _)| addr < DISPLAY_BASE));
    }

    #[test]
    fn full_run_on_the_simulator() {
        let bus = SimBus::new();
        let uart = Uart::new(bus.port(UART_BASE));
        let mut timer = Timer::new(bus.port(TIMER_BASE));
        let mut wave = Wave::new(bus.port(WAVE_BASE));
        let mut display = Display::new(bus.port(DISPLAY_BASE));

        run_all(&uart, &mut timer, &mut wave, &mut display).unwrap();

        assert!(bus.uart_output().ends_with("All tests completed successfully!\n"));
        assert_eq!(bus.pixel(50, 50), Some(Color::RED));
        assert_eq!(bus.pixel(10, 200), Some(Color::WHITE));
        assert_eq!(bus.pixel(299, 399), Some(Color::GREEN));
        assert_eq!(bus.pixel(200, 300), Some(Color::BLACK));
        // clear + fill + four edges + two diagonals
        assert_eq!(bus.commits(), 8);
        assert!(bus.faults().is_empty());
    }
}
