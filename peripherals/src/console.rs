use core::fmt;
use core::fmt::Write;

use mutex::SpinLock;
use typestate::Mmio;

use crate::uart::Uart;

static CONSOLE: SpinLock<Option<Uart<Mmio>>> = SpinLock::new(None);

/// Routes [`print!`](crate::print) and [`println!`](crate::println) to `uart`.
pub fn init(uart: Uart<Mmio>) {
    *CONSOLE.lock() = Some(uart);
}

/// Detaches the console UART. Later prints are dropped.
pub fn release() -> Option<Uart<Mmio>> {
    CONSOLE.lock().take()
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::console::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($fmt:expr, $($arg:tt)+) => ($crate::print!(concat!($fmt, "\n"), $($arg)*));
    ($fmt:expr) => ($crate::print!(concat!($fmt, "\n")));
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    if let Some(uart) = CONSOLE.lock().as_mut() {
        // the UART never reports failure
        let _ = uart.write_fmt(args);
    }
}
