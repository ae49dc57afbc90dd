//! Diagnostics
//!
//! Two ways out of the machine, both over the serial port:
//!
//! - [`DiagnosticSink`], the minimal channel the fault path writes its one
//!   line through. Anything implementing `core::fmt::Write` is a sink.
//! - [`SerialLogger`], the `log` backend behind `dprintln!` (feature
//!   `debug`) and `dprintln2!` (feature `debug-verbose`). Without those
//!   features the macros compile to nothing.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::cpu::pio::PortIo;
use crate::serial::SerialPort;

/// Line prefix.
pub const PREFIX: &str = "[LOWBOOT]";

/// Most verbose level the build emits.
pub const MAX_LEVEL: LevelFilter = if cfg!(feature = "debug-verbose") {
    LevelFilter::Trace
} else if cfg!(feature = "debug") {
    LevelFilter::Debug
} else {
    LevelFilter::Info
};

/// Where fault diagnostics go.
pub trait DiagnosticSink {
    /// Emit one line.
    fn emit(&mut self, args: fmt::Arguments<'_>);
}

impl<W: Write> DiagnosticSink for W {
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.write_fmt(args);
        let _ = self.write_char('\n');
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOG BACKEND
// ═══════════════════════════════════════════════════════════════════════════

/// `log` backend writing prefixed lines to a UART.
///
/// A record that arrives while another is being written (an interrupt
/// handler logging mid-line) is dropped rather than waited for.
pub struct SerialLogger<P> {
    port: Mutex<SerialPort<P>>,
}

impl<P> SerialLogger<P> {
    pub const fn new(port: SerialPort<P>) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }

    pub fn into_inner(self) -> SerialPort<P> {
        self.port.into_inner()
    }
}

impl<P: PortIo> SerialLogger<P> {
    /// Program the UART.
    pub fn init_port(&self) {
        self.port.lock().init();
    }
}

impl<P: PortIo + Send> Log for SerialLogger<P> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(mut port) = self.port.try_lock() {
            let _ = writeln!(
                port,
                "{} {:<5} {}: {}",
                PREFIX,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

// ═══════════════════════════════════════════════════════════════════════════
// DEBUG MACROS
// ═══════════════════════════════════════════════════════════════════════════

/// Debug print, compiled in with the `debug` feature.
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! dprintln {
    ($($arg:tt)*) => {
        $crate::__log::debug!($($arg)*)
    };
}

/// Debug print, compiled in with the `debug` feature.
#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! dprintln {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Really verbose debugging, compiled in with `debug-verbose`.
#[cfg(feature = "debug-verbose")]
#[macro_export]
macro_rules! dprintln2 {
    ($($arg:tt)*) => {
        $crate::__log::trace!($($arg)*)
    };
}

/// Really verbose debugging, compiled in with `debug-verbose`.
#[cfg(not(feature = "debug-verbose"))]
#[macro_export]
macro_rules! dprintln2 {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    struct Capture {
        out: [u8; 128],
        len: usize,
    }

    impl PortIo for Capture {
        unsafe fn inb(&mut self, _port: u16) -> u8 {
            0x20
        }
        unsafe fn inw(&mut self, _port: u16) -> u16 {
            0
        }
        unsafe fn inl(&mut self, _port: u16) -> u32 {
            0
        }
        unsafe fn outb(&mut self, port: u16, value: u8) {
            if port == crate::serial::COM1 {
                self.out[self.len] = value;
                self.len += 1;
            }
        }
        unsafe fn outw(&mut self, _port: u16, _value: u16) {}
        unsafe fn outl(&mut self, _port: u16, _value: u32) {}
    }

    #[test]
    fn test_logger_line_format() {
        let port = SerialPort::new(Capture { out: [0; 128], len: 0 }, crate::serial::COM1);
        let logger = SerialLogger::new(port);

        logger.log(
            &Record::builder()
                .args(format_args!("window at {:#x}", 0xCF8))
                .level(Level::Info)
                .target("pci")
                .build(),
        );

        let cap = logger.into_inner().into_inner();
        assert_eq!(&cap.out[..cap.len], b"[LOWBOOT] INFO  pci: window at 0xcf8\n");
    }

    #[test]
    fn test_filtered_level_dropped() {
        let port = SerialPort::new(Capture { out: [0; 128], len: 0 }, crate::serial::COM1);
        let logger = SerialLogger::new(port);

        if MAX_LEVEL < LevelFilter::Trace {
            logger.log(
                &Record::builder()
                    .args(format_args!("noise"))
                    .level(Level::Trace)
                    .build(),
            );
            assert_eq!(logger.into_inner().into_inner().len, 0);
        }
    }

    #[test]
    fn test_write_sink_appends_newline() {
        let mut line = [0u8; 32];
        let mut buf = Buf { bytes: &mut line, len: 0 };
        buf.emit(format_args!("ptr {:#X}", 0xDEAD_BEEFu32));
        let len = buf.len;
        assert_eq!(&line[..len], b"ptr 0xDEADBEEF\n");
    }

    struct Buf<'a> {
        bytes: &'a mut [u8],
        len: usize,
    }

    impl Write for Buf<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.bytes[self.len..self.len + s.len()].copy_from_slice(s.as_bytes());
            self.len += s.len();
            Ok(())
        }
    }
}
