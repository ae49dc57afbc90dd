//! Serial debug output (16550 UART, COM1 @ 0x3F8)
//!
//! No buffering, no interrupts, pure polling. Generic over the port
//! accessor so the fault path can build one on the spot and tests can
//! capture the bytes.

use core::fmt;

use crate::cpu::pio::PortIo;

/// COM1 base port
pub const COM1: u16 = 0x3F8;

const REG_DATA: u16 = 0;
const REG_IER: u16 = 1;
const REG_FCR: u16 = 2;
const REG_LCR: u16 = 3;
const REG_MCR: u16 = 4;
const REG_LSR: u16 = 5;

const LCR_DLAB: u8 = 0x80;
const LCR_8N1: u8 = 0x03;
const LSR_TX_EMPTY: u8 = 0x20;

/// 115200 / divisor
const DIVISOR_115200: u16 = 1;

/// Transmit spins before a byte is dropped.
const TX_SPINS: usize = 100;

/// A polled UART.
pub struct SerialPort<P> {
    ports: P,
    base: u16,
}

impl<P> SerialPort<P> {
    pub const fn new(ports: P, base: u16) -> Self {
        Self { ports, base }
    }

    pub fn into_inner(self) -> P {
        self.ports
    }
}

impl<P: PortIo> SerialPort<P> {
    /// Program 115200 8N1, FIFOs on, UART interrupts off.
    pub fn init(&mut self) {
        let base = self.base;
        unsafe {
            self.ports.outb(base + REG_IER, 0x00);
            self.ports.outb(base + REG_LCR, LCR_DLAB);
            self.ports.outb(base + REG_DATA, DIVISOR_115200 as u8);
            self.ports.outb(base + REG_IER, (DIVISOR_115200 >> 8) as u8);
            self.ports.outb(base + REG_LCR, LCR_8N1);
            self.ports.outb(base + REG_FCR, 0xC7);
            self.ports.outb(base + REG_MCR, 0x03);
        }
    }

    /// Write one byte. Bounded wait, gives up after ~100 spins.
    #[inline]
    pub fn putc(&mut self, b: u8) {
        let base = self.base;
        unsafe {
            for _ in 0..TX_SPINS {
                if self.ports.inb(base + REG_LSR) & LSR_TX_EMPTY != 0 {
                    self.ports.outb(base + REG_DATA, b);
                    return;
                }
                core::hint::spin_loop();
            }
        }
    }

    /// Write string.
    pub fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }

    /// Write u32 as hex (0x prefix).
    pub fn put_hex32(&mut self, val: u32) {
        self.puts("0x");
        for i in (0..8).rev() {
            let nibble = ((val >> (i * 4)) & 0xF) as u8;
            self.putc(hex_digit(nibble));
        }
    }
}

impl<P: PortIo> fmt::Write for SerialPort<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s);
        Ok(())
    }
}

const fn hex_digit(nibble: u8) -> u8 {
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'A' + nibble - 10
    }
}
