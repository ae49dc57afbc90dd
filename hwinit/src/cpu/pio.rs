//! Port I/O
//!
//! `in`/`out` behind a trait. [`HwPorts`] is the real I/O space; tests
//! substitute a port file that records every access.

/// Access to the x86 I/O port space.
///
/// All methods are `unsafe`: a port access can reprogram arbitrary
/// hardware, and the caller owns whatever protocol the port speaks.
pub trait PortIo {
    /// Read a byte.
    unsafe fn inb(&mut self, port: u16) -> u8;
    /// Read a word.
    unsafe fn inw(&mut self, port: u16) -> u16;
    /// Read a dword.
    unsafe fn inl(&mut self, port: u16) -> u32;
    /// Write a byte.
    unsafe fn outb(&mut self, port: u16, value: u8);
    /// Write a word.
    unsafe fn outw(&mut self, port: u16, value: u16);
    /// Write a dword.
    unsafe fn outl(&mut self, port: u16, value: u32);
}

impl<P: PortIo + ?Sized> PortIo for &mut P {
    unsafe fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    unsafe fn inw(&mut self, port: u16) -> u16 {
        (**self).inw(port)
    }

    unsafe fn inl(&mut self, port: u16) -> u32 {
        (**self).inl(port)
    }

    unsafe fn outb(&mut self, port: u16, value: u8) {
        (**self).outb(port, value)
    }

    unsafe fn outw(&mut self, port: u16, value: u16) {
        (**self).outw(port, value)
    }

    unsafe fn outl(&mut self, port: u16, value: u32) {
        (**self).outl(port, value)
    }
}

/// The processor's I/O port space.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct HwPorts;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for HwPorts {
    #[inline(always)]
    unsafe fn inb(&mut self, port: u16) -> u8 {
        let value: u8;
        core::arch::asm!(
            "in al, dx",
            in("dx") port,
            out("al") value,
            options(nomem, nostack, preserves_flags)
        );
        value
    }

    #[inline(always)]
    unsafe fn inw(&mut self, port: u16) -> u16 {
        let value: u16;
        core::arch::asm!(
            "in ax, dx",
            in("dx") port,
            out("ax") value,
            options(nomem, nostack, preserves_flags)
        );
        value
    }

    #[inline(always)]
    unsafe fn inl(&mut self, port: u16) -> u32 {
        let value: u32;
        core::arch::asm!(
            "in eax, dx",
            in("dx") port,
            out("eax") value,
            options(nomem, nostack, preserves_flags)
        );
        value
    }

    #[inline(always)]
    unsafe fn outb(&mut self, port: u16, value: u8) {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }

    #[inline(always)]
    unsafe fn outw(&mut self, port: u16, value: u16) {
        core::arch::asm!(
            "out dx, ax",
            in("dx") port,
            in("ax") value,
            options(nomem, nostack, preserves_flags)
        );
    }

    #[inline(always)]
    unsafe fn outl(&mut self, port: u16, value: u32) {
        core::arch::asm!(
            "out dx, eax",
            in("dx") port,
            in("eax") value,
            options(nomem, nostack, preserves_flags)
        );
    }
}
