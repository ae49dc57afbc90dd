//! The legacy configuration window (mechanism #1).
//!
//! Two ports shared by every piece of code that talks to PCI config
//! space, interrupt handlers included:
//!
//! ```text
//! 0xCF8  CONFIG_ADDRESS   which dword of which function
//! 0xCFC  CONFIG_DATA      that dword (0xCFC..0xCFF = byte lanes)
//! ```
//!
//! Every access is save / select / transfer / restore. Whoever we
//! interrupted may have selected a register and not yet touched the data
//! port, so `CONFIG_ADDRESS` must read back exactly what it held before.

use spin::Mutex;

use crate::cpu::pio::PortIo;
use crate::cpu::Cpu;
use crate::pci::PciAddr;
use crate::sync::InterruptGuard;

/// Address-select port.
pub const CONFIG_ADDRESS: u16 = 0xCF8;
/// Data port.
pub const CONFIG_DATA: u16 = CONFIG_ADDRESS + 4;

/// The shared configuration window.
///
/// Owns the port accessor behind a spin mutex and masks interrupts for
/// the duration of every access.
pub struct ConfigWindow<P, C> {
    ports: Mutex<P>,
    cpu: C,
}

impl<P, C> ConfigWindow<P, C> {
    pub const fn new(ports: P, cpu: C) -> Self {
        Self {
            ports: Mutex::new(ports),
            cpu,
        }
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn into_parts(self) -> (P, C) {
        (self.ports.into_inner(), self.cpu)
    }
}

impl<P: PortIo, C: Cpu> ConfigWindow<P, C> {
    /// Read a byte from config space.
    pub fn read8(&self, addr: PciAddr) -> u8 {
        self.access(addr, |ports, data| unsafe { ports.inb(data) })
    }

    /// Read a word from config space.
    pub fn read16(&self, addr: PciAddr) -> u16 {
        self.access(addr, |ports, data| unsafe { ports.inw(data) })
    }

    /// Read a dword from config space. The lane bits are ignored.
    pub fn read32(&self, addr: PciAddr) -> u32 {
        self.access(addr, |ports, _| unsafe { ports.inl(CONFIG_DATA) })
    }

    /// Write a byte to config space.
    pub fn write8(&self, value: u8, addr: PciAddr) {
        self.access(addr, |ports, data| unsafe { ports.outb(data, value) })
    }

    /// Write a word to config space.
    pub fn write16(&self, value: u16, addr: PciAddr) {
        self.access(addr, |ports, data| unsafe { ports.outw(data, value) })
    }

    /// Write a dword to config space. The lane bits are ignored.
    pub fn write32(&self, value: u32, addr: PciAddr) {
        self.access(addr, |ports, _| unsafe { ports.outl(CONFIG_DATA, value) })
    }

    /// Run one transfer with `addr` selected.
    ///
    /// `f` gets the port accessor and the data port for `addr`'s lane.
    fn access<R>(&self, addr: PciAddr, f: impl FnOnce(&mut P, u16) -> R) -> R {
        let _irq = InterruptGuard::new(&self.cpu);
        let mut ports = self.ports.lock();

        let mut select = unsafe { Selected::new(&mut *ports, addr) };
        let data = CONFIG_DATA + addr.lane();
        f(select.ports(), data)
    }
}

/// A selected window. Puts the previous `CONFIG_ADDRESS` back on drop.
struct Selected<'a, P: PortIo> {
    ports: &'a mut P,
    saved: u32,
}

impl<'a, P: PortIo> Selected<'a, P> {
    /// # Safety
    /// Caller holds the window exclusively with interrupts masked.
    unsafe fn new(ports: &'a mut P, addr: PciAddr) -> Self {
        let saved = ports.inl(CONFIG_ADDRESS);
        ports.outl(CONFIG_ADDRESS, addr.dword_select());
        Self { ports, saved }
    }

    fn ports(&mut self) -> &mut P {
        self.ports
    }
}

impl<P: PortIo> Drop for Selected<'_, P> {
    fn drop(&mut self) {
        unsafe { self.ports.outl(CONFIG_ADDRESS, self.saved) }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GLOBAL WINDOW
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod global {
    use super::ConfigWindow;
    use crate::cpu::pio::HwPorts;
    use crate::cpu::X86Cpu;
    use crate::pci::PciAddr;

    /// The machine's configuration window.
    pub static PCI_CONFIG: ConfigWindow<HwPorts, X86Cpu> = ConfigWindow::new(HwPorts, X86Cpu);

    /// Read 8-bit value from PCI configuration space.
    #[inline]
    pub fn pci_cfg_read8(addr: PciAddr) -> u8 {
        PCI_CONFIG.read8(addr)
    }

    /// Read 16-bit value from PCI configuration space.
    #[inline]
    pub fn pci_cfg_read16(addr: PciAddr) -> u16 {
        PCI_CONFIG.read16(addr)
    }

    /// Read 32-bit value from PCI configuration space.
    #[inline]
    pub fn pci_cfg_read32(addr: PciAddr) -> u32 {
        PCI_CONFIG.read32(addr)
    }

    /// Write 8-bit value to PCI configuration space.
    #[inline]
    pub fn pci_cfg_write8(value: u8, addr: PciAddr) {
        PCI_CONFIG.write8(value, addr)
    }

    /// Write 16-bit value to PCI configuration space.
    #[inline]
    pub fn pci_cfg_write16(value: u16, addr: PciAddr) {
        PCI_CONFIG.write16(value, addr)
    }

    /// Write 32-bit value to PCI configuration space.
    #[inline]
    pub fn pci_cfg_write32(value: u32, addr: PciAddr) {
        PCI_CONFIG.write32(value, addr)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use global::*;
