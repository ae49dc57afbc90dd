//! CPU control
//!
//! The handful of processor operations the bridge needs: the interrupt
//! flag and `hlt`. Everything that touches them goes through the [`Cpu`]
//! trait so the config window and the panic path can run against a
//! simulated processor.
//!
//! # Modules
//!
//! - `pio` - Port I/O

pub mod pio;

/// RFLAGS.IF
const FLAGS_IF: usize = 1 << 9;

/// Processor operations used by the bridge.
pub trait Cpu {
    /// Whether maskable interrupts are currently delivered.
    fn interrupts_enabled(&self) -> bool;

    /// Mask interrupts (`cli`).
    fn disable_interrupts(&self);

    /// Unmask interrupts (`sti`).
    fn enable_interrupts(&self);

    /// Stop until the next interrupt (`hlt`).
    fn halt(&self);
}

impl<C: Cpu + ?Sized> Cpu for &C {
    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }

    fn halt(&self) {
        (**self).halt()
    }
}

/// Park the processor for good.
///
/// Interrupts are left as they are; a woken CPU just halts again.
pub fn halt_forever<C: Cpu>(cpu: &C) -> ! {
    loop {
        cpu.halt();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// x86 HARDWARE
// ═══════════════════════════════════════════════════════════════════════════

/// The real processor.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Cpu;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl Cpu for X86Cpu {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        interrupts_enabled()
    }

    #[inline]
    fn disable_interrupts(&self) {
        disable_interrupts()
    }

    #[inline]
    fn enable_interrupts(&self) {
        enable_interrupts()
    }

    #[inline]
    fn halt(&self) {
        unsafe { core::arch::asm!("hlt", options(nomem, nostack)); }
    }
}

/// Enable interrupts
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(always)]
pub fn enable_interrupts() {
    unsafe { core::arch::asm!("sti", options(nostack)); }
}

/// Disable interrupts
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(always)]
pub fn disable_interrupts() {
    unsafe { core::arch::asm!("cli", options(nostack)); }
}

/// Check if interrupts are enabled
#[cfg(target_arch = "x86_64")]
pub fn interrupts_enabled() -> bool {
    let rflags: u64;
    unsafe { core::arch::asm!("pushfq; pop {}", out(reg) rflags); }
    (rflags as usize & FLAGS_IF) != 0
}

/// Check if interrupts are enabled
#[cfg(target_arch = "x86")]
pub fn interrupts_enabled() -> bool {
    let eflags: u32;
    unsafe { core::arch::asm!("pushfd; pop {}", out(reg) eflags); }
    (eflags as usize & FLAGS_IF) != 0
}
