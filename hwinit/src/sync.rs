//! Synchronization Primitives
//!
//! Single CPU, no scheduler: the only thing that can reenter us is an
//! interrupt handler. Masking interrupts around a critical section is
//! therefore enough; the spin mutexes in this crate are layered on top so
//! a missing guard shows up as a deadlock instead of silent corruption.

use crate::cpu::Cpu;

// ═══════════════════════════════════════════════════════════════════════════
// INTERRUPT GUARD
// ═══════════════════════════════════════════════════════════════════════════

/// RAII guard that disables interrupts and restores on drop.
///
/// Interrupts are only re-enabled if they were enabled when the guard was
/// taken, so guards nest.
pub struct InterruptGuard<'a, C: Cpu> {
    cpu: &'a C,
    was_enabled: bool,
}

impl<'a, C: Cpu> InterruptGuard<'a, C> {
    /// Disable interrupts, returning a guard that restores them on drop.
    pub fn new(cpu: &'a C) -> Self {
        let was_enabled = cpu.interrupts_enabled();
        cpu.disable_interrupts();
        Self { cpu, was_enabled }
    }

    /// Interrupt state at the time the guard was taken.
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

impl<C: Cpu> Drop for InterruptGuard<'_, C> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.cpu.enable_interrupts();
        }
    }
}

/// Execute a closure with interrupts disabled.
pub fn without_interrupts<C, F, R>(cpu: &C, f: F) -> R
where
    C: Cpu,
    F: FnOnce() -> R,
{
    let _guard = InterruptGuard::new(cpu);
    f()
}
