//! Cross-mode calls.
//!
//! A bridged call suspends the caller, puts the processor into the mode
//! the target expects, loads a [`RegisterSnapshot`], runs the target and,
//! if it comes back, stores the resulting registers into the same
//! snapshot before resuming the caller.
//!
//! ```text
//!   caller (32-bit flat)           target
//!   ────────────────────           ──────
//!   invoke(entry, &mut regs) ──►  mode switch ──► load regs ──► entry
//!                                                                 │
//!   regs = results          ◄──  mode switch ◄── store regs ◄────┘
//! ```
//!
//! One [`ExecutionBridge`] implementation per destination mode; callers
//! only ever see `invoke`.
//!
//! - [`FlatBridge`] - same mode, `extern "C"` routine
//! - `RealModeBridge` - 16-bit real mode through the trampoline
//!   (`bios-thunk` feature, 32-bit x86)

pub mod farptr;
pub mod flat;
pub mod real;
pub mod regs;

pub use farptr::{is_reachable, FarPtr, REAL_MODE_LIMIT};
pub use flat::{FlatBridge, FlatEntry};
pub use real::RealModeTarget;
#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
pub use real::{RealModeBridge, TrampolineConfig};
pub use regs::{Eflags, RegisterSnapshot, SNAPSHOT_SIZE};

/// A procedure call into another execution mode.
///
/// Not reentrant: `invoke` takes `&mut self`, and the processor is in the
/// target's mode until it returns. There is no timeout; a target that
/// never returns never resolves the call.
pub trait ExecutionBridge {
    /// How the destination mode names a callable.
    type Entry: Copy;

    /// Run `entry` with `regs` loaded; on return `regs` holds the
    /// target's final register values.
    ///
    /// # Safety
    /// `entry` must be a routine reachable from the destination mode,
    /// and `regs` must set every register its calling convention reads,
    /// segment registers included.
    unsafe fn invoke(&mut self, entry: Self::Entry, regs: &mut RegisterSnapshot);

    /// Copy-in / copy-out form of [`invoke`](Self::invoke).
    ///
    /// # Safety
    /// Same as `invoke`.
    unsafe fn call(&mut self, entry: Self::Entry, input: &RegisterSnapshot) -> RegisterSnapshot {
        let mut regs = *input;
        self.invoke(entry, &mut regs);
        regs
    }
}

impl<B: ExecutionBridge + ?Sized> ExecutionBridge for &mut B {
    type Entry = B::Entry;

    unsafe fn invoke(&mut self, entry: Self::Entry, regs: &mut RegisterSnapshot) {
        (**self).invoke(entry, regs)
    }
}
