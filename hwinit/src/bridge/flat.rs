//! Same-mode bridge.
//!
//! Flat 32-bit firmware services (and anything else already running in
//! our mode) take the register file by pointer instead of in registers.
//! No mode switch, no copy: the target edits the caller's snapshot
//! directly.

use super::{ExecutionBridge, RegisterSnapshot};

/// A flat-mode routine taking the snapshot by pointer.
pub type FlatEntry = unsafe extern "C" fn(regs: *mut RegisterSnapshot);

/// Bridge into routines that run in the current mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBridge;

impl FlatBridge {
    pub const fn new() -> Self {
        Self
    }
}

impl ExecutionBridge for FlatBridge {
    type Entry = FlatEntry;

    unsafe fn invoke(&mut self, entry: FlatEntry, regs: &mut RegisterSnapshot) {
        crate::dprintln2!("flat call {:p}", entry as *const ());
        entry(regs as *mut RegisterSnapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn ret_only(_regs: *mut RegisterSnapshot) {}

    unsafe extern "C" fn get_version(regs: *mut RegisterSnapshot) {
        let regs = &mut *regs;
        regs.set_ax(0x0102);
        regs.eflags &= !1;
    }

    #[test]
    fn test_round_trip_unchanged() {
        let mut input = RegisterSnapshot::zeroed();
        input.eax = 0x1234_5678;
        input.ds = 0x40;
        input.eflags = 0x0203;

        let output = unsafe { FlatBridge.call(ret_only, &input) };
        assert_eq!(output, input);
    }

    #[test]
    fn test_results_marshalled() {
        let mut regs = RegisterSnapshot::zeroed();
        regs.eax = 0xFFFF_0000;
        regs.eflags = 1;

        unsafe { FlatBridge::new().invoke(get_version, &mut regs) };

        assert_eq!(regs.eax, 0xFFFF_0102);
        assert!(!regs.carry());
    }
}
