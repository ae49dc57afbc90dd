//! Protected mode → real mode bridge.
//!
//! The mode switch lives in `asm/bridge/call16.s`. Its 16-bit half has to
//! execute below 64 KiB, so [`RealModeBridge::install`] copies it into a
//! caller-provided low-memory area and fills in the selectors it needs.
//!
//! ```text
//! base ─► ┌──────────────────┐
//!         │ control block    │  selectors, saved PM state, snapshot copy
//!         │ real-mode IDTR   │
//!         │ 16-bit code      │
//!         │ stack (1 KiB)    │
//!         └──────────────────┘ base + blob_size() < 0x10000
//! ```

use super::farptr::FarPtr;
use crate::error::InitError;

/// Far call, target returns with `retf`.
pub const KIND_FAR: u32 = 0;
/// Software interrupt, target returns with `iret`.
pub const KIND_INT: u32 = 1;

/// Where a real-mode call goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealModeTarget {
    /// `call far seg:off`
    Far(FarPtr),
    /// `int n`, through the interrupt vector table
    Interrupt(u8),
}

impl RealModeTarget {
    /// `(target, kind)` as the trampoline takes them.
    pub const fn encode(self) -> (u32, u32) {
        match self {
            Self::Far(ptr) => (ptr.to_u32(), KIND_FAR),
            Self::Interrupt(vector) => (vector as u32, KIND_INT),
        }
    }
}

impl From<FarPtr> for RealModeTarget {
    fn from(ptr: FarPtr) -> Self {
        Self::Far(ptr)
    }
}

/// IVT and BIOS data area.
const LOW_RESERVED: u32 = 0x500;
/// Real-mode stack and code share one 64 KiB segment with base 0.
const SEGMENT_END: u32 = 0x1_0000;

/// EFLAGS bit 1, always set by `pushfd`.
const EFLAGS_FIXED: u32 = 1 << 1;

/// Check that `size` bytes at `base` fit the trampoline's constraints.
fn check_placement(base: u32, size: usize) -> Result<(), InitError> {
    if base & 0xF != 0 {
        return Err(InitError::TrampolineMisaligned);
    }
    let end = (base as usize).checked_add(size);
    if base < LOW_RESERVED || end.map_or(true, |end| end > SEGMENT_END as usize) {
        return Err(InitError::TrampolineOutOfRange);
    }
    Ok(())
}

/// Flags stored after a real-mode call, with bit 1 as the caller passed it.
fn settle_flags(before: u32, after: u32) -> u32 {
    (after & !EFLAGS_FIXED) | (before & EFLAGS_FIXED)
}

#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
pub use hw::{RealModeBridge, TrampolineConfig};

#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
mod hw {
    use core::ptr::{addr_of, copy_nonoverlapping, write_unaligned};

    use super::{check_placement, settle_flags, RealModeTarget};
    use crate::bridge::{ExecutionBridge, RegisterSnapshot};
    use crate::error::InitError;

    extern "C" {
        static bridge_rm_start: u8;
        static bridge_rm_end: u8;

        fn bridge_call16(base: u32, regs: *mut RegisterSnapshot, target: u32, kind: u32);
    }

    // Control block fields written at install time
    const CTL_CODE16: usize = 0;
    const CTL_DATA16: usize = 2;
    const CTL_RM_SEG: usize = 6;

    /// Placement of the trampoline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TrampolineConfig {
        /// Linear address to copy the 16-bit blob to.
        pub base: u32,
        /// GDT selector: 16-bit code, base 0, limit 0xFFFF.
        pub code16_selector: u16,
        /// GDT selector: 16-bit data, base 0, limit 0xFFFF.
        pub data16_selector: u16,
    }

    /// Bridge into 16-bit real mode.
    #[derive(Debug)]
    pub struct RealModeBridge {
        base: u32,
    }

    impl RealModeBridge {
        /// Bytes the trampoline occupies at its base.
        pub fn blob_size() -> usize {
            unsafe { addr_of!(bridge_rm_end) as usize - addr_of!(bridge_rm_start) as usize }
        }

        /// Copy the trampoline to `config.base` and prime its control block.
        ///
        /// # Safety
        /// The target area must be unused RAM, identity mapped (paging
        /// off), and stay reserved for as long as the bridge is used.
        pub unsafe fn install(config: &TrampolineConfig) -> Result<Self, InitError> {
            let size = Self::blob_size();
            check_placement(config.base, size)?;

            let dst = config.base as usize as *mut u8;
            copy_nonoverlapping(addr_of!(bridge_rm_start), dst, size);

            write_unaligned(dst.add(CTL_CODE16) as *mut u16, config.code16_selector);
            write_unaligned(dst.add(CTL_DATA16) as *mut u16, config.data16_selector);
            write_unaligned(dst.add(CTL_RM_SEG) as *mut u16, (config.base >> 4) as u16);

            crate::dprintln!(
                "real-mode trampoline at {:#x}, {} bytes",
                config.base,
                size
            );

            Ok(Self { base: config.base })
        }

        pub fn base(&self) -> u32 {
            self.base
        }
    }

    impl ExecutionBridge for RealModeBridge {
        type Entry = RealModeTarget;

        unsafe fn invoke(&mut self, entry: RealModeTarget, regs: &mut RegisterSnapshot) {
            crate::dprintln2!("call16 {:?}", entry);
            let (target, kind) = entry.encode();
            let before = regs.eflags;
            bridge_call16(self.base, regs as *mut RegisterSnapshot, target, kind);
            regs.eflags = settle_flags(before, regs.eflags);
        }
    }
}
