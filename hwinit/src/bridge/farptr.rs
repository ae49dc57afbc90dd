//! Real-mode `segment:offset` pointers.

use core::fmt;

use crate::error::SegmentError;

/// First linear address a real-mode segment cannot normalize to.
pub const REAL_MODE_LIMIT: usize = 0x10_0000;

/// A real-mode far pointer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FarPtr {
    pub segment: u16,
    pub offset: u16,
}

impl FarPtr {
    pub const fn new(segment: u16, offset: u16) -> Self {
        Self { segment, offset }
    }

    /// Normalized pointer (`offset < 16`) for a linear address below 1 MiB.
    pub const fn from_linear(addr: usize) -> Result<Self, SegmentError> {
        if !is_reachable(addr) {
            return Err(SegmentError::OutOfRange(addr));
        }
        Ok(Self::from_linear_truncating(addr))
    }

    /// What the hardware would see: segment bits above 1 MiB are lost.
    pub const fn from_linear_truncating(addr: usize) -> Self {
        Self {
            segment: (addr >> 4) as u16,
            offset: (addr & 0xF) as u16,
        }
    }

    /// Linear address this pointer resolves to (no A20 wrap).
    pub const fn linear(self) -> usize {
        ((self.segment as usize) << 4) + self.offset as usize
    }

    /// `seg << 16 | off`, the interrupt vector table layout.
    pub const fn to_u32(self) -> u32 {
        (self.segment as u32) << 16 | self.offset as u32
    }

    pub const fn from_u32(raw: u32) -> Self {
        Self {
            segment: (raw >> 16) as u16,
            offset: raw as u16,
        }
    }
}

impl fmt::Debug for FarPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.segment, self.offset)
    }
}

/// Whether a linear address can be expressed as a normalized far pointer.
pub const fn is_reachable(addr: usize) -> bool {
    addr < REAL_MODE_LIMIT
}
