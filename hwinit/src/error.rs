//! Error types
//!
//! The bridge primitives themselves never fail: a bad call is fatal and
//! goes through the panic path. These cover setup and value validation.

use core::fmt;

/// Bridge / logger initialization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// Init already ran; the configuration is fixed for the boot.
    AlreadyInitialized,

    /// Trampoline base is not paragraph (16 byte) aligned
    TrampolineMisaligned,

    /// Trampoline does not fit below 64 KiB
    TrampolineOutOfRange,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "already initialized"),
            Self::TrampolineMisaligned => write!(f, "trampoline base not 16-byte aligned"),
            Self::TrampolineOutOfRange => write!(f, "trampoline does not fit below 64 KiB"),
        }
    }
}

/// Invalid bus/device/function triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciAddrError {
    /// Device number above 31
    DeviceOutOfRange(u8),

    /// Function number above 7
    FunctionOutOfRange(u8),
}

impl fmt::Display for PciAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOutOfRange(d) => write!(f, "PCI device {} out of range (max 31)", d),
            Self::FunctionOutOfRange(fun) => {
                write!(f, "PCI function {} out of range (max 7)", fun)
            }
        }
    }
}

/// Linear address not reachable through a real-mode segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError {
    /// At or above 1 MiB
    OutOfRange(usize),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(addr) => {
                write!(f, "address {:#X} not reachable from real mode", addr)
            }
        }
    }
}
