//! Pre-OS Hardware Bridge
//!
//! The layer directly above the metal for a BIOS-era boot environment
//! running in 32-bit flat protected mode. Two primitives and the fatal
//! path built on them:
//!
//! ```text
//!   ┌──────────────┐        ┌───────────────────┐
//!   │ PanicHandler │ ─────► │  ExecutionBridge  │ ──► real mode / flat
//!   └──────────────┘        └───────────────────┘
//!
//!   ┌──────────────┐
//!   │ ConfigWindow │ ──► 0xCF8 / 0xCFC
//!   └──────────────┘
//! ```
//!
//! # Bridged Calls
//!
//! ```ignore
//! use lowboot_hwinit::{intcall, RegisterSnapshot};
//!
//! // INT 13h AH=08h: drive parameters
//! let mut regs = RegisterSnapshot::zeroed();
//! regs.set_ah(0x08);
//! regs.set_dl(0x80);
//! unsafe { intcall(0x13, &mut regs) };
//! if !regs.carry() {
//!     let heads = regs.dh() as u32 + 1;
//! }
//! ```
//!
//! # Config Space
//!
//! ```ignore
//! use lowboot_hwinit::{pci_cfg_read16, pci_cfg_write16, PciAddr};
//!
//! let cmd = PciAddr::new(0, 3, 0, 0x04);
//! pci_cfg_write16(pci_cfg_read16(cmd) | 0x4, cmd); // bus master
//! ```
//!
//! # What This Crate Does
//!
//! - Protected → real mode calls with a full register snapshot
//! - Flat-mode calls with the same register-file convention
//! - Interrupt-safe PCI config window access (save/select/transfer/restore)
//! - Panic transfer and halt loop
//! - Serial diagnostics and the `log` backend
//!
//! # What This Crate Does NOT Do
//!
//! - PCI enumeration or device policy
//! - Drivers
//! - Console / terminal rendering

#![no_std]
#![allow(dead_code)]

pub mod bridge;
pub mod cpu;
pub mod diag;
pub mod error;
pub mod panic;
pub mod pci;
pub mod platform;
pub mod serial;
pub mod sync;

#[doc(hidden)]
pub use log as __log;

// ═══════════════════════════════════════════════════════════════════════════
// CPU RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use cpu::pio::PortIo;
pub use cpu::{halt_forever, Cpu};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use cpu::pio::HwPorts;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use cpu::{disable_interrupts, enable_interrupts, interrupts_enabled, X86Cpu};

// ═══════════════════════════════════════════════════════════════════════════
// SYNC RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use sync::{without_interrupts, InterruptGuard};

// ═══════════════════════════════════════════════════════════════════════════
// BRIDGE RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use bridge::{
    Eflags, ExecutionBridge, FarPtr, FlatBridge, FlatEntry, RealModeTarget, RegisterSnapshot,
};
#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
pub use bridge::{RealModeBridge, TrampolineConfig};

// ═══════════════════════════════════════════════════════════════════════════
// PANIC RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use panic::{PanicHandler, PanicState};

// ═══════════════════════════════════════════════════════════════════════════
// PCI RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use pci::{ConfigWindow, PciAddr, CONFIG_ADDRESS, CONFIG_DATA};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use pci::{
    pci_cfg_read8, pci_cfg_read16, pci_cfg_read32,
    pci_cfg_write8, pci_cfg_write16, pci_cfg_write32,
    PCI_CONFIG,
};

// ═══════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS / ERRORS
// ═══════════════════════════════════════════════════════════════════════════

pub use diag::{DiagnosticSink, SerialLogger};
pub use error::{InitError, PciAddrError, SegmentError};
pub use serial::{SerialPort, COM1};

// ═══════════════════════════════════════════════════════════════════════════
// PLATFORM RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use platform::init_logger;
#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
pub use platform::{call16, far_ptr, init_bridge, intcall, kaboom, BridgeConfig};
