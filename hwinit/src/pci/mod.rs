//! PCI configuration access.
//!
//! Only the legacy `0xCF8`/`0xCFC` window. Enumeration and BAR decoding
//! belong to whoever consumes this.
//!
//! # Reference
//! - PCI Local Bus Spec 3.0 §3.2.2.3.2

pub mod addr;
pub mod window;

pub use addr::PciAddr;
pub use window::{ConfigWindow, CONFIG_ADDRESS, CONFIG_DATA};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use window::{
    pci_cfg_read8, pci_cfg_read16, pci_cfg_read32,
    pci_cfg_write8, pci_cfg_write16, pci_cfg_write32,
    PCI_CONFIG,
};
