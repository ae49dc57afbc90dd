//! PCI configuration addresses.
//!
//! The value written to `CONFIG_ADDRESS`:
//!
//! ```text
//!  31   30..24   23..16   15..11   10..8   7..2       1..0
//! [EN] [resv ]  [ bus  ] [ dev  ] [ fn ]  [ dword ]  [lane]
//! ```

use core::fmt;

use crate::error::PciAddrError;

/// Config space enable bit.
pub const ENABLE: u32 = 0x8000_0000;

/// A configuration register of one PCI function.
///
/// The low two bits pick the byte lane inside the selected dword; the
/// window strips them before selecting and uses them to offset the data
/// port.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PciAddr(u32);

impl PciAddr {
    /// Build an address, masking device to 5 bits and function to 3.
    pub const fn new(bus: u8, device: u8, function: u8, register: u8) -> Self {
        Self(
            ENABLE
                | (bus as u32) << 16
                | ((device as u32) & 0x1F) << 11
                | ((function as u32) & 0x07) << 8
                | register as u32,
        )
    }

    /// Build an address, rejecting out-of-range device/function numbers.
    pub const fn try_new(
        bus: u8,
        device: u8,
        function: u8,
        register: u8,
    ) -> Result<Self, PciAddrError> {
        if device > 31 {
            return Err(PciAddrError::DeviceOutOfRange(device));
        }
        if function > 7 {
            return Err(PciAddrError::FunctionOutOfRange(function));
        }
        Ok(Self::new(bus, device, function, register))
    }

    /// Take a raw `CONFIG_ADDRESS` value as-is.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn bus(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn device(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    pub const fn function(self) -> u8 {
        ((self.0 >> 8) & 0x07) as u8
    }

    pub const fn register(self) -> u8 {
        self.0 as u8
    }

    /// Value for the address-select port: low two bits cleared.
    pub const fn dword_select(self) -> u32 {
        self.0 & !0x3
    }

    /// Byte lane within the selected dword.
    pub const fn lane(self) -> u16 {
        (self.0 & 0x3) as u16
    }

    /// Same function, different register.
    pub const fn with_register(self, register: u8) -> Self {
        Self((self.0 & !0xFF) | register as u32)
    }
}

impl fmt::Debug for PciAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}.{}+{:02x}",
            self.bus(),
            self.device(),
            self.function(),
            self.register()
        )
    }
}

impl From<u32> for PciAddr {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}
