//! Register file carried across a mode transition.

use bitflags::bitflags;

bitflags! {
    /// EFLAGS bits a firmware call can report through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Eflags: u32 {
        const CARRY     = 1 << 0;
        const PARITY    = 1 << 2;
        const AUXILIARY = 1 << 4;
        const ZERO      = 1 << 6;
        const SIGN      = 1 << 7;
        const TRAP      = 1 << 8;
        const INTERRUPT = 1 << 9;
        const DIRECTION = 1 << 10;
        const OVERFLOW  = 1 << 11;
    }
}

/// Registers loaded before and stored after a bridged call.
///
/// The layout is shared with the trampoline (`asm/bridge/call16.s`),
/// which addresses fields by offset. `esp` is only a placeholder: the
/// target always runs on the trampoline's stack.
///
/// ```text
/// 0x00 gs  0x02 fs  0x04 es  0x06 ds
/// 0x08 edi 0x0C esi 0x10 ebp 0x14 esp
/// 0x18 ebx 0x1C edx 0x20 ecx 0x24 eax
/// 0x28 eflags
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterSnapshot {
    pub gs: u16,
    pub fs: u16,
    pub es: u16,
    pub ds: u16,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub eflags: u32,
}

/// Size the trampoline copies in and out.
pub const SNAPSHOT_SIZE: usize = 44;

const _: () = assert!(core::mem::size_of::<RegisterSnapshot>() == SNAPSHOT_SIZE);

macro_rules! word_views {
    ($($reg:ident, $get:ident, $set:ident;)*) => {
        $(
            #[inline]
            pub const fn $get(&self) -> u16 {
                self.$reg as u16
            }

            #[inline]
            pub fn $set(&mut self, value: u16) {
                self.$reg = (self.$reg & 0xFFFF_0000) | value as u32;
            }
        )*
    };
}

macro_rules! byte_views {
    ($($reg:ident, $lo:ident, $set_lo:ident, $hi:ident, $set_hi:ident;)*) => {
        $(
            #[inline]
            pub const fn $lo(&self) -> u8 {
                self.$reg as u8
            }

            #[inline]
            pub fn $set_lo(&mut self, value: u8) {
                self.$reg = (self.$reg & !0xFF) | value as u32;
            }

            #[inline]
            pub const fn $hi(&self) -> u8 {
                (self.$reg >> 8) as u8
            }

            #[inline]
            pub fn $set_hi(&mut self, value: u8) {
                self.$reg = (self.$reg & !0xFF00) | (value as u32) << 8;
            }
        )*
    };
}

impl RegisterSnapshot {
    /// All registers zero, all flags clear (interrupts off in the target).
    pub const fn zeroed() -> Self {
        Self {
            gs: 0,
            fs: 0,
            es: 0,
            ds: 0,
            edi: 0,
            esi: 0,
            ebp: 0,
            esp: 0,
            ebx: 0,
            edx: 0,
            ecx: 0,
            eax: 0,
            eflags: 0,
        }
    }

    word_views! {
        eax, ax, set_ax;
        ebx, bx, set_bx;
        ecx, cx, set_cx;
        edx, dx, set_dx;
        esi, si, set_si;
        edi, di, set_di;
        ebp, bp, set_bp;
    }

    byte_views! {
        eax, al, set_al, ah, set_ah;
        ebx, bl, set_bl, bh, set_bh;
        ecx, cl, set_cl, ch, set_ch;
        edx, dl, set_dl, dh, set_dh;
    }

    /// Typed flags. Undefined bits are kept.
    pub const fn flags(&self) -> Eflags {
        Eflags::from_bits_retain(self.eflags)
    }

    pub fn set_flags(&mut self, flags: Eflags) {
        self.eflags = flags.bits();
    }

    /// CF, the usual firmware error indicator.
    pub const fn carry(&self) -> bool {
        self.eflags & Eflags::CARRY.bits() != 0
    }
}
