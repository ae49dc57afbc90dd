//! Process-wide state and the global entry points.
//!
//! # What This Does
//!
//! ```text
//! init_logger()          COM1 programmed, `log` routed to it
//!        │
//!        ▼
//! init_bridge(config)    trampoline copied below 64K,
//!        │               panic entry point fixed for the boot
//!        ▼
//! call16 / intcall       real-mode calls through the one bridge
//! far_ptr                pointer → seg:off, checked in debug builds
//! kaboom                 panic transfer, then halt
//! ```
//!
//! # Usage
//!
//! ```ignore
//! init_logger()?;
//! unsafe {
//!     init_bridge(BridgeConfig {
//!         trampoline: TrampolineConfig {
//!             base: 0x7000,
//!             code16_selector: 0x18,
//!             data16_selector: 0x20,
//!         },
//!         panic_entry: RealModeTarget::Interrupt(0x18),
//!     })?;
//! }
//!
//! let mut regs = RegisterSnapshot::zeroed();
//! regs.set_ah(0x08);
//! regs.set_dl(0x80);
//! unsafe { intcall(0x13, &mut regs) };
//! ```

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use logger::init_logger;

#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
pub use realmode::{call16, far_ptr, init_bridge, intcall, kaboom, BridgeConfig};

// ═══════════════════════════════════════════════════════════════════════════
// LOGGER
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod logger {
    use crate::cpu::pio::HwPorts;
    use crate::diag::{SerialLogger, MAX_LEVEL};
    use crate::error::InitError;
    use crate::serial::{SerialPort, COM1};

    static LOGGER: SerialLogger<HwPorts> = SerialLogger::new(SerialPort::new(HwPorts, COM1));

    /// Route `log` (and the `dprintln!` macros) to COM1. Once per boot.
    pub fn init_logger() -> Result<(), InitError> {
        log::set_logger(&LOGGER).map_err(|_| InitError::AlreadyInitialized)?;
        LOGGER.init_port();
        log::set_max_level(MAX_LEVEL);
        log::info!("serial logger up, max level {}", MAX_LEVEL);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BRIDGE
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(all(target_arch = "x86", feature = "bios-thunk"))]
mod realmode {
    use spin::{Mutex, Once};

    use crate::bridge::{
        ExecutionBridge, FarPtr, RealModeBridge, RealModeTarget, RegisterSnapshot,
        TrampolineConfig,
    };
    use crate::cpu::pio::HwPorts;
    use crate::cpu::{halt_forever, X86Cpu};
    use crate::error::InitError;
    use crate::panic::{report_invalid_pointer, PanicHandler};
    use crate::serial::{SerialPort, COM1};

    static BRIDGE: Once<Mutex<RealModeBridge>> = Once::new();
    static PANIC_ENTRY: Once<RealModeTarget> = Once::new();

    /// Boot-time bridge configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BridgeConfig {
        pub trampoline: TrampolineConfig,
        /// Where [`kaboom`] sends the machine. Must not return.
        pub panic_entry: RealModeTarget,
    }

    /// Install the trampoline and fix the panic entry point.
    ///
    /// # Safety
    /// See [`RealModeBridge::install`]. Call once, before anything uses
    /// [`call16`], [`intcall`] or [`kaboom`].
    pub unsafe fn init_bridge(config: BridgeConfig) -> Result<(), InitError> {
        if BRIDGE.is_completed() {
            return Err(InitError::AlreadyInitialized);
        }

        let bridge = RealModeBridge::install(&config.trampoline)?;
        BRIDGE.call_once(|| Mutex::new(bridge));
        PANIC_ENTRY.call_once(|| config.panic_entry);

        log::info!(
            "bridge ready: trampoline {:#x}, panic entry {:?}",
            config.trampoline.base,
            config.panic_entry
        );
        Ok(())
    }

    /// Far call into real mode.
    ///
    /// # Safety
    /// `target` must be a real-mode routine ending in `retf`, and `regs`
    /// must satisfy its calling convention.
    pub unsafe fn call16(target: FarPtr, regs: &mut RegisterSnapshot) {
        invoke(RealModeTarget::Far(target), regs)
    }

    /// Software interrupt in real mode.
    ///
    /// # Safety
    /// The vector must be hooked, and `regs` must satisfy its convention.
    pub unsafe fn intcall(vector: u8, regs: &mut RegisterSnapshot) {
        invoke(RealModeTarget::Interrupt(vector), regs)
    }

    unsafe fn invoke(entry: RealModeTarget, regs: &mut RegisterSnapshot) {
        let Some(bridge) = BRIDGE.get() else {
            log::error!("real-mode call to {:?} before init_bridge", entry);
            kaboom()
        };
        bridge.lock().invoke(entry, regs);
    }

    /// Pointer → normalized `seg:off`.
    ///
    /// Debug builds treat a pointer at or above 1 MiB as a bug: one
    /// diagnostic line, then [`kaboom`]. Release builds truncate the
    /// segment the way the hardware would.
    pub fn far_ptr<T>(p: *const T) -> FarPtr {
        let addr = p as usize;
        match FarPtr::from_linear(addr) {
            Ok(ptr) => ptr,
            Err(_) if cfg!(any(debug_assertions, feature = "debug")) => escalate(Some(addr)),
            Err(_) => FarPtr::from_linear_truncating(addr),
        }
    }

    /// Transfer to the panic entry point; halt if it comes back.
    pub fn kaboom() -> ! {
        escalate(None)
    }

    /// The fatal path.
    ///
    /// Diagnostics go to a UART accessor built on the spot: no lock, no
    /// allocation, only the COM1 LSR/THR ports. The logger's lock may be
    /// held by whatever we interrupted.
    fn escalate(bad_ptr: Option<usize>) -> ! {
        let cpu = X86Cpu;
        let mut sink = SerialPort::new(HwPorts, COM1);

        let armed = match (BRIDGE.get(), PANIC_ENTRY.get()) {
            (Some(bridge), Some(&entry)) => bridge.try_lock().map(|guard| (guard, entry)),
            _ => None,
        };

        match armed {
            Some((mut guard, entry)) => {
                let mut handler = PanicHandler::new(&mut *guard, cpu, entry);
                match bad_ptr {
                    Some(ptr) => handler.bad_pointer(&mut sink, ptr),
                    None => handler.trigger(),
                }
            }
            // Not initialized, or we died inside a bridged call.
            None => {
                if let Some(ptr) = bad_ptr {
                    report_invalid_pointer(&mut sink, ptr);
                }
                halt_forever(&cpu)
            }
        }
    }
}
