//! The fatal path.
//!
//! ```text
//!            trigger()                 target returned
//! Running ───────────────► Transferring ───────────────► HaltLoop ─┐
//!                                                           ▲      │ hlt
//!                                                           └──────┘
//! ```
//!
//! `trigger()` hands the machine to the panic entry point through the
//! bridge with an all-zero snapshot. That entry point is not supposed to
//! come back; if it does there is no safe channel left, so the CPU halts
//! forever without another word.
//!
//! The machine is explicit so a harness can stop at HaltLoop and look at
//! it: [`PanicHandler::transfer`] runs everything up to the halt loop and
//! [`PanicHandler::halt_once`] executes one iteration of it.

use crate::bridge::{ExecutionBridge, RegisterSnapshot};
use crate::cpu::Cpu;
use crate::diag::DiagnosticSink;

/// Where the fatal path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicState {
    /// Nothing has gone wrong yet.
    Running,
    /// Control is with the panic entry point.
    Transferring,
    /// The panic entry point returned. Terminal.
    HaltLoop,
}

/// Escalation to the panic entry point, then the halt loop.
pub struct PanicHandler<B: ExecutionBridge, C: Cpu> {
    bridge: B,
    cpu: C,
    entry: B::Entry,
    state: PanicState,
}

impl<B: ExecutionBridge, C: Cpu> PanicHandler<B, C> {
    pub fn new(bridge: B, cpu: C, entry: B::Entry) -> Self {
        Self {
            bridge,
            cpu,
            entry,
            state: PanicState::Running,
        }
    }

    pub fn state(&self) -> PanicState {
        self.state
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Hand control to the panic entry point.
    ///
    /// Only returns if the entry point did, and then always in
    /// `HaltLoop`. A second call while `Transferring` means we faulted
    /// inside the panic target itself; that goes straight to `HaltLoop`.
    pub fn transfer(&mut self) -> PanicState {
        match self.state {
            PanicState::Running => {
                self.state = PanicState::Transferring;
                let mut regs = RegisterSnapshot::zeroed();
                unsafe { self.bridge.invoke(self.entry, &mut regs) };
                self.state = PanicState::HaltLoop;
            }
            PanicState::Transferring => self.state = PanicState::HaltLoop,
            PanicState::HaltLoop => {}
        }
        self.state
    }

    /// One iteration of the halt loop.
    pub fn halt_once(&self) {
        debug_assert_eq!(self.state, PanicState::HaltLoop);
        self.cpu.halt();
    }

    /// Never comes back.
    pub fn trigger(&mut self) -> ! {
        self.transfer();
        loop {
            self.halt_once();
        }
    }

    /// Report a pointer that failed validation, then transfer.
    ///
    /// Exactly one line goes to `sink`, and nothing else is touched
    /// before the transfer.
    pub fn report_bad_pointer<S>(&mut self, sink: &mut S, ptr: usize) -> PanicState
    where
        S: DiagnosticSink + ?Sized,
    {
        report_invalid_pointer(sink, ptr);
        self.transfer()
    }

    /// [`report_bad_pointer`](Self::report_bad_pointer), then the halt loop.
    pub fn bad_pointer<S>(&mut self, sink: &mut S, ptr: usize) -> !
    where
        S: DiagnosticSink + ?Sized,
    {
        self.report_bad_pointer(sink, ptr);
        loop {
            self.halt_once();
        }
    }
}

/// The one diagnostic line of the invalid-pointer path.
pub fn report_invalid_pointer<S: DiagnosticSink + ?Sized>(sink: &mut S, ptr: usize) {
    sink.emit(format_args!(
        "far pointer conversion passed an invalid pointer: {:#X}",
        ptr
    ));
}
