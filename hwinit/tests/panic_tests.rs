//! Panic path tests.

mod common;

use std::cell::Cell;

use common::{Event, RecordingSink, SimBridge, SimCpu, Trace};
use lowboot_hwinit::{Cpu, PanicHandler, PanicState, RegisterSnapshot};

const PANIC_ENTRY: u32 = 0x18;

fn handler(trace: &Trace) -> PanicHandler<SimBridge, SimCpu> {
    PanicHandler::new(SimBridge::new(trace), SimCpu::new(trace, true), PANIC_ENTRY)
}

#[test]
fn test_starts_running_without_side_effects() {
    let trace = Trace::new();
    let handler = handler(&trace);

    assert_eq!(handler.state(), PanicState::Running);
    assert!(trace.events().is_empty());
}

#[test]
fn test_transfer_uses_zeroed_snapshot() {
    let trace = Trace::new();
    let mut handler = handler(&trace);

    assert_eq!(handler.transfer(), PanicState::HaltLoop);
    assert_eq!(
        trace.events(),
        vec![Event::Invoke { entry: PANIC_ENTRY, regs: RegisterSnapshot::zeroed() }]
    );
}

#[test]
fn test_bad_pointer_reports_then_transfers() {
    let trace = Trace::new();
    let mut handler = handler(&trace);
    let mut sink = RecordingSink::new(&trace);

    let state = handler.report_bad_pointer(&mut sink, 0xDEAD_BEEF);

    assert_eq!(state, PanicState::HaltLoop);
    assert_eq!(
        trace.events(),
        vec![
            Event::Line("far pointer conversion passed an invalid pointer: 0xDEADBEEF".into()),
            Event::Invoke { entry: PANIC_ENTRY, regs: RegisterSnapshot::zeroed() },
        ]
    );
}

#[test]
fn test_halt_loop_is_terminal() {
    let trace = Trace::new();
    let mut handler = handler(&trace);
    handler.transfer();
    trace.clear();

    for _ in 0..3 {
        assert_eq!(handler.transfer(), PanicState::HaltLoop);
        handler.halt_once();
    }

    assert_eq!(handler.bridge().calls, 1);
    assert_eq!(handler.cpu().halts(), 3);
    assert_eq!(trace.events(), vec![Event::Halt, Event::Halt, Event::Halt]);
}

#[test]
fn test_garbage_returned_by_target_is_ignored() {
    let trace = Trace::new();
    let mut bridge = SimBridge::new(&trace);
    let mut garbage = RegisterSnapshot::zeroed();
    garbage.eax = 0xFFFF_FFFF;
    garbage.eflags = 0x0001;
    bridge.reply = Some(garbage);

    let mut handler = PanicHandler::new(bridge, SimCpu::new(&trace, true), PANIC_ENTRY);

    assert_eq!(handler.transfer(), PanicState::HaltLoop);
}

/// `hlt` that gives up after a few iterations so the loop can be observed.
struct Wakeups {
    left: Cell<u32>,
}

impl Cpu for Wakeups {
    fn interrupts_enabled(&self) -> bool {
        false
    }
    fn disable_interrupts(&self) {}
    fn enable_interrupts(&self) {}
    fn halt(&self) {
        let left = self.left.get();
        if left == 0 {
            panic!("still halted");
        }
        self.left.set(left - 1);
    }
}

#[test]
#[should_panic(expected = "still halted")]
fn test_trigger_never_returns() {
    let trace = Trace::new();
    let mut handler = PanicHandler::new(
        SimBridge::new(&trace),
        Wakeups { left: Cell::new(5) },
        PANIC_ENTRY,
    );
    handler.trigger();
}

#[test]
#[should_panic(expected = "still halted")]
fn test_bad_pointer_never_returns() {
    let trace = Trace::new();
    let mut sink = RecordingSink::new(&trace);
    let mut handler = PanicHandler::new(
        SimBridge::new(&trace),
        Wakeups { left: Cell::new(2) },
        PANIC_ENTRY,
    );
    handler.bad_pointer(&mut sink, 0x0012_3456);
}
