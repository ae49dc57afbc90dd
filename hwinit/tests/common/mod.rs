//! Common test utilities: a simulated port file, processor, bridge and
//! diagnostic sink, all writing to one shared trace so tests can assert
//! on the exact order of hardware effects.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use lowboot_hwinit::{
    Cpu, ExecutionBridge, PortIo, RegisterSnapshot, CONFIG_ADDRESS, CONFIG_DATA,
};

/// One observable hardware effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    In { port: u16, width: u8, value: u32 },
    Out { port: u16, width: u8, value: u32 },
    Cli,
    Sti,
    Halt,
    Invoke { entry: u32, regs: RegisterSnapshot },
    Line(String),
}

/// Shared, ordered trace of events.
#[derive(Debug, Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Event>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Writes to `port`, in order.
    pub fn writes_to(&self, port: u16) -> Vec<u32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                Event::Out { port: p, value, .. } if p == port => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PORT FILE
// ═══════════════════════════════════════════════════════════════════════════

/// I/O space with a PCI mechanism #1 host bridge behind 0xCF8/0xCFC.
///
/// `CONFIG_ADDRESS` is a latch. The data port reads and writes the dword
/// the latch selects, shifted to the byte lane of the port used.
pub struct SimPorts {
    trace: Trace,
    pub address: u32,
    pub config: HashMap<u32, u32>,
    /// Value returned by `inb` for ports without a model.
    pub default_byte: u8,
}

impl SimPorts {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            address: 0,
            config: HashMap::new(),
            default_byte: 0xFF,
        }
    }

    pub fn with_address(mut self, address: u32) -> Self {
        self.address = address;
        self
    }

    pub fn with_dword(mut self, select: u32, value: u32) -> Self {
        self.config.insert(select, value);
        self
    }

    pub fn dword(&self, select: u32) -> u32 {
        self.config.get(&select).copied().unwrap_or(0xFFFF_FFFF)
    }

    fn lane_of(port: u16) -> Option<u32> {
        (CONFIG_DATA..CONFIG_DATA + 4)
            .contains(&port)
            .then(|| (port - CONFIG_DATA) as u32)
    }

    fn read(&mut self, port: u16, width: u8) -> u32 {
        let value = if port == CONFIG_ADDRESS && width == 32 {
            self.address
        } else if let Some(lane) = Self::lane_of(port) {
            let shifted = self.dword(self.address) >> (lane * 8);
            match width {
                8 => shifted & 0xFF,
                16 => shifted & 0xFFFF,
                _ => shifted,
            }
        } else if width == 8 {
            self.default_byte as u32
        } else {
            0
        };
        self.trace.push(Event::In { port, width, value });
        value
    }

    fn write(&mut self, port: u16, width: u8, value: u32) {
        self.trace.push(Event::Out { port, width, value });
        if port == CONFIG_ADDRESS && width == 32 {
            self.address = value;
        } else if let Some(lane) = Self::lane_of(port) {
            let mask: u32 = match width {
                8 => 0xFF,
                16 => 0xFFFF,
                _ => 0xFFFF_FFFF,
            };
            let shift = lane * 8;
            let old = self.config.get(&self.address).copied().unwrap_or(0);
            let new = (old & !(mask << shift)) | ((value & mask) << shift);
            self.config.insert(self.address, new);
        }
    }
}

impl PortIo for SimPorts {
    unsafe fn inb(&mut self, port: u16) -> u8 {
        self.read(port, 8) as u8
    }
    unsafe fn inw(&mut self, port: u16) -> u16 {
        self.read(port, 16) as u16
    }
    unsafe fn inl(&mut self, port: u16) -> u32 {
        self.read(port, 32)
    }
    unsafe fn outb(&mut self, port: u16, value: u8) {
        self.write(port, 8, value as u32)
    }
    unsafe fn outw(&mut self, port: u16, value: u16) {
        self.write(port, 16, value as u32)
    }
    unsafe fn outl(&mut self, port: u16, value: u32) {
        self.write(port, 32, value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROCESSOR
// ═══════════════════════════════════════════════════════════════════════════

/// Interrupt flag plus a `hlt` counter.
pub struct SimCpu {
    trace: Trace,
    enabled: Cell<bool>,
    halts: Cell<usize>,
}

impl SimCpu {
    pub fn new(trace: &Trace, interrupts_enabled: bool) -> Self {
        Self {
            trace: trace.clone(),
            enabled: Cell::new(interrupts_enabled),
            halts: Cell::new(0),
        }
    }

    pub fn halts(&self) -> usize {
        self.halts.get()
    }
}

impl Cpu for SimCpu {
    fn interrupts_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn disable_interrupts(&self) {
        self.enabled.set(false);
        self.trace.push(Event::Cli);
    }

    fn enable_interrupts(&self) {
        self.enabled.set(true);
        self.trace.push(Event::Sti);
    }

    fn halt(&self) {
        self.halts.set(self.halts.get() + 1);
        self.trace.push(Event::Halt);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BRIDGE
// ═══════════════════════════════════════════════════════════════════════════

/// Records every invocation with the snapshot it was given.
///
/// With `reply` set, the target "returns" those registers.
pub struct SimBridge {
    trace: Trace,
    pub reply: Option<RegisterSnapshot>,
    pub calls: usize,
}

impl SimBridge {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            reply: None,
            calls: 0,
        }
    }
}

impl ExecutionBridge for SimBridge {
    type Entry = u32;

    unsafe fn invoke(&mut self, entry: u32, regs: &mut RegisterSnapshot) {
        self.calls += 1;
        self.trace.push(Event::Invoke { entry, regs: *regs });
        if let Some(reply) = self.reply {
            *regs = reply;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SINK
// ═══════════════════════════════════════════════════════════════════════════

/// Line-buffered sink; every completed line lands in the trace.
pub struct RecordingSink {
    trace: Trace,
    pending: String,
}

impl RecordingSink {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            pending: String::new(),
        }
    }
}

impl fmt::Write for RecordingSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if c == '\n' {
                let line = std::mem::take(&mut self.pending);
                self.trace.push(Event::Line(line));
            } else {
                self.pending.push(c);
            }
        }
        Ok(())
    }
}
