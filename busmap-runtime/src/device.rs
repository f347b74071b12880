//! Virtual device memory
//!
//! Simulated register storage for one execution session. Constructed fresh
//! from a chip model's declared defaults, mutated only through bus
//! transactions, and discarded once its trace has been exported.

use crate::error::Result;
use busmap_spec::{BusTransaction, Chip, LookupError, TraceEntry};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Contract shared by the virtual device and physical bus drivers: both
/// accept the same `(page, offset, value)` triples the translator emits, so
/// a translation tested against the simulation drives real hardware
/// unchanged.
pub trait BusDriver {
    fn read_register(&mut self, page: u8, offset: u8) -> Result<u8>;
    fn write_register(&mut self, page: u8, offset: u8, value: u8) -> Result<()>;
}

/// Byte store keyed by `(page, offset)`, plus the ordered session trace.
///
/// Bytes not covered by any declared register are absent; touching them is a
/// lookup error. Every write is a read-modify-write merge that preserves all
/// bits outside the transaction's mask.
#[derive(Debug, Clone)]
pub struct VirtualDeviceMemory {
    bytes: HashMap<(u8, u8), u8>,
    trace: Vec<TraceEntry>,
}

impl VirtualDeviceMemory {
    /// Fresh session seeded from every register's reset image (declared
    /// default bytes with field defaults patched over them).
    pub fn new(chip: &Chip) -> Self {
        let mut bytes = HashMap::new();
        for page in &chip.pages {
            for register in &page.registers {
                for (i, byte) in register.reset_bytes().into_iter().enumerate() {
                    bytes.insert((page.address, register.offset + i as u8), byte);
                }
            }
        }
        VirtualDeviceMemory {
            bytes,
            trace: Vec::new(),
        }
    }

    /// Current byte value. Does not touch the trace.
    pub fn read(&self, page: u8, offset: u8) -> Result<u8> {
        self.bytes
            .get(&(page, offset))
            .copied()
            .ok_or_else(|| LookupError::address(page, offset).into())
    }

    /// Apply one transaction: merge into the stored byte and record the
    /// resulting value in the trace. Returns the new byte.
    pub fn apply(&mut self, txn: &BusTransaction) -> Result<u8> {
        let old = self.read(txn.page, txn.offset)?;
        let new = txn.merged_into(old);
        self.bytes.insert((txn.page, txn.offset), new);
        self.trace.push(TraceEntry {
            page: txn.page,
            offset: txn.offset,
            value: new,
        });
        Ok(new)
    }

    /// Ordered trace recorded so far.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    /// Discard trace entries recorded after `mark`, leaving the byte store
    /// untouched. Used to drop an aborted function's partial trace; memory
    /// stays at the state of the last applied transaction, as on real
    /// non-atomic hardware.
    pub fn truncate_trace(&mut self, mark: usize) {
        self.trace.truncate(mark);
    }

    /// Consume the session and return its full ordered trace.
    pub fn export_trace(self) -> Vec<TraceEntry> {
        self.trace
    }

    /// Memory image sorted by address, for debugging.
    pub fn dump(&self) -> String {
        let mut entries: Vec<_> = self.bytes.iter().collect();
        entries.sort_by_key(|((page, offset), _)| ((*page as u16) << 8 | *offset as u16));
        let mut out = String::new();
        for ((page, offset), value) in entries {
            let address = (*page as u16) << 8 | *offset as u16;
            let _ = writeln!(out, "{address:#06x} = {value:#04x}");
        }
        out
    }
}

impl BusDriver for VirtualDeviceMemory {
    fn read_register(&mut self, page: u8, offset: u8) -> Result<u8> {
        self.read(page, offset)
    }

    fn write_register(&mut self, page: u8, offset: u8, value: u8) -> Result<()> {
        // Whole-byte write: full mask, no shift.
        self.apply(&BusTransaction {
            page,
            offset,
            mask: 0xFF,
            shift: 0,
            value,
        })
        .map(|_| ())
    }
}
