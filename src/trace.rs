//! Per-cycle execution trace.
//!
//! The engine builds a [`TraceRecord`] after every executed instruction and
//! hands it to a [`TraceSink`]. Records borrow the machine state, so a sink
//! that wants to keep one has to take a [`Snapshot`].

use std::io::{self, Write};

use serde::Serialize;

use crate::cpu::RegisterFile;
use crate::disasm::fmt_decoded;
use crate::memory::DataMemory;
use crate::program::Instruction;

pub const SEPARATOR: &str = "====================";
const PER_ROW: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct TraceRecord<'a> {
    pub cycle: u64,
    pub instruction: &'a Instruction,
    pub registers: &'a RegisterFile,
    pub memory: &'a DataMemory,
}

impl TraceRecord<'_> {
    pub fn address(&self) -> u32 {
        self.instruction.address
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle: self.cycle,
            address: self.address(),
            text: fmt_decoded(&self.instruction.decoded),
            registers: self.registers.clone(),
            memory: self.memory.clone(),
        }
    }
}

/// An owned copy of one trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub address: u32,
    pub text: String,
    pub registers: RegisterFile,
    pub memory: DataMemory,
}

pub trait TraceSink {
    fn record(&mut self, rec: &TraceRecord<'_>) -> io::Result<()>;
}

impl TraceSink for Vec<Snapshot> {
    fn record(&mut self, rec: &TraceRecord<'_>) -> io::Result<()> {
        self.push(rec.snapshot());
        Ok(())
    }
}

/// Render one cycle in the text trace layout.
pub fn render_record(rec: &TraceRecord<'_>) -> String {
    use std::fmt::Write as _;

    let mut s = String::new();
    let _ = writeln!(s, "{SEPARATOR}");
    let _ = writeln!(s, "Cycle:{}\t{}\t{}", rec.cycle, rec.address(), fmt_decoded(&rec.instruction.decoded));
    let _ = writeln!(s);
    let _ = writeln!(s, "Registers:");
    for (row, chunk) in rec.registers.as_slice().chunks(PER_ROW).enumerate() {
        let _ = writeln!(s, "r{:02}:\t{}", row * PER_ROW, join_tabs(chunk.iter()));
    }
    let _ = writeln!(s);
    let _ = writeln!(s, "Data:");
    for start in rec.memory.row_starts(PER_ROW as u32 * 4) {
        let words: Vec<i32> = (0..PER_ROW as u32)
            .map(|k| rec.memory.get(start.wrapping_add(k * 4)).unwrap_or(0))
            .collect();
        let _ = writeln!(s, "{start}:\t{}", join_tabs(words.iter()));
    }
    let _ = writeln!(s);
    s
}

fn join_tabs<T: ToString>(vals: impl Iterator<Item = T>) -> String {
    vals.map(|v| v.to_string()).collect::<Vec<_>>().join("\t")
}

/// The human-readable trace: one block per cycle.
pub struct TextTraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TextTraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for TextTraceWriter<W> {
    fn record(&mut self, rec: &TraceRecord<'_>) -> io::Result<()> {
        self.out.write_all(render_record(rec).as_bytes())
    }
}

/// One JSON object per line per cycle.
pub struct JsonTraceWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonTraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for JsonTraceWriter<W> {
    fn record(&mut self, rec: &TraceRecord<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &rec.snapshot())?;
        self.out.write_all(b"\n")
    }
}
