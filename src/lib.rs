pub mod cpu;
pub mod decoder;
pub mod exec;
pub mod disasm;
pub mod instructions;
pub mod memory;
pub mod program;
pub mod trace;

pub mod isa {
    pub mod legv8; // LEGv8 teaching subset
}

pub use cpu::{BranchOperand, Cpu, RegisterFile, RunError, RunSummary, ShiftSource, SimConfig, Trap};
pub use decoder::{Decoded, Decoder, Format, Op};
pub use isa::legv8::{sign_extend, LegV8Decoder};
pub use memory::{Bus, DataMemory};
pub use program::{DataWord, DecodeError, Instruction, LoadError, Program};
pub use trace::{JsonTraceWriter, TextTraceWriter, TraceRecord, TraceSink};
