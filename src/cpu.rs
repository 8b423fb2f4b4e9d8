use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::exec::Executor;
use crate::memory::{Bus, DataMemory};
use crate::program::{Instruction, Program, BASE_ADDRESS};
use crate::trace::{TraceRecord, TraceSink};

pub const NUM_REGS: usize = 32;

/// What CBZ/CBNZ compare against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchOperand {
    /// The 5-bit Rt field itself.
    Field,
    /// The contents of register Rt.
    Register,
}

/// Source operand of LSL/LSR/ASR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftSource {
    Rd,
    Rn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Executed-instruction budget; running past it is a trap.
    pub max_cycles: u64,
    pub branch_operand: BranchOperand,
    pub shift_source: ShiftSource,
    /// Give MOVZ/MOVK their LEGv8 effect instead of treating them as no-ops.
    pub wide_moves: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_cycles: 10_000,
            branch_operand: BranchOperand::Field,
            shift_source: ShiftSource::Rd,
            wide_moves: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterFile([i64; NUM_REGS]);

impl Default for RegisterFile {
    fn default() -> Self {
        Self([0; NUM_REGS])
    }
}

impl RegisterFile {
    pub fn get(&self, idx: u8) -> Option<i64> {
        self.0.get(usize::from(idx)).copied()
    }

    pub fn set(&mut self, idx: u8, val: i64) -> Option<()> {
        let slot = self.0.get_mut(usize::from(idx))?;
        *slot = val;
        Some(())
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

/// Why an instruction could not complete.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("invalid instruction")]
    InvalidInstruction,
    #[error("register index {index} out of range")]
    BadRegister { index: u8 },
    #[error("unaligned data address {addr}")]
    Unaligned { addr: i64 },
    #[error("data address {addr} out of range")]
    BadAddress { addr: i64 },
    #[error("next position {target} is outside the {len}-instruction program")]
    PositionOutOfRange { target: i64, len: usize },
    #[error("cycle limit of {limit} reached")]
    CycleLimit { limit: u64 },
}

/// A fatal fault, tagged with where it happened. No state is rolled back.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cycle {cycle}, address {pc}: {fault}")]
pub struct Trap {
    pub cycle: u64,
    pub pc: u32,
    pub fault: Fault,
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Trap(#[from] Trap),
    #[error("writing trace: {0}")]
    Sink(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub cycles: u64,
    /// Address of the BREAK that stopped the run.
    pub halted_at: u32,
    pub registers: RegisterFile,
    pub memory: DataMemory,
}

#[derive(Debug)]
pub enum Step<'p> {
    Executed(&'p Instruction),
    Halted(&'p Instruction),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// Index into the program of the next instruction to fetch. Kept signed
    /// so a branch before the first instruction is caught at fetch.
    pub pos: i64,
    pub cycle: u64,
    pub regs: RegisterFile,
    pub cfg: SimConfig,
    last_pc: Option<u32>,
}

impl Cpu {
    pub fn new(cfg: SimConfig) -> Self {
        Self { pos: 0, cycle: 0, regs: RegisterFile::default(), cfg, last_pc: None }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.cycle = 0;
        self.regs = RegisterFile::default();
        self.last_pc = None;
    }

    fn trap(&self, pc: u32, fault: Fault) -> Trap {
        Trap { cycle: self.cycle, pc, fault }
    }

    /// Fetch, execute and advance by one instruction. BREAK halts without
    /// consuming a cycle.
    pub fn step<'p, B: Bus, X: Executor>(
        &mut self,
        prog: &'p Program,
        bus: &mut B,
        exec: &X,
    ) -> Result<Step<'p>, Trap> {
        let insn = match self.pos.to_usize().and_then(|p| prog.get(p)) {
            Some(insn) => insn,
            None => {
                let pc = self.last_pc.unwrap_or(BASE_ADDRESS);
                return Err(self.trap(pc, Fault::PositionOutOfRange { target: self.pos, len: prog.len() }));
            }
        };
        if insn.decoded.is_break() {
            return Ok(Step::Halted(insn));
        }
        if self.cycle >= self.cfg.max_cycles {
            let limit = self.cfg.max_cycles;
            return Err(self.trap(insn.address, Fault::CycleLimit { limit }));
        }

        let delta = exec
            .exec(self, bus, &insn.decoded)
            .map_err(|fault| Trap { cycle: self.cycle + 1, pc: insn.address, fault })?;
        self.cycle += 1;
        self.last_pc = Some(insn.address);
        self.pos += i64::from(delta);
        debug!(cycle = self.cycle, pc = insn.address, op = insn.mnemonic(), next = self.pos, "executed");
        Ok(Step::Executed(insn))
    }

    /// Run to BREAK, handing a trace record to `sink` after every cycle.
    pub fn run<X: Executor, S: TraceSink>(
        &mut self,
        prog: &Program,
        mem: &mut DataMemory,
        exec: &X,
        sink: &mut S,
    ) -> Result<u32, RunError> {
        loop {
            match self.step(prog, mem, exec)? {
                Step::Halted(insn) => {
                    info!(cycles = self.cycle, pc = insn.address, "halted at BREAK");
                    return Ok(insn.address);
                }
                Step::Executed(insn) => {
                    let rec = TraceRecord {
                        cycle: self.cycle,
                        instruction: insn,
                        registers: &self.regs,
                        memory: mem,
                    };
                    sink.record(&rec)?;
                }
            }
        }
    }
}

/// Simulate `prog` from reset with its data segment preloaded.
pub fn simulate<S: TraceSink>(prog: &Program, cfg: SimConfig, sink: &mut S) -> Result<RunSummary, RunError> {
    let mut cpu = Cpu::new(cfg);
    let mut mem = prog.data_memory();
    let halted_at = cpu.run(prog, &mut mem, &crate::exec::IntExecutor, sink)?;
    Ok(RunSummary { cycles: cpu.cycle, halted_at, registers: cpu.regs, memory: mem })
}
