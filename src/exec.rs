use num_traits::ToPrimitive;

use crate::cpu::{BranchOperand, Cpu, Fault, ShiftSource};
use crate::decoder::{Decoded, Op};
use crate::memory::Bus;

pub trait Executor {
    /// Apply `d` to the machine and return the position delta, in
    /// instructions, to the next fetch.
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded) -> Result<i32, Fault>;
}

fn reg(cpu: &Cpu, idx: u8) -> Result<i64, Fault> {
    cpu.regs.get(idx).ok_or(Fault::BadRegister { index: idx })
}

fn set_reg(cpu: &mut Cpu, idx: u8, val: i64) -> Result<(), Fault> {
    cpu.regs.set(idx, val).ok_or(Fault::BadRegister { index: idx })
}

/// `base + offset * 4`, which must land on a non-negative word boundary
/// inside the 32-bit data address space.
pub fn effective_address(base: i64, offset: u16) -> Result<u32, Fault> {
    let addr = base.checked_add(i64::from(offset) * 4).ok_or(Fault::BadAddress { addr: base })?;
    if addr % 4 != 0 {
        return Err(Fault::Unaligned { addr });
    }
    addr.to_u32().ok_or(Fault::BadAddress { addr })
}

fn shift(op: Op, val: i64, amount: u8) -> i64 {
    let s = u32::from(amount);
    match op {
        Op::Lsl => val.checked_shl(s).unwrap_or(0),
        Op::Lsr => (val as u64).checked_shr(s).unwrap_or(0) as i64,
        // ASR
        _ => val.checked_shr(s).unwrap_or(if val < 0 { -1 } else { 0 }),
    }
}

pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded) -> Result<i32, Fault> {
        match *d {
            Decoded::R { op, rm, shamt, rn, rd, .. } => {
                let res = match op {
                    Op::Add => reg(cpu, rn)?.wrapping_add(reg(cpu, rm)?),
                    Op::Sub => reg(cpu, rn)?.wrapping_sub(reg(cpu, rm)?),
                    Op::And => reg(cpu, rn)? & reg(cpu, rm)?,
                    Op::Orr => reg(cpu, rn)? | reg(cpu, rm)?,
                    Op::Eor => reg(cpu, rn)? ^ reg(cpu, rm)?,
                    Op::Lsl | Op::Lsr | Op::Asr => {
                        let src = match cpu.cfg.shift_source {
                            ShiftSource::Rd => rd,
                            ShiftSource::Rn => rn,
                        };
                        shift(op, reg(cpu, src)?, shamt)
                    }
                    _ => return Err(Fault::InvalidInstruction),
                };
                set_reg(cpu, rd, res)?;
            }
            Decoded::I { op, imm, rn, rd, .. } => {
                let a = reg(cpu, rn)?;
                let res = match op {
                    Op::Addi => a.wrapping_add(i64::from(imm)),
                    Op::Subi => a.wrapping_sub(i64::from(imm)),
                    _ => return Err(Fault::InvalidInstruction),
                };
                set_reg(cpu, rd, res)?;
            }
            Decoded::D { op, address, rn, rt, .. } => {
                let addr = effective_address(reg(cpu, rn)?, address)?;
                match op {
                    Op::Ldur => {
                        let val = bus.read_word(addr);
                        set_reg(cpu, rt, i64::from(val))?;
                    }
                    Op::Stur => {
                        // Memory words are 32 bits wide.
                        let val = reg(cpu, rt)? as i32;
                        bus.write_word(addr, val);
                    }
                    _ => return Err(Fault::InvalidInstruction),
                }
            }
            Decoded::B { offset, .. } => return Ok(offset),
            Decoded::Cb { op, offset, cond, .. } => {
                let operand = match cpu.cfg.branch_operand {
                    BranchOperand::Field => i64::from(cond),
                    BranchOperand::Register => reg(cpu, cond)?,
                };
                let taken = match op {
                    Op::Cbz => operand == 0,
                    Op::Cbnz => operand != 0,
                    _ => return Err(Fault::InvalidInstruction),
                };
                return Ok(if taken { offset } else { 1 });
            }
            Decoded::Im { op, shift: code, field, rd, .. } => {
                if cpu.cfg.wide_moves {
                    let lane = u32::from(code) * 16;
                    let bits = u64::from(field) << lane;
                    let res = match op {
                        Op::Movz => bits as i64,
                        Op::Movk => {
                            let mask = 0xFFFFu64 << lane;
                            ((reg(cpu, rd)? as u64 & !mask) | bits) as i64
                        }
                        _ => return Err(Fault::InvalidInstruction),
                    };
                    set_reg(cpu, rd, res)?;
                }
            }
            Decoded::Nop | Decoded::Break => {}
            Decoded::Invalid { .. } => return Err(Fault::InvalidInstruction),
        }
        Ok(1)
    }
}
