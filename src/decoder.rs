use serde::{Deserialize, Serialize};

/// Bit-layout family of an encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    R,
    I,
    D,
    B,
    Cb,
    Im,
    Nop,
    Break,
    Invalid,
}

impl Format {
    /// Column offsets (MSB = column 0) where the disassembly inserts a separator.
    pub fn boundaries(self) -> &'static [usize] {
        match self {
            Format::R => &[11, 16, 22, 27],
            Format::D => &[11, 20, 22, 27],
            Format::I => &[10, 22, 27],
            Format::B => &[6],
            Format::Cb => &[8, 27],
            Format::Im => &[9, 11, 27],
            Format::Nop | Format::Break | Format::Invalid => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::R => "R",
            Format::I => "I",
            Format::D => "D",
            Format::B => "B",
            Format::Cb => "CB",
            Format::Im => "IM",
            Format::Nop => "N/A",
            Format::Break => "BREAK",
            Format::Invalid => "INVALID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    B,
    And,
    Add,
    Addi,
    Orr,
    Cbz,
    Cbnz,
    Sub,
    Subi,
    Movz,
    Lsr,
    Lsl,
    Asr,
    Eor,
    Movk,
    Stur,
    Ldur,
    Nop,
    Break,
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::B => "B",
            Op::And => "AND",
            Op::Add => "ADD",
            Op::Addi => "ADDI",
            Op::Orr => "ORR",
            Op::Cbz => "CBZ",
            Op::Cbnz => "CBNZ",
            Op::Sub => "SUB",
            Op::Subi => "SUBI",
            Op::Movz => "MOVZ",
            Op::Lsr => "LSR",
            Op::Lsl => "LSL",
            Op::Asr => "ASR",
            Op::Eor => "EOR",
            Op::Movk => "MOVK",
            Op::Stur => "STUR",
            Op::Ldur => "LDUR",
            Op::Nop => "NOP",
            Op::Break => "BREAK",
        }
    }
}

/// A decoded word. Each format carries only its own fields; the opcode is
/// stored at the format's native width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoded {
    R { op: Op, opcode: u16, rm: u8, shamt: u8, rn: u8, rd: u8 },
    D { op: Op, opcode: u16, address: u16, op2: u8, rn: u8, rt: u8 },
    I { op: Op, opcode: u16, imm: i32, rn: u8, rd: u8 },
    B { op: Op, opcode: u8, offset: i32 },
    Cb { op: Op, opcode: u8, offset: i32, cond: u8 },
    Im { op: Op, opcode: u16, shift: u8, field: u16, rd: u8 },
    Nop,
    Break,
    /// `key` is the 11-bit classification key, or `None` when the source
    /// line was not a 32-digit binary word at all.
    Invalid { key: Option<u16> },
}

impl Decoded {
    pub fn format(&self) -> Format {
        match self {
            Decoded::R { .. } => Format::R,
            Decoded::D { .. } => Format::D,
            Decoded::I { .. } => Format::I,
            Decoded::B { .. } => Format::B,
            Decoded::Cb { .. } => Format::Cb,
            Decoded::Im { .. } => Format::Im,
            Decoded::Nop => Format::Nop,
            Decoded::Break => Format::Break,
            Decoded::Invalid { .. } => Format::Invalid,
        }
    }

    pub fn op(&self) -> Option<Op> {
        match *self {
            Decoded::R { op, .. }
            | Decoded::D { op, .. }
            | Decoded::I { op, .. }
            | Decoded::B { op, .. }
            | Decoded::Cb { op, .. }
            | Decoded::Im { op, .. } => Some(op),
            Decoded::Nop => Some(Op::Nop),
            Decoded::Break => Some(Op::Break),
            Decoded::Invalid { .. } => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        self.op().map_or("INVALID", Op::mnemonic)
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Decoded::Break)
    }
}

pub trait Decoder {
    /// Decoding is total: words with no table entry come back as `Decoded::Invalid`.
    fn decode(&self, word: u32) -> Decoded;
}
