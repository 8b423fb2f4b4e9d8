#![allow(dead_code)]

use legv8_sim::Program;

pub const ADD: u32 = 1112;
pub const SUB: u32 = 1624;
pub const AND: u32 = 1104;
pub const ORR: u32 = 1360;
pub const EOR: u32 = 1872;
pub const LSR: u32 = 1690;
pub const LSL: u32 = 1691;
pub const ASR: u32 = 1692;
pub const STUR: u32 = 1984;
pub const LDUR: u32 = 1986;
pub const ADDI: u32 = 580;
pub const SUBI: u32 = 836;
pub const CBZ: u32 = 180;
pub const CBNZ: u32 = 181;
pub const MOVZ: u32 = 421;
pub const MOVK: u32 = 485;
pub const BREAK: u32 = 0xFEDE_FFE7;
pub const NOP: u32 = 0;

pub fn enc_r(op: u32, rm: u32, shamt: u32, rn: u32, rd: u32) -> u32 {
    (op << 21) | ((rm & 0x1F) << 16) | ((shamt & 0x3F) << 10) | ((rn & 0x1F) << 5) | (rd & 0x1F)
}

pub fn enc_d(op: u32, addr: u32, op2: u32, rn: u32, rt: u32) -> u32 {
    (op << 21) | ((addr & 0x1FF) << 12) | ((op2 & 0x3) << 10) | ((rn & 0x1F) << 5) | (rt & 0x1F)
}

pub fn enc_i(op: u32, imm: i32, rn: u32, rd: u32) -> u32 {
    (op << 22) | (((imm as u32) & 0xFFF) << 10) | ((rn & 0x1F) << 5) | (rd & 0x1F)
}

pub fn enc_b(offset: i32) -> u32 {
    (0b000101 << 26) | ((offset as u32) & 0x3FF_FFFF)
}

pub fn enc_cb(op: u32, offset: i32, rt: u32) -> u32 {
    (op << 24) | (((offset as u32) & 0x7_FFFF) << 5) | (rt & 0x1F)
}

pub fn enc_im(op: u32, shift: u32, field: u32, rd: u32) -> u32 {
    (op << 23) | ((shift & 0x3) << 21) | ((field & 0xFFFF) << 5) | (rd & 0x1F)
}

pub fn line(word: u32) -> String {
    format!("{word:032b}")
}

/// Source text for `words` followed by `data` words.
pub fn source(words: &[u32], data: &[i32]) -> String {
    words
        .iter()
        .copied()
        .chain(data.iter().map(|&d| d as u32))
        .map(|w| line(w) + "\n")
        .collect()
}

pub fn program(words: &[u32], data: &[i32]) -> Program {
    Program::from_source(&source(words, data)).unwrap()
}
