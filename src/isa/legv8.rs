use bitvec::prelude::*;

use crate::decoder::{Decoded, Decoder, Format};
use crate::instructions::classify;

/// LEGv8 teaching-subset decoder.
///
/// Every word is classified by its top 11 bits, then re-sliced with the
/// layout of the format it resolved to. Column numbers below count from the
/// most significant bit, so `bits(w, 0, 11)` is `w[31:21]` and the ranges
/// line up with the separators the disassembler prints.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegV8Decoder;

impl LegV8Decoder {
    pub fn new() -> Self {
        Self
    }
}

/// Bits `[from, to)` of `word`, MSB-first.
#[inline]
fn bits(word: u32, from: usize, to: usize) -> u32 {
    word.view_bits::<Msb0>()[from..to].load_be::<u32>()
}

/// Sign-extend the low `length` bits of `value` to 32 bits.
pub fn sign_extend(value: u32, length: u32) -> i32 {
    if length == 0 || length >= 32 {
        return value as i32;
    }
    if (value >> (length - 1)) & 1 == 1 {
        (value | (u32::MAX << length)) as i32
    } else {
        value as i32
    }
}

impl Decoder for LegV8Decoder {
    fn decode(&self, word: u32) -> Decoded {
        let key = (word >> 21) as u16;
        let Some(desc) = classify(key) else {
            return Decoded::Invalid { key: Some(key) };
        };
        let op = desc.op;
        match desc.format {
            // | opcode 11 | Rm 5 | shamt 6 | Rn 5 | Rd 5 |
            Format::R => Decoded::R {
                op,
                opcode: bits(word, 0, 11) as u16,
                rm: bits(word, 11, 16) as u8,
                shamt: bits(word, 16, 22) as u8,
                rn: bits(word, 22, 27) as u8,
                rd: bits(word, 27, 32) as u8,
            },
            // | opcode 11 | address 9 | op2 2 | Rn 5 | Rt 5 |
            Format::D => Decoded::D {
                op,
                opcode: bits(word, 0, 11) as u16,
                address: bits(word, 11, 20) as u16,
                op2: bits(word, 20, 22) as u8,
                rn: bits(word, 22, 27) as u8,
                rt: bits(word, 27, 32) as u8,
            },
            // | opcode 10 | imm 12 | Rn 5 | Rd 5 |
            Format::I => Decoded::I {
                op,
                opcode: bits(word, 0, 10) as u16,
                imm: sign_extend(bits(word, 10, 22), 12),
                rn: bits(word, 22, 27) as u8,
                rd: bits(word, 27, 32) as u8,
            },
            // | opcode 6 | offset 26 |
            Format::B => Decoded::B {
                op,
                opcode: bits(word, 0, 6) as u8,
                offset: sign_extend(bits(word, 6, 32), 26),
            },
            // | opcode 8 | offset 19 | Rt 5 |
            Format::Cb => Decoded::Cb {
                op,
                opcode: bits(word, 0, 8) as u8,
                offset: sign_extend(bits(word, 8, 27), 19),
                cond: bits(word, 27, 32) as u8,
            },
            // | opcode 9 | shift 2 | field 16 | Rd 5 |
            Format::Im => Decoded::Im {
                op,
                opcode: bits(word, 0, 9) as u16,
                shift: bits(word, 9, 11) as u8,
                field: bits(word, 11, 27) as u16,
                rd: bits(word, 27, 32) as u8,
            },
            Format::Nop => Decoded::Nop,
            Format::Break => Decoded::Break,
            Format::Invalid => Decoded::Invalid { key: Some(key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Op;

    #[test]
    fn sign_extend_twelve_bits() {
        assert_eq!(sign_extend(0x7FF, 12), 2047);
        assert_eq!(sign_extend(0x800, 12), -2048);
        assert_eq!(sign_extend(0xFFF, 12), -1);
    }

    #[test]
    fn sign_extend_full_word() {
        assert_eq!(sign_extend(0xFFFF_FFFF, 32), -1);
        assert_eq!(sign_extend(0x7FFF_FFFF, 32), i32::MAX);
        assert_eq!(sign_extend(0x3FF_FFFF, 26), -1);
        assert_eq!(sign_extend(0x4_0000, 19), -262_144);
    }

    #[test]
    fn msb_first_columns() {
        let w = 0b1000_0000_0000_0000_0000_0000_0000_0001u32;
        assert_eq!(bits(w, 0, 1), 1);
        assert_eq!(bits(w, 31, 32), 1);
        assert_eq!(bits(w, 1, 31), 0);
        assert_eq!(bits(0xFFFF_FFFF, 0, 32), 0xFFFF_FFFF);
        assert_eq!(bits(0x0000_03E0, 22, 27), 0x1F);
    }

    #[test]
    fn break_word() {
        let d = LegV8Decoder.decode(0xFEDE_FFE7);
        assert_eq!(d, Decoded::Break);
        assert_eq!(d.op(), Some(Op::Break));
    }

    #[test]
    fn unknown_key_is_invalid_not_panic() {
        let d = LegV8Decoder.decode(0xFFFF_FFFF);
        assert_eq!(d, Decoded::Invalid { key: Some(0x7FF) });
        assert_eq!(d.format(), Format::Invalid);
    }
}
