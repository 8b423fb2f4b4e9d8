use crate::decoder::{Format, Op};

/// One row of the opcode classification table: an inclusive range of
/// 11-bit keys (`word >> 21`) and what they decode to.
#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub lo: u16,
    pub hi: u16,
    pub op: Op,
    pub format: Format,
}

impl InstrDesc {
    pub fn mnemonic(&self) -> &'static str {
        self.op.mnemonic()
    }

    pub fn matches(&self, key: u16) -> bool {
        (self.lo..=self.hi).contains(&key)
    }
}

const fn row(lo: u16, hi: u16, op: Op, format: Format) -> InstrDesc {
    InstrDesc { lo, hi, op, format }
}

pub const TABLE: &[InstrDesc] = &[
    row(160, 191, Op::B, Format::B),
    row(1104, 1104, Op::And, Format::R),
    row(1112, 1112, Op::Add, Format::R),
    row(1160, 1161, Op::Addi, Format::I),
    row(1360, 1360, Op::Orr, Format::R),
    row(1440, 1447, Op::Cbz, Format::Cb),
    row(1448, 1455, Op::Cbnz, Format::Cb),
    row(1624, 1624, Op::Sub, Format::R),
    row(1672, 1673, Op::Subi, Format::I),
    row(1684, 1687, Op::Movz, Format::Im),
    row(1690, 1690, Op::Lsr, Format::R),
    row(1691, 1691, Op::Lsl, Format::R),
    row(1692, 1692, Op::Asr, Format::R),
    row(1872, 1872, Op::Eor, Format::R),
    row(1940, 1943, Op::Movk, Format::Im),
    row(1984, 1984, Op::Stur, Format::D),
    row(1986, 1986, Op::Ldur, Format::D),
    row(0, 0, Op::Nop, Format::Nop),
    row(2038, 2038, Op::Break, Format::Break),
];

/// Look up an 11-bit key. `None` means the word is not a defined instruction.
pub fn classify(key: u16) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.matches(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_inclusive() {
        assert_eq!(classify(160).map(|d| d.op), Some(Op::B));
        assert_eq!(classify(191).map(|d| d.op), Some(Op::B));
        assert!(classify(192).is_none());
        assert_eq!(classify(1447).map(|d| d.op), Some(Op::Cbz));
        assert_eq!(classify(1448).map(|d| d.op), Some(Op::Cbnz));
        assert_eq!(classify(1943).map(|d| d.format), Some(Format::Im));
    }

    #[test]
    fn sentinels() {
        assert_eq!(classify(0).map(|d| d.mnemonic()), Some("NOP"));
        assert_eq!(classify(2038).map(|d| d.format), Some(Format::Break));
        assert!(classify(2047).is_none());
        assert!(classify(1985).is_none());
    }

    #[test]
    fn rows_do_not_overlap() {
        for (i, a) in TABLE.iter().enumerate() {
            for b in &TABLE[i + 1..] {
                assert!(a.hi < b.lo || b.hi < a.lo, "{:?} overlaps {:?}", a.op, b.op);
            }
        }
    }
}
