//! Loading a binary-text source into a decoded program.
//!
//! Each source line is one 32-character word, MSB first. Words are decoded
//! as instructions up to and including the first BREAK; every line after
//! that is a signed data word. Addresses are assigned by line position
//! starting at [`BASE_ADDRESS`], so a bad line never shifts its neighbours.

use serde::Serialize;
use tracing::{debug, warn};

use crate::decoder::{Decoded, Decoder, Format};
use crate::isa::legv8::{sign_extend, LegV8Decoder};
use crate::memory::DataMemory;

/// Address of the first source line.
pub const BASE_ADDRESS: u32 = 96;
/// Bytes per source line.
pub const WORD_BYTES: u32 = 4;
/// Characters per source line.
pub const WORD_DIGITS: usize = 32;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line {line}: malformed word {text:?}: {reason}")]
    Malformed { line: usize, text: String, reason: &'static str },
    #[error("line {line}: no instruction for opcode key {key}")]
    Unclassified { line: usize, key: u16 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("input contains no lines")]
    Empty,
    #[error("no BREAK instruction found in {lines} line(s)")]
    MissingBreak { lines: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub raw: String,
    pub address: u32,
    pub decoded: Decoded,
}

impl Instruction {
    pub fn format(&self) -> Format {
        self.decoded.format()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.decoded.mnemonic()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWord {
    pub raw: String,
    pub address: u32,
    pub value: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    /// Instructions in address order; the last one is always BREAK.
    pub instructions: Vec<Instruction>,
    pub data: Vec<DataWord>,
    /// Per-line problems found while loading. None of them stop the load.
    #[serde(skip)]
    pub diagnostics: Vec<DecodeError>,
}

/// Parse one source line as a 32-bit word.
pub fn parse_word(text: &str) -> Result<u32, &'static str> {
    if text.len() != WORD_DIGITS {
        return Err("expected exactly 32 binary digits");
    }
    if !text.bytes().all(|b| b == b'0' || b == b'1') {
        return Err("contains a character other than 0 or 1");
    }
    u32::from_str_radix(text, 2).map_err(|_| "not a binary number")
}

impl Program {
    pub fn from_source(text: &str) -> Result<Self, LoadError> {
        Self::from_lines(text.lines())
    }

    pub fn from_lines<I, S>(lines: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::decode_with(&LegV8Decoder::new(), lines)
    }

    pub fn decode_with<D, I, S>(dec: &D, lines: I) -> Result<Self, LoadError>
    where
        D: Decoder,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prog = Program::default();
        let mut seen = 0usize;
        let mut in_data = false;

        for (idx, line) in lines.into_iter().enumerate() {
            seen += 1;
            let line_no = idx + 1;
            let text = line.as_ref().trim();
            let address = BASE_ADDRESS + WORD_BYTES * idx as u32;

            if in_data {
                match parse_word(text) {
                    Ok(word) => prog.data.push(DataWord {
                        raw: text.to_string(),
                        address,
                        value: sign_extend(word, 32),
                    }),
                    Err(reason) => prog.report(DecodeError::Malformed {
                        line: line_no,
                        text: text.to_string(),
                        reason,
                    }),
                }
                continue;
            }

            let decoded = match parse_word(text) {
                Ok(word) => {
                    let d = dec.decode(word);
                    if let Decoded::Invalid { key: Some(key) } = d {
                        prog.report(DecodeError::Unclassified { line: line_no, key });
                    }
                    d
                }
                Err(reason) => {
                    prog.report(DecodeError::Malformed {
                        line: line_no,
                        text: text.to_string(),
                        reason,
                    });
                    Decoded::Invalid { key: None }
                }
            };
            in_data = decoded.is_break();
            prog.instructions.push(Instruction { raw: text.to_string(), address, decoded });
        }

        if seen == 0 {
            return Err(LoadError::Empty);
        }
        if !in_data {
            return Err(LoadError::MissingBreak { lines: seen });
        }
        debug!(
            instructions = prog.instructions.len(),
            data_words = prog.data.len(),
            diagnostics = prog.diagnostics.len(),
            "program loaded"
        );
        Ok(prog)
    }

    fn report(&mut self, err: DecodeError) {
        warn!("{err}");
        self.diagnostics.push(err);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Instruction> {
        self.instructions.get(pos)
    }

    /// Initial contents of data memory: the words after BREAK.
    pub fn data_memory(&self) -> DataMemory {
        self.data.iter().map(|w| (w.address, w.value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BREAK: &str = "11111110110111101111111111100111";

    #[test]
    fn parse_word_rejects_bad_lines() {
        assert!(parse_word("0101").is_err());
        assert!(parse_word("0000000000000000000000000000000x").is_err());
        assert_eq!(parse_word(BREAK), Ok(0xFEDE_FFE7));
    }

    #[test]
    fn addresses_start_at_96_step_4() {
        let nop = "0".repeat(32);
        let src = format!("{nop}\n{nop}\n{BREAK}\n{}\n", "1".repeat(32));
        let prog = Program::from_source(&src).unwrap();
        let addrs: Vec<u32> = prog.instructions.iter().map(|i| i.address).collect();
        assert_eq!(addrs, vec![96, 100, 104]);
        assert_eq!(prog.data.len(), 1);
        assert_eq!(prog.data[0].address, 108);
        assert_eq!(prog.data[0].value, -1);
    }

    #[test]
    fn missing_break_is_a_load_error() {
        let nop = "0".repeat(32);
        let err = Program::from_lines([nop.as_str(), nop.as_str()]).unwrap_err();
        assert_eq!(err, LoadError::MissingBreak { lines: 2 });
        assert_eq!(Program::from_source("").unwrap_err(), LoadError::Empty);
    }

    #[test]
    fn bad_lines_keep_their_slot() {
        let src = format!("{}\nhello\n{BREAK}\nnot-data\n{}\n", "1".repeat(32), "0".repeat(31) + "1");
        let prog = Program::from_source(&src).unwrap();
        assert_eq!(prog.instructions.len(), 3);
        assert_eq!(prog.instructions[0].decoded, Decoded::Invalid { key: Some(2047) });
        assert_eq!(prog.instructions[1].decoded, Decoded::Invalid { key: None });
        assert_eq!(prog.instructions[2].address, 104);
        assert_eq!(prog.data.len(), 1);
        assert_eq!(prog.data[0].address, 112);
        assert_eq!(prog.diagnostics.len(), 3);
        assert!(matches!(prog.diagnostics[0], DecodeError::Unclassified { line: 1, key: 2047 }));
        assert!(matches!(prog.diagnostics[2], DecodeError::Malformed { line: 4, .. }));
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let src = format!("{}\r\n{BREAK}\r\n", "0".repeat(32));
        let prog = Program::from_source(&src).unwrap();
        assert_eq!(prog.instructions[1].decoded, Decoded::Break);
        assert!(prog.diagnostics.is_empty());
    }
}
