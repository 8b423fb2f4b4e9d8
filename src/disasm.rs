use std::io::{self, Write};

use crate::decoder::{Decoded, Format};
use crate::program::{DataWord, Instruction, Program, WORD_DIGITS};

/// Mnemonic and operands, e.g. `ADD R3, R1, R2`.
pub fn fmt_decoded(d: &Decoded) -> String {
    let mn = d.mnemonic();
    match *d {
        Decoded::R { rm, rn, rd, .. } => format!("{mn} R{rd}, R{rn}, R{rm}"),
        Decoded::D { address, rn, rt, .. } => format!("{mn} R{rt}, [R{rn}, #{address}]"),
        Decoded::I { imm, rn, rd, .. } => format!("{mn} R{rd}, R{rn}, #{imm}"),
        Decoded::B { offset, .. } => format!("{mn} #{offset}"),
        Decoded::Cb { offset, cond, .. } => format!("{mn} R{cond}, #{offset}"),
        Decoded::Im { shift, field, rd, .. } => {
            format!("{mn} R{rd}, #{field}, LSL #{}", u32::from(shift) * 16)
        }
        Decoded::Nop | Decoded::Break | Decoded::Invalid { .. } => mn.to_string(),
    }
}

/// The raw bit string with a space at each field boundary of `format`.
/// Lines that are not 32 characters long are returned untouched.
pub fn group_bits(raw: &str, format: Format) -> String {
    if raw.len() != WORD_DIGITS || !raw.is_ascii() {
        return raw.to_string();
    }
    let cuts = format.boundaries();
    let mut out = String::with_capacity(raw.len() + cuts.len());
    let mut start = 0;
    for &cut in cuts {
        out.push_str(&raw[start..cut]);
        out.push(' ');
        start = cut;
    }
    out.push_str(&raw[start..]);
    out
}

/// One disassembly line: `<grouped-bits> <address> <mnemonic> <operands>`.
pub fn fmt_instruction(insn: &Instruction) -> String {
    format!(
        "{} {} {}",
        group_bits(&insn.raw, insn.format()),
        insn.address,
        fmt_decoded(&insn.decoded)
    )
}

/// One data line: `<raw> <address> <signed value>`.
pub fn fmt_data(word: &DataWord) -> String {
    format!("{} {} {}", word.raw, word.address, word.value)
}

pub fn write_listing<W: Write>(prog: &Program, out: &mut W) -> io::Result<()> {
    for insn in &prog.instructions {
        writeln!(out, "{}", fmt_instruction(insn))?;
    }
    for word in &prog.data {
        writeln!(out, "{}", fmt_data(word))?;
    }
    Ok(())
}

pub fn listing(prog: &Program) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_listing(prog, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
