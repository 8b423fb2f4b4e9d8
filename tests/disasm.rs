mod common;

use common::*;
use legv8_sim::disasm::{fmt_instruction, listing};
use pretty_assertions::assert_eq;

#[test]
fn add_round_trip() {
    let prog = program(&[enc_r(ADD, 2, 0, 1, 3), BREAK], &[]);
    let text = fmt_instruction(&prog.instructions[0]);
    assert_eq!(text, "10001011000 00010 000000 00001 00011 96 ADD R3, R1, R2");
    let grouped = text.split(" 96 ").next().unwrap();
    assert_eq!(grouped.replace(' ', ""), prog.instructions[0].raw);
}

#[test]
fn each_format_groups_and_renders() {
    let prog = program(
        &[
            enc_d(LDUR, 8, 0, 5, 4),
            enc_i(ADDI, -5, 0, 1),
            enc_b(-3),
            enc_cb(CBZ, -2, 7),
            enc_im(MOVZ, 1, 0xBEEF, 9),
            NOP,
            BREAK,
        ],
        &[],
    );
    let lines: Vec<String> = prog.instructions.iter().map(fmt_instruction).collect();
    assert_eq!(
        lines,
        vec![
            "11111000010 000001000 00 00101 00100 96 LDUR R4, [R5, #8]",
            "1001000100 111111111011 00000 00001 100 ADDI R1, R0, #-5",
            "000101 11111111111111111111111101 104 B #-3",
            "10110100 1111111111111111110 00111 108 CBZ R7, #-2",
            "110100101 01 1011111011101111 01001 112 MOVZ R9, #48879, LSL #16",
            "00000000000000000000000000000000 116 NOP",
            "11111110110111101111111111100111 120 BREAK",
        ]
    );
}

#[test]
fn listing_ends_with_signed_data_words() {
    let prog = program(&[enc_i(ADDI, 1, 0, 1), BREAK], &[-1, 42]);
    let expected = "\
1001000100 000000000001 00000 00001 96 ADDI R1, R0, #1
11111110110111101111111111100111 100 BREAK
11111111111111111111111111111111 104 -1
00000000000000000000000000101010 108 42
";
    assert_eq!(listing(&prog), expected);
}

#[test]
fn invalid_lines_are_listed_in_place() {
    let src = format!("{}\nnot a word\n{}\n", "1".repeat(32), line(BREAK));
    let prog = legv8_sim::Program::from_source(&src).unwrap();
    let text = listing(&prog);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("{} 96 INVALID", "1".repeat(32)));
    assert_eq!(lines[1], "not a word 100 INVALID");
    assert_eq!(lines[2], "11111110110111101111111111100111 104 BREAK");
}
