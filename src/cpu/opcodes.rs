// Opcode table for the 6502
//
// One entry per opcode byte. Unofficial opcodes carry their documented
// mnemonic, addressing mode and cycle count; the CPU runs them as NOPs of
// that length so the instruction stream stays aligned.

use super::addressing::AddressingMode;
use AddressingMode::*;

/// Static description of one opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Assembler mnemonic
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Instruction length including the opcode byte
    pub bytes: u8,
    /// Base cycle count
    pub cycles: u8,
    /// +1 cycle when an indexed read crosses a page
    pub page_cycle: bool,
    /// Part of the documented instruction set
    pub official: bool,
}

const fn entry(
    mnemonic: &'static str,
    mode: AddressingMode,
    cycles: u8,
    page_cycle: bool,
    official: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        bytes: mode.instruction_len(),
        cycles,
        page_cycle,
        official,
    }
}

const fn op(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(mnemonic, mode, cycles, false, true)
}

const fn op_p(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(mnemonic, mode, cycles, true, true)
}

const fn un(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(mnemonic, mode, cycles, false, false)
}

const fn un_p(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(mnemonic, mode, cycles, true, false)
}

/// Processor-halting encodings, run as 1-byte 2-cycle NOPs
const KIL: OpcodeInfo = un("KIL", Implied, 2);

/// Opcode table indexed by opcode byte
#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00
    op("BRK", Implied, 7), op("ORA", IndexedIndirect, 6), KIL, un("SLO", IndexedIndirect, 8),
    un("NOP", ZeroPage, 3), op("ORA", ZeroPage, 3), op("ASL", ZeroPage, 5), un("SLO", ZeroPage, 5),
    op("PHP", Implied, 3), op("ORA", Immediate, 2), op("ASL", Accumulator, 2), un("ANC", Immediate, 2),
    un("NOP", Absolute, 4), op("ORA", Absolute, 4), op("ASL", Absolute, 6), un("SLO", Absolute, 6),
    // 0x10
    op("BPL", Relative, 2), op_p("ORA", IndirectIndexed, 5), KIL, un("SLO", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("ORA", ZeroPageX, 4), op("ASL", ZeroPageX, 6), un("SLO", ZeroPageX, 6),
    op("CLC", Implied, 2), op_p("ORA", AbsoluteY, 4), un("NOP", Implied, 2), un("SLO", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("ORA", AbsoluteX, 4), op("ASL", AbsoluteX, 7), un("SLO", AbsoluteX, 7),
    // 0x20
    op("JSR", Absolute, 6), op("AND", IndexedIndirect, 6), KIL, un("RLA", IndexedIndirect, 8),
    op("BIT", ZeroPage, 3), op("AND", ZeroPage, 3), op("ROL", ZeroPage, 5), un("RLA", ZeroPage, 5),
    op("PLP", Implied, 4), op("AND", Immediate, 2), op("ROL", Accumulator, 2), un("ANC", Immediate, 2),
    op("BIT", Absolute, 4), op("AND", Absolute, 4), op("ROL", Absolute, 6), un("RLA", Absolute, 6),
    // 0x30
    op("BMI", Relative, 2), op_p("AND", IndirectIndexed, 5), KIL, un("RLA", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("AND", ZeroPageX, 4), op("ROL", ZeroPageX, 6), un("RLA", ZeroPageX, 6),
    op("SEC", Implied, 2), op_p("AND", AbsoluteY, 4), un("NOP", Implied, 2), un("RLA", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("AND", AbsoluteX, 4), op("ROL", AbsoluteX, 7), un("RLA", AbsoluteX, 7),
    // 0x40
    op("RTI", Implied, 6), op("EOR", IndexedIndirect, 6), KIL, un("SRE", IndexedIndirect, 8),
    un("NOP", ZeroPage, 3), op("EOR", ZeroPage, 3), op("LSR", ZeroPage, 5), un("SRE", ZeroPage, 5),
    op("PHA", Implied, 3), op("EOR", Immediate, 2), op("LSR", Accumulator, 2), un("ALR", Immediate, 2),
    op("JMP", Absolute, 3), op("EOR", Absolute, 4), op("LSR", Absolute, 6), un("SRE", Absolute, 6),
    // 0x50
    op("BVC", Relative, 2), op_p("EOR", IndirectIndexed, 5), KIL, un("SRE", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("EOR", ZeroPageX, 4), op("LSR", ZeroPageX, 6), un("SRE", ZeroPageX, 6),
    op("CLI", Implied, 2), op_p("EOR", AbsoluteY, 4), un("NOP", Implied, 2), un("SRE", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("EOR", AbsoluteX, 4), op("LSR", AbsoluteX, 7), un("SRE", AbsoluteX, 7),
    // 0x60
    op("RTS", Implied, 6), op("ADC", IndexedIndirect, 6), KIL, un("RRA", IndexedIndirect, 8),
    un("NOP", ZeroPage, 3), op("ADC", ZeroPage, 3), op("ROR", ZeroPage, 5), un("RRA", ZeroPage, 5),
    op("PLA", Implied, 4), op("ADC", Immediate, 2), op("ROR", Accumulator, 2), un("ARR", Immediate, 2),
    op("JMP", Indirect, 5), op("ADC", Absolute, 4), op("ROR", Absolute, 6), un("RRA", Absolute, 6),
    // 0x70
    op("BVS", Relative, 2), op_p("ADC", IndirectIndexed, 5), KIL, un("RRA", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("ADC", ZeroPageX, 4), op("ROR", ZeroPageX, 6), un("RRA", ZeroPageX, 6),
    op("SEI", Implied, 2), op_p("ADC", AbsoluteY, 4), un("NOP", Implied, 2), un("RRA", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("ADC", AbsoluteX, 4), op("ROR", AbsoluteX, 7), un("RRA", AbsoluteX, 7),
    // 0x80
    un("NOP", Immediate, 2), op("STA", IndexedIndirect, 6), un("NOP", Immediate, 2), un("SAX", IndexedIndirect, 6),
    op("STY", ZeroPage, 3), op("STA", ZeroPage, 3), op("STX", ZeroPage, 3), un("SAX", ZeroPage, 3),
    op("DEY", Implied, 2), un("NOP", Immediate, 2), op("TXA", Implied, 2), un("XAA", Immediate, 2),
    op("STY", Absolute, 4), op("STA", Absolute, 4), op("STX", Absolute, 4), un("SAX", Absolute, 4),
    // 0x90
    op("BCC", Relative, 2), op("STA", IndirectIndexed, 6), KIL, un("AHX", IndirectIndexed, 6),
    op("STY", ZeroPageX, 4), op("STA", ZeroPageX, 4), op("STX", ZeroPageY, 4), un("SAX", ZeroPageY, 4),
    op("TYA", Implied, 2), op("STA", AbsoluteY, 5), op("TXS", Implied, 2), un("TAS", AbsoluteY, 5),
    un("SHY", AbsoluteX, 5), op("STA", AbsoluteX, 5), un("SHX", AbsoluteY, 5), un("AHX", AbsoluteY, 5),
    // 0xA0
    op("LDY", Immediate, 2), op("LDA", IndexedIndirect, 6), op("LDX", Immediate, 2), un("LAX", IndexedIndirect, 6),
    op("LDY", ZeroPage, 3), op("LDA", ZeroPage, 3), op("LDX", ZeroPage, 3), un("LAX", ZeroPage, 3),
    op("TAY", Implied, 2), op("LDA", Immediate, 2), op("TAX", Implied, 2), un("LAX", Immediate, 2),
    op("LDY", Absolute, 4), op("LDA", Absolute, 4), op("LDX", Absolute, 4), un("LAX", Absolute, 4),
    // 0xB0
    op("BCS", Relative, 2), op_p("LDA", IndirectIndexed, 5), KIL, un_p("LAX", IndirectIndexed, 5),
    op("LDY", ZeroPageX, 4), op("LDA", ZeroPageX, 4), op("LDX", ZeroPageY, 4), un("LAX", ZeroPageY, 4),
    op("CLV", Implied, 2), op_p("LDA", AbsoluteY, 4), op("TSX", Implied, 2), un_p("LAS", AbsoluteY, 4),
    op_p("LDY", AbsoluteX, 4), op_p("LDA", AbsoluteX, 4), op_p("LDX", AbsoluteY, 4), un_p("LAX", AbsoluteY, 4),
    // 0xC0
    op("CPY", Immediate, 2), op("CMP", IndexedIndirect, 6), un("NOP", Immediate, 2), un("DCP", IndexedIndirect, 8),
    op("CPY", ZeroPage, 3), op("CMP", ZeroPage, 3), op("DEC", ZeroPage, 5), un("DCP", ZeroPage, 5),
    op("INY", Implied, 2), op("CMP", Immediate, 2), op("DEX", Implied, 2), un("AXS", Immediate, 2),
    op("CPY", Absolute, 4), op("CMP", Absolute, 4), op("DEC", Absolute, 6), un("DCP", Absolute, 6),
    // 0xD0
    op("BNE", Relative, 2), op_p("CMP", IndirectIndexed, 5), KIL, un("DCP", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("CMP", ZeroPageX, 4), op("DEC", ZeroPageX, 6), un("DCP", ZeroPageX, 6),
    op("CLD", Implied, 2), op_p("CMP", AbsoluteY, 4), un("NOP", Implied, 2), un("DCP", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("CMP", AbsoluteX, 4), op("DEC", AbsoluteX, 7), un("DCP", AbsoluteX, 7),
    // 0xE0
    op("CPX", Immediate, 2), op("SBC", IndexedIndirect, 6), un("NOP", Immediate, 2), un("ISC", IndexedIndirect, 8),
    op("CPX", ZeroPage, 3), op("SBC", ZeroPage, 3), op("INC", ZeroPage, 5), un("ISC", ZeroPage, 5),
    op("INX", Implied, 2), op("SBC", Immediate, 2), op("NOP", Implied, 2), un("SBC", Immediate, 2),
    op("CPX", Absolute, 4), op("SBC", Absolute, 4), op("INC", Absolute, 6), un("ISC", Absolute, 6),
    // 0xF0
    op("BEQ", Relative, 2), op_p("SBC", IndirectIndexed, 5), KIL, un("ISC", IndirectIndexed, 8),
    un("NOP", ZeroPageX, 4), op("SBC", ZeroPageX, 4), op("INC", ZeroPageX, 6), un("ISC", ZeroPageX, 6),
    op("SED", Implied, 2), op_p("SBC", AbsoluteY, 4), un("NOP", Implied, 2), un("ISC", AbsoluteY, 7),
    un_p("NOP", AbsoluteX, 4), op_p("SBC", AbsoluteX, 4), op("INC", AbsoluteX, 7), un("ISC", AbsoluteX, 7),
];
