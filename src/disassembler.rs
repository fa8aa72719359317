//! Reverse-maps the opcode table back into mnemonic text, and renders a
//! memory dump that keeps unwritten cells visually distinct from cells
//! written as zero.

use crate::memory::Memory;
use crate::processor::addressing::{self, AddressingMode, Mnemonic};
use std::fmt::Write as _;

fn mnemonic_text(mnemonic: Mnemonic) -> &'static str {
    use Mnemonic::*;
    match mnemonic {
        ADC => "ADC", AND => "AND", ASL => "ASL", BCC => "BCC", BCS => "BCS",
        BEQ => "BEQ", BIT => "BIT", BMI => "BMI", BNE => "BNE", BPL => "BPL",
        BRK => "BRK", BVC => "BVC", BVS => "BVS", CLC => "CLC", CLD => "CLD",
        CLI => "CLI", CLV => "CLV", CMP => "CMP", CPX => "CPX", CPY => "CPY",
        DEC => "DEC", DEX => "DEX", DEY => "DEY", EOR => "EOR", INC => "INC",
        INX => "INX", INY => "INY", JMP => "JMP", JSR => "JSR", LDA => "LDA",
        LDX => "LDX", LDY => "LDY", LSR => "LSR", NOP => "NOP", ORA => "ORA",
        PHA => "PHA", PHP => "PHP", PLA => "PLA", PLP => "PLP", ROL => "ROL",
        ROR => "ROR", RTI => "RTI", RTS => "RTS", SBC => "SBC", SEC => "SEC",
        SED => "SED", SEI => "SEI", STA => "STA", STX => "STX", STY => "STY",
        TAX => "TAX", TAY => "TAY", TSX => "TSX", TXA => "TXA", TXS => "TXS",
        TYA => "TYA", HLT => "HLT", OUT => "OUT", OUY => "OUY", IN => "IN",
        WAI => "WAI",
    }
}

/// One decoded instruction: its address, raw bytes, and rendered text.
pub struct DisassembledLine {
    pub address: u16,
    pub bytes: Vec<u8>,
    pub text: String,
}

fn format_operand(mode: AddressingMode, memory: &Memory, operand_addr: u16) -> String {
    use AddressingMode::*;
    match mode {
        Implied => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${:02X}", memory.read_or_zero(operand_addr)),
        ZeroPage => format!("${:02X}", memory.read_or_zero(operand_addr)),
        ZeroPageX => format!("${:02X},X", memory.read_or_zero(operand_addr)),
        ZeroPageY => format!("${:02X},Y", memory.read_or_zero(operand_addr)),
        Absolute => format!("${:04X}", memory.read_u16(operand_addr)),
        AbsoluteX => format!("${:04X},X", memory.read_u16(operand_addr)),
        AbsoluteY => format!("${:04X},Y", memory.read_u16(operand_addr)),
        Indirect => format!("(${:04X})", memory.read_u16(operand_addr)),
        IndirectX => format!("(${:02X},X)", memory.read_or_zero(operand_addr)),
        IndirectY => format!("(${:02X}),Y", memory.read_or_zero(operand_addr)),
        Relative => {
            let offset = memory.read_or_zero(operand_addr) as i8;
            let target = (operand_addr.wrapping_add(1) as i32 + offset as i32) as u16;
            format!("${:04X}", target)
        }
    }
}

/// Disassembles one instruction at `address`. Returns `None` if the opcode
/// cell itself is unwritten or holds a byte with no defined meaning.
pub fn disassemble_one(memory: &Memory, address: u16) -> Option<DisassembledLine> {
    let byte = memory.read(address)?;
    let (mnemonic, mode) = addressing::decode(byte)?;
    let operand_addr = address.wrapping_add(1);
    let operand_len = mode.operand_len();

    let mut bytes = vec![byte];
    for offset in 0..operand_len {
        bytes.push(memory.read_or_zero(operand_addr.wrapping_add(offset)));
    }

    let operand_text = format_operand(mode, memory, operand_addr);
    let text = if operand_text.is_empty() {
        mnemonic_text(mnemonic).to_string()
    } else {
        format!("{} {}", mnemonic_text(mnemonic), operand_text)
    };

    Some(DisassembledLine {
        address,
        bytes,
        text,
    })
}

/// Renders a contiguous range of memory as a hex dump, sixteen bytes per
/// row, with unwritten cells shown as `--` rather than `00` so a reader
/// can tell "never assembled here" from "assembled to zero".
pub fn hex_dump(memory: &Memory, start: u16, end: u16) -> String {
    let mut out = String::new();
    let mut address = start;
    loop {
        let row_start = address;
        let _ = write!(out, "{:04X}:", row_start);
        for col in 0..16u32 {
            let cell_addr = row_start.wrapping_add(col as u16);
            match memory.read(cell_addr) {
                Some(byte) => {
                    let _ = write!(out, " {:02X}", byte);
                }
                None => {
                    out.push_str(" --");
                }
            }
            if cell_addr == end {
                break;
            }
        }
        out.push('\n');

        if address.checked_add(16).is_none() || row_start.wrapping_add(15) >= end {
            break;
        }
        address = address.wrapping_add(16);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_an_immediate_load() {
        let mut memory = Memory::new();
        memory.write(0x8000, 0xA9); // LDA #$2A
        memory.write(0x8001, 0x2A);

        let line = disassemble_one(&memory, 0x8000).unwrap();
        assert_eq!(line.text, "LDA #$2A");
        assert_eq!(line.bytes, vec![0xA9, 0x2A]);
    }

    #[test]
    fn disassembles_a_relative_branch_to_its_target_address() {
        let mut memory = Memory::new();
        memory.write(0x9000, 0xD0); // BNE $9010
        memory.write(0x9001, 0x0E);

        let line = disassemble_one(&memory, 0x9000).unwrap();
        assert_eq!(line.text, "BNE $9010");
    }

    #[test]
    fn an_unwritten_opcode_cell_has_no_disassembly() {
        let memory = Memory::new();
        assert!(disassemble_one(&memory, 0x8000).is_none());
    }

    #[test]
    fn an_undocumented_opcode_byte_has_no_disassembly() {
        let mut memory = Memory::new();
        memory.write(0x8000, 0x03); // never assigned
        assert!(disassemble_one(&memory, 0x8000).is_none());
    }

    #[test]
    fn hex_dump_distinguishes_unwritten_from_zero() {
        let mut memory = Memory::new();
        memory.write(0x0000, 0x00);
        let dump = hex_dump(&memory, 0x0000, 0x000F);
        let first_row = dump.lines().next().unwrap();
        assert!(first_row.contains(" 00"));
        assert!(first_row.contains(" --"));
    }
}
