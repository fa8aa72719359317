//! The encoder's opcode lookup: `(mnemonic, addressing mode) -> opcode
//! byte`. Built as the inverse of
//! [`mos6502::processor::addressing::decode`] rather than a second
//! hand-maintained table, so the assembler can never emit a byte the
//! interpreter decodes differently.

use mos6502::processor::addressing::{decode, AddressingMode, Mnemonic};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static ENCODE_TABLE: Lazy<HashMap<(Mnemonic, AddressingMode), u8>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for byte in 0u16..=255 {
        if let Some((mnemonic, mode)) = decode(byte as u8) {
            table.entry((mnemonic, mode)).or_insert(byte as u8);
        }
    }
    table
});

/// Looks up the opcode byte for a mnemonic/addressing-mode pair.
pub fn opcode_for(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    ENCODE_TABLE.get(&(mnemonic, mode)).copied()
}

/// Whether `mnemonic` has *any* encoding in `mode`, used by the addressing
/// classifier's zero-page/absolute promotion and selector collapse rules.
pub fn supports_mode(mnemonic: Mnemonic, mode: AddressingMode) -> bool {
    ENCODE_TABLE.contains_key(&(mnemonic, mode))
}

/// Parses a mnemonic token into its [`Mnemonic`] variant, case-insensitive.
pub fn parse_mnemonic(text: &str) -> Option<Mnemonic> {
    use Mnemonic::*;
    let table = [
        ("ADC", ADC), ("AND", AND), ("ASL", ASL), ("BCC", BCC), ("BCS", BCS),
        ("BEQ", BEQ), ("BIT", BIT), ("BMI", BMI), ("BNE", BNE), ("BPL", BPL),
        ("BRK", BRK), ("BVC", BVC), ("BVS", BVS), ("CLC", CLC), ("CLD", CLD),
        ("CLI", CLI), ("CLV", CLV), ("CMP", CMP), ("CPX", CPX), ("CPY", CPY),
        ("DEC", DEC), ("DEX", DEX), ("DEY", DEY), ("EOR", EOR), ("INC", INC),
        ("INX", INX), ("INY", INY), ("JMP", JMP), ("JSR", JSR), ("LDA", LDA),
        ("LDX", LDX), ("LDY", LDY), ("LSR", LSR), ("NOP", NOP), ("ORA", ORA),
        ("PHA", PHA), ("PHP", PHP), ("PLA", PLA), ("PLP", PLP), ("ROL", ROL),
        ("ROR", ROR), ("RTI", RTI), ("RTS", RTS), ("SBC", SBC), ("SEC", SEC),
        ("SED", SED), ("SEI", SEI), ("STA", STA), ("STX", STX), ("STY", STY),
        ("TAX", TAX), ("TAY", TAY), ("TSX", TSX), ("TXA", TXA), ("TXS", TXS),
        ("TYA", TYA),
        // Custom extensions.
        ("HLT", HLT), ("OUT", OUT), ("OUY", OUY), ("IN", IN), ("WAI", WAI),
    ];
    let upper = text.to_uppercase();
    table
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, m)| *m)
}

/// Whether `mnemonic` is one of the eight relative branches, which the
/// encoder handles separately from the 9-slot table.
pub fn is_branch(mnemonic: Mnemonic) -> bool {
    matches!(
        mnemonic,
        Mnemonic::BCC
            | Mnemonic::BCS
            | Mnemonic::BEQ
            | Mnemonic::BMI
            | Mnemonic::BNE
            | Mnemonic::BPL
            | Mnemonic::BVC
            | Mnemonic::BVS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_canonical_opcodes() {
        assert_eq!(
            opcode_for(Mnemonic::LDA, AddressingMode::Immediate),
            Some(0xA9)
        );
        assert_eq!(
            opcode_for(Mnemonic::STA, AddressingMode::Absolute),
            Some(0x8D)
        );
    }

    #[test]
    fn has_no_zero_page_jmp() {
        assert_eq!(opcode_for(Mnemonic::JMP, AddressingMode::ZeroPage), None);
        assert!(supports_mode(Mnemonic::JMP, AddressingMode::Absolute));
    }

    #[test]
    fn parses_case_insensitive_mnemonics() {
        assert_eq!(parse_mnemonic("lda"), Some(Mnemonic::LDA));
        assert_eq!(parse_mnemonic("Lda"), Some(Mnemonic::LDA));
    }
}
