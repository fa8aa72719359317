//! The reserved-word set: every mnemonic the interpreter decodes
//! (documented 6502 opcodes plus this simulator's five custom
//! extensions), the three directive keywords, and their dot-prefixed
//! aliases. Built from [`mos6502::processor::addressing::decode`] instead
//! of a second hand-maintained list, so the assembler and interpreter can
//! never disagree about which mnemonics exist.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static RESERVED: Lazy<HashSet<String>> = Lazy::new(|| {
    let mut set = HashSet::new();
    for byte in 0u16..=255 {
        if let Some((mnemonic, _mode)) = mos6502::processor::addressing::decode(byte as u8) {
            set.insert(format!("{:?}", mnemonic));
        }
    }
    for keyword in ["EQU", "ORG", "DEFINE", ".ORG", ".DB", ".DW"] {
        set.insert(keyword.to_string());
    }
    set
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word.to_uppercase())
}
