//! Runtime (interpreter-side) failures, distinct from the assembler's own
//! numbered taxonomy in `mos6502-asm`.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// A defined byte at PC with no opcode meaning: aborts execution with
    /// the offending address and byte.
    UnknownOpcode { address: u16, byte: u8 },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeError::UnknownOpcode { address, byte } => write!(
                f,
                "Unknown opcode 0x{:02X} at address 0x{:04X}",
                byte, address
            ),
        }
    }
}

impl std::error::Error for RuntimeError {}
