//! Instruction encoding and label fixup: the two halves of pass 1/pass 2
//! that turn a token stream into a memory image, once constants have been
//! resolved and the token stream has been split into statements.

use crate::error::Error;
use crate::numeric::{self, split_continuation};
use crate::opcodes;
use crate::operand::{self, Classified};
use crate::symbols::SymbolTable;
use crate::trackers::{ForwardRef, Trackers};
use mos6502::memory::Memory;
use mos6502::processor::addressing::{AddressingMode, Mnemonic};

/// How many operand tokens a mnemonic's statement consumes, decided once
/// up front so the flattened token stream can be walked purely
/// positionally.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Never takes an operand token (e.g. `NOP`, `RTS`, the flag ops).
    Implied,
    /// Always takes exactly one operand token.
    Required,
    /// Takes one operand token if the next token looks like one,
    /// otherwise implies the accumulator (`ASL`/`LSR`/`ROL`/`ROR`).
    OptionalAccumulator,
}

pub fn arity(mnemonic: Mnemonic) -> Arity {
    use Mnemonic::*;
    match mnemonic {
        TAX | TAY | TXA | TYA | TSX | TXS | INX | INY | DEX | DEY | NOP | CLC | SEC | CLD
        | SED | CLI | SEI | CLV | RTS | RTI | PHA | PHP | PLA | PLP | BRK | HLT | WAI | IN
        | OUT | OUY => Arity::Implied,
        ASL | LSR | ROL | ROR => Arity::OptionalAccumulator,
        _ => Arity::Required,
    }
}

/// Whether `token` could plausibly start a new statement rather than be
/// this instruction's operand — used by the accumulator-shift lookahead.
pub fn looks_like_new_statement(token: &str) -> bool {
    token.ends_with(':') || crate::reserved::is_reserved(token)
}

/// Encodes an implied/accumulator-only instruction: one opcode byte, no
/// operand.
pub fn encode_implied(
    mnemonic: Mnemonic,
    mode: AddressingMode,
    memory: &mut Memory,
    emit: &mut u16,
) -> Result<(), Error> {
    let opcode = opcodes::opcode_for(mnemonic, mode)
        .ok_or_else(|| Error::InvalidAddressingMode(format!("{:?}", mnemonic)))?;
    memory.write(*emit, opcode);
    *emit = emit.wrapping_add(1);
    Ok(())
}

/// Encodes a relative branch: resolves the target immediately if it's
/// already a known label, otherwise defers to the branch tracker.
pub fn encode_branch(
    mnemonic: Mnemonic,
    operand: &str,
    symbols: &SymbolTable,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<(), Error> {
    let opcode = opcodes::opcode_for(mnemonic, AddressingMode::Relative)
        .ok_or_else(|| Error::InvalidAddressingMode(format!("{:?}", mnemonic)))?;
    memory.write(*emit, opcode);
    *emit = emit.wrapping_add(1);
    let operand_addr = *emit;

    let target = if let Some(addr) = symbols.label(operand) {
        Some(addr)
    } else if let Some(v) = numeric::parse_literal(operand) {
        Some(v.number as u16)
    } else {
        None
    };

    match target {
        Some(addr) => {
            let displacement = addr as i32 - (operand_addr as i32 + 1);
            if !(-128..=127).contains(&displacement) {
                return Err(Error::BranchOutOfRange {
                    label: operand.to_string(),
                    offset: displacement,
                });
            }
            memory.write(operand_addr, displacement as i8 as u8);
        }
        None => {
            trackers.push(ForwardRef::Branch {
                address: operand_addr,
                label: operand.to_string(),
            });
        }
    }
    *emit = emit.wrapping_add(1);
    Ok(())
}

/// Encodes a normal (non-branch, non-implied) instruction: classifies the
/// operand, promotes zero-page to absolute when the
/// mnemonic has no zero-page encoding, emits the opcode, and either emits
/// the resolved operand bytes or defers them to a tracker.
pub fn encode_operand_instruction(
    mnemonic: Mnemonic,
    operand: &str,
    symbols: &SymbolTable,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<(), Error> {
    let classified = operand::classify(operand, symbols)?;
    let mode = promote_mode(mnemonic, classified.mode);

    let opcode = opcodes::opcode_for(mnemonic, mode)
        .ok_or_else(|| Error::InvalidAddressingMode(format!("{:?} {}", mnemonic, operand)))?;
    memory.write(*emit, opcode);
    *emit = emit.wrapping_add(1);

    emit_operand_bytes(&classified, mode, memory, emit, trackers)
}

/// Zero-page → absolute promotion.
fn promote_mode(mnemonic: Mnemonic, mode: AddressingMode) -> AddressingMode {
    use AddressingMode::*;
    let promoted = match mode {
        ZeroPage => Absolute,
        ZeroPageX => AbsoluteX,
        ZeroPageY => AbsoluteY,
        other => other,
    };
    if opcodes::supports_mode(mnemonic, mode) {
        mode
    } else if opcodes::supports_mode(mnemonic, promoted) {
        promoted
    } else {
        mode
    }
}

fn emit_operand_bytes(
    classified: &Classified,
    mode: AddressingMode,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<(), Error> {
    let operand_len = mode.operand_len();

    match (classified.value, &classified.forward_symbol) {
        (Some(value), None) => {
            if operand_len == 2 {
                memory.write_u16(*emit, value as u16);
            } else if operand_len == 1 {
                memory.write(*emit, value as u8);
            }
            *emit = emit.wrapping_add(operand_len);
        }
        (None, Some(symbol)) => {
            if operand_len == 2 {
                trackers.push(ForwardRef::Word {
                    address: *emit,
                    expr: symbol.clone(),
                });
            } else if operand_len == 1 {
                let selector = classified
                    .selector
                    .ok_or_else(|| Error::LabelSingleByte(symbol.clone()))?;
                trackers.push(ForwardRef::Byte {
                    address: *emit,
                    expr: symbol.clone(),
                    selector,
                });
            }
            *emit = emit.wrapping_add(operand_len);
        }
        _ => unreachable!("classify always yields exactly one of value/forward_symbol"),
    }
    Ok(())
}

/// Pass 2: resolves every tracker entry against the now-complete label
/// table and backpatches memory. Splits off any `+offset`/
/// `-offset` suffix, applies `addValue`/`getHighLowByte`, and for branches
/// recomputes and range-checks the displacement.
pub fn fixup(trackers: &mut Trackers, symbols: &SymbolTable, memory: &mut Memory) -> Result<(), Error> {
    for entry in trackers.drain() {
        match entry {
            ForwardRef::Word { address, expr } => {
                let value = resolve_symbol_expr(&expr, symbols)?;
                memory.write_u16(address, value as u16);
            }
            ForwardRef::Byte {
                address,
                expr,
                selector,
            } => {
                let value = resolve_symbol_expr(&expr, symbols)?;
                let byte = numeric::select_byte(value, Some(selector))?;
                memory.write(address, byte as u8);
            }
            ForwardRef::Branch { address, label } => {
                let target = symbols
                    .label(&label)
                    .ok_or_else(|| Error::BranchLabelNotFound(label.clone()))?;
                let displacement = target as i32 - (address as i32 + 1);
                if !(-128..=127).contains(&displacement) {
                    return Err(Error::BranchOutOfRange {
                        label,
                        offset: displacement,
                    });
                }
                memory.write(address, displacement as i8 as u8);
            }
        }
    }
    Ok(())
}

/// Resolves a label-or-constant expression, with an optional `+`/`-`
/// continuation, against the label table.
fn resolve_symbol_expr(expr: &str, symbols: &SymbolTable) -> Result<u32, Error> {
    let (head, continuation) = split_continuation(expr);
    let head_value = symbols
        .label(head)
        .map(|addr| addr as u32)
        .or_else(|| symbols.constant(head).map(|v| v.number))
        .ok_or_else(|| Error::LabelNotFound(head.to_string()))?;

    match continuation {
        None => Ok(head_value),
        Some((sign, tail)) => {
            let tail_value = symbols
                .label(tail)
                .map(|addr| addr as u32)
                .or_else(|| symbols.constant(tail).map(|v| v.number))
                .or_else(|| numeric::parse_literal(tail).map(|v| v.number))
                .ok_or_else(|| Error::LabelNotFound(tail.to_string()))?;
            let signed = head_value as i64 + sign * tail_value as i64;
            Ok(signed.rem_euclid(0x1_0000) as u32)
        }
    }
}
