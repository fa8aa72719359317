//! Two-pass assembler for the `mos6502` simulator: turns 6502 assembly
//! source text into the 64 KiB memory image the interpreter executes.
//! Source flows through lexical cleanup, constant resolution, then a
//! single left-to-right pass that resolves labels and directives and
//! encodes instructions while recording forward references, which a
//! second pass backpatches.

mod directives;
mod encoder;
pub mod error;
mod lexer;
mod numeric;
mod opcodes;
mod operand;
mod reserved;
pub mod source_map;
mod symbols;
mod trackers;

pub use error::Error;
pub use source_map::{SourceMap, SourceMapItem};
pub use symbols::SymbolTable;

use encoder::Arity;
use lexer::Token;
use mos6502::constants::PROGRAM_AREA_START;
use mos6502::memory::Memory;
use mos6502::processor::addressing::Mnemonic;
use trackers::Trackers;

/// The outcome of a successful assemble: the memory image and a map back
/// to source lines.
pub struct Assembled {
    pub memory: Memory,
    pub source_map: SourceMap,
}

/// Assembles `source` starting pass 1's emit pointer at the default
/// program area (`0x8000`) unless the source itself contains an
/// `ORG`/`.ORG` directive first.
pub fn assemble(source: &str) -> Result<Assembled, Error> {
    assemble_from(source, PROGRAM_AREA_START)
}

/// As [`assemble`], but with an explicit starting emit pointer.
pub fn assemble_from(source: &str, origin: u16) -> Result<Assembled, Error> {
    let mut tokens = lexer::tokenize(source);
    let mut symbols = SymbolTable::new();
    resolve_constants(&mut tokens, &mut symbols)?;

    let mut memory = Memory::new();
    let mut trackers = Trackers::new();
    let mut source_map = SourceMap::new();
    let mut emit: u16 = origin;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let text = token.text.as_str();
        let line = token.line;
        let upper = text.to_uppercase();

        if let Some(name) = text.strip_suffix(':') {
            symbols.define_label(name, emit)?;
            i += 1;
            continue;
        }

        if upper == "ORG" || upper == ".ORG" {
            let operand = tokens
                .get(i + 1)
                .map(|t| t.text.as_str())
                .ok_or(Error::OrgMissing)?;
            emit = directives::resolve_org(operand, &symbols)?;
            i += 2;
            continue;
        }

        if upper == ".DB" {
            let operand = next_token(&tokens, i + 1)?;
            let start = emit;
            directives::emit_db(operand, &symbols, &mut memory, &mut emit, &mut trackers)?;
            source_map.push(SourceMapItem {
                address: start,
                len: (emit - start) as u8,
                line,
            });
            i += 2;
            continue;
        }

        if upper == ".DW" {
            let operand = next_token(&tokens, i + 1)?;
            let start = emit;
            directives::emit_dw(operand, &symbols, &mut memory, &mut emit, &mut trackers)?;
            source_map.push(SourceMapItem {
                address: start,
                len: (emit - start) as u8,
                line,
            });
            i += 2;
            continue;
        }

        let mnemonic = opcodes::parse_mnemonic(text)
            .ok_or_else(|| Error::UnknownInstruction(text.to_string()))?;
        let start = emit;
        i = encode_statement(mnemonic, &tokens, i, &symbols, &mut memory, &mut emit, &mut trackers)?;
        source_map.push(SourceMapItem {
            address: start,
            len: (emit - start) as u8,
            line,
        });
    }

    encoder::fixup(&mut trackers, &symbols, &mut memory)?;

    Ok(Assembled { memory, source_map })
}

fn next_token<'a>(tokens: &'a [Token], idx: usize) -> Result<&'a str, Error> {
    tokens
        .get(idx)
        .map(|t| t.text.as_str())
        .ok_or(Error::OperandParse(String::new()))
}

/// Encodes one instruction statement starting at `tokens[i]` (the
/// mnemonic), returning the index of the next unconsumed token.
fn encode_statement(
    mnemonic: Mnemonic,
    tokens: &[Token],
    i: usize,
    symbols: &SymbolTable,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<usize, Error> {
    use mos6502::processor::addressing::AddressingMode;

    match encoder::arity(mnemonic) {
        Arity::Implied => {
            encoder::encode_implied(mnemonic, AddressingMode::Implied, memory, emit)?;
            Ok(i + 1)
        }
        Arity::OptionalAccumulator => {
            let has_operand = tokens
                .get(i + 1)
                .map(|t| !encoder::looks_like_new_statement(&t.text))
                .unwrap_or(false);
            if has_operand {
                let operand = &tokens[i + 1].text;
                encoder::encode_operand_instruction(mnemonic, operand, symbols, memory, emit, trackers)?;
                Ok(i + 2)
            } else {
                encoder::encode_implied(mnemonic, AddressingMode::Accumulator, memory, emit)?;
                Ok(i + 1)
            }
        }
        Arity::Required => {
            let operand = next_token(tokens, i + 1)?;
            if opcodes::is_branch(mnemonic) {
                encoder::encode_branch(mnemonic, operand, symbols, memory, emit, trackers)?;
            } else {
                encoder::encode_operand_instruction(mnemonic, operand, symbols, memory, emit, trackers)?;
            }
            Ok(i + 2)
        }
    }
}

/// Constant resolution: scans for `DEFINE <name> <value>` and
/// `<name> = <value>` / `<name> EQU <value>`, evaluating each and removing
/// the defining tokens in place so the remaining stream holds only labels,
/// directives, and instructions.
fn resolve_constants(tokens: &mut Vec<Token>, symbols: &mut SymbolTable) -> Result<(), Error> {
    let mut i = 0;
    while i < tokens.len() {
        let upper = tokens[i].text.to_uppercase();

        if upper == "DEFINE" && i + 2 < tokens.len() {
            let name = tokens[i + 1].text.clone();
            let value = tokens[i + 2].text.clone();
            define_constant(&name, &value, symbols)?;
            tokens.drain(i..i + 3);
            continue;
        }

        if i + 2 < tokens.len() {
            let op = tokens[i + 1].text.to_uppercase();
            if tokens[i + 1].text == "=" || op == "EQU" {
                let name = tokens[i].text.clone();
                let value = tokens[i + 2].text.clone();
                define_constant(&name, &value, symbols)?;
                tokens.drain(i..i + 3);
                continue;
            }
        }

        i += 1;
    }
    Ok(())
}

fn define_constant(name: &str, value_expr: &str, symbols: &mut SymbolTable) -> Result<(), Error> {
    let value = symbols.add_value(value_expr)?;
    symbols.define_constant(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte(memory: &Memory, addr: u16) -> u8 {
        memory.read(addr).expect("expected a defined byte")
    }

    #[test]
    fn scenario_adc_and_store() {
        let asm = assemble("LDA #$05\nADC #$03\nSTA $10\nBRK\n").unwrap();
        assert_eq!(byte(&asm.memory, PROGRAM_AREA_START), 0xA9);
        assert_eq!(byte(&asm.memory, PROGRAM_AREA_START + 1), 0x05);
    }

    #[test]
    fn scenario_loop_with_inferred_label() {
        let asm = assemble("LDX #$00\nLOOP: INX\nCPX #$05\nBNE LOOP\nBRK\n").unwrap();
        // INX is at origin+2 (after LDX #$00); BNE's branch byte follows its opcode.
        let bne_opcode_addr = PROGRAM_AREA_START + 2 + 1 + 2; // INX, CPX #$05
        assert_eq!(byte(&asm.memory, bne_opcode_addr), 0xD0);
    }

    #[test]
    fn scenario_define_constant_used_as_address() {
        let asm = assemble("DEFINE PTR $0200\nLDA #$FF\nSTA PTR\nBRK\n").unwrap();
        let sta_operand_addr = PROGRAM_AREA_START + 2 + 1;
        assert_eq!(
            asm.memory.read_u16(sta_operand_addr),
            0x0200
        );
    }

    #[test]
    fn unresolved_forward_label_is_an_error() {
        let result = assemble("JMP LATER\n");
        match result {
            Err(Error::LabelNotFound(_)) => {}
            other => panic!("expected LabelNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bcd_wrap_source_assembles() {
        let asm = assemble("LDA #$99\nSED\nCLC\nADC #$01\nBRK\n").unwrap();
        assert_eq!(byte(&asm.memory, PROGRAM_AREA_START), 0xA9);
    }

    #[test]
    fn org_directive_repoints_emit_pointer() {
        let asm = assemble(".ORG $FFFC\n.DW START\n.ORG $8000\nSTART: LDA #$41\nOUT\nHLT\n").unwrap();
        assert_eq!(asm.memory.read_u16(0xFFFC), 0x8000);
        assert_eq!(byte(&asm.memory, 0x8000), 0xA9);
    }

    #[test]
    fn reserved_word_cannot_be_redefined_as_constant() {
        let result = assemble("DEFINE LDA $10\nBRK\n");
        match result {
            Err(Error::ReservedWord(_)) => {}
            other => panic!("expected ReservedWord, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn org_with_no_argument_is_an_org_missing_error() {
        let result = assemble("ORG\n");
        assert_eq!(result.err(), Some(Error::OrgMissing));
    }

    #[test]
    fn undefined_constant_reference_in_a_define_is_an_error() {
        let result = assemble("DEFINE PTR NOWHERE\nBRK\n");
        match result {
            Err(Error::ConstantNotDefined(ref name)) if name == "NOWHERE" => {}
            other => panic!("expected ConstantNotDefined, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn dangling_plus_with_no_offset_is_an_add_value_error() {
        let result = assemble("DEFINE PTR $10+\nBRK\n");
        match result {
            Err(Error::AddValue(_)) => {}
            other => panic!("expected AddValue, got {:?}", other.map(|_| ())),
        }
    }
}
