//! Data directives: `ORG`/`.ORG` repoints the emit pointer; `.DB`/`.DW`
//! emit literal, string, constant, or label-derived bytes.

use crate::error::Error;
use crate::numeric;
use crate::operand::{resolve_inner, split_selector, Resolved};
use crate::symbols::SymbolTable;
use crate::trackers::{ForwardRef, Trackers};
use mos6502::memory::Memory;

/// `ORG <addr>` / `.ORG <addr>`: the argument must resolve to a number
/// right away — labels aren't permitted, only constants and literals.
pub fn resolve_org(token: &str, symbols: &SymbolTable) -> Result<u16, Error> {
    match resolve_inner(token, symbols)? {
        Resolved::Value(v) => {
            if v.number > 0xFFFF {
                return Err(Error::OrgArgInvalid(token.to_string()));
            }
            Ok(v.number as u16)
        }
        Resolved::Forward(_) => Err(Error::OrgArgInvalid(token.to_string())),
    }
}

/// Splits a compacted `.DB`/`.DW` operand token into its comma-separated
/// items, without splitting inside a quoted string literal (the lexer
/// already turned embedded spaces into `",32,"`, which stays inside the
/// quotes as far as this splitter is concerned).
fn split_items(token: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;

    for ch in token.chars() {
        match in_quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    in_quote = None;
                }
            }
            None if ch == '\'' || ch == '"' => {
                in_quote = Some(ch);
                current.push(ch);
            }
            None if ch == ',' => items.push(std::mem::take(&mut current)),
            None => current.push(ch),
        }
    }
    items.push(current);
    items
}

/// Decodes a quoted string literal item into its byte sequence: one byte
/// per character code, with the `",32,"` in-string-space marker folded
/// back into an actual space byte. An item with no closing quote at all is
/// `DataUnclosedString`; one with stray characters tacked on after the
/// closing quote (e.g. a missing comma before the next item) is
/// `DataMalformedAfterString`.
fn decode_string(item: &str) -> Result<Vec<u8>, Error> {
    let quote = item.chars().next().ok_or(Error::DataUnclosedString)?;
    if quote != '\'' && quote != '"' {
        return Err(Error::DataMalformed(item.to_string()));
    }

    let closing = item[1..]
        .find(quote)
        .map(|idx| idx + 1)
        .ok_or(Error::DataUnclosedString)?;
    if closing != item.len() - 1 {
        return Err(Error::DataMalformedAfterString);
    }

    let inner = &item[1..closing];
    let restored = inner.replace(",32,", " ");
    Ok(restored.bytes().collect())
}

fn is_quoted(item: &str) -> bool {
    item.starts_with('\'') || item.starts_with('"')
}

/// Resolves a non-string `.DB`/`.DW` item to either a concrete byte/word
/// value or a forward label reference.
fn resolve_item(item: &str, symbols: &SymbolTable) -> Result<(Option<u32>, Option<String>, Option<char>), Error> {
    let (selector, inner) = split_selector(item);
    match resolve_inner(inner, symbols)? {
        Resolved::Value(v) => {
            let value = numeric::select_byte(v.number, selector)?;
            Ok((Some(value), None, selector))
        }
        Resolved::Forward(symbol) => Ok((None, Some(symbol), selector)),
    }
}

/// Emits a `.DB` operand list, advancing `emit` and populating `trackers`
/// for any label item.
pub fn emit_db(
    operand: &str,
    symbols: &SymbolTable,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<(), Error> {
    for item in split_items(operand) {
        if is_quoted(&item) {
            for byte in decode_string(&item)? {
                memory.write(*emit, byte);
                *emit = emit.wrapping_add(1);
            }
            continue;
        }

        let (value, forward, selector) = resolve_item(&item, symbols)?;
        match value {
            Some(v) => {
                memory.write(*emit, v as u8);
                *emit = emit.wrapping_add(1);
            }
            None => {
                let symbol = forward.unwrap();
                let selector = selector.unwrap_or('<');
                trackers.push(ForwardRef::Byte {
                    address: *emit,
                    expr: symbol,
                    selector,
                });
                *emit = emit.wrapping_add(1);
            }
        }
    }
    Ok(())
}

/// Emits a `.DW` operand list: every item is exactly two bytes,
/// little-endian; `<`/`>` selectors are forbidden.
pub fn emit_dw(
    operand: &str,
    symbols: &SymbolTable,
    memory: &mut Memory,
    emit: &mut u16,
    trackers: &mut Trackers,
) -> Result<(), Error> {
    for item in split_items(operand) {
        if is_quoted(&item) {
            return Err(Error::DataMalformed(item));
        }
        if item.starts_with('<') || item.starts_with('>') {
            return Err(Error::DataHighLowOnWord);
        }

        match resolve_inner(&item, symbols)? {
            Resolved::Value(v) => {
                memory.write_u16(*emit, v.number as u16);
                *emit = emit.wrapping_add(2);
            }
            Resolved::Forward(symbol) => {
                trackers.push(ForwardRef::Word {
                    address: *emit,
                    expr: symbol,
                });
                *emit = emit.wrapping_add(2);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_items_without_breaking_a_compacted_string() {
        let items = split_items("\"HI,32,THERE\",10,$20");
        assert_eq!(items, vec!["\"HI,32,THERE\"", "10", "$20"]);
    }

    #[test]
    fn decodes_a_compacted_string_literal() {
        let bytes = decode_string("\"HI,32,THERE\"").unwrap();
        assert_eq!(bytes, b"HI THERE");
    }

    #[test]
    fn unterminated_string_is_data_unclosed_string() {
        assert_eq!(decode_string("\"HI"), Err(Error::DataUnclosedString));
    }

    #[test]
    fn trailing_garbage_after_the_closing_quote_is_malformed_after_string() {
        assert_eq!(
            decode_string("\"HI\"X"),
            Err(Error::DataMalformedAfterString)
        );
    }

    #[test]
    fn emits_a_string_followed_by_a_numeric_byte() {
        let symbols = SymbolTable::new();
        let mut memory = Memory::new();
        let mut trackers = Trackers::new();
        let mut emit = 0x8000u16;

        emit_db("\"HI\",10", &symbols, &mut memory, &mut emit, &mut trackers).unwrap();

        assert_eq!(memory.read(0x8000), Some(b'H'));
        assert_eq!(memory.read(0x8001), Some(b'I'));
        assert_eq!(memory.read(0x8002), Some(10));
        assert_eq!(emit, 0x8003);
        assert!(trackers.is_empty());
    }

    #[test]
    fn db_defers_an_undefined_label_with_a_default_selector() {
        let symbols = SymbolTable::new();
        let mut memory = Memory::new();
        let mut trackers = Trackers::new();
        let mut emit = 0x8000u16;

        emit_db("TARGET", &symbols, &mut memory, &mut emit, &mut trackers).unwrap();

        let entries = trackers.drain();
        match &entries[0] {
            ForwardRef::Byte { selector, expr, .. } => {
                assert_eq!(*selector, '<');
                assert_eq!(expr, "TARGET");
            }
            other => panic!("expected a deferred byte, got {:?}", other),
        }
    }

    #[test]
    fn dw_rejects_a_high_low_selector() {
        let symbols = SymbolTable::new();
        let mut memory = Memory::new();
        let mut trackers = Trackers::new();
        let mut emit = 0x8000u16;

        let result = emit_dw("<$1234", &symbols, &mut memory, &mut emit, &mut trackers);
        assert_eq!(result, Err(Error::DataHighLowOnWord));
    }

    #[test]
    fn dw_writes_a_little_endian_word() {
        let symbols = SymbolTable::new();
        let mut memory = Memory::new();
        let mut trackers = Trackers::new();
        let mut emit = 0x8000u16;

        emit_dw("$1234", &symbols, &mut memory, &mut emit, &mut trackers).unwrap();
        assert_eq!(memory.read_u16(0x8000), 0x1234);
        assert_eq!(emit, 0x8002);
    }
}
