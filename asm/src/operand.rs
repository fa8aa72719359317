//! The addressing-mode classifier: regex-matches an operand's syntactic
//! shape, resolves its inner expression against the constant/label tables,
//! and picks between the zero-page and absolute family by magnitude,
//! leaving the true zero-page/absolute *promotion* (driven by what the
//! mnemonic actually supports) to the encoder.

use crate::error::Error;
use crate::numeric::{self, split_continuation, Value};
use crate::symbols::SymbolTable;
use mos6502::processor::addressing::AddressingMode;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_INDIRECT_X: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\((.+),X\)$").unwrap());
static RE_INDIRECT_Y: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\((.+)\),Y$").unwrap());
static RE_INDIRECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\((.+)\)$").unwrap());
static RE_INDEXED_X: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+),X$").unwrap());
static RE_INDEXED_Y: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+),Y$").unwrap());

/// The result of resolving an operand's inner expression: either a known
/// numeric value, or the name of a label not yet in the label table (a
/// forward reference).
pub(crate) enum Resolved {
    Value(Value),
    Forward(String),
}

/// The classifier's output: an addressing mode plus whatever is known
/// about the operand's value. `wide` records whether the *written* form
/// (not just the magnitude) calls for a 16-bit operand.
pub struct Classified {
    pub mode: AddressingMode,
    pub value: Option<u32>,
    pub forward_symbol: Option<String>,
    pub selector: Option<char>,
}

pub(crate) fn split_selector(text: &str) -> (Option<char>, &str) {
    if let Some(rest) = text.strip_prefix('<') {
        (Some('<'), rest)
    } else if let Some(rest) = text.strip_prefix('>') {
        (Some('>'), rest)
    } else {
        (None, text)
    }
}

/// An explicitly wide literal: a hex value with more than two digits, or a
/// binary value with more than eight bits, written out even though its
/// magnitude might fit in a byte.
fn looks_wide(token: &str) -> bool {
    if let Some(digits) = token.strip_prefix('$') {
        digits.len() > 2
    } else if let Some(digits) = token.strip_prefix('%') {
        digits.len() > 8
    } else {
        false
    }
}

pub(crate) fn resolve_inner(expr: &str, symbols: &SymbolTable) -> Result<Resolved, Error> {
    let (head, continuation) = split_continuation(expr);

    if symbols.is_constant(head) || numeric::parse_literal(head).is_some() {
        return Ok(Resolved::Value(symbols.add_value(expr)?));
    }

    if let Some(address) = symbols.label(head) {
        return match continuation {
            None => Ok(Resolved::Value(Value::new(address as u32, numeric::Base::Decimal))),
            Some((sign, tail)) => {
                let offset = symbols.resolve_identifier(tail)?;
                let signed = address as i64 + sign * offset.number as i64;
                let masked = signed.rem_euclid(0x1_0000) as u32;
                Ok(Resolved::Value(Value::new(masked, numeric::Base::Decimal)))
            }
        };
    }

    // Not yet a label or constant: assume it will become a label (a
    // forward reference) rather than erroring here; an unresolved symbol
    // at the end of pass 2 is what actually raises "label not found".
    Ok(Resolved::Forward(expr.to_string()))
}

fn zp_or_absolute(value: &Value, wide_hint: bool) -> bool {
    // Returns true for the absolute family.
    wide_hint || value.number > 0xFF
}

pub fn classify(raw: &str, symbols: &SymbolTable) -> Result<Classified, Error> {
    if raw.eq_ignore_ascii_case("A") {
        return Ok(Classified {
            mode: AddressingMode::Accumulator,
            value: None,
            forward_symbol: None,
            selector: None,
        });
    }

    if let Some(inner) = raw.strip_prefix('#') {
        let (selector, expr) = split_selector(inner);
        return match resolve_inner(expr, symbols)? {
            Resolved::Value(v) => {
                let byte = numeric::select_byte(v.number, selector)?;
                Ok(Classified {
                    mode: AddressingMode::Immediate,
                    value: Some(byte),
                    forward_symbol: None,
                    selector,
                })
            }
            Resolved::Forward(symbol) => Ok(Classified {
                mode: AddressingMode::Immediate,
                value: None,
                forward_symbol: Some(symbol),
                selector,
            }),
        };
    }

    if let Some(caps) = RE_INDIRECT_X.captures(raw) {
        return classify_inner(&caps[1], symbols, AddressingMode::IndirectX, AddressingMode::IndirectX);
    }
    if let Some(caps) = RE_INDIRECT_Y.captures(raw) {
        return classify_inner(&caps[1], symbols, AddressingMode::IndirectY, AddressingMode::IndirectY);
    }
    if let Some(caps) = RE_INDIRECT.captures(raw) {
        return classify_inner(&caps[1], symbols, AddressingMode::Indirect, AddressingMode::Indirect);
    }
    if let Some(caps) = RE_INDEXED_X.captures(raw) {
        return classify_inner(&caps[1], symbols, AddressingMode::ZeroPageX, AddressingMode::AbsoluteX);
    }
    if let Some(caps) = RE_INDEXED_Y.captures(raw) {
        return classify_inner(&caps[1], symbols, AddressingMode::ZeroPageY, AddressingMode::AbsoluteY);
    }

    // A parenthesised or comma-indexed shape that didn't match any of the
    // recognised indirect/indexed regexes above (e.g. `($10,Z)`, an
    // unbalanced `(10`) is a malformed operand, not a bare zero-page/
    // absolute value.
    if raw.contains('(') || raw.contains(',') {
        return Err(Error::OperandType(raw.to_string()));
    }

    classify_inner(raw, symbols, AddressingMode::ZeroPage, AddressingMode::Absolute)
}

/// Classifies a bare/indexed operand's inner expression (after stripping
/// any indexing/indirection wrapper), choosing between `zp_mode` and
/// `abs_mode` by magnitude: zero-page forms are preferred when the value
/// fits, otherwise promote to absolute.
fn classify_inner(
    expr: &str,
    symbols: &SymbolTable,
    zp_mode: AddressingMode,
    abs_mode: AddressingMode,
) -> Result<Classified, Error> {
    let (selector, inner) = split_selector(expr);
    let wide_hint = looks_wide(inner);

    match resolve_inner(inner, symbols)? {
        Resolved::Value(v) => {
            if zp_mode == abs_mode {
                // Indirect forms: always the one shape, no zp/abs split.
                let value = numeric::select_byte(v.number, selector)?;
                return Ok(Classified {
                    mode: zp_mode,
                    value: Some(value),
                    forward_symbol: None,
                    selector,
                });
            }
            let mode = if selector.is_some() || !zp_or_absolute(&v, wide_hint) {
                zp_mode
            } else {
                abs_mode
            };
            let value = numeric::select_byte(v.number, selector)?;
            Ok(Classified {
                mode,
                value: Some(value),
                forward_symbol: None,
                selector,
            })
        }
        Resolved::Forward(symbol) => {
            // Unknown magnitude: default to the 16-bit form unless a
            // selector pins this operand to a single byte.
            let mode = if selector.is_some() || zp_mode == abs_mode {
                zp_mode
            } else {
                abs_mode
            };
            Ok(Classified {
                mode,
                value: None,
                forward_symbol: Some(symbol),
                selector,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_immediate() {
        let symbols = SymbolTable::new();
        let c = classify("#$05", &symbols).unwrap();
        assert_eq!(c.mode, AddressingMode::Immediate);
        assert_eq!(c.value, Some(5));
    }

    #[test]
    fn classifies_zero_page_vs_absolute_by_magnitude() {
        let symbols = SymbolTable::new();
        assert_eq!(classify("$10", &symbols).unwrap().mode, AddressingMode::ZeroPage);
        assert_eq!(classify("$1000", &symbols).unwrap().mode, AddressingMode::Absolute);
    }

    #[test]
    fn classifies_indexed_and_indirect_forms() {
        let symbols = SymbolTable::new();
        assert_eq!(classify("$10,X", &symbols).unwrap().mode, AddressingMode::ZeroPageX);
        assert_eq!(classify("$1000,Y", &symbols).unwrap().mode, AddressingMode::AbsoluteY);
        assert_eq!(classify("($10,X)", &symbols).unwrap().mode, AddressingMode::IndirectX);
        assert_eq!(classify("($10),Y", &symbols).unwrap().mode, AddressingMode::IndirectY);
        assert_eq!(classify("($1000)", &symbols).unwrap().mode, AddressingMode::Indirect);
    }

    #[test]
    fn unknown_label_defaults_to_absolute_unless_selected() {
        let symbols = SymbolTable::new();
        let c = classify("LATER", &symbols).unwrap();
        assert_eq!(c.mode, AddressingMode::Absolute);
        assert_eq!(c.forward_symbol.as_deref(), Some("LATER"));

        let c2 = classify("<LATER", &symbols).unwrap();
        assert_eq!(c2.mode, AddressingMode::ZeroPage);
    }

    #[test]
    fn malformed_indexed_operand_is_an_operand_type_error() {
        let symbols = SymbolTable::new();
        let result = classify("($10,Z)", &symbols);
        assert_eq!(result.err(), Some(Error::OperandType("($10,Z)".to_string())));
    }
}
