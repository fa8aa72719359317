//! The constant table and label table: insertion-order-independent maps
//! from identifier to value, sharing one uniqueness rule
//! — a name is at most one of reserved, constant, or label.

use crate::error::Error;
use crate::numeric::{split_continuation, Value};
use crate::reserved::is_reserved;
use std::collections::HashMap;

#[derive(Default)]
pub struct SymbolTable {
    constants: HashMap<String, Value>,
    labels: HashMap<String, u16>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn constant(&self, name: &str) -> Option<Value> {
        self.constants.get(name).copied()
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn is_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Inserts a new constant: the name must not be reserved, must not
    /// already appear in the label table, and must not already be a
    /// constant.
    pub fn define_constant(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if is_reserved(name) {
            return Err(Error::ReservedWord(name.to_string()));
        }
        if self.labels.contains_key(name) {
            return Err(Error::LabelAndConstant(name.to_string()));
        }
        if self.constants.contains_key(name) {
            return Err(Error::ConstantAlreadyDefined(name.to_string()));
        }
        self.constants.insert(name.to_string(), value);
        Ok(())
    }

    /// Inserts a label at the current emit address.
    pub fn define_label(&mut self, name: &str, address: u16) -> Result<(), Error> {
        if is_reserved(name) {
            return Err(Error::ReservedWord(name.to_string()));
        }
        if self.constants.contains_key(name) {
            return Err(Error::LabelAndConstant(name.to_string()));
        }
        if self.labels.contains_key(name) {
            return Err(Error::LabelAlreadyDefined(name.to_string()));
        }
        self.labels.insert(name.to_string(), address);
        Ok(())
    }

    /// Resolves `i` (substituting a constant if named), applies an
    /// optional `+`/`-` continuation parsed from the
    /// same token, and masks to 8 or 16 bits depending on whether either
    /// operand visibly exceeded 0xFF.
    pub fn add_value(&self, expr: &str) -> Result<Value, Error> {
        let (head, continuation) = split_continuation(expr);
        let base_value = self.resolve_identifier(head)?;

        match continuation {
            None => Ok(base_value),
            Some((_, tail)) if tail.is_empty() => Err(Error::AddValue(expr.to_string())),
            Some((sign, tail)) => {
                let offset_value = self.resolve_identifier(tail)?;
                let signed = base_value.number as i64 + sign * offset_value.number as i64;
                let wide = base_value.wide || offset_value.wide;
                let mask = if wide { 0xFFFF } else { 0xFF };
                let masked = (signed.rem_euclid(mask as i64 + 1)) as u32 & mask;
                Ok(Value {
                    number: masked,
                    base: base_value.base,
                    wide,
                })
            }
        }
    }

    /// Resolves a bare identifier to a value: a constant, a numeric
    /// literal, or (if neither) an error — callers that need to allow an
    /// unresolved label fall back to their own lookup before calling this.
    /// Distinguishes a reference to an undefined constant (`ConstantNotDefined`)
    /// from text that was never going to parse as a number at all
    /// (`ConvertValue`), since this method's callers never accept labels.
    pub fn resolve_identifier(&self, token: &str) -> Result<Value, Error> {
        if let Some(value) = self.constants.get(token) {
            return Ok(*value);
        }
        if let Some(value) = crate::numeric::parse_literal(token) {
            return Ok(value);
        }
        if looks_like_identifier(token) {
            Err(Error::ConstantNotDefined(token.to_string()))
        } else {
            Err(Error::ConvertValue(token.to_string()))
        }
    }
}

/// A token that reads as a name rather than an attempted numeric literal:
/// starts with an ASCII letter or underscore, not a `$`/`%` base prefix or
/// a digit.
fn looks_like_identifier(token: &str) -> bool {
    matches!(token.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
}
