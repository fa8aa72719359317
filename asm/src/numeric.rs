//! Numeric literal parsing and formatting for the assembler's minimal
//! expression language: decimal (no prefix), hex (`$`), and binary (`%`)
//! literals, plus the base-preserving arithmetic constant resolution needs.

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Base {
    Decimal,
    Hex,
    Binary,
}

impl Base {
    pub fn prefix(self) -> &'static str {
        match self {
            Base::Decimal => "",
            Base::Hex => "$",
            Base::Binary => "%",
        }
    }

    fn radix(self) -> u32 {
        match self {
            Base::Decimal => 10,
            Base::Hex => 16,
            Base::Binary => 2,
        }
    }
}

/// A resolved value, kept together with the base it was written in so a
/// later `<`/`>` selector or continuation renders in the same style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Value {
    pub number: u32,
    pub base: Base,
    /// True if the literal as written visibly exceeded 0xFF; drives
    /// whether constant arithmetic masks to 8 or 16 bits.
    pub wide: bool,
}

impl Value {
    pub fn new(number: u32, base: Base) -> Value {
        Value {
            number,
            base,
            wide: number > 0xFF,
        }
    }

    pub fn format(self) -> String {
        match self.base {
            Base::Decimal => format!("{}", self.number),
            Base::Hex => format!("${:X}", self.number),
            Base::Binary => format!("%{:b}", self.number),
        }
    }
}

/// Parses a bare numeric literal (`$`/`%`-prefixed or plain decimal). Does
/// not consult the constant table; use [`crate::symbols::SymbolTable`] for
/// identifiers.
pub fn parse_literal(text: &str) -> Option<Value> {
    let (base, digits) = if let Some(rest) = text.strip_prefix('$') {
        (Base::Hex, rest)
    } else if let Some(rest) = text.strip_prefix('%') {
        (Base::Binary, rest)
    } else {
        (Base::Decimal, text)
    };

    if digits.is_empty() {
        return None;
    }

    u32::from_str_radix(digits, base.radix())
        .ok()
        .map(|number| Value::new(number, base))
}

/// Splits a constant expression (`i` optionally followed by a
/// `+offset`/`-offset` continuation) into its base identifier and the
/// signed offset term, if any.
pub fn split_continuation(expr: &str) -> (&str, Option<(i64, &str)>) {
    for (idx, ch) in expr.char_indices().skip(1) {
        if ch == '+' || ch == '-' {
            let sign = if ch == '+' { 1 } else { -1 };
            return (&expr[..idx], Some((sign, &expr[idx + 1..])));
        }
    }
    (expr, None)
}

/// Applies a high (`>`) or low (`<`) byte selector to a resolved value.
pub fn select_byte(value: u32, selector: Option<char>) -> Result<u32, Error> {
    match selector {
        None => Ok(value),
        Some('<') => Ok(value & 0xFF),
        Some('>') => Ok((value >> 8) & 0xFF),
        Some(_) => Err(Error::HighLowByteArg),
    }
}
