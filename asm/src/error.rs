//! The assembler's stable, numbered error taxonomy: 22 codes, each with a
//! fixed `Error #n: ...` rendering so a caller that only needs
//! the exit status can match on [`Error::code`] while a human reading the
//! log sink still gets the full sentence.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    LabelNotFound(String),
    BranchLabelNotFound(String),
    BranchOutOfRange { label: String, offset: i32 },
    OperandType(String),
    ReservedWord(String),
    ConstantAlreadyDefined(String),
    ConstantNotDefined(String),
    HighLowByteArg,
    OrgMissing,
    DataUnclosedString,
    DataMalformedAfterString,
    DataMalformed(String),
    DataHighLowOnWord,
    LabelAlreadyDefined(String),
    LabelAndConstant(String),
    UnknownInstruction(String),
    ConvertValue(String),
    AddValue(String),
    LabelSingleByte(String),
    OrgArgInvalid(String),
    InvalidAddressingMode(String),
    OperandParse(String),
}

impl Error {
    /// The stable numeric code used in the `Error #n: ...` rendering.
    pub fn code(&self) -> u32 {
        match self {
            Error::LabelNotFound(_) => 1,
            Error::BranchLabelNotFound(_) => 2,
            Error::BranchOutOfRange { .. } => 3,
            Error::OperandType(_) => 4,
            Error::ReservedWord(_) => 5,
            Error::ConstantAlreadyDefined(_) => 6,
            Error::ConstantNotDefined(_) => 7,
            Error::HighLowByteArg => 8,
            Error::OrgMissing => 9,
            Error::DataUnclosedString => 10,
            Error::DataMalformedAfterString => 11,
            Error::DataMalformed(_) => 12,
            Error::DataHighLowOnWord => 13,
            Error::LabelAlreadyDefined(_) => 14,
            Error::LabelAndConstant(_) => 15,
            Error::UnknownInstruction(_) => 16,
            Error::ConvertValue(_) => 17,
            Error::AddValue(_) => 18,
            Error::LabelSingleByte(_) => 19,
            Error::OrgArgInvalid(_) => 20,
            Error::InvalidAddressingMode(_) => 21,
            Error::OperandParse(_) => 22,
        }
    }

    fn message(&self) -> String {
        match self {
            Error::LabelNotFound(l) => format!("label '{}' not found", l),
            Error::BranchLabelNotFound(l) => format!("branch label '{}' not found", l),
            Error::BranchOutOfRange { label, offset } => format!(
                "branch to '{}' is out of range (offset {})",
                label, offset
            ),
            Error::OperandType(op) => format!("unrecognised operand '{}'", op),
            Error::ReservedWord(w) => format!("'{}' is a reserved word", w),
            Error::ConstantAlreadyDefined(c) => format!("constant '{}' already defined", c),
            Error::ConstantNotDefined(c) => format!("constant '{}' not defined", c),
            Error::HighLowByteArg => "high/low byte selector must be '<' or '>'".to_string(),
            Error::OrgMissing => "ORG has not been set".to_string(),
            Error::DataUnclosedString => "unclosed string literal in data directive".to_string(),
            Error::DataMalformedAfterString => {
                "malformed data directive after string literal".to_string()
            }
            Error::DataMalformed(item) => format!("malformed data item '{}'", item),
            Error::DataHighLowOnWord => {
                "high/low byte selector not allowed on a .DW item".to_string()
            }
            Error::LabelAlreadyDefined(l) => format!("label '{}' already defined", l),
            Error::LabelAndConstant(n) => {
                format!("'{}' is defined as both a label and a constant", n)
            }
            Error::UnknownInstruction(i) => format!("unknown instruction '{}'", i),
            Error::ConvertValue(v) => format!("could not convert value '{}'", v),
            Error::AddValue(v) => format!("could not add value '{}'", v),
            Error::LabelSingleByte(l) => format!(
                "label '{}' used in a single-byte operand needs a '<' or '>' selector",
                l
            ),
            Error::OrgArgInvalid(a) => format!("invalid ORG argument '{}'", a),
            Error::InvalidAddressingMode(m) => format!("invalid addressing mode for '{}'", m),
            Error::OperandParse(o) => format!("could not parse operand '{}'", o),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error #{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
