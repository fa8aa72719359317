//! Associates each emitted byte range with the source line that produced
//! it, for future disassembler/debugger use and for richer error messages.
//! Populated during encoding; the interpreter never consults it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceMapItem {
    pub address: u16,
    pub len: u8,
    pub line: u32,
}

pub type SourceMap = Vec<SourceMapItem>;
