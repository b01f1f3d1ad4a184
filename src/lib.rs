pub mod addressing;
pub mod listing;
pub mod opcode;
pub mod pipeline;
pub mod record;
pub mod registers;
pub mod symtab;

pub use pipeline::{disassemble, Disassembler, Row};
pub use record::ObjectProgram;
pub use symtab::SymbolTable;

/// Unrecoverable decode conditions. The run aborts on the first one; no
/// partial row sequence is handed out.
#[derive(thiserror::Error, Debug)]
pub enum DisasmError {
    #[error("Unknown opcode {opcode:#04x} at {addr:#06X}")]
    UnknownOpcode { addr: u32, opcode: u8 },
    #[error("No symbol at address {addr:#06X}")]
    UnresolvedSymbol { addr: u32 },
    #[error("Target address {target} is outside the address space")]
    NegativeTarget { target: i32 },
    #[error("Unknown register code {code:#03x} at {addr:#06X}")]
    UnknownRegister { addr: u32, code: u8 },
    #[error("Invalid flag combination b=1,p=1 at {addr:#06X}")]
    InvalidTargetMode { addr: u32 },
    #[error("Text record exhausted mid-instruction at {addr:#06X}")]
    TruncatedRecord { addr: u32 },
    #[error("Malformed {kind} record: {line:?}")]
    MalformedRecord { kind: &'static str, line: String },
    #[error("Malformed symbol table line: {line:?}")]
    MalformedSymbol { line: String },
    #[error("Malformed literal {literal:?} in symbol table")]
    MalformedLiteral { literal: String },
}
