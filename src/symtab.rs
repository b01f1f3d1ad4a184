//! Symbol table input: ordinary symbols (`NAME ADDR R|A…`) and literal
//! entries (`=X'…'|=C'…' LENGTH ADDR`). Literal entries are typed constants
//! whose encoded length is derived from their own source text; ordinary
//! entries are plain address→name bindings.

use std::collections::BTreeMap;

use crate::DisasmError;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<u32, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Result<Self, DisasmError> {
        let mut table = SymbolTable::new();
        for line in input.lines() {
            let line = line.trim_end();
            if line.is_empty()
                || line.starts_with("Symbol")
                || line.starts_with("Name")
                || line.starts_with('-')
            {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(name), Some(second), Some(third)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(DisasmError::MalformedSymbol { line: line.to_string() });
            };
            // Ordinary symbols carry a relocatable/absolute flag in the third
            // field; literal lines put the address there instead.
            let addr_text = if third.starts_with('R') || third.starts_with('A') {
                second
            } else {
                third
            };
            let addr = u32::from_str_radix(addr_text, 16)
                .map_err(|_| DisasmError::MalformedSymbol { line: line.to_string() })?;
            table.insert(addr, name);
        }
        Ok(table)
    }

    pub fn insert(&mut self, addr: u32, name: impl Into<String>) {
        self.entries.insert(addr, name.into());
    }

    pub fn get(&self, addr: u32) -> Option<&str> {
        self.entries.get(&addr).map(String::as_str)
    }

    /// Entry at `addr` only if it is a literal-pool entry.
    pub fn literal_at(&self, addr: u32) -> Option<&str> {
        self.get(addr).filter(|name| name.starts_with('='))
    }

    pub fn require(&self, addr: u32) -> Result<&str, DisasmError> {
        self.get(addr).ok_or(DisasmError::UnresolvedSymbol { addr })
    }

    /// Entries with `start <= addr < end`, in address order.
    pub fn in_range(&self, start: u32, end: u32) -> impl Iterator<Item = (u32, &str)> {
        self.entries.range(start..end).map(|(&a, n)| (a, n.as_str()))
    }
}

/// Encoded length in hex digits of a literal, from its source text: a hex
/// literal holds its digits verbatim, a character literal two digits per
/// character. Malformed literal text is a fatal structural error.
pub fn literal_digit_count(literal: &str) -> Result<usize, DisasmError> {
    let malformed = || DisasmError::MalformedLiteral { literal: literal.to_string() };
    let close = literal.rfind('\'').ok_or_else(malformed)?;
    if close <= 3 || !literal.ends_with('\'') {
        return Err(malformed());
    }
    match literal.get(..3) {
        Some("=X'") => Ok(close - 3),
        Some("=C'") => Ok((close - 3) * 2),
        _ => Err(malformed()),
    }
}

/// Bytes a literal occupies in the encoding; odd hex-digit literals are
/// padded to a whole byte by the assembler.
pub fn literal_byte_count(literal: &str) -> Result<usize, DisasmError> {
    Ok(literal_digit_count(literal)?.div_ceil(2))
}
