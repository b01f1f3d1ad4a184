//! Object-program records: a header line, text records carrying contiguous
//! hex-encoded instruction bytes, and an optional end record with the
//! transfer address. Fields live at fixed columns; anything short or
//! non-hex is rejected rather than read out of range.

use crate::DisasmError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub start: u32,
    /// Total program length in bytes; bounds the last text-record gap scan.
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub start: u32,
    /// Contiguous hex digits of the encoded bytes, two per byte.
    pub digits: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProgram {
    pub header: Header,
    pub texts: Vec<TextRecord>,
    /// Transfer address from the end record, when one is present.
    pub transfer: Option<u32>,
}

fn malformed(kind: &'static str, line: &str) -> DisasmError {
    DisasmError::MalformedRecord { kind, line: line.to_string() }
}

fn hex_field(line: &str, range: std::ops::Range<usize>, kind: &'static str) -> Result<u32, DisasmError> {
    let text = line.get(range).ok_or_else(|| malformed(kind, line))?;
    u32::from_str_radix(text, 16).map_err(|_| malformed(kind, line))
}

impl ObjectProgram {
    pub fn parse(input: &str) -> Result<Self, DisasmError> {
        let mut lines = input.lines().filter(|l| !l.trim().is_empty());
        let head = lines.next().ok_or_else(|| malformed("header", ""))?;
        if !head.starts_with('H') {
            return Err(malformed("header", head));
        }
        let name = head.get(1..7).ok_or_else(|| malformed("header", head))?.trim().to_string();
        let header = Header {
            name,
            start: hex_field(head, 7..13, "header")?,
            length: hex_field(head, 13..19, "header")?,
        };

        let mut texts = Vec::new();
        let mut transfer = None;
        for line in lines {
            match line.as_bytes()[0] {
                b'T' => {
                    let start = hex_field(line, 1..7, "text")?;
                    let byte_count = hex_field(line, 7..9, "text")? as usize;
                    let digits = line.get(9..).ok_or_else(|| malformed("text", line))?;
                    if digits.len() != byte_count * 2
                        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
                    {
                        return Err(malformed("text", line));
                    }
                    texts.push(TextRecord { start, digits: digits.to_string() });
                }
                b'E' => {
                    transfer = Some(hex_field(line, 1..7, "end")?);
                }
                // Modification records and anything else carry nothing we decode.
                _ => {}
            }
        }
        Ok(ObjectProgram { header, texts, transfer })
    }
}
