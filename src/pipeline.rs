//! The decode pipeline: walks each text record in address order, classifies
//! and resolves every instruction, and interleaves the synthetic rows
//! (START/END, LTORG and literal definitions, BASE, reserve-storage gaps)
//! that reconstruct the original source shape.

use serde::{Deserialize, Serialize};

use crate::addressing::{self, Flags, Format, OperandMode, TargetMode};
use crate::opcode;
use crate::record::{Header, ObjectProgram, TextRecord};
use crate::registers::{Register, RegisterFile};
use crate::symtab::{self, SymbolTable};
use crate::DisasmError;

/// One reconstructed source line. `addr` is `None` for directive rows with
/// no program-counter location (LTORG, BASE, END); `raw` is empty for every
/// synthetic row. Addresses are non-decreasing across one run's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub addr: Option<u32>,
    pub label: String,
    pub mnemonic: String,
    pub operand: String,
    pub raw: String,
}

impl Row {
    fn directive(mnemonic: impl Into<String>, operand: impl Into<String>) -> Self {
        Row {
            addr: None,
            label: String::new(),
            mnemonic: mnemonic.into(),
            operand: operand.into(),
            raw: String::new(),
        }
    }
}

/// Run the whole pipeline once with a fresh decode context.
pub fn disassemble(prog: &ObjectProgram, symtab: &SymbolTable) -> Result<Vec<Row>, DisasmError> {
    Disassembler::new(symtab).run(prog)
}

/// Per-run decode context: the accumulated row sequence and the tracked
/// register snapshot. `run` resets both, so a context can be reused across
/// programs without state leaking between runs.
pub struct Disassembler<'a> {
    symtab: &'a SymbolTable,
    regs: RegisterFile,
    rows: Vec<Row>,
}

impl<'a> Disassembler<'a> {
    pub fn new(symtab: &'a SymbolTable) -> Self {
        Disassembler { symtab, regs: RegisterFile::new(), rows: Vec::new() }
    }

    pub fn run(&mut self, prog: &ObjectProgram) -> Result<Vec<Row>, DisasmError> {
        self.regs.reset();
        self.rows.clear();
        self.emit_start(&prog.header);

        for (idx, text) in prog.texts.iter().enumerate() {
            tracing::debug!(start = text.start, bytes = text.digits.len() / 2, "text record");
            let end = self.scan_text(text)?;
            let boundary = match prog.texts.get(idx + 1) {
                Some(next) => next.start,
                None => prog.header.length,
            };
            self.fill_gap(end, boundary);
        }

        if let Some(transfer) = prog.transfer {
            // The transfer address names the END operand directly, without
            // going through addressing-mode resolution.
            let target = self.symtab.require(transfer)?.to_string();
            self.rows.push(Row::directive("END", target));
        }
        tracing::debug!(rows = self.rows.len(), "run complete");
        Ok(std::mem::take(&mut self.rows))
    }

    fn emit_start(&mut self, header: &Header) {
        let operand = if header.start == 0 {
            "0".to_string()
        } else {
            format!("{:X}", header.start)
        };
        self.rows.push(Row {
            addr: Some(header.start),
            label: header.name.clone(),
            mnemonic: "START".to_string(),
            operand,
            raw: String::new(),
        });
    }

    /// Decode one text record; returns the address reached at its end.
    fn scan_text(&mut self, rec: &TextRecord) -> Result<u32, DisasmError> {
        let mut addr = rec.start;
        let mut pos = 0;
        while pos < rec.digits.len() {
            (addr, pos) = if self.symtab.literal_at(addr).is_some() {
                self.literal_run(rec, addr, pos)?
            } else {
                self.decode_one(rec, addr, pos)?
            };
        }
        Ok(addr)
    }

    fn decode_one(
        &mut self,
        rec: &TextRecord,
        addr: u32,
        pos: usize,
    ) -> Result<(u32, usize), DisasmError> {
        let symtab = self.symtab;
        let b0 = byte_at(rec, pos, addr)?;
        let desc = opcode::lookup(b0).ok_or(DisasmError::UnknownOpcode { addr, opcode: b0 })?;
        let b1 = byte_at(rec, pos + 2, addr)?;
        let flags = Flags::from_bytes(b0, b1);
        let format = Format::of(desc, flags);
        let raw = field(rec, pos, format.len() as usize * 2, addr)?.to_string();
        let label = symtab.get(addr).unwrap_or("").to_string();

        if format == Format::Two {
            let code = b1 >> 4;
            let reg = Register::from_code(code)
                .ok_or(DisasmError::UnknownRegister { addr, code })?;
            if desc.mnemonic == "CLEAR" {
                self.regs.clear(reg);
            }
            tracing::trace!(addr, mnemonic = desc.mnemonic, reg = reg.name(), "format 2");
            self.rows.push(Row {
                addr: Some(addr),
                label,
                mnemonic: desc.mnemonic.to_string(),
                operand: reg.name().to_string(),
                raw,
            });
            return Ok((addr + 2, pos + 4));
        }

        let mode = OperandMode::from_flags(flags);
        let target_mode =
            TargetMode::from_flags(flags).ok_or(DisasmError::InvalidTargetMode { addr })?;
        let disp_text = field(rec, pos + 3, format.disp_digits(), addr)?;
        let raw_disp =
            u32::from_str_radix(disp_text, 16).map_err(|_| malformed_digits(rec))?;
        let ta = addressing::target_address(format, target_mode, flags, addr, raw_disp, &self.regs);
        let constant = addressing::is_constant_operand(flags);

        // RSUB carries no operand; its zero displacement must not be
        // resolved against the symbol table.
        let operand = if desc.mnemonic == "RSUB" {
            String::new()
        } else {
            let name = if constant {
                addressing::displacement(format, raw_disp).to_string()
            } else {
                resolve(symtab, ta)?.to_string()
            };
            let mut text = format!("{}{}", mode.prefix(), name);
            if flags.indexed() {
                text.push_str(",X");
            }
            text
        };

        // Register loads feed back into later address resolution; this is
        // the only execution side effect the decoder models.
        if let Some(reg) = loaded_register(desc.mnemonic) {
            let value = if constant { addressing::displacement(format, raw_disp) } else { ta };
            self.regs.set(reg, value);
            tracing::trace!(addr, reg = reg.name(), value, "register load tracked");
        }

        let mnemonic = match format {
            Format::Four => format!("+{}", desc.mnemonic),
            _ => desc.mnemonic.to_string(),
        };
        tracing::trace!(addr, %mnemonic, %operand, ?target_mode, "decoded");
        self.rows.push(Row { addr: Some(addr), label, mnemonic, operand, raw });

        if desc.mnemonic == "LDB" {
            let base = resolve(symtab, ta)?.to_string();
            self.rows.push(Row::directive("BASE", base));
        }

        Ok((addr + format.len(), pos + format.len() as usize * 2))
    }

    /// Emit the LTORG marker, then one row per consecutive literal, sizing
    /// each from the literal's own text and consuming its encoded digits.
    fn literal_run(
        &mut self,
        rec: &TextRecord,
        mut addr: u32,
        mut pos: usize,
    ) -> Result<(u32, usize), DisasmError> {
        let symtab = self.symtab;
        self.rows.push(Row::directive("LTORG", ""));
        while let Some(literal) = symtab.literal_at(addr) {
            let bytes = symtab::literal_byte_count(literal)?;
            let raw = field(rec, pos, bytes * 2, addr)?.to_string();
            tracing::trace!(addr, literal, bytes, "literal");
            self.rows.push(Row {
                addr: Some(addr),
                label: "*".to_string(),
                mnemonic: literal.to_string(),
                operand: String::new(),
                raw,
            });
            addr += bytes as u32;
            pos += bytes * 2;
        }
        Ok((addr, pos))
    }

    /// Synthesize reserve-storage rows for symbols between the end of a
    /// text record and the next record (or the program's total length).
    /// Each row spans from its symbol to the next match or the boundary.
    fn fill_gap(&mut self, end: u32, boundary: u32) {
        if end >= boundary {
            return;
        }
        let symtab = self.symtab;
        let matches: Vec<u32> = symtab.in_range(end, boundary).map(|(a, _)| a).collect();
        for (i, &at) in matches.iter().enumerate() {
            let next = matches.get(i + 1).copied().unwrap_or(boundary);
            let words = (next - at) / 3;
            tracing::debug!(addr = at, words, "storage gap");
            self.rows.push(Row {
                addr: Some(at),
                label: symtab.get(at).unwrap_or("").to_string(),
                mnemonic: "RESW".to_string(),
                operand: words.to_string(),
                raw: String::new(),
            });
        }
    }
}

/// The register an `LD?` instruction loads, if it names one (LDCH does not).
fn loaded_register(mnemonic: &str) -> Option<Register> {
    let rest = mnemonic.strip_prefix("LD")?;
    let mut chars = rest.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Register::from_letter(letter)
}

fn resolve(symtab: &SymbolTable, ta: i32) -> Result<&str, DisasmError> {
    let addr = u32::try_from(ta).map_err(|_| DisasmError::NegativeTarget { target: ta })?;
    symtab.require(addr)
}

fn field<'r>(rec: &'r TextRecord, pos: usize, width: usize, addr: u32) -> Result<&'r str, DisasmError> {
    rec.digits
        .get(pos..pos + width)
        .ok_or(DisasmError::TruncatedRecord { addr })
}

fn byte_at(rec: &TextRecord, pos: usize, addr: u32) -> Result<u8, DisasmError> {
    u8::from_str_radix(field(rec, pos, 2, addr)?, 16).map_err(|_| malformed_digits(rec))
}

/// Non-hex digits in a text record. `ObjectProgram::parse` rejects these
/// up front; this covers records built directly.
fn malformed_digits(rec: &TextRecord) -> DisasmError {
    DisasmError::MalformedRecord { kind: "text", line: rec.digits.clone() }
}
