//! Addressing-mode classification and target-address arithmetic.
//!
//! All mode distinctions are derived once from the raw flag bits and carried
//! as typed values through the rest of the pipeline.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::opcode::OpDesc;
use crate::registers::{Register, RegisterFile};

bitflags! {
    /// The n/i/x/b/p/e instruction flag bits. n and i sit in the low two
    /// bits of the opcode byte, x/b/p/e in the high nibble of the second
    /// byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Flags: u8 {
        const N = 1 << 5;
        const I = 1 << 4;
        const X = 1 << 3;
        const B = 1 << 2;
        const P = 1 << 1;
        const E = 1 << 0;
    }
}

impl Flags {
    pub fn from_bytes(opcode_byte: u8, second_byte: u8) -> Self {
        Flags::from_bits_truncate(((opcode_byte & 0x03) << 4) | (second_byte >> 4))
    }

    pub fn indexed(self) -> bool {
        self.contains(Flags::X)
    }
}

/// How the operand text is to be read (and prefixed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandMode {
    Immediate,
    Indirect,
    Simple,
}

impl OperandMode {
    pub fn from_flags(flags: Flags) -> Self {
        match (flags.contains(Flags::N), flags.contains(Flags::I)) {
            (false, true) => OperandMode::Immediate,
            (true, false) => OperandMode::Indirect,
            // n=i covers both the XE "simple" form and plain SIC encodings.
            _ => OperandMode::Simple,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            OperandMode::Immediate => "#",
            OperandMode::Indirect => "@",
            OperandMode::Simple => "",
        }
    }
}

/// How the target address is computed from the displacement field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    Direct,
    PcRelative,
    BaseRelative,
}

impl TargetMode {
    /// b=1,p=1 has no defined meaning; the caller treats it as fatal.
    pub fn from_flags(flags: Flags) -> Option<Self> {
        match (flags.contains(Flags::B), flags.contains(Flags::P)) {
            (false, false) => Some(TargetMode::Direct),
            (false, true) => Some(TargetMode::PcRelative),
            (true, false) => Some(TargetMode::BaseRelative),
            (true, true) => None,
        }
    }
}

/// Instruction length class. Format 1 is outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Two,
    Three,
    Four,
}

impl Format {
    pub fn of(desc: &OpDesc, flags: Flags) -> Self {
        if desc.format2 {
            Format::Two
        } else if flags.contains(Flags::E) {
            Format::Four
        } else {
            Format::Three
        }
    }

    /// Instruction length in bytes.
    pub fn len(self) -> u32 {
        match self {
            Format::Two => 2,
            Format::Three => 3,
            Format::Four => 4,
        }
    }

    /// Width of the displacement/address field in hex digits.
    pub fn disp_digits(self) -> usize {
        match self {
            Format::Two => 0,
            Format::Three => 3,
            Format::Four => 5,
        }
    }
}

/// Signed value of the raw displacement field. Format-3 fields are 12-bit
/// two's complement; format-4 address fields are unsigned.
pub fn displacement(format: Format, raw: u32) -> i32 {
    match format {
        Format::Three if raw > 2047 => raw as i32 - 4096,
        _ => raw as i32,
    }
}

/// Target address of a format 3/4 instruction located at `addr`.
pub fn target_address(
    format: Format,
    mode: TargetMode,
    flags: Flags,
    addr: u32,
    raw_disp: u32,
    regs: &RegisterFile,
) -> i32 {
    let disp = displacement(format, raw_disp);
    let mut ta = match mode {
        TargetMode::Direct => disp,
        TargetMode::PcRelative => disp + (addr + format.len()) as i32,
        TargetMode::BaseRelative => disp + regs.get(Register::B),
    };
    if flags.indexed() {
        ta += regs.get(Register::X);
    }
    ta
}

/// An immediate operand whose b, p and e bits are all clear is a plain
/// numeric constant; everything else resolves through the symbol table.
pub fn is_constant_operand(flags: Flags) -> bool {
    !flags.intersects(Flags::B | Flags::P | Flags::E)
        && OperandMode::from_flags(flags) == OperandMode::Immediate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(nibbles: (u8, u8)) -> Flags {
        // Second hex digit of the instruction, third hex digit.
        Flags::from_bytes(nibbles.0, nibbles.1 << 4)
    }

    #[test]
    fn operand_mode_from_ni_bits() {
        assert_eq!(OperandMode::from_flags(flags((0x1, 0x0))), OperandMode::Immediate);
        assert_eq!(OperandMode::from_flags(flags((0x2, 0x0))), OperandMode::Indirect);
        assert_eq!(OperandMode::from_flags(flags((0x3, 0x0))), OperandMode::Simple);
        assert_eq!(OperandMode::from_flags(flags((0x0, 0x0))), OperandMode::Simple);
    }

    #[test]
    fn target_mode_from_bp_bits() {
        assert_eq!(TargetMode::from_flags(flags((0x3, 0x0))), Some(TargetMode::Direct));
        assert_eq!(TargetMode::from_flags(flags((0x3, 0x2))), Some(TargetMode::PcRelative));
        assert_eq!(TargetMode::from_flags(flags((0x3, 0x4))), Some(TargetMode::BaseRelative));
        assert_eq!(TargetMode::from_flags(flags((0x3, 0x6))), None);
    }

    #[test]
    fn twelve_bit_field_wraps_negative() {
        assert_eq!(displacement(Format::Three, 0x800), -2048);
        assert_eq!(displacement(Format::Three, 0x7FF), 2047);
        assert_eq!(displacement(Format::Three, 0xFFF), -1);
        // Format-4 address fields are unsigned.
        assert_eq!(displacement(Format::Four, 0x800), 0x800);
    }

    #[test]
    fn pc_relative_adds_next_instruction_address() {
        let regs = RegisterFile::new();
        let f = flags((0x3, 0x2));
        let ta = target_address(Format::Three, TargetMode::PcRelative, f, 0x10, 0x00A, &regs);
        assert_eq!(ta, 0x10 + 3 + 0xA);
        let ta = target_address(Format::Three, TargetMode::PcRelative, f, 0x900, 0x800, &regs);
        assert_eq!(ta, 0x903 - 2048);
    }

    #[test]
    fn base_and_index_registers_contribute() {
        let mut regs = RegisterFile::new();
        regs.set(Register::B, 0x100);
        regs.set(Register::X, 0x3);
        let base = flags((0x3, 0x4));
        let ta = target_address(Format::Three, TargetMode::BaseRelative, base, 0, 0x20, &regs);
        assert_eq!(ta, 0x120);
        let indexed = flags((0x3, 0x8));
        let ta = target_address(Format::Three, TargetMode::Direct, indexed, 0, 0x20, &regs);
        assert_eq!(ta, 0x23);
    }

    #[test]
    fn constant_operands_are_immediate_with_bpe_clear() {
        assert!(is_constant_operand(flags((0x1, 0x0))));
        assert!(is_constant_operand(flags((0x1, 0x8)))); // indexed, still direct
        assert!(!is_constant_operand(flags((0x3, 0x0)))); // simple resolves symbolically
        assert!(!is_constant_operand(flags((0x1, 0x2)))); // pc-relative
        assert!(!is_constant_operand(flags((0x1, 0x1)))); // extended
    }

    #[test]
    fn format_classification_is_deterministic() {
        let lda = crate::opcode::lookup(0x00).unwrap();
        let clear = crate::opcode::lookup(0xB4).unwrap();
        assert_eq!(Format::of(clear, flags((0x1, 0x0))), Format::Two);
        assert_eq!(Format::of(lda, flags((0x3, 0x0))), Format::Three);
        assert_eq!(Format::of(lda, flags((0x3, 0x1))), Format::Four);
        assert_eq!(Format::of(lda, flags((0x3, 0x1))), Format::Four);
    }
}
