//! SIC/XE opcode table.
//!
//! The low two bits of the opcode byte carry the n/i addressing flags and are
//! masked off before lookup; format-1 instructions are not supported, so any
//! masked value outside this table is a decode failure for the caller.

/// Bits of the opcode byte that identify the instruction.
pub const OPCODE_MASK: u8 = 0xFC;

/// One table entry. `format2` marks the register-to-register instructions,
/// which are two bytes long and carry no target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDesc {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub format2: bool,
}

const fn op(opcode: u8, mnemonic: &'static str) -> OpDesc {
    OpDesc { opcode, mnemonic, format2: false }
}

const fn op2(opcode: u8, mnemonic: &'static str) -> OpDesc {
    OpDesc { opcode, mnemonic, format2: true }
}

/// Sorted by opcode so lookup can binary-search on the masked value.
pub const TABLE: &[OpDesc] = &[
    op(0x00, "LDA"),
    op(0x04, "LDX"),
    op(0x08, "LDL"),
    op(0x0C, "STA"),
    op(0x10, "STX"),
    op(0x14, "STL"),
    op(0x18, "ADD"),
    op(0x1C, "SUB"),
    op(0x20, "MUL"),
    op(0x24, "DIV"),
    op(0x28, "COMP"),
    op(0x2C, "TIX"),
    op(0x30, "JEQ"),
    op(0x34, "JGT"),
    op(0x38, "JLT"),
    op(0x3C, "J"),
    op(0x40, "AND"),
    op(0x44, "OR"),
    op(0x48, "JSUB"),
    op(0x4C, "RSUB"),
    op(0x50, "LDCH"),
    op(0x54, "STCH"),
    op(0x58, "ADDF"),
    op(0x5C, "SUBF"),
    op(0x60, "MULF"),
    op(0x64, "DIVF"),
    op(0x68, "LDB"),
    op(0x6C, "LDS"),
    op(0x70, "LDF"),
    op(0x74, "LDT"),
    op(0x78, "STB"),
    op(0x7C, "STS"),
    op(0x80, "STF"),
    op(0x84, "STT"),
    op(0x88, "COMPF"),
    op2(0x90, "ADDR"),
    op2(0x94, "SUBR"),
    op2(0x98, "MULR"),
    op2(0x9C, "DIVR"),
    op2(0xA0, "COMPR"),
    op2(0xA4, "SHIFTL"),
    op2(0xA8, "SHIFTR"),
    op2(0xAC, "RMO"),
    op2(0xB0, "SVC"),
    op2(0xB4, "CLEAR"),
    op2(0xB8, "TIXR"),
    op(0xC0, "FLOAT"),
    op(0xC4, "FIX"),
    op(0xC8, "NORM"),
    op(0xD0, "LPS"),
    op(0xD4, "STI"),
    op(0xD8, "RD"),
    op(0xDC, "WD"),
    op(0xE0, "TD"),
    op(0xE8, "STSW"),
    op(0xEC, "SSK"),
    op(0xF0, "SIO"),
    op(0xF4, "HIO"),
    op(0xF8, "TIO"),
];

/// Look up the instruction for a raw opcode byte (flag bits included).
pub fn lookup(raw: u8) -> Option<&'static OpDesc> {
    let masked = raw & OPCODE_MASK;
    TABLE
        .binary_search_by_key(&masked, |d| d.opcode)
        .ok()
        .map(|i| &TABLE[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_sorted_and_masked_keys_unique() {
        let mut seen = HashSet::new();
        let mut prev = None;
        for d in TABLE {
            assert_eq!(d.opcode & !OPCODE_MASK, 0, "{} has flag bits set", d.mnemonic);
            assert!(seen.insert(d.opcode), "duplicate opcode {:#04x}", d.opcode);
            if let Some(p) = prev {
                assert!(d.opcode > p);
            }
            prev = Some(d.opcode);
        }
    }

    #[test]
    fn flag_bits_do_not_change_identity() {
        for d in TABLE {
            for flags in 0..4u8 {
                let found = lookup(d.opcode | flags).expect("masked lookup");
                assert_eq!(found.mnemonic, d.mnemonic);
            }
        }
    }

    #[test]
    fn unknown_opcode_is_none() {
        assert!(lookup(0xFC).is_none());
        assert!(lookup(0x8C).is_none());
    }

    #[test]
    fn register_to_register_set() {
        for mn in ["ADDR", "SUBR", "MULR", "DIVR", "COMPR", "SHIFTL", "SHIFTR", "RMO", "SVC", "CLEAR", "TIXR"] {
            let d = TABLE.iter().find(|d| d.mnemonic == mn).unwrap();
            assert!(d.format2, "{mn} is format 2");
        }
        assert!(!lookup(0x00).unwrap().format2); // LDA
        assert!(!lookup(0x4C).unwrap().format2); // RSUB
    }
}
