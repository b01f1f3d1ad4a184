//! Columnar listing renderer. Addresses print as zero-padded uppercase hex
//! (width 5 once any address exceeds 0xFFFF); directive rows with no
//! address leave the column blank. All other columns are right-aligned.

use std::fmt::Write as _;

use crate::pipeline::Row;

pub fn render(rows: &[Row]) -> String {
    let addr_width = if rows.iter().any(|r| r.addr.is_some_and(|a| a > 0xFFFF)) {
        5
    } else {
        4
    };
    let mut out = String::new();
    for row in rows {
        match row.addr {
            Some(addr) => {
                let _ = write!(out, "{addr:0addr_width$X}");
            }
            None => {
                let _ = write!(out, "{:addr_width$}", "");
            }
        }
        let _ = writeln!(
            out,
            "{:>10}{:>15}{:>15}{:>12}",
            row.label, row.mnemonic, row.operand, row.raw
        );
    }
    out
}
