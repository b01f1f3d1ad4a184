use pretty_assertions::assert_eq;
use sicxe_rs::{disassemble, ObjectProgram, SymbolTable};

fn run(obj: &str, sym: &str) -> Vec<sicxe_rs::Row> {
    let prog = ObjectProgram::parse(obj).unwrap();
    let symtab = SymbolTable::parse(sym).unwrap();
    disassemble(&prog, &symtab).unwrap()
}

#[test]
fn one_symbol_between_text_records_reserves_storage() {
    // First record ends at 0x10, next starts at 0x20, ALPHA sits at 0x19.
    let obj = "HGAP   000000000023\nT00000D03010001\nT000020034F0000\n";
    let rows = run(obj, "ALPHA 000019 R\n");
    assert_eq!(rows.len(), 4);
    let resw = &rows[2];
    assert_eq!(resw.addr, Some(0x19));
    assert_eq!(resw.label, "ALPHA");
    assert_eq!(resw.mnemonic, "RESW");
    assert_eq!(resw.operand, "2"); // (0x20 - 0x19) / 3 words
    assert_eq!(resw.raw, "");
    // No row for the boundary itself, and none at the record end.
    assert!(!rows.iter().any(|r| r.addr == Some(0x10) || r.addr == Some(0x20)));
}

#[test]
fn empty_gap_emits_nothing() {
    let obj = "HGAP   000000000023\nT00000D03010001\nT000020034F0000\n";
    let rows = run(obj, "");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.mnemonic != "RESW"));
}

#[test]
fn consecutive_spans_chain_between_symbols() {
    // Symbols at the record end itself and further in: two spans.
    let obj = "HGAP   000000000023\nT00000D03010001\nT000020034F0000\n";
    let rows = run(obj, "BUFA 000010 R\nBUFB 000019 R\n");
    let resw: Vec<_> = rows.iter().filter(|r| r.mnemonic == "RESW").collect();
    assert_eq!(resw.len(), 2);
    assert_eq!(resw[0].addr, Some(0x10));
    assert_eq!(resw[0].label, "BUFA");
    assert_eq!(resw[0].operand, "3"); // (0x19 - 0x10) / 3
    assert_eq!(resw[1].addr, Some(0x19));
    assert_eq!(resw[1].operand, "2"); // (0x20 - 0x19) / 3
}

#[test]
fn last_record_gap_is_bounded_by_program_length() {
    let obj = "HGAP   000000000020\nT00000D03010001\n";
    let rows = run(obj, "TAIL 000013 R\n");
    let resw: Vec<_> = rows.iter().filter(|r| r.mnemonic == "RESW").collect();
    assert_eq!(resw.len(), 1);
    assert_eq!(resw[0].addr, Some(0x13));
    assert_eq!(resw[0].operand, "4"); // (0x20 - 0x13) / 3
}
