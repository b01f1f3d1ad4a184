use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sicxe_rs::{disassemble, listing, ObjectProgram, SymbolTable};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconstruct SIC/XE assembly from an object program and its symbol table",
    long_about = None
)]
struct Cli {
    /// Object program file
    #[arg(value_name = "OBJFILE")]
    obj: String,
    /// Symbol table file
    #[arg(value_name = "SYMFILE")]
    sym: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let obj_text = std::fs::read_to_string(&cli.obj)
        .with_context(|| format!("reading object program {}", cli.obj))?;
    let sym_text = std::fs::read_to_string(&cli.sym)
        .with_context(|| format!("reading symbol table {}", cli.sym))?;

    let prog = ObjectProgram::parse(&obj_text)?;
    let symtab = SymbolTable::parse(&sym_text)?;
    let rows = disassemble(&prog, &symtab)?;

    let rendered = match cli.format {
        OutputFormat::Text => listing::render(&rows),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&rows)?;
            json.push('\n');
            json
        }
    };
    match cli.out {
        Some(path) => std::fs::write(&path, rendered).with_context(|| format!("writing {path}"))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
