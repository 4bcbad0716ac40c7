use std::{
    io::{stdin, stdout, Read, Write},
    path::PathBuf,
};

use clap::Parser;
use errors::LoxErrors;
use log::info;
use parser::parse_source;
use scanner::{ScanMode, Scanner};

/// Prints the tokens or the syntax tree of a Lox expression.
#[derive(clap::Parser)]
struct Args {
    /// Source file, read from stdin if omitted.
    file: Option<PathBuf>,
    /// Print the scanned tokens instead of the syntax tree.
    #[arg(long)]
    tokens: bool,
    /// Print the tree as infix source instead of prefix notation.
    #[arg(long, conflicts_with = "tokens")]
    infix: bool,
    /// Skip unexpected characters instead of reporting them.
    #[arg(long)]
    lenient: bool,
}

impl Args {
    fn scan_mode(&self) -> ScanMode {
        if self.lenient {
            ScanMode::Lenient
        } else {
            ScanMode::Strict
        }
    }
}

fn read_source(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            info!("Reading {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut source = String::new();
            stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn dump_tokens(source: &str, mode: ScanMode, out: &mut impl Write) -> anyhow::Result<()> {
    let tokens = Scanner::new(source).with_mode(mode).scan_tokens().map_err(LoxErrors::from)?;
    for token in tokens.iter() {
        writeln!(
            out,
            "{:>4}:{:<4} {:<13} {:?}",
            token.line().to_string(),
            token.col().to_string(),
            token.kind().to_string(),
            token.lexeme()
        )?;
    }
    Ok(())
}

fn run(args: &Args, source: &str, out: &mut impl Write) -> anyhow::Result<()> {
    if args.tokens {
        return dump_tokens(source, args.scan_mode(), out);
    }

    let expr = parse_source(source, args.scan_mode())?;
    if args.infix {
        writeln!(out, "{}", expr.to_source())?;
    } else {
        writeln!(out, "{}", expr)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = read_source(args.file.as_ref())?;
    run(&args, &source, &mut stdout().lock())
}
