use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;

/// Compiles a grammar description into LL(1) parsing tables
#[derive(Parser, Debug)]
#[command(name = "pgen")]
struct Args {
  /// Grammar file to compile
  #[arg(value_name = "GRAMMAR")]
  grammar: PathBuf,

  /// Write the tables here as JSON
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Print the tables to stdout
  #[arg(long)]
  dump: bool,
}

fn main() -> Result<()> {
  env_logger::Builder::from_default_env()
    .format_timestamp(None)
    .init();
  let args = Args::parse();

  let src = fs::read_to_string(&args.grammar)
    .with_context(|| format!("reading {}", args.grammar.display()))?;
  let grammar = pgen::compile_str(&src)
    .with_context(|| format!("compiling {}", args.grammar.display()))?;
  log::info!("{} rules, {} labels", grammar.dfas.len(), grammar.labels.len());

  if args.dump {
    print!("{}", grammar);
  }
  if let Some(output) = &args.output {
    pgen::io::save_grammar_json(output, &grammar)
      .with_context(|| format!("writing {}", output.display()))?;
    log::info!("wrote {}", output.display());
  }
  Ok(())
}
