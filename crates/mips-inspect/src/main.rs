use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mips_codec::{ImmediateFormat, RegisterMode, Tables};
use mips_inspect::{inspect_asm, inspect_word, load_settings, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS instruction inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a 32-bit word (binary by default) into fields and assembly
    Decode {
        /// Instruction word; shorter input is padded with zeros on the right
        word: String,
        /// Read the word as hexadecimal
        #[arg(long)]
        hex: bool,
        #[command(flatten)]
        view: ViewOpts,
    },
    /// Encode one assembly instruction, e.g. `add $t0, $t1, $t2`
    Encode {
        /// Instruction text; several arguments are joined with spaces
        #[arg(required = true, num_args = 1..)]
        asm: Vec<String>,
        #[command(flatten)]
        view: ViewOpts,
    },
}

#[derive(Args, Debug)]
struct ViewOpts {
    /// Register display
    #[arg(long, value_enum)]
    registers: Option<RegisterArg>,
    /// Immediate display
    #[arg(long, value_enum)]
    immediates: Option<ImmediateArg>,
    /// Load settings from JSON ({"registerMode": ..., "immediateFormat": ...})
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RegisterArg { Names, Numbers }

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImmediateArg { Hex, Decimal, Binary }

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

impl From<RegisterArg> for RegisterMode {
    fn from(a: RegisterArg) -> Self {
        match a {
            RegisterArg::Names => RegisterMode::Names,
            RegisterArg::Numbers => RegisterMode::Numbers,
        }
    }
}

impl From<ImmediateArg> for ImmediateFormat {
    fn from(a: ImmediateArg) -> Self {
        match a {
            ImmediateArg::Hex => ImmediateFormat::Hex,
            ImmediateArg::Decimal => ImmediateFormat::Decimal,
            ImmediateArg::Binary => ImmediateFormat::Binary,
        }
    }
}

fn emit(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tables = Tables::builtin()?;

    match cli.cmd {
        Command::Decode { word, hex, view } => {
            let settings = load_settings(
                view.config.as_deref(),
                view.registers.map(Into::into),
                view.immediates.map(Into::into),
            )?;
            let report = inspect_word(&tables, word.trim(), hex, &settings);
            emit(&report, view.format)?;
        }
        Command::Encode { asm, view } => {
            let settings = load_settings(
                view.config.as_deref(),
                view.registers.map(Into::into),
                view.immediates.map(Into::into),
            )?;
            let line = asm.join(" ");
            let (encoded, report) = inspect_asm(&tables, &line, &settings);
            match report {
                Some(r) => emit(&r, view.format)?,
                None => {
                    let reason = encoded
                        .message()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "error: not a recognised instruction".to_string());
                    eprintln!("{reason}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
