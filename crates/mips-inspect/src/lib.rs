pub mod report;

// Re-export commonly used types/functions for the CLI
pub use report::{role_label, FieldReport, Report};

use anyhow::{Context, Result};
use std::path::Path;

use mips_codec::input::{hex_to_bin, parse_binary_input, parse_hex_input};
use mips_codec::{Decoder, Encoder, ImmediateFormat, MipsDecoder, ParseResult, RegisterMode, Settings, Tables};

/// Baseline presentation when neither a config file nor flags say otherwise.
pub const FALLBACK_SETTINGS: Settings = Settings {
    register_mode: RegisterMode::Names,
    immediate_format: ImmediateFormat::Decimal,
};

/// Settings from an optional JSON file, with explicit flags taking precedence.
pub fn load_settings(
    config: Option<&Path>,
    registers: Option<RegisterMode>,
    immediates: Option<ImmediateFormat>,
) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            serde_json::from_str::<Settings>(&txt)
                .with_context(|| format!("parsing settings in {}", path.display()))?
        }
        None => FALLBACK_SETTINGS,
    };
    if let Some(r) = registers {
        settings.register_mode = r;
    }
    if let Some(i) = immediates {
        settings.immediate_format = i;
    }
    Ok(settings)
}

/// Normalises a binary or hex word typed by the user, then decodes it.
pub fn inspect_word(tables: &Tables, word: &str, hex: bool, settings: &Settings) -> Report {
    let parsed = if hex {
        parse_hex_input(word).map(|h| hex_to_bin(&h))
    } else {
        parse_binary_input(word)
    };
    let (bits, message) = parsed.into_parts();
    let insn = MipsDecoder::new(tables).decode(bits.as_deref().unwrap_or(""), settings);
    Report::from_instruction(&insn, message)
}

/// Encodes one line of assembly and, when that succeeds, decodes the result
/// for display.
pub fn inspect_asm(tables: &Tables, line: &str, settings: &Settings) -> (ParseResult<String>, Option<Report>) {
    let encoded = Encoder::new(tables).encode(line);
    let report = encoded.value().map(|bits| {
        let insn = MipsDecoder::new(tables).decode(bits, settings);
        Report::from_instruction(&insn, encoded.message().cloned())
    });
    (encoded, report)
}
