use serde::{Deserialize, Serialize};

/// Presentation settings consumed by the decoder and formatter.
///
/// No `Default`: every call site states the presentation it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub register_mode: RegisterMode,
    pub immediate_format: ImmediateFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterMode {
    Names,
    Numbers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImmediateFormat {
    Hex,
    Decimal,
    Binary,
}

impl ImmediateFormat {
    pub fn format_unsigned(self, v: u64) -> String {
        match self {
            ImmediateFormat::Hex => format!("{v:#x}"),
            ImmediateFormat::Decimal => v.to_string(),
            ImmediateFormat::Binary => format!("{v:#b}"),
        }
    }

    /// Negative values print as `-` followed by the magnitude in the same base (`-0x1`).
    pub fn format_signed(self, v: i64) -> String {
        if v < 0 {
            format!("-{}", self.format_unsigned(v.unsigned_abs()))
        } else {
            self.format_unsigned(v as u64)
        }
    }
}
