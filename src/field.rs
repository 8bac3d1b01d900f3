//! Instruction fields and the cursor that cuts them out of a bit string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when a field's value cannot be interpreted.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Opcode,
    Rs,
    Rt,
    Rd,
    Shamt,
    Funct,
    Immediate,
    JumpAddress,
    Unknown,
}

impl FieldName {
    /// Declared width in bits.
    pub const fn width(self) -> usize {
        match self {
            FieldName::Opcode | FieldName::Funct => 6,
            FieldName::Rs | FieldName::Rt | FieldName::Rd | FieldName::Shamt => 5,
            FieldName::Immediate => 16,
            FieldName::JumpAddress | FieldName::Unknown => 26,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldName::Opcode => "opcode",
            FieldName::Rs => "rs",
            FieldName::Rt => "rt",
            FieldName::Rd => "rd",
            FieldName::Shamt => "shamt",
            FieldName::Funct => "funct",
            FieldName::Immediate => "immediate",
            FieldName::JumpAddress => "jump_address",
            FieldName::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: FieldName,
    /// Bits as extracted; shorter than the width when the input ran out.
    pub raw_bits: String,
    /// Unsigned value of `raw_bits` right-padded with `0` to the width.
    pub value: u32,
    pub display: String,
}

impl Field {
    /// Builds a field from whatever bits were available. The interpreter sees
    /// the padded bits; `None` from it becomes [`UNKNOWN`].
    pub fn new<F>(name: FieldName, raw_bits: String, interpret: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let padded = pad_right(&raw_bits, name.width());
        let value = bits_value(&padded);
        let display = interpret(&padded).unwrap_or_else(|| UNKNOWN.to_string());
        Self { name, raw_bits, value, display }
    }

    pub fn width(&self) -> usize {
        self.name.width()
    }

    pub fn is_truncated(&self) -> bool {
        self.raw_bits.chars().count() < self.width()
    }
}

/// Right-pads with `0` to `width` characters.
pub fn pad_right(bits: &str, width: usize) -> String {
    let mut out = bits.to_string();
    let have = bits.chars().count();
    out.extend(std::iter::repeat('0').take(width.saturating_sub(have)));
    out
}

/// Reads a bit string MSB first. Any character other than `'1'` counts as a
/// zero bit; only the low 32 bits are kept.
pub fn bits_value(bits: &str) -> u32 {
    bits.chars()
        .fold(0u32, |acc, c| (acc << 1) | u32::from(c == '1'))
}

/// Cursor over a bit string, consumed left to right.
#[derive(Debug, Clone)]
pub struct FieldExtractor<'a> {
    rest: &'a str,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(bits: &'a str) -> Self {
        Self { rest: bits }
    }

    /// Takes the next `n` characters, or whatever is left. Never fails.
    pub fn extract_bits(&mut self, n: usize) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        head
    }

    pub fn extract_field<F>(&mut self, name: FieldName, interpret: F) -> Field
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let raw = self.extract_bits(name.width()).to_string();
        Field::new(name, raw, interpret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bits_advances_and_runs_dry() {
        let mut ex = FieldExtractor::new("1100101");
        assert_eq!(ex.extract_bits(3), "110");
        assert_eq!(ex.extract_bits(3), "010");
        assert_eq!(ex.extract_bits(3), "1");
        assert_eq!(ex.extract_bits(3), "");
    }

    #[test]
    fn short_field_is_padded_before_interpretation() {
        let mut ex = FieldExtractor::new("11");
        let f = ex.extract_field(FieldName::Rs, |bits| Some(bits.to_string()));
        assert_eq!(f.raw_bits, "11");
        assert_eq!(f.display, "11000");
        assert_eq!(f.value, 0b11000);
        assert!(f.is_truncated());
    }

    #[test]
    fn failed_interpretation_shows_unknown() {
        let f = Field::new(FieldName::Funct, "111111".into(), |_| None);
        assert_eq!(f.display, UNKNOWN);
        assert_eq!(f.value, 63);
    }

    #[test]
    fn multibyte_input_does_not_split_chars() {
        let mut ex = FieldExtractor::new("1é0");
        assert_eq!(ex.extract_bits(2), "1é");
        assert_eq!(bits_value("1é0"), 0b100);
    }

    #[test]
    fn widths_add_up_per_layout() {
        use FieldName::*;
        let sum = |names: &[FieldName]| names.iter().map(|n| n.width()).sum::<usize>();
        assert_eq!(sum(&[Opcode, Rs, Rt, Rd, Shamt, Funct]), 32);
        assert_eq!(sum(&[Opcode, Rs, Rt, Immediate]), 32);
        assert_eq!(sum(&[Opcode, JumpAddress]), 32);
        assert_eq!(sum(&[Opcode, Unknown]), 32);
    }
}
