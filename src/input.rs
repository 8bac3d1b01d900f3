//! Normalising raw user input into bit strings, and small bit/hex helpers.

use crate::diag::ParseResult;

const WORD_BITS: usize = 32;
const WORD_NIBBLES: usize = 8;

/// Leading `0x`, when present, is skipped before reading digits.
fn parse_digits(
    text: &str,
    format: &str,
    max: usize,
    is_digit: impl Fn(char) -> bool,
) -> ParseResult<String> {
    let body = text.strip_prefix("0x").unwrap_or(text);
    let extracted: String = body.chars().take_while(|c| is_digit(*c)).take(max).collect();
    let supplied = body.chars().count();

    if supplied > max && extracted.len() == max {
        ParseResult::ok_with_info(extracted.clone(), format!("{format} truncated to \"{extracted}\""))
    } else if extracted.len() < supplied {
        ParseResult::ok_with_info(extracted, format!("invalid {format} input"))
    } else {
        ParseResult::ok(extracted)
    }
}

/// Up to 32 binary digits from the start of `text`.
pub fn parse_binary_input(text: &str) -> ParseResult<String> {
    parse_digits(text, "binary", WORD_BITS, |c| c == '0' || c == '1')
}

/// Up to 8 hex digits from the start of `text`.
pub fn parse_hex_input(text: &str) -> ParseResult<String> {
    parse_digits(text, "hex", WORD_NIBBLES, |c| c.is_ascii_hexdigit())
}

/// Four bits per hex digit; characters that are not hex digits read as `0`.
pub fn hex_to_bin(hex: &str) -> String {
    hex.chars()
        .map(|c| format!("{:04b}", c.to_digit(16).unwrap_or(0)))
        .collect()
}

/// Right-pads to a whole number of nibbles, then renders lowercase hex.
pub fn bin_to_hex(bin: &str) -> String {
    let bits: Vec<u32> = bin.chars().map(|c| u32::from(c == '1')).collect();
    bits.chunks(4)
        .map(|nib| {
            let v = (0..4).fold(0, |acc, i| (acc << 1) | nib.get(i).copied().unwrap_or(0));
            char::from_digit(v, 16).unwrap_or('0')
        })
        .collect()
}

/// Groups bits four at a time, separated by spaces.
pub fn group_nibbles(bits: &str) -> String {
    let chars: Vec<char> = bits.chars().collect();
    chars
        .chunks(4)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Zeros still missing to reach a full word.
pub fn zero_padding(bits: &str) -> String {
    "0".repeat(WORD_BITS.saturating_sub(bits.chars().count()))
}
