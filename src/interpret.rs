//! Field interpreters: padded bits in, display text out.
//!
//! Each function is independent of the cursor. `None` means the lookup
//! missed and the field shows [`crate::field::UNKNOWN`].

use crate::field::bits_value;
use crate::settings::{ImmediateFormat, RegisterMode, Settings};
use crate::tables::Tables;

pub fn opcode(tables: &Tables, bits: &str) -> Option<String> {
    match bits_value(bits) {
        0 => Some("R".to_string()),
        op => tables.by_opcode(op).map(|s| s.mnemonic.clone()),
    }
}

pub fn function_code(tables: &Tables, bits: &str) -> Option<String> {
    tables
        .by_function_code(bits_value(bits))
        .map(|s| s.mnemonic.clone())
}

pub fn register(tables: &Tables, mode: RegisterMode, bits: &str) -> Option<String> {
    let n = bits_value(bits);
    Some(match mode {
        RegisterMode::Numbers => format!("${n}"),
        RegisterMode::Names => format!("${}", tables.register_name(n).unwrap_or("unknown")),
    })
}

pub fn shift_amount(bits: &str) -> Option<String> {
    Some(bits_value(bits).to_string())
}

/// Two's-complement reading of `bits`: the top bit weighs `-2^(n-1)`.
pub fn signed_value(bits: &str) -> i64 {
    let n = bits.chars().count();
    let raw = i64::from(bits_value(bits));
    if n == 0 || n > 32 || !bits.starts_with('1') {
        raw
    } else {
        raw - (1i64 << n)
    }
}

pub fn immediate(settings: &Settings, signed: bool, bits: &str) -> Option<String> {
    let fmt = settings.immediate_format;
    Some(if signed {
        fmt.format_signed(signed_value(bits))
    } else {
        fmt.format_unsigned(u64::from(bits_value(bits)))
    })
}

pub fn jump_address(format: ImmediateFormat, bits: &str) -> Option<String> {
    Some(format.format_unsigned(u64::from(bits_value(bits))))
}

pub fn unknown(bits: &str) -> Option<String> {
    Some(bits.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex() -> Settings {
        Settings { register_mode: RegisterMode::Numbers, immediate_format: ImmediateFormat::Hex }
    }

    #[test]
    fn opcode_zero_is_r_and_misses_are_none() {
        let t = Tables::builtin().unwrap();
        assert_eq!(opcode(&t, "000000").as_deref(), Some("R"));
        assert_eq!(opcode(&t, "001000").as_deref(), Some("addi"));
        assert_eq!(opcode(&t, "111111"), None);
    }

    #[test]
    fn function_code_lookup() {
        let t = Tables::builtin().unwrap();
        assert_eq!(function_code(&t, "100000").as_deref(), Some("add"));
        assert_eq!(function_code(&t, "111111"), None);
    }

    #[test]
    fn registers_by_name_and_number() {
        let t = Tables::builtin().unwrap();
        assert_eq!(register(&t, RegisterMode::Numbers, "01000").as_deref(), Some("$8"));
        assert_eq!(register(&t, RegisterMode::Names, "01000").as_deref(), Some("$t0"));
    }

    #[test]
    fn unnamed_register_reads_unknown() {
        let mut regs = Tables::builtin().unwrap().registers().to_vec();
        regs.retain(|r| r.number != 8);
        let t = Tables::new(Vec::new(), regs).unwrap();
        assert_eq!(register(&t, RegisterMode::Names, "01000").as_deref(), Some("$unknown"));
    }

    #[test]
    fn signed_immediates_use_twos_complement() {
        assert_eq!(signed_value("1111111111111111"), -1);
        assert_eq!(signed_value("1000000000000000"), -32768);
        assert_eq!(signed_value("0111111111111111"), 32767);
        assert_eq!(immediate(&hex(), true, "1111111111111110").as_deref(), Some("-0x2"));
        assert_eq!(immediate(&hex(), false, "1111111111111110").as_deref(), Some("0xfffe"));
    }

    #[test]
    fn shift_and_jump_are_unsigned() {
        assert_eq!(shift_amount("11111").as_deref(), Some("31"));
        assert_eq!(
            jump_address(ImmediateFormat::Decimal, "11111111111111111111111111").as_deref(),
            Some("67108863")
        );
    }
}
