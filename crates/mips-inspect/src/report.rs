use serde::Serialize;

use mips_codec::disasm::{fmt_instruction, fmt_parts, Part};
use mips_codec::input::{bin_to_hex, group_nibbles, zero_padding};
use mips_codec::{Diagnostic, FieldName, Instruction, Kind, Role};

/// One field of the word and where it sits, bit 0 being the leftmost.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub name: FieldName,
    pub role: Role,
    /// First bit position, inclusive.
    pub start: usize,
    /// Last bit position, exclusive.
    pub end: usize,
    pub raw_bits: String,
    pub value: u32,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub bits: String,
    /// Zeros appended to reach a full word when the input was short.
    pub padding: String,
    pub hex: String,
    pub kind: Kind,
    pub mnemonic: Option<String>,
    pub full_name: Option<String>,
    pub asm: Option<String>,
    /// Register written by the instruction, if any.
    pub destination: Option<String>,
    pub parts: Vec<Part>,
    pub fields: Vec<FieldReport>,
    pub message: Option<Diagnostic>,
}

impl Report {
    pub fn from_instruction(insn: &Instruction, message: Option<Diagnostic>) -> Self {
        let mut start = 0usize;
        let fields = insn
            .fields
            .iter()
            .zip(&insn.roles)
            .map(|(f, role)| {
                let out = FieldReport {
                    name: f.name,
                    role: *role,
                    start,
                    end: start + f.width(),
                    raw_bits: f.raw_bits.clone(),
                    value: f.value,
                    display: f.display.clone(),
                };
                start += f.width();
                out
            })
            .collect();

        let bits = insn.raw_bits();
        Self {
            hex: bin_to_hex(&bits),
            padding: zero_padding(&bits),
            bits,
            kind: insn.kind,
            mnemonic: insn.mnemonic().map(str::to_string),
            full_name: insn.spec.as_ref().map(|s| s.full_name.clone()),
            asm: fmt_instruction(insn),
            destination: insn.field_with_role(Role::Destination).map(|f| f.display.clone()),
            parts: fmt_parts(insn).unwrap_or_default(),
            fields,
            message,
        }
    }

    /// Plain-text rendering for the terminal.
    pub fn to_text(&self) -> String {
        use std::fmt::Write as _;
        let mut buf = String::new();
        let _ = writeln!(buf, "bits : {}", group_nibbles(&self.bits));
        if !self.padding.is_empty() {
            let _ = writeln!(buf, "pad  : {} zero bits", self.padding.len());
        }
        let _ = writeln!(buf, "hex  : 0x{}", self.hex);
        let _ = writeln!(buf, "type : {:?}", self.kind);
        match (&self.asm, &self.full_name) {
            (Some(asm), Some(name)) => { let _ = writeln!(buf, "asm  : {asm}    ; {name}"); }
            (Some(asm), None) => { let _ = writeln!(buf, "asm  : {asm}"); }
            _ => { let _ = writeln!(buf, "asm  : <no representation>"); }
        }
        if let Some(dest) = &self.destination {
            let _ = writeln!(buf, "dest : {dest}");
        }
        let _ = writeln!(buf, "{:<13} {:<7} {:<13} {:<27} {}", "field", "bits", "role", "raw", "value");
        for f in &self.fields {
            let _ = writeln!(
                buf,
                "{:<13} {:>2}..{:<3} {:<13} {:<27} {}",
                f.name.label(),
                f.start,
                f.end,
                role_label(f.role),
                f.raw_bits,
                f.display
            );
        }
        if let Some(msg) = &self.message {
            let _ = writeln!(buf, "{msg}");
        }
        buf
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Instruction => "instruction",
        Role::Destination => "destination",
        Role::Source1 => "source 1",
        Role::Source2 => "source 2",
        Role::Immediate => "immediate",
        Role::ShiftAmount => "shift amount",
        Role::JumpAddress => "jump address",
        Role::Unused => "unused",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mips_codec::{Decoder, ImmediateFormat, MipsDecoder, RegisterMode, Settings, Tables};
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings { register_mode: RegisterMode::Names, immediate_format: ImmediateFormat::Hex }
    }

    #[test]
    fn field_ranges_tile_the_word() {
        let t = Tables::builtin().unwrap();
        let insn = MipsDecoder::new(&t).decode("00000001001010100100000000100000", &settings());
        let r = Report::from_instruction(&insn, None);
        let ranges: Vec<(usize, usize)> = r.fields.iter().map(|f| (f.start, f.end)).collect();
        assert_eq!(ranges, vec![(0, 6), (6, 11), (11, 16), (16, 21), (21, 26), (26, 32)]);
        assert_eq!(r.hex, "012a4020");
        assert_eq!(r.asm.as_deref(), Some("add $t0, $t1, $t2"));
    }

    #[test]
    fn text_report_mentions_roles() {
        let t = Tables::builtin().unwrap();
        let insn = MipsDecoder::new(&t).decode("00000001001010100100000000100000", &settings());
        let text = Report::from_instruction(&insn, None).to_text();
        assert!(text.contains("asm  : add $t0, $t1, $t2    ; Add"));
        assert!(text.contains("destination"));
        assert!(text.contains("unused"));
        assert!(text.contains("dest : $t0"));
        assert!(!text.contains("pad  :"));
    }

    #[test]
    fn short_input_reports_padding() {
        let t = Tables::builtin().unwrap();
        let insn = MipsDecoder::new(&t).decode("000010", &settings());
        let r = Report::from_instruction(&insn, None);
        assert_eq!(r.padding.len(), 26);
        assert!(r.destination.is_none());
        assert!(r.to_text().contains("pad  : 26 zero bits"));
    }

    #[test]
    fn report_serializes() {
        let t = Tables::builtin().unwrap();
        let insn = MipsDecoder::new(&t).decode("000010", &settings());
        let json = serde_json::to_value(Report::from_instruction(&insn, None)).unwrap();
        assert_eq!(json["kind"], "J");
        assert_eq!(json["fields"][1]["name"], "jump_address");
        assert_eq!(json["fields"][1]["role"], "jump_address");
    }
}
