use tracing::{debug, trace};

use crate::field::{bits_value, FieldExtractor, FieldName};
use crate::instruction::{Instruction, Kind};
use crate::interpret;
use crate::settings::Settings;
use crate::tables::Tables;

pub trait Decoder {
    /// Total: any input, including short or non-binary text, yields an instruction.
    fn decode(&self, bits: &str, settings: &Settings) -> Instruction;
}

/// Table-driven MIPS decoder.
#[derive(Debug, Clone, Copy)]
pub struct MipsDecoder<'t> {
    tables: &'t Tables,
}

impl<'t> MipsDecoder<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self { tables }
    }

    /// Layout selected by the leading opcode bits.
    pub fn kind_of(&self, bits: &str) -> Kind {
        if bits.chars().count() < FieldName::Opcode.width() {
            return Kind::Unknown;
        }
        let opcode: String = bits.chars().take(FieldName::Opcode.width()).collect();
        match bits_value(&opcode) {
            0 => Kind::R,
            op => self
                .tables
                .by_opcode(op)
                .map(|s| Kind::from(s.kind))
                .unwrap_or(Kind::Unknown),
        }
    }
}

impl Decoder for MipsDecoder<'_> {
    fn decode(&self, bits: &str, settings: &Settings) -> Instruction {
        let t = self.tables;
        let kind = self.kind_of(bits);
        trace!(bits, ?kind, "dispatch");

        let mut ex = FieldExtractor::new(bits);
        let opcode = ex.extract_field(FieldName::Opcode, |b| interpret::opcode(t, b));
        let reg = |b: &str| interpret::register(t, settings.register_mode, b);

        let insn = match kind {
            Kind::R => {
                let rs = ex.extract_field(FieldName::Rs, reg);
                let rt = ex.extract_field(FieldName::Rt, reg);
                let rd = ex.extract_field(FieldName::Rd, reg);
                let shamt = ex.extract_field(FieldName::Shamt, interpret::shift_amount);
                let funct = ex.extract_field(FieldName::Funct, |b| interpret::function_code(t, b));
                // opcode is 0 for every R-type; the function code picks the spec
                let spec = t.by_function_code(funct.value).cloned();
                Instruction::new(Kind::R, vec![opcode, rs, rt, rd, shamt, funct], spec)
            }
            Kind::I => {
                let spec = t.by_opcode(opcode.value).cloned();
                let signed = !spec.as_ref().is_some_and(|s| s.has_unsigned_immediate());
                let rs = ex.extract_field(FieldName::Rs, reg);
                let rt = ex.extract_field(FieldName::Rt, reg);
                let imm = ex.extract_field(FieldName::Immediate, |b| interpret::immediate(settings, signed, b));
                Instruction::new(Kind::I, vec![opcode, rs, rt, imm], spec)
            }
            Kind::J => {
                let spec = t.by_opcode(opcode.value).cloned();
                let addr = ex.extract_field(FieldName::JumpAddress, |b| {
                    interpret::jump_address(settings.immediate_format, b)
                });
                Instruction::new(Kind::J, vec![opcode, addr], spec)
            }
            Kind::Unknown => {
                let tail = ex.extract_field(FieldName::Unknown, interpret::unknown);
                Instruction::new(Kind::Unknown, vec![opcode, tail], None)
            }
        };

        debug!(
            kind = ?insn.kind,
            mnemonic = insn.mnemonic().unwrap_or("?"),
            truncated = insn.is_truncated(),
            "decoded"
        );
        insn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Role;
    use crate::settings::{ImmediateFormat, RegisterMode};

    fn numbers() -> Settings {
        Settings { register_mode: RegisterMode::Numbers, immediate_format: ImmediateFormat::Decimal }
    }

    #[test]
    fn dispatch_on_opcode() {
        let t = Tables::builtin().unwrap();
        let dec = MipsDecoder::new(&t);
        assert_eq!(dec.kind_of("000000"), Kind::R);
        assert_eq!(dec.kind_of("001000"), Kind::I);
        assert_eq!(dec.kind_of("000010"), Kind::J);
        assert_eq!(dec.kind_of("111111"), Kind::Unknown);
        assert_eq!(dec.kind_of("00000"), Kind::Unknown);
    }

    #[test]
    fn r_type_resolves_spec_by_function_code() {
        let t = Tables::builtin().unwrap();
        let dec = MipsDecoder::new(&t);
        let insn = dec.decode("00000000001000100001100000100010", &numbers());
        assert_eq!(insn.mnemonic(), Some("sub"));
        assert_eq!(insn.field(FieldName::Rd).unwrap().display, "$3");
        assert_eq!(insn.role(FieldName::Shamt), Some(Role::Unused));
    }

    #[test]
    fn unknown_function_code_has_no_spec() {
        let t = Tables::builtin().unwrap();
        let dec = MipsDecoder::new(&t);
        let insn = dec.decode("00000000000000000000000000111111", &numbers());
        assert_eq!(insn.kind, Kind::R);
        assert!(insn.spec.is_none());
        assert_eq!(insn.field(FieldName::Funct).unwrap().display, "unknown");
    }

    #[test]
    fn addiu_immediate_is_unsigned() {
        let t = Tables::builtin().unwrap();
        let dec = MipsDecoder::new(&t);
        let addiu = dec.decode("00100100000000001111111111111111", &numbers());
        assert_eq!(addiu.field(FieldName::Immediate).unwrap().display, "65535");
        let addi = dec.decode("00100000000000001111111111111111", &numbers());
        assert_eq!(addi.field(FieldName::Immediate).unwrap().display, "-1");
    }

    #[test]
    fn unknown_opcode_passes_tail_through() {
        let t = Tables::builtin().unwrap();
        let dec = MipsDecoder::new(&t);
        let insn = dec.decode("11111110", &numbers());
        assert_eq!(insn.kind, Kind::Unknown);
        assert_eq!(insn.fields[0].display, "unknown");
        assert_eq!(insn.fields[1].raw_bits, "10");
        assert_eq!(insn.fields[1].display, "10000000000000000000000000");
        assert_eq!(insn.bit_len(), 32);
    }
}
