use mips_codec::{fmt_instruction, Decoder, FieldName, ImmediateFormat, Kind, MipsDecoder, RegisterMode, Role, Settings, Tables};
use pretty_assertions::assert_eq;

fn settings(register_mode: RegisterMode, immediate_format: ImmediateFormat) -> Settings {
    Settings { register_mode, immediate_format }
}

#[test]
fn add_with_register_numbers() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    // opcode 0, rs=1, rt=2, rd=3, shamt=0, funct=32
    let bits = ["000000", "00001", "00010", "00011", "00000", "100000"].concat();
    let insn = dec.decode(&bits, &settings(RegisterMode::Numbers, ImmediateFormat::Decimal));
    assert_eq!(insn.kind, Kind::R);
    assert_eq!(fmt_instruction(&insn).as_deref(), Some("add $3, $1, $2"));
}

#[test]
fn field_layouts_cover_32_bits() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    let s = settings(RegisterMode::Names, ImmediateFormat::Hex);
    for (bits, kind, n) in [
        ("00000000000000000000000000100000", Kind::R, 6),
        ("00100000000000000000000000000000", Kind::I, 4),
        ("00001000000000000000000000000000", Kind::J, 2),
        ("11111100000000000000000000000000", Kind::Unknown, 2),
    ] {
        let insn = dec.decode(bits, &s);
        assert_eq!(insn.kind, kind);
        assert_eq!(insn.fields.len(), n);
        assert_eq!(insn.roles.len(), n);
        assert_eq!(insn.bit_len(), 32);
        assert!(!insn.is_truncated());
    }
}

#[test]
fn truncated_word_is_padded() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    // addi with only rs and half of rt present
    let insn = dec.decode("00100001001010", &settings(RegisterMode::Names, ImmediateFormat::Decimal));
    assert_eq!(insn.kind, Kind::I);
    assert!(insn.is_truncated());
    let rt = insn.field(FieldName::Rt).unwrap();
    assert_eq!(rt.raw_bits, "010");
    assert_eq!(rt.value, 0b01000);
    assert_eq!(rt.display, "$t0");
    let imm = insn.field(FieldName::Immediate).unwrap();
    assert_eq!(imm.raw_bits, "");
    assert_eq!(imm.display, "0");
    assert_eq!(fmt_instruction(&insn).as_deref(), Some("addi $t0, $t1, 0"));
}

#[test]
fn short_opcode_is_unknown() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    let insn = dec.decode("0000", &settings(RegisterMode::Names, ImmediateFormat::Hex));
    assert_eq!(insn.kind, Kind::Unknown);
    assert_eq!(insn.fields[0].display, "R");
    assert_eq!(fmt_instruction(&insn), None);
}

#[test]
fn immediate_formats() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    // addi $t0, $t1, -16
    let bits = "00100001001010001111111111110000";
    let show = |fmt| {
        let insn = dec.decode(bits, &settings(RegisterMode::Names, fmt));
        insn.field(FieldName::Immediate).unwrap().display.clone()
    };
    assert_eq!(show(ImmediateFormat::Decimal), "-16");
    assert_eq!(show(ImmediateFormat::Hex), "-0x10");
    assert_eq!(show(ImmediateFormat::Binary), "-0b10000");
}

#[test]
fn jump_address_is_unsigned() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    let insn = dec.decode("00001111111111111111111111111111", &settings(RegisterMode::Names, ImmediateFormat::Hex));
    assert_eq!(fmt_instruction(&insn).as_deref(), Some("jal 0x3ffffff"));
    assert_eq!(insn.role(FieldName::JumpAddress), Some(Role::JumpAddress));
}

#[test]
fn shift_roles_mark_rs_unused() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    // sll $t0, $t2, 4 with junk in rs
    let bits = ["000000", "11111", "01010", "01000", "00100", "000000"].concat();
    let insn = dec.decode(&bits, &settings(RegisterMode::Names, ImmediateFormat::Decimal));
    assert_eq!(fmt_instruction(&insn).as_deref(), Some("sll $t0, $t2, 4"));
    assert_eq!(
        insn.roles,
        vec![Role::Instruction, Role::Unused, Role::Source1, Role::Destination, Role::ShiftAmount, Role::Instruction]
    );
}

#[test]
fn decode_is_total_over_arbitrary_text() {
    let t = Tables::builtin().unwrap();
    let dec = MipsDecoder::new(&t);
    let alphabet: Vec<char> = "01 x\u{e9}\u{1F600}-9".chars().collect();
    let mut seed = 0x2545_f491_u32;
    for len in 0..=64 {
        for _ in 0..8 {
            let text: String = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    alphabet[(seed >> 16) as usize % alphabet.len()]
                })
                .collect();
            for s in [
                settings(RegisterMode::Names, ImmediateFormat::Hex),
                settings(RegisterMode::Numbers, ImmediateFormat::Binary),
            ] {
                let insn = dec.decode(&text, &s);
                assert_eq!(insn.bit_len(), 32);
                let _ = fmt_instruction(&insn);
            }
        }
    }
}
