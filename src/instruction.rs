use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldName};
use crate::tables::{InstrKind, InstructionSpec};

pub const SHIFT_MNEMONICS: &[&str] = &["sll", "srl", "sra"];
pub const MULT_DIV_MNEMONICS: &[&str] = &["mult", "multu", "div", "divu"];
pub const MOVE_FROM_MNEMONICS: &[&str] = &["mfhi", "mflo"];
pub const LOAD_MNEMONICS: &[&str] = &["lbu", "lhu", "ll", "lui", "lw", "lb"];
pub const STORE_MNEMONICS: &[&str] = &["sb", "sc", "sh", "sw"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    R,
    I,
    J,
    Unknown,
}

impl From<InstrKind> for Kind {
    fn from(k: InstrKind) -> Self {
        match k {
            InstrKind::R => Kind::R,
            InstrKind::I => Kind::I,
            InstrKind::J => Kind::J,
        }
    }
}

/// What a field means for one particular mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Instruction,
    Destination,
    Source1,
    Source2,
    Immediate,
    ShiftAmount,
    JumpAddress,
    Unused,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandSet: u8 {
const RS = 1 << 0;
const RT = 1 << 1;
const RD = 1 << 2;
const SHAMT = 1 << 3;
const IMMEDIATE = 1 << 4;
const JUMP_ADDRESS = 1 << 5;
}
}

impl OperandSet {
    pub fn of_field(name: FieldName) -> Self {
        match name {
            FieldName::Rs => OperandSet::RS,
            FieldName::Rt => OperandSet::RT,
            FieldName::Rd => OperandSet::RD,
            FieldName::Shamt => OperandSet::SHAMT,
            FieldName::Immediate => OperandSet::IMMEDIATE,
            FieldName::JumpAddress => OperandSet::JUMP_ADDRESS,
            FieldName::Opcode | FieldName::Funct | FieldName::Unknown => OperandSet::empty(),
        }
    }
}

/// Operand layout family of a mnemonic. Decides both the assembly syntax
/// and which physically present fields carry meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `mn rd, rs, rt`
    ThreeRegister,
    /// `jr rs`
    JumpRegister,
    /// `mn rd, rt, shamt`
    Shift,
    /// `mn rs, rt`
    MultDiv,
    /// `mn rd`
    MoveFrom,
    /// `mn rt, imm(rs)`, rt written
    Load,
    /// `mn rt, imm(rs)`, rt read
    Store,
    /// `mn rt, rs, imm`
    Immediate,
    /// `mn addr`
    Jump,
}

impl Family {
    pub fn of(spec: &InstructionSpec) -> Self {
        let mn = spec.mnemonic.as_str();
        match spec.kind {
            InstrKind::R if mn == "jr" => Family::JumpRegister,
            InstrKind::R if SHIFT_MNEMONICS.contains(&mn) => Family::Shift,
            InstrKind::R if MULT_DIV_MNEMONICS.contains(&mn) => Family::MultDiv,
            InstrKind::R if MOVE_FROM_MNEMONICS.contains(&mn) => Family::MoveFrom,
            InstrKind::R => Family::ThreeRegister,
            _ if LOAD_MNEMONICS.contains(&mn) => Family::Load,
            _ if STORE_MNEMONICS.contains(&mn) => Family::Store,
            InstrKind::I => Family::Immediate,
            InstrKind::J => Family::Jump,
        }
    }

    pub fn is_r_type(self) -> bool {
        matches!(
            self,
            Family::ThreeRegister | Family::JumpRegister | Family::Shift | Family::MultDiv | Family::MoveFrom
        )
    }

    pub fn is_load_store(self) -> bool {
        matches!(self, Family::Load | Family::Store)
    }

    /// Role of `name` for this family.
    pub fn role_of(self, name: FieldName) -> Role {
        use FieldName as F;
        match (self, name) {
            (_, F::Opcode) | (_, F::Funct) => Role::Instruction,
            (Family::ThreeRegister, F::Rd) => Role::Destination,
            (Family::ThreeRegister, F::Rs) => Role::Source1,
            (Family::ThreeRegister, F::Rt) => Role::Source2,
            (Family::JumpRegister, F::Rs) => Role::Source1,
            (Family::Shift, F::Rd) => Role::Destination,
            (Family::Shift, F::Rt) => Role::Source1,
            (Family::Shift, F::Shamt) => Role::ShiftAmount,
            (Family::MultDiv, F::Rs) => Role::Source1,
            (Family::MultDiv, F::Rt) => Role::Source2,
            (Family::MoveFrom, F::Rd) => Role::Destination,
            (Family::Load, F::Rt) => Role::Destination,
            (Family::Load, F::Rs) => Role::Source1,
            (Family::Store, F::Rt) => Role::Source1,
            (Family::Store, F::Rs) => Role::Source2,
            (Family::Immediate, F::Rt) => Role::Source1,
            (Family::Immediate, F::Rs) => Role::Source2,
            (Family::Load | Family::Store | Family::Immediate, F::Immediate) => Role::Immediate,
            (Family::Jump, F::JumpAddress) => Role::JumpAddress,
            _ => Role::Unused,
        }
    }

    /// Operand fields in the order they appear in assembly text.
    pub fn text_operands(self) -> &'static [FieldName] {
        use FieldName as F;
        match self {
            Family::ThreeRegister => &[F::Rd, F::Rs, F::Rt],
            Family::JumpRegister => &[F::Rs],
            Family::Shift => &[F::Rd, F::Rt, F::Shamt],
            Family::MultDiv => &[F::Rs, F::Rt],
            Family::MoveFrom => &[F::Rd],
            Family::Load | Family::Store => &[F::Rt, F::Immediate, F::Rs],
            Family::Immediate => &[F::Rt, F::Rs, F::Immediate],
            Family::Jump => &[F::JumpAddress],
        }
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub kind: Kind,
    /// Fields in bit order, most significant first.
    pub fields: Vec<Field>,
    /// `roles[i]` belongs to `fields[i]`.
    pub roles: Vec<Role>,
    pub spec: Option<InstructionSpec>,
}

impl Instruction {
    pub fn new(kind: Kind, fields: Vec<Field>, spec: Option<InstructionSpec>) -> Self {
        let family = spec.as_ref().map(Family::of);
        let roles = fields
            .iter()
            .map(|f| match (family, f.name) {
                (Some(fam), name) => fam.role_of(name),
                (None, FieldName::Opcode) | (None, FieldName::Funct) => Role::Instruction,
                (None, _) => Role::Unused,
            })
            .collect();
        Self { kind, fields, roles, spec }
    }

    pub fn family(&self) -> Option<Family> {
        match self.kind {
            Kind::Unknown => None,
            _ => self.spec.as_ref().map(Family::of),
        }
    }

    pub fn mnemonic(&self) -> Option<&str> {
        self.spec.as_ref().map(|s| s.mnemonic.as_str())
    }

    pub fn field(&self, name: FieldName) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn role(&self, name: FieldName) -> Option<Role> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| self.roles[i])
    }

    /// First field carrying `role`. Opcode wins for [`Role::Instruction`].
    pub fn field_with_role(&self, role: Role) -> Option<&Field> {
        self.fields
            .iter()
            .zip(&self.roles)
            .find(|(_, r)| **r == role)
            .map(|(f, _)| f)
    }

    pub fn used_operands(&self) -> OperandSet {
        self.fields
            .iter()
            .zip(&self.roles)
            .filter(|(_, r)| **r != Role::Unused)
            .fold(OperandSet::empty(), |acc, (f, _)| acc | OperandSet::of_field(f.name))
    }

    /// Sum of declared field widths; 32 for every layout.
    pub fn bit_len(&self) -> usize {
        self.fields.iter().map(Field::width).sum()
    }

    /// The bits actually consumed from the input.
    pub fn raw_bits(&self) -> String {
        self.fields.iter().map(|f| f.raw_bits.as_str()).collect()
    }

    pub fn is_truncated(&self) -> bool {
        self.fields.iter().any(Field::is_truncated)
    }
}
