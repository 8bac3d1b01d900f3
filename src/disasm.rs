use serde::Serialize;

use crate::field::FieldName;
use crate::instruction::{Family, Instruction, Role};

/// One token of formatted assembly. Punctuation has no role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
    pub role: Option<Role>,
}

impl Part {
    fn token(text: &str, role: Role) -> Self {
        Self { text: text.to_string(), role: Some(role) }
    }

    fn punct(text: &str) -> Self {
        Self { text: text.to_string(), role: None }
    }
}

/// Assembly tokens for `insn`, or `None` when the word has no textual form
/// (unknown opcode or function code).
pub fn fmt_parts(insn: &Instruction) -> Option<Vec<Part>> {
    let family = insn.family()?;
    let mnemonic = insn.mnemonic()?;

    let operand = |name: FieldName| -> Option<Part> {
        let field = insn.field(name)?;
        Some(Part::token(&field.display, family.role_of(name)))
    };

    let mut parts = vec![Part::token(mnemonic, Role::Instruction), Part::punct(" ")];
    match family {
        Family::Load | Family::Store => {
            // mn rt, imm(rs)
            parts.push(operand(FieldName::Rt)?);
            parts.push(Part::punct(", "));
            parts.push(operand(FieldName::Immediate)?);
            parts.push(Part::punct("("));
            parts.push(operand(FieldName::Rs)?);
            parts.push(Part::punct(")"));
        }
        _ => {
            for (i, name) in family.text_operands().iter().enumerate() {
                if i > 0 {
                    parts.push(Part::punct(", "));
                }
                parts.push(operand(*name)?);
            }
        }
    }
    Some(parts)
}

pub fn fmt_instruction(insn: &Instruction) -> Option<String> {
    fmt_parts(insn).map(|parts| parts.iter().map(|p| p.text.as_str()).collect())
}

/// Roles in the order they appear in the formatted text.
pub fn text_roles(insn: &Instruction) -> Option<Vec<Role>> {
    fmt_parts(insn).map(|parts| parts.iter().filter_map(|p| p.role).collect())
}
