//! Assembly text to instruction bits.
//!
//! A line is tried against each [`Grammar`] in priority order; the first
//! grammar whose syntax matches owns the result, success or failure.

use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::diag::ParseResult;
use crate::field::FieldName;
use crate::instruction::Family;
use crate::tables::{InstructionSpec, Tables};

const MNEMONIC: &str = r"(\w+)";
const REGISTER: &str = r"\$(\w+)";
const LITERAL: &str = r"(-?\d\w*)";
const COMMA: &str = r"\s*,\s*";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown mnemonic {0}")]
    UnknownMnemonic(String),
    #[error("{}", unknown_registers(.0))]
    UnknownRegisters(Vec<String>),
    #[error("format is valid but not for {0}")]
    FormatMismatch(String),
    #[error("{field} value is out of range: {literal}")]
    OutOfRange { field: &'static str, literal: String },
    #[error("{field} is not a number: {literal}")]
    InvalidLiteral { field: &'static str, literal: String },
    #[error("internal error: {0}")]
    Internal(&'static str),
}

fn unknown_registers(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("unknown register: ${n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Register,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand<'a> {
    Register(u8),
    Literal(&'a str),
}

/// Operand bits plus any non-fatal notes gathered while building them.
#[derive(Debug, Default)]
struct Built {
    bits: String,
    notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `mn $rd, $rs, $rt`
    ThreeRegister,
    /// `mn $rt, $rs, imm` and `shift $rd, $rt, shamt`
    TwoRegisterImmediate,
    /// `mn $rt, imm($rs)`
    LoadStore,
    /// `mn address`
    Jump,
    /// `mn $rs, $rt`
    TwoRegister,
    /// `mn $r`
    OneRegister,
}

impl Grammar {
    /// Priority order.
    pub const ALL: [Grammar; 6] = [
        Grammar::ThreeRegister,
        Grammar::TwoRegisterImmediate,
        Grammar::LoadStore,
        Grammar::Jump,
        Grammar::TwoRegister,
        Grammar::OneRegister,
    ];

    fn pattern(self) -> String {
        match self {
            Grammar::ThreeRegister => format!(r"^{MNEMONIC}\s+{REGISTER}{COMMA}{REGISTER}{COMMA}{REGISTER}$"),
            Grammar::TwoRegisterImmediate => format!(r"^{MNEMONIC}\s+{REGISTER}{COMMA}{REGISTER}{COMMA}{LITERAL}$"),
            Grammar::LoadStore => format!(r"^{MNEMONIC}\s+{REGISTER}{COMMA}{LITERAL}?\s*\(\s*{REGISTER}\s*\)$"),
            Grammar::Jump => format!(r"^{MNEMONIC}\s+{LITERAL}$"),
            Grammar::TwoRegister => format!(r"^{MNEMONIC}\s+{REGISTER}{COMMA}{REGISTER}$"),
            Grammar::OneRegister => format!(r"^{MNEMONIC}\s+{REGISTER}$"),
        }
    }

    fn regex(self) -> &'static Regex {
        static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
        let all = COMPILED.get_or_init(|| {
            Grammar::ALL
                .iter()
                .map(|g| Regex::new(&g.pattern()).expect("grammar patterns are valid"))
                .collect()
        });
        &all[self as usize]
    }

    /// Operand slots in capture order.
    fn slots(self) -> &'static [Slot] {
        use Slot::*;
        match self {
            Grammar::ThreeRegister => &[Register, Register, Register],
            Grammar::TwoRegisterImmediate => &[Register, Register, Literal],
            Grammar::LoadStore => &[Register, Literal, Register],
            Grammar::Jump => &[Literal],
            Grammar::TwoRegister => &[Register, Register],
            Grammar::OneRegister => &[Register],
        }
    }

    /// Whether a mnemonic of `family` may be written in this grammar.
    pub fn accepts(self, family: Family) -> bool {
        match self {
            Grammar::ThreeRegister => family.is_r_type() && family != Family::Shift,
            Grammar::TwoRegisterImmediate => matches!(family, Family::Immediate | Family::Shift),
            Grammar::LoadStore => family.is_load_store(),
            Grammar::Jump => family == Family::Jump,
            Grammar::TwoRegister => family == Family::MultDiv,
            Grammar::OneRegister => matches!(family, Family::JumpRegister | Family::MoveFrom),
        }
    }

    fn build(self, spec: &InstructionSpec, family: Family, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
        match self {
            Grammar::ThreeRegister => three_register_bits(spec, ops),
            Grammar::TwoRegisterImmediate => immediate_bits(spec, family, ops),
            Grammar::LoadStore => load_store_bits(spec, family, ops),
            Grammar::Jump => jump_bits(ops),
            Grammar::TwoRegister => two_register_bits(spec, ops),
            Grammar::OneRegister => one_register_bits(spec, family, ops),
        }
    }
}

/// Assembler for single instructions.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'t> {
    tables: &'t Tables,
}

impl<'t> Encoder<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self { tables }
    }

    /// First grammar whose syntax matches `text`, regardless of mnemonic.
    pub fn grammar_of(&self, text: &str) -> Option<Grammar> {
        let line = text.trim().to_lowercase();
        Grammar::ALL.into_iter().find(|g| g.regex().is_match(&line))
    }

    /// Encodes one instruction into a 32-character bit string.
    pub fn encode(&self, text: &str) -> ParseResult<String> {
        let line = text.trim().to_lowercase();
        for grammar in Grammar::ALL {
            let Some(caps) = grammar.regex().captures(&line) else { continue };
            trace!(?grammar, line = line.as_str(), "syntax matched");
            return match self.encode_with(grammar, &caps) {
                Ok(Built { bits, notes }) if notes.is_empty() => ParseResult::ok(bits),
                Ok(Built { bits, notes }) => ParseResult::ok_with_info(bits, notes.join("\n")),
                Err(e) => {
                    debug!(?grammar, error = %e, "encode failed");
                    ParseResult::error(e.to_string())
                }
            };
        }
        debug!(line = line.as_str(), "no grammar matched");
        ParseResult::no_match()
    }

    fn encode_with(&self, grammar: Grammar, caps: &Captures<'_>) -> Result<Built, EncodeError> {
        let mnemonic = caps.get(1).map_or("", |m| m.as_str());
        let spec = self
            .tables
            .by_mnemonic(mnemonic)
            .ok_or_else(|| EncodeError::UnknownMnemonic(mnemonic.to_string()))?;

        let mut ops = Vec::with_capacity(grammar.slots().len());
        let mut bad_registers = Vec::new();
        for (i, slot) in grammar.slots().iter().enumerate() {
            let token = caps.get(i + 2).map(|m| m.as_str());
            match (slot, token) {
                (Slot::Register, Some(name)) => match self.register(name) {
                    Some(n) => ops.push(Operand::Register(n)),
                    None => bad_registers.push(name.to_string()),
                },
                (Slot::Register, None) => return Err(EncodeError::Internal("register slot without a capture")),
                // load/store may omit the offset
                (Slot::Literal, token) => ops.push(Operand::Literal(token.unwrap_or("0"))),
            }
        }
        if !bad_registers.is_empty() {
            return Err(EncodeError::UnknownRegisters(bad_registers));
        }

        let family = Family::of(spec);
        if !grammar.accepts(family) {
            return Err(EncodeError::FormatMismatch(spec.mnemonic.clone()));
        }

        let mut built = grammar.build(spec, family, &ops)?;
        built.bits.insert_str(0, &to_bits(u32::from(spec.opcode), FieldName::Opcode.width()));
        if built.bits.len() != 32 {
            return Err(EncodeError::Internal("encoded word is not 32 bits"));
        }
        Ok(built)
    }

    /// `$t0` style names, or a plain register number `0..=31`.
    fn register(&self, token: &str) -> Option<u8> {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            return token.parse::<u8>().ok().filter(|n| *n < 32);
        }
        self.tables.register_number(token)
    }
}

fn to_bits(value: u32, width: usize) -> String {
    format!("{value:0width$b}")
}

fn reg_bits(n: u8) -> String {
    to_bits(u32::from(n), FieldName::Rs.width())
}

fn zeros(name: FieldName) -> String {
    "0".repeat(name.width())
}

fn funct_bits(spec: &InstructionSpec) -> String {
    to_bits(u32::from(spec.function_code.unwrap_or(0)), FieldName::Funct.width())
}

fn registers<const N: usize>(ops: &[Operand<'_>]) -> Result<[u8; N], EncodeError> {
    let mut out = [0u8; N];
    if ops.len() != N {
        return Err(EncodeError::Internal("wrong operand count"));
    }
    for (slot, op) in out.iter_mut().zip(ops) {
        match op {
            Operand::Register(n) => *slot = *n,
            Operand::Literal(_) => return Err(EncodeError::Internal("expected a register operand")),
        }
    }
    Ok(out)
}

fn three_register_bits(spec: &InstructionSpec, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [rd, rs, rt] = registers::<3>(ops)?;
    let bits = [reg_bits(rs), reg_bits(rt), reg_bits(rd), zeros(FieldName::Shamt), funct_bits(spec)].concat();
    Ok(Built { bits, notes: Vec::new() })
}

fn two_register_bits(spec: &InstructionSpec, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [rs, rt] = registers::<2>(ops)?;
    let bits = [reg_bits(rs), reg_bits(rt), zeros(FieldName::Rd), zeros(FieldName::Shamt), funct_bits(spec)].concat();
    Ok(Built { bits, notes: Vec::new() })
}

fn one_register_bits(spec: &InstructionSpec, family: Family, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [r] = registers::<1>(ops)?;
    let bits = match family {
        Family::JumpRegister => [reg_bits(r), zeros(FieldName::Rt), zeros(FieldName::Rd), zeros(FieldName::Shamt), funct_bits(spec)].concat(),
        Family::MoveFrom => [zeros(FieldName::Rs), zeros(FieldName::Rt), reg_bits(r), zeros(FieldName::Shamt), funct_bits(spec)].concat(),
        _ => return Err(EncodeError::Internal("one-register layout for another family")),
    };
    Ok(Built { bits, notes: Vec::new() })
}

/// Tokens `[$a, $b, literal]`: `rt, rs, imm` for I-type, `rd, rt, shamt` for shifts.
fn immediate_bits(spec: &InstructionSpec, family: Family, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [a, b, literal] = ops else {
        return Err(EncodeError::Internal("wrong operand count"));
    };
    let [a, b] = registers::<2>(&[*a, *b])?;
    let Operand::Literal(literal) = *literal else {
        return Err(EncodeError::Internal("expected a literal operand"));
    };

    let mut notes = Vec::new();
    let bits = if family == Family::Shift {
        let (rd, rt) = (a, b);
        let shamt = field_bits(FieldKind::ShiftAmount, literal, &mut notes)?;
        [zeros(FieldName::Rs), reg_bits(rt), reg_bits(rd), shamt, funct_bits(spec)].concat()
    } else {
        let (rt, rs) = (a, b);
        let kind = if spec.has_unsigned_immediate() { FieldKind::UnsignedImmediate } else { FieldKind::SignedImmediate };
        let imm = field_bits(kind, literal, &mut notes)?;
        [reg_bits(rs), reg_bits(rt), imm].concat()
    };
    Ok(Built { bits, notes })
}

/// Tokens `[$rt, imm, $rs]`, reordered to the `[$rt, $rs, imm]` layout.
fn load_store_bits(spec: &InstructionSpec, family: Family, ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [dest, imm, base] = ops else {
        return Err(EncodeError::Internal("wrong operand count"));
    };
    immediate_bits(spec, family, &[*dest, *base, *imm])
}

fn jump_bits(ops: &[Operand<'_>]) -> Result<Built, EncodeError> {
    let [Operand::Literal(literal)] = ops else {
        return Err(EncodeError::Internal("expected a single address"));
    };
    let mut notes = Vec::new();
    let bits = field_bits(FieldKind::JumpAddress, literal, &mut notes)?;
    Ok(Built { bits, notes })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    SignedImmediate,
    UnsignedImmediate,
    ShiftAmount,
    JumpAddress,
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            FieldKind::SignedImmediate | FieldKind::UnsignedImmediate => "immediate",
            FieldKind::ShiftAmount => "shift amount",
            FieldKind::JumpAddress => "jump address",
        }
    }

    fn width(self) -> usize {
        match self {
            FieldKind::SignedImmediate | FieldKind::UnsignedImmediate => FieldName::Immediate.width(),
            FieldKind::ShiftAmount => FieldName::Shamt.width(),
            FieldKind::JumpAddress => FieldName::JumpAddress.width(),
        }
    }

    fn range(self) -> (i64, i64) {
        let w = self.width() as u32;
        match self {
            FieldKind::SignedImmediate => (-(1i64 << (w - 1)), (1i64 << (w - 1)) - 1),
            _ => (0, (1i64 << w) - 1),
        }
    }
}

/// Parses `literal`, range checks it for `kind` and renders the field bits.
/// Signed values come out as two's complement.
fn field_bits(kind: FieldKind, literal: &str, notes: &mut Vec<String>) -> Result<String, EncodeError> {
    let lit = Literal::parse(literal).ok_or_else(|| EncodeError::InvalidLiteral {
        field: kind.label(),
        literal: literal.to_string(),
    })?;
    let out_of_range = || EncodeError::OutOfRange { field: kind.label(), literal: literal.to_string() };
    let value = lit.value.ok_or_else(out_of_range)?;
    let (lo, hi) = kind.range();
    if value < lo || value > hi {
        return Err(out_of_range());
    }
    if lit.consumed.len() < literal.len() {
        notes.push(format!("{} \"{}\" read as {}", kind.label(), literal, lit.consumed));
    }
    let mask = (1u64 << kind.width()) - 1;
    Ok(to_bits(((value as u64) & mask) as u32, kind.width()))
}

/// A numeric literal: optional `-`, optional `0x`/`0b`, then digits of that base.
/// Reading stops at the first character that is not a digit of the base.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Literal<'a> {
    /// `None` when the magnitude overflows.
    value: Option<i64>,
    /// The prefix of the input that was actually read.
    consumed: &'a str,
}

impl<'a> Literal<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (radix, digits) = if let Some(d) = body.strip_prefix("0x") {
            (16, d)
        } else if let Some(d) = body.strip_prefix("0b") {
            (2, d)
        } else {
            (10, body)
        };
        let n = digits.chars().take_while(|c| c.is_digit(radix)).count();
        if n == 0 {
            return None;
        }
        let read = &digits[..n];
        let consumed = &text[..text.len() - digits.len() + n];
        let value = i64::from_str_radix(read, radix)
            .ok()
            .map(|v| if negative { -v } else { v });
        Some(Self { value, consumed })
    }
}
