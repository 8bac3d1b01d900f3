//! Reference tables: the instruction set and the register file names.
//!
//! Both lists are immutable once a [`Tables`] is built and are shared by
//! reference with the decoder and the encoder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const BUILTIN_INSTRUCTIONS: &str = include_str!("../data/instructions.json");
const BUILTIN_REGISTERS: &str = include_str!("../data/registers.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrKind {
    R,
    I,
    J,
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstrKind::R => "R",
            InstrKind::I => "I",
            InstrKind::J => "J",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSpec {
    pub mnemonic: String,
    pub opcode: u8,
    pub function_code: Option<u8>,
    #[serde(rename = "type")]
    pub kind: InstrKind,
    pub full_name: String,
}

impl InstructionSpec {
    /// Immediates are read as unsigned only for the `...u` mnemonics (`addiu`, `sltiu`, `lbu`, ...).
    pub fn has_unsigned_immediate(&self) -> bool {
        self.mnemonic.ends_with('u')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntry {
    pub number: u8,
    pub name: String,
}

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("malformed table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{mnemonic}: opcode {opcode} does not fit in 6 bits")]
    OpcodeRange { mnemonic: String, opcode: u8 },
    #[error("{mnemonic}: function code {code} does not fit in 6 bits")]
    FunctionCodeRange { mnemonic: String, code: u8 },
    #[error("{mnemonic}: R-type entries need opcode 0 and a function code")]
    MalformedR { mnemonic: String },
    #[error("{mnemonic}: opcode 0 is reserved for R-type entries")]
    ReservedOpcode { mnemonic: String },
    #[error("{mnemonic}: only R-type entries carry a function code")]
    UnexpectedFunctionCode { mnemonic: String },
    #[error("opcode {opcode} is shared by {first} and {second}")]
    DuplicateOpcode { opcode: u8, first: String, second: String },
    #[error("function code {code} is shared by {first} and {second}")]
    DuplicateFunctionCode { code: u8, first: String, second: String },
    #[error("mnemonic {0} is declared twice")]
    DuplicateMnemonic(String),
    #[error("register ${name}: number {number} does not fit in 5 bits")]
    RegisterRange { name: String, number: u8 },
    #[error("register {0} is declared twice")]
    DuplicateRegister(String),
}

#[derive(Debug, Clone)]
pub struct Tables {
    instructions: Vec<InstructionSpec>,
    registers: Vec<RegisterEntry>,
}

impl Tables {
    /// Builds the tables from already-parsed lists, checking that every
    /// lookup key is unique and in range.
    pub fn new(
        instructions: Vec<InstructionSpec>,
        registers: Vec<RegisterEntry>,
    ) -> Result<Self, TableError> {
        let mut mnemonics = HashSet::new();
        for (i, spec) in instructions.iter().enumerate() {
            if spec.opcode > 0x3F {
                return Err(TableError::OpcodeRange { mnemonic: spec.mnemonic.clone(), opcode: spec.opcode });
            }
            match (spec.kind, spec.function_code) {
                (InstrKind::R, Some(code)) if spec.opcode == 0 => {
                    if code > 0x3F {
                        return Err(TableError::FunctionCodeRange { mnemonic: spec.mnemonic.clone(), code });
                    }
                }
                (InstrKind::R, _) => {
                    return Err(TableError::MalformedR { mnemonic: spec.mnemonic.clone() });
                }
                (_, Some(_)) => {
                    return Err(TableError::UnexpectedFunctionCode { mnemonic: spec.mnemonic.clone() });
                }
                (_, None) if spec.opcode == 0 => {
                    return Err(TableError::ReservedOpcode { mnemonic: spec.mnemonic.clone() });
                }
                (_, None) => {}
            }
            if !mnemonics.insert(spec.mnemonic.as_str()) {
                return Err(TableError::DuplicateMnemonic(spec.mnemonic.clone()));
            }
            for prev in &instructions[..i] {
                if spec.kind == InstrKind::R && prev.kind == InstrKind::R && prev.function_code == spec.function_code {
                    return Err(TableError::DuplicateFunctionCode {
                        code: spec.function_code.unwrap_or_default(),
                        first: prev.mnemonic.clone(),
                        second: spec.mnemonic.clone(),
                    });
                }
                if spec.kind != InstrKind::R && prev.kind != InstrKind::R && prev.opcode == spec.opcode {
                    return Err(TableError::DuplicateOpcode {
                        opcode: spec.opcode,
                        first: prev.mnemonic.clone(),
                        second: spec.mnemonic.clone(),
                    });
                }
            }
        }

        let mut numbers = HashSet::new();
        let mut names = HashSet::new();
        for reg in &registers {
            if reg.number > 31 {
                return Err(TableError::RegisterRange { name: reg.name.clone(), number: reg.number });
            }
            if !numbers.insert(reg.number) {
                return Err(TableError::DuplicateRegister(format!("${}", reg.number)));
            }
            if !names.insert(reg.name.as_str()) {
                return Err(TableError::DuplicateRegister(format!("${}", reg.name)));
            }
        }

        Ok(Self { instructions, registers })
    }

    pub fn from_json(instructions: &str, registers: &str) -> Result<Self, TableError> {
        let instructions: Vec<InstructionSpec> = serde_json::from_str(instructions)?;
        let registers: Vec<RegisterEntry> = serde_json::from_str(registers)?;
        Self::new(instructions, registers)
    }

    /// The MIPS-I subset shipped in `data/`.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_json(BUILTIN_INSTRUCTIONS, BUILTIN_REGISTERS)
    }

    pub fn instructions(&self) -> &[InstructionSpec] {
        &self.instructions
    }

    pub fn registers(&self) -> &[RegisterEntry] {
        &self.registers
    }

    /// Non-R instruction selected by a primary opcode. Opcode 0 never matches.
    pub fn by_opcode(&self, opcode: u32) -> Option<&InstructionSpec> {
        if opcode == 0 {
            return None;
        }
        self.instructions
            .iter()
            .find(|s| s.kind != InstrKind::R && u32::from(s.opcode) == opcode)
    }

    /// R-type instruction selected by its function code.
    pub fn by_function_code(&self, code: u32) -> Option<&InstructionSpec> {
        self.instructions
            .iter()
            .find(|s| s.function_code.map(u32::from) == Some(code))
    }

    pub fn by_mnemonic(&self, mnemonic: &str) -> Option<&InstructionSpec> {
        self.instructions.iter().find(|s| s.mnemonic == mnemonic)
    }

    pub fn register_name(&self, number: u32) -> Option<&str> {
        self.registers
            .iter()
            .find(|r| u32::from(r.number) == number)
            .map(|r| r.name.as_str())
    }

    pub fn register_number(&self, name: &str) -> Option<u8> {
        self.registers.iter().find(|r| r.name == name).map(|r| r.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_load() {
        let t = Tables::builtin().unwrap();
        assert_eq!(t.registers().len(), 32);
        assert_eq!(t.by_function_code(0x20).unwrap().mnemonic, "add");
        assert_eq!(t.by_opcode(0x23).unwrap().mnemonic, "lw");
        assert!(t.by_opcode(0).is_none());
        assert_eq!(t.register_name(29), Some("sp"));
        assert_eq!(t.register_number("ra"), Some(31));
    }

    #[test]
    fn unsigned_immediates_follow_mnemonic_suffix() {
        let t = Tables::builtin().unwrap();
        assert!(t.by_mnemonic("addiu").unwrap().has_unsigned_immediate());
        assert!(!t.by_mnemonic("addi").unwrap().has_unsigned_immediate());
    }

    #[test]
    fn duplicate_opcode_is_rejected() {
        let instrs = r#"[
            {"mnemonic":"lw","opcode":35,"functionCode":null,"type":"I","fullName":"Load Word"},
            {"mnemonic":"lw2","opcode":35,"functionCode":null,"type":"I","fullName":"Load Word Again"}
        ]"#;
        let err = Tables::from_json(instrs, "[]").unwrap_err();
        assert!(matches!(err, TableError::DuplicateOpcode { opcode: 35, .. }));
    }

    #[test]
    fn duplicate_function_code_is_rejected() {
        let instrs = r#"[
            {"mnemonic":"add","opcode":0,"functionCode":32,"type":"R","fullName":"Add"},
            {"mnemonic":"plus","opcode":0,"functionCode":32,"type":"R","fullName":"Plus"}
        ]"#;
        let err = Tables::from_json(instrs, "[]").unwrap_err();
        assert!(matches!(err, TableError::DuplicateFunctionCode { code: 32, .. }));
    }

    #[test]
    fn r_entry_without_function_code_is_rejected() {
        let instrs = r#"[{"mnemonic":"add","opcode":0,"functionCode":null,"type":"R","fullName":"Add"}]"#;
        assert!(matches!(Tables::from_json(instrs, "[]"), Err(TableError::MalformedR { .. })));
    }

    #[test]
    fn non_r_entry_with_opcode_zero_is_rejected() {
        let instrs = r#"[{"mnemonic":"nop","opcode":0,"functionCode":null,"type":"I","fullName":"No Op"}]"#;
        let err = Tables::from_json(instrs, "[]").unwrap_err();
        assert!(matches!(err, TableError::ReservedOpcode { .. }));
        assert_eq!(err.to_string(), "nop: opcode 0 is reserved for R-type entries");
    }

    #[test]
    fn out_of_range_register_is_rejected() {
        let regs = r#"[{"number":32,"name":"x"}]"#;
        assert!(matches!(Tables::from_json("[]", regs), Err(TableError::RegisterRange { .. })));
    }
}
