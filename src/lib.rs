pub mod decoder;
pub mod diag;
pub mod disasm;
pub mod encoder;
pub mod field;
pub mod input;
pub mod instruction;
pub mod interpret;
pub mod settings;
pub mod tables;

pub use decoder::{Decoder, MipsDecoder};
pub use diag::{Diagnostic, ParseResult, Severity};
pub use disasm::{fmt_instruction, fmt_parts, Part};
pub use encoder::{EncodeError, Encoder, Grammar};
pub use field::{Field, FieldName};
pub use instruction::{Family, Instruction, Kind, OperandSet, Role};
pub use settings::{ImmediateFormat, RegisterMode, Settings};
pub use tables::{InstrKind, InstructionSpec, RegisterEntry, TableError, Tables};
