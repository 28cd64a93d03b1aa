//! A safe decoder and static analyzer for SPIR-V shader modules.
//!
//! Shader binaries are untrusted input: decoding never panics or reads out of bounds, and
//! structural damage (truncated instructions, duplicate result ids, forward-pointer cycles)
//! fails construction as a whole.
//!
//! A parsed [`Module`] provides:
//!
//! - random access to instructions and result-id definitions,
//! - folded decorations (decoration groups expanded) and execution modes,
//! - explicit struct layouts from `Offset`/`ArrayStride`/`MatrixStride`,
//! - per-[`EntryPoint`] interface classification: stage I/O with [`InterfaceSlot`] addressing,
//!   descriptor resources, push constants and task payloads, plus access-mode summaries.

#![forbid(unsafe_code)]

mod access;
mod constant;
mod decode;
mod decoration;
mod definitions;
mod entry_point;
mod error;
mod execution_mode;
mod instruction;
mod interface;
mod layout;
pub mod limits;
mod module;
/// Numeric opcode constants and the per-opcode operand schema.
pub mod opcode;
mod types;

/// Helpers for building synthetic SPIR-V modules in tests.
///
/// Only available to this crate's own tests or with the `test-utils` feature. Not part of the
/// stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::constant::{SpecializationMap, SpecializationMapEntry};
pub use crate::decode::{words_from_bytes, SpirvHeader, HEADER_WORDS};
pub use crate::decoration::{DecorationBase, DecorationFlags, DecorationSet};
pub use crate::entry_point::{
    AnomalyKind, ClassificationAnomaly, EntryPoint, EntryPointFlags, ShaderStage,
};
pub use crate::error::SpirvError;
pub use crate::execution_mode::{ExecutionModeFlags, ExecutionModeSet, FloatControls, FloatWidths};
pub use crate::instruction::Instruction;
pub use crate::interface::{
    AccessFlags, DescriptorSlot, ImageTraits, InterfaceSlot, InterfaceVariable,
    PushConstantVariable, ResourceInterfaceVariable, ResourceKind, StageInterfaceVariable,
    TaskPayloadVariable, VariableBase,
};
pub use crate::layout::{StructLayout, StructMember, TypeStructInfo};
pub use crate::limits::ParseOptions;
pub use crate::module::Module;
pub use crate::types::{ArrayLength, NumericType};
