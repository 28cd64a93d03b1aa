//! Type-walking helpers.
//!
//! Every walk is bounded by `max_type_depth`; a walk that runs out of depth (or hits an undefined
//! id) reports the type as unresolved instead of recursing further.

use std::collections::HashMap;

use crate::constant::{constant_u32, SpecializationMap};
use crate::decoration::DecorationStore;
use crate::definitions::DecodedModule;
use crate::instruction::Instruction;
use crate::opcode::{
    OPCODE_SPEC_CONSTANT, OPCODE_SPEC_CONSTANT_OP, OPCODE_TYPE_ARRAY, OPCODE_TYPE_BOOL,
    OPCODE_TYPE_FLOAT, OPCODE_TYPE_INT, OPCODE_TYPE_MATRIX, OPCODE_TYPE_POINTER,
    OPCODE_TYPE_RUNTIME_ARRAY, OPCODE_TYPE_SAMPLED_IMAGE, OPCODE_TYPE_STRUCT,
    OPCODE_TYPE_VECTOR,
};

/// Scalar numeric kind of a type's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Float,
    SInt,
    UInt,
    Bool,
}

/// Element count of a (possibly nested) array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayLength {
    /// Product of all fixed dimensions; `1` for non-arrays.
    Fixed(u32),
    /// A trailing `OpTypeRuntimeArray` dimension.
    Runtime,
    /// A dimension sized by a specialization constant not resolved under the supplied map.
    SpecConstant { id: u32 },
}

/// Type queries over one decoded module.
#[derive(Clone, Copy)]
pub(crate) struct TypeWalker<'a> {
    pub decoded: &'a DecodedModule,
    pub decorations: &'a DecorationStore,
    pub max_depth: usize,
}

impl<'a> TypeWalker<'a> {
    pub(crate) fn def(&self, id: u32) -> Option<Instruction<'a>> {
        self.decoded.definition(id)
    }

    /// Follows `OpTypePointer` to its pointee; returns `id` unchanged for non-pointers.
    pub(crate) fn pointee(&self, id: u32) -> u32 {
        match self.def(id) {
            Some(inst) if inst.opcode() == OPCODE_TYPE_POINTER => inst.word(3),
            _ => id,
        }
    }

    /// Strips pointers and arrays (sized and runtime) down to the element type.
    pub(crate) fn base_type(&self, id: u32) -> Option<Instruction<'a>> {
        let mut cur = id;
        for _ in 0..self.max_depth {
            let inst = self.def(cur)?;
            match inst.opcode() {
                OPCODE_TYPE_POINTER => cur = inst.word(3),
                OPCODE_TYPE_ARRAY | OPCODE_TYPE_RUNTIME_ARRAY => cur = inst.word(2),
                _ => return Some(inst),
            }
        }
        None
    }

    /// The base type with `OpTypeSampledImage` also unwrapped to its image type.
    pub(crate) fn image_type(&self, id: u32) -> Option<Instruction<'a>> {
        let base = self.base_type(id)?;
        if base.opcode() == OPCODE_TYPE_SAMPLED_IMAGE {
            self.def(base.word(2))
        } else {
            Some(base)
        }
    }

    /// Strips pointers, arrays, matrices and vectors down to the scalar type.
    pub(crate) fn scalar_type(&self, id: u32) -> Option<Instruction<'a>> {
        let mut cur = id;
        for _ in 0..self.max_depth {
            let inst = self.def(cur)?;
            match inst.opcode() {
                OPCODE_TYPE_POINTER => cur = inst.word(3),
                OPCODE_TYPE_ARRAY
                | OPCODE_TYPE_RUNTIME_ARRAY
                | OPCODE_TYPE_VECTOR
                | OPCODE_TYPE_MATRIX => cur = inst.word(2),
                _ => return Some(inst),
            }
        }
        None
    }

    pub(crate) fn numeric_type(&self, id: u32) -> Option<NumericType> {
        let scalar = self.scalar_type(id)?;
        match scalar.opcode() {
            OPCODE_TYPE_FLOAT => Some(NumericType::Float),
            OPCODE_TYPE_INT if scalar.word(3) != 0 => Some(NumericType::SInt),
            OPCODE_TYPE_INT => Some(NumericType::UInt),
            OPCODE_TYPE_BOOL => Some(NumericType::Bool),
            _ => None,
        }
    }

    /// Bit width of the scalar components of `id`; `0` for non-numeric types.
    pub(crate) fn bit_width(&self, id: u32) -> u32 {
        match self.scalar_type(id) {
            Some(s) if matches!(s.opcode(), OPCODE_TYPE_FLOAT | OPCODE_TYPE_INT) => s.word(2),
            Some(s) if s.opcode() == OPCODE_TYPE_BOOL => 32,
            _ => 0,
        }
    }

    /// Number of 32-bit components `id` consumes when flattened (64-bit scalars count twice).
    ///
    /// A pointer `id` is followed to its pointee; pointers nested inside a type are 64-bit
    /// addresses. Runtime arrays and unresolved types consume `0`.
    pub(crate) fn components_consumed(&self, id: u32) -> u32 {
        let id = match self.def(id) {
            Some(inst) if inst.opcode() == OPCODE_TYPE_POINTER => inst.word(3),
            _ => id,
        };
        self.components_at(id, 0, &mut HashMap::new())
    }

    fn components_at(&self, id: u32, depth: usize, structs: &mut HashMap<u32, u32>) -> u32 {
        if depth >= self.max_depth {
            return 0;
        }
        let Some(inst) = self.def(id) else {
            return 0;
        };
        match inst.opcode() {
            OPCODE_TYPE_BOOL => 1,
            OPCODE_TYPE_INT | OPCODE_TYPE_FLOAT => {
                if inst.word(2) == 64 {
                    2
                } else {
                    1
                }
            }
            OPCODE_TYPE_VECTOR | OPCODE_TYPE_MATRIX => self
                .components_at(inst.word(2), depth + 1, structs)
                .saturating_mul(inst.word(3)),
            OPCODE_TYPE_ARRAY => {
                let len = constant_u32(self.decoded, self.decorations, inst.word(3), None);
                self.components_at(inst.word(2), depth + 1, structs)
                    .saturating_mul(len.unwrap_or(0))
            }
            OPCODE_TYPE_STRUCT => {
                if let Some(&known) = structs.get(&id) {
                    return known;
                }
                let total = inst
                    .words_from(2)
                    .iter()
                    .map(|&m| self.components_at(m, depth + 1, structs))
                    .fold(0u32, u32::saturating_add);
                structs.insert(id, total);
                total
            }
            OPCODE_TYPE_POINTER => 2,
            _ => 0,
        }
    }

    /// Total element count across all array dimensions of `type_id` (pointers stripped).
    ///
    /// Dimensions sized by specialization constants resolve through `spec`; without a map they
    /// stay [`ArrayLength::SpecConstant`].
    pub(crate) fn array_length(&self, type_id: u32, spec: Option<&SpecializationMap>) -> ArrayLength {
        let mut cur = self.pointee(type_id);
        let mut total: u32 = 1;
        for _ in 0..self.max_depth {
            let Some(inst) = self.def(cur) else {
                break;
            };
            match inst.opcode() {
                OPCODE_TYPE_RUNTIME_ARRAY => return ArrayLength::Runtime,
                OPCODE_TYPE_ARRAY => {
                    let length_id = inst.word(3);
                    let is_spec = matches!(
                        self.decoded.opcode_of(length_id),
                        Some(OPCODE_SPEC_CONSTANT | OPCODE_SPEC_CONSTANT_OP)
                    );
                    if is_spec && spec.is_none() {
                        return ArrayLength::SpecConstant { id: length_id };
                    }
                    match constant_u32(self.decoded, self.decorations, length_id, spec) {
                        Some(len) => total = total.saturating_mul(len),
                        None => return ArrayLength::SpecConstant { id: length_id },
                    }
                    cur = inst.word(2);
                }
                _ => break,
            }
        }
        ArrayLength::Fixed(total)
    }

    /// Strips one array level (used for per-vertex arrayed interface variables).
    pub(crate) fn strip_array(&self, id: u32) -> u32 {
        match self.def(id) {
            Some(inst)
                if matches!(inst.opcode(), OPCODE_TYPE_ARRAY | OPCODE_TYPE_RUNTIME_ARRAY) =>
            {
                inst.word(2)
            }
            _ => id,
        }
    }
}
