//! Struct-layout resolution from `Offset`/`ArrayStride`/`MatrixStride` decorations.
//!
//! Layouts for every `OpTypeStruct` are computed once while the module is constructed, so lookups
//! afterwards are plain map reads and the module needs no interior mutability.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::constant::constant_u32;
use crate::decoration::{DecorationBase, DecorationFlags};
use crate::opcode::{
    OPCODE_TYPE_ARRAY, OPCODE_TYPE_BOOL, OPCODE_TYPE_FLOAT, OPCODE_TYPE_INT, OPCODE_TYPE_MATRIX,
    OPCODE_TYPE_POINTER, OPCODE_TYPE_RUNTIME_ARRAY, OPCODE_TYPE_STRUCT, OPCODE_TYPE_VECTOR,
};
use crate::types::TypeWalker;

/// Byte extent of a struct with explicit layout.
///
/// `offset` is the lowest member `Offset`; `offset + size` is the end of the member reaching
/// furthest. Runtime-array members contribute their offset but no size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructLayout {
    pub offset: u32,
    pub size: u32,
    laid_out: bool,
}

impl StructLayout {
    /// Returned when a member lacks the `Offset` (or a nested array lacks the `ArrayStride`)
    /// needed to place it.
    pub const UNLAID_OUT: StructLayout = StructLayout {
        offset: 0,
        size: 0,
        laid_out: false,
    };

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// One past the last byte used by the struct.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    pub index: u32,
    pub type_id: u32,
    /// Set when the member's type (after stripping arrays) is itself a struct.
    pub nested_struct: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStructInfo {
    pub id: u32,
    pub members: Vec<StructMember>,
    pub has_runtime_array: bool,
}

#[derive(Debug, Default)]
pub(crate) struct LayoutTable {
    infos: HashMap<u32, TypeStructInfo>,
    layouts: HashMap<u32, StructLayout>,
    computations: usize,
}

impl LayoutTable {
    pub(crate) fn build(types: TypeWalker<'_>) -> Self {
        let mut table = Self::default();
        let struct_ids: Vec<u32> = types
            .decoded
            .with_opcode(OPCODE_TYPE_STRUCT)
            .filter_map(|inst| inst.result_id())
            .collect();

        for &id in &struct_ids {
            if let Some(info) = struct_info(types, id) {
                table.infos.insert(id, info);
            }
        }
        let mut in_progress = HashSet::new();
        for &id in &struct_ids {
            table.resolve(types, id, &mut in_progress, 0);
        }
        table
    }

    pub(crate) fn info(&self, id: u32) -> Option<&TypeStructInfo> {
        self.infos.get(&id)
    }

    /// Layout of struct `id`; non-struct ids are [`StructLayout::UNLAID_OUT`].
    pub(crate) fn layout(&self, id: u32) -> StructLayout {
        self.layouts
            .get(&id)
            .copied()
            .unwrap_or(StructLayout::UNLAID_OUT)
    }

    #[cfg(test)]
    pub(crate) fn computations(&self) -> usize {
        self.computations
    }

    fn resolve(
        &mut self,
        types: TypeWalker<'_>,
        id: u32,
        in_progress: &mut HashSet<u32>,
        depth: usize,
    ) -> StructLayout {
        if let Some(&layout) = self.layouts.get(&id) {
            return layout;
        }
        if depth >= types.max_depth || !in_progress.insert(id) {
            return StructLayout::UNLAID_OUT;
        }
        let layout = self.compute(types, id, in_progress, depth);
        in_progress.remove(&id);
        self.computations += 1;
        self.layouts.insert(id, layout);
        layout
    }

    fn compute(
        &mut self,
        types: TypeWalker<'_>,
        id: u32,
        in_progress: &mut HashSet<u32>,
        depth: usize,
    ) -> StructLayout {
        let Some(info) = self.infos.get(&id).cloned() else {
            return StructLayout::UNLAID_OUT;
        };
        if info.members.is_empty() {
            return StructLayout {
                offset: 0,
                size: 0,
                laid_out: true,
            };
        }

        let decorations = types.decorations.get(id);
        let mut first = u32::MAX;
        let mut end = 0u32;
        for member in &info.members {
            let member_decorations = decorations.member(member.index);
            let Some(offset) = member_decorations.offset else {
                trace!(struct_id = id, member = member.index, "member without Offset");
                return StructLayout::UNLAID_OUT;
            };
            let Some(size) =
                self.size_of(types, member.type_id, member_decorations, in_progress, depth + 1)
            else {
                trace!(struct_id = id, member = member.index, "member size unresolved");
                return StructLayout::UNLAID_OUT;
            };
            first = first.min(offset);
            end = end.max(offset.saturating_add(size));
        }
        StructLayout {
            offset: first,
            size: end.saturating_sub(first),
            laid_out: true,
        }
    }

    fn size_of(
        &mut self,
        types: TypeWalker<'_>,
        type_id: u32,
        member_decorations: &DecorationBase,
        in_progress: &mut HashSet<u32>,
        depth: usize,
    ) -> Option<u32> {
        if depth >= types.max_depth {
            return None;
        }
        let inst = types.def(type_id)?;
        match inst.opcode() {
            OPCODE_TYPE_BOOL => Some(4),
            OPCODE_TYPE_INT | OPCODE_TYPE_FLOAT => Some(inst.word(2) / 8),
            OPCODE_TYPE_VECTOR => {
                let component = self.size_of(types, inst.word(2), member_decorations, in_progress, depth + 1)?;
                Some(component.saturating_mul(inst.word(3)))
            }
            OPCODE_TYPE_MATRIX => {
                let stride = member_decorations.matrix_stride?;
                let columns = inst.word(3);
                let rows = types.def(inst.word(2)).map_or(0, |col| col.word(3));
                let count = if member_decorations.has(DecorationFlags::ROW_MAJOR) {
                    rows
                } else {
                    columns
                };
                Some(stride.saturating_mul(count))
            }
            OPCODE_TYPE_ARRAY => {
                let stride = types.decorations.get(type_id).array_stride?;
                let length = constant_u32(types.decoded, types.decorations, inst.word(3), None)?;
                Some(stride.saturating_mul(length))
            }
            OPCODE_TYPE_RUNTIME_ARRAY => Some(0),
            OPCODE_TYPE_STRUCT => {
                let nested = self.resolve(types, type_id, in_progress, depth + 1);
                nested.is_laid_out().then(|| nested.end())
            }
            // Physical storage buffer pointers are 64-bit addresses.
            OPCODE_TYPE_POINTER => Some(8),
            _ => None,
        }
    }
}

fn struct_info(types: TypeWalker<'_>, id: u32) -> Option<TypeStructInfo> {
    let inst = types.def(id)?;
    let mut has_runtime_array = false;
    let members = inst
        .words_from(2)
        .iter()
        .enumerate()
        .map(|(index, &type_id)| {
            if types.decoded.opcode_of(type_id) == Some(OPCODE_TYPE_RUNTIME_ARRAY) {
                has_runtime_array = true;
            }
            let nested_struct = types
                .base_type(type_id)
                .filter(|base| base.opcode() == OPCODE_TYPE_STRUCT)
                .and_then(|base| base.result_id());
            StructMember {
                index: index as u32,
                type_id,
                nested_struct,
            }
        })
        .collect();
    Some(TypeStructInfo {
        id,
        members,
        has_runtime_array,
    })
}
