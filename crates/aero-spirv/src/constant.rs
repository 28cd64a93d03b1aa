//! Constant and specialization-constant evaluation.
//!
//! Only the scalar constant family is evaluated. Composite constants, `OpSpecConstantOp` and
//! anything else resolve to `None`, meaning "decided at runtime".

use crate::decoration::DecorationStore;
use crate::definitions::DecodedModule;
use crate::opcode::{
    OPCODE_CONSTANT, OPCODE_CONSTANT_FALSE, OPCODE_CONSTANT_NULL, OPCODE_CONSTANT_TRUE,
    OPCODE_SPEC_CONSTANT, OPCODE_SPEC_CONSTANT_FALSE, OPCODE_SPEC_CONSTANT_TRUE,
};

/// One specialization constant's bytes within [`SpecializationMap::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecializationMapEntry {
    /// The `SpecId` decoration value this entry overrides.
    pub constant_id: u32,
    pub offset: u32,
    pub size: usize,
}

/// Caller-supplied specialization values, laid out like `VkSpecializationInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecializationMap {
    pub entries: Vec<SpecializationMapEntry>,
    pub data: Vec<u8>,
}

impl SpecializationMap {
    pub fn new(entries: Vec<SpecializationMapEntry>, data: Vec<u8>) -> Self {
        Self { entries, data }
    }

    /// Appends a 32-bit value for `constant_id`.
    pub fn with_u32(mut self, constant_id: u32, value: u32) -> Self {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(&value.to_le_bytes());
        self.entries.push(SpecializationMapEntry {
            constant_id,
            offset,
            size: 4,
        });
        self
    }

    /// Appends a boolean as a 32-bit `0`/`1`.
    pub fn with_bool(self, constant_id: u32, value: bool) -> Self {
        self.with_u32(constant_id, u32::from(value))
    }

    /// Bytes supplied for `constant_id`, or `None` if absent or out of range of `data`.
    pub fn value(&self, constant_id: u32) -> Option<&[u8]> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.constant_id == constant_id)?;
        let start = entry.offset as usize;
        let end = start.checked_add(entry.size)?;
        self.data.get(start..end)
    }
}

/// Reads up to four little-endian bytes, zero-extending shorter values.
fn bytes_to_u32(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut buf = [0u8; 4];
    let n = bytes.len().min(4);
    buf[..n].copy_from_slice(&bytes[..n]);
    Some(u32::from_le_bytes(buf))
}

/// The overlay value for specialization constant `id`, if the map supplies one.
fn spec_override(
    decorations: &DecorationStore,
    id: u32,
    spec: Option<&SpecializationMap>,
) -> Option<u32> {
    let spec_id = decorations.get(id).spec_id?;
    bytes_to_u32(spec?.value(spec_id)?)
}

/// Evaluates `id` as a 32-bit integer (booleans evaluate to `0`/`1`).
///
/// Wider constants yield their low word.
pub(crate) fn constant_u32(
    decoded: &DecodedModule,
    decorations: &DecorationStore,
    id: u32,
    spec: Option<&SpecializationMap>,
) -> Option<u32> {
    let inst = decoded.definition(id)?;
    match inst.opcode() {
        OPCODE_CONSTANT_TRUE => Some(1),
        OPCODE_CONSTANT_FALSE | OPCODE_CONSTANT_NULL => Some(0),
        OPCODE_CONSTANT => inst.words().get(3).copied(),
        OPCODE_SPEC_CONSTANT_TRUE | OPCODE_SPEC_CONSTANT_FALSE => {
            let default = u32::from(inst.opcode() == OPCODE_SPEC_CONSTANT_TRUE);
            Some(spec_override(decorations, id, spec).map_or(default, |v| u32::from(v != 0)))
        }
        OPCODE_SPEC_CONSTANT => {
            let default = inst.words().get(3).copied()?;
            Some(spec_override(decorations, id, spec).unwrap_or(default))
        }
        _ => None,
    }
}

/// Evaluates `id` as a boolean. Only boolean constants resolve.
pub(crate) fn constant_bool(
    decoded: &DecodedModule,
    decorations: &DecorationStore,
    id: u32,
    spec: Option<&SpecializationMap>,
) -> Option<bool> {
    match decoded.opcode_of(id)? {
        OPCODE_CONSTANT_TRUE
        | OPCODE_CONSTANT_FALSE
        | OPCODE_SPEC_CONSTANT_TRUE
        | OPCODE_SPEC_CONSTANT_FALSE => {
            constant_u32(decoded, decorations, id, spec).map(|v| v != 0)
        }
        _ => None,
    }
}
