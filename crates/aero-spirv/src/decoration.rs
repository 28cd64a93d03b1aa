//! Decoration store: per-id and per-struct-member annotations.
//!
//! All `OpDecorate`/`OpMemberDecorate` instructions are folded into one [`DecorationSet`] per
//! target id. Decoration groups are expanded while folding so callers never see them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bitflags::bitflags;
use spirv::Decoration;
use tracing::{debug, trace};

use crate::definitions::DefinitionIndex;
use crate::instruction::InstructionRecord;
use crate::opcode::{
    OPCODE_DECORATE, OPCODE_DECORATE_ID, OPCODE_DECORATION_GROUP, OPCODE_GROUP_DECORATE,
    OPCODE_GROUP_MEMBER_DECORATE, OPCODE_MEMBER_DECORATE, OPCODE_TYPE_STRUCT,
};

// Vendor decorations are matched by value; their enumerant names changed between header
// revisions (NV → EXT/KHR).
const DECORATION_PASSTHROUGH_NV: u32 = 5250;
const DECORATION_PER_PRIMITIVE_EXT: u32 = 5271;
const DECORATION_PER_VIEW_NV: u32 = 5272;
const DECORATION_PER_TASK_NV: u32 = 5273;
const DECORATION_PER_VERTEX_KHR: u32 = 5285;
const DECORATION_NON_UNIFORM: u32 = 5300;
const DECORATION_RESTRICT_POINTER: u32 = 5355;
const DECORATION_ALIASED_POINTER: u32 = 5356;

bitflags! {
    /// Single-bit record of which decorations are present on an id or member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecorationFlags: u64 {
        const RELAXED_PRECISION = 1 << 0;
        const BLOCK = 1 << 1;
        const BUFFER_BLOCK = 1 << 2;
        const ROW_MAJOR = 1 << 3;
        const COL_MAJOR = 1 << 4;
        const BUILTIN = 1 << 5;
        const NO_PERSPECTIVE = 1 << 6;
        const FLAT = 1 << 7;
        const PATCH = 1 << 8;
        const CENTROID = 1 << 9;
        const SAMPLE = 1 << 10;
        const INVARIANT = 1 << 11;
        const RESTRICT = 1 << 12;
        const ALIASED = 1 << 13;
        const VOLATILE = 1 << 14;
        const COHERENT = 1 << 15;
        const NON_WRITABLE = 1 << 16;
        const NON_READABLE = 1 << 17;
        const LOCATION = 1 << 18;
        const COMPONENT = 1 << 19;
        const INDEX = 1 << 20;
        const OFFSET = 1 << 21;
        const MATRIX_STRIDE = 1 << 22;
        const ARRAY_STRIDE = 1 << 23;
        const BINDING = 1 << 24;
        const DESCRIPTOR_SET = 1 << 25;
        const SPEC_ID = 1 << 26;
        const INPUT_ATTACHMENT_INDEX = 1 << 27;
        const XFB_BUFFER = 1 << 28;
        const XFB_STRIDE = 1 << 29;
        const STREAM = 1 << 30;
        const NON_UNIFORM = 1 << 31;
        const PER_PRIMITIVE = 1 << 32;
        const PER_VIEW = 1 << 33;
        const PER_TASK = 1 << 34;
        const PER_VERTEX = 1 << 35;
        const PASSTHROUGH = 1 << 36;
        const RESTRICT_POINTER = 1 << 37;
        const ALIASED_POINTER = 1 << 38;
    }
}

/// Decorations that can apply both to an id and to an individual struct member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DecorationBase {
    pub flags: DecorationFlags,
    pub location: Option<u32>,
    pub component: Option<u32>,
    pub index: Option<u32>,
    pub offset: Option<u32>,
    /// Raw `BuiltIn` enumerant; see [`DecorationBase::builtin`].
    pub builtin: Option<u32>,
    pub matrix_stride: Option<u32>,
    pub xfb_buffer: Option<u32>,
    pub xfb_stride: Option<u32>,
    pub stream: Option<u32>,
}

impl DecorationBase {
    pub const EMPTY: DecorationBase = DecorationBase {
        flags: DecorationFlags::empty(),
        location: None,
        component: None,
        index: None,
        offset: None,
        builtin: None,
        matrix_stride: None,
        xfb_buffer: None,
        xfb_stride: None,
        stream: None,
    };

    pub fn has(&self, flag: DecorationFlags) -> bool {
        self.flags.contains(flag)
    }

    /// The decoded `BuiltIn` value, if decorated with a known built-in.
    pub fn builtin(&self) -> Option<spirv::BuiltIn> {
        self.builtin.and_then(spirv::BuiltIn::from_u32)
    }

    /// Folds one decoration. Returns `false` if the decoration is not a member-level kind.
    fn apply(&mut self, decoration: u32, literals: &[u32]) -> bool {
        let lit = literals.first().copied();
        let vendor = match decoration {
            DECORATION_PASSTHROUGH_NV => Some(DecorationFlags::PASSTHROUGH),
            DECORATION_PER_PRIMITIVE_EXT => Some(DecorationFlags::PER_PRIMITIVE),
            DECORATION_PER_VIEW_NV => Some(DecorationFlags::PER_VIEW),
            DECORATION_PER_TASK_NV => Some(DecorationFlags::PER_TASK),
            DECORATION_PER_VERTEX_KHR => Some(DecorationFlags::PER_VERTEX),
            DECORATION_NON_UNIFORM => Some(DecorationFlags::NON_UNIFORM),
            DECORATION_RESTRICT_POINTER => Some(DecorationFlags::RESTRICT_POINTER),
            DECORATION_ALIASED_POINTER => Some(DecorationFlags::ALIASED_POINTER),
            _ => None,
        };
        if let Some(flag) = vendor {
            self.flags |= flag;
            return true;
        }

        let Some(kind) = Decoration::from_u32(decoration) else {
            return false;
        };
        let (flag, field) = match kind {
            Decoration::RelaxedPrecision => (DecorationFlags::RELAXED_PRECISION, None),
            Decoration::Block => (DecorationFlags::BLOCK, None),
            Decoration::BufferBlock => (DecorationFlags::BUFFER_BLOCK, None),
            Decoration::RowMajor => (DecorationFlags::ROW_MAJOR, None),
            Decoration::ColMajor => (DecorationFlags::COL_MAJOR, None),
            Decoration::NoPerspective => (DecorationFlags::NO_PERSPECTIVE, None),
            Decoration::Flat => (DecorationFlags::FLAT, None),
            Decoration::Patch => (DecorationFlags::PATCH, None),
            Decoration::Centroid => (DecorationFlags::CENTROID, None),
            Decoration::Sample => (DecorationFlags::SAMPLE, None),
            Decoration::Invariant => (DecorationFlags::INVARIANT, None),
            Decoration::Restrict => (DecorationFlags::RESTRICT, None),
            Decoration::Aliased => (DecorationFlags::ALIASED, None),
            Decoration::Volatile => (DecorationFlags::VOLATILE, None),
            Decoration::Coherent => (DecorationFlags::COHERENT, None),
            Decoration::NonWritable => (DecorationFlags::NON_WRITABLE, None),
            Decoration::NonReadable => (DecorationFlags::NON_READABLE, None),
            Decoration::BuiltIn => (DecorationFlags::BUILTIN, Some(&mut self.builtin)),
            Decoration::Location => (DecorationFlags::LOCATION, Some(&mut self.location)),
            Decoration::Component => (DecorationFlags::COMPONENT, Some(&mut self.component)),
            Decoration::Index => (DecorationFlags::INDEX, Some(&mut self.index)),
            Decoration::Offset => (DecorationFlags::OFFSET, Some(&mut self.offset)),
            Decoration::MatrixStride => {
                (DecorationFlags::MATRIX_STRIDE, Some(&mut self.matrix_stride))
            }
            Decoration::XfbBuffer => (DecorationFlags::XFB_BUFFER, Some(&mut self.xfb_buffer)),
            Decoration::XfbStride => (DecorationFlags::XFB_STRIDE, Some(&mut self.xfb_stride)),
            Decoration::Stream => (DecorationFlags::STREAM, Some(&mut self.stream)),
            _ => return false,
        };
        if let Some(field) = field {
            let Some(value) = lit else {
                trace!(decoration, "value-bearing decoration without literal");
                return true;
            };
            *field = Some(value);
        }
        self.flags |= flag;
        true
    }
}

/// All decorations attached to one id, including per-member decorations for struct types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecorationSet {
    pub base: DecorationBase,
    pub descriptor_set: Option<u32>,
    pub binding: Option<u32>,
    pub array_stride: Option<u32>,
    pub spec_id: Option<u32>,
    pub input_attachment_index: Option<u32>,
    /// Member index → member decorations (struct types only).
    pub members: BTreeMap<u32, DecorationBase>,
}

static EMPTY_DECORATION_SET: DecorationSet = DecorationSet::empty();

impl DecorationSet {
    /// The all-unset decoration set returned for undecorated ids.
    pub const fn empty() -> Self {
        Self {
            base: DecorationBase::EMPTY,
            descriptor_set: None,
            binding: None,
            array_stride: None,
            spec_id: None,
            input_attachment_index: None,
            members: BTreeMap::new(),
        }
    }

    pub fn has(&self, flag: DecorationFlags) -> bool {
        self.base.has(flag)
    }

    pub fn location(&self) -> Option<u32> {
        self.base.location
    }

    pub fn component(&self) -> Option<u32> {
        self.base.component
    }

    pub fn builtin(&self) -> Option<spirv::BuiltIn> {
        self.base.builtin()
    }

    /// Decorations of struct member `member`, or the empty set.
    pub fn member(&self, member: u32) -> &DecorationBase {
        self.members.get(&member).unwrap_or(&DecorationBase::EMPTY)
    }

    /// `true` if the struct has members and each of its `member_count` members has `flag`.
    pub fn all_members_have(&self, member_count: u32, flag: DecorationFlags) -> bool {
        member_count > 0 && (0..member_count).all(|m| self.member(m).has(flag))
    }

    /// `true` if the id itself or any member is decorated `BuiltIn`.
    pub fn any_builtin(&self) -> bool {
        self.has(DecorationFlags::BUILTIN)
            || self.members.values().any(|m| m.has(DecorationFlags::BUILTIN))
    }

    fn apply(&mut self, decoration: u32, literals: &[u32]) {
        if self.base.apply(decoration, literals) {
            return;
        }
        let lit = literals.first().copied();
        let (flag, field) = match Decoration::from_u32(decoration) {
            Some(Decoration::DescriptorSet) => {
                (DecorationFlags::DESCRIPTOR_SET, &mut self.descriptor_set)
            }
            Some(Decoration::Binding) => (DecorationFlags::BINDING, &mut self.binding),
            Some(Decoration::ArrayStride) => (DecorationFlags::ARRAY_STRIDE, &mut self.array_stride),
            Some(Decoration::SpecId) => (DecorationFlags::SPEC_ID, &mut self.spec_id),
            Some(Decoration::InputAttachmentIndex) => (
                DecorationFlags::INPUT_ATTACHMENT_INDEX,
                &mut self.input_attachment_index,
            ),
            _ => {
                trace!(decoration, "untracked decoration");
                return;
            }
        };
        if let Some(value) = lit {
            *field = Some(value);
            self.base.flags |= flag;
        }
    }

    fn apply_member(&mut self, member: u32, decoration: u32, literals: &[u32]) {
        let entry = self.members.entry(member).or_default();
        if !entry.apply(decoration, literals) {
            trace!(member, decoration, "untracked member decoration");
        }
    }
}

/// Folded decorations for every decorated id in a module.
#[derive(Debug, Default)]
pub(crate) struct DecorationStore {
    sets: HashMap<u32, Arc<DecorationSet>>,
    has_groups: bool,
}

impl DecorationStore {
    pub(crate) fn build(
        words: &[u32],
        records: &[InstructionRecord],
        index: &DefinitionIndex,
    ) -> Self {
        let inst_words = |rec: &InstructionRecord| {
            let start = rec.offset as usize;
            &words[start..start + rec.length as usize]
        };

        let group_ids: HashSet<u32> = records
            .iter()
            .filter(|rec| u32::from(rec.opcode) == OPCODE_DECORATION_GROUP)
            .map(|rec| rec.result_id)
            .collect();

        let mut sets: HashMap<u32, DecorationSet> = HashMap::new();
        let mut group_decorations: HashMap<u32, Vec<(u32, &[u32])>> = HashMap::new();

        for rec in records {
            let w = inst_words(rec);
            match u32::from(rec.opcode) {
                OPCODE_DECORATE | OPCODE_DECORATE_ID if w.len() >= 3 => {
                    let (target, decoration, literals) = (w[1], w[2], &w[3..]);
                    if group_ids.contains(&target) {
                        group_decorations
                            .entry(target)
                            .or_default()
                            .push((decoration, literals));
                    } else {
                        sets.entry(target).or_default().apply(decoration, literals);
                    }
                }
                OPCODE_MEMBER_DECORATE if w.len() >= 4 => {
                    let (target, member, decoration, literals) = (w[1], w[2], w[3], &w[4..]);
                    sets.entry(target)
                        .or_default()
                        .apply_member(member, decoration, literals);
                }
                _ => {}
            }
        }

        let is_struct = |id: u32| {
            index
                .get(id)
                .is_some_and(|i| u32::from(records[i].opcode) == OPCODE_TYPE_STRUCT)
        };

        for rec in records {
            let w = inst_words(rec);
            match u32::from(rec.opcode) {
                OPCODE_GROUP_DECORATE if w.len() >= 2 => {
                    let Some(decorations) = group_decorations.get(&w[1]) else {
                        continue;
                    };
                    for &target in &w[2..] {
                        let set = sets.entry(target).or_default();
                        for &(decoration, literals) in decorations {
                            set.apply(decoration, literals);
                        }
                    }
                }
                OPCODE_GROUP_MEMBER_DECORATE if w.len() >= 2 => {
                    let Some(decorations) = group_decorations.get(&w[1]) else {
                        continue;
                    };
                    for pair in w[2..].chunks_exact(2) {
                        let (target, member) = (pair[0], pair[1]);
                        if !is_struct(target) {
                            debug!(target, "group member decoration on non-struct id; skipped");
                            continue;
                        }
                        let set = sets.entry(target).or_default();
                        for &(decoration, literals) in decorations {
                            set.apply_member(member, decoration, literals);
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            sets: sets.into_iter().map(|(id, set)| (id, Arc::new(set))).collect(),
            has_groups: !group_ids.is_empty(),
        }
    }

    /// Decorations for `id`; undecorated ids get the shared empty set.
    pub(crate) fn get(&self, id: u32) -> &DecorationSet {
        self.sets
            .get(&id)
            .map(|set| set.as_ref())
            .unwrap_or(&EMPTY_DECORATION_SET)
    }

    pub(crate) fn shared(&self, id: u32) -> Arc<DecorationSet> {
        self.sets
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::new(DecorationSet::empty()))
    }

    pub(crate) fn has_groups(&self) -> bool {
        self.has_groups
    }
}
