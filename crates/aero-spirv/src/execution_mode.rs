//! Execution-mode store, keyed by entry-point function id.

use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;
use spirv::ExecutionMode;
use tracing::trace;

use crate::constant::{constant_u32, SpecializationMap};
use crate::decoration::DecorationStore;
use crate::definitions::DecodedModule;
use crate::instruction::Instruction;
use crate::module::Module;
use crate::opcode::{OPCODE_EXECUTION_MODE, OPCODE_EXECUTION_MODE_ID};

// Mesh-shading modes; the enumerant names moved from NV to EXT between header revisions.
const EXECUTION_MODE_OUTPUT_LINES_EXT: u32 = 5269;
const EXECUTION_MODE_OUTPUT_PRIMITIVES_EXT: u32 = 5270;
const EXECUTION_MODE_OUTPUT_TRIANGLES_EXT: u32 = 5298;
const EXECUTION_MODE_STENCIL_REF_REPLACING_EXT: u32 = 5027;
const EXECUTION_MODE_SUBGROUP_UNIFORM_CONTROL_FLOW_KHR: u32 = 4421;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExecutionModeFlags: u64 {
        const INVOCATIONS = 1 << 0;
        const SPACING_EQUAL = 1 << 1;
        const SPACING_FRACTIONAL_EVEN = 1 << 2;
        const SPACING_FRACTIONAL_ODD = 1 << 3;
        const VERTEX_ORDER_CW = 1 << 4;
        const VERTEX_ORDER_CCW = 1 << 5;
        const PIXEL_CENTER_INTEGER = 1 << 6;
        const ORIGIN_UPPER_LEFT = 1 << 7;
        const ORIGIN_LOWER_LEFT = 1 << 8;
        const EARLY_FRAGMENT_TESTS = 1 << 9;
        const POINT_MODE = 1 << 10;
        const XFB = 1 << 11;
        const DEPTH_REPLACING = 1 << 12;
        const DEPTH_GREATER = 1 << 13;
        const DEPTH_LESS = 1 << 14;
        const DEPTH_UNCHANGED = 1 << 15;
        const LOCAL_SIZE = 1 << 16;
        const LOCAL_SIZE_ID = 1 << 17;
        const INPUT_POINTS = 1 << 18;
        const INPUT_LINES = 1 << 19;
        const INPUT_LINES_ADJACENCY = 1 << 20;
        const TRIANGLES = 1 << 21;
        const INPUT_TRIANGLES_ADJACENCY = 1 << 22;
        const QUADS = 1 << 23;
        const ISOLINES = 1 << 24;
        const OUTPUT_VERTICES = 1 << 25;
        const OUTPUT_POINTS = 1 << 26;
        const OUTPUT_LINE_STRIP = 1 << 27;
        const OUTPUT_TRIANGLE_STRIP = 1 << 28;
        const OUTPUT_LINES = 1 << 29;
        const OUTPUT_TRIANGLES = 1 << 30;
        const OUTPUT_PRIMITIVES = 1 << 31;
        const POST_DEPTH_COVERAGE = 1 << 32;
        const STENCIL_REF_REPLACING = 1 << 33;
        const SUBGROUP_UNIFORM_CONTROL_FLOW = 1 << 34;
        const DENORM_PRESERVE = 1 << 35;
        const DENORM_FLUSH_TO_ZERO = 1 << 36;
        const SIGNED_ZERO_INF_NAN_PRESERVE = 1 << 37;
        const ROUNDING_MODE_RTE = 1 << 38;
        const ROUNDING_MODE_RTZ = 1 << 39;
    }
}

bitflags! {
    /// Float bit widths a float-controls mode applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FloatWidths: u8 {
        const F16 = 1 << 0;
        const F32 = 1 << 1;
        const F64 = 1 << 2;
    }
}

impl FloatWidths {
    fn from_bit_width(width: u32) -> Self {
        match width {
            16 => Self::F16,
            32 => Self::F32,
            64 => Self::F64,
            _ => Self::empty(),
        }
    }
}

/// Per-width float controls (`SPV_KHR_float_controls`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FloatControls {
    pub denorm_preserve: FloatWidths,
    pub denorm_flush_to_zero: FloatWidths,
    pub signed_zero_inf_nan_preserve: FloatWidths,
    pub rounding_mode_rte: FloatWidths,
    pub rounding_mode_rtz: FloatWidths,
}

/// Accumulated execution modes of one function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionModeSet {
    pub flags: ExecutionModeFlags,
    /// Workgroup size from `LocalSize`, or from `LocalSizeId` when its operands are constants.
    pub local_size: Option<[u32; 3]>,
    /// Constant ids of a `LocalSizeId` mode.
    pub local_size_ids: Option<[u32; 3]>,
    pub output_vertices: Option<u32>,
    pub invocations: Option<u32>,
    pub output_primitives: Option<u32>,
    pub float_controls: FloatControls,
}

impl ExecutionModeSet {
    pub fn has(&self, flag: ExecutionModeFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Workgroup size under a specialization map.
    ///
    /// A `WorkgroupSize` built-in constant takes precedence over any execution mode. `None` if
    /// the size is not statically known.
    pub fn local_size_with(
        &self,
        module: &Module,
        spec: Option<&SpecializationMap>,
    ) -> Option<[u32; 3]> {
        if let Some(size) = module.workgroup_size_constant(spec) {
            return Some(size);
        }
        if let Some(ids) = self.local_size_ids {
            let [x, y, z] = ids.map(|id| module.constant_u32(id, spec));
            return Some([x?, y?, z?]);
        }
        self.local_size
    }

    fn apply(
        &mut self,
        inst: &Instruction<'_>,
        decoded: &DecodedModule,
        decorations: &DecorationStore,
    ) {
        let mode = inst.word(2);
        let operands = inst.words_from(3);
        let op = |i: usize| operands.get(i).copied();

        if inst.opcode() == OPCODE_EXECUTION_MODE_ID {
            if ExecutionMode::from_u32(mode) == Some(ExecutionMode::LocalSizeId) && operands.len() >= 3 {
                let ids = [operands[0], operands[1], operands[2]];
                self.flags |= ExecutionModeFlags::LOCAL_SIZE_ID;
                self.local_size_ids = Some(ids);
                let [x, y, z] = ids.map(|id| constant_u32(decoded, decorations, id, None));
                match (x, y, z) {
                    (Some(x), Some(y), Some(z)) => self.local_size = Some([x, y, z]),
                    _ => trace!(?ids, "LocalSizeId operands are not constants"),
                }
            } else {
                trace!(mode, "ignored id execution mode");
            }
            return;
        }

        let flag = match mode {
            EXECUTION_MODE_OUTPUT_LINES_EXT => ExecutionModeFlags::OUTPUT_LINES,
            EXECUTION_MODE_OUTPUT_TRIANGLES_EXT => ExecutionModeFlags::OUTPUT_TRIANGLES,
            EXECUTION_MODE_OUTPUT_PRIMITIVES_EXT => {
                self.output_primitives = op(0);
                ExecutionModeFlags::OUTPUT_PRIMITIVES
            }
            EXECUTION_MODE_STENCIL_REF_REPLACING_EXT => ExecutionModeFlags::STENCIL_REF_REPLACING,
            EXECUTION_MODE_SUBGROUP_UNIFORM_CONTROL_FLOW_KHR => {
                ExecutionModeFlags::SUBGROUP_UNIFORM_CONTROL_FLOW
            }
            _ => match ExecutionMode::from_u32(mode) {
                Some(kind) => match self.apply_core(kind, op(0)) {
                    Some(flag) => flag,
                    None => {
                        trace!(mode, "untracked execution mode");
                        return;
                    }
                },
                None => {
                    trace!(mode, "unknown execution mode");
                    return;
                }
            },
        };
        self.flags |= flag;

        if flag == ExecutionModeFlags::LOCAL_SIZE && operands.len() >= 3 {
            self.local_size = Some([operands[0], operands[1], operands[2]]);
        }
    }

    fn apply_core(&mut self, kind: ExecutionMode, first: Option<u32>) -> Option<ExecutionModeFlags> {
        let widths = FloatWidths::from_bit_width(first.unwrap_or(0));
        let flag = match kind {
            ExecutionMode::Invocations => {
                self.invocations = first;
                ExecutionModeFlags::INVOCATIONS
            }
            ExecutionMode::SpacingEqual => ExecutionModeFlags::SPACING_EQUAL,
            ExecutionMode::SpacingFractionalEven => ExecutionModeFlags::SPACING_FRACTIONAL_EVEN,
            ExecutionMode::SpacingFractionalOdd => ExecutionModeFlags::SPACING_FRACTIONAL_ODD,
            ExecutionMode::VertexOrderCw => ExecutionModeFlags::VERTEX_ORDER_CW,
            ExecutionMode::VertexOrderCcw => ExecutionModeFlags::VERTEX_ORDER_CCW,
            ExecutionMode::PixelCenterInteger => ExecutionModeFlags::PIXEL_CENTER_INTEGER,
            ExecutionMode::OriginUpperLeft => ExecutionModeFlags::ORIGIN_UPPER_LEFT,
            ExecutionMode::OriginLowerLeft => ExecutionModeFlags::ORIGIN_LOWER_LEFT,
            ExecutionMode::EarlyFragmentTests => ExecutionModeFlags::EARLY_FRAGMENT_TESTS,
            ExecutionMode::PointMode => ExecutionModeFlags::POINT_MODE,
            ExecutionMode::Xfb => ExecutionModeFlags::XFB,
            ExecutionMode::DepthReplacing => ExecutionModeFlags::DEPTH_REPLACING,
            ExecutionMode::DepthGreater => ExecutionModeFlags::DEPTH_GREATER,
            ExecutionMode::DepthLess => ExecutionModeFlags::DEPTH_LESS,
            ExecutionMode::DepthUnchanged => ExecutionModeFlags::DEPTH_UNCHANGED,
            ExecutionMode::LocalSize => ExecutionModeFlags::LOCAL_SIZE,
            ExecutionMode::InputPoints => ExecutionModeFlags::INPUT_POINTS,
            ExecutionMode::InputLines => ExecutionModeFlags::INPUT_LINES,
            ExecutionMode::InputLinesAdjacency => ExecutionModeFlags::INPUT_LINES_ADJACENCY,
            ExecutionMode::Triangles => ExecutionModeFlags::TRIANGLES,
            ExecutionMode::InputTrianglesAdjacency => {
                ExecutionModeFlags::INPUT_TRIANGLES_ADJACENCY
            }
            ExecutionMode::Quads => ExecutionModeFlags::QUADS,
            ExecutionMode::Isolines => ExecutionModeFlags::ISOLINES,
            ExecutionMode::OutputVertices => {
                self.output_vertices = first;
                ExecutionModeFlags::OUTPUT_VERTICES
            }
            ExecutionMode::OutputPoints => ExecutionModeFlags::OUTPUT_POINTS,
            ExecutionMode::OutputLineStrip => ExecutionModeFlags::OUTPUT_LINE_STRIP,
            ExecutionMode::OutputTriangleStrip => ExecutionModeFlags::OUTPUT_TRIANGLE_STRIP,
            ExecutionMode::PostDepthCoverage => ExecutionModeFlags::POST_DEPTH_COVERAGE,
            ExecutionMode::DenormPreserve => {
                self.float_controls.denorm_preserve |= widths;
                ExecutionModeFlags::DENORM_PRESERVE
            }
            ExecutionMode::DenormFlushToZero => {
                self.float_controls.denorm_flush_to_zero |= widths;
                ExecutionModeFlags::DENORM_FLUSH_TO_ZERO
            }
            ExecutionMode::SignedZeroInfNanPreserve => {
                self.float_controls.signed_zero_inf_nan_preserve |= widths;
                ExecutionModeFlags::SIGNED_ZERO_INF_NAN_PRESERVE
            }
            ExecutionMode::RoundingModeRTE => {
                self.float_controls.rounding_mode_rte |= widths;
                ExecutionModeFlags::ROUNDING_MODE_RTE
            }
            ExecutionMode::RoundingModeRTZ => {
                self.float_controls.rounding_mode_rtz |= widths;
                ExecutionModeFlags::ROUNDING_MODE_RTZ
            }
            _ => return None,
        };
        Some(flag)
    }
}

/// Folded execution modes for every function targeted by `OpExecutionMode[Id]`.
#[derive(Debug, Default)]
pub(crate) struct ExecutionModeStore {
    sets: HashMap<u32, Arc<ExecutionModeSet>>,
    empty: Arc<ExecutionModeSet>,
}

impl ExecutionModeStore {
    pub(crate) fn build(decoded: &DecodedModule, decorations: &DecorationStore) -> Self {
        let mut sets: HashMap<u32, ExecutionModeSet> = HashMap::new();
        for inst in decoded.instructions() {
            let opcode = inst.opcode();
            if opcode != OPCODE_EXECUTION_MODE && opcode != OPCODE_EXECUTION_MODE_ID {
                continue;
            }
            if inst.length() < 3 {
                continue;
            }
            sets.entry(inst.word(1))
                .or_default()
                .apply(&inst, decoded, decorations);
        }
        Self {
            sets: sets.into_iter().map(|(id, set)| (id, Arc::new(set))).collect(),
            empty: Arc::default(),
        }
    }

    /// Modes of `function_id`; functions without modes share an empty set.
    pub(crate) fn shared(&self, function_id: u32) -> Arc<ExecutionModeSet> {
        let set = self.sets.get(&function_id).unwrap_or(&self.empty);
        Arc::clone(set)
    }

    pub(crate) fn get(&self, function_id: u32) -> Option<&ExecutionModeSet> {
        self.sets.get(&function_id).map(|s| s.as_ref())
    }
}
