//! SPIR-V opcode numeric constants and the static per-opcode operand schema.
//!
//! The first word of every instruction packs the word count into the high 16 bits and the opcode
//! into the low 16 bits. Only the opcodes this crate interprets (plus the ones needed to classify
//! result/type positions) are named here; everything else is carried through the instruction
//! stream uninterpreted.

/// Low 16 bits of the first instruction word.
pub const OPCODE_MASK: u32 = 0xffff;
/// The instruction word count lives in the high 16 bits.
pub const WORD_COUNT_SHIFT: u32 = 16;

// ---- Debug / module-level ----

pub const OPCODE_NOP: u32 = 0;
pub const OPCODE_UNDEF: u32 = 1;
pub const OPCODE_SOURCE_CONTINUED: u32 = 2;
pub const OPCODE_SOURCE: u32 = 3;
pub const OPCODE_SOURCE_EXTENSION: u32 = 4;
pub const OPCODE_NAME: u32 = 5;
pub const OPCODE_MEMBER_NAME: u32 = 6;
pub const OPCODE_STRING: u32 = 7;
pub const OPCODE_LINE: u32 = 8;
pub const OPCODE_EXTENSION: u32 = 10;
pub const OPCODE_EXT_INST_IMPORT: u32 = 11;
pub const OPCODE_EXT_INST: u32 = 12;
pub const OPCODE_MEMORY_MODEL: u32 = 14;
pub const OPCODE_ENTRY_POINT: u32 = 15;
pub const OPCODE_EXECUTION_MODE: u32 = 16;
pub const OPCODE_CAPABILITY: u32 = 17;

// ---- Types ----

pub const OPCODE_TYPE_VOID: u32 = 19;
pub const OPCODE_TYPE_BOOL: u32 = 20;
pub const OPCODE_TYPE_INT: u32 = 21;
pub const OPCODE_TYPE_FLOAT: u32 = 22;
pub const OPCODE_TYPE_VECTOR: u32 = 23;
pub const OPCODE_TYPE_MATRIX: u32 = 24;
pub const OPCODE_TYPE_IMAGE: u32 = 25;
pub const OPCODE_TYPE_SAMPLER: u32 = 26;
pub const OPCODE_TYPE_SAMPLED_IMAGE: u32 = 27;
pub const OPCODE_TYPE_ARRAY: u32 = 28;
pub const OPCODE_TYPE_RUNTIME_ARRAY: u32 = 29;
pub const OPCODE_TYPE_STRUCT: u32 = 30;
pub const OPCODE_TYPE_OPAQUE: u32 = 31;
pub const OPCODE_TYPE_POINTER: u32 = 32;
pub const OPCODE_TYPE_FUNCTION: u32 = 33;
pub const OPCODE_TYPE_PIPE: u32 = 38;
pub const OPCODE_TYPE_FORWARD_POINTER: u32 = 39;
pub const OPCODE_TYPE_PIPE_STORAGE: u32 = 322;
pub const OPCODE_TYPE_NAMED_BARRIER: u32 = 327;
pub const OPCODE_TYPE_COOPERATIVE_MATRIX_KHR: u32 = 4456;
pub const OPCODE_TYPE_RAY_QUERY_KHR: u32 = 4472;
pub const OPCODE_TYPE_ACCELERATION_STRUCTURE_KHR: u32 = 5341;

// ---- Constants ----

pub const OPCODE_CONSTANT_TRUE: u32 = 41;
pub const OPCODE_CONSTANT_FALSE: u32 = 42;
pub const OPCODE_CONSTANT: u32 = 43;
pub const OPCODE_CONSTANT_COMPOSITE: u32 = 44;
pub const OPCODE_CONSTANT_SAMPLER: u32 = 45;
pub const OPCODE_CONSTANT_NULL: u32 = 46;
pub const OPCODE_SPEC_CONSTANT_TRUE: u32 = 48;
pub const OPCODE_SPEC_CONSTANT_FALSE: u32 = 49;
pub const OPCODE_SPEC_CONSTANT: u32 = 50;
pub const OPCODE_SPEC_CONSTANT_COMPOSITE: u32 = 51;
pub const OPCODE_SPEC_CONSTANT_OP: u32 = 52;

// ---- Functions ----

pub const OPCODE_FUNCTION: u32 = 54;
pub const OPCODE_FUNCTION_PARAMETER: u32 = 55;
pub const OPCODE_FUNCTION_END: u32 = 56;
pub const OPCODE_FUNCTION_CALL: u32 = 57;

// ---- Memory ----

pub const OPCODE_VARIABLE: u32 = 59;
pub const OPCODE_IMAGE_TEXEL_POINTER: u32 = 60;
pub const OPCODE_LOAD: u32 = 61;
pub const OPCODE_STORE: u32 = 62;
pub const OPCODE_COPY_MEMORY: u32 = 63;
pub const OPCODE_COPY_MEMORY_SIZED: u32 = 64;
pub const OPCODE_ACCESS_CHAIN: u32 = 65;
pub const OPCODE_IN_BOUNDS_ACCESS_CHAIN: u32 = 66;
pub const OPCODE_PTR_ACCESS_CHAIN: u32 = 67;
pub const OPCODE_ARRAY_LENGTH: u32 = 68;
pub const OPCODE_IN_BOUNDS_PTR_ACCESS_CHAIN: u32 = 70;

// ---- Annotations ----

pub const OPCODE_DECORATE: u32 = 71;
pub const OPCODE_MEMBER_DECORATE: u32 = 72;
pub const OPCODE_DECORATION_GROUP: u32 = 73;
pub const OPCODE_GROUP_DECORATE: u32 = 74;
pub const OPCODE_GROUP_MEMBER_DECORATE: u32 = 75;
pub const OPCODE_DECORATE_ID: u32 = 332;
pub const OPCODE_DECORATE_STRING: u32 = 5632;
pub const OPCODE_MEMBER_DECORATE_STRING: u32 = 5633;

// ---- Composites ----

pub const OPCODE_COPY_OBJECT: u32 = 83;

// ---- Images ----

pub const OPCODE_SAMPLED_IMAGE: u32 = 86;
pub const OPCODE_IMAGE_SAMPLE_IMPLICIT_LOD: u32 = 87;
pub const OPCODE_IMAGE_SAMPLE_EXPLICIT_LOD: u32 = 88;
pub const OPCODE_IMAGE_SAMPLE_DREF_IMPLICIT_LOD: u32 = 89;
pub const OPCODE_IMAGE_SAMPLE_DREF_EXPLICIT_LOD: u32 = 90;
pub const OPCODE_IMAGE_SAMPLE_PROJ_IMPLICIT_LOD: u32 = 91;
pub const OPCODE_IMAGE_SAMPLE_PROJ_EXPLICIT_LOD: u32 = 92;
pub const OPCODE_IMAGE_SAMPLE_PROJ_DREF_IMPLICIT_LOD: u32 = 93;
pub const OPCODE_IMAGE_SAMPLE_PROJ_DREF_EXPLICIT_LOD: u32 = 94;
pub const OPCODE_IMAGE_FETCH: u32 = 95;
pub const OPCODE_IMAGE_GATHER: u32 = 96;
pub const OPCODE_IMAGE_DREF_GATHER: u32 = 97;
pub const OPCODE_IMAGE_READ: u32 = 98;
pub const OPCODE_IMAGE_WRITE: u32 = 99;
pub const OPCODE_IMAGE: u32 = 100;
pub const OPCODE_IMAGE_QUERY_FORMAT: u32 = 101;
pub const OPCODE_IMAGE_QUERY_ORDER: u32 = 102;
pub const OPCODE_IMAGE_QUERY_SIZE_LOD: u32 = 103;
pub const OPCODE_IMAGE_QUERY_SIZE: u32 = 104;
pub const OPCODE_IMAGE_QUERY_LOD: u32 = 105;
pub const OPCODE_IMAGE_QUERY_LEVELS: u32 = 106;
pub const OPCODE_IMAGE_QUERY_SAMPLES: u32 = 107;
pub const OPCODE_IMAGE_SPARSE_SAMPLE_IMPLICIT_LOD: u32 = 305;
pub const OPCODE_IMAGE_SPARSE_SAMPLE_PROJ_DREF_EXPLICIT_LOD: u32 = 312;
pub const OPCODE_IMAGE_SPARSE_FETCH: u32 = 313;
pub const OPCODE_IMAGE_SPARSE_GATHER: u32 = 314;
pub const OPCODE_IMAGE_SPARSE_DREF_GATHER: u32 = 315;
pub const OPCODE_IMAGE_SPARSE_READ: u32 = 320;

// ---- Geometry / barriers ----

pub const OPCODE_EMIT_VERTEX: u32 = 218;
pub const OPCODE_END_PRIMITIVE: u32 = 219;
pub const OPCODE_EMIT_STREAM_VERTEX: u32 = 220;
pub const OPCODE_END_STREAM_PRIMITIVE: u32 = 221;
pub const OPCODE_CONTROL_BARRIER: u32 = 224;
pub const OPCODE_MEMORY_BARRIER: u32 = 225;

// ---- Atomics ----

pub const OPCODE_ATOMIC_LOAD: u32 = 227;
pub const OPCODE_ATOMIC_STORE: u32 = 228;
pub const OPCODE_ATOMIC_EXCHANGE: u32 = 229;
/// `OpAtomicXor`; the read-modify-write atomics occupy `ATOMIC_EXCHANGE..=ATOMIC_XOR`.
pub const OPCODE_ATOMIC_XOR: u32 = 242;
pub const OPCODE_ATOMIC_FLAG_TEST_AND_SET: u32 = 318;
pub const OPCODE_ATOMIC_FLAG_CLEAR: u32 = 319;
pub const OPCODE_ATOMIC_F_MIN_EXT: u32 = 5614;
pub const OPCODE_ATOMIC_F_MAX_EXT: u32 = 5615;
pub const OPCODE_ATOMIC_F_ADD_EXT: u32 = 6035;

// ---- Control flow ----

pub const OPCODE_PHI: u32 = 245;
pub const OPCODE_LOOP_MERGE: u32 = 246;
pub const OPCODE_SELECTION_MERGE: u32 = 247;
pub const OPCODE_LABEL: u32 = 248;
pub const OPCODE_BRANCH: u32 = 249;
pub const OPCODE_BRANCH_CONDITIONAL: u32 = 250;
pub const OPCODE_SWITCH: u32 = 251;
pub const OPCODE_KILL: u32 = 252;
pub const OPCODE_RETURN: u32 = 253;
pub const OPCODE_RETURN_VALUE: u32 = 254;
pub const OPCODE_UNREACHABLE: u32 = 255;
pub const OPCODE_LIFETIME_START: u32 = 256;
pub const OPCODE_LIFETIME_STOP: u32 = 257;
pub const OPCODE_GROUP_WAIT_EVENTS: u32 = 260;
pub const OPCODE_COMMIT_READ_PIPE: u32 = 280;
pub const OPCODE_COMMIT_WRITE_PIPE: u32 = 281;
pub const OPCODE_GROUP_COMMIT_READ_PIPE: u32 = 287;
pub const OPCODE_GROUP_COMMIT_WRITE_PIPE: u32 = 288;
pub const OPCODE_RETAIN_EVENT: u32 = 297;
pub const OPCODE_RELEASE_EVENT: u32 = 298;
pub const OPCODE_SET_USER_EVENT_STATUS: u32 = 301;
pub const OPCODE_CAPTURE_EVENT_PROFILING_INFO: u32 = 302;
pub const OPCODE_NO_LINE: u32 = 317;
pub const OPCODE_MEMORY_NAMED_BARRIER: u32 = 329;
pub const OPCODE_MODULE_PROCESSED: u32 = 330;
pub const OPCODE_EXECUTION_MODE_ID: u32 = 331;

/// Last opcode of the core (non-extension) numbering range.
pub const OPCODE_CORE_LAST: u32 = 403;

// ---- Extension instructions ----

pub const OPCODE_COLOR_ATTACHMENT_READ_EXT: u32 = 4160;
pub const OPCODE_TERMINATE_INVOCATION: u32 = 4416;
pub const OPCODE_TYPE_UNTYPED_POINTER_KHR: u32 = 4417;
pub const OPCODE_UNTYPED_VARIABLE_KHR: u32 = 4418;
pub const OPCODE_UNTYPED_PREFETCH_KHR: u32 = 4426;
pub const OPCODE_EXT_INST_WITH_FORWARD_REFS_KHR: u32 = 4433;
pub const OPCODE_SDOT: u32 = 4450;
pub const OPCODE_SU_DOT_ACC_SAT: u32 = 4455;
pub const OPCODE_SUBGROUP_BALLOT_KHR: u32 = 4421;
pub const OPCODE_SUBGROUP_FIRST_INVOCATION_KHR: u32 = 4422;
pub const OPCODE_SUBGROUP_ALL_KHR: u32 = 4428;
pub const OPCODE_SUBGROUP_ANY_KHR: u32 = 4429;
pub const OPCODE_SUBGROUP_ALL_EQUAL_KHR: u32 = 4430;
pub const OPCODE_SUBGROUP_READ_INVOCATION_KHR: u32 = 4432;
pub const OPCODE_TRACE_RAY_KHR: u32 = 4445;
pub const OPCODE_EXECUTE_CALLABLE_KHR: u32 = 4446;
pub const OPCODE_CONVERT_U_TO_ACCELERATION_STRUCTURE_KHR: u32 = 4447;
pub const OPCODE_IGNORE_INTERSECTION_KHR: u32 = 4448;
pub const OPCODE_TERMINATE_RAY_KHR: u32 = 4449;
pub const OPCODE_COOPERATIVE_MATRIX_LOAD_KHR: u32 = 4457;
pub const OPCODE_COOPERATIVE_MATRIX_STORE_KHR: u32 = 4458;
pub const OPCODE_COOPERATIVE_MATRIX_MUL_ADD_KHR: u32 = 4459;
pub const OPCODE_COOPERATIVE_MATRIX_LENGTH_KHR: u32 = 4460;
pub const OPCODE_RAY_QUERY_INITIALIZE_KHR: u32 = 4473;
pub const OPCODE_RAY_QUERY_TERMINATE_KHR: u32 = 4474;
pub const OPCODE_RAY_QUERY_GENERATE_INTERSECTION_KHR: u32 = 4475;
pub const OPCODE_RAY_QUERY_CONFIRM_INTERSECTION_KHR: u32 = 4476;
pub const OPCODE_RAY_QUERY_PROCEED_KHR: u32 = 4477;
pub const OPCODE_RAY_QUERY_GET_INTERSECTION_TYPE_KHR: u32 = 4479;
pub const OPCODE_READ_CLOCK_KHR: u32 = 5056;
pub const OPCODE_EMIT_MESH_TASKS_EXT: u32 = 5294;
pub const OPCODE_SET_MESH_OUTPUTS_EXT: u32 = 5295;
pub const OPCODE_REPORT_INTERSECTION_KHR: u32 = 5334;
pub const OPCODE_BEGIN_INVOCATION_INTERLOCK_EXT: u32 = 5364;
pub const OPCODE_END_INVOCATION_INTERLOCK_EXT: u32 = 5365;
pub const OPCODE_DEMOTE_TO_HELPER_INVOCATION: u32 = 5380;
pub const OPCODE_IS_HELPER_INVOCATION_EXT: u32 = 5381;
pub const OPCODE_RAY_QUERY_GET_RAY_T_MIN_KHR: u32 = 6016;
pub const OPCODE_RAY_QUERY_GET_INTERSECTION_T_KHR: u32 = 6018;
pub const OPCODE_RAY_QUERY_GET_INTERSECTION_WORLD_TO_OBJECT_KHR: u32 = 6032;

/// Which of the leading operand words of an instruction are a result type and a result id.
///
/// When both are present the type id is operand 1 and the result id is operand 2; when only a
/// result id is present it is operand 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandSchema {
    pub has_result: bool,
    pub has_type: bool,
}

impl OperandSchema {
    pub const NONE: OperandSchema = OperandSchema {
        has_result: false,
        has_type: false,
    };
    pub const RESULT: OperandSchema = OperandSchema {
        has_result: true,
        has_type: false,
    };
    pub const TYPED_RESULT: OperandSchema = OperandSchema {
        has_result: true,
        has_type: true,
    };

    /// Word index (within the instruction) of the result id, if any.
    pub fn result_word(self) -> Option<usize> {
        match (self.has_result, self.has_type) {
            (true, true) => Some(2),
            (true, false) => Some(1),
            _ => None,
        }
    }

    /// Word index (within the instruction) of the result type id, if any.
    pub fn type_word(self) -> Option<usize> {
        self.has_type.then_some(1)
    }

    /// Minimum instruction length implied by the schema.
    pub fn min_words(self) -> usize {
        1 + usize::from(self.has_result) + usize::from(self.has_type)
    }
}

/// Looks up the result/type layout of `opcode`.
///
/// Named core opcodes default to a typed result unless listed otherwise; unassigned core numbers
/// have none. Extension opcodes are only classified when recognized. Unknown ones fall through to
/// [`OperandSchema::NONE`] so they are kept in the stream but never indexed.
pub fn operand_schema(opcode: u32) -> OperandSchema {
    match opcode {
        OPCODE_NOP
        | OPCODE_SOURCE_CONTINUED
        | OPCODE_SOURCE
        | OPCODE_SOURCE_EXTENSION
        | OPCODE_NAME
        | OPCODE_MEMBER_NAME
        | OPCODE_LINE
        | OPCODE_EXTENSION
        | OPCODE_MEMORY_MODEL
        | OPCODE_ENTRY_POINT
        | OPCODE_EXECUTION_MODE
        | OPCODE_CAPABILITY
        | OPCODE_TYPE_FORWARD_POINTER
        | OPCODE_FUNCTION_END
        | OPCODE_STORE
        | OPCODE_COPY_MEMORY
        | OPCODE_COPY_MEMORY_SIZED
        | OPCODE_DECORATE
        | OPCODE_MEMBER_DECORATE
        | OPCODE_GROUP_DECORATE
        | OPCODE_GROUP_MEMBER_DECORATE
        | OPCODE_IMAGE_WRITE
        | OPCODE_EMIT_VERTEX
        | OPCODE_END_PRIMITIVE
        | OPCODE_EMIT_STREAM_VERTEX
        | OPCODE_END_STREAM_PRIMITIVE
        | OPCODE_CONTROL_BARRIER
        | OPCODE_MEMORY_BARRIER
        | OPCODE_ATOMIC_STORE
        | OPCODE_LOOP_MERGE
        | OPCODE_SELECTION_MERGE
        | OPCODE_BRANCH
        | OPCODE_BRANCH_CONDITIONAL
        | OPCODE_SWITCH
        | OPCODE_KILL
        | OPCODE_RETURN
        | OPCODE_RETURN_VALUE
        | OPCODE_UNREACHABLE
        | OPCODE_LIFETIME_START
        | OPCODE_LIFETIME_STOP
        | OPCODE_GROUP_WAIT_EVENTS
        | OPCODE_COMMIT_READ_PIPE
        | OPCODE_COMMIT_WRITE_PIPE
        | OPCODE_GROUP_COMMIT_READ_PIPE
        | OPCODE_GROUP_COMMIT_WRITE_PIPE
        | OPCODE_RETAIN_EVENT
        | OPCODE_RELEASE_EVENT
        | OPCODE_SET_USER_EVENT_STATUS
        | OPCODE_CAPTURE_EVENT_PROFILING_INFO
        | OPCODE_NO_LINE
        | OPCODE_ATOMIC_FLAG_CLEAR
        | OPCODE_MEMORY_NAMED_BARRIER
        | OPCODE_MODULE_PROCESSED
        | OPCODE_EXECUTION_MODE_ID
        | OPCODE_DECORATE_ID => OperandSchema::NONE,

        // Unassigned core numbers.
        9 | 13 | 18 | 40 | 47 | 53 | 58 | 76 | 85 | 108 | 125 | 153 | 192 | 193 | 206 | 216
        | 217 | 222 | 223 | 226 | 243 | 244 | 258 | 272 | 273 | 289 | 290 | 367..=399 => {
            OperandSchema::NONE
        }

        OPCODE_STRING
        | OPCODE_EXT_INST_IMPORT
        | OPCODE_TYPE_VOID..=OPCODE_TYPE_PIPE
        | OPCODE_DECORATION_GROUP
        | OPCODE_LABEL
        | OPCODE_TYPE_PIPE_STORAGE
        | OPCODE_TYPE_NAMED_BARRIER => OperandSchema::RESULT,

        0..=OPCODE_CORE_LAST => OperandSchema::TYPED_RESULT,

        OPCODE_TYPE_UNTYPED_POINTER_KHR
        | OPCODE_TYPE_COOPERATIVE_MATRIX_KHR
        | OPCODE_TYPE_RAY_QUERY_KHR
        | OPCODE_TYPE_ACCELERATION_STRUCTURE_KHR
        // OpTypeHitObjectNV, OpTypeCooperativeMatrixNV
        | 5281
        | 5358
        // INTEL: OpAsmTargetINTEL, the AVC motion-estimation types, alias scope declarations,
        // OpTypeBufferSurfaceINTEL
        | 5609
        | 5700..=5712
        | 5911..=5913
        | 6086 => OperandSchema::RESULT,

        OPCODE_TERMINATE_INVOCATION
        | OPCODE_UNTYPED_PREFETCH_KHR
        | OPCODE_TRACE_RAY_KHR
        | OPCODE_EXECUTE_CALLABLE_KHR
        | OPCODE_IGNORE_INTERSECTION_KHR
        | OPCODE_TERMINATE_RAY_KHR
        | OPCODE_COOPERATIVE_MATRIX_STORE_KHR
        | OPCODE_RAY_QUERY_INITIALIZE_KHR..=OPCODE_RAY_QUERY_CONFIRM_INTERSECTION_KHR
        | OPCODE_EMIT_MESH_TASKS_EXT
        | OPCODE_SET_MESH_OUTPUTS_EXT
        | OPCODE_BEGIN_INVOCATION_INTERLOCK_EXT
        | OPCODE_END_INVOCATION_INTERLOCK_EXT
        | OPCODE_DEMOTE_TO_HELPER_INVOCATION
        // AMDX node payloads
        | 5075
        | 5090
        // NV hit objects: record, trace, execute, attributes, reorder
        | 5249..=5251
        | 5256
        | 5259..=5264
        | 5266
        | 5279..=5280
        // NV mesh and ray tracing
        | 5299
        | 5335..=5339
        | 5344
        | 5360
        | 5397
        // INTEL block writes, assume, string decorations, memory, loops, continued, barriers
        | 5576
        | 5578
        | 5581
        | 5630
        | 5632..=5633
        | 5820
        | 5887
        | 6090..=6092
        | 6142..=6143 => OperandSchema::NONE,

        OPCODE_COLOR_ATTACHMENT_READ_EXT..=4162
        | OPCODE_UNTYPED_VARIABLE_KHR..=4425
        | OPCODE_SUBGROUP_ALL_KHR..=OPCODE_EXT_INST_WITH_FORWARD_REFS_KHR
        | OPCODE_CONVERT_U_TO_ACCELERATION_STRUCTURE_KHR
        | OPCODE_SDOT..=OPCODE_SU_DOT_ACC_SAT
        | OPCODE_COOPERATIVE_MATRIX_LOAD_KHR
        | OPCODE_COOPERATIVE_MATRIX_MUL_ADD_KHR
        | OPCODE_COOPERATIVE_MATRIX_LENGTH_KHR
        | OPCODE_RAY_QUERY_PROCEED_KHR
        | OPCODE_RAY_QUERY_GET_INTERSECTION_TYPE_KHR..=4483
        | OPCODE_READ_CLOCK_KHR
        | OPCODE_REPORT_INTERSECTION_KHR
        | OPCODE_IS_HELPER_INVOCATION_EXT
        | OPCODE_ATOMIC_F_MIN_EXT
        | OPCODE_ATOMIC_F_MAX_EXT
        | OPCODE_ATOMIC_F_ADD_EXT
        | OPCODE_RAY_QUERY_GET_RAY_T_MIN_KHR..=OPCODE_RAY_QUERY_GET_INTERSECTION_WORLD_TO_OBJECT_KHR
        // AMD group and fragment-mask ops, AMDX node payload completion
        | 5000..=5007
        | 5011..=5012
        | 5078
        // NV hit-object queries, footprint, partition, micromaps, motion, cooperative matrix,
        // bindless conversions
        | 5252..=5255
        | 5257..=5258
        | 5265
        | 5267..=5278
        | 5283
        | 5296
        | 5300..=5301
        | 5340
        | 5359
        | 5361..=5362
        | 5391..=5396
        // INTEL subgroups, integer math, function pointers, inline asm, expect, media, AVC,
        // arbitrary-precision and fixed-point math, pipes, registers, bfloat16, group ops
        | 5571..=5575
        | 5577
        | 5580
        | 5585..=5598
        | 5600..=5601
        | 5610..=5611
        | 5631
        | 5699
        | 5713..=5816
        | 5818..=5819
        | 5840..=5843
        | 5846..=5882
        | 5923..=5934
        | 5938
        | 5946..=5947
        | 5949
        | 6116..=6117
        | 6401..=6408 => OperandSchema::TYPED_RESULT,

        _ => OperandSchema::NONE,
    }
}

/// Returns `true` for the type-declaring opcodes.
pub fn is_type_declaration(opcode: u32) -> bool {
    matches!(
        opcode,
        OPCODE_TYPE_VOID..=OPCODE_TYPE_PIPE
            | OPCODE_TYPE_FORWARD_POINTER
            | OPCODE_TYPE_PIPE_STORAGE
            | OPCODE_TYPE_NAMED_BARRIER
            | OPCODE_TYPE_COOPERATIVE_MATRIX_KHR
            | OPCODE_TYPE_RAY_QUERY_KHR
            | OPCODE_TYPE_ACCELERATION_STRUCTURE_KHR
    )
}

/// Returns `true` for the constant-family opcodes understood by the constant helper.
pub fn is_constant(opcode: u32) -> bool {
    matches!(
        opcode,
        OPCODE_CONSTANT_TRUE..=OPCODE_CONSTANT_NULL | OPCODE_SPEC_CONSTANT_TRUE..=OPCODE_SPEC_CONSTANT_OP
    )
}

/// Returns `true` for the specialization-constant opcodes.
pub fn is_spec_constant(opcode: u32) -> bool {
    matches!(
        opcode,
        OPCODE_SPEC_CONSTANT_TRUE..=OPCODE_SPEC_CONSTANT_OP
    )
}
