//! Entry-point resolution: reachability, interface classification and slot tables.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bitflags::bitflags;
use spirv::{BuiltIn, StorageClass};
use tracing::{debug, trace};

use crate::access::{self, AccessScan};
use crate::constant::constant_u32;
use crate::decoration::{DecorationFlags, DecorationSet};
use crate::definitions::FunctionRange;
use crate::execution_mode::{ExecutionModeSet, ExecutionModeStore};
use crate::instruction::Instruction;
use crate::interface::{
    AccessFlags, DescriptorSlot, ImageTraits, InterfaceSlot, InterfaceVariable,
    PushConstantVariable, ResourceInterfaceVariable, ResourceKind, StageInterfaceVariable,
    TaskPayloadVariable, VariableBase,
};
use crate::layout::LayoutTable;
use crate::limits::ParseOptions;
use crate::opcode::{
    OPCODE_FUNCTION_CALL, OPCODE_SPEC_CONSTANT, OPCODE_SPEC_CONSTANT_OP,
    OPCODE_TYPE_ACCELERATION_STRUCTURE_KHR, OPCODE_TYPE_ARRAY, OPCODE_TYPE_FORWARD_POINTER,
    OPCODE_TYPE_IMAGE, OPCODE_TYPE_MATRIX, OPCODE_TYPE_POINTER, OPCODE_TYPE_SAMPLED_IMAGE,
    OPCODE_TYPE_SAMPLER, OPCODE_TYPE_STRUCT, OPCODE_VARIABLE,
};
use crate::types::{ArrayLength, TypeWalker};

const STORAGE_CLASS_PHYSICAL_STORAGE_BUFFER: u32 = 5349;
const STORAGE_CLASS_TASK_PAYLOAD_WORKGROUP_EXT: u32 = 5402;
const BUILTIN_PRIMITIVE_SHADING_RATE_KHR: u32 = 4432;

const DIM_BUFFER: u32 = spirv::Dim::DimBuffer as u32;
const DIM_SUBPASS_DATA: u32 = spirv::Dim::DimSubpassData as u32;

/// Pipeline stage of an entry point, from its execution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Compute,
    Kernel,
    TaskNv,
    MeshNv,
    RayGeneration,
    Intersection,
    AnyHit,
    ClosestHit,
    Miss,
    Callable,
    Task,
    Mesh,
}

impl ShaderStage {
    pub fn from_execution_model(model: u32) -> Option<Self> {
        Some(match model {
            0 => Self::Vertex,
            1 => Self::TessellationControl,
            2 => Self::TessellationEvaluation,
            3 => Self::Geometry,
            4 => Self::Fragment,
            5 => Self::Compute,
            6 => Self::Kernel,
            5267 => Self::TaskNv,
            5268 => Self::MeshNv,
            5313 => Self::RayGeneration,
            5314 => Self::Intersection,
            5315 => Self::AnyHit,
            5316 => Self::ClosestHit,
            5317 => Self::Miss,
            5318 => Self::Callable,
            5364 => Self::Task,
            5365 => Self::Mesh,
            _ => return None,
        })
    }

    pub fn is_task_or_mesh(self) -> bool {
        matches!(self, Self::TaskNv | Self::MeshNv | Self::Task | Self::Mesh)
    }

    pub fn is_mesh(self) -> bool {
        matches!(self, Self::MeshNv | Self::Mesh)
    }
}

bitflags! {
    /// Summary facts computed once per entry point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryPointFlags: u32 {
        const WRITES_POINT_SIZE = 1 << 0;
        const WRITES_LAYER = 1 << 1;
        const WRITES_PRIMITIVE_SHADING_RATE = 1 << 2;
        /// Fragment output at location 0, component 3 (alpha of the first render target).
        const ALPHA_TO_COVERAGE = 1 << 3;
        const PASSTHROUGH = 1 << 4;
        const PHYSICAL_STORAGE_BUFFER = 1 << 5;
        const EMITS_VERTICES = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    PushConstantNotStruct,
    DuplicatePushConstant,
    DuplicateTaskPayload,
    TaskPayloadOutsideTaskMesh,
    MissingLocation,
    UnresolvedArrayLength,
    UnknownStorageClass,
    InterfaceTooLarge,
    /// A `Component` decoration past 3; the affected leaf gets no slots.
    InvalidComponent,
}

/// A variable that could not be fully classified. The entry point is still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassificationAnomaly {
    pub variable_id: u32,
    pub kind: AnomalyKind,
}

/// One `OpEntryPoint` and everything derived from it.
#[derive(Debug)]
pub struct EntryPoint {
    stage: ShaderStage,
    name: String,
    function_id: u32,
    interface_ids: Vec<u32>,
    accessible_ids: HashSet<u32>,
    execution_modes: Arc<ExecutionModeSet>,
    stage_variables: Vec<StageInterfaceVariable>,
    resource_variables: Vec<ResourceInterfaceVariable>,
    resource_by_id: HashMap<u32, usize>,
    resource_by_slot: HashMap<DescriptorSlot, usize>,
    push_constant: Option<PushConstantVariable>,
    task_payload: Option<TaskPayloadVariable>,
    input_slots: BTreeMap<InterfaceSlot, usize>,
    output_slots: BTreeMap<InterfaceSlot, usize>,
    flags: EntryPointFlags,
    anomalies: Vec<ClassificationAnomaly>,
}

impl EntryPoint {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function_id(&self) -> u32 {
        self.function_id
    }

    /// Interface ids listed on the `OpEntryPoint` instruction.
    pub fn interface_ids(&self) -> &[u32] {
        &self.interface_ids
    }

    /// `true` if `id` is referenced by the entry point's interface list or reachable code.
    pub fn is_accessible(&self, id: u32) -> bool {
        self.accessible_ids.contains(&id)
    }

    pub fn accessible_ids(&self) -> &HashSet<u32> {
        &self.accessible_ids
    }

    pub fn execution_modes(&self) -> &ExecutionModeSet {
        &self.execution_modes
    }

    pub fn stage_variables(&self) -> &[StageInterfaceVariable] {
        &self.stage_variables
    }

    pub fn builtin_variables(&self) -> impl Iterator<Item = &StageInterfaceVariable> {
        self.stage_variables.iter().filter(|v| v.is_builtin)
    }

    pub fn resource_variables(&self) -> &[ResourceInterfaceVariable] {
        &self.resource_variables
    }

    pub fn resource(&self, variable_id: u32) -> Option<&ResourceInterfaceVariable> {
        self.resource_by_id
            .get(&variable_id)
            .map(|&i| &self.resource_variables[i])
    }

    /// The first resource variable declared at `slot`.
    pub fn resource_at(&self, slot: DescriptorSlot) -> Option<&ResourceInterfaceVariable> {
        self.resource_by_slot
            .get(&slot)
            .map(|&i| &self.resource_variables[i])
    }

    pub fn push_constant(&self) -> Option<&PushConstantVariable> {
        self.push_constant.as_ref()
    }

    pub fn task_payload(&self) -> Option<&TaskPayloadVariable> {
        self.task_payload.as_ref()
    }

    /// Every interface variable of the entry point.
    pub fn variables(&self) -> impl Iterator<Item = InterfaceVariable<'_>> {
        self.stage_variables
            .iter()
            .map(InterfaceVariable::Stage)
            .chain(self.resource_variables.iter().map(InterfaceVariable::Resource))
            .chain(self.push_constant.iter().map(InterfaceVariable::PushConstant))
            .chain(self.task_payload.iter().map(InterfaceVariable::TaskPayload))
    }

    /// The input variable occupying `slot`.
    ///
    /// Two variables sharing a slot is invalid input; the later declaration wins.
    pub fn input_slot(&self, slot: InterfaceSlot) -> Option<&StageInterfaceVariable> {
        self.input_slots
            .get(&slot)
            .map(|&i| &self.stage_variables[i])
    }

    /// The output variable occupying `slot`. Same collision rule as [`Self::input_slot`].
    pub fn output_slot(&self, slot: InterfaceSlot) -> Option<&StageInterfaceVariable> {
        self.output_slots
            .get(&slot)
            .map(|&i| &self.stage_variables[i])
    }

    pub fn input_slots(&self) -> impl Iterator<Item = InterfaceSlot> + '_ {
        self.input_slots.keys().copied()
    }

    pub fn output_slots(&self) -> impl Iterator<Item = InterfaceSlot> + '_ {
        self.output_slots.keys().copied()
    }

    pub fn max_input_slot(&self) -> Option<InterfaceSlot> {
        self.input_slots.keys().next_back().copied()
    }

    pub fn max_output_slot(&self) -> Option<InterfaceSlot> {
        self.output_slots.keys().next_back().copied()
    }

    pub fn flags(&self) -> EntryPointFlags {
        self.flags
    }

    pub fn written_builtin_point_size(&self) -> bool {
        self.flags.contains(EntryPointFlags::WRITES_POINT_SIZE)
    }

    pub fn written_builtin_layer(&self) -> bool {
        self.flags.contains(EntryPointFlags::WRITES_LAYER)
    }

    pub fn written_builtin_primitive_shading_rate(&self) -> bool {
        self.flags
            .contains(EntryPointFlags::WRITES_PRIMITIVE_SHADING_RATE)
    }

    pub fn has_alpha_to_coverage_variable(&self) -> bool {
        self.flags.contains(EntryPointFlags::ALPHA_TO_COVERAGE)
    }

    pub fn has_passthrough(&self) -> bool {
        self.flags.contains(EntryPointFlags::PASSTHROUGH)
    }

    pub fn has_physical_storage_buffer_interface(&self) -> bool {
        self.flags.contains(EntryPointFlags::PHYSICAL_STORAGE_BUFFER)
    }

    pub fn emits_vertices(&self) -> bool {
        self.flags.contains(EntryPointFlags::EMITS_VERTICES)
    }

    pub fn anomalies(&self) -> &[ClassificationAnomaly] {
        &self.anomalies
    }
}

/// Everything the resolver reads from the module under construction.
#[derive(Clone, Copy)]
pub(crate) struct ResolveContext<'a> {
    pub types: TypeWalker<'a>,
    pub layouts: &'a LayoutTable,
    pub execution_modes: &'a ExecutionModeStore,
    pub options: &'a ParseOptions,
}

/// Resolves one `OpEntryPoint`. Unknown execution models are skipped.
pub(crate) fn resolve(ctx: ResolveContext<'_>, inst: &Instruction<'_>) -> Option<EntryPoint> {
    let model = inst.word(1);
    let function_id = inst.word(2);
    let (name, name_words) = inst.string(3);
    let Some(stage) = ShaderStage::from_execution_model(model) else {
        debug!(model, %name, "entry point with unknown execution model skipped");
        return None;
    };
    let interface_ids = inst.words_from(3 + name_words).to_vec();

    let functions = reachable_functions(ctx.types, function_id);
    let accessible_ids = accessible_ids(ctx.types, &functions, &interface_ids, function_id);

    let decoded = ctx.types.decoded;
    let globals: Vec<Instruction<'_>> = decoded
        .with_opcode(OPCODE_VARIABLE)
        .filter(|v| !decoded.is_in_function(v.index()))
        .filter(|v| v.result_id().is_some_and(|id| accessible_ids.contains(&id)))
        .collect();
    let roots: HashSet<u32> = globals.iter().filter_map(|v| v.result_id()).collect();
    let scan = access::scan(ctx.types, &functions, &roots);

    let mut builder = Builder {
        ctx,
        stage,
        scan: &scan,
        entry: EntryPoint {
            stage,
            name,
            function_id,
            interface_ids,
            accessible_ids,
            execution_modes: ctx.execution_modes.shared(function_id),
            stage_variables: Vec::new(),
            resource_variables: Vec::new(),
            resource_by_id: HashMap::new(),
            resource_by_slot: HashMap::new(),
            push_constant: None,
            task_payload: None,
            input_slots: BTreeMap::new(),
            output_slots: BTreeMap::new(),
            flags: EntryPointFlags::empty(),
            anomalies: Vec::new(),
        },
    };
    for var in &globals {
        builder.classify(var);
    }
    let entry = builder.finish();
    debug!(
        name = entry.name(),
        ?stage,
        stage_variables = entry.stage_variables.len(),
        resources = entry.resource_variables.len(),
        anomalies = entry.anomalies.len(),
        "resolved entry point"
    );
    Some(entry)
}

/// Functions reachable from `root` through `OpFunctionCall`, root first.
fn reachable_functions<'a>(types: TypeWalker<'a>, root: u32) -> Vec<&'a FunctionRange> {
    let decoded = types.decoded;
    let mut visited = HashSet::from([root]);
    let mut stack = vec![root];
    let mut out = Vec::new();
    while let Some(id) = stack.pop() {
        let Some(function) = decoded.function(id) else {
            trace!(function = id, "call to undefined function");
            continue;
        };
        out.push(function);
        for i in function.start..function.end {
            let inst = decoded.instruction(i);
            if inst.opcode() == OPCODE_FUNCTION_CALL {
                let callee = inst.word(3);
                if visited.insert(callee) {
                    stack.push(callee);
                }
            }
        }
    }
    out
}

/// Ids named by the interface list or by any operand of reachable code.
fn accessible_ids(
    types: TypeWalker<'_>,
    functions: &[&FunctionRange],
    interface_ids: &[u32],
    function_id: u32,
) -> HashSet<u32> {
    let decoded = types.decoded;
    let mut ids: HashSet<u32> = interface_ids.iter().copied().collect();
    ids.insert(function_id);
    for function in functions {
        for i in function.start..function.end {
            let inst = decoded.instruction(i);
            ids.extend(
                inst.words_from(1)
                    .iter()
                    .copied()
                    .filter(|&w| decoded.index.get(w).is_some()),
            );
        }
    }
    ids
}

struct Builder<'a, 's> {
    ctx: ResolveContext<'a>,
    stage: ShaderStage,
    scan: &'s AccessScan,
    entry: EntryPoint,
}

impl Builder<'_, '_> {
    fn anomaly(&mut self, variable_id: u32, kind: AnomalyKind) {
        debug!(variable_id, ?kind, "interface classification anomaly");
        self.entry.anomalies.push(ClassificationAnomaly { variable_id, kind });
    }

    fn variable_base(&self, var: &Instruction<'_>) -> VariableBase {
        let types = self.ctx.types;
        let id = var.word(2);
        let type_id = var.word(1);
        let pointee_type_id = types.pointee(type_id);
        let struct_type = types
            .base_type(pointee_type_id)
            .filter(|t| t.opcode() == OPCODE_TYPE_STRUCT)
            .and_then(|t| t.result_id());
        VariableBase {
            id,
            type_id,
            pointee_type_id,
            storage_class_raw: var.word(3),
            decorations: types.decorations.shared(id),
            struct_type,
            access: self.scan.variable(id),
        }
    }

    fn classify(&mut self, var: &Instruction<'_>) {
        let base = self.variable_base(var);
        let storage_class = base.storage_class_raw;
        if storage_class == STORAGE_CLASS_TASK_PAYLOAD_WORKGROUP_EXT {
            self.add_task_payload(base);
            return;
        }
        match StorageClass::from_u32(storage_class) {
            Some(StorageClass::Input) => self.add_stage_variable(base, true),
            Some(StorageClass::Output) => self.add_stage_variable(base, false),
            Some(
                StorageClass::UniformConstant
                | StorageClass::Uniform
                | StorageClass::StorageBuffer
                | StorageClass::Image,
            ) => self.add_resource(base),
            Some(StorageClass::PushConstant) => self.add_push_constant(base),
            Some(_) => {}
            None => self.anomaly(base.id, AnomalyKind::UnknownStorageClass),
        }
    }

    fn is_per_vertex_arrayed(&self, decorations: &DecorationSet, is_input: bool) -> bool {
        let patch = decorations.has(DecorationFlags::PATCH);
        match self.stage {
            ShaderStage::TessellationControl => !patch,
            ShaderStage::TessellationEvaluation => is_input && !patch,
            ShaderStage::Geometry => is_input,
            ShaderStage::MeshNv | ShaderStage::Mesh => !is_input,
            ShaderStage::Fragment => is_input && decorations.has(DecorationFlags::PER_VERTEX),
            _ => false,
        }
    }

    fn add_stage_variable(&mut self, base: VariableBase, is_input: bool) {
        let types = self.ctx.types;
        let decorations = Arc::clone(&base.decorations);
        let is_per_vertex_arrayed = self.is_per_vertex_arrayed(&decorations, is_input);
        let ty = if is_per_vertex_arrayed {
            types.strip_array(base.pointee_type_id)
        } else {
            base.pointee_type_id
        };
        let block = types
            .def(ty)
            .filter(|t| t.opcode() == OPCODE_TYPE_STRUCT);
        let block_decorations = block.map(|b| types.decorations.get(b.word(1)));

        let mut builtins: Vec<u32> = decorations.base.builtin.into_iter().collect();
        if let Some(block_decorations) = block_decorations {
            builtins.extend(block_decorations.members.values().filter_map(|m| m.builtin));
        }
        let is_builtin = !builtins.is_empty();

        let mut slots = SlotBuilder::new(types, self.ctx.options.max_interface_locations);
        let mut missing_location = false;
        if !decorations.has(DecorationFlags::BUILTIN) {
            let location = decorations.location();
            let component = decorations.component().unwrap_or(0);
            match (block, block_decorations) {
                (Some(block), Some(block_decorations)) => {
                    let mut next = location;
                    for (member, &member_type) in block.words_from(2).iter().enumerate() {
                        let member_decorations = block_decorations.member(member as u32);
                        if member_decorations.has(DecorationFlags::BUILTIN) {
                            continue;
                        }
                        let Some(loc) = member_decorations.location.or(next) else {
                            missing_location = true;
                            break;
                        };
                        let comp = member_decorations.component.unwrap_or(0);
                        next = Some(loc.saturating_add(slots.add(member_type, loc, comp)));
                    }
                }
                _ => match location {
                    Some(loc) => {
                        slots.add(ty, loc, component);
                    }
                    None => missing_location = true,
                },
            }
        }
        if missing_location {
            self.anomaly(base.id, AnomalyKind::MissingLocation);
        }
        if slots.exhausted {
            self.anomaly(base.id, AnomalyKind::InterfaceTooLarge);
        }
        if slots.invalid_component {
            self.anomaly(base.id, AnomalyKind::InvalidComponent);
        }

        let mut slots = slots.slots;
        slots.sort_unstable();
        slots.dedup();

        self.entry.stage_variables.push(StageInterfaceVariable {
            is_input,
            is_builtin,
            builtins,
            is_patch: decorations.has(DecorationFlags::PATCH),
            is_per_vertex_arrayed,
            slots,
            numeric_type: types.numeric_type(ty),
            bit_width: types.bit_width(ty),
            base,
        });
    }

    fn add_resource(&mut self, base: VariableBase) {
        let types = self.ctx.types;
        let decorations = Arc::clone(&base.decorations);
        let array_length = types.array_length(base.pointee_type_id, None);
        if let ArrayLength::SpecConstant { id } = array_length {
            let is_spec = matches!(
                types.decoded.opcode_of(id),
                Some(OPCODE_SPEC_CONSTANT | OPCODE_SPEC_CONSTANT_OP)
            );
            if !is_spec {
                self.anomaly(base.id, AnomalyKind::UnresolvedArrayLength);
            }
        }

        let image = types
            .image_type(base.pointee_type_id)
            .filter(|t| t.opcode() == OPCODE_TYPE_IMAGE)
            .map(|t| ImageTraits {
                dim_raw: t.word(3),
                depth: t.word(4),
                arrayed: t.word(5) != 0,
                multisampled: t.word(6) != 0,
                sampled: t.word(7),
                format_raw: t.word(8),
                sampled_type: types.numeric_type(t.word(2)),
                sampled_width: types.bit_width(t.word(2)),
            });
        let kind = self.resource_kind(&base, image.as_ref());
        let samplers_used = self
            .scan
            .samplers
            .get(&base.id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        let slot = DescriptorSlot {
            set: decorations.descriptor_set.unwrap_or(0),
            binding: decorations.binding.unwrap_or(0),
        };

        let mut resource = ResourceInterfaceVariable {
            slot,
            array_length,
            kind,
            image,
            input_attachment_index: decorations.input_attachment_index,
            samplers_used,
            content_hash: 0,
            base,
        };
        resource.content_hash = content_hash(&resource);

        let index = self.entry.resource_variables.len();
        self.entry.resource_by_id.insert(resource.id(), index);
        self.entry.resource_by_slot.entry(slot).or_insert(index);
        self.entry.resource_variables.push(resource);
    }

    fn resource_kind(&self, base: &VariableBase, image: Option<&ImageTraits>) -> ResourceKind {
        let types = self.ctx.types;
        match StorageClass::from_u32(base.storage_class_raw) {
            Some(StorageClass::StorageBuffer) => return ResourceKind::StorageBuffer,
            Some(StorageClass::Uniform) => {
                let buffer_block = base
                    .struct_type
                    .is_some_and(|s| types.decorations.get(s).has(DecorationFlags::BUFFER_BLOCK));
                return if buffer_block {
                    ResourceKind::StorageBuffer
                } else {
                    ResourceKind::UniformBuffer
                };
            }
            _ => {}
        }
        let Some(ty) = types.base_type(base.pointee_type_id) else {
            return ResourceKind::Unknown;
        };
        match (ty.opcode(), image) {
            (OPCODE_TYPE_SAMPLER, _) => ResourceKind::Sampler,
            (OPCODE_TYPE_SAMPLED_IMAGE, _) => ResourceKind::CombinedImageSampler,
            (OPCODE_TYPE_ACCELERATION_STRUCTURE_KHR, _) => ResourceKind::AccelerationStructure,
            (OPCODE_TYPE_IMAGE, Some(image)) => match (image.dim_raw, image.sampled) {
                (DIM_BUFFER, 2) => ResourceKind::StorageTexelBuffer,
                (DIM_BUFFER, _) => ResourceKind::UniformTexelBuffer,
                (DIM_SUBPASS_DATA, _) => ResourceKind::InputAttachment,
                (_, 2) => ResourceKind::StorageImage,
                _ => ResourceKind::SampledImage,
            },
            _ => ResourceKind::Unknown,
        }
    }

    fn add_push_constant(&mut self, base: VariableBase) {
        let pointee = self.ctx.types.decoded.opcode_of(base.pointee_type_id);
        let is_struct = pointee == Some(OPCODE_TYPE_STRUCT);
        if !is_struct {
            self.anomaly(base.id, AnomalyKind::PushConstantNotStruct);
            return;
        }
        if self.entry.push_constant.is_some() {
            self.anomaly(base.id, AnomalyKind::DuplicatePushConstant);
            return;
        }
        let layout = self.ctx.layouts.layout(base.pointee_type_id);
        self.entry.push_constant = Some(PushConstantVariable { base, layout });
    }

    fn add_task_payload(&mut self, base: VariableBase) {
        if !self.stage.is_task_or_mesh() {
            self.anomaly(base.id, AnomalyKind::TaskPayloadOutsideTaskMesh);
            return;
        }
        if self.entry.task_payload.is_some() {
            self.anomaly(base.id, AnomalyKind::DuplicateTaskPayload);
            return;
        }
        self.entry.task_payload = Some(TaskPayloadVariable { base });
    }

    fn finish(mut self) -> EntryPoint {
        let types = self.ctx.types;
        for (index, var) in self.entry.stage_variables.iter().enumerate() {
            let table = if var.is_input {
                &mut self.entry.input_slots
            } else {
                &mut self.entry.output_slots
            };
            for &slot in &var.slots {
                table.insert(slot, index);
            }
        }

        let mut flags = EntryPointFlags::empty();
        for var in &self.entry.stage_variables {
            if var.base.decorations.has(DecorationFlags::PASSTHROUGH)
                || member_decorations_have(types, var, DecorationFlags::PASSTHROUGH)
            {
                flags |= EntryPointFlags::PASSTHROUGH;
            }
            if var.is_input {
                continue;
            }
            if builtin_written(types, self.scan, var, BuiltIn::PointSize as u32) {
                flags |= EntryPointFlags::WRITES_POINT_SIZE;
            }
            if builtin_written(types, self.scan, var, BuiltIn::Layer as u32) {
                flags |= EntryPointFlags::WRITES_LAYER;
            }
            if builtin_written(types, self.scan, var, BUILTIN_PRIMITIVE_SHADING_RATE_KHR) {
                flags |= EntryPointFlags::WRITES_PRIMITIVE_SHADING_RATE;
            }
        }
        if self.stage == ShaderStage::Fragment
            && self.entry.output_slots.contains_key(&InterfaceSlot::new(0, 3))
        {
            flags |= EntryPointFlags::ALPHA_TO_COVERAGE;
        }
        if self.scan.emits_vertices {
            flags |= EntryPointFlags::EMITS_VERTICES;
        }
        let uses_physical_storage_buffer = self.entry.accessible_ids.iter().any(|&id| {
            types.def(id).is_some_and(|t| {
                matches!(t.opcode(), OPCODE_TYPE_POINTER | OPCODE_TYPE_FORWARD_POINTER)
                    && t.word(2) == STORAGE_CLASS_PHYSICAL_STORAGE_BUFFER
            })
        });
        if uses_physical_storage_buffer {
            flags |= EntryPointFlags::PHYSICAL_STORAGE_BUFFER;
        }
        self.entry.flags = flags;
        self.entry
    }
}

/// The block struct of a stage variable, after per-vertex array stripping.
fn block_struct(types: TypeWalker<'_>, var: &StageInterfaceVariable) -> Option<u32> {
    let ty = if var.is_per_vertex_arrayed {
        types.strip_array(var.base.pointee_type_id)
    } else {
        var.base.pointee_type_id
    };
    (types.decoded.opcode_of(ty) == Some(OPCODE_TYPE_STRUCT)).then_some(ty)
}

fn member_decorations_have(
    types: TypeWalker<'_>,
    var: &StageInterfaceVariable,
    flag: DecorationFlags,
) -> bool {
    block_struct(types, var).is_some_and(|s| {
        types
            .decorations
            .get(s)
            .members
            .values()
            .any(|m| m.has(flag))
    })
}

/// `true` if reachable code writes built-in `builtin` through `var` (whole or block member).
fn builtin_written(
    types: TypeWalker<'_>,
    scan: &AccessScan,
    var: &StageInterfaceVariable,
    builtin: u32,
) -> bool {
    if !var.builtins.contains(&builtin) {
        return false;
    }
    if var.base.decorations.base.builtin == Some(builtin) {
        return var.base.access.contains(AccessFlags::WRITE);
    }
    let Some(block) = block_struct(types, var) else {
        return false;
    };
    types
        .decorations
        .get(block)
        .members
        .iter()
        .filter(|(_, m)| m.builtin == Some(builtin))
        .any(|(&member, _)| scan.member(var.base.id, member).contains(AccessFlags::WRITE))
}

/// Flattens stage I/O types into interface slots.
struct SlotBuilder<'a> {
    types: TypeWalker<'a>,
    slots: Vec<InterfaceSlot>,
    remaining_locations: u32,
    exhausted: bool,
    invalid_component: bool,
    empty_types: HashSet<u32>,
}

impl<'a> SlotBuilder<'a> {
    fn new(types: TypeWalker<'a>, max_locations: u32) -> Self {
        Self {
            types,
            slots: Vec::new(),
            remaining_locations: max_locations,
            exhausted: false,
            invalid_component: false,
            empty_types: HashSet::new(),
        }
    }

    /// Adds the slots of `ty` placed at `location`/`component`; returns locations consumed.
    fn add(&mut self, ty: u32, location: u32, component: u32) -> u32 {
        self.add_at(ty, location, component, 0)
    }

    fn add_at(&mut self, ty: u32, location: u32, component: u32, depth: usize) -> u32 {
        if self.exhausted || self.empty_types.contains(&ty) {
            return 0;
        }
        if depth >= self.types.max_depth {
            self.exhausted = true;
            return 0;
        }
        let Some(inst) = self.types.def(ty) else {
            return 0;
        };
        let consumed = match inst.opcode() {
            OPCODE_TYPE_MATRIX => {
                let column = inst.word(2);
                let mut consumed = 0;
                for _ in 0..inst.word(3) {
                    if self.exhausted {
                        break;
                    }
                    let added = self.add_at(column, location.saturating_add(consumed), 0, depth + 1);
                    if added == 0 {
                        break;
                    }
                    consumed += added;
                }
                consumed
            }
            OPCODE_TYPE_ARRAY => {
                let decorations = self.types.decorations;
                let length = constant_u32(self.types.decoded, decorations, inst.word(3), None)
                    .unwrap_or(0);
                let element = inst.word(2);
                let mut consumed = 0;
                for _ in 0..length {
                    if self.exhausted {
                        break;
                    }
                    let at = location.saturating_add(consumed);
                    // Every element has the same shape, so one empty element means all are.
                    let added = self.add_at(element, at, component, depth + 1);
                    if added == 0 {
                        break;
                    }
                    consumed += added;
                }
                consumed
            }
            OPCODE_TYPE_STRUCT => {
                let mut consumed = 0;
                for &member in inst.words_from(2) {
                    if self.exhausted {
                        break;
                    }
                    consumed += self.add_at(member, location.saturating_add(consumed), 0, depth + 1);
                }
                consumed
            }
            _ => self.add_leaf(ty, location, component),
        };
        // Zero-location types are skipped on later visits, which keeps nested empty aggregates
        // linear in the type graph.
        if consumed == 0 && !self.exhausted && !self.invalid_component {
            self.empty_types.insert(ty);
        }
        consumed
    }

    fn add_leaf(&mut self, ty: u32, location: u32, component: u32) -> u32 {
        let components = self.types.components_consumed(ty);
        if components == 0 {
            return 0;
        }
        if component > 3 {
            self.invalid_component = true;
            return 0;
        }
        // No leaf is wider than a dvec4.
        if components > 8 {
            self.exhausted = true;
            return 0;
        }
        let locations = (component + components).div_ceil(4);
        if locations > self.remaining_locations {
            self.exhausted = true;
            return 0;
        }
        self.remaining_locations -= locations;
        let start = InterfaceSlot::new(location, component).slot();
        self.slots
            .extend((start..start.saturating_add(components)).map(InterfaceSlot::from_raw));
        locations
    }
}

/// Hash of a resource's static shape: everything except its id and binding.
fn content_hash(resource: &ResourceInterfaceVariable) -> u64 {
    let mut bytes = Vec::with_capacity(64);
    let mut push = |v: u32| bytes.extend_from_slice(&v.to_le_bytes());
    push(resource.base.storage_class_raw);
    push(resource.kind as u32);
    match resource.array_length {
        ArrayLength::Fixed(n) => {
            push(0);
            push(n);
        }
        ArrayLength::Runtime => push(1),
        ArrayLength::SpecConstant { id } => {
            push(2);
            push(id);
        }
    }
    if let Some(image) = &resource.image {
        push(image.dim_raw);
        push(image.depth);
        push(u32::from(image.arrayed));
        push(u32::from(image.multisampled));
        push(image.sampled);
        push(image.format_raw);
        push(image.sampled_type.map_or(u32::MAX, |t| t as u32));
        push(image.sampled_width);
    }
    push(resource.base.access.bits());
    let decoration_bits = resource.base.decorations.base.flags.bits();
    push(decoration_bits as u32);
    push((decoration_bits >> 32) as u32);
    push(resource.samplers_used.len() as u32);
    xxhash_rust::xxh3::xxh3_64(&bytes)
}
