use spirv::{Decoration, Dim, ExecutionMode, ExecutionModel, ImageFormat, StorageClass};

use crate::opcode::*;

fn instruction(opcode: u32, operands: &[u32]) -> Vec<u32> {
    let count = u32::try_from(operands.len() + 1).expect("instruction too long for a test module");
    let mut out = Vec::with_capacity(operands.len() + 1);
    out.push((count << WORD_COUNT_SHIFT) | opcode);
    out.extend_from_slice(operands);
    out
}

/// Encodes a literal string: UTF-8 bytes, nul-terminated, padded to a word boundary.
pub fn string_words(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Builds synthetic SPIR-V modules section by section.
///
/// Instructions are grouped into the logical-layout sections of a real module (capabilities,
/// entry points, annotations, globals, functions) regardless of the order the helpers are
/// called in. Ids are allocated sequentially from `1`; the header bound is set on
/// [`SpirvBuilder::build`].
#[derive(Debug, Clone)]
pub struct SpirvBuilder {
    version: u32,
    next_id: u32,
    preamble: Vec<u32>,
    entry_points: Vec<u32>,
    execution_modes: Vec<u32>,
    debug: Vec<u32>,
    annotations: Vec<u32>,
    globals: Vec<u32>,
    functions: Vec<u32>,
}

impl Default for SpirvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpirvBuilder {
    /// A SPIR-V 1.5 builder with the `Shader` capability declared.
    pub fn new() -> Self {
        let mut b = Self {
            version: 0x0001_0500,
            next_id: 1,
            preamble: Vec::new(),
            entry_points: Vec::new(),
            execution_modes: Vec::new(),
            debug: Vec::new(),
            annotations: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
        };
        b.capability(spirv::Capability::Shader);
        b
    }

    pub fn with_version(mut self, major: u8, minor: u8) -> Self {
        self.version = (u32::from(major) << 16) | (u32::from(minor) << 8);
        self
    }

    pub fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends a raw instruction to the globals section.
    pub fn raw_global(&mut self, opcode: u32, operands: &[u32]) {
        self.globals.extend(instruction(opcode, operands));
    }

    fn global_result(&mut self, opcode: u32, operands: &[u32]) -> u32 {
        let id = self.id();
        let mut ops = vec![id];
        ops.extend_from_slice(operands);
        self.raw_global(opcode, &ops);
        id
    }

    fn global_typed(&mut self, opcode: u32, ty: u32, operands: &[u32]) -> u32 {
        let id = self.id();
        let mut ops = vec![ty, id];
        ops.extend_from_slice(operands);
        self.raw_global(opcode, &ops);
        id
    }

    pub fn capability(&mut self, capability: spirv::Capability) {
        self.preamble
            .extend(instruction(OPCODE_CAPABILITY, &[capability as u32]));
    }

    pub fn extension(&mut self, name: &str) {
        self.preamble
            .extend(instruction(OPCODE_EXTENSION, &string_words(name)));
    }

    pub fn ext_inst_import(&mut self, name: &str) -> u32 {
        let id = self.id();
        let mut ops = vec![id];
        ops.extend(string_words(name));
        self.preamble.extend(instruction(OPCODE_EXT_INST_IMPORT, &ops));
        id
    }

    pub fn name(&mut self, target: u32, name: &str) {
        let mut ops = vec![target];
        ops.extend(string_words(name));
        self.debug.extend(instruction(OPCODE_NAME, &ops));
    }

    pub fn member_name(&mut self, target: u32, member: u32, name: &str) {
        let mut ops = vec![target, member];
        ops.extend(string_words(name));
        self.debug.extend(instruction(OPCODE_MEMBER_NAME, &ops));
    }

    pub fn decorate(&mut self, target: u32, decoration: Decoration, literals: &[u32]) {
        let mut ops = vec![target, decoration as u32];
        ops.extend_from_slice(literals);
        self.annotations.extend(instruction(OPCODE_DECORATE, &ops));
    }

    /// Decorates with a raw decoration value (vendor decorations).
    pub fn decorate_raw(&mut self, target: u32, decoration: u32, literals: &[u32]) {
        let mut ops = vec![target, decoration];
        ops.extend_from_slice(literals);
        self.annotations.extend(instruction(OPCODE_DECORATE, &ops));
    }

    pub fn member_decorate(
        &mut self,
        target: u32,
        member: u32,
        decoration: Decoration,
        literals: &[u32],
    ) {
        let mut ops = vec![target, member, decoration as u32];
        ops.extend_from_slice(literals);
        self.annotations
            .extend(instruction(OPCODE_MEMBER_DECORATE, &ops));
    }

    pub fn decoration_group(&mut self) -> u32 {
        let id = self.id();
        self.annotations
            .extend(instruction(OPCODE_DECORATION_GROUP, &[id]));
        id
    }

    pub fn group_decorate(&mut self, group: u32, targets: &[u32]) {
        let mut ops = vec![group];
        ops.extend_from_slice(targets);
        self.annotations
            .extend(instruction(OPCODE_GROUP_DECORATE, &ops));
    }

    pub fn group_member_decorate(&mut self, group: u32, targets: &[(u32, u32)]) {
        let mut ops = vec![group];
        for &(target, member) in targets {
            ops.extend([target, member]);
        }
        self.annotations
            .extend(instruction(OPCODE_GROUP_MEMBER_DECORATE, &ops));
    }

    pub fn entry_point(
        &mut self,
        model: ExecutionModel,
        function: u32,
        name: &str,
        interface: &[u32],
    ) {
        self.entry_point_raw(model as u32, function, name, interface);
    }

    /// `OpEntryPoint` with a raw execution model value (task/mesh and vendor models).
    pub fn entry_point_raw(&mut self, model: u32, function: u32, name: &str, interface: &[u32]) {
        let mut ops = vec![model, function];
        ops.extend(string_words(name));
        ops.extend_from_slice(interface);
        self.entry_points
            .extend(instruction(OPCODE_ENTRY_POINT, &ops));
    }

    pub fn execution_mode(&mut self, function: u32, mode: ExecutionMode, literals: &[u32]) {
        let mut ops = vec![function, mode as u32];
        ops.extend_from_slice(literals);
        self.execution_modes
            .extend(instruction(OPCODE_EXECUTION_MODE, &ops));
    }

    pub fn execution_mode_id(&mut self, function: u32, mode: ExecutionMode, ids: &[u32]) {
        let mut ops = vec![function, mode as u32];
        ops.extend_from_slice(ids);
        self.execution_modes
            .extend(instruction(OPCODE_EXECUTION_MODE_ID, &ops));
    }

    pub fn type_void(&mut self) -> u32 {
        self.global_result(OPCODE_TYPE_VOID, &[])
    }

    pub fn type_bool(&mut self) -> u32 {
        self.global_result(OPCODE_TYPE_BOOL, &[])
    }

    pub fn type_int(&mut self, width: u32, signed: bool) -> u32 {
        self.global_result(OPCODE_TYPE_INT, &[width, u32::from(signed)])
    }

    pub fn type_float(&mut self, width: u32) -> u32 {
        self.global_result(OPCODE_TYPE_FLOAT, &[width])
    }

    pub fn type_vector(&mut self, component: u32, count: u32) -> u32 {
        self.global_result(OPCODE_TYPE_VECTOR, &[component, count])
    }

    pub fn type_matrix(&mut self, column: u32, columns: u32) -> u32 {
        self.global_result(OPCODE_TYPE_MATRIX, &[column, columns])
    }

    pub fn type_array(&mut self, element: u32, length_id: u32) -> u32 {
        self.global_result(OPCODE_TYPE_ARRAY, &[element, length_id])
    }

    pub fn type_runtime_array(&mut self, element: u32) -> u32 {
        self.global_result(OPCODE_TYPE_RUNTIME_ARRAY, &[element])
    }

    pub fn type_struct(&mut self, members: &[u32]) -> u32 {
        self.global_result(OPCODE_TYPE_STRUCT, members)
    }

    pub fn type_pointer(&mut self, storage_class: StorageClass, pointee: u32) -> u32 {
        self.global_result(OPCODE_TYPE_POINTER, &[storage_class as u32, pointee])
    }

    /// `OpTypePointer` with a raw storage class value (vendor storage classes).
    pub fn type_pointer_raw(&mut self, storage_class: u32, pointee: u32) -> u32 {
        self.global_result(OPCODE_TYPE_POINTER, &[storage_class, pointee])
    }

    /// Declares `OpTypeForwardPointer` for a fresh id; define it later with
    /// [`SpirvBuilder::type_pointer_for`].
    pub fn type_forward_pointer(&mut self, storage_class: StorageClass) -> u32 {
        let id = self.id();
        self.raw_global(OPCODE_TYPE_FORWARD_POINTER, &[id, storage_class as u32]);
        id
    }

    pub fn type_pointer_for(&mut self, id: u32, storage_class: StorageClass, pointee: u32) {
        self.raw_global(OPCODE_TYPE_POINTER, &[id, storage_class as u32, pointee]);
    }

    pub fn type_function(&mut self, ret: u32, params: &[u32]) -> u32 {
        let mut ops = vec![ret];
        ops.extend_from_slice(params);
        self.global_result(OPCODE_TYPE_FUNCTION, &ops)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn type_image(
        &mut self,
        sampled_type: u32,
        dim: Dim,
        depth: u32,
        arrayed: bool,
        multisampled: bool,
        sampled: u32,
        format: ImageFormat,
    ) -> u32 {
        self.global_result(
            OPCODE_TYPE_IMAGE,
            &[
                sampled_type,
                dim as u32,
                depth,
                u32::from(arrayed),
                u32::from(multisampled),
                sampled,
                format as u32,
            ],
        )
    }

    pub fn type_sampler(&mut self) -> u32 {
        self.global_result(OPCODE_TYPE_SAMPLER, &[])
    }

    pub fn type_sampled_image(&mut self, image: u32) -> u32 {
        self.global_result(OPCODE_TYPE_SAMPLED_IMAGE, &[image])
    }

    pub fn constant_u32(&mut self, ty: u32, value: u32) -> u32 {
        self.global_typed(OPCODE_CONSTANT, ty, &[value])
    }

    pub fn constant_bool(&mut self, ty: u32, value: bool) -> u32 {
        let opcode = if value {
            OPCODE_CONSTANT_TRUE
        } else {
            OPCODE_CONSTANT_FALSE
        };
        self.global_typed(opcode, ty, &[])
    }

    pub fn constant_composite(&mut self, ty: u32, components: &[u32]) -> u32 {
        self.global_typed(OPCODE_CONSTANT_COMPOSITE, ty, components)
    }

    /// `OpSpecConstant` with default `value`, decorated `SpecId spec_id`.
    pub fn spec_constant_u32(&mut self, ty: u32, value: u32, spec_id: u32) -> u32 {
        let id = self.global_typed(OPCODE_SPEC_CONSTANT, ty, &[value]);
        self.decorate(id, Decoration::SpecId, &[spec_id]);
        id
    }

    pub fn spec_constant_bool(&mut self, ty: u32, value: bool, spec_id: u32) -> u32 {
        let opcode = if value {
            OPCODE_SPEC_CONSTANT_TRUE
        } else {
            OPCODE_SPEC_CONSTANT_FALSE
        };
        let id = self.global_typed(opcode, ty, &[]);
        self.decorate(id, Decoration::SpecId, &[spec_id]);
        id
    }

    pub fn spec_constant_composite(&mut self, ty: u32, components: &[u32]) -> u32 {
        self.global_typed(OPCODE_SPEC_CONSTANT_COMPOSITE, ty, components)
    }

    /// A global `OpVariable` of pointer type `pointer_type`.
    pub fn variable(&mut self, pointer_type: u32, storage_class: StorageClass) -> u32 {
        self.global_typed(OPCODE_VARIABLE, pointer_type, &[storage_class as u32])
    }

    pub fn variable_raw(&mut self, pointer_type: u32, storage_class: u32) -> u32 {
        self.global_typed(OPCODE_VARIABLE, pointer_type, &[storage_class])
    }

    /// Emits `OpFunction` with parameters, a single block built by `body`, and `OpReturn`.
    ///
    /// `body` receives the parameter ids.
    pub fn function(
        &mut self,
        ret: u32,
        params: &[u32],
        body: impl FnOnce(&mut FunctionBuilder<'_>, &[u32]),
    ) -> u32 {
        let fn_type = self.type_function(ret, params);
        let id = self.id();
        let mut words = instruction(OPCODE_FUNCTION, &[ret, id, 0, fn_type]);
        let param_ids: Vec<u32> = params
            .iter()
            .map(|&ty| {
                let param = self.id();
                words.extend(instruction(OPCODE_FUNCTION_PARAMETER, &[ty, param]));
                param
            })
            .collect();
        let label = self.id();
        words.extend(instruction(OPCODE_LABEL, &[label]));

        let mut f = FunctionBuilder {
            next_id: &mut self.next_id,
            words,
        };
        body(&mut f, &param_ids);
        let mut words = f.words;
        words.extend(instruction(OPCODE_RETURN, &[]));
        words.extend(instruction(OPCODE_FUNCTION_END, &[]));
        self.functions.extend(words);
        id
    }

    /// A parameterless function.
    pub fn simple_function(
        &mut self,
        ret: u32,
        body: impl FnOnce(&mut FunctionBuilder<'_>),
    ) -> u32 {
        self.function(ret, &[], |f, _| body(f))
    }

    /// The header followed by every section, with the bound set past the last allocated id.
    pub fn build(&self) -> Vec<u32> {
        let mut out = vec![spirv::MAGIC_NUMBER, self.version, 0, self.next_id, 0];
        out.extend(&self.preamble);
        // Logical addressing, GLSL450 memory model.
        out.extend(instruction(OPCODE_MEMORY_MODEL, &[0, 1]));
        out.extend(&self.entry_points);
        out.extend(&self.execution_modes);
        out.extend(&self.debug);
        out.extend(&self.annotations);
        out.extend(&self.globals);
        out.extend(&self.functions);
        out
    }

    /// [`SpirvBuilder::build`] serialized as little-endian bytes.
    pub fn build_bytes(&self) -> Vec<u8> {
        self.build().iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

/// Emits instructions into one function body.
pub struct FunctionBuilder<'a> {
    next_id: &'a mut u32,
    words: Vec<u32>,
}

impl FunctionBuilder<'_> {
    pub fn id(&mut self) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        id
    }

    pub fn raw(&mut self, opcode: u32, operands: &[u32]) {
        self.words.extend(instruction(opcode, operands));
    }

    fn typed(&mut self, opcode: u32, ty: u32, operands: &[u32]) -> u32 {
        let id = self.id();
        let mut ops = vec![ty, id];
        ops.extend_from_slice(operands);
        self.raw(opcode, &ops);
        id
    }

    pub fn load(&mut self, ty: u32, pointer: u32) -> u32 {
        self.typed(OPCODE_LOAD, ty, &[pointer])
    }

    pub fn store(&mut self, pointer: u32, value: u32) {
        self.raw(OPCODE_STORE, &[pointer, value]);
    }

    pub fn access_chain(&mut self, pointer_type: u32, base: u32, indices: &[u32]) -> u32 {
        let mut ops = vec![base];
        ops.extend_from_slice(indices);
        self.typed(OPCODE_ACCESS_CHAIN, pointer_type, &ops)
    }

    pub fn call(&mut self, ret: u32, function: u32, args: &[u32]) -> u32 {
        let mut ops = vec![function];
        ops.extend_from_slice(args);
        self.typed(OPCODE_FUNCTION_CALL, ret, &ops)
    }

    pub fn sampled_image(&mut self, ty: u32, image: u32, sampler: u32) -> u32 {
        self.typed(OPCODE_SAMPLED_IMAGE, ty, &[image, sampler])
    }

    pub fn image_sample(&mut self, ty: u32, sampled_image: u32, coordinate: u32) -> u32 {
        self.typed(OPCODE_IMAGE_SAMPLE_IMPLICIT_LOD, ty, &[sampled_image, coordinate])
    }

    pub fn image_sample_dref(
        &mut self,
        ty: u32,
        sampled_image: u32,
        coordinate: u32,
        dref: u32,
    ) -> u32 {
        self.typed(
            OPCODE_IMAGE_SAMPLE_DREF_IMPLICIT_LOD,
            ty,
            &[sampled_image, coordinate, dref],
        )
    }

    pub fn image_write(&mut self, image: u32, coordinate: u32, texel: u32) {
        self.raw(OPCODE_IMAGE_WRITE, &[image, coordinate, texel]);
    }

    /// `OpAtomicIAdd`; `scope` and `semantics` are constant ids.
    pub fn atomic_iadd(
        &mut self,
        ty: u32,
        pointer: u32,
        scope: u32,
        semantics: u32,
        value: u32,
    ) -> u32 {
        const OPCODE_ATOMIC_I_ADD: u32 = 234;
        self.typed(OPCODE_ATOMIC_I_ADD, ty, &[pointer, scope, semantics, value])
    }

    pub fn emit_vertex(&mut self) {
        self.raw(OPCODE_EMIT_VERTEX, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Module;

    #[test]
    fn string_words_pad_and_terminate() {
        assert_eq!(string_words("main"), vec![u32::from_le_bytes(*b"main"), 0]);
        assert_eq!(string_words("vs"), vec![u32::from_le_bytes(*b"vs\0\0")]);
    }

    #[test]
    fn built_module_roundtrips_through_parser() {
        let mut b = SpirvBuilder::new();
        let void = b.type_void();
        let main = b.simple_function(void, |_| {});
        b.entry_point(ExecutionModel::GLCompute, main, "main", &[]);
        b.name(main, "main");

        let words = b.build();
        let module = Module::parse(&words).expect("built module should parse");
        assert_eq!(module.header().bound, words[3]);
        assert_eq!(module.entry_points().len(), 1);
        assert_eq!(module.debug_name(main), Some("main"));
        assert!(module.has_capability(spirv::Capability::Shader));
    }
}
