use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::constant::{self, SpecializationMap};
use crate::decode::{decode_instructions, parse_header, words_from_bytes, SpirvHeader};
use crate::decoration::{DecorationFlags, DecorationSet, DecorationStore};
use crate::definitions::{check_forward_pointers, DecodedModule, DefinitionIndex};
use crate::entry_point::{self, EntryPoint, ResolveContext, ShaderStage};
use crate::error::SpirvError;
use crate::execution_mode::{ExecutionModeSet, ExecutionModeStore};
use crate::instruction::Instruction;
use crate::layout::{LayoutTable, StructLayout, TypeStructInfo};
use crate::limits::ParseOptions;
use crate::opcode::{
    is_spec_constant, OPCODE_CAPABILITY, OPCODE_CONSTANT_COMPOSITE, OPCODE_ENTRY_POINT,
    OPCODE_EXTENSION, OPCODE_EXT_INST_IMPORT, OPCODE_MEMBER_NAME, OPCODE_NAME,
    OPCODE_SPEC_CONSTANT_COMPOSITE, OPCODE_TYPE_STRUCT,
};
use crate::types::{ArrayLength, NumericType, TypeWalker};

/// A decoded, fully indexed SPIR-V module.
///
/// Construction is all-or-nothing: structural damage fails [`Module::parse`], while semantic
/// oddities inside recognized constructs are recorded and tolerated. A constructed module is
/// immutable and can be shared across threads.
#[derive(Debug)]
pub struct Module {
    decoded: DecodedModule,
    options: ParseOptions,
    decorations: DecorationStore,
    execution_modes: ExecutionModeStore,
    layouts: LayoutTable,
    entry_points: Vec<EntryPoint>,
    capabilities: Vec<u32>,
    extensions: Vec<String>,
    ext_inst_imports: HashMap<u32, String>,
    names: HashMap<u32, String>,
    member_names: HashMap<(u32, u32), String>,
    has_specialization_constants: bool,
}

impl Module {
    /// Parses a module from native-endian words using default [`ParseOptions`].
    pub fn parse(words: &[u32]) -> Result<Self, SpirvError> {
        Self::parse_with_options(words, &ParseOptions::default())
    }

    pub fn parse_with_options(words: &[u32], options: &ParseOptions) -> Result<Self, SpirvError> {
        Self::build(words.to_vec(), options)
    }

    /// Parses a module from bytes in either byte order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpirvError> {
        Self::from_bytes_with_options(bytes, &ParseOptions::default())
    }

    pub fn from_bytes_with_options(
        bytes: &[u8],
        options: &ParseOptions,
    ) -> Result<Self, SpirvError> {
        if bytes.len() / 4 > options.max_words {
            return Err(SpirvError::TooLarge {
                words: bytes.len() / 4,
                max: options.max_words,
            });
        }
        Self::build(words_from_bytes(bytes)?, options)
    }

    fn build(words: Vec<u32>, options: &ParseOptions) -> Result<Self, SpirvError> {
        let _span = debug_span!("spirv_module", words = words.len()).entered();
        if words.len() > options.max_words {
            return Err(SpirvError::TooLarge {
                words: words.len(),
                max: options.max_words,
            });
        }

        let header = parse_header(&words)?;
        let records = decode_instructions(&words)?;
        let index = DefinitionIndex::build(&records, header.bound)?;
        check_forward_pointers(&words, &records, &index)?;
        let decoded = DecodedModule::new(header, words, records, index);

        let decorations = DecorationStore::build(&decoded.words, &decoded.records, &decoded.index);
        let types = TypeWalker {
            decoded: &decoded,
            decorations: &decorations,
            max_depth: options.max_type_depth,
        };
        let execution_modes = ExecutionModeStore::build(&decoded, &decorations);
        let layouts = LayoutTable::build(types);

        let ctx = ResolveContext {
            types,
            layouts: &layouts,
            execution_modes: &execution_modes,
            options,
        };
        let entry_points: Vec<EntryPoint> = decoded
            .with_opcode(OPCODE_ENTRY_POINT)
            .filter_map(|inst| entry_point::resolve(ctx, &inst))
            .collect();

        let mut capabilities = Vec::new();
        let mut extensions = Vec::new();
        let mut ext_inst_imports = HashMap::new();
        let mut names = HashMap::new();
        let mut member_names = HashMap::new();
        let mut has_specialization_constants = false;
        for inst in decoded.instructions() {
            match inst.opcode() {
                OPCODE_CAPABILITY => capabilities.push(inst.word(1)),
                OPCODE_EXTENSION => extensions.push(inst.string(1).0),
                OPCODE_EXT_INST_IMPORT => {
                    ext_inst_imports.insert(inst.word(1), inst.string(2).0);
                }
                OPCODE_NAME => {
                    names.insert(inst.word(1), inst.string(2).0);
                }
                OPCODE_MEMBER_NAME => {
                    member_names.insert((inst.word(1), inst.word(2)), inst.string(3).0);
                }
                opcode if is_spec_constant(opcode) => has_specialization_constants = true,
                _ => {}
            }
        }

        debug!(
            major = decoded.header.version_major(),
            minor = decoded.header.version_minor(),
            bound = decoded.header.bound,
            instructions = decoded.records.len(),
            definitions = decoded.index.len(),
            entry_points = entry_points.len(),
            "parsed SPIR-V module"
        );

        Ok(Self {
            decoded,
            options: *options,
            decorations,
            execution_modes,
            layouts,
            entry_points,
            capabilities,
            extensions,
            ext_inst_imports,
            names,
            member_names,
            has_specialization_constants,
        })
    }

    fn types(&self) -> TypeWalker<'_> {
        TypeWalker {
            decoded: &self.decoded,
            decorations: &self.decorations,
            max_depth: self.options.max_type_depth,
        }
    }

    pub fn header(&self) -> &SpirvHeader {
        &self.decoded.header
    }

    /// The module's words, header included.
    pub fn words(&self) -> &[u32] {
        &self.decoded.words
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn instruction_count(&self) -> usize {
        self.decoded.records.len()
    }

    pub fn instruction(&self, index: usize) -> Option<Instruction<'_>> {
        (index < self.decoded.records.len()).then(|| self.decoded.instruction(index))
    }

    /// All instructions in stream order, including ones with unrecognized opcodes.
    pub fn instructions(&self) -> impl Iterator<Item = Instruction<'_>> + '_ {
        self.decoded.instructions()
    }

    /// The instruction defining result id `id`.
    pub fn find_definition(&self, id: u32) -> Option<Instruction<'_>> {
        self.decoded.definition(id)
    }

    /// Decorations of `id`; undecorated ids yield an empty set.
    pub fn decorations(&self, id: u32) -> &DecorationSet {
        self.decorations.get(id)
    }

    /// Execution modes declared for `function_id`; empty if there are none.
    pub fn execution_modes(&self, function_id: u32) -> Arc<ExecutionModeSet> {
        self.execution_modes.shared(function_id)
    }

    pub fn has_execution_modes(&self, function_id: u32) -> bool {
        self.execution_modes.get(function_id).is_some()
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Entry points are unique per `(name, stage)`, not per name.
    pub fn find_entry_point(&self, name: &str, stage: ShaderStage) -> Option<&EntryPoint> {
        self.entry_points
            .iter()
            .find(|ep| ep.stage() == stage && ep.name() == name)
    }

    /// Layout of struct type `id`; [`StructLayout::UNLAID_OUT`] for non-structs or structs
    /// lacking explicit offsets.
    pub fn struct_layout(&self, id: u32) -> StructLayout {
        self.layouts.layout(id)
    }

    pub fn struct_info(&self, id: u32) -> Option<&TypeStructInfo> {
        self.layouts.info(id)
    }

    /// The type left after stripping pointers and arrays from `id`.
    pub fn base_type(&self, id: u32) -> Option<Instruction<'_>> {
        self.types().base_type(id)
    }

    pub fn numeric_type(&self, id: u32) -> Option<NumericType> {
        self.types().numeric_type(id)
    }

    pub fn bit_width(&self, id: u32) -> u32 {
        self.types().bit_width(id)
    }

    pub fn components_consumed(&self, id: u32) -> u32 {
        self.types().components_consumed(id)
    }

    pub fn array_length(&self, type_id: u32, spec: Option<&SpecializationMap>) -> ArrayLength {
        self.types().array_length(type_id, spec)
    }

    /// Value of a scalar constant or specialization constant, with `spec` overriding defaults.
    ///
    /// `None` means the value is only known at runtime.
    pub fn constant_u32(&self, id: u32, spec: Option<&SpecializationMap>) -> Option<u32> {
        constant::constant_u32(&self.decoded, &self.decorations, id, spec)
    }

    pub fn constant_bool(&self, id: u32, spec: Option<&SpecializationMap>) -> Option<bool> {
        constant::constant_bool(&self.decoded, &self.decorations, id, spec)
    }

    /// The `SpecId` of specialization constant `id`.
    pub fn spec_id(&self, id: u32) -> Option<u32> {
        self.decorations.get(id).spec_id
    }

    /// Components of the `BuiltIn WorkgroupSize` constant, if the module declares one and all
    /// of its components resolve.
    pub fn workgroup_size_constant(&self, spec: Option<&SpecializationMap>) -> Option<[u32; 3]> {
        let inst = self.decoded.instructions().find(|inst| {
            matches!(
                inst.opcode(),
                OPCODE_CONSTANT_COMPOSITE | OPCODE_SPEC_CONSTANT_COMPOSITE
            ) && inst.result_id().is_some_and(|id| {
                self.decorations.get(id).builtin() == Some(spirv::BuiltIn::WorkgroupSize)
            })
        })?;
        let [x, y, z] = [3, 4, 5].map(|w| self.constant_u32(inst.word(w), spec));
        Some([x?, y?, z?])
    }

    pub fn capabilities(&self) -> &[u32] {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: spirv::Capability) -> bool {
        self.capabilities.contains(&(capability as u32))
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    /// Name of the extended instruction set imported as `id` (e.g. `GLSL.std.450`).
    pub fn ext_inst_import(&self, id: u32) -> Option<&str> {
        self.ext_inst_imports.get(&id).map(String::as_str)
    }

    /// The `OpName` of `id`.
    pub fn debug_name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn member_name(&self, id: u32, member: u32) -> Option<&str> {
        self.member_names.get(&(id, member)).map(String::as_str)
    }

    pub fn has_specialization_constants(&self) -> bool {
        self.has_specialization_constants
    }

    pub fn has_group_decorations(&self) -> bool {
        self.decorations.has_groups()
    }

    /// `true` if `id` itself carries `flag`.
    pub fn has_decoration(&self, id: u32, flag: DecorationFlags) -> bool {
        self.decorations.get(id).has(flag)
    }

    /// `true` if `struct_id` is a struct with members and every member carries `flag`.
    pub fn all_members_have(&self, struct_id: u32, flag: DecorationFlags) -> bool {
        let Some(def) = self.find_definition(struct_id) else {
            return false;
        };
        if def.opcode() != OPCODE_TYPE_STRUCT {
            return false;
        }
        let member_count = def.words_from(2).len() as u32;
        self.decorations.get(struct_id).all_members_have(member_count, flag)
    }

    /// Human-readable summary of the header and entry points.
    pub fn debug_summary(&self) -> String {
        let mut out = String::new();
        use core::fmt::Write as _;

        let header = &self.decoded.header;
        let _ = write!(
            &mut out,
            "SPIR-V {}.{} generator={:#010x} bound={} instructions={}",
            header.version_major(),
            header.version_minor(),
            header.generator,
            header.bound,
            self.decoded.records.len()
        );

        for (idx, ep) in self.entry_points.iter().enumerate() {
            let _ = write!(
                &mut out,
                "\n  [{idx:02}] {:?} \"{}\" stage_vars={} resources={} push_constant={} anomalies={}",
                ep.stage(),
                ep.name(),
                ep.stage_variables().len(),
                ep.resource_variables().len(),
                ep.push_constant().is_some(),
                ep.anomalies().len()
            );
        }

        out
    }

    #[cfg(test)]
    pub(crate) fn layout_computations(&self) -> usize {
        self.layouts.computations()
    }
}
