//! Interface variables of an entry point and their addressing.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use spirv::{BuiltIn, Dim, ImageFormat, StorageClass};

use crate::decoration::{DecorationFlags, DecorationSet};
use crate::layout::StructLayout;
use crate::types::{ArrayLength, NumericType};

/// Canonical `(location, component)` address for stage I/O: `location * 4 + component`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceSlot(u32);

impl InterfaceSlot {
    pub const fn new(location: u32, component: u32) -> Self {
        Self(location.saturating_mul(4).saturating_add(component))
    }

    pub const fn from_raw(slot: u32) -> Self {
        Self(slot)
    }

    pub const fn slot(self) -> u32 {
        self.0
    }

    pub const fn location(self) -> u32 {
        self.0 / 4
    }

    pub const fn component(self) -> u32 {
        self.0 % 4
    }
}

impl fmt::Debug for InterfaceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceSlot({}.{})", self.location(), self.component())
    }
}

bitflags! {
    /// How reachable code uses a variable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const ATOMIC = 1 << 2;
        const IMAGE_READ = 1 << 3;
        const IMAGE_WRITE = 1 << 4;
        /// Used by an `OpImageSample*`/`OpImageGather` family instruction.
        const SAMPLED = 1 << 5;
        /// Used with a depth-comparison reference.
        const DREF = 1 << 6;
        /// Used by an image query or `OpArrayLength`.
        const QUERY = 1 << 7;
    }
}

/// Attributes shared by every interface-variable kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBase {
    pub id: u32,
    /// The `OpTypePointer` id.
    pub type_id: u32,
    pub pointee_type_id: u32,
    /// Raw storage class; see [`VariableBase::storage_class`].
    pub storage_class_raw: u32,
    pub decorations: Arc<DecorationSet>,
    /// The struct type, when the (array-stripped) pointee is a struct.
    pub struct_type: Option<u32>,
    pub access: AccessFlags,
}

impl VariableBase {
    pub fn storage_class(&self) -> Option<StorageClass> {
        StorageClass::from_u32(self.storage_class_raw)
    }
}

/// A user-defined or built-in `Input`/`Output` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInterfaceVariable {
    pub base: VariableBase,
    pub is_input: bool,
    /// The variable, or any member of its block, is decorated `BuiltIn`.
    pub is_builtin: bool,
    /// Raw `BuiltIn` values on the variable or its block members.
    pub builtins: Vec<u32>,
    pub is_patch: bool,
    /// The outer array level indexes vertices and was stripped before slot generation.
    pub is_per_vertex_arrayed: bool,
    /// Slots occupied by the user-defined part of the variable, ascending.
    pub slots: Vec<InterfaceSlot>,
    pub numeric_type: Option<NumericType>,
    pub bit_width: u32,
}

impl StageInterfaceVariable {
    pub fn id(&self) -> u32 {
        self.base.id
    }

    pub fn has_builtin(&self, builtin: BuiltIn) -> bool {
        self.builtins.contains(&(builtin as u32))
    }

    pub fn base_location(&self) -> Option<u32> {
        self.slots.first().map(|s| s.location())
    }
}

/// Descriptor `(set, binding)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DescriptorSlot {
    pub set: u32,
    pub binding: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Sampler,
    SampledImage,
    CombinedImageSampler,
    StorageImage,
    UniformTexelBuffer,
    StorageTexelBuffer,
    UniformBuffer,
    StorageBuffer,
    InputAttachment,
    AccelerationStructure,
    Unknown,
}

/// Static shape of the `OpTypeImage` behind a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTraits {
    pub dim_raw: u32,
    /// `0` no depth, `1` depth, `2` unknown.
    pub depth: u32,
    pub arrayed: bool,
    pub multisampled: bool,
    /// `1` sampled, `2` storage, `0` known only at runtime.
    pub sampled: u32,
    pub format_raw: u32,
    pub sampled_type: Option<NumericType>,
    pub sampled_width: u32,
}

impl ImageTraits {
    pub fn dim(&self) -> Option<Dim> {
        Dim::from_u32(self.dim_raw)
    }

    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_u32(self.format_raw)
    }
}

/// A descriptor-bound variable (`UniformConstant`, `Uniform`, `StorageBuffer`, `Image`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInterfaceVariable {
    pub base: VariableBase,
    pub slot: DescriptorSlot,
    pub array_length: ArrayLength,
    pub kind: ResourceKind,
    pub image: Option<ImageTraits>,
    pub input_attachment_index: Option<u32>,
    /// Sampler variables combined with this image through `OpSampledImage`, ascending.
    pub samplers_used: Vec<u32>,
    /// Hash of the static shape; equal hashes mean the same validation outcome for a given
    /// bound resource.
    pub content_hash: u64,
}

impl ResourceInterfaceVariable {
    pub fn id(&self) -> u32 {
        self.base.id
    }

    pub fn is_read_from(&self) -> bool {
        self.base.access.intersects(
            AccessFlags::READ | AccessFlags::IMAGE_READ | AccessFlags::SAMPLED | AccessFlags::ATOMIC,
        )
    }

    pub fn is_written_to(&self) -> bool {
        self.base
            .access
            .intersects(AccessFlags::WRITE | AccessFlags::IMAGE_WRITE | AccessFlags::ATOMIC)
            && !self.base.decorations.has(DecorationFlags::NON_WRITABLE)
    }

    pub fn is_atomic(&self) -> bool {
        self.base.access.contains(AccessFlags::ATOMIC)
    }

    pub fn is_dref(&self) -> bool {
        self.base.access.contains(AccessFlags::DREF)
    }

    pub fn is_runtime_array(&self) -> bool {
        self.array_length == ArrayLength::Runtime
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConstantVariable {
    pub base: VariableBase,
    pub layout: StructLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayloadVariable {
    pub base: VariableBase,
}

/// Any interface variable of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceVariable<'a> {
    Stage(&'a StageInterfaceVariable),
    Resource(&'a ResourceInterfaceVariable),
    PushConstant(&'a PushConstantVariable),
    TaskPayload(&'a TaskPayloadVariable),
}

impl<'a> InterfaceVariable<'a> {
    pub fn base(&self) -> &'a VariableBase {
        match *self {
            InterfaceVariable::Stage(v) => &v.base,
            InterfaceVariable::Resource(v) => &v.base,
            InterfaceVariable::PushConstant(v) => &v.base,
            InterfaceVariable::TaskPayload(v) => &v.base,
        }
    }

    pub fn id(&self) -> u32 {
        self.base().id
    }
}
