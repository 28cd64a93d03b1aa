use aero_spirv::opcode::OPCODE_UNDEF;
use aero_spirv::test_utils::SpirvBuilder;
use aero_spirv::{
    AccessFlags, AnomalyKind, ArrayLength, DescriptorSlot, InterfaceVariable, Module,
    NumericType, ResourceKind, ShaderStage, SpecializationMap, StructLayout,
};
use pretty_assertions::assert_eq;
use spirv::{Decoration, Dim, ExecutionModel, ImageFormat, StorageClass};

const FLOAT_HALF: u32 = 0x3f00_0000;
const STORAGE_CLASS_TASK_PAYLOAD_WORKGROUP_EXT: u32 = 5402;
const EXECUTION_MODEL_TASK_EXT: u32 = 5364;

fn bind(b: &mut SpirvBuilder, var: u32, set: u32, binding: u32) {
    b.decorate(var, Decoration::DescriptorSet, &[set]);
    b.decorate(var, Decoration::Binding, &[binding]);
}

#[test]
fn image_resources_are_classified_by_type_and_use() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec2 = b.type_vector(float, 2);
    let vec4 = b.type_vector(float, 4);
    let half = b.constant_u32(float, FLOAT_HALF);
    let coord = b.constant_composite(vec2, &[half, half]);
    let texel = b.constant_composite(vec4, &[half, half, half, half]);

    let color_image = b.type_image(float, Dim::Dim2D, 0, false, false, 1, ImageFormat::Unknown);
    let depth_image = b.type_image(float, Dim::Dim2D, 1, false, false, 1, ImageFormat::Unknown);
    let storage_image = b.type_image(float, Dim::Dim2D, 0, false, false, 2, ImageFormat::Rgba8);
    let sampler = b.type_sampler();
    let combined_ty = b.type_sampled_image(color_image);
    let shadow_ty = b.type_sampled_image(depth_image);

    let combined_ptr = b.type_pointer(StorageClass::UniformConstant, combined_ty);
    let combined = b.variable(combined_ptr, StorageClass::UniformConstant);
    bind(&mut b, combined, 0, 0);
    let depth_ptr = b.type_pointer(StorageClass::UniformConstant, depth_image);
    let shadow_map = b.variable(depth_ptr, StorageClass::UniformConstant);
    bind(&mut b, shadow_map, 0, 1);
    let sampler_ptr = b.type_pointer(StorageClass::UniformConstant, sampler);
    let shadow_sampler = b.variable(sampler_ptr, StorageClass::UniformConstant);
    bind(&mut b, shadow_sampler, 0, 2);
    let storage_ptr = b.type_pointer(StorageClass::UniformConstant, storage_image);
    let target = b.variable(storage_ptr, StorageClass::UniformConstant);
    bind(&mut b, target, 1, 0);

    let main = b.simple_function(void, |f| {
        let tex = f.load(combined_ty, combined);
        f.image_sample(vec4, tex, coord);
        let image = f.load(depth_image, shadow_map);
        let smp = f.load(sampler, shadow_sampler);
        let shadow = f.sampled_image(shadow_ty, image, smp);
        f.image_sample_dref(float, shadow, coord, half);
        let storage = f.load(storage_image, target);
        f.image_write(storage, coord, texel);
    });
    b.entry_point(ExecutionModel::Fragment, main, "main", &[]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(ep.resource_variables().len(), 4);

    let combined = ep.resource(combined).expect("combined image sampler");
    assert_eq!(combined.kind, ResourceKind::CombinedImageSampler);
    assert!(combined.base.access.contains(AccessFlags::READ | AccessFlags::SAMPLED));
    assert!(!combined.is_dref());
    assert!(!combined.is_written_to());
    let image = combined.image.expect("combined sampler carries image traits");
    assert_eq!(image.dim(), Some(Dim::Dim2D));
    assert_eq!(image.sampled_type, Some(NumericType::Float));
    assert_eq!(image.sampled_width, 32);

    let shadow = ep.resource(shadow_map).expect("depth image");
    assert_eq!(shadow.kind, ResourceKind::SampledImage);
    assert!(shadow.is_dref());
    assert_eq!(shadow.samplers_used, vec![shadow_sampler]);
    assert_eq!(shadow.image.map(|i| i.depth), Some(1));

    let sampler = ep.resource(shadow_sampler).expect("sampler");
    assert_eq!(sampler.kind, ResourceKind::Sampler);
    assert!(!sampler.is_dref());
    assert!(sampler.image.is_none());

    let target = ep
        .resource_at(DescriptorSlot { set: 1, binding: 0 })
        .expect("storage image at set 1");
    assert_eq!(target.kind, ResourceKind::StorageImage);
    assert!(target.is_written_to());
    assert!(target.base.access.contains(AccessFlags::IMAGE_WRITE));
    assert_eq!(target.image.and_then(|i| i.format()), Some(ImageFormat::Rgba8));
    assert_eq!(target.array_length, ArrayLength::Fixed(1));
}

#[test]
fn texel_buffers_and_input_attachments() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let uniform_texels = b.type_image(float, Dim::DimBuffer, 0, false, false, 1, ImageFormat::Unknown);
    let storage_texels = b.type_image(float, Dim::DimBuffer, 0, false, false, 2, ImageFormat::R32f);
    let subpass = b.type_image(
        float,
        Dim::DimSubpassData,
        0,
        false,
        false,
        2,
        ImageFormat::Unknown,
    );

    let mut vars = Vec::new();
    for (binding, ty) in [uniform_texels, storage_texels, subpass].into_iter().enumerate() {
        let ptr = b.type_pointer(StorageClass::UniformConstant, ty);
        let var = b.variable(ptr, StorageClass::UniformConstant);
        bind(&mut b, var, 0, binding as u32);
        vars.push(var);
    }
    b.decorate(vars[2], Decoration::InputAttachmentIndex, &[1]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &vars);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    let kinds: Vec<ResourceKind> = vars
        .iter()
        .map(|&id| ep.resource(id).expect("resource").kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::UniformTexelBuffer,
            ResourceKind::StorageTexelBuffer,
            ResourceKind::InputAttachment,
        ]
    );
    assert_eq!(
        ep.resource(vars[2]).and_then(|r| r.input_attachment_index),
        Some(1)
    );
    assert!(ep.resource_variables().iter().all(|r| r.base.access.is_empty()));
}

#[test]
fn storage_buffer_written_through_a_called_function() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let zero = b.constant_u32(uint, 0);
    let seven = b.constant_u32(uint, 7);
    let values = b.type_runtime_array(uint);
    b.decorate(values, Decoration::ArrayStride, &[4]);
    let block = b.type_struct(&[values]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let block_ptr = b.type_pointer(StorageClass::StorageBuffer, block);
    let ssbo = b.variable(block_ptr, StorageClass::StorageBuffer);
    bind(&mut b, ssbo, 1, 2);
    let element_ptr = b.type_pointer(StorageClass::StorageBuffer, uint);

    let write = b.function(void, &[element_ptr], |f, params| f.store(params[0], seven));
    let main = b.simple_function(void, |f| {
        let element = f.access_chain(element_ptr, ssbo, &[zero, zero]);
        f.call(void, write, &[element]);
    });
    b.entry_point(ExecutionModel::GLCompute, main, "main", &[ssbo]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    let resource = ep
        .resource_at(DescriptorSlot { set: 1, binding: 2 })
        .expect("storage buffer at (1, 2)");
    assert_eq!(resource.id(), ssbo);
    assert_eq!(resource.kind, ResourceKind::StorageBuffer);
    assert!(resource.is_written_to());
    assert!(!resource.is_atomic());
    assert_eq!(resource.array_length, ArrayLength::Fixed(1));
    assert_eq!(resource.base.struct_type, Some(block));

    let info = module.struct_info(block).expect("struct info");
    assert!(info.has_runtime_array);
    let layout = module.struct_layout(block);
    assert!(layout.is_laid_out());
    assert_eq!((layout.offset, layout.size), (0, 0));
}

#[test]
fn non_writable_buffer_is_not_reported_written() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let zero = b.constant_u32(uint, 0);
    let block = b.type_struct(&[uint]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let block_ptr = b.type_pointer(StorageClass::StorageBuffer, block);
    let ssbo = b.variable(block_ptr, StorageClass::StorageBuffer);
    b.decorate(ssbo, Decoration::NonWritable, &[]);
    let element_ptr = b.type_pointer(StorageClass::StorageBuffer, uint);

    let main = b.simple_function(void, |f| {
        let element = f.access_chain(element_ptr, ssbo, &[zero]);
        f.store(element, zero);
    });
    b.entry_point(ExecutionModel::GLCompute, main, "main", &[ssbo]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let resource = &module.entry_points()[0].resource_variables()[0];
    assert!(resource.base.access.contains(AccessFlags::WRITE));
    assert!(!resource.is_written_to());
}

#[test]
fn atomics_mark_the_buffer_atomic() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let zero = b.constant_u32(uint, 0);
    let one = b.constant_u32(uint, 1);
    let device_scope = b.constant_u32(uint, 1);
    let relaxed = b.constant_u32(uint, 0);
    let block = b.type_struct(&[uint]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let block_ptr = b.type_pointer(StorageClass::StorageBuffer, block);
    let counter = b.variable(block_ptr, StorageClass::StorageBuffer);
    bind(&mut b, counter, 0, 0);
    let element_ptr = b.type_pointer(StorageClass::StorageBuffer, uint);

    let main = b.simple_function(void, |f| {
        let element = f.access_chain(element_ptr, counter, &[zero]);
        f.atomic_iadd(uint, element, device_scope, relaxed, one);
    });
    b.entry_point(ExecutionModel::GLCompute, main, "main", &[counter]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let resource = &module.entry_points()[0].resource_variables()[0];
    assert!(resource.is_atomic());
    assert!(resource.is_read_from());
    assert!(resource.is_written_to());
}

#[test]
fn uniform_buffers_with_identical_shape_hash_equal() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let block = b.type_struct(&[vec4]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let ubo_ptr = b.type_pointer(StorageClass::Uniform, block);
    let ssbo_ptr = b.type_pointer(StorageClass::StorageBuffer, block);
    let a = b.variable(ubo_ptr, StorageClass::Uniform);
    bind(&mut b, a, 0, 0);
    let c = b.variable(ubo_ptr, StorageClass::Uniform);
    bind(&mut b, c, 0, 1);
    let s = b.variable(ssbo_ptr, StorageClass::StorageBuffer);
    bind(&mut b, s, 0, 2);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[a, c, s]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    let hash = |id| ep.resource(id).map(|r| r.content_hash);
    assert_eq!(ep.resource(a).map(|r| r.kind), Some(ResourceKind::UniformBuffer));
    assert_eq!(hash(a), hash(c));
    assert_ne!(hash(a), hash(s));
}

#[test]
fn descriptor_array_sized_by_specialization_constant() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let count = b.spec_constant_u32(uint, 4, 7);
    let sampler = b.type_sampler();
    let samplers = b.type_array(sampler, count);
    let ptr = b.type_pointer(StorageClass::UniformConstant, samplers);
    let var = b.variable(ptr, StorageClass::UniformConstant);
    bind(&mut b, var, 0, 0);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[var]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert!(module.has_specialization_constants());
    assert_eq!(module.spec_id(count), Some(7));

    let resource = &module.entry_points()[0].resource_variables()[0];
    assert_eq!(resource.kind, ResourceKind::Sampler);
    assert_eq!(resource.array_length, ArrayLength::SpecConstant { id: count });
    assert!(module.entry_points()[0].anomalies().is_empty());

    let spec = SpecializationMap::default().with_u32(7, 16);
    assert_eq!(module.constant_u32(count, None), Some(4));
    assert_eq!(module.constant_u32(count, Some(&spec)), Some(16));
    assert_eq!(module.array_length(ptr, Some(&spec)), ArrayLength::Fixed(16));
    assert_eq!(
        module.array_length(ptr, Some(&SpecializationMap::default())),
        ArrayLength::Fixed(4)
    );
}

#[test]
fn array_length_from_a_non_constant_is_an_anomaly() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let undef = b.id();
    b.raw_global(OPCODE_UNDEF, &[uint, undef]);
    let sampler = b.type_sampler();
    let samplers = b.type_array(sampler, undef);
    let ptr = b.type_pointer(StorageClass::UniformConstant, samplers);
    let var = b.variable(ptr, StorageClass::UniformConstant);
    bind(&mut b, var, 0, 0);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[var]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    let resource = &ep.resource_variables()[0];
    assert_eq!(resource.kind, ResourceKind::Sampler);
    assert_eq!(resource.array_length, ArrayLength::SpecConstant { id: undef });
    assert_eq!(ep.anomalies().len(), 1);
    assert_eq!(ep.anomalies()[0].variable_id, var);
    assert_eq!(ep.anomalies()[0].kind, AnomalyKind::UnresolvedArrayLength);
}

#[test]
fn fixed_descriptor_array_multiplies_dimensions() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let two = b.constant_u32(uint, 2);
    let three = b.constant_u32(uint, 3);
    let sampler = b.type_sampler();
    let inner = b.type_array(sampler, three);
    let outer = b.type_array(inner, two);
    let ptr = b.type_pointer(StorageClass::UniformConstant, outer);
    let var = b.variable(ptr, StorageClass::UniformConstant);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[var]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let resource = &module.entry_points()[0].resource_variables()[0];
    assert_eq!(resource.array_length, ArrayLength::Fixed(6));
    assert_eq!(resource.slot, DescriptorSlot { set: 0, binding: 0 });
}

#[test]
fn push_constant_layout_and_missing_offset() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let laid_out = b.type_struct(&[float, float]);
    b.decorate(laid_out, Decoration::Block, &[]);
    b.member_decorate(laid_out, 0, Decoration::Offset, &[16]);
    b.member_decorate(laid_out, 1, Decoration::Offset, &[20]);
    let partial = b.type_struct(&[float, float]);
    b.decorate(partial, Decoration::Block, &[]);
    b.member_decorate(partial, 1, Decoration::Offset, &[4]);

    let good_ptr = b.type_pointer(StorageClass::PushConstant, laid_out);
    let good = b.variable(good_ptr, StorageClass::PushConstant);
    let bad_ptr = b.type_pointer(StorageClass::PushConstant, partial);
    let bad = b.variable(bad_ptr, StorageClass::PushConstant);

    let vs = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, vs, "good", &[good]);
    let fs = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, fs, "bad", &[bad]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let good = module.find_entry_point("good", ShaderStage::Vertex).unwrap();
    let layout = good.push_constant().expect("push constant").layout;
    assert_eq!((layout.offset, layout.size, layout.end()), (16, 8, 24));

    let bad = module.find_entry_point("bad", ShaderStage::Fragment).unwrap();
    let layout = bad.push_constant().expect("push constant").layout;
    assert_eq!(layout, StructLayout::UNLAID_OUT);
    assert!(!layout.is_laid_out());
    assert_eq!(module.struct_layout(partial), StructLayout::UNLAID_OUT);
}

#[test]
fn nested_struct_and_matrix_layout() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let mat4 = b.type_matrix(vec4, 4);
    let uint = b.type_int(32, false);
    let two = b.constant_u32(uint, 2);
    let pair = b.type_array(vec4, two);
    b.decorate(pair, Decoration::ArrayStride, &[16]);

    let inner = b.type_struct(&[vec4, pair]);
    b.member_decorate(inner, 0, Decoration::Offset, &[0]);
    b.member_decorate(inner, 1, Decoration::Offset, &[16]);
    let outer = b.type_struct(&[mat4, inner]);
    b.member_decorate(outer, 0, Decoration::Offset, &[0]);
    b.member_decorate(outer, 0, Decoration::ColMajor, &[]);
    b.member_decorate(outer, 0, Decoration::MatrixStride, &[16]);
    b.member_decorate(outer, 1, Decoration::Offset, &[64]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let inner_layout = module.struct_layout(inner);
    assert_eq!((inner_layout.offset, inner_layout.size), (0, 48));
    let outer_layout = module.struct_layout(outer);
    assert_eq!((outer_layout.offset, outer_layout.size), (0, 112));

    let info = module.struct_info(outer).expect("struct info");
    assert_eq!(info.members[1].nested_struct, Some(inner));
    assert_eq!(info.members[0].nested_struct, None);
    assert!(!info.has_runtime_array);
}

#[test]
fn matrix_without_stride_is_not_laid_out() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let mat4 = b.type_matrix(vec4, 4);
    let block = b.type_struct(&[mat4]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(module.struct_layout(block), StructLayout::UNLAID_OUT);
}

#[test]
fn second_push_constant_is_an_anomaly() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let block = b.type_struct(&[float]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let ptr = b.type_pointer(StorageClass::PushConstant, block);
    let first = b.variable(ptr, StorageClass::PushConstant);
    let second = b.variable(ptr, StorageClass::PushConstant);
    let scalar_ptr = b.type_pointer(StorageClass::PushConstant, float);
    let scalar = b.variable(scalar_ptr, StorageClass::PushConstant);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[first, second, scalar]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(ep.push_constant().map(|p| p.base.id), Some(first));
    let kinds: Vec<(u32, AnomalyKind)> = ep
        .anomalies()
        .iter()
        .map(|a| (a.variable_id, a.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (second, AnomalyKind::DuplicatePushConstant),
            (scalar, AnomalyKind::PushConstantNotStruct),
        ]
    );
}

#[test]
fn physical_storage_buffer_pointer_in_push_constant() {
    let mut b = SpirvBuilder::new();
    b.capability(spirv::Capability::PhysicalStorageBufferAddresses);
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let zero = b.constant_u32(uint, 0);
    let address = b.type_pointer(StorageClass::PhysicalStorageBuffer, uint);
    let block = b.type_struct(&[address]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::Offset, &[0]);
    let ptr = b.type_pointer(StorageClass::PushConstant, block);
    let pc = b.variable(ptr, StorageClass::PushConstant);
    let member_ptr = b.type_pointer(StorageClass::PushConstant, address);

    let main = b.simple_function(void, |f| {
        let member = f.access_chain(member_ptr, pc, &[zero]);
        f.load(address, member);
    });
    b.entry_point(ExecutionModel::GLCompute, main, "main", &[pc]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert!(ep.has_physical_storage_buffer_interface());
    let layout = ep.push_constant().expect("push constant").layout;
    assert_eq!((layout.offset, layout.size), (0, 8));
}

#[test]
fn task_payload_is_only_valid_for_task_and_mesh() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let payload_block = b.type_struct(&[uint]);
    let ptr = b.type_pointer_raw(STORAGE_CLASS_TASK_PAYLOAD_WORKGROUP_EXT, payload_block);
    let payload = b.variable_raw(ptr, STORAGE_CLASS_TASK_PAYLOAD_WORKGROUP_EXT);

    let task = b.simple_function(void, |_| {});
    b.entry_point_raw(EXECUTION_MODEL_TASK_EXT, task, "task", &[payload]);
    let vertex = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, vertex, "vertex", &[payload]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let task = module.find_entry_point("task", ShaderStage::Task).unwrap();
    assert_eq!(task.task_payload().map(|p| p.base.id), Some(payload));
    assert!(task.anomalies().is_empty());
    assert!(task
        .variables()
        .any(|v| matches!(v, InterfaceVariable::TaskPayload(_))));

    let vertex = module.find_entry_point("vertex", ShaderStage::Vertex).unwrap();
    assert!(vertex.task_payload().is_none());
    assert_eq!(vertex.anomalies().len(), 1);
    assert_eq!(vertex.anomalies()[0].kind, AnomalyKind::TaskPayloadOutsideTaskMesh);
}
