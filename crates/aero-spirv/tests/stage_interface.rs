use aero_spirv::test_utils::SpirvBuilder;
use aero_spirv::limits::MAX_INTERFACE_LOCATIONS;
use aero_spirv::{
    AccessFlags, AnomalyKind, InterfaceSlot, Module, NumericType, ParseOptions, ShaderStage,
};
use pretty_assertions::assert_eq;
use spirv::{BuiltIn, Decoration, ExecutionMode, ExecutionModel, StorageClass};

const FLOAT_ONE: u32 = 0x3f80_0000;

fn slots(iter: impl Iterator<Item = InterfaceSlot>) -> Vec<u32> {
    iter.map(InterfaceSlot::slot).collect()
}

#[test]
fn interface_slot_packs_location_and_component() {
    let slot = InterfaceSlot::new(2, 1);
    assert_eq!(slot.slot(), 9);
    assert_eq!(slot.location(), 2);
    assert_eq!(slot.component(), 1);
    assert_eq!(InterfaceSlot::from_raw(9), slot);
    assert!(InterfaceSlot::new(1, 3) < InterfaceSlot::new(2, 0));
}

#[test]
fn vertex_output_vec4_occupies_one_location() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let one = b.constant_u32(float, FLOAT_ONE);
    let color = b.constant_composite(vec4, &[one, one, one, one]);
    let out_ptr = b.type_pointer(StorageClass::Output, vec4);
    let out = b.variable(out_ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);

    let main = b.simple_function(void, |f| f.store(out, color));
    b.entry_point(ExecutionModel::Vertex, main, "main", &[out]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = module
        .find_entry_point("main", ShaderStage::Vertex)
        .expect("vertex entry point");

    assert_eq!(slots(ep.output_slots()), vec![0, 1, 2, 3]);
    assert_eq!(ep.max_output_slot(), Some(InterfaceSlot::from_raw(3)));
    assert_eq!(ep.max_input_slot(), None);
    assert_eq!(ep.output_slot(InterfaceSlot::new(0, 2)).map(|v| v.id()), Some(out));

    let var = &ep.stage_variables()[0];
    assert!(!var.is_input);
    assert!(!var.is_builtin);
    assert_eq!(var.numeric_type, Some(NumericType::Float));
    assert_eq!(var.bit_width, 32);
    assert_eq!(var.base_location(), Some(0));
    assert!(var.base.access.contains(AccessFlags::WRITE));
    assert!(!var.base.access.contains(AccessFlags::READ));
    assert!(ep.anomalies().is_empty());
}

#[test]
fn double_precision_vec3_spans_two_locations() {
    let mut b = SpirvBuilder::new();
    b.capability(spirv::Capability::Float64);
    let void = b.type_void();
    let double = b.type_float(64);
    let dvec3 = b.type_vector(double, 3);
    let in_ptr = b.type_pointer(StorageClass::Input, dvec3);
    let input = b.variable(in_ptr, StorageClass::Input);
    b.decorate(input, Decoration::Location, &[2]);

    let main = b.simple_function(void, |f| {
        f.load(dvec3, input);
    });
    b.entry_point(ExecutionModel::Vertex, main, "main", &[input]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(module.components_consumed(dvec3), 6);
    assert_eq!(module.bit_width(dvec3), 64);

    let ep = &module.entry_points()[0];
    assert_eq!(slots(ep.input_slots()), (8..14).collect::<Vec<_>>());
    assert_eq!(ep.max_input_slot(), Some(InterfaceSlot::new(3, 1)));
    assert_eq!(ep.input_slot(InterfaceSlot::new(3, 1)).map(|v| v.id()), Some(input));
    assert!(ep.stage_variables()[0].base.access.contains(AccessFlags::READ));
}

#[test]
fn fragment_alpha_output_enables_alpha_to_coverage() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let vec3 = b.type_vector(float, 3);
    let vec4_ptr = b.type_pointer(StorageClass::Output, vec4);
    let vec3_ptr = b.type_pointer(StorageClass::Output, vec3);

    let rgba = b.variable(vec4_ptr, StorageClass::Output);
    b.decorate(rgba, Decoration::Location, &[0]);
    let rgb = b.variable(vec3_ptr, StorageClass::Output);
    b.decorate(rgb, Decoration::Location, &[0]);

    let with_alpha = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, with_alpha, "rgba", &[rgba]);
    let without_alpha = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, without_alpha, "rgb", &[rgb]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let rgba = module.find_entry_point("rgba", ShaderStage::Fragment).unwrap();
    let rgb = module.find_entry_point("rgb", ShaderStage::Fragment).unwrap();
    assert!(rgba.has_alpha_to_coverage_variable());
    assert!(!rgb.has_alpha_to_coverage_variable());
    assert_eq!(rgb.max_output_slot(), Some(InterfaceSlot::new(0, 2)));
}

#[test]
fn component_decoration_offsets_slots() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec2 = b.type_vector(float, 2);
    let ptr = b.type_pointer(StorageClass::Input, vec2);
    let uv = b.variable(ptr, StorageClass::Input);
    b.decorate(uv, Decoration::Location, &[1]);
    b.decorate(uv, Decoration::Component, &[2]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[uv]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(
        ep.input_slots().collect::<Vec<_>>(),
        vec![InterfaceSlot::new(1, 2), InterfaceSlot::new(1, 3)]
    );
}

fn per_vertex_block(b: &mut SpirvBuilder) -> (u32, u32, u32) {
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let block = b.type_struct(&[vec4, float, float]);
    b.decorate(block, Decoration::Block, &[]);
    b.member_decorate(block, 0, Decoration::BuiltIn, &[BuiltIn::Position as u32]);
    b.member_decorate(block, 1, Decoration::BuiltIn, &[BuiltIn::PointSize as u32]);
    b.member_decorate(block, 2, Decoration::BuiltIn, &[BuiltIn::ClipDistance as u32]);
    (float, vec4, block)
}

#[test]
fn builtin_block_member_writes_are_tracked_per_entry_point() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let (float, vec4, block) = per_vertex_block(&mut b);
    let uint = b.type_int(32, false);
    let position_index = b.constant_u32(uint, 0);
    let point_size_index = b.constant_u32(uint, 1);
    let one = b.constant_u32(float, FLOAT_ONE);
    let origin = b.constant_composite(vec4, &[one, one, one, one]);
    let block_ptr = b.type_pointer(StorageClass::Output, block);
    let float_ptr = b.type_pointer(StorageClass::Output, float);
    let vec4_ptr = b.type_pointer(StorageClass::Output, vec4);
    let per_vertex = b.variable(block_ptr, StorageClass::Output);

    let points = b.simple_function(void, |f| {
        let size = f.access_chain(float_ptr, per_vertex, &[point_size_index]);
        f.store(size, one);
    });
    b.entry_point(ExecutionModel::Vertex, points, "points", &[per_vertex]);
    let triangles = b.simple_function(void, |f| {
        let position = f.access_chain(vec4_ptr, per_vertex, &[position_index]);
        f.store(position, origin);
    });
    b.entry_point(ExecutionModel::Vertex, triangles, "triangles", &[per_vertex]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let points = module.find_entry_point("points", ShaderStage::Vertex).unwrap();
    let triangles = module.find_entry_point("triangles", ShaderStage::Vertex).unwrap();

    assert!(points.written_builtin_point_size());
    assert!(!points.written_builtin_layer());
    assert!(!triangles.written_builtin_point_size());

    let var = points.builtin_variables().next().expect("built-in block");
    assert!(var.is_builtin);
    assert!(var.has_builtin(BuiltIn::Position));
    assert!(var.has_builtin(BuiltIn::PointSize));
    assert!(var.slots.is_empty());
    assert!(points.anomalies().is_empty());
    assert_eq!(points.max_output_slot(), None);
}

#[test]
fn directly_decorated_builtin_write_is_tracked() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let uint = b.type_int(32, false);
    let layer_value = b.constant_u32(uint, 3);
    let ptr = b.type_pointer(StorageClass::Output, uint);
    let layer = b.variable(ptr, StorageClass::Output);
    b.decorate(layer, Decoration::BuiltIn, &[BuiltIn::Layer as u32]);

    let main = b.simple_function(void, |f| {
        f.store(layer, layer_value);
        f.emit_vertex();
    });
    b.entry_point(ExecutionModel::Geometry, main, "main", &[layer]);
    b.execution_mode(main, ExecutionMode::OutputVertices, &[3]);
    b.execution_mode(main, ExecutionMode::Invocations, &[2]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(ep.stage(), ShaderStage::Geometry);
    assert!(ep.written_builtin_layer());
    assert!(ep.emits_vertices());
    assert_eq!(ep.execution_modes().output_vertices, Some(3));
    assert_eq!(ep.execution_modes().invocations, Some(2));
}

#[test]
fn primitive_shading_rate_write_is_tracked() {
    const PRIMITIVE_SHADING_RATE_KHR: u32 = 4432;

    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let int = b.type_int(32, true);
    let rate_value = b.constant_u32(int, 1);
    let ptr = b.type_pointer(StorageClass::Output, int);
    let rate = b.variable(ptr, StorageClass::Output);
    b.decorate(rate, Decoration::BuiltIn, &[PRIMITIVE_SHADING_RATE_KHR]);

    let writer = b.simple_function(void, |f| f.store(rate, rate_value));
    let idle = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, writer, "writes", &[rate]);
    b.entry_point(ExecutionModel::Vertex, idle, "idle", &[rate]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let writes = module.find_entry_point("writes", ShaderStage::Vertex).unwrap();
    let idle = module.find_entry_point("idle", ShaderStage::Vertex).unwrap();
    assert!(writes.written_builtin_primitive_shading_rate());
    assert!(!idle.written_builtin_primitive_shading_rate());
    assert!(!writes.written_builtin_layer());
    assert!(!writes.emits_vertices());
}

#[test]
fn tessellation_control_strips_the_vertex_array() {
    let mut b = SpirvBuilder::new();
    b.capability(spirv::Capability::Tessellation);
    let void = b.type_void();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let uint = b.type_int(32, false);
    let three = b.constant_u32(uint, 3);
    let per_vertex_vec4 = b.type_array(vec4, three);

    let in_ptr = b.type_pointer(StorageClass::Input, per_vertex_vec4);
    let positions = b.variable(in_ptr, StorageClass::Input);
    b.decorate(positions, Decoration::Location, &[1]);

    let patch_ptr = b.type_pointer(StorageClass::Output, float);
    let patch = b.variable(patch_ptr, StorageClass::Output);
    b.decorate(patch, Decoration::Location, &[0]);
    b.decorate(patch, Decoration::Patch, &[]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(
        ExecutionModel::TessellationControl,
        main,
        "main",
        &[positions, patch],
    );
    b.execution_mode(main, ExecutionMode::OutputVertices, &[3]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];

    let input = ep.input_slot(InterfaceSlot::new(1, 0)).expect("per-vertex input");
    assert_eq!(input.id(), positions);
    assert!(input.is_per_vertex_arrayed);
    assert_eq!(slots(ep.input_slots()), vec![4, 5, 6, 7]);

    let output = ep.output_slot(InterfaceSlot::new(0, 0)).expect("patch output");
    assert!(output.is_patch);
    assert!(!output.is_per_vertex_arrayed);
    assert_eq!(slots(ep.output_slots()), vec![0]);
    assert_eq!(ep.execution_modes().output_vertices, Some(3));
}

#[test]
fn user_block_members_take_consecutive_locations() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec2 = b.type_vector(float, 2);
    let vec4 = b.type_vector(float, 4);
    let block = b.type_struct(&[vec4, vec2]);
    b.decorate(block, Decoration::Block, &[]);
    let ptr = b.type_pointer(StorageClass::Output, block);
    let varyings = b.variable(ptr, StorageClass::Output);
    b.decorate(varyings, Decoration::Location, &[3]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[varyings]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(slots(ep.output_slots()), vec![12, 13, 14, 15, 16, 17]);
    assert_eq!(
        ep.output_slot(InterfaceSlot::new(4, 1)).map(|v| v.id()),
        Some(varyings)
    );
}

#[test]
fn missing_location_is_an_anomaly_not_an_error() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let ptr = b.type_pointer(StorageClass::Output, vec4);
    let unplaced = b.variable(ptr, StorageClass::Output);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[unplaced]);

    let module = Module::parse(&b.build()).expect("semantic problems do not fail parsing");
    let ep = &module.entry_points()[0];
    assert_eq!(ep.anomalies().len(), 1);
    assert_eq!(ep.anomalies()[0].variable_id, unplaced);
    assert_eq!(ep.anomalies()[0].kind, AnomalyKind::MissingLocation);
    assert_eq!(ep.output_slots().count(), 0);
    assert_eq!(ep.stage_variables().len(), 1);
}

#[test]
fn colliding_locations_keep_the_later_variable() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let float = b.type_float(32);
    let ptr = b.type_pointer(StorageClass::Output, float);
    let first = b.variable(ptr, StorageClass::Output);
    b.decorate(first, Decoration::Location, &[0]);
    let second = b.variable(ptr, StorageClass::Output);
    b.decorate(second, Decoration::Location, &[0]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[first, second]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(
        ep.output_slot(InterfaceSlot::new(0, 0)).map(|v| v.id()),
        Some(second)
    );
    assert_eq!(ep.stage_variables().len(), 2);
}

#[test]
fn variables_outside_the_entry_point_are_ignored() {
    let mut b = SpirvBuilder::new().with_version(1, 3);
    let void = b.type_void();
    let float = b.type_float(32);
    let ptr = b.type_pointer(StorageClass::Output, float);
    let listed = b.variable(ptr, StorageClass::Output);
    b.decorate(listed, Decoration::Location, &[0]);
    let unlisted = b.variable(ptr, StorageClass::Output);
    b.decorate(unlisted, Decoration::Location, &[1]);

    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", &[listed]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(module.header().version_minor(), 3);
    let ep = &module.entry_points()[0];
    assert!(ep.is_accessible(listed));
    assert!(!ep.is_accessible(unlisted));
    assert_eq!(ep.stage_variables().len(), 1);
    assert_eq!(ep.interface_ids(), &[listed]);
}

#[test]
fn entry_points_are_keyed_by_name_and_stage() {
    let mut b = SpirvBuilder::new();
    let void = b.type_void();
    let vs = b.simple_function(void, |_| {});
    let fs = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, vs, "main", &[]);
    b.entry_point(ExecutionModel::Fragment, fs, "main", &[]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(module.entry_points().len(), 2);
    assert_eq!(
        module
            .find_entry_point("main", ShaderStage::Vertex)
            .map(|ep| ep.function_id()),
        Some(vs)
    );
    assert_eq!(
        module
            .find_entry_point("main", ShaderStage::Fragment)
            .map(|ep| ep.function_id()),
        Some(fs)
    );
    assert!(module.find_entry_point("main", ShaderStage::Compute).is_none());
}

fn output_vertex_shader(b: &mut SpirvBuilder, vars: &[u32]) {
    let void = b.type_void();
    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Vertex, main, "main", vars);
}

fn anomaly_kinds(module: &Module) -> Vec<AnomalyKind> {
    module.entry_points()[0]
        .anomalies()
        .iter()
        .map(|a| a.kind)
        .collect()
}

#[test]
fn component_past_the_last_lane_is_an_anomaly() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let ptr = b.type_pointer(StorageClass::Output, float);
    let out = b.variable(ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);
    b.decorate(out, Decoration::Component, &[u32::MAX]);
    output_vertex_shader(&mut b, &[out]);

    let module = Module::parse(&b.build()).expect("a bad Component does not fail parsing");
    assert_eq!(anomaly_kinds(&module), vec![AnomalyKind::InvalidComponent]);
    assert_eq!(module.entry_points()[0].output_slots().count(), 0);
}

#[test]
fn oversized_vector_is_too_large_for_the_interface() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let wide = b.type_vector(float, 1_000_000);
    let ptr = b.type_pointer(StorageClass::Output, wide);
    let out = b.variable(ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);
    output_vertex_shader(&mut b, &[out]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(anomaly_kinds(&module), vec![AnomalyKind::InterfaceTooLarge]);
    assert_eq!(module.entry_points()[0].output_slots().count(), 0);
}

#[test]
fn huge_array_stops_at_the_location_cap() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let uint = b.type_int(32, false);
    let huge = b.constant_u32(uint, u32::MAX);
    let array = b.type_array(vec4, huge);
    let ptr = b.type_pointer(StorageClass::Output, array);
    let out = b.variable(ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);
    output_vertex_shader(&mut b, &[out]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert_eq!(anomaly_kinds(&module), vec![AnomalyKind::InterfaceTooLarge]);
    assert_eq!(ep.output_slots().count(), 4 * MAX_INTERFACE_LOCATIONS as usize);
    assert_eq!(
        ep.max_output_slot(),
        Some(InterfaceSlot::new(MAX_INTERFACE_LOCATIONS - 1, 3))
    );
}

#[test]
fn location_cap_follows_parse_options() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let uint = b.type_int(32, false);
    let four = b.constant_u32(uint, 4);
    let array = b.type_array(vec4, four);
    let ptr = b.type_pointer(StorageClass::Output, array);
    let out = b.variable(ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);
    output_vertex_shader(&mut b, &[out]);
    let words = b.build();

    let options = ParseOptions {
        max_interface_locations: 2,
        ..ParseOptions::default()
    };
    let capped = Module::parse_with_options(&words, &options).expect("module should parse");
    assert_eq!(anomaly_kinds(&capped), vec![AnomalyKind::InterfaceTooLarge]);
    assert_eq!(capped.entry_points()[0].output_slots().count(), 8);

    let module = Module::parse(&words).expect("module should parse");
    assert!(module.entry_points()[0].anomalies().is_empty());
    assert_eq!(module.entry_points()[0].output_slots().count(), 16);
}

#[test]
fn huge_array_of_empty_structs_finishes_without_slots() {
    let mut b = SpirvBuilder::new();
    let empty = b.type_struct(&[]);
    let uint = b.type_int(32, false);
    let huge = b.constant_u32(uint, u32::MAX);
    let array = b.type_array(empty, huge);
    let ptr = b.type_pointer(StorageClass::Input, array);
    let input = b.variable(ptr, StorageClass::Input);
    b.decorate(input, Decoration::Location, &[0]);
    let void = b.type_void();
    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[input]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert!(ep.anomalies().is_empty());
    assert_eq!(ep.input_slots().count(), 0);
    assert_eq!(ep.max_input_slot(), None);
}

#[test]
fn matrix_with_huge_column_count_stops_at_the_location_cap() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let vec4 = b.type_vector(float, 4);
    let matrix = b.type_matrix(vec4, u32::MAX);
    let ptr = b.type_pointer(StorageClass::Output, matrix);
    let out = b.variable(ptr, StorageClass::Output);
    b.decorate(out, Decoration::Location, &[0]);
    output_vertex_shader(&mut b, &[out]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(anomaly_kinds(&module), vec![AnomalyKind::InterfaceTooLarge]);
    assert_eq!(
        module.entry_points()[0].output_slots().count(),
        4 * MAX_INTERFACE_LOCATIONS as usize
    );
}

#[test]
fn unknown_storage_class_is_an_anomaly() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let ptr = b.type_pointer_raw(0xdead, float);
    let odd = b.variable_raw(ptr, 0xdead);
    output_vertex_shader(&mut b, &[odd]);

    let module = Module::parse(&b.build()).expect("unknown storage classes do not fail parsing");
    let ep = &module.entry_points()[0];
    assert_eq!(ep.anomalies().len(), 1);
    assert_eq!(ep.anomalies()[0].variable_id, odd);
    assert_eq!(ep.anomalies()[0].kind, AnomalyKind::UnknownStorageClass);
    assert!(ep.stage_variables().is_empty());
    assert!(ep.resource_variables().is_empty());
}

#[test]
fn nested_empty_structs_are_walked_once() {
    let mut b = SpirvBuilder::new();
    let mut inner = b.type_struct(&[]);
    for _ in 0..6 {
        inner = b.type_struct(&[inner; 1000]);
    }
    let ptr = b.type_pointer(StorageClass::Input, inner);
    let input = b.variable(ptr, StorageClass::Input);
    b.decorate(input, Decoration::Location, &[0]);
    let void = b.type_void();
    let main = b.simple_function(void, |_| {});
    b.entry_point(ExecutionModel::Fragment, main, "main", &[input]);

    let module = Module::parse(&b.build()).expect("module should parse");
    let ep = &module.entry_points()[0];
    assert!(ep.anomalies().is_empty());
    assert_eq!(ep.input_slots().count(), 0);
}

#[test]
fn wide_nested_structs_count_components_without_rewalking() {
    let mut b = SpirvBuilder::new();
    let float = b.type_float(32);
    let mut inner = b.type_struct(&[float]);
    for _ in 0..4 {
        inner = b.type_struct(&[inner; 100]);
    }
    let ptr = b.type_pointer(StorageClass::Private, inner);
    let addr = b.type_pointer(StorageClass::PhysicalStorageBuffer, float);
    let with_addr = b.type_struct(&[addr, float]);

    let module = Module::parse(&b.build()).expect("module should parse");
    assert_eq!(module.components_consumed(inner), 100_000_000);
    assert_eq!(module.components_consumed(ptr), 100_000_000);
    assert_eq!(module.components_consumed(with_addr), 3);
}
