//! End-to-end resolution of small but complete programs.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_ir::{
    Access, AstBuilder, BinaryOp, BuiltinValue, PipelineStage, SamplerKind, StorageClass,
    StringInterner, TextureDimension, VariableKind,
};
use lumen_resolve::{resolve, ResolverOptions};
use lumen_sem::{ArrayCount, BuiltinFn, TypeKind};
use pretty_assertions::assert_eq;

fn handle_var() -> VariableKind {
    VariableKind::Var {
        storage_class: None,
        access: None,
    }
}

#[test]
fn fragment_shader_with_texture_sampling() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let t = b.global(b.variable(
        "t",
        handle_var(),
        Some(b.ty_sampled_texture(TextureDimension::D2, b.ty_f32())),
        None,
        vec![b.group(0), b.binding(0)],
    ));
    let s = b.global(b.variable(
        "s",
        handle_var(),
        Some(b.ty_sampler(SamplerKind::Sampler)),
        None,
        vec![b.group(0), b.binding(1)],
    ));
    let helper = b.func(
        "sample_at",
        vec![b.param("uv", b.ty_vec(2, b.ty_f32()), vec![])],
        Some(b.ty_vec(4, b.ty_f32())),
        vec![b.return_value(b.call(
            "textureSample",
            vec![b.ident("t"), b.ident("s"), b.ident("uv")],
        ))],
        vec![],
    );
    let fs = b.func_with_return_attrs(
        "fs",
        vec![b.param("uv", b.ty_vec(2, b.ty_f32()), vec![b.location(0)])],
        Some(b.ty_vec(4, b.ty_f32())),
        vec![b.location(0)],
        vec![b.return_value(b.call("sample_at", vec![b.ident("uv")]))],
        vec![b.stage(PipelineStage::Fragment)],
    );
    let module = b.finish();

    let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
    assert!(program.warnings().is_empty());
    assert_eq!(program.visited_nodes(), module.node_count());

    let graph = program.graph();
    let t = graph.variable_for(t).unwrap();
    let s = graph.variable_for(s).unwrap();
    assert_eq!(graph.variable(t).storage_class, StorageClass::Handle);
    assert_eq!(graph.variable(s).binding_point.map(|bp| bp.binding), Some(1));

    let helper_id = graph.function_for(helper).unwrap();
    let fs_id = graph.function_for(fs).unwrap();
    let helper = graph.function(helper_id);
    let fs = graph.function(fs_id);
    assert!(helper.called_builtins.contains(&BuiltinFn::TextureSample));
    assert!(helper.ancestor_entry_points.contains(&fs_id));
    assert!(fs.transitively_called.contains(&helper_id));
    assert!(fs.transitively_referenced_globals.contains(&t));
    assert!(fs.transitively_referenced_globals.contains(&s));
    assert!(fs.texture_sampler_pairs.contains(&(t, Some(s))));

    let entry_points: Vec<_> = program.entry_points().map(|f| f.decl).collect();
    assert_eq!(entry_points, vec![fs.decl]);
}

#[test]
fn compute_shader_over_a_runtime_sized_buffer() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let buf_struct = b.structure(
        "Buf",
        vec![
            b.struct_member("count", b.ty_u32(), vec![]),
            b.struct_member("data", b.ty_runtime_array(b.ty_f32()), vec![]),
        ],
    );
    b.global(b.variable(
        "buf",
        VariableKind::Var {
            storage_class: Some(StorageClass::Storage),
            access: Some(Access::ReadWrite),
        },
        Some(b.ty_named("Buf")),
        None,
        vec![b.group(0), b.binding(0)],
    ));
    let gid_x = || b.member(b.ident("gid"), "x");
    let body = vec![
        b.decl(b.let_(
            "n",
            None,
            Some(b.call(
                "arrayLength",
                vec![b.addr_of(b.member(b.ident("buf"), "data"))],
            )),
        )),
        b.if_(
            b.binary(BinaryOp::LessThan, gid_x(), b.ident("n")),
            vec![b.assign(
                b.index(b.member(b.ident("buf"), "data"), gid_x()),
                b.lit_float(1.0),
            )],
            None,
        ),
    ];
    let main = b.func(
        "main",
        vec![b.param(
            "gid",
            b.ty_vec(3, b.ty_u32()),
            vec![b.builtin(BuiltinValue::GlobalInvocationId)],
        )],
        None,
        body,
        vec![
            b.stage(PipelineStage::Compute),
            b.workgroup_size(b.lit_int(8), Some(b.lit_int(2)), None),
        ],
    );
    let module = b.finish();

    let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
    let st = program.struct_type(buf_struct).unwrap();
    assert!(st.is_used_in(StorageClass::Storage));
    let offsets: Vec<u32> = st.members.iter().map(|m| m.offset).collect();
    assert_eq!(offsets, vec![0, 4]);
    assert!(matches!(
        program.types().kind(st.members[1].ty),
        TypeKind::Array {
            count: ArrayCount::Runtime,
            ..
        }
    ));

    let sizes: Vec<Option<u32>> = program
        .function(main)
        .unwrap()
        .workgroup_size
        .iter()
        .map(|d| d.value)
        .collect();
    assert_eq!(sizes, vec![Some(8), Some(2), Some(1)]);
}

#[test]
fn workgroup_size_from_an_override() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let wg = b.global(b.override_("wg", Some(b.ty_u32()), Some(b.lit_u32(64)), vec![]));
    let main = b.func(
        "main",
        vec![],
        None,
        vec![],
        vec![
            b.stage(PipelineStage::Compute),
            b.workgroup_size(b.ident("wg"), None, None),
        ],
    );
    let module = b.finish();

    let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
    let wg = program.graph().variable_for(wg).unwrap();
    let x = program.function(main).unwrap().workgroup_size[0];
    assert_eq!(x.override_var, Some(wg));
    assert_eq!(x.value, Some(64));
}

#[test]
fn unknown_identifiers_are_reported_before_resolution() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.func(
        "f",
        vec![],
        None,
        vec![b.decl(b.let_("x", None, Some(b.ident("nope"))))],
        vec![],
    );
    let module = b.finish();

    let error = resolve(&module, &interner, &ResolverOptions::default()).unwrap_err();
    assert_eq!(error.error_messages(), vec!["unknown identifier: 'nope'"]);
}

#[test]
fn cyclic_declarations_are_rejected() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.global(b.const_("a", None, Some(b.ident("b"))));
    b.global(b.const_("b", None, Some(b.ident("a"))));
    let module = b.finish();

    let error = resolve(&module, &interner, &ResolverOptions::default()).unwrap_err();
    let messages = error.error_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("cyclic dependency found: "));
}

#[test]
fn unreachable_code_warns_when_enabled() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.func(
        "f",
        vec![],
        None,
        vec![b.return_(), b.decl(b.var("x", None, Some(b.lit_int(1))))],
        vec![],
    );
    let module = b.finish();

    let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
    let warnings: Vec<&str> = program.warnings().iter().map(|d| d.message.as_str()).collect();
    assert_eq!(warnings, vec!["code is unreachable"]);

    let quiet = ResolverOptions::new().with_unreachable_warnings(false);
    let program = resolve(&module, &interner, &quiet).unwrap();
    assert!(program.warnings().is_empty());
}
