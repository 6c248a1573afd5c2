//! End-to-end scenarios driving the public `compile_file`/`build_from_iop_value`
//! entry points against in-memory sources (spec.md §8), plus a package-loader
//! test that exercises real multi-file `include_dirs` resolution on disk.

use std::fs;

use iopc_core::ast::{FieldKind, ResolvedTarget};
use iopc_core::error::IopError;
use iopc_core::reflect::TypeTable;
use iopc_core::{build_from_iop_value, compile_file, CompileOptions, Diagnostics, PackageRegistry};
use rstest::rstest;

fn compile(sources: &[(&str, &str)], target: &str) -> Result<PackageRegistry, IopError> {
    let mut options = CompileOptions::new();
    for (name, text) in sources {
        options = options.with_source(*name, *text);
    }
    let mut registry = PackageRegistry::new();
    let mut diags = Diagnostics::new();
    compile_file(target, &mut registry, &options, &mut diags)?;
    Ok(registry)
}

#[rstest]
#[case::minimal_struct("package p; struct Point { int x; int y; };", true)]
#[case::empty_union_rejected("package p; union U { };", false)]
#[case::unresolved_type_rejected("package p; struct S { Missing m; };", false)]
#[case::duplicate_class_id_rejected(
    "package p; class A : 1 { int x; }; class B : 2 : A { int y; }; class C : 2 : A { int z; };",
    false
)]
#[case::enum_values_fold_through_folder("package p; enum Color { RED, GREEN = 1 << 3, BLUE };", true)]
fn source_compiles_or_fails_as_expected(#[case] source: &str, #[case] expect_ok: bool) {
    let result = compile(&[("p", source)], "p");
    assert_eq!(result.is_ok(), expect_ok, "unexpected result for: {source}");
}

#[test]
fn class_hierarchy_spans_dependency_and_main_packages() {
    let dep = "package acme.base; class Root : 1 { int id; };";
    let main = "package acme.widgets; class Widget : 1 : acme.base.Root { string name; };";
    let registry = compile(&[("acme.base", dep), ("acme.widgets", main)], "acme.widgets").unwrap();

    let main_pkg = registry.find_by_name("acme.widgets").unwrap();
    let pkg = registry.get(main_pkg);
    let (_, widget) = pkg.find_composite("Widget").unwrap();
    assert!(widget.resolved_parent().is_some());
}

#[test]
fn class_id_reuse_across_independent_hierarchies_is_allowed() {
    let source = "package p; class A : 1 { int x; }; class B : 1 { int y; };";
    assert!(compile(&[("p", source)], "p").is_ok());
}

#[test]
fn enum_without_prefix_gets_default_prefix_end_to_end() {
    let registry = compile(
        &[("p", "package p; enum HttpStatusCode { OK, NOT_FOUND };")],
        "p",
    )
    .unwrap();
    let pkg = registry.get(registry.find_by_name("p").unwrap());
    let (_, en) = pkg.find_enum("HttpStatusCode").unwrap();
    assert_eq!(en.prefix.as_deref(), Some("HTTP_STATUS_CODE"));
}

#[test]
fn snmp_object_chain_must_reach_intersec_root() {
    let ok = "package p; snmpObj Intersec : 1 { }; snmpObj Leaf : 2 : Intersec { int value; };";
    assert!(compile(&[("p", ok)], "p").is_ok());

    let bad = "package p; snmpObj Other : 1 { }; snmpObj Leaf : 2 : Other { int value; };";
    let err = compile(&[("p", bad)], "p").unwrap_err();
    assert!(matches!(err, IopError::Inheritance(..)));
}

#[test]
fn package_loader_resolves_imports_from_include_dirs_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("acme")).unwrap();
    fs::write(dir.path().join("acme/base.iop"), "package acme.base; struct Base { int id; };").unwrap();
    fs::write(
        dir.path().join("main.iop"),
        "package main; struct Wrapper { acme.base.Base inner; };",
    )
    .unwrap();

    let options = CompileOptions::new().with_base_dir(dir.path());
    let mut registry = PackageRegistry::new();
    let mut diags = Diagnostics::new();
    let id = compile_file("main", &mut registry, &options, &mut diags).unwrap();

    let pkg = registry.get(id);
    let (_, wrapper) = pkg.find_composite("Wrapper").unwrap();
    assert_eq!(wrapper.fields[0].kind, FieldKind::Struct);
}

#[test]
fn reflective_builder_interoperates_with_parsed_packages() {
    let base = "package acme.base; struct Base { int id; };";
    let options = CompileOptions::new().with_source("acme.base", base);
    let mut registry = PackageRegistry::new();
    let mut diags = Diagnostics::new();
    compile_file("acme.base", &mut registry, &options, &mut diags).unwrap();

    let value = serde_json::json!({
        "name": "acme.widgets",
        "elems": [
            {"struct": {"name": "Wrapper", "fields": [
                {"name": "inner", "type": "acme.base.Base"}
            ]}}
        ]
    });
    let table = TypeTable::new();
    let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();

    let pkg = registry.get(id);
    let (_, wrapper) = pkg.find_composite("Wrapper").unwrap();
    assert!(matches!(wrapper.fields[0].resolved, Some(ResolvedTarget::Composite(_))));
}
