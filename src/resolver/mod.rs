//! Two-pass semantic resolver (spec.md §4.7): the parser leaves every
//! cross-reference as a `(package_path, name)` pair and every composite-ref
//! field pinned to the ambiguous `FieldKind::Struct` placeholder. Pass 1
//! links each of those to a concrete id and re-validates the attributes
//! that depend on the now-known kind; pass 2 derives values that only make
//! sense once every reference in the registry resolves (field order, enum
//! prefixes, the ambiguous-identifier bookkeeping of spec.md §9).
//!
//! Runs once over every package already sitting in the registry, since a
//! qualified reference parsed in one package may point into another one
//! loaded to satisfy it (spec.md §4.6) and both must already exist before
//! either can be linked.

use std::collections::{HashMap, HashSet};

use crate::ast::field::Field;
use crate::ast::{
    EnumId, FieldKind, InterfaceId, Package, PackageId, PendingOrResolvedParent, Payload,
    ResolvedTarget, Rpc, RepeatKind, SnmpInterfaceId, SnmpParent, StructKind, TypeId,
};
use crate::attrs::check::check_field_attrs;
use crate::attrs::{AttrId, AttrInstance, ArgValue};
use crate::diagnostics::Diagnostics;
use crate::error::IopError;
use crate::loc::SourceLoc;
use crate::options::CompileOptions;
use crate::registry::{EnumIdentSite, PackageRegistry};

/// Runs both passes over every package currently loaded into `registry`.
pub fn resolve(registry: &mut PackageRegistry, options: &CompileOptions, diags: &mut Diagnostics) -> Result<(), IopError> {
    let packages: Vec<PackageId> = registry.iter().map(|(id, _)| id).collect();

    for &pkg in &packages {
        link_package(registry, pkg)?;
    }
    check_class_hierarchies(registry, options)?;
    check_snmp_object_roots(registry)?;

    for &pkg in &packages {
        fold_package(registry, pkg, diags);
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Pass 1: link
// ---------------------------------------------------------------------

enum TypeLookup {
    Composite(TypeId, StructKind),
    Enum(EnumId),
}

fn resolve_type_path(
    registry: &PackageRegistry,
    current: PackageId,
    path: &[String],
    name: &str,
    loc: &SourceLoc,
) -> Result<TypeLookup, IopError> {
    let pkg_id = target_package(registry, current, path, loc)?;
    let pkg = registry.get(pkg_id);
    if let Some((idx, composite)) = pkg.find_composite(name) {
        return Ok(TypeLookup::Composite(TypeId { package: pkg_id, index: idx }, composite.kind));
    }
    if let Some((idx, _)) = pkg.find_enum(name) {
        return Ok(TypeLookup::Enum(EnumId { package: pkg_id, index: idx }));
    }
    Err(IopError::UnresolvedType(
        loc.clone(),
        format!("type `{name}` not found in package `{}`", pkg.dotted_name()),
    ))
}

fn resolve_interface_path(
    registry: &PackageRegistry,
    current: PackageId,
    path: &[String],
    name: &str,
    loc: &SourceLoc,
) -> Result<InterfaceId, IopError> {
    let pkg_id = target_package(registry, current, path, loc)?;
    let pkg = registry.get(pkg_id);
    pkg.find_interface(name)
        .map(|(idx, _)| InterfaceId { package: pkg_id, index: idx })
        .ok_or_else(|| {
            IopError::UnresolvedType(loc.clone(), format!("interface `{name}` not found in package `{}`", pkg.dotted_name()))
        })
}

fn resolve_snmp_path(
    registry: &PackageRegistry,
    current: PackageId,
    path: &[String],
    name: &str,
    loc: &SourceLoc,
) -> Result<SnmpInterfaceId, IopError> {
    let pkg_id = target_package(registry, current, path, loc)?;
    let pkg = registry.get(pkg_id);
    pkg.find_snmp_interface(name)
        .map(|(idx, _)| SnmpInterfaceId { package: pkg_id, index: idx })
        .ok_or_else(|| {
            IopError::UnresolvedType(loc.clone(), format!("snmpIface `{name}` not found in package `{}`", pkg.dotted_name()))
        })
}

fn target_package(registry: &PackageRegistry, current: PackageId, path: &[String], loc: &SourceLoc) -> Result<PackageId, IopError> {
    if path.is_empty() {
        return Ok(current);
    }
    let dotted = path.join(".");
    registry
        .find_by_name(&dotted)
        .ok_or_else(|| IopError::UnresolvedImport(loc.clone(), format!("package `{dotted}` is not loaded")))
}

fn link_package(registry: &mut PackageRegistry, pkg: PackageId) -> Result<(), IopError> {
    let composite_count = registry.get(pkg).composites.len();
    for ci in 0..composite_count {
        link_composite_fields(registry, pkg, ci)?;
        link_composite_parent(registry, pkg, ci)?;
    }

    let typedef_count = registry.get(pkg).typedefs.len();
    for ti in 0..typedef_count {
        link_typedef(registry, pkg, ti)?;
    }

    let interface_count = registry.get(pkg).interfaces.len();
    for ii in 0..interface_count {
        let rpc_count = registry.get(pkg).interfaces[ii].rpcs.len();
        for ri in 0..rpc_count {
            link_rpc_payloads(registry, pkg, IfaceKind::Plain(ii), ri)?;
        }
    }

    let snmp_count = registry.get(pkg).snmp_interfaces.len();
    for si in 0..snmp_count {
        link_snmp_parent(registry, pkg, si)?;
        let rpc_count = registry.get(pkg).snmp_interfaces[si].rpcs.len();
        for ri in 0..rpc_count {
            link_rpc_payloads(registry, pkg, IfaceKind::Snmp(si), ri)?;
        }
    }

    let module_count = registry.get(pkg).modules.len();
    for mi in 0..module_count {
        let field_count = registry.get(pkg).modules[mi].fields.len();
        for fi in 0..field_count {
            link_module_field(registry, pkg, mi, fi)?;
        }
    }

    Ok(())
}

/// Resolves one field's pending type reference (if any) and re-validates
/// its attributes now that the true kind (struct vs. union vs. enum) is
/// known. `field_at` is re-invoked three times on disjoint borrows of
/// `registry`, never held across a lookup.
fn link_field(registry: &mut PackageRegistry, pkg: PackageId, field_at: impl Fn(&mut Package) -> &mut Field) -> Result<(), IopError> {
    let (pending, loc) = {
        let field = field_at(registry.get_mut(pkg));
        match field.pending_type.clone() {
            Some(p) => (p, field.loc.clone()),
            None => return Ok(()),
        }
    };

    let lookup = resolve_type_path(registry, pkg, &pending.package_path, &pending.name, &loc)?;

    {
        let field = field_at(registry.get_mut(pkg));
        match lookup {
            TypeLookup::Composite(id, kind) => {
                field.kind = if kind == StructKind::Union { FieldKind::Union } else { FieldKind::Struct };
                field.resolved = Some(ResolvedTarget::Composite(id));
            }
            TypeLookup::Enum(id) => {
                field.kind = FieldKind::Enum;
                field.resolved = Some(ResolvedTarget::Enum(id));
            }
        }
    }

    let snapshot = field_at(registry.get_mut(pkg)).clone();
    check_field_attrs(&snapshot, &registry.attrs)
}

fn link_composite_fields(registry: &mut PackageRegistry, pkg: PackageId, ci: usize) -> Result<(), IopError> {
    let n = registry.get(pkg).composites[ci].fields.len();
    for fi in 0..n {
        link_field(registry, pkg, move |p| &mut p.composites[ci].fields[fi])?;
    }
    let n_static = registry.get(pkg).composites[ci].static_fields.len();
    for fi in 0..n_static {
        link_field(registry, pkg, move |p| &mut p.composites[ci].static_fields[fi])?;
    }
    Ok(())
}

fn link_composite_parent(registry: &mut PackageRegistry, pkg: PackageId, ci: usize) -> Result<(), IopError> {
    let pending = match &registry.get(pkg).composites[ci].parent {
        Some(PendingOrResolvedParent::Pending { package_path, name }) => Some((package_path.clone(), name.clone())),
        _ => None,
    };
    let Some((path, name)) = pending else { return Ok(()) };
    let loc = registry.get(pkg).composites[ci].loc.clone();

    let lookup = resolve_type_path(registry, pkg, &path, &name, &loc)?;
    let (target_id, target_kind) = match lookup {
        TypeLookup::Composite(id, kind) => (id, kind),
        TypeLookup::Enum(_) => {
            return Err(IopError::Inheritance(loc, format!("parent `{name}` is an enum, not a class-like composite")));
        }
    };
    if !target_kind.is_class_like() {
        return Err(IopError::Inheritance(loc, format!("parent `{name}` is not a class/SNMP composite")));
    }

    registry.get_mut(pkg).composites[ci].parent = Some(PendingOrResolvedParent::Resolved(target_id));
    Ok(())
}

fn link_typedef(registry: &mut PackageRegistry, pkg: PackageId, ti: usize) -> Result<(), IopError> {
    let pending = {
        let td = &registry.get(pkg).typedefs[ti];
        match td.pending_type.clone() {
            Some(p) => Some((p, td.loc.clone())),
            None => None,
        }
    };
    let Some((pending, loc)) = pending else { return Ok(()) };

    let lookup = resolve_type_path(registry, pkg, &pending.package_path, &pending.name, &loc)?;
    let td = &mut registry.get_mut(pkg).typedefs[ti];
    match lookup {
        TypeLookup::Composite(id, kind) => {
            td.kind = if kind == StructKind::Union { FieldKind::Union } else { FieldKind::Struct };
            td.resolved = Some(ResolvedTarget::Composite(id));
        }
        TypeLookup::Enum(id) => {
            td.kind = FieldKind::Enum;
            td.resolved = Some(ResolvedTarget::Enum(id));
        }
    }
    Ok(())
}

fn link_snmp_parent(registry: &mut PackageRegistry, pkg: PackageId, si: usize) -> Result<(), IopError> {
    let pending = match &registry.get(pkg).snmp_interfaces[si].parent {
        SnmpParent::Pending { package_path, name } => Some((package_path.clone(), name.clone())),
        SnmpParent::Resolved(_) => None,
    };
    let Some((path, name)) = pending else { return Ok(()) };
    let loc = registry.get(pkg).snmp_interfaces[si].loc.clone();

    let id = resolve_snmp_path(registry, pkg, &path, &name, &loc)?;
    registry.get_mut(pkg).snmp_interfaces[si].parent = SnmpParent::Resolved(id);
    Ok(())
}

fn link_module_field(registry: &mut PackageRegistry, pkg: PackageId, mi: usize, fi: usize) -> Result<(), IopError> {
    let pending = {
        let field = &registry.get(pkg).modules[mi].fields[fi];
        if field.resolved.is_some() {
            None
        } else {
            Some((field.package_path.clone(), field.interface_name.clone(), field.loc.clone()))
        }
    };
    let Some((path, name, loc)) = pending else { return Ok(()) };

    let id = resolve_interface_path(registry, pkg, &path, &name, &loc)?;
    registry.get_mut(pkg).modules[mi].fields[fi].resolved = Some(id);
    Ok(())
}

#[derive(Clone, Copy)]
enum IfaceKind {
    Plain(usize),
    Snmp(usize),
}

#[derive(Clone, Copy)]
enum PayloadSlot {
    Args,
    Result,
    Exception,
}

fn rpc_ref(pkg: &Package, iface: IfaceKind, ri: usize) -> &Rpc {
    match iface {
        IfaceKind::Plain(ii) => &pkg.interfaces[ii].rpcs[ri],
        IfaceKind::Snmp(si) => &pkg.snmp_interfaces[si].rpcs[ri],
    }
}

fn rpc_mut(pkg: &mut Package, iface: IfaceKind, ri: usize) -> &mut Rpc {
    match iface {
        IfaceKind::Plain(ii) => &mut pkg.interfaces[ii].rpcs[ri],
        IfaceKind::Snmp(si) => &mut pkg.snmp_interfaces[si].rpcs[ri],
    }
}

fn payload_ref(rpc: &Rpc, slot: PayloadSlot) -> &Option<Payload> {
    match slot {
        PayloadSlot::Args => &rpc.args,
        PayloadSlot::Result => &rpc.result,
        PayloadSlot::Exception => &rpc.exception,
    }
}

fn payload_mut(rpc: &mut Rpc, slot: PayloadSlot) -> &mut Option<Payload> {
    match slot {
        PayloadSlot::Args => &mut rpc.args,
        PayloadSlot::Result => &mut rpc.result,
        PayloadSlot::Exception => &mut rpc.exception,
    }
}

fn link_rpc_payloads(registry: &mut PackageRegistry, pkg: PackageId, iface: IfaceKind, ri: usize) -> Result<(), IopError> {
    for slot in [PayloadSlot::Args, PayloadSlot::Result, PayloadSlot::Exception] {
        link_rpc_payload_slot(registry, pkg, iface, ri, slot)?;
    }
    Ok(())
}

fn link_rpc_payload_slot(registry: &mut PackageRegistry, pkg: PackageId, iface: IfaceKind, ri: usize, slot: PayloadSlot) -> Result<(), IopError> {
    let anon_field_count = {
        let rpc = rpc_ref(registry.get(pkg), iface, ri);
        match payload_ref(rpc, slot) {
            Some(Payload::Anonymous(c)) => Some(c.fields.len()),
            _ => None,
        }
    };
    if let Some(n) = anon_field_count {
        for fi in 0..n {
            link_field(registry, pkg, move |p| {
                let rpc = rpc_mut(p, iface, ri);
                match payload_mut(rpc, slot) {
                    Some(Payload::Anonymous(c)) => &mut c.fields[fi],
                    _ => unreachable!("payload shape checked before indexing"),
                }
            })?;
        }
        return Ok(());
    }

    let named = {
        let rpc = rpc_ref(registry.get(pkg), iface, ri);
        match payload_ref(rpc, slot) {
            Some(Payload::Named { package_path, name, resolved: None }) => Some((package_path.clone(), name.clone(), rpc.loc.clone())),
            _ => None,
        }
    };
    let Some((path, name, loc)) = named else { return Ok(()) };

    let lookup = resolve_type_path(registry, pkg, &path, &name, &loc)?;
    match lookup {
        TypeLookup::Composite(id, kind) if matches!(kind, StructKind::Struct | StructKind::Union) => {
            let rpc = rpc_mut(registry.get_mut(pkg), iface, ri);
            if let Some(Payload::Named { resolved, .. }) = payload_mut(rpc, slot) {
                *resolved = Some(id);
            }
            Ok(())
        }
        _ => Err(IopError::Constraint(loc, format!("RPC payload `{name}` must resolve to a struct or union"))),
    }
}

/// Verifies every class/SNMP-object/SNMP-table parent chain is acyclic and,
/// for composites declared in the main package, that class ids are unique
/// within their root hierarchy and fall inside `options`' configured range
/// (spec.md §3 invariants, §8 scenario 3).
fn check_class_hierarchies(registry: &PackageRegistry, options: &CompileOptions) -> Result<(), IopError> {
    let mut root_ids: HashMap<TypeId, HashSet<u16>> = HashMap::new();

    for (pkg_id, pkg) in registry.iter() {
        for (idx, composite) in pkg.composites.iter().enumerate() {
            if !composite.kind.is_class_like() {
                continue;
            }
            let self_id = TypeId { package: pkg_id, index: idx };
            let root = find_parent_root(registry, self_id, &composite.loc)?;

            if !pkg.is_main {
                continue;
            }
            let Some(class_id) = composite.class_id else { continue };
            if class_id < options.class_id_min || class_id > options.class_id_max {
                return Err(IopError::InvalidClassId(
                    composite.loc.clone(),
                    format!(
                        "class id {class_id} for `{}` is out of the configured range [{}..{}]",
                        composite.name, options.class_id_min, options.class_id_max
                    ),
                ));
            }
            let used = root_ids.entry(root).or_default();
            if !used.insert(class_id) {
                return Err(IopError::InvalidClassId(
                    composite.loc.clone(),
                    format!("class id {class_id} is already used within the hierarchy rooted at `{}`", composite.name),
                ));
            }
        }
    }
    Ok(())
}

fn find_parent_root(registry: &PackageRegistry, start: TypeId, loc: &SourceLoc) -> Result<TypeId, IopError> {
    let mut visiting = HashSet::new();
    let mut current = start;
    loop {
        if !visiting.insert(current) {
            return Err(IopError::Inheritance(loc.clone(), "cyclic class/SNMP parent chain".into()));
        }
        let composite = &registry.get(current.package).composites[current.index];
        match composite.resolved_parent() {
            Some(parent) => current = parent,
            None => return Ok(current),
        }
    }
}

/// Every SNMP object/table must chain up to the composite named `Intersec`
/// (spec.md §3 "a chain ends at the SNMP root 'Intersec'").
fn check_snmp_object_roots(registry: &PackageRegistry) -> Result<(), IopError> {
    for (pkg_id, pkg) in registry.iter() {
        for (idx, composite) in pkg.composites.iter().enumerate() {
            if !matches!(composite.kind, StructKind::SnmpObj | StructKind::SnmpTbl) {
                continue;
            }
            if composite.parent.is_none() && !composite.is_snmp_root {
                return Err(IopError::Inheritance(
                    composite.loc.clone(),
                    format!("SNMP composite `{}` requires a parent", composite.name),
                ));
            }
            let self_id = TypeId { package: pkg_id, index: idx };
            let root = find_parent_root(registry, self_id, &composite.loc)?;
            let root_composite = &registry.get(root.package).composites[root.index];
            if !root_composite.is_snmp_root {
                return Err(IopError::Inheritance(
                    composite.loc.clone(),
                    format!("SNMP composite `{}` does not chain up to the `Intersec` root", composite.name),
                ));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Pass 2: fold
// ---------------------------------------------------------------------

fn fold_package(registry: &mut PackageRegistry, pkg: PackageId, diags: &mut Diagnostics) {
    let composite_count = registry.get(pkg).composites.len();
    for ci in 0..composite_count {
        reorder_fields_if_needed(registry, pkg, ci);
        propagate_class_attrs(registry, pkg, ci);
    }

    let enum_count = registry.get(pkg).enums.len();
    for ei in 0..enum_count {
        fold_enum(registry, pkg, ei, diags);
    }
}

/// Required fields first, then required-with-default, then optional, then
/// repeated; `@noReorder` opts a composite out entirely (spec.md §4.7 pass
/// 2). Stable sort preserves declaration order within each bucket.
fn reorder_fields_if_needed(registry: &mut PackageRegistry, pkg: PackageId, ci: usize) {
    let composite = &mut registry.get_mut(pkg).composites[ci];
    if composite.attrs.iter().any(|a| a.id == AttrId::NoReorder) {
        return;
    }
    composite.fields.sort_by_key(field_order_key);
}

fn field_order_key(field: &Field) -> u8 {
    match field.repeat {
        RepeatKind::Required => 0,
        RepeatKind::RequiredWithDefault => 1,
        RepeatKind::Optional => 2,
        RepeatKind::Repeated => 3,
    }
}

/// Copies class-wide `@private`/`@deprecated` down onto every field that
/// doesn't already carry one of its own (spec.md §4.7 "propagate class-wide
/// attributes ... as documented per attribute").
fn propagate_class_attrs(registry: &mut PackageRegistry, pkg: PackageId, ci: usize) {
    const PROPAGATED: [AttrId; 2] = [AttrId::Private, AttrId::Deprecated];

    let to_copy: Vec<AttrInstance> = {
        let composite = &registry.get(pkg).composites[ci];
        composite.attrs.iter().filter(|a| PROPAGATED.contains(&a.id)).cloned().collect()
    };
    if to_copy.is_empty() {
        return;
    }

    let composite = &mut registry.get_mut(pkg).composites[ci];
    for field in composite.fields.iter_mut().chain(composite.static_fields.iter_mut()) {
        for attr in &to_copy {
            if !field.attrs.iter().any(|a| a.id == attr.id) {
                field.attrs.push(attr.clone());
            }
        }
    }
}

/// Computes the enum's canonical name prefix (`@prefix` argument if present,
/// else the camelCase-derived default) and records every value's folded
/// identifier in the registry's ambiguity map, warning (never erroring) on
/// collisions (spec.md §9 "Ambiguous enum identifiers").
fn fold_enum(registry: &mut PackageRegistry, pkg: PackageId, ei: usize, diags: &mut Diagnostics) {
    let explicit_prefix = {
        let en = &registry.get(pkg).enums[ei];
        en.attrs.iter().find(|a| a.id == AttrId::Prefix).and_then(|a| match a.args.first() {
            Some(ArgValue::Ident(s)) | Some(ArgValue::Str(s)) => Some(s.clone()),
            _ => None,
        })
    };

    let (prefix, values) = {
        let en = &mut registry.get_mut(pkg).enums[ei];
        let prefix = explicit_prefix.unwrap_or_else(|| crate::ast::default_prefix(&en.name));
        en.prefix = Some(prefix.clone());
        let values: Vec<(String, i64, SourceLoc)> = en.values.iter().map(|v| (v.name.clone(), v.value, v.loc.clone())).collect();
        (prefix, values)
    };

    let enum_id = EnumId { package: pkg, index: ei };
    for (name, value, loc) in values {
        let ident = format!("{prefix}_{name}");
        let conflicts = registry.record_enum_ident(ident.clone(), EnumIdentSite { enum_id, value });
        if !conflicts.is_empty() {
            diags.push_warning(loc, format!("enum identifier `{ident}` collides with an earlier value of a different value"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::parser;
    use std::path::PathBuf;

    fn resolve_src(name: &str, text: &str) -> Result<(PackageRegistry, Diagnostics), IopError> {
        let mut registry = PackageRegistry::new();
        let options = CompileOptions::new();
        let mut diags = Diagnostics::new();
        let pkg = parser::parse_source(
            vec![name.to_string()],
            PathBuf::from(format!("{name}.iop")),
            text,
            &mut registry,
            &options,
            &mut diags,
        )?;
        registry.get_mut(pkg).is_main = true;
        resolve(&mut registry, &options, &mut diags)?;
        Ok((registry, diags))
    }

    #[test]
    fn struct_field_resolves_to_composite() {
        let (registry, _) = resolve_src(
            "pkg",
            "package pkg; struct Inner { int a; }; struct Outer { Inner x; };",
        )
        .unwrap();
        let pkg = registry.get(PackageId(0));
        let (_, outer) = pkg.find_composite("Outer").unwrap();
        let field = &outer.fields[0];
        assert_eq!(field.kind, FieldKind::Struct);
        assert!(matches!(field.resolved, Some(ResolvedTarget::Composite(_))));
    }

    #[test]
    fn field_referencing_enum_is_reclassified() {
        let (registry, _) = resolve_src(
            "pkg",
            "package pkg; enum Color { RED, GREEN }; struct S { Color c; };",
        )
        .unwrap();
        let pkg = registry.get(PackageId(0));
        let (_, s) = pkg.find_composite("S").unwrap();
        assert_eq!(s.fields[0].kind, FieldKind::Enum);
        assert!(matches!(s.fields[0].resolved, Some(ResolvedTarget::Enum(_))));
    }

    #[test]
    fn class_hierarchy_resolves_parent() {
        let (registry, _) = resolve_src(
            "p",
            "package p; class A : 1 { int x; }; class B : 2 : A { int y; };",
        )
        .unwrap();
        let pkg = registry.get(PackageId(0));
        let (a_idx, _) = pkg.find_composite("A").unwrap();
        let (_, b) = pkg.find_composite("B").unwrap();
        assert_eq!(b.resolved_parent(), Some(TypeId { package: PackageId(0), index: a_idx }));
    }

    #[test]
    fn duplicate_class_id_in_hierarchy_is_rejected() {
        let err = resolve_src(
            "p",
            "package p; class A : 1 { int x; }; class B : 2 : A { int y; }; class C : 2 : A { int z; };",
        )
        .unwrap_err();
        assert!(matches!(err, IopError::InvalidClassId(..)));
    }

    #[test]
    fn class_id_outside_configured_range_is_rejected() {
        let mut registry = PackageRegistry::new();
        let options = CompileOptions::new().with_class_id_range(100, 200);
        let mut diags = Diagnostics::new();
        let pkg = parser::parse_source(
            vec!["p".to_string()],
            PathBuf::from("p.iop"),
            "package p; class A : 1 { int x; };",
            &mut registry,
            &options,
            &mut diags,
        )
        .unwrap();
        registry.get_mut(pkg).is_main = true;
        let err = resolve(&mut registry, &options, &mut diags).unwrap_err();
        assert!(matches!(err, IopError::InvalidClassId(..)));
    }

    #[test]
    fn unresolved_type_reference_is_reported() {
        let err = resolve_src("pkg", "package pkg; struct S { Missing m; };").unwrap_err();
        assert!(matches!(err, IopError::UnresolvedType(..)));
    }

    #[test]
    fn anonymous_rpc_payload_fields_resolve() {
        let (registry, _) = resolve_src(
            "pkg",
            "package pkg; struct Inner { int a; }; interface I { f in (Inner x) out void; };",
        )
        .unwrap();
        let pkg = registry.get(PackageId(0));
        let (_, iface) = pkg.find_interface("I").unwrap();
        let Some(Payload::Anonymous(args)) = &iface.rpcs[0].args else {
            panic!("expected an anonymous args payload");
        };
        assert!(matches!(args.fields[0].resolved, Some(ResolvedTarget::Composite(_))));
    }

    #[test]
    fn enum_without_prefix_attr_gets_default_prefix() {
        let (registry, _) = resolve_src("pkg", "package pkg; enum HttpStatusCode { OK, NOT_FOUND };").unwrap();
        let pkg = registry.get(PackageId(0));
        let (_, en) = pkg.find_enum("HttpStatusCode").unwrap();
        assert_eq!(en.prefix.as_deref(), Some("HTTP_STATUS_CODE"));
    }

    #[test]
    fn fields_are_reordered_required_before_optional() {
        let (registry, _) = resolve_src(
            "pkg",
            "package pkg; struct S { int? a; int b; };",
        )
        .unwrap();
        let pkg = registry.get(PackageId(0));
        let (_, s) = pkg.find_composite("S").unwrap();
        assert_eq!(s.fields[0].name, "b");
        assert_eq!(s.fields[1].name, "a");
    }
}
