//! Reflective schema builder (spec.md §4.8): a second entry point into the
//! same resolver, for callers that already hold a package description as a
//! value rather than `.iop` source text — the "schema-of-schemas" path.
//!
//! The value shape mirrors spec.md §3 directly: a package is
//! `{"name": "pkg.sub", "elems": [...]}`, where each element is one of
//! `{"struct": {...}}`, `{"union": {...}}`, `{"class": {...}}`,
//! `{"enum": {...}}` or `{"typedef": {...}}`. A composite is
//! `{"name", "fields": [...], "abstract"?, "local"?, "classId"?, "parent"?}`
//! and a field is `{"name", "tag"?, "type", "optional"?, "repeated"?,
//! "isReference"?, "static"?}`. A `type` is either a builtin/dotted-name
//! string or `{"type_id": N}` / `{"array_of": <type>}`.
//!
//! Interfaces, modules and SNMP interfaces have no counterpart here: the
//! reflective path exists to construct data schemas at runtime (the common
//! case for a schema-of-schemas caller), not RPC surfaces, and attempting to
//! describe one is rejected as a malformed element.
//!
//! The builder allocates its transient AST directly into the caller's
//! `PackageRegistry` slot, the same way [`crate::loader::load_package`]
//! does, then hands off to [`crate::resolver::resolve`] for every
//! cross-reference and invariant check (spec.md §4.7): this module only
//! ever constructs, never validates.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::ast::{
    Composite, Enum, EnumId, EnumValue, Field, FieldKind, Package, PackageId, PendingOrResolvedParent,
    PendingTypeRef, RepeatKind, ResolvedTarget, StructKind, Typedef, TypeId,
};
use crate::attrs::AttrId;
use crate::diagnostics::Diagnostics;
use crate::error::IopError;
use crate::loader::package_path_to_filename;
use crate::loc::SourceLoc;
use crate::options::CompileOptions;
use crate::parser::builtin_kind;
use crate::registry::PackageRegistry;
use crate::resolver;

/// Caller-supplied bidirectional map from opaque `type_id`s (as they appear
/// in a schema value) to the fully qualified type they denote — either
/// already registered in the live environment, or constructed by a previous
/// [`build_from_iop_value`] call (spec.md §4.8 "type table").
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: HashMap<u64, ResolvedTarget>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_composite(&mut self, id: u64, type_id: TypeId) {
        self.entries.insert(id, ResolvedTarget::Composite(type_id));
    }

    pub fn register_enum(&mut self, id: u64, enum_id: EnumId) {
        self.entries.insert(id, ResolvedTarget::Enum(enum_id));
    }

    pub fn resolve(&self, id: u64) -> Option<ResolvedTarget> {
        self.entries.get(&id).copied()
    }
}

fn bad_shape(msg: impl Into<String>) -> IopError {
    IopError::UnexpectedToken(SourceLoc::synthetic(), msg.into())
}

fn as_obj(value: &Value) -> Result<&Map<String, Value>, IopError> {
    value.as_object().ok_or_else(|| bad_shape("expected a JSON object"))
}

fn split_dotted(dotted: &str) -> Result<(Vec<String>, String), IopError> {
    let mut parts: Vec<String> = dotted.split('.').map(str::to_string).collect();
    let name = parts.pop().ok_or_else(|| bad_shape("empty type name"))?;
    Ok((parts, name))
}

enum TypeSpec {
    Builtin(FieldKind),
    Named { package_path: Vec<String>, name: String },
    Opaque(ResolvedTarget),
    ArrayOf(Box<TypeSpec>),
}

fn parse_type(value: &Value, type_table: &TypeTable) -> Result<TypeSpec, IopError> {
    match value {
        Value::String(s) => {
            if let Some(kind) = builtin_kind(s) {
                Ok(TypeSpec::Builtin(kind))
            } else {
                let (package_path, name) = split_dotted(s)?;
                Ok(TypeSpec::Named { package_path, name })
            }
        }
        Value::Object(map) => {
            if let Some(id) = map.get("type_id").and_then(Value::as_u64) {
                let target = type_table
                    .resolve(id)
                    .ok_or_else(|| bad_shape(format!("unknown type id {id}")))?;
                Ok(TypeSpec::Opaque(target))
            } else if let Some(inner) = map.get("array_of") {
                Ok(TypeSpec::ArrayOf(Box::new(parse_type(inner, type_table)?)))
            } else {
                Err(bad_shape("a type object must be `type_id` or `array_of`"))
            }
        }
        _ => Err(bad_shape("expected a type name string or a type object")),
    }
}

/// Lowers a [`TypeSpec`] into the `(kind, pending, resolved, forced_repeat)`
/// shape the parser itself leaves on a [`Field`]/[`Typedef`], so pass 1 of
/// the resolver sees exactly the same ambiguity it would from source text.
fn lower_type_spec(
    spec: TypeSpec,
    registry: &PackageRegistry,
) -> (FieldKind, Option<PendingTypeRef>, Option<ResolvedTarget>, Option<RepeatKind>) {
    match spec {
        TypeSpec::Builtin(kind) => (kind, None, None, None),
        TypeSpec::Named { package_path, name } => {
            (FieldKind::Struct, Some(PendingTypeRef { package_path, name }), None, None)
        }
        TypeSpec::Opaque(ResolvedTarget::Enum(id)) => (FieldKind::Enum, None, Some(ResolvedTarget::Enum(id)), None),
        TypeSpec::Opaque(ResolvedTarget::Composite(id)) => {
            let kind = if registry.get(id.package).composites[id.index].kind == StructKind::Union {
                FieldKind::Union
            } else {
                FieldKind::Struct
            };
            (kind, None, Some(ResolvedTarget::Composite(id)), None)
        }
        TypeSpec::ArrayOf(inner) => {
            let (kind, pending, resolved, _) = lower_type_spec(*inner, registry);
            (kind, pending, resolved, Some(RepeatKind::Repeated))
        }
    }
}

fn build_field(
    value: &Value,
    type_table: &TypeTable,
    registry: &PackageRegistry,
    next_tag: &mut u16,
) -> Result<Field, IopError> {
    let obj = as_obj(value)?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_shape("field missing `name`"))?
        .to_string();
    let type_value = obj
        .get("type")
        .ok_or_else(|| bad_shape(format!("field `{name}` missing `type`")))?;
    let spec = parse_type(type_value, type_table)?;

    let tag = match obj.get("tag").and_then(Value::as_u64) {
        Some(v) => u16::try_from(v).map_err(|_| bad_shape(format!("tag {v} out of range")))?,
        None => *next_tag,
    };
    *next_tag = tag + 1;

    let mut repeat = if obj.get("optional").and_then(Value::as_bool).unwrap_or(false) {
        RepeatKind::Optional
    } else {
        RepeatKind::Required
    };
    if obj.get("repeated").and_then(Value::as_bool).unwrap_or(false) {
        repeat = RepeatKind::Repeated;
    }

    let (kind, pending_type, resolved, forced_repeat) = lower_type_spec(spec, registry);
    if let Some(r) = forced_repeat {
        repeat = r;
    }

    let mut field = Field::new(name, tag, kind, repeat, SourceLoc::synthetic());
    field.is_reference = obj.get("isReference").and_then(Value::as_bool).unwrap_or(false);
    field.is_static = obj.get("static").and_then(Value::as_bool).unwrap_or(false);
    field.pending_type = pending_type;
    field.resolved = resolved;
    Ok(field)
}

fn build_composite(
    kind: StructKind,
    obj: &Map<String, Value>,
    type_table: &TypeTable,
    registry: &PackageRegistry,
) -> Result<Composite, IopError> {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_shape("composite missing `name`"))?
        .to_string();
    let mut composite = Composite::new(name.clone(), kind, SourceLoc::synthetic());
    composite.is_abstract = obj.get("abstract").and_then(Value::as_bool).unwrap_or(false);
    composite.is_local = obj.get("local").and_then(Value::as_bool).unwrap_or(false);
    composite.is_snmp_root = name == "Intersec";

    if let Some(id) = obj.get("classId").and_then(Value::as_u64) {
        composite.class_id = Some(u16::try_from(id).map_err(|_| bad_shape(format!("class id {id} out of range")))?);
    }
    if let Some(parent_name) = obj.get("parent").and_then(Value::as_str) {
        let (package_path, name) = split_dotted(parent_name)?;
        composite.parent = Some(PendingOrResolvedParent::Pending { package_path, name });
    }

    let mut next_tag: u16 = 1;
    if let Some(fields) = obj.get("fields").and_then(Value::as_array) {
        for field_value in fields {
            let field = build_field(field_value, type_table, registry, &mut next_tag)?;
            if field.is_static {
                composite.static_fields.push(field);
            } else {
                composite.fields.push(field);
            }
        }
    }

    if kind == StructKind::Union && composite.fields.is_empty() && composite.static_fields.is_empty() {
        return Err(IopError::Constraint(
            composite.loc.clone(),
            format!("union `{name}` must declare at least one field"),
        ));
    }
    if kind == StructKind::SnmpTbl && !composite.all_fields().any(|f| f.attrs.iter().any(|a| a.id == AttrId::SnmpIndex)) {
        return Err(IopError::Constraint(
            composite.loc.clone(),
            format!("SNMP table `{name}` must declare at least one @snmpIndex field"),
        ));
    }

    Ok(composite)
}

fn build_enum(obj: &Map<String, Value>) -> Result<Enum, IopError> {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_shape("enum missing `name`"))?
        .to_string();
    let mut en = Enum::new(name, SourceLoc::synthetic());

    let mut next_value: i64 = 0;
    if let Some(values) = obj.get("values").and_then(Value::as_array) {
        for value in values {
            let vobj = as_obj(value)?;
            let vname = vobj
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| bad_shape("enum value missing `name`"))?
                .to_string();
            let v = vobj.get("value").and_then(Value::as_i64).unwrap_or(next_value);
            next_value = v + 1;
            en.values.push(EnumValue {
                name: vname,
                value: v,
                attrs: Vec::new(),
                aliases: Vec::new(),
                brief: None,
                loc: SourceLoc::synthetic(),
            });
        }
    }
    Ok(en)
}

fn build_typedef(obj: &Map<String, Value>, type_table: &TypeTable, registry: &PackageRegistry) -> Result<Typedef, IopError> {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_shape("typedef missing `name`"))?
        .to_string();
    let type_value = obj
        .get("type")
        .ok_or_else(|| bad_shape(format!("typedef `{name}` missing `type`")))?;
    let spec = parse_type(type_value, type_table)?;
    let (kind, pending_type, resolved, _) = lower_type_spec(spec, registry);
    Ok(Typedef {
        name,
        kind,
        pending_type,
        resolved,
        loc: SourceLoc::synthetic(),
    })
}

fn builtin_name(kind: FieldKind) -> Option<&'static str> {
    Some(match kind {
        FieldKind::I8 => "byte",
        FieldKind::U8 => "ubyte",
        FieldKind::I16 => "short",
        FieldKind::U16 => "ushort",
        FieldKind::I32 => "int",
        FieldKind::U32 => "uint",
        FieldKind::I64 => "long",
        FieldKind::U64 => "ulong",
        FieldKind::Bool => "bool",
        FieldKind::Double => "double",
        FieldKind::String => "string",
        FieldKind::Bytes => "bytes",
        FieldKind::Xml => "xml",
        FieldKind::Void => "void",
        FieldKind::Struct | FieldKind::Union | FieldKind::Enum => return None,
    })
}

fn dotted_type_name(registry: &PackageRegistry, current: PackageId, target: ResolvedTarget) -> String {
    let (pkg_id, name) = match target {
        ResolvedTarget::Composite(id) => (id.package, registry.get(id.package).composites[id.index].name.clone()),
        ResolvedTarget::Enum(id) => (id.package, registry.get(id.package).enums[id.index].name.clone()),
    };
    if pkg_id == current {
        name
    } else {
        format!("{}.{}", registry.get(pkg_id).dotted_name(), name)
    }
}

fn dump_type(registry: &PackageRegistry, current: PackageId, field: &Field) -> Value {
    if let Some(name) = builtin_name(field.kind) {
        return Value::String(name.to_string());
    }
    match field.resolved {
        Some(target) => Value::String(dotted_type_name(registry, current, target)),
        None => Value::String(field.pending_type.as_ref().map(|p| p.name.clone()).unwrap_or_default()),
    }
}

fn dump_field(registry: &PackageRegistry, current: PackageId, field: &Field) -> Value {
    let mut obj = Map::new();
    obj.insert("name".into(), Value::String(field.name.clone()));
    obj.insert("tag".into(), Value::from(field.tag));
    obj.insert("type".into(), dump_type(registry, current, field));
    obj.insert("optional".into(), Value::Bool(field.repeat.is_optional()));
    obj.insert("repeated".into(), Value::Bool(field.repeat.is_repeated()));
    obj.insert("isReference".into(), Value::Bool(field.is_reference));
    obj.insert("static".into(), Value::Bool(field.is_static));
    Value::Object(obj)
}

/// Re-serializes a resolved package back into the same value shape
/// [`build_from_iop_value`] accepts, supporting the round-trip property of
/// spec.md §8 ("building from a dump of an already-compiled package
/// succeeds and reproduces the same shape").
pub fn dump_package(registry: &PackageRegistry, id: PackageId) -> Value {
    let pkg = registry.get(id);
    let mut elems = Vec::new();

    for composite in &pkg.composites {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(composite.name.clone()));
        obj.insert(
            "fields".into(),
            Value::Array(composite.all_fields().map(|f| dump_field(registry, id, f)).collect()),
        );
        if let Some(class_id) = composite.class_id {
            obj.insert("classId".into(), Value::from(class_id));
        }
        if let Some(parent) = composite.resolved_parent() {
            obj.insert(
                "parent".into(),
                Value::String(dotted_type_name(registry, id, ResolvedTarget::Composite(parent))),
            );
        }
        let key = match composite.kind {
            StructKind::Struct => "struct",
            StructKind::Union => "union",
            StructKind::Class | StructKind::SnmpObj | StructKind::SnmpTbl => "class",
        };
        let mut elem = Map::new();
        elem.insert(key.into(), Value::Object(obj));
        elems.push(Value::Object(elem));
    }

    for en in &pkg.enums {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(en.name.clone()));
        obj.insert(
            "values".into(),
            Value::Array(
                en.values
                    .iter()
                    .map(|v| {
                        let mut vobj = Map::new();
                        vobj.insert("name".into(), Value::String(v.name.clone()));
                        vobj.insert("value".into(), Value::from(v.value));
                        Value::Object(vobj)
                    })
                    .collect(),
            ),
        );
        let mut elem = Map::new();
        elem.insert("enum".into(), Value::Object(obj));
        elems.push(Value::Object(elem));
    }

    for td in &pkg.typedefs {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(td.name.clone()));
        let type_value = if let Some(name) = builtin_name(td.kind) {
            Value::String(name.to_string())
        } else {
            match td.resolved {
                Some(target) => Value::String(dotted_type_name(registry, id, target)),
                None => Value::String(td.pending_type.as_ref().map(|p| p.name.clone()).unwrap_or_default()),
            }
        };
        obj.insert("type".into(), type_value);
        let mut elem = Map::new();
        elem.insert("typedef".into(), Value::Object(obj));
        elems.push(Value::Object(elem));
    }

    let mut root = Map::new();
    root.insert("name".into(), Value::String(pkg.dotted_name()));
    root.insert("elems".into(), Value::Array(elems));
    Value::Object(root)
}

/// Builds a package from its schema-of-schemas value, registers it, and
/// runs it through the resolver exactly as [`crate::loader::load_package`]
/// followed by [`resolver::resolve`] would for a parsed `.iop` file.
///
/// Returns the new package's id on success. Failure returns an `IopError`
/// describing either a malformed value or a semantic error the resolver
/// caught; in both cases `Display` on the error gives a diagnostic string.
pub fn build_from_iop_value(
    value: &Value,
    type_table: &TypeTable,
    registry: &mut PackageRegistry,
    options: &CompileOptions,
    diags: &mut Diagnostics,
) -> Result<PackageId, IopError> {
    let obj = as_obj(value)?;
    let dotted = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_shape("schema missing `name`"))?;
    let name: Vec<String> = dotted.split('.').map(str::to_string).collect();
    let source_path = options.base_dir.join(package_path_to_filename(&name));

    let id = registry.insert(Package::new(name.clone(), source_path.clone()));
    let mut package = Package::new(name, source_path);
    package.is_main = false;

    if let Some(elems) = obj.get("elems").and_then(Value::as_array) {
        for elem in elems {
            let elem_obj = as_obj(elem)?;
            if let Some(v) = elem_obj.get("struct") {
                package
                    .composites
                    .push(build_composite(StructKind::Struct, as_obj(v)?, type_table, registry)?);
            } else if let Some(v) = elem_obj.get("union") {
                package
                    .composites
                    .push(build_composite(StructKind::Union, as_obj(v)?, type_table, registry)?);
            } else if let Some(v) = elem_obj.get("class") {
                package
                    .composites
                    .push(build_composite(StructKind::Class, as_obj(v)?, type_table, registry)?);
            } else if let Some(v) = elem_obj.get("enum") {
                package.enums.push(build_enum(as_obj(v)?)?);
            } else if let Some(v) = elem_obj.get("typedef") {
                package.typedefs.push(build_typedef(as_obj(v)?, type_table, registry)?);
            } else {
                return Err(bad_shape(
                    "elem must be one of `struct`, `union`, `class`, `enum` or `typedef`",
                ));
            }
        }
    }

    *registry.get_mut(id) = package;
    resolver::resolve(registry, options, diags)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with_options() -> (PackageRegistry, CompileOptions, Diagnostics) {
        (PackageRegistry::new(), CompileOptions::new(), Diagnostics::new())
    }

    #[test]
    fn builds_plain_struct_with_auto_tags() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"struct": {"name": "Point", "fields": [
                    {"name": "x", "type": "int"},
                    {"name": "y", "type": "int"}
                ]}}
            ]
        });
        let table = TypeTable::new();
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();
        let pkg = registry.get(id);
        assert_eq!(pkg.composites.len(), 1);
        assert_eq!(pkg.composites[0].fields[0].tag, 1);
        assert_eq!(pkg.composites[0].fields[1].tag, 2);
    }

    #[test]
    fn resolves_named_reference_within_same_value() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"struct": {"name": "Point", "fields": [
                    {"name": "x", "type": "int"},
                    {"name": "y", "type": "int"}
                ]}},
                {"struct": {"name": "Line", "fields": [
                    {"name": "from", "type": "Point"},
                    {"name": "to", "type": "Point"}
                ]}}
            ]
        });
        let table = TypeTable::new();
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();
        let pkg = registry.get(id);
        let line = &pkg.composites[1];
        assert!(matches!(
            line.fields[0].resolved,
            Some(ResolvedTarget::Composite(_))
        ));
    }

    #[test]
    fn opaque_type_id_resolves_through_type_table() {
        let (mut registry, options, mut diags) = registry_with_options();
        let base = json!({
            "name": "acme.base",
            "elems": [
                {"enum": {"name": "Color", "values": [{"name": "RED"}, {"name": "GREEN"}]}}
            ]
        });
        let mut table = TypeTable::new();
        let base_id = build_from_iop_value(&base, &table, &mut registry, &options, &mut diags).unwrap();
        let color_enum_id = EnumId {
            package: base_id,
            index: 0,
        };
        table.register_enum(42, color_enum_id);

        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"struct": {"name": "Tagged", "fields": [
                    {"name": "color", "type": {"type_id": 42}}
                ]}}
            ]
        });
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();
        let pkg = registry.get(id);
        assert_eq!(pkg.composites[0].fields[0].kind, FieldKind::Enum);
        assert_eq!(
            pkg.composites[0].fields[0].resolved,
            Some(ResolvedTarget::Enum(color_enum_id))
        );
    }

    #[test]
    fn array_of_type_marks_field_repeated() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"struct": {"name": "Bag", "fields": [
                    {"name": "values", "type": {"array_of": "int"}}
                ]}}
            ]
        });
        let table = TypeTable::new();
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();
        let pkg = registry.get(id);
        assert_eq!(pkg.composites[0].fields[0].repeat, RepeatKind::Repeated);
    }

    #[test]
    fn empty_union_is_rejected() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"union": {"name": "Empty", "fields": []}}
            ]
        });
        let table = TypeTable::new();
        let err = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap_err();
        assert!(matches!(err, IopError::Constraint(..)));
    }

    #[test]
    fn unknown_type_id_is_reported() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.widgets",
            "elems": [
                {"struct": {"name": "Tagged", "fields": [
                    {"name": "x", "type": {"type_id": 7}}
                ]}}
            ]
        });
        let table = TypeTable::new();
        let err = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap_err();
        assert!(matches!(err, IopError::UnexpectedToken(..)));
    }

    #[test]
    fn dump_then_rebuild_round_trips_tags_and_references() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.geo",
            "elems": [
                {"struct": {"name": "Point", "fields": [
                    {"name": "x", "type": "int"},
                    {"name": "y", "type": "int"}
                ]}},
                {"struct": {"name": "Line", "fields": [
                    {"name": "from", "type": "Point"},
                    {"name": "to", "type": "Point"}
                ]}}
            ]
        });
        let table = TypeTable::new();
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();

        let dumped = dump_package(&registry, id);
        let mut registry2 = PackageRegistry::new();
        let mut diags2 = Diagnostics::new();
        let id2 = build_from_iop_value(&dumped, &table, &mut registry2, &options, &mut diags2).unwrap();

        let original = registry.get(id);
        let rebuilt = registry2.get(id2);
        assert_eq!(original.composites.len(), rebuilt.composites.len());
        for (a, b) in original.composites.iter().zip(rebuilt.composites.iter()) {
            assert_eq!(a.name, b.name);
            for (fa, fb) in a.fields.iter().zip(b.fields.iter()) {
                assert_eq!(fa.name, fb.name);
                assert_eq!(fa.tag, fb.tag);
            }
        }
    }

    #[test]
    fn dump_package_snapshot() {
        let (mut registry, options, mut diags) = registry_with_options();
        let value = json!({
            "name": "acme.geo",
            "elems": [
                {"struct": {"name": "Point", "fields": [
                    {"name": "x", "type": "int"},
                    {"name": "y", "type": "int"}
                ]}},
                {"enum": {"name": "Color", "values": [{"name": "RED"}, {"name": "GREEN"}]}}
            ]
        });
        let table = TypeTable::new();
        let id = build_from_iop_value(&value, &table, &mut registry, &options, &mut diags).unwrap();
        let dumped = dump_package(&registry, id);
        insta::assert_yaml_snapshot!(dumped);
    }
}
