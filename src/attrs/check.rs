//! Attribute application checks (spec.md §4.3 "Validation"), grounded on
//! the `check_attr_compat`/`iopc_attrs_check` family in
//! `examples/original_source/iopc/iopc-parser.c`: every `@name(...)` found
//! while parsing is checked against the static [`AttrRegistry`] entry for
//! its target kind, field kind, repeat kind, and repetition, plus a
//! handful of per-attribute postconditions that the registry's masks alone
//! cannot express.

use crate::ast::field::{Field, FieldKind, RepeatKind};
use crate::error::IopError;

use super::{AttrId, AttrInstance, AttrRegistry, AttrTarget, FieldKindMask, RepeatMask};

fn field_kind_mask(kind: FieldKind) -> FieldKindMask {
    match kind {
        FieldKind::I8
        | FieldKind::U8
        | FieldKind::I16
        | FieldKind::U16
        | FieldKind::I32
        | FieldKind::U32
        | FieldKind::I64
        | FieldKind::U64 => FieldKindMask::INT,
        FieldKind::Bool => FieldKindMask::BOOL,
        FieldKind::Double => FieldKindMask::DOUBLE,
        FieldKind::String => FieldKindMask::STRING,
        FieldKind::Bytes => FieldKindMask::DATA,
        FieldKind::Xml => FieldKindMask::XML,
        FieldKind::Void => FieldKindMask::VOID,
        FieldKind::Enum => FieldKindMask::ENUM,
        FieldKind::Struct => FieldKindMask::STRUCT,
        FieldKind::Union => FieldKindMask::UNION,
    }
}

fn repeat_mask(repeat: RepeatKind) -> RepeatMask {
    match repeat {
        RepeatKind::Required => RepeatMask::REQUIRED,
        RepeatKind::RequiredWithDefault => RepeatMask::DEFVAL,
        RepeatKind::Optional => RepeatMask::OPTIONAL,
        RepeatKind::Repeated => RepeatMask::REPEATED,
    }
}

/// Validates every attribute attached to a declaration (struct/union/class/
/// enum/interface/rpc/snmp-*), checking only the target mask — field-kind
/// and repeat masks don't apply to declaration-level attributes.
pub fn check_decl_attrs(attrs: &[AttrInstance], target: AttrTarget, registry: &AttrRegistry) -> Result<(), IopError> {
    let mut seen = std::collections::HashSet::new();
    for attr in attrs {
        let Some(name) = attr_name(attr) else { continue };
        let Some(desc) = registry.lookup(&name) else {
            return Err(IopError::Attribute(attr.loc.clone(), format!("unknown attribute `@{name}`")));
        };
        if !desc.applies_to_decl {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` cannot be applied to a declaration"),
            ));
        }
        if !desc.targets.contains(target.mask_pub()) {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` cannot be applied to a {target}"),
            ));
        }
        if !desc.allows_repetition && !seen.insert(name.clone()) {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` cannot be repeated on the same declaration"),
            ));
        }
    }
    Ok(())
}

/// Validates every attribute attached to a field against its kind and
/// repeat-kind masks.
pub fn check_field_attrs(field: &Field, registry: &AttrRegistry) -> Result<(), IopError> {
    let kind_mask = field_kind_mask(field.kind);
    let rep_mask = repeat_mask(field.repeat);
    let mut seen = std::collections::HashSet::new();

    for attr in &field.attrs {
        let Some(name) = attr_name(attr) else { continue };
        let Some(desc) = registry.lookup(&name) else {
            return Err(IopError::Attribute(attr.loc.clone(), format!("unknown attribute `@{name}`")));
        };
        if !desc.applies_to_field {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` cannot be applied to a field"),
            ));
        }
        if desc.field_kinds.bits() != 0 && !desc.field_kinds.intersects(kind_mask) {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` does not apply to field `{}`'s type", field.name),
            ));
        }
        if desc.repeats.bits() != 0 && !desc.repeats.intersects(rep_mask) {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` does not apply to field `{}`'s repeat kind", field.name),
            ));
        }
        if !desc.allows_repetition && !seen.insert(name.clone()) {
            return Err(IopError::Attribute(
                attr.loc.clone(),
                format!("`@{name}` cannot be repeated on the same field"),
            ));
        }
    }

    check_ctype_postcondition(field)?;
    check_allow_disallow_exclusive(field)?;
    Ok(())
}

fn attr_name(attr: &AttrInstance) -> Option<String> {
    if let Some(generic) = &attr.generic_name {
        return Some(generic.clone());
    }
    Some(registry_name(attr.id))
}

fn registry_name(id: AttrId) -> String {
    // Mirrors the descriptor's own `name` field; kept as a second lookup
    // path so callers constructing an `AttrInstance` without a registry in
    // scope (e.g. the reflective builder) can still format error text.
    match id {
        AttrId::Ctype => "ctype",
        AttrId::NoWarn => "nowarn",
        AttrId::Prefix => "prefix",
        AttrId::Strict => "strict",
        AttrId::Min => "min",
        AttrId::Max => "max",
        AttrId::MinLength => "minLength",
        AttrId::MaxLength => "maxLength",
        AttrId::Length => "length",
        AttrId::MinOccurs => "minOccurs",
        AttrId::MaxOccurs => "maxOccurs",
        AttrId::Cdata => "cdata",
        AttrId::NonEmpty => "nonEmpty",
        AttrId::NonZero => "nonZero",
        AttrId::Pattern => "pattern",
        AttrId::Private => "private",
        AttrId::Alias => "alias",
        AttrId::NoReorder => "noReorder",
        AttrId::Allow => "allow",
        AttrId::Disallow => "disallow",
        AttrId::Generic => "generic",
        AttrId::Deprecated => "deprecated",
        AttrId::SnmpParamsFrom => "snmpParamsFrom",
        AttrId::SnmpParam => "snmpParam",
        AttrId::SnmpIndex => "snmpIndex",
        AttrId::TypescriptNoCollection => "typescriptNoCollection",
    }
    .to_string()
}

/// `@ctype` must name a type ending in `__t`, the convention the generated
/// C code relies on.
fn check_ctype_postcondition(field: &Field) -> Result<(), IopError> {
    for attr in &field.attrs {
        if attr.id == AttrId::Ctype {
            if let Some(super::ArgValue::Ident(name) | super::ArgValue::Str(name)) = attr.args.first() {
                if !name.ends_with("__t") {
                    return Err(IopError::Attribute(
                        attr.loc.clone(),
                        format!("`@ctype` argument `{name}` must end in `__t`"),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// `@allow`/`@disallow` are mutually exclusive on the same field (spec.md
/// §16 "Features Recovered").
fn check_allow_disallow_exclusive(field: &Field) -> Result<(), IopError> {
    let has_allow = field.attrs.iter().any(|a| a.id == AttrId::Allow);
    let has_disallow = field.attrs.iter().any(|a| a.id == AttrId::Disallow);
    if has_allow && has_disallow {
        return Err(IopError::Attribute(
            field.loc.clone(),
            format!("field `{}` cannot carry both `@allow` and `@disallow`", field.name),
        ));
    }
    Ok(())
}

impl AttrTarget {
    fn mask_pub(self) -> super::TargetMask {
        match self {
            AttrTarget::Struct => super::TargetMask::STRUCT,
            AttrTarget::Union => super::TargetMask::UNION,
            AttrTarget::Class => super::TargetMask::CLASS,
            AttrTarget::Enum => super::TargetMask::ENUM,
            AttrTarget::Interface => super::TargetMask::INTERFACE,
            AttrTarget::Rpc => super::TargetMask::RPC,
            AttrTarget::SnmpIface => super::TargetMask::SNMP_IFACE,
            AttrTarget::SnmpObj => super::TargetMask::SNMP_OBJ,
            AttrTarget::SnmpTbl => super::TargetMask::SNMP_TBL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::field::Field;
    use crate::attrs::ArgValue;
    use crate::loc::SourceLoc;

    fn field() -> Field {
        Field::new("count", 1, FieldKind::I32, RepeatKind::Required, SourceLoc::synthetic())
    }

    #[test]
    fn min_on_int_field_is_accepted() {
        let registry = AttrRegistry::new();
        let mut f = field();
        f.attrs.push(AttrInstance {
            id: AttrId::Min,
            generic_name: None,
            args: vec![ArgValue::F64(0.0)],
            loc: SourceLoc::synthetic(),
        });
        assert!(check_field_attrs(&f, &registry).is_ok());
    }

    #[test]
    fn min_length_on_int_field_is_rejected() {
        let registry = AttrRegistry::new();
        let mut f = field();
        f.attrs.push(AttrInstance {
            id: AttrId::MinLength,
            generic_name: None,
            args: vec![ArgValue::I64(1)],
            loc: SourceLoc::synthetic(),
        });
        assert!(check_field_attrs(&f, &registry).is_err());
    }

    #[test]
    fn ctype_requires_t_suffix() {
        let registry = AttrRegistry::new();
        let mut f = field();
        f.kind = FieldKind::Struct;
        f.attrs.push(AttrInstance {
            id: AttrId::Ctype,
            generic_name: None,
            args: vec![ArgValue::Ident("my_struct".to_string())],
            loc: SourceLoc::synthetic(),
        });
        // ctype is a decl-level attribute; exercising the postcondition
        // directly here rather than through check_field_attrs.
        assert!(check_ctype_postcondition(&f).is_err());
        let _ = registry;
    }

    #[test]
    fn allow_and_disallow_together_is_rejected() {
        let mut f = field();
        f.attrs.push(AttrInstance {
            id: AttrId::Allow,
            generic_name: None,
            args: vec![ArgValue::Ident("a".to_string())],
            loc: SourceLoc::synthetic(),
        });
        f.attrs.push(AttrInstance {
            id: AttrId::Disallow,
            generic_name: None,
            args: vec![ArgValue::Ident("b".to_string())],
            loc: SourceLoc::synthetic(),
        });
        assert!(check_allow_disallow_exclusive(&f).is_err());
    }
}
