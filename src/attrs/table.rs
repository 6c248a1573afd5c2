//! The static attribute table, ported field-for-field from
//! `init_attributes()` in `examples/original_source/iopc/iopc-parser.c`.

use std::collections::HashMap;

use super::{ArgDescriptor, ArgTokenKind, AttrDescriptor, FieldKindMask, RepeatMask, TargetMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrId {
    Ctype,
    NoWarn,
    Prefix,
    Strict,
    Min,
    Max,
    MinLength,
    MaxLength,
    Length,
    MinOccurs,
    MaxOccurs,
    Cdata,
    NonEmpty,
    NonZero,
    Pattern,
    Private,
    Alias,
    NoReorder,
    Allow,
    Disallow,
    Generic,
    Deprecated,
    SnmpParamsFrom,
    SnmpParam,
    SnmpIndex,
    TypescriptNoCollection,
}

/// Process-wide registry, built once (spec.md §4.3 "Populated once at
/// startup from a static table"). Kept as an owned struct rather than a
/// global so a caller can hold several independent compilations (§5).
pub struct AttrRegistry {
    by_name: HashMap<&'static str, AttrDescriptor>,
}

fn arg(name: &'static str, kind: ArgTokenKind) -> ArgDescriptor {
    ArgDescriptor { name, kind }
}

impl AttrRegistry {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();

        let mut add = |id: AttrId,
                        name: &'static str,
                        targets: TargetMask,
                        field_kinds: FieldKindMask,
                        repeats: RepeatMask,
                        applies_to_decl: bool,
                        applies_to_field: bool,
                        allows_repetition: bool,
                        is_constraint: bool,
                        args: Vec<ArgDescriptor>| {
            by_name.insert(
                name,
                AttrDescriptor {
                    id,
                    name,
                    targets,
                    field_kinds,
                    repeats,
                    applies_to_decl,
                    applies_to_field,
                    allows_repetition,
                    is_constraint,
                    args,
                },
            );
        };

        add(
            AttrId::Ctype,
            "ctype",
            TargetMask::STRUCT | TargetMask::UNION | TargetMask::ENUM,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            true,
            false,
            vec![arg("type", ArgTokenKind::Ident)],
        );
        add(
            AttrId::NoWarn,
            "nowarn",
            TargetMask::ALL,
            FieldKindMask::ALL,
            RepeatMask::ALL,
            true,
            true,
            true,
            false,
            vec![arg("value", ArgTokenKind::Ident)],
        );
        add(
            AttrId::Prefix,
            "prefix",
            TargetMask::ENUM,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            false,
            false,
            vec![arg("name", ArgTokenKind::Ident)],
        );
        add(
            AttrId::Strict,
            "strict",
            TargetMask::ENUM,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            false,
            true,
            vec![],
        );
        add(
            AttrId::Min,
            "min",
            TargetMask(0),
            FieldKindMask::INT | FieldKindMask::DOUBLE,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Double)],
        );
        add(
            AttrId::Max,
            "max",
            TargetMask(0),
            FieldKindMask::INT | FieldKindMask::DOUBLE,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Double)],
        );
        add(
            AttrId::MinLength,
            "minLength",
            TargetMask(0),
            FieldKindMask::STRING | FieldKindMask::DATA,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Integer)],
        );
        add(
            AttrId::MaxLength,
            "maxLength",
            TargetMask(0),
            FieldKindMask::STRING | FieldKindMask::DATA,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Integer)],
        );
        add(
            AttrId::Length,
            "length",
            TargetMask(0),
            FieldKindMask::STRING | FieldKindMask::DATA,
            RepeatMask::ALL,
            false,
            true,
            false,
            true,
            vec![arg("value", ArgTokenKind::Integer)],
        );
        add(
            AttrId::MinOccurs,
            "minOccurs",
            TargetMask(0),
            FieldKindMask::ALL,
            RepeatMask::REPEATED,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Integer)],
        );
        add(
            AttrId::MaxOccurs,
            "maxOccurs",
            TargetMask(0),
            FieldKindMask::ALL,
            RepeatMask::REPEATED,
            false,
            true,
            true,
            true,
            vec![arg("value", ArgTokenKind::Integer)],
        );
        add(
            AttrId::Cdata,
            "cdata",
            TargetMask(0),
            FieldKindMask::STRING,
            RepeatMask::ALL,
            false,
            true,
            false,
            false,
            vec![],
        );
        add(
            AttrId::NonEmpty,
            "nonEmpty",
            TargetMask(0),
            FieldKindMask::STRING | FieldKindMask::DATA | FieldKindMask::XML,
            RepeatMask::ALL,
            false,
            true,
            false,
            true,
            vec![],
        );
        add(
            AttrId::NonZero,
            "nonZero",
            TargetMask(0),
            FieldKindMask::INT | FieldKindMask::DOUBLE,
            RepeatMask::ALL,
            false,
            true,
            false,
            true,
            vec![],
        );
        add(
            AttrId::Pattern,
            "pattern",
            TargetMask(0),
            FieldKindMask::STRING,
            RepeatMask::ALL,
            false,
            true,
            false,
            true,
            vec![arg("value", ArgTokenKind::Str)],
        );
        add(
            AttrId::Private,
            "private",
            TargetMask::ALL,
            FieldKindMask::ALL,
            RepeatMask::ALL_BUT_REQUIRED,
            true,
            true,
            false,
            false,
            vec![],
        );
        add(
            AttrId::Alias,
            "alias",
            TargetMask::RPC,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            true,
            false,
            vec![arg("name", ArgTokenKind::Ident)],
        );
        add(
            AttrId::NoReorder,
            "noReorder",
            TargetMask::STRUCT,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            false,
            false,
            vec![],
        );
        add(
            AttrId::Allow,
            "allow",
            TargetMask::UNION | TargetMask::ENUM,
            FieldKindMask::ALL,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("field", ArgTokenKind::Ident)],
        );
        add(
            AttrId::Disallow,
            "disallow",
            TargetMask::UNION | TargetMask::ENUM,
            FieldKindMask::ALL,
            RepeatMask::ALL,
            false,
            true,
            true,
            true,
            vec![arg("field", ArgTokenKind::Ident)],
        );
        add(
            AttrId::Generic,
            "generic",
            TargetMask::ALL,
            FieldKindMask::ALL,
            RepeatMask::ALL,
            true,
            true,
            true,
            false,
            vec![arg("", ArgTokenKind::Str)],
        );
        add(
            AttrId::Deprecated,
            "deprecated",
            TargetMask::ALL | TargetMask::SNMP_IFACE | TargetMask::SNMP_OBJ | TargetMask::SNMP_TBL,
            FieldKindMask::ALL,
            RepeatMask(0),
            true,
            true,
            false,
            false,
            vec![],
        );
        add(
            AttrId::SnmpParamsFrom,
            "snmpParamsFrom",
            TargetMask::SNMP_IFACE,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            true,
            false,
            vec![arg("param", ArgTokenKind::Ident)],
        );
        add(
            AttrId::SnmpParam,
            "snmpParam",
            TargetMask::SNMP_OBJ,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            false,
            false,
            vec![],
        );
        add(
            AttrId::SnmpIndex,
            "snmpIndex",
            TargetMask::ALL,
            FieldKindMask::ALL,
            RepeatMask::ALL,
            false,
            true,
            false,
            false,
            vec![],
        );
        add(
            AttrId::TypescriptNoCollection,
            "typescriptNoCollection",
            TargetMask::STRUCT | TargetMask::UNION,
            FieldKindMask(0),
            RepeatMask(0),
            true,
            false,
            false,
            false,
            vec![],
        );

        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&AttrDescriptor> {
        self.by_name.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &AttrDescriptor> {
        self.by_name.values()
    }
}

impl Default for AttrRegistry {
    fn default() -> Self {
        Self::new()
    }
}
