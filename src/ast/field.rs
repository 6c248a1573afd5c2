//! Field shape shared by struct/union/class fields and typedefs (spec.md
//! §3 "Field" and "Typedef — reuses the Field shape with a dedicated flag").

use crate::attrs::AttrInstance;
use crate::loc::SourceLoc;

use super::ids::{EnumId, TypeId};

/// Scalar/aggregate kind of a field's declared type (spec.md §3 "Type
/// kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Bool,
    Double,
    String,
    Bytes,
    Xml,
    Void,
    Enum,
    /// Ambiguous until the resolver disambiguates STRUCT vs UNION by
    /// looking up the resolved target (spec.md §4.7 pass 1).
    Struct,
    Union,
}

impl FieldKind {
    pub fn is_int(self) -> bool {
        matches!(
            self,
            FieldKind::I8
                | FieldKind::U8
                | FieldKind::I16
                | FieldKind::U16
                | FieldKind::I32
                | FieldKind::U32
                | FieldKind::I64
                | FieldKind::U64
        )
    }

    pub fn is_composite_ref(self) -> bool {
        matches!(self, FieldKind::Struct | FieldKind::Union | FieldKind::Enum)
    }
}

/// spec.md §3 "Repeat kind".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    Required,
    Optional,
    Repeated,
    /// Required, but with a parsed default value.
    RequiredWithDefault,
}

impl RepeatKind {
    pub fn is_optional(self) -> bool {
        matches!(self, RepeatKind::Optional)
    }

    pub fn is_repeated(self) -> bool {
        matches!(self, RepeatKind::Repeated)
    }
}

/// spec.md §3 "Default value (tagged union over integer/double/string, with
/// signedness flag for integers)".
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i64, crate::token::Sign),
    Double(f64),
    String(String),
}

/// A pending, not-yet-resolved type reference: an optional dotted package
/// path plus the bare type name (spec.md §4.5 "Qualified type references").
#[derive(Debug, Clone, Default)]
pub struct PendingTypeRef {
    pub package_path: Vec<String>,
    pub name: String,
}

/// What a struct-or-enum-kinded field resolves to once the resolver has run
/// (spec.md §3 "resolved target (set by resolver)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget {
    Composite(TypeId),
    Enum(EnumId),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub tag: u16,
    pub kind: FieldKind,
    pub repeat: RepeatKind,
    /// `&` — by-reference required struct/union field.
    pub is_reference: bool,
    /// Class-level constant (only valid inside classes).
    pub is_static: bool,
    pub default: Option<DefaultValue>,
    pub pending_type: Option<PendingTypeRef>,
    pub resolved: Option<ResolvedTarget>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub details: Option<String>,
    /// Set when the field lives inside an SNMP table and is marked
    /// `@snmpIndex`.
    pub snmp_in_table: bool,
    /// Set by `@snmpParamsFrom` routing on the owning SNMP interface; see
    /// SPEC_FULL.md §16 for the (intentionally unvalidated) interaction
    /// with `snmp_in_table`.
    pub snmp_from_param: bool,
    pub loc: SourceLoc,
}

impl Field {
    pub fn new(name: impl Into<String>, tag: u16, kind: FieldKind, repeat: RepeatKind, loc: SourceLoc) -> Self {
        Self {
            name: name.into(),
            tag,
            kind,
            repeat,
            is_reference: false,
            is_static: false,
            default: None,
            pending_type: None,
            resolved: None,
            attrs: Vec::new(),
            brief: None,
            details: None,
            snmp_in_table: false,
            snmp_from_param: false,
            loc,
        }
    }
}

/// `typedef <type> Name;` (spec.md §3 "Typedef — reuses the Field shape
/// with a dedicated flag").
#[derive(Debug, Clone)]
pub struct Typedef {
    pub name: String,
    pub kind: FieldKind,
    pub pending_type: Option<PendingTypeRef>,
    pub resolved: Option<ResolvedTarget>,
    pub loc: SourceLoc,
}
