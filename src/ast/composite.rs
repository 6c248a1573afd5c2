//! Struct/union/class/SNMP-object/SNMP-table — the five variants of a
//! composite type (spec.md §3).

use crate::attrs::AttrInstance;
use crate::loc::SourceLoc;

use super::field::Field;
use super::ids::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Union,
    Class,
    SnmpObj,
    SnmpTbl,
}

impl StructKind {
    pub fn is_class_like(self) -> bool {
        matches!(self, StructKind::Class | StructKind::SnmpObj | StructKind::SnmpTbl)
    }
}

#[derive(Debug, Clone)]
pub struct Composite {
    pub name: String,
    pub kind: StructKind,
    pub is_abstract: bool,
    /// Only meaningful for classes: a `@local` class cannot be used as the
    /// static type of a field outside its own package.
    pub is_local: bool,
    /// 16-bit id, for class/SNMP composites.
    pub class_id: Option<u16>,
    pub parent: Option<PendingOrResolvedParent>,
    pub is_snmp_root: bool,
    pub fields: Vec<Field>,
    /// Class-level (`static`) fields, kept separate per spec.md §3.
    pub static_fields: Vec<Field>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub details: Option<String>,
    pub loc: SourceLoc,
}

/// A class/SNMP parent reference: pending until the resolver links it.
#[derive(Debug, Clone)]
pub enum PendingOrResolvedParent {
    Pending { package_path: Vec<String>, name: String },
    Resolved(TypeId),
}

impl Composite {
    pub fn new(name: impl Into<String>, kind: StructKind, loc: SourceLoc) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            is_local: false,
            class_id: None,
            parent: None,
            is_snmp_root: false,
            fields: Vec::new(),
            static_fields: Vec::new(),
            attrs: Vec::new(),
            brief: None,
            details: None,
            loc,
        }
    }

    pub fn resolved_parent(&self) -> Option<TypeId> {
        match &self.parent {
            Some(PendingOrResolvedParent::Resolved(id)) => Some(*id),
            _ => None,
        }
    }

    /// All fields in declaration order including static ones, matching the
    /// wire layout static-before-instance invariant (spec.md §3).
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.static_fields.iter().chain(self.fields.iter())
    }
}
