//! Stable arena indices for cross-package references (spec.md §9
//! "Cyclic graphs": "store cross-package references as (package-name,
//! type-name) pairs resolved to stable indices into the owning package's
//! type list"). This port models that with plain `usize`-backed index
//! newtypes rather than `Rc<RefCell<_>>`, the way an index-arena parser
//! would in idiomatic Rust.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// Refers to a composite (struct/union/class/SNMP object/SNMP table) inside
/// a specific package's `composites` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    pub package: PackageId,
    pub index: usize,
}

/// Refers to an `Enum` inside a specific package's `enums` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId {
    pub package: PackageId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId {
    pub package: PackageId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnmpInterfaceId {
    pub package: PackageId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub package: PackageId,
    pub index: usize,
}
