//! The AST (spec.md §3 "AST Shape"): a `Package` owns arenas of composites,
//! enums, interfaces, modules and SNMP interfaces; cross-package and
//! cross-arena references are [`ids`] newtypes rather than `Rc<RefCell<_>>`.

pub mod composite;
pub mod enum_ty;
pub mod field;
pub mod ids;
pub mod interface;
pub mod snmp;

use std::collections::HashSet;
use std::path::PathBuf;

pub use composite::{Composite, PendingOrResolvedParent, StructKind};
pub use enum_ty::{default_prefix, Enum, EnumValue};
pub use field::{DefaultValue, Field, FieldKind, PendingTypeRef, RepeatKind, ResolvedTarget, Typedef};
pub use ids::{EnumId, InterfaceId, ModuleId, PackageId, SnmpInterfaceId, TypeId};
pub use interface::{Interface, Module, ModuleField, Payload, Rpc};
pub use snmp::{SnmpInterface, SnmpParent};

/// One compiled `.iop` file (spec.md §3 "Package"): a dotted name, the
/// source it was parsed from, and the arenas every other declaration in
/// the file is appended to in parse order. Index stability into these
/// arenas is what makes [`ids::TypeId`] etc. meaningful across packages.
#[derive(Debug, Clone)]
pub struct Package {
    /// Dotted path, e.g. `acme.widgets`.
    pub name: Vec<String>,
    pub source_path: PathBuf,
    pub composites: Vec<Composite>,
    pub enums: Vec<Enum>,
    pub interfaces: Vec<Interface>,
    pub snmp_interfaces: Vec<SnmpInterface>,
    pub modules: Vec<Module>,
    pub typedefs: Vec<Typedef>,
    /// Other packages this one references a type from, discovered lazily as
    /// qualified type paths are parsed (spec.md §3 "Weak dependency set");
    /// there is no explicit `import` statement in the grammar.
    pub imports: Vec<Vec<String>>,
    pub brief: Option<String>,
    /// True only for the package passed directly to `compile_file`, as
    /// opposed to one loaded to satisfy a qualified type reference
    /// (spec.md §4.5 "main" vs "dependency" package).
    pub is_main: bool,
}

impl Package {
    pub fn new(name: Vec<String>, source_path: PathBuf) -> Self {
        Self {
            name,
            source_path,
            composites: Vec::new(),
            enums: Vec::new(),
            interfaces: Vec::new(),
            snmp_interfaces: Vec::new(),
            modules: Vec::new(),
            typedefs: Vec::new(),
            imports: Vec::new(),
            brief: None,
            is_main: false,
        }
    }

    pub fn dotted_name(&self) -> String {
        self.name.join(".")
    }

    pub fn find_composite(&self, name: &str) -> Option<(usize, &Composite)> {
        self.composites.iter().enumerate().find(|(_, c)| c.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<(usize, &Enum)> {
        self.enums.iter().enumerate().find(|(_, e)| e.name == name)
    }

    pub fn find_interface(&self, name: &str) -> Option<(usize, &Interface)> {
        self.interfaces.iter().enumerate().find(|(_, i)| i.name == name)
    }

    pub fn find_snmp_interface(&self, name: &str) -> Option<(usize, &SnmpInterface)> {
        self.snmp_interfaces.iter().enumerate().find(|(_, i)| i.name == name)
    }

    /// All type names declared at top level, used by the loader to detect
    /// a name colliding with something already registered under a
    /// different package (spec.md §4.6).
    pub fn declared_names(&self) -> HashSet<&str> {
        let mut out = HashSet::new();
        out.extend(self.composites.iter().map(|c| c.name.as_str()));
        out.extend(self.enums.iter().map(|e| e.name.as_str()));
        out.extend(self.interfaces.iter().map(|i| i.name.as_str()));
        out.extend(self.snmp_interfaces.iter().map(|i| i.name.as_str()));
        out.extend(self.modules.iter().map(|m| m.name.as_str()));
        out
    }
}
