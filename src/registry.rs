//! The cross-package registry (spec.md §4.6 "Package loader"): a
//! dotted-name to [`Package`] map, plus the enum-value identifier map used
//! to detect ambiguous/forbidden C identifiers across enums (spec.md §9).

use std::collections::HashMap;

use crate::ast::{EnumId, Package, PackageId};
use crate::attrs::AttrRegistry;

/// Where one globally-visible enum-value identifier came from, for the
/// ambiguity warning of spec.md §9 ("two enums define the same folded
/// C identifier for different values").
#[derive(Debug, Clone)]
pub struct EnumIdentSite {
    pub enum_id: EnumId,
    pub value: i64,
}

#[derive(Default)]
pub struct PackageRegistry {
    packages: Vec<Package>,
    by_name: HashMap<String, PackageId>,
    /// Folded enum-value C identifier -> every site it was produced at.
    enum_idents: HashMap<String, Vec<EnumIdentSite>>,
    pub attrs: AttrRegistry,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self {
            packages: Vec::new(),
            by_name: HashMap::new(),
            enum_idents: HashMap::new(),
            attrs: AttrRegistry::new(),
        }
    }

    /// Inserts a package before its body is fully resolved, so a cyclic
    /// `import` can find it already present (spec.md §4.6 "insert
    /// immediately, to make cyclic imports safe").
    pub fn insert(&mut self, package: Package) -> PackageId {
        let dotted = package.dotted_name();
        let id = PackageId(self.packages.len());
        self.packages.push(package);
        self.by_name.insert(dotted, id);
        id
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    pub fn find_by_name(&self, dotted: &str) -> Option<PackageId> {
        self.by_name.get(dotted).copied()
    }

    pub fn contains(&self, dotted: &str) -> bool {
        self.by_name.contains_key(dotted)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages.iter().enumerate().map(|(i, p)| (PackageId(i), p))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Records that `ident` (a folded enum-value C identifier) was produced
    /// by `site`; returns the prior sites recorded under the same
    /// identifier with a *different* value, i.e. genuine ambiguity.
    pub fn record_enum_ident(&mut self, ident: String, site: EnumIdentSite) -> Vec<EnumIdentSite> {
        let entry = self.enum_idents.entry(ident).or_default();
        let conflicts: Vec<EnumIdentSite> = entry.iter().filter(|s| s.value != site.value).cloned().collect();
        entry.push(site);
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn insert_then_find_by_dotted_name() {
        let mut reg = PackageRegistry::new();
        let pkg = Package::new(vec!["acme".into(), "widgets".into()], PathBuf::from("widgets.iop"));
        let id = reg.insert(pkg);
        assert_eq!(reg.find_by_name("acme.widgets"), Some(id));
    }

    #[test]
    fn enum_ident_conflict_detected_on_distinct_values() {
        let mut reg = PackageRegistry::new();
        let pkg_id = PackageId(0);
        let conflicts = reg.record_enum_ident(
            "RED".to_string(),
            EnumIdentSite {
                enum_id: EnumId { package: pkg_id, index: 0 },
                value: 1,
            },
        );
        assert!(conflicts.is_empty());
        let conflicts = reg.record_enum_ident(
            "RED".to_string(),
            EnumIdentSite {
                enum_id: EnumId { package: pkg_id, index: 1 },
                value: 2,
            },
        );
        assert_eq!(conflicts.len(), 1);
    }
}
