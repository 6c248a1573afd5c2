//! Package loader (spec.md §4.6): locates `.iop` source text for a dotted
//! package path and hands it to the parser, inserting the resulting
//! [`Package`] into the registry before its body is resolved so cyclic
//! imports terminate rather than recursing forever.

use std::fs;
use std::path::PathBuf;

use crate::ast::PackageId;
use crate::diagnostics::Diagnostics;
use crate::error::IopError;
use crate::loc::SourceLoc;
use crate::options::CompileOptions;
use crate::parser::parse_source;
use crate::registry::PackageRegistry;

/// `pkg.sub.name` -> `pkg/sub/name.iop` (spec.md §4.6 "Package -> file
/// mapping").
pub fn package_path_to_filename(dotted: &[String]) -> PathBuf {
    let mut path = PathBuf::new();
    for (i, seg) in dotted.iter().enumerate() {
        if i + 1 == dotted.len() {
            path.push(format!("{seg}.iop"));
        } else {
            path.push(seg);
        }
    }
    path
}

/// Resolves source text for a dotted package path, trying the in-memory
/// buffer map, then the base directory, then each include directory in
/// order (spec.md §4.6).
fn resolve_source(dotted: &[String], options: &CompileOptions) -> Option<(String, PathBuf)> {
    let dotted_name = dotted.join(".");
    if let Some(text) = options.sources.get(&dotted_name) {
        let path = package_path_to_filename(dotted);
        return Some((text.clone(), path));
    }

    let rel = package_path_to_filename(dotted);
    let base_candidate = options.base_dir.join(&rel);
    if let Ok(text) = fs::read_to_string(&base_candidate) {
        return Some((text, base_candidate));
    }

    for dir in &options.include_dirs {
        let candidate = dir.join(&rel);
        if let Ok(text) = fs::read_to_string(&candidate) {
            return Some((text, candidate));
        }
    }

    None
}

/// Loads the package at `dotted`, recursively loading whatever it imports.
/// Already-registered packages (including ones still mid-parse, inserted
/// eagerly to break import cycles) are returned without reparsing.
pub fn load_package(
    dotted: &[String],
    registry: &mut PackageRegistry,
    options: &CompileOptions,
    diags: &mut Diagnostics,
    import_loc: &SourceLoc,
) -> Result<PackageId, IopError> {
    let dotted_name = dotted.join(".");
    if let Some(id) = registry.find_by_name(&dotted_name) {
        return Ok(id);
    }

    let Some((text, path)) = resolve_source(dotted, options) else {
        return Err(IopError::UnresolvedImport(
            import_loc.clone(),
            format!("cannot locate package `{dotted_name}`"),
        ));
    };

    diags.note(format!("loading package `{dotted_name}` from {}", path.display()));
    parse_source(dotted.to_vec(), path, &text, registry, options, diags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_path_mapping() {
        let dotted = vec!["acme".to_string(), "widgets".to_string(), "core".to_string()];
        assert_eq!(package_path_to_filename(&dotted), PathBuf::from("acme/widgets/core.iop"));
    }

    #[test]
    fn resolve_source_prefers_in_memory_buffer() {
        let options = CompileOptions::new().with_source("pkg", "package pkg;");
        let (text, _) = resolve_source(&["pkg".to_string()], &options).unwrap();
        assert_eq!(text, "package pkg;");
    }

    #[test]
    fn resolve_source_falls_back_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pkg.iop"), "package pkg;").unwrap();
        let options = CompileOptions::new().with_base_dir(dir.path());
        let (text, _) = resolve_source(&["pkg".to_string()], &options).unwrap();
        assert_eq!(text, "package pkg;");
    }
}
