//! iopc-core: the leaf-first compiler core for the IOP interface-definition
//! language (spec.md §1 "Purpose & Scope") — recursive-descent parser,
//! two-pass semantic resolver and a reflective schema-of-schemas builder.
//!
//! Deliberately out of scope (spec.md §1 "Out of scope"): a driver CLI,
//! code emitters, the DSO builder, generic packers and test harnesses.
//! Those consume this crate; they are not part of it.

pub mod ast;
pub mod attrs;
pub mod diagnostics;
pub mod doxygen;
pub mod error;
pub mod folder;
pub mod keywords;
pub mod lexer;
pub mod loader;
pub mod loc;
pub mod options;
pub mod parser;
pub mod reflect;
pub mod registry;
pub mod resolver;
pub mod token;
pub mod token_buffer;

pub use ast::PackageId;
pub use diagnostics::Diagnostics;
pub use error::IopError;
pub use options::CompileOptions;
pub use registry::PackageRegistry;

/// Compiles the package at `dotted_name`, loading it (and anything it
/// transitively references) through `options`, then linking and folding it
/// with the resolver (spec.md §6 "External interfaces").
///
/// The directly-compiled package — as opposed to one loaded only to satisfy
/// a qualified type reference — is marked `is_main`, which is what scopes
/// class-id range/uniqueness checking to it (spec.md §3, §4.7).
pub fn compile_file(
    dotted_name: &str,
    registry: &mut PackageRegistry,
    options: &CompileOptions,
    diags: &mut diagnostics::Diagnostics,
) -> Result<PackageId, IopError> {
    let name: Vec<String> = dotted_name.split('.').map(str::to_string).collect();
    let entry_loc = loc::SourceLoc::synthetic();
    let id = loader::load_package(&name, registry, options, diags, &entry_loc)?;
    registry.get_mut(id).is_main = true;
    resolver::resolve(registry, options, diags)?;
    Ok(id)
}

/// Builds a package from an in-memory schema-of-schemas value rather than
/// `.iop` source text (spec.md §4.8), then resolves it the same way
/// [`compile_file`] resolves a parsed package.
///
/// Unlike `compile_file`, a reflectively built package is never the main
/// package: it is meant for constructing auxiliary or dependency schemas at
/// runtime, so class-id range/uniqueness enforcement does not apply to it.
pub fn build_from_iop_value(
    value: &serde_json::Value,
    type_table: &reflect::TypeTable,
    registry: &mut PackageRegistry,
    options: &CompileOptions,
    diags: &mut diagnostics::Diagnostics,
) -> Result<PackageId, IopError> {
    reflect::build_from_iop_value(value, type_table, registry, options, diags)
}
