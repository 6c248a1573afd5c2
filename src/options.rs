//! Compile-time configuration (spec.md §6 "Environment from caller").

use std::collections::HashMap;
use std::path::PathBuf;

/// Threaded through every pipeline stage, the way the teacher's
/// `processing_stages` option structs are threaded through tokenizer,
/// block-grouper and parser alike.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Inclusive lower bound for class/SNMP ids in the *main* package.
    pub class_id_min: u16,
    /// Inclusive upper bound for class/SNMP ids in the *main* package.
    pub class_id_max: u16,
    /// Include directories, searched in declaration order (§6).
    pub include_dirs: Vec<PathBuf>,
    /// Compilation base directory, used to resolve relative imports.
    pub base_dir: PathBuf,
    /// In-memory `package-name -> source-text` overrides, consulted before
    /// the filesystem (§6).
    pub sources: HashMap<String, String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            class_id_min: 0,
            class_id_max: 0xFFFF,
            include_dirs: Vec::new(),
            base_dir: PathBuf::from("."),
            sources: HashMap::new(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_id_range(mut self, min: u16, max: u16) -> Self {
        self.class_id_min = min;
        self.class_id_max = max;
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn with_source(mut self, package: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(package.into(), text.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }
}
