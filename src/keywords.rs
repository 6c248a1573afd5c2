//! Reserved-identifier tables.
//!
//! Ported from `reserved_keywords`/`avoid_keywords` in
//! `examples/original_source/iopc/iopc-parser.c`. The C source lists the
//! same word (`break`, `case`, `char`, `const`, `continue`, `default`, `do`,
//! `double`, `else`, `enum`, `float`, `for`, `goto`, `if`, `int`, `long`,
//! `return`, `short`, `static`, `switch`, `void`, `volatile`, `while`) once
//! under "C keywords" and again under "Java and C++ keywords"; spec.md's own
//! Open Question says to treat the set as deduplicated, so it lands in a
//! single `HashSet` here.

use std::collections::HashSet;
use std::sync::OnceLock;

fn reserved_words() -> &'static [&'static str] {
    &[
        // C keywords
        "auto", "bool", "break", "case", "char", "const", "continue", "default", "do", "double",
        "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
        "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
        "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
        // Java and C++ keywords
        "abstract", "assert", "boolean", "byte", "catch", "extends", "false", "final", "finally",
        "friend", "implements", "import", "instanceof", "interface", "mutable", "namespace",
        "native", "null", "operator", "package", "private", "protected", "public", "strictfp",
        "super", "synchronized", "template", "this", "throw", "throws", "transient", "true",
        "try", "typename", "virtual",
        // IOP language keywords
        "in", "out", "module",
    ]
}

/// `avoid_keywords` in the C source: "sadly already in use", gated behind
/// `@nowarn("keyword")` rather than hard-rejected.
fn avoid_words() -> &'static [&'static str] {
    &["class", "new", "delete", "explicit"]
}

fn reserved_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| reserved_words().iter().copied().collect())
}

fn avoid_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| avoid_words().iter().copied().collect())
}

/// True if `name` is a hard-reserved keyword (rejected unconditionally).
pub fn is_reserved(name: &str) -> bool {
    reserved_set().contains(name)
}

/// True if `name` is in the "avoid" list (warns unless `@nowarn("keyword")`
/// suppresses the warning on the owning field/declaration).
pub fn is_avoided(name: &str) -> bool {
    avoid_set().contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_both_lists_reachable() {
        assert!(is_reserved("int"));
        assert!(is_reserved("interface"));
        assert!(is_reserved("namespace"));
        assert!(!is_reserved("foo"));
    }

    #[test]
    fn avoid_list_is_separate_from_reserved() {
        assert!(is_avoided("class"));
        assert!(!is_reserved("class"));
    }
}
