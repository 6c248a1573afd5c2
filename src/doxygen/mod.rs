//! Doxygen comment pipeline (spec.md §4.4), ported from the
//! chunk-reading/merging logic in `read_dox`/`dox_chunk_merge`/
//! `build_dox_` in `examples/original_source/iopc/iopc-parser.c`, adapted
//! to operate over whole doc-comment bodies rather than the C lexer's
//! per-token incremental buffers.

use crate::error::IopError;
use crate::loc::SourceLoc;

mod json;
pub use json::reparse_example_json;

/// Parameter direction for `\param[dir] name` chunks (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDir {
    In,
    Out,
    Throw,
}

impl ParamDir {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(ParamDir::In),
            "out" => Some(ParamDir::Out),
            "throw" => Some(ParamDir::Throw),
            _ => None,
        }
    }
}

const KNOWN_KEYWORDS: &[&str] = &["brief", "details", "warning", "example", "param"];

/// One doxygen chunk: an optional keyword, an optional `param` direction
/// and argument name list, and ordered paragraph text (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct DoxChunk {
    pub keyword: Option<String>,
    pub direction: Option<ParamDir>,
    pub param_names: Vec<String>,
    pub paragraphs: Vec<String>,
    pub loc: SourceLoc,
    pub first_line: usize,
    pub last_line: usize,
}

impl DoxChunk {
    fn empty(loc: SourceLoc) -> Self {
        let line = loc.start.line;
        Self {
            keyword: None,
            direction: None,
            param_names: Vec::new(),
            paragraphs: Vec::new(),
            loc,
            first_line: line,
            last_line: line,
        }
    }

    fn push_line(&mut self, line: &str) {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(String::new());
        }
        let buf = self.paragraphs.last_mut().unwrap();
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(line.trim());
    }

    fn is_known(&self) -> bool {
        match &self.keyword {
            None => true,
            Some(k) => KNOWN_KEYWORDS.contains(&k.as_str()),
        }
    }
}

/// Splits one raw `/** ... */` body into chunks on `\keyword`/`@keyword`
/// markers, the way the lexer hands the parser one dox token whose content
/// the parser (here: this module) then splits and merges.
pub fn split_chunks(body: &str, loc: &SourceLoc) -> Vec<DoxChunk> {
    let mut chunks = Vec::new();
    let mut line_no = loc.start.line;

    for raw_line in body.lines() {
        let line = raw_line.trim_start_matches(['*', ' ', '\t']);
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix('\\').or_else(|| trimmed.strip_prefix('@')) {
            let (keyword, remainder) = split_word(rest);
            let mut chunk = DoxChunk::empty(loc.clone());
            chunk.first_line = line_no;
            chunk.last_line = line_no;

            if keyword == "param" {
                let (dir, after_dir) = parse_param_direction(remainder);
                chunk.direction = dir;
                let (names, after_names) = parse_param_names(after_dir);
                chunk.param_names = names;
                chunk.keyword = Some(keyword);
                if !after_names.trim().is_empty() {
                    chunk.push_line(after_names);
                }
            } else {
                chunk.keyword = Some(keyword);
                if !remainder.trim().is_empty() {
                    chunk.push_line(remainder);
                }
            }
            chunks.push(chunk);
        } else if trimmed.is_empty() {
            // Blank line: starts a new paragraph in the current chunk, or
            // is swallowed if there is no chunk yet.
            if let Some(last) = chunks.last_mut() {
                last.paragraphs.push(String::new());
            }
        } else if let Some(last) = chunks.last_mut() {
            last.last_line = line_no;
            last.push_line(trimmed);
        } else {
            let mut chunk = DoxChunk::empty(loc.clone());
            chunk.first_line = line_no;
            chunk.last_line = line_no;
            chunk.push_line(trimmed);
            chunks.push(chunk);
        }
        line_no += 1;
    }

    for chunk in &mut chunks {
        chunk.paragraphs.retain(|p| !p.is_empty());
    }
    chunks
}

fn split_word(s: &str) -> (String, &str) {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (s[..end].to_string(), s[end..].trim_start())
}

fn parse_param_direction(s: &str) -> (Option<ParamDir>, &str) {
    if let Some(rest) = s.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            let dir = ParamDir::from_str(rest[..close].trim());
            return (dir, rest[close + 1..].trim_start());
        }
    }
    (None, s)
}

fn parse_param_names(s: &str) -> (Vec<String>, &str) {
    let mut names = Vec::new();
    let mut rest = s;
    while let Some(first) = rest.split_whitespace().next() {
        if first.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false)
            && first.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ',')
        {
            for n in first.split(',') {
                if !n.is_empty() {
                    names.push(n.to_string());
                }
            }
            rest = &rest[first.len()..];
            rest = rest.trim_start();
        } else {
            break;
        }
        // only the first whitespace-separated token is treated as the name
        // list; everything else is the description paragraph.
        break;
    }
    (names, rest)
}

/// Merge rule (spec.md §4.4): an untagged chunk within one blank line of
/// the previous chunk's last line merges into it; an unknown-keyword chunk
/// always force-merges (so `\ref foo` inside running text stays literal).
pub fn merge_chunks(mut chunks: Vec<DoxChunk>) -> Vec<DoxChunk> {
    let mut merged: Vec<DoxChunk> = Vec::new();
    for chunk in chunks.drain(..) {
        let should_merge = match merged.last() {
            Some(last) => {
                let force = !chunk.is_known();
                let gap_ok = chunk.keyword.is_none() && chunk.first_line.saturating_sub(last.last_line) <= 1;
                force || gap_ok
            }
            None => false,
        };

        if should_merge {
            let last = merged.last_mut().unwrap();
            last.last_line = chunk.last_line;
            if let Some(kw) = &chunk.keyword {
                // unknown keyword: re-literalize as `\keyword rest...`
                let mut text = format!("\\{kw}");
                if !chunk.paragraphs.is_empty() {
                    text.push(' ');
                    text.push_str(&chunk.paragraphs.join(" "));
                }
                last.push_line(&text);
            } else {
                for p in chunk.paragraphs {
                    if last.paragraphs.is_empty() {
                        last.paragraphs.push(p);
                    } else {
                        last.push_line(&p);
                    }
                }
            }
            last.loc = last.loc.merge(&chunk.loc);
        } else {
            merged.push(chunk);
        }
    }
    merged
}

/// A fully assembled doxygen block attached to one AST node (spec.md §3
/// "Doxygen comment block").
#[derive(Debug, Clone, Default)]
pub struct DoxComment {
    pub brief: Option<String>,
    pub details: Option<String>,
    pub warning: Option<String>,
    pub example: Option<String>,
    pub params: Vec<ParamEntry>,
}

#[derive(Debug, Clone)]
pub struct ParamEntry {
    pub direction: ParamDir,
    pub names: Vec<String>,
    pub text: String,
}

impl DoxComment {
    /// Routes merged chunks into the per-keyword slots (spec.md §4.4
    /// "Routing to AST" / "Known keywords ... Untagged chunks become
    /// `brief` if none exists; otherwise they are appended to `details`").
    pub fn from_chunks(chunks: Vec<DoxChunk>, diags: &mut crate::diagnostics::Diagnostics) -> Result<Self, IopError> {
        let mut out = DoxComment::default();
        for chunk in chunks {
            let text = chunk.paragraphs.join("\n\n");
            match chunk.keyword.as_deref() {
                None => {
                    if out.brief.is_none() {
                        out.brief = Some(text);
                    } else {
                        append(&mut out.details, text);
                    }
                }
                Some("brief") => append(&mut out.brief, text),
                Some("details") => append(&mut out.details, text),
                Some("warning") => append(&mut out.warning, text),
                Some("example") => {
                    let canonical = reparse_example_json(&text).map_err(|e| {
                        IopError::Doxygen(chunk.loc.clone(), format!("malformed \\example JSON: {e}"))
                    })?;
                    out.example = Some(canonical);
                }
                Some("param") => {
                    let Some(direction) = chunk.direction else {
                        return Err(IopError::Doxygen(
                            chunk.loc.clone(),
                            "\\param missing direction, expected [in]/[out]/[throw]".into(),
                        ));
                    };
                    if chunk.param_names.is_empty() {
                        diags.push_warning(chunk.loc.clone(), "\\param with no argument name");
                    }
                    out.params.push(ParamEntry {
                        direction,
                        names: chunk.param_names,
                        text,
                    });
                }
                Some(other) => {
                    return Err(IopError::Doxygen(
                        chunk.loc.clone(),
                        format!("unknown doxygen keyword `{other}`"),
                    ));
                }
            }
        }
        Ok(out)
    }
}

fn append(slot: &mut Option<String>, text: String) {
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push_str("\n\n");
            existing.push_str(&text);
        }
        None => *slot = Some(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn loc() -> SourceLoc {
        SourceLoc::new(Rc::new(PathBuf::from("t.iop")), crate::loc::Position::new(1, 1), crate::loc::Position::new(1, 1))
    }

    #[test]
    fn untagged_becomes_brief_then_details() {
        let mut diags = crate::diagnostics::Diagnostics::new();
        let chunks = split_chunks("first\nsecond", &loc());
        let merged = merge_chunks(chunks);
        let dox = DoxComment::from_chunks(merged, &mut diags).unwrap();
        assert!(dox.brief.is_some());
    }

    #[test]
    fn param_direction_and_names() {
        let chunks = split_chunks("\\param[in] a,b the args", &loc());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].direction, Some(ParamDir::In));
        assert_eq!(chunks[0].param_names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn unknown_keyword_force_merges() {
        let mut diags = crate::diagnostics::Diagnostics::new();
        let chunks = split_chunks("See \\ref foo for details", &loc());
        let merged = merge_chunks(chunks);
        let dox = DoxComment::from_chunks(merged, &mut diags).unwrap();
        assert!(dox.brief.unwrap().contains("\\ref"));
    }
}
