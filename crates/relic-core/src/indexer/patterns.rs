//! Structural matchers for Java source text.
//!
//! Every rule here is an independent regex plus an explicit guard, applied to
//! raw text. Nothing in this module builds a syntax tree; a match that lands
//! inside a string literal or comment is accepted as a known approximation.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Compiled regex patterns (LazyLock for one-time init)
// ---------------------------------------------------------------------------

pub static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpackage\s+([^;]+);").unwrap());

pub static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimport\s+(static\s+)?([^;]+);").unwrap());

/// `[modifiers] (class|interface|enum) Name [<T>] [extends X, ...] [implements Y, Z]`
pub static TYPE_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:(?:public|private|protected|static|final|abstract|strictfp)\s+)*)(class|interface|enum)\s+(\w+)(?:\s*<[^{]*?>)?(?:\s+extends\s+([\w.]+(?:\s*<[^{]*?>)?(?:\s*,\s*[\w.]+(?:\s*<[^{]*?>)?)*))?(?:\s+implements\s+([\w\s,.<>?\[\]]+))?",
    )
    .unwrap()
});

/// `[modifiers] ReturnType name(params) [throws T1, T2]`
pub static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*)(\w+(?:\[\]|<[^>]+>)?)\s+(\w+)\s*\(([^)]*)\)(?:\s*throws\s+([\w\s,.<>]+))?",
    )
    .unwrap()
});

/// `[modifiers] Type name [= initializer];`
pub static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:(?:public|private|protected|static|final|transient|volatile)\s+)*)(\w+(?:\[\]|<[^>]+>)?)\s+(\w+)(?:\s*=\s*([^;]+))?;",
    )
    .unwrap()
});

pub static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)(?:\([^)]*\))?").unwrap());

/// Identifier followed by `(`; group 1 is set for constructor calls.
pub static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\bnew\s+[\w.]*)?\b([A-Za-z_]\w*)\s*\(").unwrap());

// -- Framework markers --

pub static ACTION_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"extends\s+.*Action").unwrap());

pub static FORM_BEAN_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"extends\s+.*ActionForm").unwrap());

pub static REMOTE_SERVANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"extends\s+.*POA").unwrap());

/// Parameter types that mark a method as a routing action entry point.
pub const ACTION_CONTEXT_TYPES: &[&str] = &["ActionMapping", "ActionForm"];

/// Method names that mark a routing action entry point.
pub const ACTION_METHOD_NAMES: &[&str] = &["execute", "perform"];

/// Text that marks a method as part of a remote-object contract.
pub const REMOTE_MARKERS: &[&str] = &["org.omg.CORBA", "CORBA"];

// -- Guards --

/// Tokens that can never be a return type in a declaration shape.
const DECLARATION_KEYWORDS: &[&str] = &["class", "interface", "enum"];

/// Statement keywords that the method/field shapes pick up from bodies
/// (`return foo(x)`, `throw new X()`, `else if (...)`).
const STATEMENT_KEYWORDS: &[&str] = &[
    "new", "return", "throw", "else", "case", "package", "import", "goto", "assert", "break",
    "continue", "yield", "instanceof",
];

/// Control keywords followed by `(` that are not calls.
const NON_CALL_KEYWORDS: &[&str] = &[
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "synchronized",
    "return",
    "throw",
    "super",
    "this",
    "assert",
];

/// Visibility keywords that land in the return-type slot for constructors.
pub const VISIBILITY_KEYWORDS: &[&str] = &["public", "private", "protected"];

pub fn is_rejected_return_type(token: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&token) || STATEMENT_KEYWORDS.contains(&token)
}

pub fn is_rejected_field_type(token: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&token) || STATEMENT_KEYWORDS.contains(&token)
}

pub fn is_helper_name(name: &str) -> bool {
    name.len() > "Helper".len() && name.ends_with("Helper")
}

pub fn is_holder_name(name: &str) -> bool {
    name.len() > "Holder".len() && name.ends_with("Holder")
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Byte offsets of every line start in one text, built once per unit so
/// position lookups are a binary search instead of a rescan.
#[derive(Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Byte offset where the line containing `offset` starts.
    pub fn line_start(&self, offset: usize) -> usize {
        self.starts[self.line_of(offset) - 1]
    }
}

/// Text between the last statement boundary (`;`, `{`, `}`) and the end of
/// `prefix`, plus whether such a boundary was found.
pub fn after_last_boundary(prefix: &str) -> (&str, bool) {
    match prefix.rfind([';', '{', '}']) {
        Some(idx) => (&prefix[idx + 1..], true),
        None => (prefix, false),
    }
}

// ---------------------------------------------------------------------------
// Bracket-depth-aware splitting
// ---------------------------------------------------------------------------

fn depth_delta(c: char) -> i32 {
    match c {
        '<' | '(' | '[' => 1,
        '>' | ')' | ']' => -1,
        _ => 0,
    }
}

/// Split on `sep` at bracket depth zero, trimming pieces and dropping empties.
///
/// Returns `None` when the brackets are unbalanced so the caller can choose
/// its own fallback.
pub fn split_top_level(text: &str, sep: char) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in text.chars() {
        if c == sep && depth == 0 {
            parts.push(std::mem::take(&mut current));
            continue;
        }
        depth += depth_delta(c);
        if depth < 0 {
            return None;
        }
        current.push(c);
    }
    if depth != 0 {
        return None;
    }
    parts.push(current);
    Some(
        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    )
}

/// Plain comma split, trimming pieces and dropping empties.
pub fn split_naive(text: &str) -> Vec<String> {
    text.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Like [`split_top_level`], but falls back to a naive split for malformed input.
pub fn split_list(text: &str) -> Vec<String> {
    split_top_level(text, ',').unwrap_or_else(|| split_naive(text))
}

/// Whitespace tokenization that keeps `Map<String, Integer>` as one token.
pub fn tokens_top_level(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in text.chars() {
        if c.is_whitespace() && depth <= 0 {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        depth += depth_delta(c);
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Annotation names (without `@`) on one line, in order.
pub fn annotations_in(text: &str) -> Vec<String> {
    ANNOTATION_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

/// Annotations attributed to the declaration on line `index` (0-based).
///
/// Walks upwards from the line above, skipping blank and comment lines, and
/// collects annotation names while consecutive lines keep yielding them.
/// The result is in top-to-bottom order.
pub fn annotations_before(lines: &[&str], index: usize) -> Vec<String> {
    let mut collected: Vec<Vec<String>> = Vec::new();
    let mut line_idx = index.min(lines.len());
    while line_idx > 0 {
        line_idx -= 1;
        let trimmed = lines[line_idx].trim();
        if trimmed.is_empty() || is_comment_line(trimmed) {
            continue;
        }
        let found = annotations_in(trimmed);
        if found.is_empty() {
            break;
        }
        collected.push(found);
    }
    collected.into_iter().rev().flatten().collect()
}

// ---------------------------------------------------------------------------
// Bodies and call sites
// ---------------------------------------------------------------------------

/// Byte offset of the `}` closing the `{` at `open`. String/char literals and
/// comments are skipped. `None` when the text ends first.
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Names invoked in `body`, first occurrence order, without duplicates.
pub fn called_names(body: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in CALL_RE.captures_iter(body) {
        if caps.get(1).is_some() {
            continue;
        }
        let name = &caps[2];
        if NON_CALL_KEYWORDS.contains(&name) {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
