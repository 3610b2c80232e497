//! Parses one Java source unit into a [`TypeDeclaration`].
//!
//! The first type-declaration shape in the text is the unit's outer type;
//! every method and field shape in the whole text is attributed to it.

use regex::Captures;
use tracing::debug;

use crate::errors::{ExtractError, ExtractResult};
use crate::indexer::patterns::{
    self, after_last_boundary, annotations_before, annotations_in, called_names,
    matching_brace, split_list, split_naive, split_top_level, tokens_top_level, LineIndex,
    ACTION_CONTEXT_TYPES,
    ACTION_HANDLER_RE, ACTION_METHOD_NAMES, FIELD_RE, FORM_BEAN_CLASS_RE, IMPORT_RE, METHOD_RE,
    PACKAGE_RE, REMOTE_MARKERS, REMOTE_SERVANT_RE, TYPE_DECL_RE, VISIBILITY_KEYWORDS,
};
use crate::models::{qualify, Field, Method, Modifiers, Parameter, TypeDeclaration, TypeKind};

/// Parse a source unit, logging and returning `None` when nothing usable is found.
pub fn parse_unit(source: &str, source_path: &str) -> Option<TypeDeclaration> {
    match try_parse_unit(source, source_path) {
        Ok(declaration) => Some(declaration),
        Err(e) => {
            debug!("{e}");
            None
        }
    }
}

/// Parse a source unit. Fails only with [`ExtractError::UnparsableUnit`].
pub fn try_parse_unit(source: &str, source_path: &str) -> ExtractResult<TypeDeclaration> {
    let lines: Vec<&str> = source.split('\n').collect();
    let index = LineIndex::new(source);

    let package = PACKAGE_RE
        .captures(source)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();

    let imports: Vec<String> = IMPORT_RE
        .captures_iter(source)
        .map(|caps| caps[2].trim().to_string())
        .collect();

    let decl = TYPE_DECL_RE
        .captures(source)
        .ok_or_else(|| ExtractError::UnparsableUnit {
            path: source_path.to_string(),
        })?;
    let decl_start = decl.get(0).map(|m| m.start()).unwrap_or(0);

    let kind = TypeKind::from_keyword(&decl[2]).ok_or_else(|| ExtractError::UnparsableUnit {
        path: source_path.to_string(),
    })?;
    let simple_name = decl[3].to_string();

    let mut extends = decl
        .get(4)
        .map(|m| split_list(m.as_str()))
        .unwrap_or_default()
        .into_iter();
    let superclass_name = extends.next();
    // Interfaces may extend several types; the extra ones are contracts too.
    let mut implemented_interface_names: Vec<String> = extends.collect();
    if let Some(implements) = decl.get(5) {
        implemented_interface_names.extend(split_list(implements.as_str()));
    }

    let is_action_handler_class = ACTION_HANDLER_RE.is_match(source);
    let is_remote_servant_class = REMOTE_SERVANT_RE.is_match(source);
    let is_remote_helper_class = !is_remote_servant_class && patterns::is_helper_name(&simple_name);
    let is_remote_holder_class = patterns::is_holder_name(&simple_name);

    let methods = parse_methods(source, &lines, &index);
    let fields = parse_fields(source, &lines, &index);

    Ok(TypeDeclaration {
        qualified_name: qualify(&package, &simple_name),
        simple_name,
        kind,
        package,
        modifiers: Modifiers::from_keywords(&decl[1]),
        annotations: declaration_annotations(source, &lines, &index, decl_start),
        superclass_name,
        implemented_interface_names,
        methods,
        fields,
        imports,
        source_line: index.line_of(decl_start),
        source_path: source_path.to_string(),
        is_action_handler_class,
        is_remote_servant_class,
        is_remote_helper_class,
        is_remote_holder_class,
        is_form_bean_class: FORM_BEAN_CLASS_RE.is_match(source),
    })
}

/// Annotations above the declaration plus any written before it on its own line.
///
/// When an earlier statement ends on the same line, only the text after it
/// counts and the lines above belong to that statement instead.
fn declaration_annotations(
    source: &str,
    lines: &[&str],
    index: &LineIndex,
    offset: usize,
) -> Vec<String> {
    let (own_text, shares_line) = after_last_boundary(&source[index.line_start(offset)..offset]);
    let mut annotations = if shares_line {
        Vec::new()
    } else {
        annotations_before(lines, index.line_of(offset) - 1)
    };
    annotations.extend(annotations_in(own_text));
    annotations
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn parse_methods(source: &str, lines: &[&str], index: &LineIndex) -> Vec<Method> {
    METHOD_RE
        .captures_iter(source)
        .filter_map(|caps| build_method(source, lines, index, &caps))
        .collect()
}

fn build_method(
    source: &str,
    lines: &[&str],
    index: &LineIndex,
    caps: &Captures<'_>,
) -> Option<Method> {
    let whole = caps.get(0)?;
    let mut modifier_text = caps[1].to_string();
    let mut return_type = caps[2].to_string();
    let name = caps[3].to_string();
    let params_raw = &caps[4];

    if patterns::is_rejected_return_type(&return_type) {
        return None;
    }
    // `public Foo(...)`: the visibility keyword sits where the return type goes.
    if VISIBILITY_KEYWORDS.contains(&return_type.as_str()) {
        modifier_text.push(' ');
        modifier_text.push_str(&return_type);
        return_type = name.clone();
    }

    let declared_throws = caps
        .get(5)
        .map(|m| {
            let mut throws: Vec<String> = Vec::new();
            for entry in split_list(m.as_str()) {
                if !throws.contains(&entry) {
                    throws.push(entry);
                }
            }
            throws
        })
        .unwrap_or_default();

    let annotations = declaration_annotations(source, lines, index, whole.start());
    let (called_method_names, body_line_count) = body_facts(source, whole.end());

    let is_action_handler = ACTION_METHOD_NAMES.contains(&name.as_str())
        || ACTION_CONTEXT_TYPES.iter().any(|t| params_raw.contains(t));
    let is_remote_operation = annotations
        .iter()
        .chain(declared_throws.iter())
        .any(|text| REMOTE_MARKERS.iter().any(|marker| text.contains(marker)));

    Some(Method {
        parameters: parse_parameters(params_raw),
        modifiers: Modifiers::from_keywords(&modifier_text),
        source_line: index.line_of(whole.start()),
        name,
        return_type,
        annotations,
        declared_throws,
        called_method_names,
        body_line_count,
        is_action_handler,
        is_remote_operation,
    })
}

/// Call-site names and line span of the body starting right after `end`.
fn body_facts(source: &str, end: usize) -> (Vec<String>, usize) {
    let rest = &source[end..];
    let offset = rest.len() - rest.trim_start().len();
    if !rest[offset..].starts_with('{') {
        return (Vec::new(), 0);
    }
    let open = end + offset;
    let body = match matching_brace(source, open) {
        Some(close) => &source[open..=close],
        None => &source[open..],
    };
    let line_count = body.matches('\n').count() + 1;
    (called_names(&body[1..]), line_count)
}

/// Split a raw parameter list into [`Parameter`]s.
///
/// Malformed generics fall back to a naive comma and whitespace split for
/// this list only.
pub fn parse_parameters(params_raw: &str) -> Vec<Parameter> {
    if params_raw.trim().is_empty() {
        return Vec::new();
    }
    let (fragments, balanced) = match split_top_level(params_raw, ',') {
        Some(fragments) => (fragments, true),
        None => (split_naive(params_raw), false),
    };
    fragments
        .iter()
        .filter_map(|fragment| {
            let tokens: Vec<String> = if balanced {
                tokens_top_level(fragment)
            } else {
                fragment.split_whitespace().map(str::to_string).collect()
            };
            let mut annotations = Vec::new();
            let mut is_final = false;
            let mut core: Vec<String> = Vec::new();
            for token in tokens {
                if let Some(annotation) = token.strip_prefix('@') {
                    let name = annotation.split('(').next().unwrap_or(annotation);
                    annotations.push(name.to_string());
                } else if token == "final" {
                    is_final = true;
                } else {
                    core.push(token);
                }
            }
            if core.len() < 2 {
                return None;
            }
            let name = core.pop()?;
            let declared_type = core.pop()?;
            Some(Parameter {
                name,
                declared_type,
                is_final,
                annotations,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

fn parse_fields(source: &str, lines: &[&str], index: &LineIndex) -> Vec<Field> {
    FIELD_RE
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let declared_type = caps[2].to_string();
            if patterns::is_rejected_field_type(&declared_type) {
                return None;
            }
            Some(Field {
                name: caps[3].to_string(),
                declared_type,
                modifiers: Modifiers::from_keywords(&caps[1]),
                annotations: declaration_annotations(source, lines, index, whole.start()),
                initial_value_expression: caps.get(4).map(|m| m.as_str().trim().to_string()),
                source_line: index.line_of(whole.start()),
            })
        })
        .collect()
}
