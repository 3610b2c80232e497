//! Remote interface definition (`*.idl`) parsing.
//!
//! A single pass over logical lines. Interface blocks close at the first line
//! starting with `}`; nested braces are not tracked, so a `struct` or
//! `exception` body inside an interface ends the interface early.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::errors::{ExtractError, ExtractResult};
use crate::models::{RemoteAttribute, RemoteInterface, RemoteOperation};

static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^module\s+(\w+)").unwrap());

static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:abstract\s+|local\s+)?interface\s+(\w+)(?:\s*:\s*([\w\s,:]+))?").unwrap()
});

static OPERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w:<>]+)\s+(\w+)\s*\(([^)]*)\)").unwrap());

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(readonly\s+)?attribute\s+([\w:<>]+(?:\s+[\w:<>]+)*?)\s+(\w+)\s*(?:;|$)").unwrap()
});

/// Parse an IDL document, logging and returning nothing when it is malformed.
pub fn parse_interface_definitions(idl: &str, source_path: &str) -> Vec<RemoteInterface> {
    match try_parse_interface_definitions(idl, source_path) {
        Ok(interfaces) => interfaces,
        Err(e) => {
            warn!("{e}");
            Vec::new()
        }
    }
}

/// Parse an IDL document.
///
/// An interface block still open at end of input is kept with the members
/// read so far. The document is malformed only when its braces do not
/// balance and no interface could be recovered from it.
pub fn try_parse_interface_definitions(
    idl: &str,
    source_path: &str,
) -> ExtractResult<Vec<RemoteInterface>> {
    let lines = logical_lines(idl);
    let mut interfaces = Vec::new();
    let mut current_module = String::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_str();

        if let Some(caps) = MODULE_RE.captures(line) {
            current_module = caps[1].to_string();
        } else if let Some(caps) = INTERFACE_RE.captures(line) {
            // `interface Foo;` only forward-declares.
            if line.ends_with(';') {
                i += 1;
                continue;
            }
            let inherited_interface_names = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let mut interface = RemoteInterface {
                name: caps[1].to_string(),
                module: current_module.clone(),
                operations: Vec::new(),
                attributes: Vec::new(),
                inherited_interface_names,
            };

            i += 1;
            while i < lines.len() && !lines[i].starts_with('}') {
                read_member(&lines[i], &mut interface);
                i += 1;
            }
            if i == lines.len() {
                warn!(
                    "Interface {} in {source_path} is never closed; keeping members read so far",
                    interface.name
                );
            }
            interfaces.push(interface);
        }
        i += 1;
    }

    if interfaces.is_empty() {
        let opened: usize = lines.iter().map(|l| l.matches('{').count()).sum();
        let closed: usize = lines.iter().map(|l| l.matches('}').count()).sum();
        if opened != closed {
            return Err(ExtractError::MalformedInterfaceDocument {
                path: source_path.to_string(),
                reason: format!("{opened} blocks opened but {closed} closed"),
            });
        }
    }

    Ok(interfaces)
}

fn read_member(line: &str, interface: &mut RemoteInterface) {
    if line.contains('(') && line.contains(')') {
        if let Some(caps) = OPERATION_RE.captures(line) {
            interface.operations.push(RemoteOperation {
                return_type: caps[1].to_string(),
                name: caps[2].to_string(),
                raw_parameter_list: caps[3].trim().to_string(),
            });
        }
    } else if line.contains("attribute") {
        if let Some(caps) = ATTRIBUTE_RE.captures(line) {
            interface.attributes.push(RemoteAttribute {
                readonly: caps.get(1).is_some(),
                type_: caps[2].to_string(),
                name: caps[3].to_string(),
            });
        }
    }
}

/// Strip `//` and `/* */` comments and break lines after `{` / `;` and
/// before `}` so that a compact one-line document reads the same as a
/// formatted one.
fn logical_lines(idl: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    fn flush(lines: &mut Vec<String>, current: &mut String) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
        current.clear();
    }

    let mut chars = idl.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            in_line_comment = false;
            flush(&mut lines, &mut current);
            continue;
        }
        if in_line_comment {
            continue;
        }
        if in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                in_line_comment = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
            }
            '{' | ';' => {
                current.push(c);
                flush(&mut lines, &mut current);
            }
            '}' => {
                flush(&mut lines, &mut current);
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    flush(&mut lines, &mut current);
    lines
}
