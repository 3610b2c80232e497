//! Signature strings for the embedding collaborator.
//!
//! Each class, method and embeddable field gets a stable key
//! (`class:<qn>`, `method:<qn>.<name>`, `field:<qn>.<name>`), a one-line
//! signature and a SHA-256 cache key over `<kind>:<signature>`.

use std::collections::HashSet;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{Field, Method, RepositoryModel, TypeDeclaration};

/// Import fragments worth carrying into a class signature.
const KEY_IMPORT_MARKERS: &[&str] = &["struts", "corba", "javax", "org.apache"];
const MAX_KEY_IMPORTS: usize = 5;

/// Field type fragments that make a field worth embedding on its own.
const SIGNIFICANT_FIELD_TYPES: &[&str] = &["action", "form", "service", "dao", "manager", "handler"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Class,
    Method,
    Field,
}

impl SignatureKind {
    fn prefix(&self) -> &'static str {
        match self {
            SignatureKind::Class => "class",
            SignatureKind::Method => "method",
            SignatureKind::Field => "field",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignatureEntry {
    pub key: String,
    pub kind: SignatureKind,
    /// Qualified name of the class, method or field.
    pub identifier: String,
    /// Owning class for members.
    pub owner: Option<String>,
    pub signature: String,
    pub cache_key: String,
}

/// SHA-256 hex digest of `<kind>:<signature>`.
pub fn signature_hash(kind: SignatureKind, signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.prefix().as_bytes());
    hasher.update(b":");
    hasher.update(signature.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn with_annotations(annotations: &[String], declaration: String) -> String {
    let mut parts: Vec<String> = annotations.iter().map(|a| format!("@{a}")).collect();
    parts.push(declaration);
    parts.join(" ")
}

pub fn class_signature(class: &TypeDeclaration) -> String {
    let mut declaration = format!("{} {}", class.kind.as_str(), class.simple_name);
    if let Some(superclass) = &class.superclass_name {
        declaration.push_str(&format!(" extends {superclass}"));
    }
    if !class.implemented_interface_names.is_empty() {
        declaration.push_str(&format!(
            " implements {}",
            class.implemented_interface_names.join(", ")
        ));
    }
    let key_imports = class
        .imports
        .iter()
        .filter(|imp| {
            let lower = imp.to_lowercase();
            KEY_IMPORT_MARKERS.iter().any(|m| lower.contains(m))
        })
        .take(MAX_KEY_IMPORTS);
    let mut signature = with_annotations(&class.annotations, declaration);
    for imp in key_imports {
        signature.push(' ');
        signature.push_str(imp);
    }
    signature
}

pub fn method_signature(method: &Method) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.declared_type, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut declaration = format!("{} {}({params})", method.return_type, method.name);
    if !method.declared_throws.is_empty() {
        declaration.push_str(&format!(" throws {}", method.declared_throws.join(", ")));
    }
    with_annotations(&method.annotations, declaration)
}

pub fn field_signature(field: &Field) -> String {
    let mut declaration = format!("{} {}", field.declared_type, field.name);
    if let Some(init) = &field.initial_value_expression {
        declaration.push_str(&format!(" = {init}"));
    }
    with_annotations(&field.annotations, declaration)
}

/// Constants are skipped; annotated fields and framework-typed fields are kept.
pub fn is_embeddable_field(field: &Field) -> bool {
    if field.modifiers.r#static && field.modifiers.r#final {
        return false;
    }
    if !field.annotations.is_empty() {
        return true;
    }
    let lower = field.declared_type.to_lowercase();
    SIGNIFICANT_FIELD_TYPES.iter().any(|t| lower.contains(t))
}

fn entry(kind: SignatureKind, identifier: String, owner: Option<&str>, signature: String) -> SignatureEntry {
    SignatureEntry {
        key: format!("{}:{identifier}", kind.prefix()),
        cache_key: signature_hash(kind, &signature),
        kind,
        identifier,
        owner: owner.map(str::to_string),
        signature,
    }
}

/// Entries for one class: the class, each method, each embeddable field.
///
/// Keys are unique. Overloads and repeated field names keep the first
/// declaration in textual order, the same one [`signature_for`] resolves.
pub fn class_entries(class: &TypeDeclaration) -> Vec<SignatureEntry> {
    let qn = class.qualified_name.as_str();
    let mut entries = vec![entry(
        SignatureKind::Class,
        qn.to_string(),
        None,
        class_signature(class),
    )];
    let mut seen_methods: HashSet<&str> = HashSet::new();
    for method in &class.methods {
        if !seen_methods.insert(method.name.as_str()) {
            continue;
        }
        entries.push(entry(
            SignatureKind::Method,
            format!("{qn}.{}", method.name),
            Some(qn),
            method_signature(method),
        ));
    }
    let mut seen_fields: HashSet<&str> = HashSet::new();
    for field in &class.fields {
        // Only the field a key lookup would return is eligible.
        if !seen_fields.insert(field.name.as_str()) || !is_embeddable_field(field) {
            continue;
        }
        entries.push(entry(
            SignatureKind::Field,
            format!("{qn}.{}", field.name),
            Some(qn),
            field_signature(field),
        ));
    }
    entries
}

/// All entries of a model, classes in qualified-name order.
pub fn signature_entries(model: &RepositoryModel) -> Vec<SignatureEntry> {
    model
        .sorted_classes()
        .into_iter()
        .flat_map(class_entries)
        .collect()
}

/// Resolve one stable key to its signature string.
pub fn signature_for(model: &RepositoryModel, key: &str) -> Option<String> {
    let (kind, identifier) = key.split_once(':')?;
    match kind {
        "class" => model.class(identifier).map(class_signature),
        "method" => model.method(identifier).map(method_signature),
        "field" => model.field(identifier).map(field_signature),
        _ => None,
    }
}
