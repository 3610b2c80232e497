//! Shared typed models produced by the extraction passes and handed to
//! downstream collaborators (embedding index, knowledge graph).

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::FailureKind;

// ---------------------------------------------------------------------------
// 1. Modifiers
// ---------------------------------------------------------------------------

/// Modifier flags attached to a type, method or field declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub public: bool,
    pub private: bool,
    pub protected: bool,
    pub r#static: bool,
    pub r#final: bool,
    pub r#abstract: bool,
    pub synchronized: bool,
    pub native: bool,
    pub transient: bool,
    pub volatile: bool,
}

impl Modifiers {
    /// Build the flag set from a whitespace separated keyword prefix such as
    /// `"private static final "`. Unknown words are ignored.
    pub fn from_keywords(prefix: &str) -> Self {
        let mut modifiers = Modifiers::default();
        for word in prefix.split_whitespace() {
            match word {
                "public" => modifiers.public = true,
                "private" => modifiers.private = true,
                "protected" => modifiers.protected = true,
                "static" => modifiers.r#static = true,
                "final" => modifiers.r#final = true,
                "abstract" => modifiers.r#abstract = true,
                "synchronized" => modifiers.synchronized = true,
                "native" => modifiers.native = true,
                "transient" => modifiers.transient = true,
                "volatile" => modifiers.volatile = true,
                _ => {}
            }
        }
        modifiers
    }

    /// Render the set flags back as Java keywords in canonical order.
    pub fn keywords(&self) -> Vec<&'static str> {
        let flags = [
            (self.public, "public"),
            (self.protected, "protected"),
            (self.private, "private"),
            (self.r#abstract, "abstract"),
            (self.r#static, "static"),
            (self.r#final, "final"),
            (self.transient, "transient"),
            (self.volatile, "volatile"),
            (self.synchronized, "synchronized"),
            (self.native, "native"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, kw)| *kw)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// 2. Parameter / Method / Field
// ---------------------------------------------------------------------------

/// A single method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub declared_type: String,
    pub is_final: bool,
    pub annotations: Vec<String>,
}

/// A method declaration discovered in a source unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub declared_throws: Vec<String>,
    /// 1-based line of the declaration start.
    pub source_line: usize,
    /// Best-effort names of methods invoked inside the body, first occurrence order.
    pub called_method_names: Vec<String>,
    /// Lines spanned by the `{ ... }` body; 0 when there is no body.
    pub body_line_count: usize,
    pub is_action_handler: bool,
    pub is_remote_operation: bool,
}

/// A field (or, textually indistinguishable, a local variable) declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub declared_type: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub initial_value_expression: Option<String>,
    pub source_line: usize,
}

// ---------------------------------------------------------------------------
// 3. TypeDeclaration
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        }
    }
}

/// The outer type declared by one source unit, with everything found in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDeclaration {
    pub simple_name: String,
    pub qualified_name: String,
    pub kind: TypeKind,
    pub package: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub superclass_name: Option<String>,
    pub implemented_interface_names: Vec<String>,
    pub methods: Vec<Method>,
    pub fields: Vec<Field>,
    pub imports: Vec<String>,
    pub source_line: usize,
    pub source_path: String,
    pub is_action_handler_class: bool,
    pub is_remote_servant_class: bool,
    pub is_remote_helper_class: bool,
    pub is_remote_holder_class: bool,
    pub is_form_bean_class: bool,
}

/// `package.simple_name`, or the bare simple name for the default package.
pub fn qualify(package: &str, simple_name: &str) -> String {
    if package.is_empty() {
        simple_name.to_string()
    } else {
        format!("{package}.{simple_name}")
    }
}

impl TypeDeclaration {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// 4. Routing configuration
// ---------------------------------------------------------------------------

/// A request path bound to a handler type and its named outcome forwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteMapping {
    pub path: String,
    pub handler_type_name: String,
    /// Name of the form bean bound to this route.
    pub name: Option<String>,
    pub scope: Option<String>,
    pub input_page: Option<String>,
    pub forwards: IndexMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormBean {
    pub name: String,
    pub type_name: String,
    pub properties: Vec<String>,
}

// ---------------------------------------------------------------------------
// 5. Remote interface definitions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemoteOperation {
    pub name: String,
    pub return_type: String,
    pub raw_parameter_list: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemoteAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub readonly: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemoteInterface {
    pub name: String,
    pub module: String,
    pub operations: Vec<RemoteOperation>,
    pub attributes: Vec<RemoteAttribute>,
    pub inherited_interface_names: Vec<String>,
}

// ---------------------------------------------------------------------------
// 6. Repository aggregate
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    pub total_files_seen: usize,
    pub source_units_seen: usize,
    pub config_documents_seen: usize,
    pub interface_documents_seen: usize,
    pub action_handler_count: usize,
    pub remote_servant_count: usize,
    pub total_methods: usize,
    pub total_fields: usize,
    pub skipped_files: usize,
    pub peak_concurrent_parses: usize,
}

/// A file that contributed nothing to the model, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Everything extracted from one repository scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepositoryModel {
    pub classes_by_qualified_name: HashMap<String, TypeDeclaration>,
    pub route_mappings_by_path: HashMap<String, RouteMapping>,
    pub global_forwards: IndexMap<String, String>,
    pub form_beans_by_name: HashMap<String, FormBean>,
    pub remote_interfaces_by_name: HashMap<String, RemoteInterface>,
    pub statistics: ScanStatistics,
    pub failures: Vec<ScanFailure>,
}

impl RepositoryModel {
    pub fn class(&self, qualified_name: &str) -> Option<&TypeDeclaration> {
        self.classes_by_qualified_name.get(qualified_name)
    }

    /// Resolve `pkg.Type.member` by splitting at the last dot.
    fn owner_and_member<'a>(&self, qualified_member: &'a str) -> Option<(&TypeDeclaration, &'a str)> {
        let (owner, member) = qualified_member.rsplit_once('.')?;
        Some((self.class(owner)?, member))
    }

    /// Look up a method by `pkg.Type.method`; overloads resolve to the first
    /// declaration in textual order.
    pub fn method(&self, qualified_method_name: &str) -> Option<&Method> {
        let (owner, name) = self.owner_and_member(qualified_method_name)?;
        owner.method(name)
    }

    pub fn field(&self, qualified_field_name: &str) -> Option<&Field> {
        let (owner, name) = self.owner_and_member(qualified_field_name)?;
        owner.field(name)
    }

    pub fn route(&self, path: &str) -> Option<&RouteMapping> {
        self.route_mappings_by_path.get(path)
    }

    pub fn form_bean(&self, name: &str) -> Option<&FormBean> {
        self.form_beans_by_name.get(name)
    }

    pub fn remote_interface(&self, name: &str) -> Option<&RemoteInterface> {
        self.remote_interfaces_by_name.get(name)
    }

    /// Classes sorted by qualified name, for deterministic iteration.
    pub fn sorted_classes(&self) -> Vec<&TypeDeclaration> {
        let mut classes: Vec<&TypeDeclaration> = self.classes_by_qualified_name.values().collect();
        classes.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        classes
    }

    /// Recompute the class-derived counters from the current aggregate.
    pub fn recompute_class_statistics(&mut self) {
        let classes = self.classes_by_qualified_name.values();
        let mut stats = std::mem::take(&mut self.statistics);
        stats.action_handler_count = 0;
        stats.remote_servant_count = 0;
        stats.total_methods = 0;
        stats.total_fields = 0;
        for class in classes {
            stats.total_methods += class.methods.len();
            stats.total_fields += class.fields.len();
            if class.is_action_handler_class {
                stats.action_handler_count += 1;
            }
            if class.is_remote_servant_class {
                stats.remote_servant_count += 1;
            }
        }
        stats.skipped_files = self.failures.len();
        self.statistics = stats;
    }

    /// Pretty-printed JSON of the whole model, for handing to collaborators.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
