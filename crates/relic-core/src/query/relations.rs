//! Relationship edges for the knowledge-graph collaborator.
//!
//! Edge targets are the names as written in source or configuration; no
//! type resolution is attempted.

use serde::Serialize;

use crate::models::{RepositoryModel, TypeDeclaration};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Extends,
    Implements,
    MethodOf,
    Calls,
    HandlesRoute,
    UsesFormBean,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::MethodOf => "method_of",
            RelationKind::Calls => "calls",
            RelationKind::HandlesRoute => "handles_route",
            RelationKind::UsesFormBean => "uses_form_bean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelationEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
}

impl RelationEdge {
    fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}

pub fn class_edges(class: &TypeDeclaration) -> Vec<RelationEdge> {
    let qn = class.qualified_name.as_str();
    let mut edges = Vec::new();
    if let Some(superclass) = &class.superclass_name {
        edges.push(RelationEdge::new(qn, superclass, RelationKind::Extends));
    }
    for iface in &class.implemented_interface_names {
        edges.push(RelationEdge::new(qn, iface, RelationKind::Implements));
    }
    for method in &class.methods {
        let method_qn = format!("{qn}.{}", method.name);
        edges.push(RelationEdge::new(&method_qn, qn, RelationKind::MethodOf));
        for callee in &method.called_method_names {
            edges.push(RelationEdge::new(&method_qn, callee, RelationKind::Calls));
        }
    }
    edges
}

/// Route edges: the handler class of every route, plus its form bean when
/// the mapping names one.
pub fn route_edges(model: &RepositoryModel) -> Vec<RelationEdge> {
    let mut paths: Vec<&String> = model.route_mappings_by_path.keys().collect();
    paths.sort();
    let mut edges = Vec::new();
    for path in paths {
        let route = &model.route_mappings_by_path[path];
        edges.push(RelationEdge::new(
            path.as_str(),
            &route.handler_type_name,
            RelationKind::HandlesRoute,
        ));
        if let Some(bean) = route.name.as_deref().filter(|n| !n.is_empty()) {
            edges.push(RelationEdge::new(path.as_str(), bean, RelationKind::UsesFormBean));
        }
    }
    edges
}

/// Every edge of the model: classes in qualified-name order, then routes by path.
pub fn relation_edges(model: &RepositoryModel) -> Vec<RelationEdge> {
    let mut edges: Vec<RelationEdge> = model
        .sorted_classes()
        .into_iter()
        .flat_map(class_edges)
        .collect();
    edges.extend(route_edges(model));
    edges
}
