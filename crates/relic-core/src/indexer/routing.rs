//! Routing configuration (`struts-config*.xml`) parsing.

use indexmap::IndexMap;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::warn;

use crate::errors::{ExtractError, ExtractResult};
use crate::models::{FormBean, RouteMapping};

/// Tag names carrying a route mapping, in search order. The first one with
/// any matches wins; legacy variants use one or the other.
const MAPPING_TAGS: &[&str] = &["action-mapping", "action"];

/// Everything one routing configuration document declares.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingConfig {
    pub mappings: Vec<RouteMapping>,
    pub form_beans: Vec<FormBean>,
    pub global_forwards: IndexMap<String, String>,
}

/// Parse a routing document, logging and returning an empty result when the
/// XML is malformed.
pub fn parse_routing_config(xml: &str, source_path: &str) -> RoutingConfig {
    match try_parse_routing_config(xml, source_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}");
            RoutingConfig::default()
        }
    }
}

pub fn try_parse_routing_config(xml: &str, source_path: &str) -> ExtractResult<RoutingConfig> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).map_err(|e| {
        ExtractError::MalformedConfigDocument {
            path: source_path.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mapping_nodes: Vec<Node<'_, '_>> = MAPPING_TAGS
        .iter()
        .map(|tag| elements_named(doc.root(), tag).collect::<Vec<_>>())
        .find(|nodes| !nodes.is_empty())
        .unwrap_or_default();

    let mappings = mapping_nodes.into_iter().filter_map(route_mapping).collect();

    let form_beans = elements_named(doc.root(), "form-bean")
        .filter_map(|node| {
            let name = non_empty(node.attribute("name"))?;
            let type_name = non_empty(node.attribute("type"))?;
            let properties = elements_named(node, "form-property")
                .filter_map(|p| non_empty(p.attribute("name")))
                .map(str::to_string)
                .collect();
            Some(FormBean {
                name: name.to_string(),
                type_name: type_name.to_string(),
                properties,
            })
        })
        .collect();

    let mut global_forwards = IndexMap::new();
    for section in elements_named(doc.root(), "global-forwards") {
        global_forwards.extend(forwards_under(section));
    }

    Ok(RoutingConfig {
        mappings,
        form_beans,
        global_forwards,
    })
}

fn route_mapping(node: Node<'_, '_>) -> Option<RouteMapping> {
    let path = non_empty(node.attribute("path"))?;
    Some(RouteMapping {
        path: path.to_string(),
        handler_type_name: node.attribute("type").unwrap_or_default().to_string(),
        name: node.attribute("name").map(str::to_string),
        scope: node.attribute("scope").map(str::to_string),
        input_page: node.attribute("input").map(str::to_string),
        forwards: forwards_under(node),
    })
}

/// `forward` descendants with both `name` and `path`; a repeated name keeps
/// the last path.
fn forwards_under(node: Node<'_, '_>) -> IndexMap<String, String> {
    let mut forwards = IndexMap::new();
    for forward in elements_named(node, "forward") {
        if let (Some(name), Some(path)) = (
            non_empty(forward.attribute("name")),
            non_empty(forward.attribute("path")),
        ) {
            forwards.insert(name.to_string(), path.to_string());
        }
    }
    forwards
}

fn elements_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUTS_CONFIG: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE struts-config PUBLIC
  "-//Apache Software Foundation//DTD Struts Configuration 1.1//EN"
  "http://jakarta.apache.org/struts/dtds/struts-config_1_1.dtd">
<struts-config>
  <form-beans>
    <form-bean name="loginForm" type="com.legacybank.web.LoginForm"/>
    <form-bean name="transferForm" type="org.apache.struts.action.DynaActionForm">
      <form-property name="fromAccount" type="java.lang.String"/>
      <form-property name="amount" type="java.lang.String"/>
    </form-bean>
    <form-bean name="incomplete"/>
  </form-beans>
  <global-forwards>
    <forward name="logout" path="/logout.do"/>
  </global-forwards>
  <action-mappings>
    <action path="/login" type="com.legacybank.web.LoginAction" name="loginForm"
            scope="request" input="/login.jsp">
      <forward name="success" path="/home.jsp"/>
      <forward name="failure" path="/login.jsp"/>
      <forward name="success" path="/dashboard.jsp"/>
    </action>
    <action path="/transfer" type="com.legacybank.web.TransferAction"/>
    <action type="com.legacybank.web.Orphan"/>
  </action-mappings>
</struts-config>
"#;

    #[test]
    fn test_single_action_mapping() {
        let config = parse_routing_config(
            r#"<struts-config><action path="/login" type="LoginAction"><forward name="success" path="/home.jsp"/></action></struts-config>"#,
            "struts-config.xml",
        );
        assert_eq!(config.mappings.len(), 1);
        let mapping = &config.mappings[0];
        assert_eq!(mapping.path, "/login");
        assert_eq!(mapping.handler_type_name, "LoginAction");
        assert_eq!(mapping.forwards.len(), 1);
        assert_eq!(mapping.forwards["success"], "/home.jsp");
    }

    #[test]
    fn test_full_document_with_doctype() {
        let config = parse_routing_config(STRUTS_CONFIG, "WEB-INF/struts-config.xml");
        let paths: Vec<&str> = config.mappings.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/login", "/transfer"]);

        let login = &config.mappings[0];
        assert_eq!(login.name.as_deref(), Some("loginForm"));
        assert_eq!(login.scope.as_deref(), Some("request"));
        assert_eq!(login.input_page.as_deref(), Some("/login.jsp"));
        let outcomes: Vec<(&str, &str)> = login
            .forwards
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            outcomes,
            vec![("success", "/dashboard.jsp"), ("failure", "/login.jsp")]
        );
        assert!(config.mappings[1].forwards.is_empty());
        assert_eq!(config.global_forwards["logout"], "/logout.do");
    }

    #[test]
    fn test_form_beans_require_name_and_type() {
        let config = parse_routing_config(STRUTS_CONFIG, "struts-config.xml");
        let names: Vec<&str> = config.form_beans.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["loginForm", "transferForm"]);
        assert!(config.form_beans[0].properties.is_empty());
        assert_eq!(config.form_beans[1].properties, vec!["fromAccount", "amount"]);
    }

    #[test]
    fn test_action_mapping_tag_takes_precedence() {
        let xml = r#"<config>
  <action-mapping path="/a" type="A"/>
  <action path="/b" type="B"/>
</config>"#;
        let config = parse_routing_config(xml, "struts-config.xml");
        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.mappings[0].path, "/a");
    }

    #[test]
    fn test_missing_type_becomes_empty_handler() {
        let config = parse_routing_config(
            r#"<struts-config><action path="/static"/></struts-config>"#,
            "struts-config.xml",
        );
        assert_eq!(config.mappings[0].handler_type_name, "");
        assert!(config.mappings[0].name.is_none());
    }

    #[test]
    fn test_malformed_document_yields_empty_result() {
        let xml = "<struts-config><action path=\"/x\"></struts-config>";
        let err = try_parse_routing_config(xml, "bad.xml").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedConfigDocument { .. }));
        assert_eq!(parse_routing_config(xml, "bad.xml"), RoutingConfig::default());
    }
}
