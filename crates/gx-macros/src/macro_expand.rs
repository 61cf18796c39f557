use std::collections::BTreeMap;

use gx_core::GalaxyToolError;
use gx_parser::{XmlElementNode, XmlNode};

use crate::definitions::MacroDefinitions;
use crate::tokens::{substitute_element, substitute_node};

#[derive(Debug)]
struct MacroExpansionContext<'d> {
    definitions: &'d MacroDefinitions,
    stack: Vec<String>,
}

/// Inlines every `<expand>` under `root`, drops its `<macros>` section and
/// applies the global tokens.
pub(crate) fn expand_tool_macros(
    root: &XmlElementNode,
    definitions: &MacroDefinitions,
) -> Result<XmlElementNode, GalaxyToolError> {
    let mut context = MacroExpansionContext {
        definitions,
        stack: Vec::new(),
    };

    let children = root
        .children
        .iter()
        .filter(|child| !matches!(child, XmlNode::Element(element) if element.name == "macros"))
        .cloned()
        .collect::<Vec<_>>();

    let expanded = XmlElementNode {
        name: root.name.clone(),
        attributes: root.attributes.clone(),
        children: expand_children(&children, &mut context)?,
        location: root.location.clone(),
    };

    Ok(substitute_element(&expanded, &definitions.tokens))
}

fn expand_children(
    children: &[XmlNode],
    context: &mut MacroExpansionContext<'_>,
) -> Result<Vec<XmlNode>, GalaxyToolError> {
    let mut out = Vec::new();
    for child in children {
        match child {
            XmlNode::Element(element) if element.name == "expand" => {
                out.extend(expand_macro(element, context)?);
            }
            XmlNode::Element(element) => out.push(XmlNode::Element(XmlElementNode {
                name: element.name.clone(),
                attributes: element.attributes.clone(),
                children: expand_children(&element.children, context)?,
                location: element.location.clone(),
            })),
            other => out.push(other.clone()),
        }
    }
    Ok(out)
}

fn expand_macro(
    expand: &XmlElementNode,
    context: &mut MacroExpansionContext<'_>,
) -> Result<Vec<XmlNode>, GalaxyToolError> {
    let Some(name) = expand.attribute("macro").filter(|name| !name.is_empty()) else {
        return Err(GalaxyToolError::with_span(
            "MACRO_EXPAND_NAME_MISSING",
            "Missing required attribute \"macro\" on <expand>.",
            expand.location.clone(),
        ));
    };

    let definitions = context.definitions;
    let Some(definition) = definitions.xml.get(name) else {
        return Err(GalaxyToolError::with_span(
            "MACRO_NOT_FOUND",
            format!("Macro \"{}\" is not defined.", name),
            expand.location.clone(),
        ));
    };

    if context.stack.iter().any(|entry| entry == name) {
        let mut cycle = context.stack.clone();
        cycle.push(name.to_string());
        return Err(GalaxyToolError::with_span(
            "MACRO_EXPAND_CYCLE",
            format!("Macro expansion cycle detected: {}", cycle.join(" -> ")),
            expand.location.clone(),
        ));
    }

    let params = definition
        .params
        .iter()
        .map(|(param, default)| {
            let value = expand.attribute(param).unwrap_or(default.as_str());
            (format!("@{}@", param.to_uppercase()), value.to_string())
        })
        .collect::<BTreeMap<_, _>>();

    // yielded content is expanded in the caller's scope, before this macro
    // joins the stack
    let yielded = expand_children(&expand.children, context)?;
    let (named_yields, unnamed_yield) = split_yields(yielded);

    let body = definition
        .body
        .children
        .iter()
        .map(|child| substitute_node(child, &params))
        .collect::<Vec<_>>();
    let body = fill_yields(&body, &unnamed_yield, &named_yields);

    context.stack.push(name.to_string());
    let expanded = expand_children(&body, context);
    context.stack.pop();
    expanded
}

fn split_yields(children: Vec<XmlNode>) -> (BTreeMap<String, Vec<XmlNode>>, Vec<XmlNode>) {
    let mut named = BTreeMap::new();
    let mut unnamed = Vec::new();
    for child in children {
        match child {
            XmlNode::Element(element) if element.name == "token" => {
                match element.attribute("name") {
                    Some(name) => {
                        named.insert(name.to_string(), element.children);
                    }
                    None => unnamed.push(XmlNode::Element(element)),
                }
            }
            other => unnamed.push(other),
        }
    }
    (named, unnamed)
}

fn fill_yields(
    nodes: &[XmlNode],
    unnamed: &[XmlNode],
    named: &BTreeMap<String, Vec<XmlNode>>,
) -> Vec<XmlNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            XmlNode::Element(element) if element.name == "yield" => {
                match element.attribute("name") {
                    Some(name) => out.extend(named.get(name).cloned().unwrap_or_default()),
                    None => out.extend(unnamed.iter().cloned()),
                }
            }
            XmlNode::Element(element) => out.push(XmlNode::Element(XmlElementNode {
                name: element.name.clone(),
                attributes: element.attributes.clone(),
                children: fill_yields(&element.children, unnamed, named),
                location: element.location.clone(),
            })),
            other => out.push(other.clone()),
        }
    }
    out
}
