use std::collections::BTreeMap;

use gx_core::{DocumentType, GalaxyToolError, SourceLocation, SourceSpan};
use roxmltree::{Document, Node, NodeType};

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(XmlTextNode),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElementNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlTextNode {
    pub value: String,
    pub location: SourceSpan,
}

impl XmlDocument {
    pub fn document_type(&self) -> DocumentType {
        DocumentType::from_root_name(&self.root.name)
    }

    /// True when any element of the document is an `<expand>`.
    pub fn uses_macros(&self) -> bool {
        contains_element_named(&self.root, "expand")
    }

    /// True when the root carries a `<macros>` section.
    pub fn declares_macros(&self) -> bool {
        self.root.children_named("macros").next().is_some()
    }
}

impl XmlElementNode {
    /// Element built in memory rather than parsed from source.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            location: SourceSpan::synthetic(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn element_children(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|entry| match entry {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElementNode> + 'a {
        self.element_children().filter(move |child| child.name == name)
    }

    pub fn first_element_child(&self) -> Option<&XmlElementNode> {
        self.element_children().next()
    }

    pub fn push_element(&mut self, element: XmlElementNode) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn push_text(&mut self, value: impl Into<String>) {
        self.children.push(XmlNode::Text(XmlTextNode {
            value: value.into(),
            location: SourceSpan::synthetic(),
        }));
    }

    pub fn push_comment(&mut self, value: impl Into<String>) {
        self.children.push(XmlNode::Comment(value.into()));
    }

    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|entry| match entry {
                XmlNode::Text(XmlTextNode { value, .. }) => Some(value.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Pre-order search for the first element named `name`. The root counts as
/// depth 1, its children as depth 2, and so on.
pub fn find_element<'a>(
    root: &'a XmlElementNode,
    name: &str,
    max_depth: usize,
) -> Option<&'a XmlElementNode> {
    fn walk<'a>(
        node: &'a XmlElementNode,
        name: &str,
        depth: usize,
        max_depth: usize,
    ) -> Option<&'a XmlElementNode> {
        if depth > max_depth {
            return None;
        }
        if node.name == name {
            return Some(node);
        }
        node.element_children()
            .find_map(|child| walk(child, name, depth + 1, max_depth))
    }

    walk(root, name, 1, max_depth)
}

fn contains_element_named(node: &XmlElementNode, name: &str) -> bool {
    node.name == name
        || node
            .element_children()
            .any(|child| contains_element_named(child, name))
}

pub fn parse_xml_document(source: &str) -> Result<XmlDocument, GalaxyToolError> {
    let document = Document::parse(source)
        .map_err(|error| GalaxyToolError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(GalaxyToolError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(XmlDocument {
        root: parse_element(&document, root),
    })
}

fn parse_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElementNode {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(document, child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default().to_string();
                if value.is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(XmlTextNode {
                    value,
                    location: node_span(document, child.range().start, child.range().end),
                }));
            }
            _ => {}
        }
    }

    XmlElementNode {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
        location: node_span(document, node.range().start, node.range().end),
    }
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}
