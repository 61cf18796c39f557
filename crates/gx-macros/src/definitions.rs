use std::collections::BTreeMap;

use gx_parser::XmlElementNode;

use crate::source_parse::{macro_sections, SourceFile};

/// An `<xml name="...">` macro. `params` are the names listed in its
/// `tokens` attribute paired with their `token_<name>` defaults.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct XmlMacro {
    pub(crate) body: XmlElementNode,
    pub(crate) params: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MacroDefinitions {
    pub(crate) xml: BTreeMap<String, XmlMacro>,
    pub(crate) tokens: BTreeMap<String, String>,
}

impl MacroDefinitions {
    /// Later files override earlier ones, so the tool's own section wins over
    /// anything it imports.
    pub(crate) fn collect(order: &[String], sources: &BTreeMap<String, SourceFile>) -> Self {
        let mut definitions = Self::default();
        for path in order {
            let Some(source) = sources.get(path) else {
                continue;
            };
            for section in macro_sections(&source.root) {
                definitions.add_section(section);
            }
        }
        definitions
    }

    fn add_section(&mut self, section: &XmlElementNode) {
        for child in section.element_children() {
            let Some(name) = child.attribute("name").filter(|name| !name.is_empty()) else {
                continue;
            };
            match child.name.as_str() {
                "xml" => {
                    self.xml.insert(
                        name.to_string(),
                        XmlMacro {
                            body: child.clone(),
                            params: macro_params(child),
                        },
                    );
                }
                "token" => {
                    self.tokens
                        .insert(name.to_string(), child.text_content().trim().to_string());
                }
                _ => {}
            }
        }
    }
}

fn macro_params(node: &XmlElementNode) -> Vec<(String, String)> {
    let Some(tokens) = node.attribute("tokens") else {
        return Vec::new();
    };
    tokens
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let default = node
                .attribute(&format!("token_{}", name))
                .unwrap_or_default()
                .to_string();
            (name.to_string(), default)
        })
        .collect()
}
