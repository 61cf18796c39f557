//! Galaxy macro expansion: resolves `<macros>`, `<import>`, `<xml>`, `<token>`,
//! `<expand>` and `<yield>` into a fully inlined tool element tree.

use std::collections::BTreeMap;

use gx_core::GalaxyToolError;
use gx_parser::XmlElementNode;

mod definitions;
mod import_graph;
mod macro_expand;
mod source_parse;
mod tokens;

use definitions::MacroDefinitions;
use import_graph::{definition_order, validate_import_graph};
use macro_expand::expand_tool_macros;
use source_parse::{load_sources, normalize_virtual_path};

/// Maps a tool document's location to its inlined element tree.
pub trait MacroExpander {
    fn expand(&self, tool_path: &str) -> Result<XmlElementNode, GalaxyToolError>;
}

/// Expander over an in-memory map of relative path to XML text. Imports are
/// resolved relative to the importing file.
#[derive(Debug, Clone, Default)]
pub struct SourceMapExpander {
    sources: BTreeMap<String, String>,
}

impl SourceMapExpander {
    pub fn new(sources: BTreeMap<String, String>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &BTreeMap<String, String> {
        &self.sources
    }
}

impl MacroExpander for SourceMapExpander {
    fn expand(&self, tool_path: &str) -> Result<XmlElementNode, GalaxyToolError> {
        expand_tool_from_xml_map(&self.sources, tool_path)
    }
}

pub fn expand_tool_from_xml_map(
    xml_by_path: &BTreeMap<String, String>,
    tool_path: &str,
) -> Result<XmlElementNode, GalaxyToolError> {
    let sources = load_sources(xml_by_path, tool_path)?;
    validate_import_graph(&sources)?;

    let tool_path = normalize_virtual_path(tool_path);
    let order = definition_order(&tool_path, &sources);
    let definitions = MacroDefinitions::collect(&order, &sources);
    log::debug!(
        "Expanding macros for \"{}\": {} files, {} xml macros, {} tokens.",
        tool_path,
        order.len(),
        definitions.xml.len(),
        definitions.tokens.len()
    );

    let Some(tool) = sources.get(&tool_path) else {
        return Err(GalaxyToolError::new(
            "MACRO_SOURCE_NOT_FOUND",
            format!("Tool source \"{}\" not found.", tool_path),
        ));
    };
    expand_tool_macros(&tool.root, &definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn expand_tool_from_xml_map_uses_imported_macros() {
        let files = map(&[
            (
                "bwa/bwa.xml",
                r#"<tool id="bwa" version="@TOOL_VERSION@">
  <macros>
    <import>macros.xml</import>
  </macros>
  <inputs>
    <expand macro="reference"/>
    <param name="threads" type="integer" value="1"/>
  </inputs>
  <outputs>
    <data name="out" format="bam"/>
  </outputs>
</tool>"#,
            ),
            (
                "bwa/macros.xml",
                r#"<macros>
  <token name="@TOOL_VERSION@">0.7.17</token>
  <xml name="reference">
    <conditional name="reference_source">
      <param name="reference_source_selector" type="select">
        <option value="cached">Built-in</option>
        <option value="history">History</option>
      </param>
    </conditional>
  </xml>
</macros>"#,
            ),
        ]);

        let expander = SourceMapExpander::new(files);
        let root = expander.expand("bwa/bwa.xml").expect("expand should pass");
        assert_eq!(root.attribute("version"), Some("0.7.17"));
        assert!(root.children_named("macros").next().is_none());
        let inputs = root.children_named("inputs").next().expect("inputs");
        let names = inputs
            .element_children()
            .map(|child| child.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["conditional", "param"]);
    }

    #[test]
    fn expand_tool_from_xml_map_reports_import_cycles() {
        let files = map(&[
            (
                "tool.xml",
                r#"<tool><macros><import>a.xml</import></macros></tool>"#,
            ),
            ("a.xml", r#"<macros><import>b.xml</import></macros>"#),
            ("b.xml", r#"<macros><import>a.xml</import></macros>"#),
        ]);
        let error = expand_tool_from_xml_map(&files, "tool.xml").expect_err("cycle should fail");
        assert_eq!(error.code, "MACRO_IMPORT_CYCLE");
    }

    #[test]
    fn expand_tool_from_xml_map_reports_parse_errors() {
        let files = map(&[("tool.xml", "<tool>")]);
        let error = expand_tool_from_xml_map(&files, "tool.xml").expect_err("parse should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }
}
