use gx_core::{DocumentType, GalaxyToolError};
use gx_macros::MacroExpander;
use gx_parser::{find_element, parse_xml_document, XmlDocument, XmlElementNode};

use crate::constants::{INPUTS, OUTPUTS};
use crate::input_tree::InputTree;

/// `<inputs>` and `<outputs>` sit directly under the `<tool>` root.
pub const DEFAULT_FIND_DEPTH: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyToolDocument {
    path: String,
    document: XmlDocument,
}

impl GalaxyToolDocument {
    pub fn parse(path: impl Into<String>, source: &str) -> Result<Self, GalaxyToolError> {
        Ok(Self {
            path: path.into(),
            document: parse_xml_document(source)?,
        })
    }

    pub fn from_root(path: impl Into<String>, root: XmlElementNode) -> Self {
        Self {
            path: path.into(),
            document: XmlDocument { root },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> &XmlElementNode {
        &self.document.root
    }

    pub fn document_type(&self) -> DocumentType {
        self.document.document_type()
    }

    /// True for Galaxy tool wrappers.
    pub fn is_valid(&self) -> bool {
        self.document_type() == DocumentType::Tool
    }

    /// True when the tool contains `<expand>` elements.
    pub fn uses_macros(&self) -> bool {
        self.document.uses_macros()
    }

    pub fn find_element(&self, name: &str) -> Option<&XmlElementNode> {
        find_element(&self.document.root, name, DEFAULT_FIND_DEPTH)
    }

    pub fn analyze_inputs(&self) -> InputTree<'_> {
        InputTree::build(self.find_element(INPUTS))
    }

    pub fn get_outputs(&self) -> Vec<&XmlElementNode> {
        match self.find_element(OUTPUTS) {
            Some(outputs) => outputs.element_children().collect(),
            None => Vec::new(),
        }
    }

    /// Document with every macro inlined by `expander`.
    pub fn expand_macros(&self, expander: &dyn MacroExpander) -> Result<Self, GalaxyToolError> {
        let root = expander.expand(&self.path)?;
        Ok(Self::from_root(self.path.clone(), root))
    }
}
