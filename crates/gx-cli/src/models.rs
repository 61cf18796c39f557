use std::collections::BTreeMap;

use gx_testgen::GalaxyToolDocument;

/// A tool file together with every XML file its macros may import.
#[derive(Debug, Clone)]
pub(crate) struct LoadedTool {
    pub(crate) document: GalaxyToolDocument,
    /// Relative path to XML text, keyed like `document.path()`.
    pub(crate) sources: BTreeMap<String, String>,
}
