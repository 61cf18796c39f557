use std::collections::{BTreeMap, HashMap};

use gx_core::GalaxyToolError;

use crate::source_parse::SourceFile;

pub(crate) fn validate_import_graph(
    sources: &BTreeMap<String, SourceFile>,
) -> Result<(), GalaxyToolError> {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum State {
        Visiting,
        Done,
    }

    fn dfs(
        node: &str,
        sources: &BTreeMap<String, SourceFile>,
        states: &mut HashMap<String, State>,
        stack: &mut Vec<String>,
    ) -> Result<(), GalaxyToolError> {
        if let Some(state) = states.get(node) {
            if *state == State::Visiting {
                stack.push(node.to_string());
                let cycle = stack.join(" -> ");
                return Err(GalaxyToolError::new(
                    "MACRO_IMPORT_CYCLE",
                    format!("Macro import cycle detected: {}", cycle),
                ));
            }
            return Ok(());
        }

        states.insert(node.to_string(), State::Visiting);
        stack.push(node.to_string());

        if let Some(source) = sources.get(node) {
            for import in &source.imports {
                dfs(import, sources, states, stack)?;
            }
        }

        stack.pop();
        states.insert(node.to_string(), State::Done);
        Ok(())
    }

    let mut states: HashMap<String, State> = HashMap::new();
    for file_path in sources.keys() {
        dfs(file_path, sources, &mut states, &mut Vec::new())?;
    }

    Ok(())
}

/// Files in definition order: imports before their importer, each file once.
pub(crate) fn definition_order(start: &str, sources: &BTreeMap<String, SourceFile>) -> Vec<String> {
    fn visit(
        node: &str,
        sources: &BTreeMap<String, SourceFile>,
        seen: &mut Vec<String>,
        order: &mut Vec<String>,
    ) {
        if seen.iter().any(|entry| entry == node) {
            return;
        }
        seen.push(node.to_string());
        if let Some(source) = sources.get(node) {
            for import in &source.imports {
                visit(import, sources, seen, order);
            }
        }
        order.push(node.to_string());
    }

    let mut order = Vec::new();
    visit(start, sources, &mut Vec::new(), &mut order);
    order
}

#[cfg(test)]
mod import_graph_tests {
    use super::*;
    use gx_parser::XmlElementNode;

    fn source(imports: &[&str]) -> SourceFile {
        SourceFile {
            imports: imports.iter().map(|entry| entry.to_string()).collect(),
            root: XmlElementNode::synthetic("macros"),
        }
    }

    #[test]
    fn validate_import_graph_reports_cycles() {
        let sources = BTreeMap::from([
            ("a.xml".to_string(), source(&["b.xml"])),
            ("b.xml".to_string(), source(&["a.xml"])),
        ]);
        let error = validate_import_graph(&sources).expect_err("cycle should fail");
        assert_eq!(error.code, "MACRO_IMPORT_CYCLE");
        assert!(error.message.contains("a.xml -> b.xml -> a.xml"));
    }

    #[test]
    fn definition_order_places_imports_first() {
        let sources = BTreeMap::from([
            ("tool.xml".to_string(), source(&["m1.xml", "m2.xml"])),
            ("m1.xml".to_string(), source(&["shared.xml"])),
            ("m2.xml".to_string(), source(&["shared.xml"])),
            ("shared.xml".to_string(), source(&[])),
        ]);
        validate_import_graph(&sources).expect("graph is acyclic");
        assert_eq!(
            definition_order("tool.xml", &sources),
            vec!["shared.xml", "m1.xml", "m2.xml", "tool.xml"]
        );
    }
}
