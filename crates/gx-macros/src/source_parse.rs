use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use gx_core::GalaxyToolError;
use gx_parser::{parse_xml_document, XmlElementNode};

#[derive(Debug, Clone)]
pub(crate) struct SourceFile {
    pub(crate) imports: Vec<String>,
    pub(crate) root: XmlElementNode,
}

/// Parses `tool_path` and every macro file reachable from it through
/// `<import>` directives.
pub(crate) fn load_sources(
    xml_by_path: &BTreeMap<String, String>,
    tool_path: &str,
) -> Result<BTreeMap<String, SourceFile>, GalaxyToolError> {
    let by_normalized_path = xml_by_path
        .iter()
        .map(|(path, text)| (normalize_virtual_path(path), text))
        .collect::<BTreeMap<_, _>>();

    let tool_path = normalize_virtual_path(tool_path);
    let mut sources = BTreeMap::new();
    let mut pending = VecDeque::from([(tool_path, None::<String>)]);

    while let Some((file_path, imported_by)) = pending.pop_front() {
        if sources.contains_key(&file_path) {
            continue;
        }

        let Some(source_text) = by_normalized_path.get(&file_path) else {
            return Err(match imported_by {
                Some(importer) => GalaxyToolError::new(
                    "MACRO_IMPORT_NOT_FOUND",
                    format!(
                        "Import \"{}\" referenced by \"{}\" not found.",
                        file_path, importer
                    ),
                ),
                None => GalaxyToolError::new(
                    "MACRO_SOURCE_NOT_FOUND",
                    format!("Tool source \"{}\" not found.", file_path),
                ),
            });
        };

        let document = parse_xml_document(source_text)?;
        if imported_by.is_some() && document.root.name != "macros" {
            return Err(GalaxyToolError::with_span(
                "MACRO_IMPORT_ROOT_INVALID",
                format!(
                    "Expected <macros> root in imported file \"{}\", got <{}>.",
                    file_path, document.root.name
                ),
                document.root.location.clone(),
            ));
        }

        let imports = parse_import_directives(&document.root)
            .into_iter()
            .map(|import| resolve_import_path(&file_path, &import))
            .collect::<Vec<_>>();
        for import in &imports {
            pending.push_back((import.clone(), Some(file_path.clone())));
        }

        sources.insert(
            file_path,
            SourceFile {
                imports,
                root: document.root,
            },
        );
    }

    Ok(sources)
}

/// `<import>` entries of a tool's `<macros>` section, or of a macros file root.
pub(crate) fn parse_import_directives(root: &XmlElementNode) -> Vec<String> {
    macro_sections(root)
        .flat_map(|section| section.children_named("import"))
        .map(|import| import.text_content().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Elements holding macro definitions: the root itself for a macros file,
/// otherwise its `<macros>` children.
pub(crate) fn macro_sections(
    root: &XmlElementNode,
) -> Box<dyn Iterator<Item = &XmlElementNode> + '_> {
    if root.name == "macros" {
        Box::new(std::iter::once(root))
    } else {
        Box::new(root.children_named("macros"))
    }
}

pub(crate) fn resolve_import_path(current_path: &str, import: &str) -> String {
    let parent = match Path::new(current_path).parent() {
        Some(parent) => parent,
        None => Path::new(""),
    };
    let joined = if import.starts_with('/') {
        PathBuf::from(import)
    } else {
        parent.join(import)
    };
    normalize_virtual_path(joined.to_string_lossy().as_ref())
}

pub(crate) fn normalize_virtual_path(path: &str) -> String {
    let mut stack: Vec<String> = Vec::new();
    for part in path.replace('\\', "/").split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            if !stack.is_empty() {
                stack.pop();
            }
            continue;
        }
        stack.push(part.to_string());
    }
    stack.join("/")
}

#[cfg(test)]
mod source_parse_tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn path_helpers_cover_common_cases() {
        assert_eq!(
            resolve_import_path("tools/bwa/bwa.xml", "../shared/macros.xml"),
            "tools/shared/macros.xml"
        );
        assert_eq!(resolve_import_path("/", "macros.xml"), "macros.xml");
        assert_eq!(
            normalize_virtual_path("./a/./b/../c\\d.xml"),
            "a/c/d.xml"
        );
    }

    #[test]
    fn load_sources_follows_imports_transitively() {
        let files = map(&[
            (
                "tool/tool.xml",
                r#"<tool><macros><import>macros.xml</import></macros></tool>"#,
            ),
            (
                "tool/macros.xml",
                r#"<macros><import>../shared/common.xml</import></macros>"#,
            ),
            ("shared/common.xml", r#"<macros><token name="@V@">1</token></macros>"#),
            ("unrelated.xml", "<broken"),
        ]);

        let sources = load_sources(&files, "tool/tool.xml").expect("sources should load");
        assert_eq!(sources.len(), 3);
        assert_eq!(
            sources.get("tool/tool.xml").map(|source| source.imports.clone()),
            Some(vec!["tool/macros.xml".to_string()])
        );
        assert!(sources.contains_key("shared/common.xml"));
    }

    #[test]
    fn load_sources_reports_missing_import_and_missing_tool() {
        let files = map(&[(
            "tool.xml",
            r#"<tool><macros><import>missing.xml</import></macros></tool>"#,
        )]);
        let error = load_sources(&files, "tool.xml").expect_err("missing import should fail");
        assert_eq!(error.code, "MACRO_IMPORT_NOT_FOUND");

        let error = load_sources(&files, "other.xml").expect_err("missing tool should fail");
        assert_eq!(error.code, "MACRO_SOURCE_NOT_FOUND");
    }

    #[test]
    fn load_sources_rejects_imported_non_macros_root() {
        let files = map(&[
            (
                "tool.xml",
                r#"<tool><macros><import>other.xml</import></macros></tool>"#,
            ),
            ("other.xml", "<tool/>"),
        ]);
        let error = load_sources(&files, "tool.xml").expect_err("root should be checked");
        assert_eq!(error.code, "MACRO_IMPORT_ROOT_INVALID");
    }

    #[test]
    fn parse_import_directives_skips_blank_entries() {
        let document = parse_xml_document(
            r#"<tool><macros><import> a.xml </import><import>  </import><xml name="x"/></macros></tool>"#,
        )
        .expect("parse");
        assert_eq!(parse_import_directives(&document.root), vec!["a.xml".to_string()]);
    }
}
