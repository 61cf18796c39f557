mod constants;
mod input_tree;
mod placeholder;
mod snippet;
mod tool_document;

pub use constants::AUTO_GEN_TEST_COMMENT;
pub use input_tree::{
    option_values, param_name, InputKindSummary, InputNode, InputNodeKind, InputNodeSummary,
    InputTree, NodeId, MAX_REPEAT_MIN,
};
pub use placeholder::{PlaceholderNumbering, TabstopAllocator};
pub use snippet::{
    build_fragment, build_test_element, generate_test_cases, FragmentOutcome, SnippetOptions,
};
pub use tool_document::{GalaxyToolDocument, DEFAULT_FIND_DEPTH};

use gx_macros::MacroExpander;

/// Generates `<test>` snippets from the inputs and outputs a tool already
/// declares. Macros are expanded first when possible.
#[derive(Debug, Clone)]
pub struct TestSnippetGenerator {
    document: GalaxyToolDocument,
}

impl TestSnippetGenerator {
    /// When `document` uses macros and an expander is given, the expanded
    /// document is used; if expansion fails the original one is kept.
    pub fn new(document: GalaxyToolDocument, expander: Option<&dyn MacroExpander>) -> Self {
        let document = match expander {
            Some(expander) if document.uses_macros() => match document.expand_macros(expander) {
                Ok(expanded) => expanded,
                Err(error) => {
                    log::warn!(
                        "Macro expansion failed for \"{}\", using the unexpanded tool: {}",
                        document.path(),
                        error
                    );
                    document
                }
            },
            _ => document,
        };
        Self { document }
    }

    pub fn document(&self) -> &GalaxyToolDocument {
        &self.document
    }

    pub fn input_tree(&self) -> InputTree<'_> {
        self.document.analyze_inputs()
    }

    pub fn generate_test_suite_snippet(&self, options: &SnippetOptions) -> String {
        let input_tree = self.input_tree();
        log::debug!(
            "Input tree of \"{}\":\n{}",
            self.document.path(),
            input_tree.render()
        );
        let outputs = self.document.get_outputs();
        generate_test_cases(&input_tree, &outputs, options)
    }
}

pub fn generate_test_suite_snippet(
    document: GalaxyToolDocument,
    expander: Option<&dyn MacroExpander>,
    options: &SnippetOptions,
) -> String {
    TestSnippetGenerator::new(document, expander).generate_test_suite_snippet(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    use gx_core::GalaxyToolError;
    use gx_macros::SourceMapExpander;
    use gx_parser::XmlElementNode;

    struct FailingExpander;

    impl MacroExpander for FailingExpander {
        fn expand(&self, tool_path: &str) -> Result<XmlElementNode, GalaxyToolError> {
            Err(GalaxyToolError::new(
                "MACRO_SOURCE_NOT_FOUND",
                format!("Tool source \"{}\" not found.", tool_path),
            ))
        }
    }

    fn count_tests(snippet: &str) -> usize {
        snippet.matches("<test ").count()
    }

    #[test]
    fn descriptor_without_branches_yields_one_fragment() {
        let document = GalaxyToolDocument::parse(
            "plain.xml",
            r#"<tool id="plain">
  <inputs>
    <param name="a" type="integer"/>
    <param name="b" type="boolean"/>
  </inputs>
  <outputs><data name="out" format="txt"/></outputs>
</tool>"#,
        )
        .expect("parse");
        let generator = TestSnippetGenerator::new(document, None);
        assert_eq!(generator.input_tree().leaves().len(), 1);

        let snippet = generator.generate_test_suite_snippet(&SnippetOptions::default());
        assert_eq!(count_tests(&snippet), 1);
        assert!(snippet.contains(r#"<param name="b" value="${3|true,false|}"/>"#));
    }

    #[test]
    fn descriptor_without_inputs_still_yields_one_fragment() {
        let document = GalaxyToolDocument::parse(
            "bare.xml",
            r#"<tool id="bare"><outputs><data name="out"/></outputs></tool>"#,
        )
        .expect("parse");
        let snippet = generate_test_suite_snippet(document, None, &SnippetOptions::default());
        assert_eq!(
            snippet,
            r#"<test expect_num_outputs="$1">
    <!--TODO: auto-generated test case. Please fill in the required values-->
    <output name="out">$2</output>
</test>
"#
        );
    }

    #[test]
    fn macro_expansion_failure_falls_back_to_original_document() {
        let document = GalaxyToolDocument::parse(
            "tool.xml",
            r#"<tool id="t">
  <macros><import>missing.xml</import></macros>
  <expand macro="requirements"/>
  <inputs>
    <param name="threshold" type="float"/>
  </inputs>
  <outputs><data name="out" format="txt"/></outputs>
</tool>"#,
        )
        .expect("parse");

        let failing = FailingExpander;
        let generator = TestSnippetGenerator::new(document.clone(), Some(&failing));
        assert_eq!(generator.document(), &document);
        let snippet = generator.generate_test_suite_snippet(&SnippetOptions::default());
        assert_eq!(count_tests(&snippet), 1);
        assert!(snippet.contains(r#"<param name="threshold" value="$2"/>"#));

        let sources = BTreeMap::from([("tool.xml".to_string(), String::new())]);
        let expander = SourceMapExpander::new(sources);
        let snippet = generate_test_suite_snippet(
            document,
            Some(&expander),
            &SnippetOptions::default(),
        );
        assert_eq!(count_tests(&snippet), 1);
    }

    #[test]
    fn macro_expansion_feeds_expanded_inputs_to_the_generator() {
        let tool = r#"<tool id="t">
  <macros>
    <import>macros.xml</import>
  </macros>
  <inputs>
    <expand macro="mode"/>
  </inputs>
</tool>"#;
        let macros = r#"<macros>
  <xml name="mode">
    <conditional name="mode">
      <param name="mode" type="select">
        <option value="fast"/>
        <option value="slow"/>
      </param>
    </conditional>
  </xml>
</macros>"#;
        let sources = BTreeMap::from([
            ("tool.xml".to_string(), tool.to_string()),
            ("macros.xml".to_string(), macros.to_string()),
        ]);
        let document = GalaxyToolDocument::parse("tool.xml", tool).expect("parse");
        let expander = SourceMapExpander::new(sources);
        let generator = TestSnippetGenerator::new(document, Some(&expander));

        assert_eq!(generator.input_tree().leaves().len(), 2);
        let snippet = generator.generate_test_suite_snippet(&SnippetOptions::default());
        assert_eq!(count_tests(&snippet), 2);
        assert!(snippet.contains(r#"<param name="mode" value="slow"/>"#));
    }

    #[test]
    fn demo_tools_generate_snippets() {
        let root = gx_test_example::tools_root();
        let tool_path = root.join("threshold-mode").join("tool.xml");
        let source = fs::read_to_string(&tool_path).expect("demo tool should exist");
        let document = GalaxyToolDocument::parse("tool.xml", &source).expect("parse");
        assert!(document.is_valid());

        let snippet = generate_test_suite_snippet(document, None, &SnippetOptions::default());
        assert_eq!(count_tests(&snippet), 2);
        assert!(snippet.contains(r#"<param name="mode" value="fast"/>"#));
        assert!(snippet.contains(r#"<output name="result">$3</output>"#));
    }
}
