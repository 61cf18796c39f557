//! Builds one `<test>` element per leaf of an [`InputTree`].

use gx_core::GalaxyToolError;
use gx_parser::{write_element, XmlElementNode};

use crate::constants::{
    AUTO_GEN_TEST_COMMENT, BOOLEAN, BOOLEAN_OPTIONS, COLLECTION, CONDITIONAL, DATA,
    EXPECT_NUM_OUTPUTS, NAME, OUTPUT, OUTPUT_COLLECTION, PARAM, REPEAT, SELECT, TEST, TEXT, TYPE,
    VALUE,
};
use crate::input_tree::{option_values, param_name, InputNode, InputNodeKind, InputTree, NodeId};
use crate::placeholder::{PlaceholderNumbering, TabstopAllocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetOptions {
    /// Spaces per nesting level.
    pub tab_size: usize,
    pub numbering: PlaceholderNumbering,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            numbering: PlaceholderNumbering::PerFragment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    Built(String),
    Degraded(GalaxyToolError),
}

impl FragmentOutcome {
    /// Text of the fragment; degraded fragments contribute nothing.
    pub fn into_text(self) -> String {
        match self {
            Self::Built(text) => text,
            Self::Degraded(_) => String::new(),
        }
    }
}

/// Fragments for every leaf in leaf order, joined by blank lines.
pub fn generate_test_cases(
    tree: &InputTree<'_>,
    outputs: &[&XmlElementNode],
    options: &SnippetOptions,
) -> String {
    let indent = " ".repeat(options.tab_size);
    let mut tabstops = TabstopAllocator::new();

    tree.leaves()
        .into_iter()
        .map(|leaf| {
            if options.numbering == PlaceholderNumbering::PerFragment {
                tabstops = TabstopAllocator::new();
            }
            match build_fragment(tree, leaf, outputs, &mut tabstops, &indent) {
                FragmentOutcome::Built(text) => text,
                FragmentOutcome::Degraded(error) => {
                    log::warn!(
                        "Skipping test case for input branch \"{}\": {}",
                        tree.node(leaf).name,
                        error
                    );
                    String::new()
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_fragment(
    tree: &InputTree<'_>,
    leaf: NodeId,
    outputs: &[&XmlElementNode],
    tabstops: &mut TabstopAllocator,
    indent: &str,
) -> FragmentOutcome {
    let test = build_test_element(tree, leaf, outputs, tabstops);
    match write_element(&test, indent) {
        Ok(text) => FragmentOutcome::Built(text),
        Err(error) => FragmentOutcome::Degraded(error),
    }
}

pub fn build_test_element(
    tree: &InputTree<'_>,
    leaf: NodeId,
    outputs: &[&XmlElementNode],
    tabstops: &mut TabstopAllocator,
) -> XmlElementNode {
    let mut test = XmlElementNode::synthetic(TEST);
    test.push_comment(AUTO_GEN_TEST_COMMENT);
    test.set_attribute(EXPECT_NUM_OUTPUTS, tabstops.next_plain());

    let path = tree
        .path(leaf)
        .into_iter()
        .map(|id| tree.node(id))
        .collect::<Vec<_>>();
    add_inputs(&path, &mut test, tabstops);
    add_outputs(outputs, &mut test, tabstops);
    test
}

/// Conditionals become the insertion point for the rest of the path; repeats
/// and plain groups leave it where it is.
fn add_inputs(
    path: &[&InputNode<'_>],
    parent: &mut XmlElementNode,
    tabstops: &mut TabstopAllocator,
) {
    let Some((node, rest)) = path.split_first() else {
        return;
    };

    match &node.kind {
        InputNodeKind::Conditional {
            option_param,
            option,
        } => {
            let mut conditional = XmlElementNode::synthetic(CONDITIONAL);
            conditional.set_attribute(NAME, node.name.as_str());
            conditional.push_element(build_param(option_param, Some(option.as_str()), tabstops));
            for param in &node.params {
                conditional.push_element(build_param(param, None, tabstops));
            }
            add_inputs(rest, &mut conditional, tabstops);
            parent.push_element(conditional);
        }
        InputNodeKind::Repeat { min } => {
            for _ in 0..*min {
                let mut repeat = XmlElementNode::synthetic(REPEAT);
                repeat.set_attribute(NAME, node.name.as_str());
                for param in &node.params {
                    repeat.push_element(build_param(param, None, tabstops));
                }
                parent.push_element(repeat);
            }
            add_inputs(rest, parent, tabstops);
        }
        InputNodeKind::Group => {
            for param in &node.params {
                parent.push_element(build_param(param, None, tabstops));
            }
            add_inputs(rest, parent, tabstops);
        }
    }
}

fn build_param(
    input_param: &XmlElementNode,
    value: Option<&str>,
    tabstops: &mut TabstopAllocator,
) -> XmlElementNode {
    let mut param = XmlElementNode::synthetic(PARAM);
    if let Some(name) = param_name(input_param) {
        param.set_attribute(NAME, name);
    }

    let value = match value.filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => match input_param.attribute(TYPE) {
            Some(BOOLEAN) => tabstops.next_choice(&BOOLEAN_OPTIONS),
            Some(SELECT) | Some(TEXT) => {
                let options = option_values(input_param).collect::<Vec<_>>();
                tabstops.next_choice(&options)
            }
            _ => tabstops.next_plain(),
        },
    };
    param.set_attribute(VALUE, value);
    param
}

fn add_outputs(
    outputs: &[&XmlElementNode],
    test: &mut XmlElementNode,
    tabstops: &mut TabstopAllocator,
) {
    for output in outputs {
        let Some(name) = output.attribute(NAME).filter(|name| !name.is_empty()) else {
            continue;
        };
        let mut element = match output.name.as_str() {
            DATA => XmlElementNode::synthetic(OUTPUT),
            COLLECTION => {
                let mut element = XmlElementNode::synthetic(OUTPUT_COLLECTION);
                if let Some(collection_type) = output.attribute(TYPE) {
                    element.set_attribute(TYPE, collection_type);
                }
                element
            }
            _ => continue,
        };
        element.set_attribute(NAME, name);
        element.push_text(tabstops.next_plain());
        test.push_element(element);
    }
}
