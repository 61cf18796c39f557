//! Tree of the branching structure declared under a tool's `<inputs>`.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Every node
//! borrows the descriptor elements it was built from; the tree never owns or
//! mutates them. Each leaf's root-to-leaf path is one combination of
//! conditional branches.

use serde::Serialize;

use gx_parser::XmlElementNode;

use crate::constants::{
    CONDITIONAL, INPUTS, MIN, NAME, OPTION, PARAM, REPEAT, SELECT, TYPE, VALUE, WHEN,
};

/// Upper bound on the instances emitted for one `<repeat>`.
pub const MAX_REPEAT_MIN: usize = 100;

/// Handle to a node of an [`InputTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputNodeKind<'a> {
    /// The `<inputs>` root or another plain group level.
    Group,
    /// One option of a `<conditional>` whose discriminator is a select.
    Conditional {
        option_param: &'a XmlElementNode,
        option: String,
    },
    Repeat {
        min: usize,
    },
}

#[derive(Debug, Clone)]
pub struct InputNode<'a> {
    pub name: String,
    pub kind: InputNodeKind<'a>,
    pub element: Option<&'a XmlElementNode>,
    pub params: Vec<&'a XmlElementNode>,
    pub repeats: Vec<NodeId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<'a> InputNode<'a> {
    fn new(
        name: impl Into<String>,
        kind: InputNodeKind<'a>,
        element: Option<&'a XmlElementNode>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            element,
            params: Vec::new(),
            repeats: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Conditional branches first, then repeats, each in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InputTree<'a> {
    nodes: Vec<InputNode<'a>>,
    root: NodeId,
}

impl<'a> InputTree<'a> {
    /// Builds the tree for an `<inputs>` element. A missing element yields a
    /// tree whose root is its only leaf.
    pub fn build(inputs: Option<&'a XmlElementNode>) -> Self {
        let mut tree = Self {
            nodes: vec![InputNode::new(INPUTS, InputNodeKind::Group, inputs)],
            root: NodeId::from_index(0),
        };
        if let Some(inputs) = inputs {
            tree.build_group(inputs, tree.root);
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &InputNode<'a> {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaves in depth-first, declaration order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf() {
                leaves.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        leaves
    }

    /// Node ids from the root down to `id`, both included.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    fn push_node(&mut self, mut node: InputNode<'a>, parent: NodeId) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn build_group(&mut self, group: &'a XmlElementNode, parent: NodeId) {
        self.nodes[parent.index()].params = group.children_named(PARAM).collect();

        for conditional in group.children_named(CONDITIONAL) {
            self.build_conditional(conditional, parent);
        }

        for repeat in group.children_named(REPEAT) {
            if let Some(repeat_id) = self.build_repeat(repeat, parent) {
                self.nodes[parent.index()].repeats.push(repeat_id);
            }
        }
    }

    fn build_conditional(&mut self, conditional: &'a XmlElementNode, parent: NodeId) {
        let Some(name) = conditional.attribute(NAME).filter(|name| !name.is_empty()) else {
            log::debug!("Skipping <conditional> without a name.");
            return;
        };
        let Some(option_param) = conditional.first_element_child() else {
            log::debug!("Skipping conditional \"{}\": no discriminator parameter.", name);
            return;
        };
        if param_name(option_param).is_none() {
            log::debug!("Skipping conditional \"{}\": discriminator has no name.", name);
            return;
        }
        if option_param.attribute(TYPE) != Some(SELECT) {
            log::debug!(
                "Conditional \"{}\" has a {} discriminator; branches are not enumerated.",
                name,
                option_param.attribute(TYPE).unwrap_or("untyped")
            );
            return;
        }

        for option in option_values(option_param) {
            let when = conditional
                .children_named(WHEN)
                .find(|when| when.attribute(VALUE) == Some(option));
            let node = InputNode::new(
                name,
                InputNodeKind::Conditional {
                    option_param,
                    option: option.to_string(),
                },
                Some(conditional),
            );
            let conditional_id = self.push_node(node, parent);
            if let Some(when) = when {
                self.build_group(when, conditional_id);
            }
        }
    }

    fn build_repeat(&mut self, repeat: &'a XmlElementNode, parent: NodeId) -> Option<NodeId> {
        let Some(name) = repeat.attribute(NAME).filter(|name| !name.is_empty()) else {
            log::debug!("Skipping <repeat> without a name.");
            return None;
        };
        let mut min = repeat
            .attribute(MIN)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(1);
        if min > MAX_REPEAT_MIN {
            log::warn!(
                "Repeat \"{}\" declares min {}; emitting {} instances.",
                name,
                min,
                MAX_REPEAT_MIN
            );
            min = MAX_REPEAT_MIN;
        }

        let node = InputNode::new(name, InputNodeKind::Repeat { min }, Some(repeat));
        let repeat_id = self.push_node(node, parent);
        self.build_group(repeat, repeat_id);
        Some(repeat_id)
    }

    /// Box-drawing rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, "", "", &mut out);
        out
    }

    fn render_node(&self, id: NodeId, lead: &str, child_lead: &str, out: &mut String) {
        let node = self.node(id);
        out.push_str(lead);
        out.push_str(&node_label(node));
        out.push('\n');

        let count = node.children.len();
        for (position, child) in node.children.iter().enumerate() {
            let last = position + 1 == count;
            let (branch, next) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            self.render_node(
                *child,
                &format!("{}{}", child_lead, branch),
                &format!("{}{}", child_lead, next),
                out,
            );
        }
    }

    pub fn summary(&self) -> InputNodeSummary {
        self.summarize(self.root)
    }

    fn summarize(&self, id: NodeId) -> InputNodeSummary {
        let node = self.node(id);
        InputNodeSummary {
            name: node.name.clone(),
            kind: match &node.kind {
                InputNodeKind::Group => InputKindSummary::Group,
                InputNodeKind::Conditional { option, .. } => InputKindSummary::Conditional {
                    option: option.clone(),
                },
                InputNodeKind::Repeat { min } => InputKindSummary::Repeat { min: *min },
            },
            params: node
                .params
                .iter()
                .filter_map(|param| param_name(param))
                .collect(),
            children: node
                .children
                .iter()
                .map(|child| self.summarize(*child))
                .collect(),
        }
    }
}

fn node_label(node: &InputNode<'_>) -> String {
    match &node.kind {
        InputNodeKind::Group => node.name.clone(),
        InputNodeKind::Conditional { option, .. } => format!("{} = {}", node.name, option),
        InputNodeKind::Repeat { min } => format!("{} (repeat, min {})", node.name, min),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNodeSummary {
    pub name: String,
    #[serde(flatten)]
    pub kind: InputKindSummary,
    pub params: Vec<String>,
    pub children: Vec<InputNodeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputKindSummary {
    Group,
    Conditional { option: String },
    Repeat { min: usize },
}

/// Name a parameter is addressed by: its `name`, or else its `argument`
/// with leading dashes dropped and inner dashes turned into underscores.
pub fn param_name(param: &XmlElementNode) -> Option<String> {
    if let Some(name) = param.attribute(NAME).filter(|name| !name.is_empty()) {
        return Some(name.to_string());
    }
    param
        .attribute("argument")
        .map(|argument| argument.trim_start_matches('-').replace('-', "_"))
        .filter(|name| !name.is_empty())
}

/// Non-empty `value`s of a parameter's direct `<option>` children.
pub fn option_values(param: &XmlElementNode) -> impl Iterator<Item = &str> {
    param
        .children_named(OPTION)
        .filter_map(|option| option.attribute(VALUE))
        .filter(|value| !value.is_empty())
}
