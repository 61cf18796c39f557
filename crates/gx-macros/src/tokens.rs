use std::collections::BTreeMap;
use std::sync::OnceLock;

use gx_parser::{XmlElementNode, XmlNode, XmlTextNode};
use regex::{Captures, Regex};

fn token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"@[A-Za-z0-9_]+@").expect("token regex must compile"))
}

/// Replaces every known `@NAME@` token in `raw`; unknown tokens stay as written.
pub(crate) fn substitute_text(raw: &str, tokens: &BTreeMap<String, String>) -> String {
    if tokens.is_empty() || !raw.contains('@') {
        return raw.to_string();
    }
    token_regex()
        .replace_all(raw, |caps: &Captures<'_>| {
            tokens
                .get(&caps[0])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub(crate) fn substitute_node(node: &XmlNode, tokens: &BTreeMap<String, String>) -> XmlNode {
    match node {
        XmlNode::Element(element) => XmlNode::Element(substitute_element(element, tokens)),
        XmlNode::Text(text) => XmlNode::Text(XmlTextNode {
            value: substitute_text(&text.value, tokens),
            location: text.location.clone(),
        }),
        XmlNode::Comment(comment) => XmlNode::Comment(comment.clone()),
    }
}

pub(crate) fn substitute_element(
    element: &XmlElementNode,
    tokens: &BTreeMap<String, String>,
) -> XmlElementNode {
    XmlElementNode {
        name: element.name.clone(),
        attributes: element
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), substitute_text(value, tokens)))
            .collect(),
        children: element
            .children
            .iter()
            .map(|child| substitute_node(child, tokens))
            .collect(),
        location: element.location.clone(),
    }
}

#[cfg(test)]
mod tokens_tests {
    use super::*;
    use gx_parser::parse_xml_document;

    fn tokens(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn substitute_text_replaces_known_tokens_only() {
        let map = tokens(&[("@VERSION@", "1.0"), ("@SUFFIX@", "galaxy0")]);
        assert_eq!(
            substitute_text("@VERSION@+@SUFFIX@ @OTHER@", &map),
            "1.0+galaxy0 @OTHER@"
        );
        assert_eq!(substitute_text("plain", &map), "plain");
    }

    #[test]
    fn substitute_element_walks_attributes_and_text() {
        let document = parse_xml_document(
            r#"<tool version="@VERSION@"><requirement>samtools @VERSION@</requirement></tool>"#,
        )
        .expect("parse");
        let substituted = substitute_element(&document.root, &tokens(&[("@VERSION@", "1.9")]));
        assert_eq!(substituted.attribute("version"), Some("1.9"));
        let requirement = substituted.first_element_child().expect("requirement");
        assert_eq!(requirement.text_content(), "samtools 1.9");
    }
}
