use gx_core::GalaxyToolError;

use crate::{XmlElementNode, XmlNode};

/// Serializes `element` as indented markup, one nesting level per `indent`.
/// The result always ends with a newline.
pub fn write_element(element: &XmlElementNode, indent: &str) -> Result<String, GalaxyToolError> {
    let mut out = String::new();
    write_node(element, indent, 0, &mut out)?;
    Ok(out)
}

fn write_node(
    element: &XmlElementNode,
    indent: &str,
    depth: usize,
    out: &mut String,
) -> Result<(), GalaxyToolError> {
    validate_name(&element.name)?;
    let padding = indent.repeat(depth);

    out.push_str(&padding);
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        validate_name(name)?;
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value, true)?);
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>\n");
        return Ok(());
    }

    let inline = element
        .children
        .iter()
        .all(|child| matches!(child, XmlNode::Text(_)));
    if inline {
        out.push('>');
        out.push_str(&escape(&element.text_content(), false)?);
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
        return Ok(());
    }

    out.push_str(">\n");
    let child_padding = indent.repeat(depth + 1);
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_node(child, indent, depth + 1, out)?,
            XmlNode::Text(text) => {
                let trimmed = text.value.trim();
                if trimmed.is_empty() {
                    continue;
                }
                out.push_str(&child_padding);
                out.push_str(&escape(trimmed, false)?);
                out.push('\n');
            }
            XmlNode::Comment(comment) => {
                if comment.contains("--") || comment.ends_with('-') {
                    return Err(GalaxyToolError::new(
                        "XML_WRITE_INVALID_COMMENT",
                        format!("Comment \"{}\" cannot contain \"--\".", comment),
                    ));
                }
                out.push_str(&child_padding);
                out.push_str("<!--");
                out.push_str(&escape(comment, false)?);
                out.push_str("-->\n");
            }
        }
    }
    out.push_str(&padding);
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
    Ok(())
}

fn validate_name(name: &str) -> Result<(), GalaxyToolError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_' || ch == ':');
    if valid_start
        && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | ':' | '-' | '.'))
    {
        return Ok(());
    }
    Err(GalaxyToolError::new(
        "XML_WRITE_INVALID_NAME",
        format!("\"{}\" is not a valid XML name.", name),
    ))
}

fn escape(raw: &str, in_attribute: bool) -> Result<String, GalaxyToolError> {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\t' if in_attribute => out.push_str("&#9;"),
            '\n' if in_attribute => out.push_str("&#10;"),
            '\r' if in_attribute => out.push_str("&#13;"),
            '\t' | '\n' | '\r' => out.push(ch),
            ch if ch.is_control() => {
                return Err(GalaxyToolError::new(
                    "XML_WRITE_INVALID_CHAR",
                    format!("Character U+{:04X} is not allowed in XML.", ch as u32),
                ))
            }
            ch => out.push(ch),
        }
    }
    Ok(out)
}
