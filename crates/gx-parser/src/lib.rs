mod writer;
mod xml;

pub use writer::write_element;
pub use xml::{
    find_element, parse_xml_document, XmlDocument, XmlElementNode, XmlNode, XmlTextNode,
};
