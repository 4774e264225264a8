//! Shared XML helpers
//!
//! Attribute lookup on streaming events, escaping for hand-built markup,
//! and [`XmlElement`], a small owned element tree for parts that are
//! easier to interpret as a whole (slides, layouts) than as a stream.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Get an attribute by its exact qualified name (e.g. `w:val`)
pub fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Get an attribute by qualified name, falling back to its local name
/// under any prefix (`r:embed` also matches `rel:embed`)
pub fn get_attr_with_ns(e: &BytesStart, name: &[u8]) -> Option<String> {
    let local = local_part(name);
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| {
            let key = a.key.as_ref();
            key == name || (key.contains(&b':') && local_part(key) == local)
        })
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn local_part(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

/// Escape the five XML special characters
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A node of an [`XmlElement`] tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An owned XML element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified name as written (`p:sp`)
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a document and return its root element.
    ///
    /// Whitespace-only text between elements is dropped; text inside
    /// elements that also hold other text is kept verbatim.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => stack.push(Self::from_start(e)),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::malformed("unbalanced end tag"))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().unwrap_or_default();
                        if !text.trim().is_empty() || parent.name.ends_with(":t") {
                            parent.children.push(XmlNode::Text(text.into_owned()));
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OoxmlError::Malformed(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        root.ok_or_else(|| OoxmlError::malformed("document has no root element"))
    }

    fn from_start(e: &BytesStart) -> Self {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attributes = e
            .attributes()
            .filter_map(|a| a.ok())
            .map(|a| {
                let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                let value = match a.unescape_value() {
                    Ok(v) => v.into_owned(),
                    Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
                };
                (key, value)
            })
            .collect();
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute by qualified name, or by local name when `name` has no prefix
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| {
                if name.contains(':') {
                    return None;
                }
                self.attributes
                    .iter()
                    .find(|(key, _)| key.split_once(':').map(|(_, l)| l) == Some(name))
            })
            .map(|(_, value)| value.as_str())
    }

    /// Attribute parsed as a number
    pub fn attr_parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local))
    }

    /// Child elements with the given local name
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.is(local))
    }

    /// Follow a path of local names through first matching children
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, local| element.child(local))
    }

    /// All descendant elements with the given local name, depth first
    pub fn descendants<'a>(&'a self, local: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.is(local) {
                found.push(child);
            }
            child.collect_descendants(local, found);
        }
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    /// `xmlns` declarations made on this element
    pub fn namespace_declarations(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .filter(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"))
            .cloned()
            .collect()
    }

    /// Serialize the element and its subtree
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, &[]);
        out
    }

    /// Serialize, declaring on the root any of `namespaces` that the root
    /// does not declare itself. Used to lift a fragment out of its document.
    pub fn to_xml_with_namespaces(&self, namespaces: &[(String, String)]) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, namespaces);
        out
    }

    fn write_xml(&self, out: &mut String, extra_namespaces: &[(String, String)]) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in extra_namespaces {
            if self.attributes.iter().any(|(k, _)| k == key) {
                continue;
            }
            out.push_str(&format!(r#" {}="{}""#, key, escape_xml(value)));
        }
        for (key, value) in &self.attributes {
            out.push_str(&format!(r#" {}="{}""#, key, escape_xml(value)));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(&escape_xml(t)),
                XmlNode::Element(e) => e.write_xml(out, &[]),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_attr_variants() {
        let xml = br#"<a:blip r:embed="rId4" cstate="print"/>"#;
        let mut reader = Reader::from_reader(&xml[..]);
        let mut buf = Vec::new();
        let event = reader.read_event_into(&mut buf).unwrap();
        let Event::Empty(e) = event else {
            panic!("expected empty element");
        };

        assert_eq!(get_attr(&e, b"r:embed").as_deref(), Some("rId4"));
        assert_eq!(get_attr(&e, b"embed"), None);
        assert_eq!(get_attr_with_ns(&e, b"rel:embed").as_deref(), Some("rId4"));
        assert_eq!(get_attr_with_ns(&e, b"cstate").as_deref(), Some("print"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"Q&A <"it's">"#),
            "Q&amp;A &lt;&quot;it&apos;s&quot;&gt;"
        );
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_tree_navigation() {
        let xml = br#"<?xml version="1.0"?>
        <p:sp xmlns:p="urn:p" xmlns:a="urn:a">
            <p:nvSpPr><p:cNvPr id="4" name="Title 3"/></p:nvSpPr>
            <p:txBody>
                <a:p><a:r><a:t>Hello</a:t></a:r></a:p>
                <a:p><a:r><a:t> world</a:t></a:r></a:p>
            </p:txBody>
        </p:sp>"#;

        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.local_name(), "sp");
        let c_nv_pr = root.find(&["nvSpPr", "cNvPr"]).unwrap();
        assert_eq!(c_nv_pr.attr_parse::<u32>("id"), Some(4));
        assert_eq!(c_nv_pr.attr("name"), Some("Title 3"));
        assert_eq!(root.descendants("t").len(), 2);
        assert_eq!(root.child("txBody").unwrap().text(), "Hello world");
        assert_eq!(root.namespace_declarations().len(), 2);
    }

    #[test]
    fn test_serialize_with_lifted_namespaces() {
        let xml = br#"<root xmlns:x="urn:x"><x:item v="1&amp;2">a &lt; b</x:item></root>"#;
        let root = XmlElement::parse(xml).unwrap();
        let item = root.child("item").unwrap();

        assert_eq!(item.to_xml(), r#"<x:item v="1&amp;2">a &lt; b</x:item>"#);
        let lifted = item.to_xml_with_namespaces(&root.namespace_declarations());
        assert_eq!(
            lifted,
            r#"<x:item xmlns:x="urn:x" v="1&amp;2">a &lt; b</x:item>"#
        );
        let reparsed = XmlElement::parse(lifted.as_bytes()).unwrap();
        assert_eq!(reparsed.text(), "a < b");
    }

    #[test]
    fn test_unbalanced_document() {
        assert!(XmlElement::parse(b"<a><b></a>").is_err());
        assert!(XmlElement::parse(b"").is_err());
    }

    #[test]
    fn test_set_attr() {
        let mut element = XmlElement::new("p:cNvPr");
        element.set_attr("id", "2");
        element.set_attr("id", "7");
        assert_eq!(element.attr("id"), Some("7"));
        assert_eq!(element.to_xml(), r#"<p:cNvPr id="7"/>"#);
    }
}
