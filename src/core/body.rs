//! Message body tree and its XML codec.
//!
//! A body is an ordered, labeled tree of [`Element`]s. Element names keep the
//! qualified form they were written with (`m0:request`); namespace URIs are
//! not resolved.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while decoding or addressing a body tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("Malformed XML: {0}")]
    Malformed(String),
    #[error("Document has no root element")]
    NoRootElement,
    #[error("SOAP envelope has no body payload")]
    EmptyEnvelope,
    #[error("No element at path {0:?}")]
    InvalidPath(Vec<usize>),
    #[error("Expected {expected} replacement fragments, got {found}")]
    ReplacementCount { expected: usize, found: usize },
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One labeled node of the body tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text child.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::Text(text.into()));
        element
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Element(_)))
    }

    /// Element children paired with their index in `children`.
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children.iter().enumerate().filter_map(|(i, c)| match c {
            Node::Element(e) => Some((i, e)),
            Node::Text(_) => None,
        })
    }

    /// Resolve a child-index path relative to this element.
    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for idx in path {
            match current.children.get(*idx) {
                Some(Node::Element(e)) => current = e,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for idx in path {
            match current.children.get_mut(*idx) {
                Some(Node::Element(e)) => current = e,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Replace the element at `path` (the root itself when `path` is empty).
    pub fn replace_at(&mut self, path: &[usize], replacement: Element) -> Result<(), BodyError> {
        let target = self
            .at_path_mut(path)
            .ok_or_else(|| BodyError::InvalidPath(path.to_vec()))?;
        *target = replacement;
        Ok(())
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_xml())
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&quick_xml::escape::escape(value.as_str()));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(e, out),
            Node::Text(t) => out.push_str(&quick_xml::escape::escape(t.as_str())),
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn start_element(start: &BytesStart<'_>) -> Result<Element, BodyError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| BodyError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| BodyError::Malformed(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), BodyError> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(BodyError::Malformed(
                "multiple root elements".to_string(),
            ))
        }
    }
    Ok(())
}

/// Parse an XML document into its root element.
///
/// Text nodes made only of whitespace are dropped; all other text is kept
/// verbatim.
pub fn parse_xml(xml: &str) -> Result<Element, BodyError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_element(&e)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(e)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| BodyError::Malformed("unbalanced end tag".to_string()))?;
                if element.name.as_bytes() != e.name().as_ref() {
                    return Err(BodyError::Malformed(format!(
                        "expected </{}>, found </{}>",
                        element.name,
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                close_element(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| BodyError::Malformed(e.to_string()))?
                    .into_owned();
                if text.trim().is_empty() {
                    continue;
                }
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Text(String::from_utf8_lossy(e.as_ref()).into_owned()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BodyError::Malformed(e.to_string())),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(BodyError::Malformed("unclosed element".to_string()));
    }
    root.ok_or(BodyError::NoRootElement)
}

/// Parse an inbound payload. A SOAP envelope is unwrapped to the first
/// element child of its `Body`; any other document is taken as-is.
///
/// Namespace declarations on `Envelope` and `Body` are copied onto the
/// unwrapped payload unless it redeclares the same prefix.
pub fn parse_payload(xml: &str) -> Result<Element, BodyError> {
    let root = parse_xml(xml)?;
    if root.local_name() != "Envelope" {
        return Ok(root);
    }
    let body = root
        .child_elements()
        .map(|(_, e)| e)
        .find(|e| e.local_name() == "Body")
        .ok_or(BodyError::EmptyEnvelope)?;
    let mut payload = body
        .child_elements()
        .map(|(_, e)| e.clone())
        .next()
        .ok_or(BodyError::EmptyEnvelope)?;

    for ancestor in [body, &root] {
        for (key, value) in &ancestor.attributes {
            if is_namespace_declaration(key) && payload.attribute(key).is_none() {
                payload.attributes.push((key.clone(), value.clone()));
            }
        }
    }
    Ok(payload)
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str = r#"<m0:getQuote xmlns:m0="http://services.samples">
        <m0:group>Group1</m0:group>
        <m0:request><m0:code>IBM</m0:code></m0:request>
        <m0:request><m0:code>WSO2</m0:code></m0:request>
    </m0:getQuote>"#;

    #[test]
    fn test_parse_xml_structure() {
        let root = parse_xml(QUOTE).unwrap();
        assert_eq!(root.name, "m0:getQuote");
        assert_eq!(root.local_name(), "getQuote");
        assert_eq!(root.prefix(), Some("m0"));
        assert_eq!(root.attribute("xmlns:m0"), Some("http://services.samples"));
        let children: Vec<&str> = root.child_elements().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(children, vec!["m0:group", "m0:request", "m0:request"]);
        assert_eq!(root.at_path(&[0]).unwrap().text(), "Group1");
        assert_eq!(root.at_path(&[2, 0]).unwrap().text(), "WSO2");
    }

    #[test]
    fn test_to_xml_escapes_and_reparses() {
        let element = Element::new("a")
            .with_attribute("k", "x\"y")
            .with_child(Element::with_text("b", "1 < 2 & 3"))
            .with_child(Element::new("c"));
        let xml = element.to_xml();
        assert_eq!(
            xml,
            "<a k=\"x&quot;y\"><b>1 &lt; 2 &amp; 3</b><c/></a>"
        );
        assert_eq!(parse_xml(&xml).unwrap(), element);
    }

    #[test]
    fn test_parse_payload_unwraps_envelope() {
        let envelope = format!(
            r#"<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
                <soap:Header/>
                <soap:Body>{}</soap:Body>
            </soap:Envelope>"#,
            QUOTE
        );
        let payload = parse_payload(&envelope).unwrap();
        assert_eq!(payload.name, "m0:getQuote");
        assert_eq!(payload.attribute("xmlns:m0"), Some("http://services.samples"));
    }

    #[test]
    fn test_parse_payload_carries_envelope_namespaces() {
        let envelope = r#"<soap:Envelope xmlns:soap="urn:soap" xmlns:m0="urn:m0">
                <soap:Body><m0:getQuote><m0:code>IBM</m0:code></m0:getQuote></soap:Body>
            </soap:Envelope>"#;
        let payload = parse_payload(envelope).unwrap();
        assert_eq!(payload.attribute("xmlns:m0"), Some("urn:m0"));
        assert_eq!(payload.attribute("xmlns:soap"), Some("urn:soap"));
        let reparsed = parse_xml(&payload.to_xml()).unwrap();
        assert_eq!(reparsed, payload);
    }

    #[test]
    fn test_text_whitespace_is_preserved() {
        let xml = "<r>\n  <note>  keep me  </note>\n  <a>x</a>\n</r>";
        let root = parse_xml(xml).unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.at_path(&[0]).unwrap().text(), "  keep me  ");
        assert_eq!(
            root.to_xml(),
            "<r><note>  keep me  </note><a>x</a></r>"
        );
        assert_eq!(parse_xml(&root.to_xml()).unwrap(), root);
    }

    #[test]
    fn test_parse_payload_empty_envelope() {
        let envelope = r#"<soap:Envelope><soap:Body/></soap:Envelope>"#;
        assert_eq!(parse_payload(envelope), Err(BodyError::EmptyEnvelope));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_xml("<a><b></a>"), Err(BodyError::Malformed(_))));
        assert!(matches!(parse_xml("<a>"), Err(BodyError::Malformed(_))));
        assert_eq!(parse_xml(""), Err(BodyError::NoRootElement));
    }

    #[test]
    fn test_replace_at() {
        let mut root = parse_xml(QUOTE).unwrap();
        root.replace_at(&[1], Element::with_text("m0:symbol", "X"))
            .unwrap();
        assert_eq!(root.at_path(&[1]).unwrap().text(), "X");
        assert_eq!(
            root.replace_at(&[9], Element::new("x")),
            Err(BodyError::InvalidPath(vec![9]))
        );
    }
}
