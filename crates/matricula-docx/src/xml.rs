//! Event-level XML tree.
//!
//! Every node keeps the raw `quick_xml` event it was parsed from, so writing an untouched tree
//! back reproduces the original markup (attribute order, quoting, namespace declarations,
//! whitespace). Only nodes that were explicitly replaced are re-encoded.

use std::io::Write;

use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::PartError;

#[derive(Debug, Clone)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(XmlText),
    /// Declarations, comments, CDATA, processing instructions, doctypes.
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub(crate) struct XmlText {
    raw: BytesText<'static>,
    decoded: String,
}

impl XmlText {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            raw: BytesText::from_escaped(partial_escape(text)).into_owned(),
            decoded: text.to_string(),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.decoded
    }
}

#[derive(Debug, Clone)]
pub(crate) struct XmlElement {
    start: BytesStart<'static>,
    pub(crate) children: Vec<XmlNode>,
    /// Parsed from `<tag/>`; re-emitted that way while it has no children.
    self_closing: bool,
}

impl XmlElement {
    /// New element named `qname` (e.g. `w:t`), written as `<w:t/>` until children are added.
    pub(crate) fn new(qname: &'static str) -> Self {
        Self {
            start: BytesStart::new(qname),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub(crate) fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(XmlText::new(text)));
        self
    }

    pub(crate) fn qname(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    /// True for `w:{local}` (or an unprefixed `{local}`).
    ///
    /// WordprocessingML parts bind the main namespace to `w` in every producer we accept, so this
    /// avoids confusing `w:p` with DrawingML's `a:p`.
    pub(crate) fn is_w(&self, local: &[u8]) -> bool {
        let qname = self.qname();
        match qname.iter().rposition(|b| *b == b':') {
            Some(idx) => &qname[..idx] == b"w" && &qname[idx + 1..] == local,
            None => qname == local,
        }
    }

    /// Attribute value by local name (`w:val` and `val` both match `val`).
    pub(crate) fn attr(&self, local: &[u8]) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attr| matricula_opc::local_name(attr.key.as_ref()) == local)
            .and_then(|attr| attr.unescape_value().ok())
            .map(|value| value.into_owned())
    }

    pub(crate) fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub(crate) fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub(crate) fn find_w(&self, local: &[u8]) -> Option<&XmlElement> {
        self.child_elements().find(|el| el.is_w(local))
    }

    /// Concatenated decoded text of direct text children.
    pub(crate) fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text.as_str()),
                XmlNode::Other(Event::CData(cdata)) => {
                    out.push_str(&String::from_utf8_lossy(cdata));
                }
                _ => {}
            }
        }
        out
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), quick_xml::Error> {
        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(self.start.clone()))?;
            return Ok(());
        }
        writer.write_event(Event::Start(self.start.clone()))?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(self.start.to_end()))?;
        Ok(())
    }
}

impl XmlNode {
    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), quick_xml::Error> {
        match self {
            XmlNode::Element(el) => el.write_to(writer)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(text.raw.clone()))?,
            XmlNode::Other(event) => writer.write_event(event.clone())?,
        }
        Ok(())
    }
}

/// A parsed XML part: prolog nodes, the root element, and anything trailing it.
#[derive(Debug, Clone)]
pub(crate) struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    pub(crate) fn parse(part: &str, xml: &[u8]) -> Result<Self, PartError> {
        let malformed = |reason: &str| PartError::Malformed {
            part: part.to_string(),
            reason: reason.to_string(),
        };

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut top: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf)?.into_owned();
            buf.clear();
            let node = match event {
                Event::Start(start) => {
                    stack.push(XmlElement {
                        start,
                        children: Vec::new(),
                        self_closing: false,
                    });
                    continue;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| malformed("unexpected closing tag"))?;
                    XmlNode::Element(el)
                }
                Event::Empty(start) => XmlNode::Element(XmlElement {
                    start,
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Text(raw) => {
                    let decoded = unescape(std::str::from_utf8(&raw)?)?.into_owned();
                    XmlNode::Text(XmlText { raw, decoded })
                }
                Event::Eof => break,
                other => XmlNode::Other(other),
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top.push(node),
            }
        }

        if !stack.is_empty() {
            return Err(malformed("unclosed element at end of input"));
        }
        let doc = Self { nodes: top };
        if doc.root().is_none() {
            return Err(malformed("missing root element"));
        }
        Ok(doc)
    }

    pub(crate) fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub(crate) fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, PartError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            node.write_to(&mut writer)?;
        }
        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_tree_writes_back_identically() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><!-- c --><w:body>
  <w:p w:rsidR="00A1"><w:r><w:rPr><w:b /></w:rPr><w:t xml:space="preserve">A &amp; B 'q' </w:t></w:r></w:p>
  <w:sectPr/>
</w:body></w:document>"#;
        let doc = XmlDocument::parse("word/document.xml", xml).unwrap();
        assert_eq!(doc.to_bytes().unwrap(), xml.to_vec());
    }

    #[test]
    fn text_nodes_are_decoded() {
        let xml = br#"<w:t>A &amp; B &lt;C&gt;</w:t>"#;
        let doc = XmlDocument::parse("part", xml).unwrap();
        assert_eq!(doc.root().unwrap().text_content(), "A & B <C>");
    }

    #[test]
    fn new_text_is_escaped_on_write() {
        let mut doc = XmlDocument::parse("part", b"<w:t/>").unwrap();
        let root = doc.root_mut().unwrap();
        root.children.push(XmlNode::Text(XmlText::new("x < y & z")));
        assert_eq!(doc.to_bytes().unwrap(), b"<w:t>x &lt; y &amp; z</w:t>".to_vec());
    }

    #[test]
    fn is_w_requires_the_word_prefix() {
        let doc = XmlDocument::parse("part", b"<root><w:p/><a:p/><p/></root>").unwrap();
        let flags: Vec<bool> = doc
            .root()
            .unwrap()
            .child_elements()
            .map(|el| el.is_w(b"p"))
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn rejects_truncated_xml() {
        let err = XmlDocument::parse("word/document.xml", b"<w:document><w:body>").unwrap_err();
        assert!(
            matches!(err, PartError::Malformed { .. } | PartError::Xml(_)),
            "got {err:?}"
        );
    }

    #[test]
    fn attr_matches_by_local_name() {
        let doc = XmlDocument::parse("part", br#"<w:sz w:val="24"/>"#).unwrap();
        assert_eq!(doc.root().unwrap().attr(b"val").as_deref(), Some("24"));
        assert_eq!(doc.root().unwrap().attr(b"other"), None);
    }
}
