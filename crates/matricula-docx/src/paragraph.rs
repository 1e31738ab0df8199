//! Paragraph blocks and their styled runs.
//!
//! A paragraph's text is the concatenation of its runs' text, where a run is a `w:r` element that
//! is a direct child of the paragraph or sits inside an inline container (hyperlink, tracked
//! insertion, smart tag, simple field, content control). Deleted text (`w:del`) is not part of
//! the visible text and is never collected.

use crate::xml::{XmlElement, XmlNode};

/// Inline containers whose runs belong to the enclosing paragraph.
const RUN_CONTAINERS: &[&[u8]] = &[
    b"hyperlink",
    b"ins",
    b"smartTag",
    b"fldSimple",
    b"sdt",
    b"sdtContent",
    b"customXml",
    b"moveTo",
    b"dir",
    b"bdo",
];

/// Where a paragraph lives in the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A paragraph outside any table.
    Body,
    /// A paragraph inside a table cell (at any nesting depth).
    TableCell,
}

/// Character formatting of a run, as read from its `w:rPr`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    /// Underline kind (`single`, `double`, ...); `None` when not underlined.
    pub underline: Option<String>,
    pub font_name: Option<String>,
    /// Font size in half points (`w:sz`), so `24` is 12pt.
    pub size_half_points: Option<u32>,
}

impl RunStyle {
    fn from_run(run: &XmlElement) -> Self {
        let Some(rpr) = run.find_w(b"rPr") else {
            return Self::default();
        };

        let underline = rpr
            .find_w(b"u")
            .map(|u| u.attr(b"val").unwrap_or_else(|| "single".to_string()))
            .filter(|val| val != "none");
        let font_name = rpr.find_w(b"rFonts").and_then(|fonts| {
            fonts
                .attr(b"ascii")
                .or_else(|| fonts.attr(b"hAnsi"))
                .or_else(|| fonts.attr(b"cs"))
        });
        let size_half_points = rpr
            .find_w(b"sz")
            .and_then(|sz| sz.attr(b"val"))
            .and_then(|val| val.trim().parse().ok());

        Self {
            bold: toggle(rpr.find_w(b"b")),
            italic: toggle(rpr.find_w(b"i")),
            underline,
            font_name,
            size_half_points,
        }
    }
}

/// `<w:b/>` and `<w:b w:val="1"/>` are on; `w:val="0"`/`false`/`off` turn the property off.
fn toggle(el: Option<&XmlElement>) -> bool {
    match el {
        None => false,
        Some(el) => !matches!(
            el.attr(b"val").as_deref().map(str::trim),
            Some("0" | "false" | "off")
        ),
    }
}

/// Snapshot of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

/// Read-only view of a paragraph (`w:p`).
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    kind: BlockKind,
    element: &'a XmlElement,
}

impl<'a> Paragraph<'a> {
    pub(crate) fn new(kind: BlockKind, element: &'a XmlElement) -> Self {
        Self { kind, element }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Plain text of the paragraph.
    pub fn text(&self) -> String {
        paragraph_text(self.element)
    }

    pub fn runs(&self) -> Vec<StyledRun> {
        let mut runs = Vec::new();
        collect_runs(self.element, &mut runs);
        runs.into_iter()
            .map(|run| StyledRun {
                text: run_text(run),
                style: RunStyle::from_run(run),
            })
            .collect()
    }
}

/// Mutable view of a paragraph (`w:p`).
#[derive(Debug)]
pub struct ParagraphMut<'a> {
    kind: BlockKind,
    element: &'a mut XmlElement,
}

impl<'a> ParagraphMut<'a> {
    pub(crate) fn new(kind: BlockKind, element: &'a mut XmlElement) -> Self {
        Self { kind, element }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn text(&self) -> String {
        paragraph_text(&*self.element)
    }

    pub fn as_paragraph(&self) -> Paragraph<'_> {
        Paragraph::new(self.kind, &*self.element)
    }

    /// Replace the paragraph's text.
    ///
    /// Every run loses its content but keeps its `w:rPr`; the new text goes into the first run, so
    /// the paragraph takes on that run's formatting. Later runs are left as empty, formatted runs.
    /// A paragraph without runs gets one new unformatted run.
    pub fn replace_text(&mut self, text: &str) {
        let written = {
            let mut runs = Vec::new();
            collect_runs_mut(&mut *self.element, &mut runs);
            let mut runs = runs.into_iter();
            match runs.next() {
                Some(first) => {
                    clear_run_content(first);
                    first.children.extend(text_nodes(text));
                    runs.for_each(clear_run_content);
                    true
                }
                None => false,
            }
        };

        if !written {
            let mut run = XmlElement::new("w:r");
            run.children.extend(text_nodes(text));
            self.element.children.push(XmlNode::Element(run));
        }
    }
}

fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut runs = Vec::new();
    collect_runs(paragraph, &mut runs);
    runs.into_iter().map(run_text).collect()
}

fn is_run_container(el: &XmlElement) -> bool {
    RUN_CONTAINERS.iter().any(|local| el.is_w(local))
}

fn collect_runs<'a>(parent: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in parent.child_elements() {
        if child.is_w(b"r") {
            out.push(child);
        } else if is_run_container(child) {
            collect_runs(child, out);
        }
    }
}

fn collect_runs_mut<'a>(parent: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in parent.child_elements_mut() {
        if child.is_w(b"r") {
            out.push(child);
        } else if is_run_container(child) {
            collect_runs_mut(child, out);
        }
    }
}

fn run_text(run: &XmlElement) -> String {
    let mut out = String::new();
    for child in run.child_elements() {
        if child.is_w(b"t") {
            out.push_str(&child.text_content());
        } else if child.is_w(b"tab") {
            out.push('\t');
        } else if child.is_w(b"br") || child.is_w(b"cr") {
            out.push('\n');
        } else if child.is_w(b"noBreakHyphen") {
            out.push('-');
        }
    }
    out
}

fn clear_run_content(run: &mut XmlElement) {
    run.children
        .retain(|node| matches!(node, XmlNode::Element(el) if el.is_w(b"rPr")));
}

/// Run content for `text`: `w:t` segments separated by `w:tab` / `w:br`.
fn text_nodes(text: &str) -> Vec<XmlNode> {
    fn flush(segment: &mut String, out: &mut Vec<XmlNode>) {
        if segment.is_empty() {
            return;
        }
        let t = XmlElement::new("w:t")
            .with_attribute("xml:space", "preserve")
            .with_text(segment);
        out.push(XmlNode::Element(t));
        segment.clear();
    }

    let mut out = Vec::new();
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(&mut segment, &mut out);
                out.push(XmlNode::Element(XmlElement::new("w:tab")));
            }
            '\n' => {
                flush(&mut segment, &mut out);
                out.push(XmlNode::Element(XmlElement::new("w:br")));
            }
            '\r' => {}
            _ => segment.push(ch),
        }
    }
    flush(&mut segment, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::xml::XmlDocument;

    fn parse(xml: &str) -> XmlDocument {
        XmlDocument::parse("word/document.xml", xml.as_bytes()).unwrap()
    }

    #[test]
    fn text_follows_containers_and_skips_deletions() {
        let doc = parse(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t></w:r><w:hyperlink r:id="rId5"><w:r><w:t xml:space="preserve"> link </w:t></w:r></w:hyperlink><w:del><w:r><w:delText>gone</w:delText></w:r></w:del><w:ins><w:r><w:t>new</w:t><w:br/><w:noBreakHyphen/></w:r></w:ins></w:p>"#,
        );
        let p = Paragraph::new(BlockKind::Body, doc.root().unwrap());
        assert_eq!(p.text(), "A\tB link new\n-");
    }

    #[test]
    fn run_style_reads_toggles_and_attributes() {
        let doc = parse(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:b/><w:i w:val="0"/><w:u w:val="double"/><w:sz w:val="24"/></w:rPr><w:t>x</w:t></w:r><w:r><w:t>y</w:t></w:r></w:p>"#,
        );
        let runs = Paragraph::new(BlockKind::Body, doc.root().unwrap()).runs();
        assert_eq!(
            runs[0].style,
            RunStyle {
                bold: true,
                italic: false,
                underline: Some("double".to_string()),
                font_name: Some("Arial".to_string()),
                size_half_points: Some(24),
            }
        );
        assert_eq!(runs[1].style, RunStyle::default());
        assert_eq!(runs[1].text, "y");
    }

    #[test]
    fn replace_text_keeps_first_run_properties_and_empties_the_rest() {
        let mut doc = parse(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Hello </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>World</w:t></w:r></w:p>"#,
        );
        let mut p = ParagraphMut::new(BlockKind::Body, doc.root_mut().unwrap());
        p.replace_text("Hola\tMundo");
        assert_eq!(p.text(), "Hola\tMundo");
        assert_eq!(
            String::from_utf8(doc.to_bytes().unwrap()).unwrap(),
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Hola</w:t><w:tab/><w:t xml:space="preserve">Mundo</w:t></w:r><w:r><w:rPr><w:i/></w:rPr></w:r></w:p>"#
        );
    }

    #[test]
    fn replace_text_adds_a_run_when_there_is_none() {
        let mut doc = parse(r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr></w:p>"#);
        let mut p = ParagraphMut::new(BlockKind::TableCell, doc.root_mut().unwrap());
        p.replace_text("a & b");
        assert_eq!(
            String::from_utf8(doc.to_bytes().unwrap()).unwrap(),
            r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t xml:space="preserve">a &amp; b</w:t></w:r></w:p>"#
        );
    }
}
