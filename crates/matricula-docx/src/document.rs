use matricula_opc::{OpcError, OpcPackage};

use crate::paragraph::{BlockKind, Paragraph, ParagraphMut};
use crate::xml::{XmlDocument, XmlElement};
use crate::{DocxError, PartError};

/// Part name used when a package has no root relationships part.
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// A `.docx` package with its main document part parsed for editing.
///
/// Only the main document part is parsed; every other part (styles, numbering, headers, media)
/// is written back exactly as it was read.
#[derive(Debug, Clone)]
pub struct StyledDocument {
    package: OpcPackage,
    part_name: String,
    xml: XmlDocument,
}

impl StyledDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        OpcPackage::from_bytes(bytes)
            .map_err(PartError::from)
            .and_then(Self::load)
            .map_err(DocxError::TemplateLoad)
    }

    pub fn from_package(package: OpcPackage) -> Result<Self, DocxError> {
        Self::load(package).map_err(DocxError::TemplateLoad)
    }

    fn load(package: OpcPackage) -> Result<Self, PartError> {
        let part_name = match package.main_document_part() {
            Ok(name) => name,
            Err(OpcError::MissingPart(rels)) => {
                log::warn!("package has no {rels}; assuming {DEFAULT_DOCUMENT_PART}");
                DEFAULT_DOCUMENT_PART.to_string()
            }
            Err(err) => return Err(err.into()),
        };

        let bytes = package
            .part(&part_name)
            .ok_or_else(|| OpcError::MissingPart(part_name.clone()))?;
        let xml = XmlDocument::parse(&part_name, bytes)?;
        if !xml.root().is_some_and(|root| root.is_w(b"document")) {
            return Err(PartError::Malformed {
                part: part_name,
                reason: "root element is not w:document".to_string(),
            });
        }

        log::debug!("loaded document part {part_name}");
        Ok(Self {
            package,
            part_name,
            xml,
        })
    }

    /// Name of the main document part inside the package.
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    /// Every paragraph in document order: body paragraphs and paragraphs inside table cells,
    /// including nested tables. Paragraphs nested inside another paragraph (text boxes) are not
    /// listed.
    pub fn paragraphs(&self) -> Vec<Paragraph<'_>> {
        let mut out = Vec::new();
        if let Some(root) = self.xml.root() {
            collect_paragraphs(root, BlockKind::Body, &mut out);
        }
        out
    }

    pub fn paragraphs_mut(&mut self) -> Vec<ParagraphMut<'_>> {
        let mut out = Vec::new();
        if let Some(root) = self.xml.root_mut() {
            collect_paragraphs_mut(root, BlockKind::Body, &mut out);
        }
        out
    }

    /// Plain text of each paragraph, in document order.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs().iter().map(Paragraph::text).collect()
    }

    /// Serialize the whole package, with the (possibly edited) main document part.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        self.write_package().map_err(DocxError::Serialization)
    }

    fn write_package(&self) -> Result<Vec<u8>, PartError> {
        let mut package = self.package.clone();
        package.set_part(self.part_name.clone(), self.xml.to_bytes()?);
        Ok(package.write_to_bytes()?)
    }
}

fn child_kind(el: &XmlElement, kind: BlockKind) -> BlockKind {
    if el.is_w(b"tc") {
        BlockKind::TableCell
    } else {
        kind
    }
}

fn collect_paragraphs<'a>(parent: &'a XmlElement, kind: BlockKind, out: &mut Vec<Paragraph<'a>>) {
    for child in parent.child_elements() {
        if child.is_w(b"p") {
            out.push(Paragraph::new(kind, child));
        } else {
            collect_paragraphs(child, child_kind(child, kind), out);
        }
    }
}

fn collect_paragraphs_mut<'a>(
    parent: &'a mut XmlElement,
    kind: BlockKind,
    out: &mut Vec<ParagraphMut<'a>>,
) {
    for child in parent.child_elements_mut() {
        if child.is_w(b"p") {
            out.push(ParagraphMut::new(kind, child));
        } else {
            let kind = child_kind(child, kind);
            collect_paragraphs_mut(child, kind, out);
        }
    }
}
