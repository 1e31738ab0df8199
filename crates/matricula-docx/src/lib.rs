//! Styled-run view over WordprocessingML (`.docx`) documents.
//!
//! [`StyledDocument`] loads a package, parses its main document part into a lossless XML tree and
//! exposes the document's paragraphs (body and table cells) as blocks of styled runs. Rewriting a
//! paragraph's text collapses it into its first run; paragraphs that are never rewritten, and
//! every other part of the package, serialize back unchanged.

mod document;
mod error;
mod paragraph;
mod xml;

pub use document::StyledDocument;
pub use error::{DocxError, PartError};
pub use paragraph::{BlockKind, Paragraph, ParagraphMut, RunStyle, StyledRun};
