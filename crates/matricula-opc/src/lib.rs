//! Open Packaging Convention (OPC) container support.
//!
//! Word documents (`.docx`) and Excel workbooks (`.xlsx`) are both ZIP archives of XML parts wired
//! together with relationship (`.rels`) parts. This crate keeps the container layer in one place:
//! - [`OpcPackage`]: an in-memory map of part name -> bytes that can be re-serialized without
//!   touching parts nobody edited.
//! - [`relationships`]: `.rels` parsing and relationship target resolution.
//!
//! Inflation is bounded by [`PackageLimits`] so a hostile archive cannot allocate unbounded memory.

mod error;
mod package;
pub mod relationships;
mod zip_util;

pub use crate::error::OpcError;
pub use crate::package::{OpcPackage, PackageLimits, CONTENT_TYPES_PART};
pub use crate::relationships::{
    local_name, parse_relationships, rels_part_name, resolve_target, Relationship,
};
pub use crate::zip_util::{
    zip_part_names_equivalent, DEFAULT_MAX_ZIP_PART_BYTES, DEFAULT_MAX_ZIP_TOTAL_BYTES,
};

/// Relationship type of the package's main document part (`word/document.xml`,
/// `xl/workbook.xml`, ...).
pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
