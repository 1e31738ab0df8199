use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use crate::relationships::{parse_relationships, rels_part_name, resolve_target};
use crate::zip_util::{read_zip_file_bytes_with_budget, zip_part_names_equivalent, ZipInflateBudget};
use crate::{OpcError, DEFAULT_MAX_ZIP_PART_BYTES, DEFAULT_MAX_ZIP_TOTAL_BYTES};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Size limits enforced by [`OpcPackage::from_bytes_limited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageLimits {
    /// Maximum allowed uncompressed bytes for any single part.
    pub max_part_bytes: u64,
    /// Maximum allowed uncompressed bytes across the whole package.
    pub max_total_bytes: u64,
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: DEFAULT_MAX_ZIP_PART_BYTES,
            max_total_bytes: DEFAULT_MAX_ZIP_TOTAL_BYTES,
        }
    }
}

/// In-memory representation of an OPC package as a map of part name -> bytes.
///
/// Parts are stored under the names the producer used; nothing is canonicalized, so parts nobody
/// edits are written back exactly as they were read, in the order they were read.
#[derive(Debug, Clone, Default)]
pub struct OpcPackage {
    parts: BTreeMap<String, Vec<u8>>,
    order: Vec<String>,
}

/// Two packages are equal when they hold the same parts, whatever their entry order.
impl PartialEq for OpcPackage {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for OpcPackage {}

impl OpcPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OpcError> {
        Self::from_bytes_limited(bytes, PackageLimits::default())
    }

    pub fn from_bytes_limited(bytes: &[u8], limits: PackageLimits) -> Result<Self, OpcError> {
        Self::from_reader_limited(Cursor::new(bytes), limits)
    }

    pub fn from_reader_limited<R: Read + Seek>(
        mut reader: R,
        limits: PackageLimits,
    ) -> Result<Self, OpcError> {
        // Callers may hand us a reused reader.
        reader.seek(SeekFrom::Start(0))?;
        let mut zip = zip::ZipArchive::new(reader)?;

        let mut parts = BTreeMap::new();
        let mut order = Vec::new();
        let mut budget = ZipInflateBudget::new(limits.max_total_bytes);
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if !file.is_file() {
                continue;
            }

            let name = file.name().to_string();
            let declared_size = file.size();
            let buf = read_zip_file_bytes_with_budget(
                &mut file,
                declared_size,
                &name,
                limits.max_part_bytes,
                &mut budget,
            )?;
            if parts.insert(name.clone(), buf).is_none() {
                order.push(name);
            }
        }

        log::debug!("loaded OPC package with {} parts", parts.len());
        Ok(Self { parts, order })
    }

    /// Look up a part by name, tolerating a leading `/` and non-canonical producer spellings
    /// (`\` separators, ASCII case differences, percent-encoding).
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.resolve_name(name)
            .and_then(|key| self.parts.get(key))
            .map(Vec::as_slice)
    }

    /// Replace (or add) a part. An existing entry with an equivalent name is overwritten in place
    /// so the producer's spelling of the name survives.
    pub fn set_part(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        let key = self
            .resolve_name(&name)
            .map(str::to_string)
            .unwrap_or(name);
        if self.parts.insert(key.clone(), bytes).is_none() {
            self.order.push(key);
        }
    }

    /// Parts in entry order.
    pub fn parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.order.iter().filter_map(|name| {
            self.parts
                .get(name)
                .map(|bytes| (name.as_str(), bytes.as_slice()))
        })
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Resolve the package's main document part (the `officeDocument` relationship in
    /// `_rels/.rels`), e.g. `word/document.xml`.
    pub fn main_document_part(&self) -> Result<String, OpcError> {
        let rels_name = rels_part_name("");
        let rels = self
            .part(&rels_name)
            .ok_or_else(|| OpcError::MissingPart(rels_name.clone()))?;
        parse_relationships(rels)?
            .into_iter()
            .find(|rel| rel.type_uri == crate::REL_TYPE_OFFICE_DOCUMENT && !rel.is_external())
            .map(|rel| resolve_target("", &rel.target))
            .ok_or_else(|| OpcError::Invalid("missing officeDocument relationship".to_string()))
    }

    pub fn write_to_bytes(&self) -> Result<Vec<u8>, OpcError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Serialize the package as a ZIP archive in entry order, except that `[Content_Types].xml` is
    /// always written first, which is what Office itself does and what some streaming consumers
    /// expect.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), OpcError> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let content_types = self
            .parts()
            .filter(|(name, _)| zip_part_names_equivalent(name, CONTENT_TYPES_PART));
        let rest = self
            .parts()
            .filter(|(name, _)| !zip_part_names_equivalent(name, CONTENT_TYPES_PART));
        for (name, bytes) in content_types.chain(rest) {
            zip.start_file(name, options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        w.write_all(&cursor.into_inner())?;
        Ok(())
    }

    fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.parts.get_key_value(name) {
            return Some(key.as_str());
        }
        if let Some(stripped) = name.strip_prefix('/') {
            if let Some((key, _)) = self.parts.get_key_value(stripped) {
                return Some(key.as_str());
            }
        }
        self.parts
            .keys()
            .find(|key| zip_part_names_equivalent(key, name))
            .map(String::as_str)
    }
}
