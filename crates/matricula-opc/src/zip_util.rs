use std::io::Read;

use crate::OpcError;

/// Default maximum uncompressed size permitted for any single ZIP part inflated into memory.
///
/// Guards against ZIP bombs (tiny compressed size, huge uncompressed size) and forged ZIP
/// metadata (e.g. an incorrect `uncompressed_size` field).
pub const DEFAULT_MAX_ZIP_PART_BYTES: u64 = 256 * 1024 * 1024; // 256MiB

/// Default maximum total uncompressed bytes permitted across a whole package.
pub const DEFAULT_MAX_ZIP_TOTAL_BYTES: u64 = 512 * 1024 * 1024; // 512MiB

/// Compare two part names the way producers expect OPC consumers to: ASCII case-insensitive,
/// `\` treated as `/`, leading separators ignored, and `%XX` escapes decoded.
pub fn zip_part_names_equivalent(a: &str, b: &str) -> bool {
    let mut a = NormalizedName::new(a);
    let mut b = NormalizedName::new(b);
    loop {
        match (a.next(), b.next()) {
            (Some(a), Some(b)) if a == b => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

struct NormalizedName<'a> {
    bytes: &'a [u8],
    in_leading_separators: bool,
}

impl<'a> NormalizedName<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            in_leading_separators: true,
        }
    }
}

impl Iterator for NormalizedName<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        fn hex_val(b: u8) -> Option<u8> {
            match b {
                b'0'..=b'9' => Some(b - b'0'),
                b'a'..=b'f' => Some(b - b'a' + 10),
                b'A'..=b'F' => Some(b - b'A' + 10),
                _ => None,
            }
        }

        loop {
            let b = *self.bytes.first()?;
            let decoded = match (b, self.bytes.get(1), self.bytes.get(2)) {
                (b'%', Some(&hi), Some(&lo)) => match (hex_val(hi), hex_val(lo)) {
                    (Some(hi), Some(lo)) => {
                        self.bytes = &self.bytes[3..];
                        (hi << 4) | lo
                    }
                    _ => {
                        self.bytes = &self.bytes[1..];
                        b
                    }
                },
                _ => {
                    self.bytes = &self.bytes[1..];
                    b
                }
            };

            if self.in_leading_separators && matches!(decoded, b'/' | b'\\') {
                continue;
            }
            self.in_leading_separators = false;

            return Some(if decoded == b'\\' {
                b'/'
            } else {
                decoded.to_ascii_lowercase()
            });
        }
    }
}

/// Running total of inflated bytes across one package load.
#[derive(Debug, Clone)]
pub(crate) struct ZipInflateBudget {
    max_total_bytes: u64,
    used_bytes: u64,
}

impl ZipInflateBudget {
    pub(crate) fn new(max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            used_bytes: 0,
        }
    }

    fn remaining_bytes(&self) -> u64 {
        self.max_total_bytes.saturating_sub(self.used_bytes)
    }

    fn consume(&mut self, bytes: u64) -> Result<(), OpcError> {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
        if self.used_bytes > self.max_total_bytes {
            return Err(OpcError::PackageTooLarge {
                total: self.used_bytes,
                max: self.max_total_bytes,
            });
        }
        Ok(())
    }
}

/// Inflate one ZIP entry, enforcing both the per-part limit and the remaining package budget.
///
/// `declared_size` (from the entry header) is checked up front, but the real limit is enforced
/// while reading since the header can lie.
pub(crate) fn read_zip_file_bytes_with_budget(
    file: impl Read,
    declared_size: u64,
    part: &str,
    max_part_bytes: u64,
    budget: &mut ZipInflateBudget,
) -> Result<Vec<u8>, OpcError> {
    if declared_size > max_part_bytes {
        return Err(OpcError::PartTooLarge {
            part: part.to_string(),
            size: declared_size,
            max: max_part_bytes,
        });
    }

    let effective_max = max_part_bytes.min(budget.remaining_bytes());
    let limit_is_total = effective_max < max_part_bytes;
    if limit_is_total && declared_size > effective_max {
        return Err(OpcError::PackageTooLarge {
            total: budget.used_bytes.saturating_add(declared_size),
            max: budget.max_total_bytes,
        });
    }

    let mut buf = Vec::new();
    file.take(effective_max.saturating_add(1))
        .read_to_end(&mut buf)?;

    let observed = buf.len() as u64;
    if observed > effective_max {
        if limit_is_total {
            return Err(OpcError::PackageTooLarge {
                total: budget.used_bytes.saturating_add(observed),
                max: budget.max_total_bytes,
            });
        }
        return Err(OpcError::PartTooLarge {
            part: part.to_string(),
            size: observed,
            max: max_part_bytes,
        });
    }

    budget.consume(observed)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_handles_case_separators_and_leading_slashes() {
        assert!(zip_part_names_equivalent("WORD\\Document.xml", "word/document.xml"));
        assert!(zip_part_names_equivalent("/word/document.xml", "word/document.xml"));
        assert!(zip_part_names_equivalent("\\word\\document.xml", "word/document.xml"));
        assert!(!zip_part_names_equivalent("word/document2.xml", "word/document.xml"));
    }

    #[test]
    fn equivalent_handles_percent_encoded_names() {
        assert!(zip_part_names_equivalent(
            "xl/worksheets/sheet 1.xml",
            "xl/worksheets/sheet%201.xml"
        ));
        assert!(zip_part_names_equivalent(
            "word/document.xml",
            "%2Fword%2Fdocument.xml"
        ));
    }

    #[test]
    fn budget_rejects_overflowing_consumption() {
        let mut budget = ZipInflateBudget::new(10);
        budget.consume(6).unwrap();
        assert_eq!(budget.remaining_bytes(), 4);
        let err = budget.consume(5).unwrap_err();
        assert!(matches!(err, OpcError::PackageTooLarge { total: 11, max: 10 }));
    }
}
