use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

/// One roster row, keyed by the identifier's base number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub id_base: u64,
    /// Student name, when the roster carries one.
    pub name: Option<String>,
    pub institution: String,
    pub institution_code: String,
    /// Grade label, e.g. `6° básico`.
    pub grade: String,
    /// Section letter, e.g. `C`.
    pub section: String,
    pub school_year: String,
    pub commune: String,
}

/// Summary figures for a loaded roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    pub total_records: usize,
    pub institutions: usize,
    pub communes: usize,
    /// School year of the first record.
    pub school_year: Option<String>,
}

/// Immutable, load-once set of [`StudentRecord`]s indexed by identifier base number.
///
/// Keys are not guaranteed unique in source data; the index points at the first record seen for
/// each key.
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    records: Vec<StudentRecord>,
    index: HashMap<u64, usize>,
}

impl RecordCollection {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        let mut duplicates = 0usize;
        for (pos, record) in records.iter().enumerate() {
            if index.contains_key(&record.id_base) {
                duplicates += 1;
                continue;
            }
            index.insert(record.id_base, pos);
        }
        if duplicates > 0 {
            log::warn!(
                "roster has {duplicates} rows with a repeated identifier; lookups return the first"
            );
        }
        Self { records, index }
    }

    /// First record stored under `id_base`.
    pub fn get(&self, id_base: u64) -> Option<&StudentRecord> {
        self.index.get(&id_base).map(|&pos| &self.records[pos])
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys that occur more than once, ascending.
    pub fn duplicate_keys(&self) -> Vec<u64> {
        let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.id_base).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn stats(&self) -> RosterStats {
        let institutions: BTreeSet<&str> =
            self.records.iter().map(|r| r.institution.as_str()).collect();
        let communes: BTreeSet<&str> = self.records.iter().map(|r| r.commune.as_str()).collect();
        RosterStats {
            total_records: self.records.len(),
            institutions: institutions.len(),
            communes: communes.len(),
            school_year: self.records.first().map(|r| r.school_year.clone()),
        }
    }
}

impl FromIterator<StudentRecord> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id_base: u64, institution: &str) -> StudentRecord {
    StudentRecord {
        id_base,
        name: None,
        institution: institution.to_string(),
        institution_code: "8521".to_string(),
        grade: "6° básico".to_string(),
        section: "C".to_string(),
        school_year: "2026".to_string(),
        commune: "SANTA CORINA".to_string(),
    }
}
