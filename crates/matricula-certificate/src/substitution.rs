//! Placeholder substitution over paragraph text.
//!
//! Rules run against a paragraph's original text and claim byte spans in a fixed priority order.
//! A match that overlaps an already claimed span is dropped, so text produced by one rule is never
//! re-matched by another (the sample year inside the sample date, for instance). The paragraph is
//! only rebuilt when at least one span was claimed and the result differs from the original.

use matricula_docx::StyledDocument;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{CertificateError, CertificateFields};

/// An uppercase run must be longer than this many characters to count as an institution name.
pub const DEFAULT_INSTITUTION_MIN_LEN: usize = 10;

/// Sample values baked into the stock certificate template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralSamples {
    pub name: String,
    pub identifier: String,
    pub institution: String,
    pub institution_code: String,
    pub course: String,
    pub school_year: String,
    pub issue_date: String,
}

impl Default for LiteralSamples {
    fn default() -> Self {
        Self {
            name: "SOFIA MENDEZ FLOREZ".to_string(),
            identifier: "27.571.150-0".to_string(),
            institution: "ESCUELA CARLOS CONDELL DE LA HAZA".to_string(),
            institution_code: "8521".to_string(),
            course: "6° básico C".to_string(),
            school_year: "2026".to_string(),
            issue_date: "20 de enero del 2026".to_string(),
        }
    }
}

/// How placeholders are recognized in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionStrategy {
    /// Exact sample strings.
    Literal(LiteralSamples),
    /// Structural patterns (titles, identifier grouping, dates, uppercase runs).
    Pattern { institution_min_len: usize },
}

impl Default for SubstitutionStrategy {
    fn default() -> Self {
        SubstitutionStrategy::Literal(LiteralSamples::default())
    }
}

/// Spans claimed so far, as `(start, end, replacement)` byte ranges of the original text.
#[derive(Debug, Default)]
struct Claims {
    spans: Vec<(usize, usize, String)>,
}

impl Claims {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|(s, e, _)| start < *e && *s < end)
    }

    fn claim(&mut self, start: usize, end: usize, value: &str) {
        if start < end && !self.overlaps(start, end) {
            self.spans.push((start, end, value.to_string()));
        }
    }

    fn apply(mut self, text: &str) -> Option<String> {
        if self.spans.is_empty() {
            return None;
        }
        self.spans.sort_by_key(|(start, _, _)| *start);

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end, value) in &self.spans {
            out.push_str(&text[cursor..*start]);
            out.push_str(value);
            cursor = *end;
        }
        out.push_str(&text[cursor..]);
        (out != text).then_some(out)
    }
}

#[derive(Debug)]
struct PatternRules {
    date: Regex,
    identifier: Regex,
    name: Regex,
    course: Regex,
    institution_code: Regex,
    year: Regex,
    uppercase_run: Regex,
    uppercase_word: Regex,
    institution_min_len: usize,
}

impl PatternRules {
    fn compile(institution_min_len: usize) -> Result<Self, CertificateError> {
        Ok(Self {
            date: Regex::new(
                r"\b\d{1,2}\s+de\s+(?i:enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\s+del?\s+\d{4}\b",
            )?,
            identifier: Regex::new(
                r"(?:\b(?i:RUN|RUT)\b[ \t]*:?[ \t]*)?\b(\d{1,2}\.\d{3}\.\d{3}-[0-9kK])\b",
            )?,
            name: Regex::new(r"\b(?:Don\(a\)|Doña|Don)\s+(\p{Lu}[\p{Lu}\s.'-]*?)\s*,")?,
            course: Regex::new(r"\b\d{1,2}\s*[°º]\s*(?:básico|basico|medio)\s+\p{Lu}\b")?,
            institution_code: Regex::new(r"\b(?i:RBD)\b\s*(?:N[°º]\s*)?[:.]?\s*(\d+)")?,
            year: Regex::new(r"\b202\d\b")?,
            uppercase_run: Regex::new(r"\b\p{Lu}+\b(?:[ \t]+\b\p{Lu}+\b){2,}")?,
            uppercase_word: Regex::new(r"\p{Lu}+")?,
            institution_min_len,
        })
    }

    /// Claim every match of `re`. Group `group` is replaced by `value`; whatever else the match
    /// covers (a label such as `RBD` or `RUN`) is written back unchanged.
    fn claim_all(claims: &mut Claims, re: &Regex, group: usize, text: &str, value: &str) {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(m)) = (caps.get(0), caps.get(group)) else {
                continue;
            };
            let replacement = format!(
                "{}{value}{}",
                &text[whole.start()..m.start()],
                &text[m.end()..whole.end()]
            );
            claims.claim(whole.start(), whole.end(), &replacement);
        }
    }

    /// Longest run of three or more unclaimed uppercase words; the first one wins a tie. Words
    /// inside a claimed span split a run rather than disqualify it.
    fn institution_span(&self, text: &str, claims: &Claims) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        let mut consider = |words: &[(usize, usize)]| {
            let (Some(first), Some(last)) = (words.first(), words.last()) else {
                return;
            };
            if words.len() < 3 {
                return;
            }
            let len = text[first.0..last.1].chars().count();
            if best.map_or(true, |(_, _, best_len)| len > best_len) {
                best = Some((first.0, last.1, len));
            }
        };

        for run in self.uppercase_run.find_iter(text) {
            let mut words = Vec::new();
            for word in self.uppercase_word.find_iter(run.as_str()) {
                let (start, end) = (run.start() + word.start(), run.start() + word.end());
                if claims.overlaps(start, end) {
                    consider(&words);
                    words.clear();
                } else {
                    words.push((start, end));
                }
            }
            consider(&words);
        }

        best.filter(|(_, _, len)| *len > self.institution_min_len)
            .map(|(start, end, _)| (start, end))
    }

    fn rewrite(&self, text: &str, fields: &CertificateFields) -> Option<String> {
        let mut claims = Claims::default();
        Self::claim_all(&mut claims, &self.date, 0, text, &fields.issue_date);
        Self::claim_all(&mut claims, &self.identifier, 1, text, &fields.identifier);
        Self::claim_all(&mut claims, &self.name, 1, text, &fields.name);
        Self::claim_all(&mut claims, &self.course, 0, text, &fields.course);
        Self::claim_all(&mut claims, &self.institution_code, 1, text, &fields.institution_code);
        Self::claim_all(&mut claims, &self.year, 0, text, &fields.school_year);

        if let Some((start, end)) = self.institution_span(text, &claims) {
            claims.claim(start, end, &fields.institution);
        }

        claims.apply(text)
    }
}

#[derive(Debug)]
enum Rules {
    Literal(LiteralSamples),
    Pattern(Box<PatternRules>),
}

/// A compiled [`SubstitutionStrategy`].
#[derive(Debug)]
pub struct Substitution {
    rules: Rules,
}

impl Substitution {
    pub fn new(strategy: &SubstitutionStrategy) -> Result<Self, CertificateError> {
        let rules = match strategy {
            SubstitutionStrategy::Literal(samples) => Rules::Literal(samples.clone()),
            SubstitutionStrategy::Pattern {
                institution_min_len,
            } => Rules::Pattern(Box::new(PatternRules::compile(*institution_min_len)?)),
        };
        Ok(Self { rules })
    }

    /// New text for a paragraph, or `None` when nothing in `text` is a placeholder.
    pub fn rewrite(&self, text: &str, fields: &CertificateFields) -> Option<String> {
        match &self.rules {
            Rules::Literal(samples) => rewrite_literal(samples, text, fields),
            Rules::Pattern(rules) => rules.rewrite(text, fields),
        }
    }

    /// Rewrite every paragraph (body and table cells) of `document`; returns how many changed.
    pub fn apply(&self, document: &mut StyledDocument, fields: &CertificateFields) -> usize {
        let mut rewritten = 0;
        for mut paragraph in document.paragraphs_mut() {
            let text = paragraph.text();
            if text.is_empty() {
                continue;
            }
            if let Some(new_text) = self.rewrite(&text, fields) {
                paragraph.replace_text(&new_text);
                rewritten += 1;
            }
        }
        log::debug!("rewrote {rewritten} paragraphs");
        rewritten
    }
}

fn rewrite_literal(
    samples: &LiteralSamples,
    text: &str,
    fields: &CertificateFields,
) -> Option<String> {
    let ordered = [
        (&samples.issue_date, &fields.issue_date),
        (&samples.name, &fields.name),
        (&samples.identifier, &fields.identifier),
        (&samples.institution, &fields.institution),
        (&samples.course, &fields.course),
        (&samples.institution_code, &fields.institution_code),
        (&samples.school_year, &fields.school_year),
    ];

    let mut claims = Claims::default();
    for (sample, value) in ordered {
        if sample.is_empty() {
            continue;
        }
        for (start, matched) in text.match_indices(sample.as_str()) {
            claims.claim(start, start + matched.len(), value);
        }
    }
    claims.apply(text)
}
