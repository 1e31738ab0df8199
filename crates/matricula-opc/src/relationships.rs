//! `.rels` parsing and relationship target resolution.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::OpcError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn is_external(&self) -> bool {
        self.target_mode
            .as_deref()
            .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External"))
    }
}

/// Name of the relationships part describing `part_name` (`word/document.xml` ->
/// `word/_rels/document.xml.rels`). The package-level relationships live at `_rels/.rels`, which
/// is what an empty `part_name` yields.
pub fn rels_part_name(part_name: &str) -> String {
    let part_name = part_name.strip_prefix('/').unwrap_or(part_name);
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_name}.rels"),
    }
}

/// Resolve a relationship `target` relative to the part that declared it.
pub fn resolve_target(base_part: &str, target: &str) -> String {
    // Part names never carry URI fragments.
    let target = target.split_once('#').map(|(base, _)| base).unwrap_or(target);
    if target.is_empty() {
        return base_part.strip_prefix('/').unwrap_or(base_part).to_string();
    }

    let (target, base_dir) = match target.strip_prefix('/') {
        Some(absolute) => (absolute, ""),
        None => (
            target,
            base_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(""),
        ),
    };

    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(segment),
        }
    }
    components.join("/")
}

pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, OpcError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) | Event::Empty(start)
                if local_name(start.name().as_ref()).eq_ignore_ascii_case(b"Relationship") =>
            {
                let mut id = None;
                let mut target = None;
                let mut type_uri = None;
                let mut target_mode = None;
                for attr in start.attributes() {
                    let attr = attr?;
                    let key = local_name(attr.key.as_ref());
                    let value = attr.unescape_value()?.into_owned();
                    if key.eq_ignore_ascii_case(b"Id") {
                        id = Some(value);
                    } else if key.eq_ignore_ascii_case(b"Target") {
                        target = Some(value);
                    } else if key.eq_ignore_ascii_case(b"Type") {
                        type_uri = Some(value);
                    } else if key.eq_ignore_ascii_case(b"TargetMode") {
                        target_mode = Some(value);
                    }
                }
                if let (Some(id), Some(target), Some(type_uri)) = (id, target, type_uri) {
                    relationships.push(Relationship {
                        id,
                        type_uri,
                        target,
                        target_mode,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Strip a namespace prefix from a qualified XML name (`w:p` -> `p`).
pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
