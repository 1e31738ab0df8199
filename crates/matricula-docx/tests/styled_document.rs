use std::io::{Cursor, Read, Write};

use matricula_docx::{BlockKind, StyledDocument};
use pretty_assertions::assert_eq;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#
    )
}

fn build_docx(document: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document),
        ("word/styles.xml", STYLES),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(bytes.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

const BODY: &str = concat!(
    r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t>Don(a) </w:t></w:r>"#,
    r#"<w:r><w:t>SOFIA MENDEZ FLOREZ</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>, alumno</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t xml:space="preserve">Sin  cambios &amp; listo</w:t></w:r></w:p>"#,
    r#"<w:tbl><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>celda</w:t></w:r></w:p>"#,
    r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>anidada</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    r#"</w:tc></w:tr></w:tbl>"#,
    r#"<w:p/>"#,
);

#[test]
fn lists_body_and_table_cell_paragraphs_in_order() {
    let doc = StyledDocument::from_bytes(&build_docx(&document_xml(BODY))).unwrap();
    assert_eq!(doc.part_name(), "word/document.xml");

    let paragraphs = doc.paragraphs();
    let kinds: Vec<BlockKind> = paragraphs.iter().map(|p| p.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Body,
            BlockKind::Body,
            BlockKind::TableCell,
            BlockKind::TableCell,
            BlockKind::Body,
        ]
    );
    assert_eq!(
        doc.paragraph_texts(),
        vec![
            "Don(a) SOFIA MENDEZ FLOREZ, alumno".to_string(),
            "Sin  cambios & listo".to_string(),
            "celda".to_string(),
            "anidada".to_string(),
            String::new(),
        ]
    );
}

#[test]
fn untouched_document_serializes_identically() {
    let xml = document_xml(BODY);
    let docx = build_docx(&xml);
    let doc = StyledDocument::from_bytes(&docx).unwrap();
    let out = doc.to_bytes().unwrap();

    assert_eq!(read_part(&out, "word/document.xml"), xml);
    assert_eq!(read_part(&out, "word/styles.xml"), STYLES);
    assert_eq!(read_part(&out, "_rels/.rels"), ROOT_RELS);
}

#[test]
fn rewrite_keeps_first_run_style_and_leaves_other_paragraphs_alone() {
    let xml = document_xml(BODY);
    let mut doc = StyledDocument::from_bytes(&build_docx(&xml)).unwrap();
    {
        let mut paragraphs = doc.paragraphs_mut();
        paragraphs[0].replace_text("Don(a) JUAN PÉREZ, alumno");
        paragraphs[2].replace_text("otra celda");
    }

    let out = doc.to_bytes().unwrap();
    let reread = StyledDocument::from_bytes(&out).unwrap();
    let paragraphs = reread.paragraphs();

    let first = paragraphs[0].runs();
    assert_eq!(first[0].text, "Don(a) JUAN PÉREZ, alumno");
    assert!(first[0].style.bold);
    assert_eq!(first[0].style.size_half_points, Some(28));
    assert!(first[1..].iter().all(|run| run.text.is_empty()));

    assert_eq!(paragraphs[1].text(), "Sin  cambios & listo");
    assert_eq!(paragraphs[2].text(), "otra celda");
    assert_eq!(paragraphs[3].text(), "anidada");

    let written = read_part(&out, "word/document.xml");
    assert!(written.contains(
        r#"<w:p><w:r><w:t xml:space="preserve">Sin  cambios &amp; listo</w:t></w:r></w:p>"#
    ));
}

#[test]
fn empty_paragraph_gains_a_single_run() {
    let mut doc = StyledDocument::from_bytes(&build_docx(&document_xml(BODY))).unwrap();
    {
        let mut paragraphs = doc.paragraphs_mut();
        paragraphs[4].replace_text("nuevo");
    }
    let paragraphs = doc.paragraphs();
    let runs = paragraphs[4].runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "nuevo");
    assert!(!runs[0].style.bold);
}

#[test]
fn invalid_templates_are_load_errors() {
    let err = StyledDocument::from_bytes(b"not a zip").unwrap_err();
    assert!(err.is_template_load());

    let docx = build_docx("<w:document><w:body>");
    let err = StyledDocument::from_bytes(&docx).unwrap_err();
    assert!(err.is_template_load());

    let docx = build_docx(r#"<w:styles xmlns:w="urn:x"/>"#);
    let err = StyledDocument::from_bytes(&docx).unwrap_err();
    assert!(err.is_template_load());
}
