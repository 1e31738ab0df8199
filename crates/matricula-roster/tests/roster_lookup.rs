use std::io::{Cursor, Write};

use matricula_roster::{
    find, load_roster, read_roster_xlsx, LookupStrategy, RosterColumns, RosterError,
};
use pretty_assertions::assert_eq;
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Resumen" sheetId="1" r:id="rId1"/><sheet name="Prematricula" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>SAL_RUN</t></si><si><t>NOM_RBD</t></si><si><t>RBD_PRE</t></si><si><t>COD_GRADO_GLOSA_PRE</t></si><si><t>LET_CUR_PRE</t></si><si><t>ANO_ESCOLAR</t></si><si><t>NOM_COM_RBD</t></si><si><t>ESCUELA X</t></si><si><t>6° básico</t></si><si><t>SANTA CORINA</t></si><si><t>LICEO Y</t></si></sst>"#;

const SUMMARY_SHEET: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>resumen</t></is></c></row></sheetData></worksheet>"#;

const ROSTER_SHEET: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c><c r="D1" t="s"><v>3</v></c><c r="E1" t="s"><v>4</v></c><c r="F1" t="s"><v>5</v></c><c r="G1" t="s"><v>6</v></c></row>
<row r="2"><c r="A2"><v>12345678</v></c><c r="B2" t="s"><v>7</v></c><c r="C2"><v>1</v></c><c r="D2" t="s"><v>8</v></c><c r="E2" t="inlineStr"><is><t>C</t></is></c><c r="F2"><v>2026.0</v></c><c r="G2" t="s"><v>9</v></c></row>
<row r="3"><c r="A3"><v>19560438</v></c><c r="B3" t="s"><v>10</v></c><c r="C3"><v>8521</v></c><c r="D3" t="s"><v>8</v></c><c r="E3" t="inlineStr"><is><t>A</t></is></c><c r="F3"><v>2026</v></c><c r="G3" t="s"><v>9</v></c></row>
<row r="4"><c r="B4" t="s"><v>10</v></c></row>
</sheetData></worksheet>"#;

fn build_xlsx() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, xml) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/sharedStrings.xml", SHARED_STRINGS),
        ("xl/worksheets/sheet1.xml", SUMMARY_SHEET),
        ("xl/worksheets/sheet2.xml", ROSTER_SHEET),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn reads_the_named_worksheet() {
    let collection =
        read_roster_xlsx(&build_xlsx(), Some("prematricula"), &RosterColumns::default()).unwrap();
    assert_eq!(collection.len(), 2);

    let record = collection.get(12345678).unwrap();
    assert_eq!(record.institution, "ESCUELA X");
    assert_eq!(record.institution_code, "1");
    assert_eq!(record.grade, "6° básico");
    assert_eq!(record.section, "C");
    assert_eq!(record.school_year, "2026");
    assert_eq!(record.commune, "SANTA CORINA");

    let stats = collection.stats();
    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.institutions, 2);
    assert_eq!(stats.school_year.as_deref(), Some("2026"));
}

#[test]
fn first_worksheet_without_roster_columns_is_an_error() {
    let err = read_roster_xlsx(&build_xlsx(), None, &RosterColumns::default()).unwrap_err();
    assert!(matches!(err, RosterError::MissingColumn(_)), "got {err:?}");

    let err = read_roster_xlsx(&build_xlsx(), Some("Hoja1"), &RosterColumns::default()).unwrap_err();
    assert!(matches!(err, RosterError::SheetNotFound(name) if name == "Hoja1"));
}

#[test]
fn lookup_accepts_every_common_spelling() {
    let collection =
        read_roster_xlsx(&build_xlsx(), Some("Prematricula"), &RosterColumns::default()).unwrap();

    let cases = [
        ("12345678", LookupStrategy::WholeInput),
        ("12345678-5", LookupStrategy::WithoutCheckDigit),
        ("12.345.678-5", LookupStrategy::WithoutCheckDigit),
        ("123456785", LookupStrategy::WithoutCheckDigit),
        (" 12 345 678 - 5 ", LookupStrategy::WithoutCheckDigit),
        ("12.345.678-5x", LookupStrategy::WithoutTrailingPair),
    ];
    for (input, strategy) in cases {
        let found = find(&collection, input).unwrap_or_else(|| panic!("{input} not found"));
        assert_eq!(found.record.id_base, 12345678, "{input}");
        assert_eq!(found.strategy, strategy, "{input}");
    }

    let found = find(&collection, "19.560.438-k").unwrap();
    assert_eq!(found.record.institution, "LICEO Y");

    assert!(find(&collection, "11.111.111-1").is_none());
    assert!(find(&collection, "").is_none());
    assert!(find(&collection, "abc").is_none());
}

#[test]
fn load_roster_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();

    let xlsx_path = dir.path().join("Prematricula_2026.XLSX");
    std::fs::write(&xlsx_path, build_xlsx()).unwrap();
    let collection =
        load_roster(&xlsx_path, Some("Prematricula"), &RosterColumns::default()).unwrap();
    assert_eq!(collection.len(), 2);

    let csv_path = dir.path().join("roster.csv");
    std::fs::write(
        &csv_path,
        "SAL_RUN;NOM_RBD;RBD_PRE;COD_GRADO_GLOSA_PRE;LET_CUR_PRE;ANO_ESCOLAR;NOM_COM_RBD\n7654321;ESCUELA Z;3;1° medio;B;2026;LOTA\n",
    )
    .unwrap();
    let collection = load_roster(&csv_path, None, &RosterColumns::default()).unwrap();
    assert_eq!(collection.get(7654321).unwrap().grade, "1° medio");

    let other = dir.path().join("roster.ods");
    std::fs::write(&other, b"").unwrap();
    assert!(matches!(
        load_roster(&other, None, &RosterColumns::default()),
        Err(RosterError::UnsupportedFormat(_))
    ));
}
