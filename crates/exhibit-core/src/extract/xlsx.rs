//! Spreadsheet workbook extraction.
//!
//! Sheet names come from `xl/workbook.xml` in file order. Each sheet's
//! worksheet part is resolved through the workbook relationships and then
//! streamed row by row rather than loaded whole, since worksheet parts
//! dominate the container size.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ForensicError, Result};
use crate::extract::{opc, truncate_to_hour, FileFacts};
use crate::record::{Metadata, SpreadsheetMetadata};

/// Workbook structure part: sheet names and relationship ids.
const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Relationships resolving sheet ids to worksheet part names.
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// Extract spreadsheet metadata from the container at `path`.
pub fn extract(path: &Path, facts: FileFacts) -> Result<Metadata> {
    let mut archive = opc::open_container(path)?;

    let props = match opc::read_optional_part(&mut archive, opc::CORE_PROPERTIES_PART)? {
        Some(xml) => opc::parse_core_properties(&xml)?,
        None => Default::default(),
    };

    let workbook_xml = opc::read_part(&mut archive, WORKBOOK_PART)?;
    let sheets = parse_sheet_entries(&workbook_xml)?;

    let rels_xml = opc::read_part(&mut archive, WORKBOOK_RELS_PART)?;
    let relationships = parse_relationships(&rels_xml)?;

    let mut sheet_names = Vec::with_capacity(sheets.len());
    let mut num_cells: u64 = 0;

    for sheet in &sheets {
        let target = relationships.get(&sheet.rel_id).ok_or_else(|| {
            ForensicError::Extraction(format!(
                "no relationship {:?} for sheet {:?}",
                sheet.rel_id, sheet.name
            ))
        })?;
        let part = sheet_part_name(target);

        let worksheet = archive.by_name(&part).map_err(|e| {
            ForensicError::Extraction(format!("cannot open worksheet part {part:?}: {e}"))
        })?;
        num_cells += count_rows(BufReader::new(worksheet), &part)?;

        sheet_names.push(sheet.name.clone());
    }

    Ok(Metadata::Spreadsheet(SpreadsheetMetadata {
        size_bytes: facts.size_bytes,
        last_access: facts.last_access,
        creator: props.creator,
        title: props.title,
        created: truncate_to_hour(&props.created),
        modified: truncate_to_hour(&props.modified),
        num_sheets: sheet_names.len() as u64,
        sheet_names,
        num_cells,
    }))
}

#[derive(Debug, PartialEq, Eq)]
struct SheetEntry {
    name: String,
    rel_id: String,
}

/// List the workbook's sheets in file order.
///
/// The `r:id` attribute matches on its local name `id`, which is distinct
/// from the unprefixed `sheetId` attribute carried by the same element.
fn parse_sheet_entries(xml: &str) -> Result<Vec<SheetEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                let mut name = None;
                let mut rel_id = None;

                for attr in e.attributes() {
                    let attr = attr.map_err(|e| opc::malformed(WORKBOOK_PART, e))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| opc::malformed(WORKBOOK_PART, e))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"name" => name = Some(value),
                        b"id" => rel_id = Some(value),
                        _ => {}
                    }
                }

                sheets.push(SheetEntry {
                    name: name.ok_or_else(|| {
                        ForensicError::Extraction("workbook sheet without a name".into())
                    })?,
                    rel_id: rel_id.ok_or_else(|| {
                        ForensicError::Extraction("workbook sheet without a relationship id".into())
                    })?,
                });
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(opc::malformed(WORKBOOK_PART, e)),
        }
    }

    Ok(sheets)
}

/// Map relationship ids to their targets.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;

                for attr in e.attributes() {
                    let attr = attr.map_err(|e| opc::malformed(WORKBOOK_RELS_PART, e))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| opc::malformed(WORKBOOK_RELS_PART, e))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }

                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(opc::malformed(WORKBOOK_RELS_PART, e)),
        }
    }

    Ok(relationships)
}

/// Resolve a relationship target to a container part name.
///
/// Targets are normally relative to `xl/`; a leading slash marks a target
/// already rooted at the container.
fn sheet_part_name(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Count the rows a row-iterating reader yields for a worksheet part.
///
/// Sparse sheets are iterated padded: gap rows and trailing empty rows up
/// to the declared `<dimension>` end row all count, and physical rows
/// beyond the declared range are cut off. Without a usable dimension the
/// highest row reference decides; rows carrying no reference advance a
/// positional cursor, so unreferenced sheets fall back to the physical
/// element count.
fn count_rows<R: BufRead>(source: R, part: &str) -> Result<u64> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut declared_end: Option<u64> = None;
    let mut cursor: u64 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"dimension" => {
                        for attr in e.attributes() {
                            let attr = attr.map_err(|err| opc::malformed(part, err))?;
                            if attr.key.local_name().as_ref() == b"ref" {
                                let value = attr
                                    .unescape_value()
                                    .map_err(|err| opc::malformed(part, err))?;
                                declared_end = dimension_end_row(&value);
                            }
                        }
                    }
                    b"row" => {
                        let mut reference = None;
                        for attr in e.attributes() {
                            let attr = attr.map_err(|err| opc::malformed(part, err))?;
                            if attr.key.local_name().as_ref() == b"r" {
                                reference = attr
                                    .unescape_value()
                                    .map_err(|err| opc::malformed(part, err))?
                                    .parse::<u64>()
                                    .ok();
                            }
                        }
                        cursor = match reference {
                            Some(row) => cursor.max(row),
                            None => cursor + 1,
                        };
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(opc::malformed(part, e)),
        }
        buf.clear();
    }

    Ok(declared_end.unwrap_or(cursor))
}

/// End row of an `A1:B10`-style dimension reference.
fn dimension_end_row(reference: &str) -> Option<u64> {
    let cell = reference.rsplit_once(':').map_or(reference, |(_, end)| end);
    cell.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<?xml version="1.0"?>
        <workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
                  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
            <sheets>
                <sheet name="Revenue" sheetId="1" r:id="rId1"/>
                <sheet name="Costs" sheetId="2" r:id="rId2"/>
            </sheets>
        </workbook>"#;

    #[test]
    fn test_sheets_listed_in_file_order() {
        let sheets = parse_sheet_entries(WORKBOOK).unwrap();
        assert_eq!(
            sheets,
            vec![
                SheetEntry {
                    name: "Revenue".to_string(),
                    rel_id: "rId1".to_string()
                },
                SheetEntry {
                    name: "Costs".to_string(),
                    rel_id: "rId2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_rel_id_comes_from_r_id_not_sheet_id() {
        // sheetId is a workbook-internal counter unrelated to the
        // relationship id; only r:id resolves through the rels part
        let sheets = parse_sheet_entries(WORKBOOK).unwrap();
        assert_eq!(sheets[0].rel_id, "rId1");
        assert_ne!(sheets[0].rel_id, "1");
    }

    #[test]
    fn test_sheet_missing_name_is_an_error() {
        let xml = r#"<workbook xmlns:r="x"><sheets><sheet r:id="rId1"/></sheets></workbook>"#;
        assert!(matches!(
            parse_sheet_entries(xml).unwrap_err(),
            ForensicError::Extraction(_)
        ));
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t" Target="worksheets/sheet1.xml"/>
            <Relationship Id="rId2" Type="t" Target="worksheets/sheet2.xml"/>
        </Relationships>"#;

        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels["rId1"], "worksheets/sheet1.xml");
        assert_eq!(rels["rId2"], "worksheets/sheet2.xml");
    }

    #[test]
    fn test_sheet_part_name_resolution() {
        assert_eq!(
            sheet_part_name("worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            sheet_part_name("/xl/worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
    }

    #[test]
    fn test_count_rows_includes_self_closing() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="2"/>
            <row r="3"><c r="A3"/></row>
        </sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_sparse_sheet_counts_to_declared_end_row() {
        // Gap and trailing rows inside the declared range surface as rows
        // when the sheet is iterated, so they count
        let xml = r#"<worksheet><dimension ref="A1:A100"/><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="100"><c r="A100"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 100);
    }

    #[test]
    fn test_declared_dimension_caps_physical_rows() {
        let xml = r#"<worksheet><dimension ref="A1:B2"/><sheetData>
            <row r="1"/><row r="2"/><row r="3"/><row r="4"/>
        </sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_row_gap_without_dimension_counts_to_highest_reference() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"/>
            <row r="5"/>
        </sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 5);
    }

    #[test]
    fn test_unreferenced_rows_fall_back_to_physical_count() {
        let xml = r#"<worksheet><sheetData><row/><row/><row/></sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_unusable_dimension_falls_back_to_row_references() {
        let xml = r#"<worksheet><dimension ref="garbage"/><sheetData>
            <row r="1"/><row r="2"/>
        </sheetData></worksheet>"#;

        let rows = count_rows(Cursor::new(xml.as_bytes()), "test").unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_missing_relationship_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in [
            (
                WORKBOOK_PART,
                r#"<workbook xmlns:r="x"><sheets><sheet name="Lone" r:id="rId9"/></sheets></workbook>"#,
            ),
            (WORKBOOK_RELS_PART, "<Relationships/>"),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        std::fs::write(&path, writer.finish().unwrap().into_inner()).unwrap();

        let facts = FileFacts::capture(&path).unwrap();
        let err = extract(&path, facts).unwrap_err();
        assert!(matches!(err, ForensicError::Extraction(_)));
        assert!(err.to_string().contains("rId9"));
    }
}
