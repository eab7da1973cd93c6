//! Minimal SpreadsheetML workbook writer.
//!
//! Produces one worksheet named `Registros`. Headers use export labels,
//! text cells are inline strings, and date-column values that parse as
//! dates from 1900-03-01 on become numeric cells styled `yyyy-mm-dd`.

use super::ExportResult;
use crate::model::column::{export_label, is_date_column};
use crate::model::date::{parse_day_first, spreadsheet_serial};
use crate::model::table::Table;
use log::info;
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const SHEET_NAME: &str = "Registros";

/// Index of the `yyyy-mm-dd` cell format in `STYLES_XML`.
const DATE_STYLE: u32 = 1;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

/// Encodes `table` as an `.xlsx` workbook.
pub fn to_xlsx(table: &Table) -> ExportResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML)?;
    write_part(&mut zip, "_rels/.rels", ROOT_RELS_XML)?;
    write_part(&mut zip, "xl/workbook.xml", &workbook_xml())?;
    write_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML)?;
    write_part(&mut zip, "xl/styles.xml", STYLES_XML)?;
    write_part(&mut zip, "xl/worksheets/sheet1.xml", &sheet_xml(table))?;

    let bytes = zip.finish()?.into_inner();
    info!(
        "event=export_xlsx module=export status=ok rows={} bytes={}",
        table.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_part(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    body: &str,
) -> ExportResult<()> {
    zip.start_file(name, SimpleFileOptions::default())?;
    zip.write_all(body.as_bytes())?;
    Ok(())
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(SHEET_NAME)
    )
}

fn sheet_xml(table: &Table) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (position, column) in table.columns().iter().enumerate() {
        push_text_cell(&mut xml, &cell_ref(position, 1), &export_label(column));
    }
    xml.push_str("</row>");

    for (offset, row) in table.rows().iter().enumerate() {
        let row_number = offset + 2;
        let _ = write!(xml, r#"<row r="{row_number}">"#);
        for (position, column) in table.columns().iter().enumerate() {
            let value = row.record.get(column);
            if value.is_empty() {
                continue;
            }
            let reference = cell_ref(position, row_number);
            let serial = is_date_column(column)
                .then(|| parse_day_first(value))
                .flatten()
                .and_then(spreadsheet_serial);
            match serial {
                Some(serial) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{reference}" s="{DATE_STYLE}"><v>{serial}</v></c>"#
                    );
                }
                None => push_text_cell(&mut xml, &reference, value),
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_text_cell(xml: &mut String, reference: &str, text: &str) {
    let _ = write!(
        xml,
        r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        escape(&*encode_control_chars(text))
    );
}

/// Replaces characters XML 1.0 cannot carry with the OOXML `_xHHHH_` escape.
fn encode_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_xml_forbidden) {
        return Cow::Borrowed(text);
    }
    let mut encoded = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if is_xml_forbidden(ch) {
            let _ = write!(encoded, "_x{:04X}_", ch as u32);
        } else {
            encoded.push(ch);
        }
    }
    Cow::Owned(encoded)
}

fn is_xml_forbidden(ch: char) -> bool {
    matches!(
        ch,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// A1-style reference for a zero-based column and one-based row.
fn cell_ref(column: usize, row: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = column + 1;
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push(b'A' + digit as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    format!("{}{row}", String::from_utf8_lossy(&letters))
}
