//! Export a [`RankingTable`] as a spreadsheet, CSV or JSON.
//!
//! The XLSX writer produces the smallest valid SpreadsheetML package: one
//! worksheet named `Ranked Resumes`, inline strings (no shared-string
//! table) and no styles. Like the on-screen table, there is no index column
//! in the exported files.

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

use crate::table::{Cell, RankingTable, HEADERS};

pub const SHEET_NAME: &str = "Ranked Resumes";
pub const DEFAULT_FILE_STEM: &str = "ranked_resumes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    /// Picks the format from a path's extension; anything unknown is XLSX.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => ExportFormat::Csv,
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Xlsx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("{}.{}", DEFAULT_FILE_STEM, self.extension())
    }
}

/// Serialises `table` in `format`.
pub fn to_bytes(table: &RankingTable, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => to_xlsx(table),
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Json => {
            let json = serde_json::to_vec_pretty(&table.rows)?;
            Ok(json)
        }
    }
}

/// Writes `table` to `path`, creating parent directories as needed.
pub fn write_file(table: &RankingTable, path: &Path, format: ExportFormat) -> Result<()> {
    let bytes = to_bytes(table, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(())
}

fn to_csv(table: &RankingTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for row in &table.rows {
        let record: Vec<String> = row.cells().iter().map(Cell::to_string).collect();
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV export failed: {}", e))
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(SHEET_NAME)
    )
}

/// Spreadsheet column letters: 0 → A, 25 → Z, 26 → AA.
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn cell_xml(cell: &Cell, reference: &str) -> String {
    match cell {
        Cell::Text(s) => format!(
            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            escape(s.as_str())
        ),
        Cell::Number(n) => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n),
        Cell::Empty => String::new(),
    }
}

fn sheet_xml(table: &RankingTable) -> String {
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(table.len() + 1);
    rows.push(HEADERS.iter().map(|h| Cell::Text(h.to_string())).collect());
    rows.extend(table.rows.iter().map(|r| r.cells()));

    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, cells) in rows.iter().enumerate() {
        let row_num = r + 1;
        out.push_str(&format!(r#"<row r="{}">"#, row_num));
        for (c, cell) in cells.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), row_num);
            out.push_str(&cell_xml(cell, &reference));
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData></worksheet>");
    out
}

fn to_xlsx(table: &RankingTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let sheet = sheet_xml(table);
        let workbook = workbook_xml();
        let parts: [(&str, &str); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", ROOT_RELS_XML),
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ];
        for (name, content) in parts {
            zip.start_file(name, SimpleFileOptions::default())
                .with_context(|| format!("Failed to add {} to workbook", name))?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish().context("Failed to finish workbook")?;
    }
    Ok(buf)
}
