use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, open_workbook_auto_from_rs};

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadCause, LoadFuture, Segment, decode_blocking,
    metadata_for, read_limited,
};

/// Workbooks: one segment per non-empty sheet, rows as tab-separated lines. `page`
/// is the zero-based sheet index.
pub struct SpreadsheetLoader {
    pub max_file_size: u64,
}

impl Default for SpreadsheetLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for SpreadsheetLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let bytes = read_limited(&path, max_size).await?;
            let sheets = decode_blocking(&path, move || sheet_texts(bytes)).await?;

            let base = metadata_for(&path);
            Ok(sheets
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.is_empty())
                .map(|(sheet, text)| Segment::new(text, base.clone().with_page(sheet)))
                .collect())
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xls", "ods"]
    }
}

fn sheet_texts(bytes: Vec<u8>) -> Result<Vec<String>, LoadCause> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadCause::Spreadsheet(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| LoadCause::Spreadsheet(format!("sheet {name:?}: {e}")))?;
        let rows: Vec<String> = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\t")
                    .trim_end()
                    .to_owned()
            })
            .filter(|line| !line.trim().is_empty())
            .collect();
        sheets.push(rows.join("\n"));
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentError;
    use crate::document::loader::ooxml::fixtures::zip_entries;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Terms" sheetId="1" r:id="rId1"/><sheet name="Blank" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

    const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>term</t></is></c><c r="B1" t="inlineStr"><is><t>count</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>ribosome</t></is></c><c r="B2"><v>3</v></c></row></sheetData></worksheet>"#;

    const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#;

    fn xlsx() -> Vec<u8> {
        zip_entries(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ])
    }

    #[tokio::test]
    async fn sheet_rows_are_tab_separated() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("terms.xlsx");
        std::fs::write(&file, xlsx()).unwrap();

        let segments = SpreadsheetLoader::default().load(&file).await.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "term\tcount\nribosome\t3");
        assert_eq!(segments[0].metadata.page, Some(0));
        assert_eq!(segments[0].metadata.file_type, "xlsx");
    }

    #[tokio::test]
    async fn garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("junk.xls");
        std::fs::write(&file, "not a workbook").unwrap();

        let err = SpreadsheetLoader::default().load(&file).await.unwrap_err();
        assert!(matches!(err, DocumentError::Load { .. }));
    }
}
