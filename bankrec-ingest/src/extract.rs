//! Raw text extraction from PDF, CSV and Excel sources.
//!
//! Every format is reduced to a flat sequence of text lines with page/row
//! metadata, so the pattern layer sees one shape regardless of source.
//! Tabular rows are joined with single spaces; the line patterns are
//! whitespace-tolerant by construction.

use std::path::Path;

use bankrec_core::ParseError;
use calamine::{Data, Reader, open_workbook_auto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Csv,
    Xls,
    Xlsx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<DocumentKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "csv" => Some(DocumentKind::Csv),
            "xls" => Some(DocumentKind::Xls),
            "xlsx" => Some(DocumentKind::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLine {
    /// Page number for PDFs, sheet index for Excel, 0 for CSV.
    pub page: usize,
    /// Row/line index within the page or sheet.
    pub row: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub kind: DocumentKind,
    pub lines: Vec<ExtractedLine>,
}

impl ExtractedDocument {
    /// All lines joined back into one text blob, for detection and
    /// header-metadata patterns that span the whole document.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }

    pub fn from_lines(kind: DocumentKind, lines: impl IntoIterator<Item = String>) -> Self {
        ExtractedDocument {
            kind,
            lines: lines
                .into_iter()
                .enumerate()
                .map(|(row, text)| ExtractedLine { page: 0, row, text })
                .collect(),
        }
    }
}

/// Extract text lines from a statement file, dispatching on extension.
pub fn extract_document(path: &Path) -> Result<ExtractedDocument, ParseError> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| ParseError::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    match kind {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Csv => extract_csv(path),
        DocumentKind::Xls | DocumentKind::Xlsx => extract_excel(path, kind),
    }
}

/// Text-layer PDF extraction. A scanned (image-only) or unreadable PDF
/// yields `UnsupportedDocument`, never an empty line list.
fn extract_pdf(path: &Path) -> Result<ExtractedDocument, ParseError> {
    let text = pdf_extract::extract_text(path).map_err(|_| ParseError::UnsupportedDocument {
        path: path.to_path_buf(),
    })?;
    if text.trim().is_empty() {
        return Err(ParseError::UnsupportedDocument {
            path: path.to_path_buf(),
        });
    }

    let mut lines = Vec::new();
    let mut page = 0;
    for raw in text.lines() {
        // Form feeds mark page boundaries in extracted text.
        let page_breaks = raw.matches('\u{c}').count();
        let cleaned = raw.replace('\u{c}', " ");
        if !cleaned.trim().is_empty() {
            lines.push(ExtractedLine {
                page,
                row: lines.len(),
                text: cleaned.trim_end().to_string(),
            });
        }
        page += page_breaks;
    }
    Ok(ExtractedDocument {
        kind: DocumentKind::Pdf,
        lines,
    })
}

fn extract_csv(path: &Path) -> Result<ExtractedDocument, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => ParseError::Io {
                path: path.to_path_buf(),
                source,
            },
            _ => ParseError::UnsupportedDocument {
                path: path.to_path_buf(),
            },
        })?;

    let mut lines = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|_| ParseError::UnsupportedDocument {
            path: path.to_path_buf(),
        })?;
        let text = record
            .iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            lines.push(ExtractedLine { page: 0, row, text });
        }
    }
    Ok(ExtractedDocument {
        kind: DocumentKind::Csv,
        lines,
    })
}

fn extract_excel(path: &Path, kind: DocumentKind) -> Result<ExtractedDocument, ParseError> {
    let mut workbook = open_workbook_auto(path).map_err(|_| ParseError::UnsupportedDocument {
        path: path.to_path_buf(),
    })?;

    let mut lines = Vec::new();
    let sheet_names = workbook.sheet_names().to_vec();
    for (page, name) in sheet_names.iter().enumerate() {
        let Ok(range) = workbook.worksheet_range(name) else {
            continue;
        };
        for (row, cells) in range.rows().enumerate() {
            let text = cells
                .iter()
                .filter(|c| !matches!(c, Data::Empty))
                .map(|c| c.to_string())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                lines.push(ExtractedLine { page, row, text });
            }
        }
    }
    Ok(ExtractedDocument { kind, lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("a/stmt.PDF")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("stmt.xlsx")),
            Some(DocumentKind::Xlsx)
        );
        assert_eq!(DocumentKind::from_path(Path::new("stmt.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_csv_rows_become_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "HDFC Bank Credit Card Statement").unwrap();
        writeln!(f, "01/08/2024,AMAZON PAY INDIA,1299.00").unwrap();
        writeln!(f, ",,").unwrap();
        drop(f);

        let doc = extract_document(&path).unwrap();
        assert_eq!(doc.kind, DocumentKind::Csv);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[1].text, "01/08/2024 AMAZON PAY INDIA 1299.00");
    }

    #[test]
    fn test_textless_pdf_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4 not really a pdf").unwrap();

        match extract_document(&path) {
            Err(ParseError::UnsupportedDocument { .. }) => {}
            other => panic!("expected UnsupportedDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format() {
        match extract_document(Path::new("stmt.docx")) {
            Err(ParseError::UnknownFormat { .. }) => {}
            other => panic!("expected UnknownFormat, got {other:?}"),
        }
    }
}
