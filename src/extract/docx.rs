// DOCX text extraction backed by docx-rust

use super::DocumentTextExtractor;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use docx_rust::document::{BodyContent, Table, TableCell, TableCellContent, TableRowContent};
use docx_rust::DocxFile;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(path: &Path) -> AppResult<String> {
        let file = DocxFile::from_file(path)
            .map_err(|e| AppError::UnreadableDocument(format!("not a valid DOCX archive: {}", e)))?;
        let docx = file
            .parse()
            .map_err(|e| AppError::UnreadableDocument(format!("failed to parse DOCX body: {}", e)))?;

        Ok(body_text(&docx.document.body.content))
    }
}

/// Paragraph and table text in document order. Table rows become one line
/// each, with cells separated by tabs.
fn body_text(content: &[BodyContent<'_>]) -> String {
    let mut lines = Vec::new();

    for block in content {
        match block {
            BodyContent::Paragraph(paragraph) => lines.push(paragraph.text()),
            BodyContent::Sdt(sdt) => lines.push(sdt.text()),
            BodyContent::Table(table) => lines.extend(table_lines(table)),
            BodyContent::TableCell(cell) => lines.push(cell_text(cell)),
            BodyContent::Run(_) | BodyContent::SectionProperty(_) => {}
        }
    }

    lines.join("\n")
}

fn table_lines(table: &Table<'_>) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| match cell {
                    TableRowContent::TableCell(cell) => cell_text(cell),
                    TableRowContent::SDT(sdt) => sdt.text(),
                })
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect()
}

fn cell_text(cell: &TableCell<'_>) -> String {
    cell.content
        .iter()
        .map(|content| match content {
            TableCellContent::Paragraph(paragraph) => paragraph.text(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentTextExtractor for DocxExtractor {
    async fn extract_text(&self, path: &Path) -> AppResult<String> {
        let path: PathBuf = path.to_path_buf();

        // docx-rust parses synchronously
        let text = tokio::task::spawn_blocking(move || Self::extract_blocking(&path))
            .await
            .map_err(|e| AppError::Internal(format!("DOCX extraction task failed: {}", e)))??;

        debug!(chars = text.chars().count(), "Extracted DOCX text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rust::document::{Paragraph, TableRow};
    use docx_rust::Docx;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extracts_paragraph_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("minutes.docx");

        let mut docx = Docx::default();
        docx.document.push(Paragraph::default().push_text("Board meeting minutes"));
        docx.document.push(Paragraph::default().push_text("Revenue grew 12 percent"));
        docx.write_file(&path).unwrap();

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        assert!(text.contains("Board meeting minutes"));
        assert!(text.contains("Revenue grew 12 percent"));
    }

    #[tokio::test]
    async fn test_table_only_document_keeps_cell_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("figures.docx");

        let mut docx = Docx::default();
        docx.document.push(
            Table::default()
                .push_row(
                    TableRow::default()
                        .push_cell(Paragraph::default().push_text("Revenue"))
                        .push_cell(Paragraph::default().push_text("12M")),
                )
                .push_row(
                    TableRow::default()
                        .push_cell(Paragraph::default().push_text("Churn"))
                        .push_cell(Paragraph::default().push_text("3%")),
                ),
        );
        docx.write_file(&path).unwrap();

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        assert!(text.contains("Revenue\t12M"));
        assert!(text.contains("Churn\t3%"));
    }

    #[tokio::test]
    async fn test_mixed_document_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.docx");

        let mut docx = Docx::default();
        docx.document.push(Paragraph::default().push_text("Quarterly results"));
        docx.document.push(
            Table::default().push_row(
                TableRow::default().push_cell(Paragraph::default().push_text("Revenue 12M")),
            ),
        );
        docx.document.push(Paragraph::default().push_text("Outlook stable"));
        docx.write_file(&path).unwrap();

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        let intro = text.find("Quarterly results").unwrap();
        let table = text.find("Revenue 12M").unwrap();
        let outro = text.find("Outlook stable").unwrap();
        assert!(intro < table && table < outro);
    }

    #[tokio::test]
    async fn test_blank_document_yields_empty_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.docx");
        Docx::default().write_file(&path).unwrap();

        let text = DocxExtractor::new().extract_text(&path).await.unwrap();
        assert!(text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.docx");
        tokio::fs::write(&path, b"definitely not a zip archive").await.unwrap();

        let result = DocxExtractor::new().extract_text(&path).await;
        assert!(matches!(result, Err(AppError::UnreadableDocument(_))));
    }
}
