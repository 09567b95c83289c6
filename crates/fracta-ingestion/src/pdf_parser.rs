//! PDF text extraction.
//!
//! Page text comes from `pdf-extract`; pages without text are skipped and
//! the rest are joined with a newline.

use std::path::Path;

use tracing::{debug, instrument};

use fracta_common::{FractaError, Result};

/// Text of a parsed PDF.
#[derive(Debug, Clone, Default)]
pub struct ParsedPdf {
    pub full_text: String,
    pub page_count: usize,
    /// Pages that yielded non-blank text.
    pub pages_with_text: usize,
}

/// Parse a PDF file on disk.
#[instrument(skip_all, fields(path = %pdf_path.display()))]
pub fn parse_pdf(pdf_path: &Path) -> Result<ParsedPdf> {
    if !pdf_path.is_file() {
        return Err(FractaError::PdfNotFound(pdf_path.to_path_buf()));
    }
    let bytes = std::fs::read(pdf_path)?;
    parse_pdf_bytes(&bytes)
}

/// Parse an in-memory PDF.
pub fn parse_pdf_bytes(bytes: &[u8]) -> Result<ParsedPdf> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| FractaError::PdfParse(e.to_string()))?;

    let page_count = pages.len();
    let texts: Vec<&str> = pages
        .iter()
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty())
        .collect();

    let parsed = ParsedPdf {
        full_text: texts.join("\n").trim().to_string(),
        page_count,
        pages_with_text: texts.len(),
    };
    debug!(
        pages = parsed.page_count,
        pages_with_text = parsed.pages_with_text,
        chars = parsed.full_text.len(),
        "PDF text extracted"
    );
    Ok(parsed)
}

/// Full text of the PDF at `pdf_path`.
pub fn extract_text_from_pdf(pdf_path: &Path) -> Result<String> {
    parse_pdf(pdf_path).map(|p| p.full_text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry; an empty entry gives a page
    /// with no text.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut content = String::new();
            for (i, line) in text.lines().enumerate() {
                let y = 700 - (i as i64) * 20;
                content.push_str(&format!("BT /F1 12 Tf 72 {y} Td ({line}) Tj ET\n"));
            }
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_missing_file() {
        let err = parse_pdf(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, FractaError::PdfNotFound(_)));
    }

    #[test]
    fn test_invalid_bytes() {
        let err = parse_pdf_bytes(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, FractaError::PdfParse(_)));
    }

    #[test]
    fn test_blank_pages_are_skipped() {
        let bytes = build_pdf(&["Femoral neck fracture", "", "Hip fixation outcome"]);
        let parsed = parse_pdf_bytes(&bytes).unwrap();
        assert_eq!(parsed.page_count, 3);
        assert_eq!(parsed.pages_with_text, 2);
        assert!(parsed.full_text.contains("Femoral"));
        assert!(parsed.full_text.contains("fixation"));
        assert_eq!(parsed.full_text, parsed.full_text.trim());
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, build_pdf(&["Distal radius fracture"])).unwrap();
        let text = extract_text_from_pdf(&path).unwrap();
        assert!(text.contains("radius"));
    }
}
