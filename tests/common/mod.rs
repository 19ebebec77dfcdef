pub mod fixtures;

use folio::{FormatError, FormatterBuilder, OutputFormat};
use lopdf::Document as LopdfDocument;
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of one page, 1-based like the PDF page numbers.
    pub fn page_text(&self, page: u32) -> String {
        self.doc.extract_text(&[page]).unwrap_or_default()
    }

    /// Link annotations on one page, 1-based.
    pub fn link_count(&self, page: u32) -> usize {
        let pages = self.doc.get_pages();
        let Some(id) = pages.get(&page) else {
            return 0;
        };
        self.doc
            .get_dictionary(*id)
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
            .and_then(|annots| annots.as_array().ok())
            .map(|annots| annots.len())
            .unwrap_or(0)
    }
}

/// Formats a JSON document to PDF with the default configuration.
pub fn generate_pdf(document: &Value) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    init_logger();
    let formatter = FormatterBuilder::new().build()?;
    let document = serde_json::from_value(document.clone())?;
    let bytes = formatter.format(document, OutputFormat::Pdf)?;
    GeneratedPdf::from_bytes(bytes)
}

/// Formats a JSON document to area-tree XML.
pub fn generate_xml(document: &Value) -> Result<String, FormatError> {
    init_logger();
    let formatter = FormatterBuilder::new().build()?;
    let document = serde_json::from_value(document.clone())?;
    let bytes = formatter.format(document, OutputFormat::AreaXml)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
