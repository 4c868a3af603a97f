pub mod fixtures;
pub mod pdf_assertions;

use handreceipt::{GenerateError, Generator, HeaderMeta, IssuedItem, LayoutConfig, RenderSummary};
use lopdf::Document as LopdfDocument;
use std::path::Path;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Get the number of pages in the PDF
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Strings shown by the overlay of page `page_number` (1-based), in drawing order.
    pub fn overlay_text(&self, page_number: u32) -> Vec<String> {
        pdf_assertions::overlay_strings(&self.doc, page_number)
    }

    /// Decoded template content of page `page_number`.
    pub fn page_content(&self, page_number: u32) -> String {
        pdf_assertions::page_content(&self.doc, page_number)
    }
}

pub fn sample_meta() -> HeaderMeta {
    HeaderMeta::new("SSG Issuer", "SPC Custodian", "555-0142")
}

/// Runs a generation from `template` into `dir/receipt.pdf`.
pub fn generate_into(
    dir: &Path,
    template: &Path,
    items: &[IssuedItem],
    cfg: &LayoutConfig,
) -> Result<(RenderSummary, GeneratedPdf), Box<dyn std::error::Error>> {
    let output = dir.join("receipt.pdf");
    let summary = Generator::new(template).generate(&output, &sample_meta(), items, cfg)?;
    let pdf = GeneratedPdf::open(&output)?;
    Ok((summary, pdf))
}

/// Runs a generation expected to fail and returns its error.
pub fn generate_err(template: &Path, output: &Path, items: &[IssuedItem]) -> GenerateError {
    let cfg = LayoutConfig::default();
    match Generator::new(template).generate(output, &sample_meta(), items, &cfg) {
        Ok(summary) => panic!("generation unexpectedly succeeded: {summary:?}"),
        Err(err) => err,
    }
}
