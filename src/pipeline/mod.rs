//! From a document model to output bytes: validation, layout, rendering.

mod builder;
mod config;
mod handoff;

pub use builder::FormatterBuilder;
pub use config::{FormatterConfig, HandOff, OutputFormat};

use crate::error::FormatError;
use folio_idf::{Document, PageSequence};
use folio_layout::{LayoutEngine, LayoutOutput};
use folio_render_lopdf::LopdfRenderer;
use folio_render_xml::XmlRenderer;
use folio_style::PageMaster;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A document whose page sequences are decoded one at a time.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    title: Option<String>,
    masters: Vec<PageMaster>,
    sequences: Vec<serde_json::Value>,
}

/// A configured formatting pipeline. Reusable across documents.
pub struct Formatter {
    engine: LayoutEngine,
    config: FormatterConfig,
}

impl Formatter {
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Lays out an in-memory document.
    pub fn layout(&self, document: Document) -> Result<LayoutOutput, FormatError> {
        report_issues(&document);
        match self.config.hand_off {
            HandOff::Direct => Ok(self.engine.layout_document(&document)?),
            HandOff::Buffered { capacity } => handoff::layout_buffered(
                &self.engine,
                &document.masters,
                document.sequences,
                capacity,
                Ok,
            ),
        }
    }

    /// Lays out a document given as JSON text.
    ///
    /// With a buffered hand-off each page sequence is deserialized on the
    /// producer thread while earlier ones are being laid out.
    pub fn layout_json(&self, json: &str) -> Result<(Option<String>, LayoutOutput), FormatError> {
        match self.config.hand_off {
            HandOff::Direct => {
                let document = Document::from_json(json)?;
                let title = document.title.clone();
                Ok((title, self.layout(document)?))
            }
            HandOff::Buffered { capacity } => {
                let raw: RawDocument = serde_json::from_str(json)?;
                let output = handoff::layout_buffered(
                    &self.engine,
                    &raw.masters,
                    raw.sequences,
                    capacity,
                    |value| Ok(serde_json::from_value::<PageSequence>(value)?),
                )?;
                Ok((raw.title, output))
            }
        }
    }

    pub fn render(
        &self,
        output: &LayoutOutput,
        title: Option<String>,
        format: OutputFormat,
    ) -> Result<Vec<u8>, FormatError> {
        let bytes = match format {
            OutputFormat::Pdf => LopdfRenderer::render_to_vec(&output.tree, title)?,
            OutputFormat::AreaXml => XmlRenderer::render_to_string(&output.tree, title)?.into_bytes(),
        };
        Ok(bytes)
    }

    /// Lays out and renders `document` in one go.
    pub fn format(&self, document: Document, format: OutputFormat) -> Result<Vec<u8>, FormatError> {
        let title = document.title.clone();
        let output = self.layout(document)?;
        self.render(&output, title, format)
    }

    /// Reads a JSON document from `input` and writes the result to `output`.
    pub fn format_file(&self, input: &Path, output: &Path) -> Result<LayoutOutput, FormatError> {
        let format = self
            .config
            .output
            .or_else(|| OutputFormat::from_path(output))
            .ok_or_else(|| {
                FormatError::Config(format!(
                    "cannot tell the output format of '{}'; use .pdf or .xml",
                    output.display()
                ))
            })?;
        let json = fs::read_to_string(input)?;
        let (title, laid_out) = self.layout_json(&json)?;
        let bytes = self.render(&laid_out, title, format)?;
        fs::write(output, bytes)?;
        log::info!(
            "Wrote {} page(s) to {}",
            laid_out.tree.page_count(),
            output.display()
        );
        Ok(laid_out)
    }
}

fn report_issues(document: &Document) {
    for issue in document.validate() {
        log::warn!("{issue}");
    }
}
