use folio_layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the formatter writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    /// The area tree as XML, for inspecting layout results.
    AreaXml,
}

impl OutputFormat {
    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(OutputFormat::Pdf),
            "xml" => Some(OutputFormat::AreaXml),
            _ => None,
        }
    }
}

/// How page sequences travel from decoding to layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum HandOff {
    /// Decode everything, then lay out on the calling thread.
    #[default]
    Direct,
    /// Decode on a producer thread, at most `capacity` sequences ahead of
    /// layout.
    Buffered { capacity: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterConfig {
    pub layout: LayoutConfig,
    /// Forces an output format; otherwise it follows the output file name.
    pub output: Option<OutputFormat>,
    pub hand_off: HandOff,
}
