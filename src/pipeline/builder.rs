use super::Formatter;
use super::config::{FormatterConfig, HandOff, OutputFormat};
use crate::error::FormatError;
use folio_layout::{LayoutConfig, LayoutEngine, TextMetrics};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a [`Formatter`].
#[derive(Default)]
pub struct FormatterBuilder {
    config: FormatterConfig,
    metrics: Option<Arc<dyn TextMetrics>>,
}

impl FormatterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts from a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            FormatError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read configuration from '{}': {}", path.display(), e),
            ))
        })?;
        let config = serde_json::from_str(&source)
            .map_err(|e| FormatError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new().with_config(config))
    }

    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout_config(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output = Some(format);
        self
    }

    pub fn with_hand_off(mut self, hand_off: HandOff) -> Self {
        self.config.hand_off = hand_off;
        self
    }

    /// Replaces the built-in base-14 font metrics.
    pub fn with_metrics(mut self, metrics: Arc<dyn TextMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Formatter, FormatError> {
        if let HandOff::Buffered { capacity: 0 } = self.config.hand_off {
            return Err(FormatError::Config(
                "a buffered hand-off needs a capacity of at least one sequence".into(),
            ));
        }
        let engine = match self.metrics {
            Some(metrics) => LayoutEngine::with_metrics(self.config.layout, metrics),
            None => LayoutEngine::new(self.config.layout),
        };
        Ok(Formatter {
            engine,
            config: self.config,
        })
    }
}
