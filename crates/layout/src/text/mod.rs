//! Measuring and breaking the inline content of paragraphs.

pub mod lines;
pub mod metrics;

pub use lines::{CITATION_PLACEHOLDER, LineItem, LineLayout, break_lines};
pub use metrics::{Base14Metrics, FixedMetrics, TextMetrics};
