//! Rendering abstractions shared by the output backends.
//!
//! - `DocumentRenderer`: the per-page painting contract a backend implements
//! - `IdLookup`: where each identifier landed, for link destinations
//! - `render_area_tree`: walks a finished area tree through a renderer

mod driver;
mod error;
mod lookup;
mod traits;
pub mod utils;

pub use driver::render_area_tree;
pub use error::RenderError;
pub use lookup::{IdLookup, LinkTarget};
pub use traits::{DocumentInfo, DocumentRenderer};
