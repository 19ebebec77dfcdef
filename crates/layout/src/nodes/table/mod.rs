pub mod grid;
pub mod node;

pub use node::TableNode;

/// Element index of the auxiliary box that redraws the header after a break.
pub const HEADER_INDEX: usize = usize::MAX - 3;
/// Element index of the break penalty that draws the footer before a break.
pub const FOOTER_INDEX: usize = usize::MAX - 4;
