pub mod color;
pub mod geometry;
pub mod ids;
pub mod units;

pub use color::Color;
pub use geometry::{Point, Rect, Size, Transform};
pub use ids::{OwnerHandle, PageIndex, RefId};
pub use units::{Mpt, from_pt, to_pt};
