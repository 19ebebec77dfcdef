pub mod border;
pub mod dimension;
pub mod page;
pub mod parsers;
pub mod properties;
pub mod text;

pub use border::{Border, BorderStyle, Borders};
pub use dimension::{Edges, Length, PageSize};
pub use page::{PageMaster, SequenceMasters};
pub use parsers::StyleParseError;
pub use properties::{
    BreakClass, Conditionality, FlowKind, Keep, Precedence, Property, Space, applies,
};
pub use text::{DisplayAlign, TextAlign};
