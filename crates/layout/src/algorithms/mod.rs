pub mod breaking;
pub mod justify;
pub mod space;
pub mod stepper;

pub use breaking::{BreakPosition, BreakResult, BreakingAlgorithm, PartDiagnostic, PartExtents};
pub use justify::{AdjustmentLedger, AdjustmentNegotiator, justify_part};
pub use stepper::{CellPart, RowGroup, RowStep, TableStepper};
