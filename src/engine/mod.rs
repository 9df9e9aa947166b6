//! Decision engine: pure rule evaluators for both checks.
//!
//! Nothing here performs I/O or keeps state. Every evaluator is total: a
//! profile that no rule claims is deferred to human review instead of
//! raising an error.

pub mod cases;
pub mod part_b;
pub mod part_d;
pub mod result;

pub use part_b::{CoverageSource, EmployerSizeBand, PartBProfile, PartBResult, evaluate};
pub use part_d::{
    Creditable, PartDOutcome, PartDProfile, PartDResult, TriState, evaluate_part_d, part_d_result,
};
pub use result::{Classification, DecisionResult, DecisionStatus};
