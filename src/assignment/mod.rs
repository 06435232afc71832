//! Instructor assignment as a constraint model.
//!
//! - [`AssignmentModelBuilder`]: hard rules (coverage, exclusivity,
//!   weekly caps) over the working calendar.
//! - [`FairnessController`]: equity band and load-spread objective.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Artificial
//! Intelligence Review 13(2)

mod builder;
mod fairness;

pub use builder::{AssignmentModel, AssignmentModelBuilder, WorkloadLimits};
pub use fairness::{EquityBand, FairnessController};
