pub mod benchmarks;
pub mod client;
pub mod contextual;
pub mod harness;
pub mod session;

pub use crate::domain::model::{Observation, SessionOutcome, SessionReport, StopReason, TrialRecord};
pub use crate::domain::ports::{ContextSource, Objective, OptimizationService, ReportSink, Session};
pub use crate::utils::error::Result;
