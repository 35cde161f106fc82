//! Placement and dispatch - decides where each task runs, and runs it there.
//!
//! The [`DecisionEngine`] scores candidate locations against live
//! telemetry; the [`ExecutionDispatcher`] carries the decision out with a
//! single fallback attempt; the [`TaskRegistry`] tracks what is in flight.

#![warn(missing_docs)]

pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod registry;

pub use config::{ConfigError, CostModel, DecisionRules};
pub use decision::DecisionEngine;
pub use dispatcher::{
    DispatchError, EngineStatus, ExecutionDispatcher, ExecutionReport, Workload,
};
pub use registry::{RegistrationGuard, RunningTask, TaskRegistry};
