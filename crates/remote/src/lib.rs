//! Remote executor collaborator - the contract for shipping work off-box.
//!
//! The engine only needs a callable: accept a payload, return a result or
//! fail. [`HttpRemoteExecutor`] talks to a real compute-function backend;
//! [`SimulatedRemoteExecutor`] stands in for one in tests.

#![warn(missing_docs)]

mod http;
mod sim;
mod trait_;

pub use http::HttpRemoteExecutor;
pub use sim::{SimulatedOutcome, SimulatedRemoteExecutor};
pub use trait_::{RemoteExecutor, RemoteRequest, RemoteResponse};
