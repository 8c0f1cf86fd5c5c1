// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod crm;
pub mod ingest;
pub mod pipeline;
pub mod record;
pub mod telemetry;
pub mod upload;

pub use crate::config::{Credentials, FinderConfig};
pub use crate::pipeline::{run, Board, RunReport};
pub use crate::record::CandidateRecord;
