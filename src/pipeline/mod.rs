//! The requester/resolver pipeline.
//!
//! ```text
//!  data files ──► FileDispenser ──► Requester × N ──► StagingBuffer ──► Resolver × M ──► resolver log
//!                                        │                                  │
//!                                        └──► requester log                 └──► Lookup
//! ```

pub mod buffer;
pub mod coordinator;
pub mod dispenser;
pub mod log;
pub mod requester;
pub mod resolver;

use crate::core::error::WorkerError;

/// What a worker hands back when its thread is joined.
#[derive(Debug)]
pub struct WorkerReport<S> {
    pub summary: S,
    pub errors: Vec<WorkerError>,
}
