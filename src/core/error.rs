use std::fmt::Display;
use std::io;

use thiserror::Error;

use crate::core::common::IpProtocol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerRole {
    Requester,
    Resolver,
}

impl Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerRole::Requester => write!(f, "requester"),
            WorkerRole::Resolver => write!(f, "resolver"),
        }
    }
}

/// A worker lifecycle failure. These never abort a run, they are collected
/// by the coordinator and reported once every worker has been joined.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to start {role} thread {id}: {source}")]
    Spawn {
        role: WorkerRole,
        id: usize,
        #[source]
        source: io::Error,
    },

    #[error("{role} thread {id} panicked: {message}")]
    Panicked { role: WorkerRole, id: usize, message: String },

    #[error("{role} thread {id} could not write to the {role} log: {source}")]
    LogWrite {
        role: WorkerRole,
        id: usize,
        #[source]
        source: io::Error,
    },

    #[error("{role} thread {id} could not read `{path}`: {source}")]
    Read {
        role: WorkerRole,
        id: usize,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("requester thread {id} stopped reading `{path}`, no resolver threads are running")]
    NoResolvers { id: usize, path: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {protocol} address found for `{hostname}`")]
    NotFound { hostname: String, protocol: IpProtocol },

    #[error("lookup of `{hostname}` timed out after {timeout}ms")]
    Timeout { hostname: String, timeout: u16 },

    #[error("address `{address}` does not fit in {capacity} characters")]
    AddressTooLong { address: String, capacity: usize },

    #[error("lookup of `{hostname}` failed: {message}")]
    Resolver { hostname: String, message: String },
}
