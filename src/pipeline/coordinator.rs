use std::any::Any;
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use jiff::Timestamp;
use serde_derive::Serialize;
use tracing::{Level, event};

use crate::core::common::{BufferOptions, ResolverSummary, WorkSummary};
use crate::core::error::{WorkerError, WorkerRole};
use crate::core::konst::{APP_NAME, MAX_IP_LENGTH, MAX_NAME_LENGTH};
use crate::dns::lookup::Lookup;
use crate::pipeline::WorkerReport;
use crate::pipeline::buffer::StagingBuffer;
use crate::pipeline::dispenser::{FileDispenser, InputFile};
use crate::pipeline::log::RecordLog;
use crate::pipeline::requester::Requester;
use crate::pipeline::resolver::Resolver;
use crate::util::serializer::{serialize_errors, serialize_secs};

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub requesters: usize,
    pub resolvers: usize,
    pub buffer_options: BufferOptions,
    pub max_name_length: usize,
    pub address_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            requesters: 1,
            resolvers: 1,
            buffer_options: BufferOptions::default(),
            max_name_length: MAX_NAME_LENGTH,
            address_capacity: MAX_IP_LENGTH,
        }
    }
}

/// Everything a finished run produced, apart from the logs themselves.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: Timestamp,
    pub requester_threads: usize,
    pub resolver_threads: usize,
    pub requesters: Vec<WorkSummary>,
    pub resolvers: Vec<ResolverSummary>,
    #[serde(serialize_with = "serialize_errors")]
    pub failures: Vec<WorkerError>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunReport {
    pub fn files_serviced(&self) -> usize {
        self.requesters.iter().map(|r| r.files_serviced).sum()
    }

    pub fn hostnames(&self) -> usize {
        self.requesters.iter().map(|r| r.hostnames).sum()
    }

    pub fn resolved(&self) -> usize {
        self.resolvers.iter().map(|r| r.resolved).sum()
    }

    pub fn failed(&self) -> usize {
        self.resolvers.iter().map(|r| r.failed).sum()
    }
}

/// Starts the requester and resolver pools against one shared buffer and
/// dispenser, then joins them.
pub struct Coordinator {
    options: RunOptions,
    lookup: Arc<dyn Lookup>,
}

impl Coordinator {
    pub fn new(options: RunOptions, lookup: Arc<dyn Lookup>) -> Coordinator {
        Coordinator { options, lookup }
    }

    pub fn run<R, S>(
        &self,
        files: Vec<InputFile>,
        requester_log: &Arc<RecordLog<R>>,
        resolver_log: &Arc<RecordLog<S>>,
    ) -> RunReport
    where
        R: Write + Send + 'static,
        S: Write + Send + 'static,
    {
        let started_at = Timestamp::now();
        let start = Instant::now();

        let buffer = Arc::new(StagingBuffer::new(
            self.options.buffer_options.capacity,
            self.options.buffer_options.order,
        ));
        let dispenser = Arc::new(FileDispenser::new(files));

        event!(
            target: APP_NAME,
            Level::INFO,
            "starting {} requesters and {} resolvers over {} files, buffer {} ({})",
            self.options.requesters,
            self.options.resolvers,
            dispenser.total(),
            buffer.capacity(),
            buffer.order()
        );

        // Every slot exists before the first thread starts, so no resolver
        // can see zero active requesters early. A slot whose thread fails to
        // start is dropped together with its closure.
        let producer_slots: Vec<_> = (0..self.options.requesters)
            .map(|_| buffer.register_producer())
            .collect();
        let consumer_slots: Vec<_> = (0..self.options.resolvers)
            .map(|_| buffer.register_consumer())
            .collect();

        let mut failures = Vec::new();

        let mut requester_handles = Vec::new();
        for (id, slot) in producer_slots.into_iter().enumerate() {
            let requester = Requester {
                id,
                dispenser: Arc::clone(&dispenser),
                slot,
                log: Arc::clone(requester_log),
                max_name_length: self.options.max_name_length,
            };
            match spawn_worker(WorkerRole::Requester, id, move || requester.run()) {
                Ok(handle) => requester_handles.push((id, handle)),
                Err(e) => failures.push(e),
            }
        }

        let mut resolver_handles = Vec::new();
        for (id, slot) in consumer_slots.into_iter().enumerate() {
            let resolver = Resolver {
                id,
                slot,
                lookup: Arc::clone(&self.lookup),
                log: Arc::clone(resolver_log),
                address_capacity: self.options.address_capacity,
            };
            match spawn_worker(WorkerRole::Resolver, id, move || resolver.run()) {
                Ok(handle) => resolver_handles.push((id, handle)),
                Err(e) => failures.push(e),
            }
        }

        let mut requesters = Vec::new();
        for (id, handle) in requester_handles {
            join_worker(WorkerRole::Requester, id, handle, &mut requesters, &mut failures);
        }

        let mut resolvers = Vec::new();
        for (id, handle) in resolver_handles {
            join_worker(WorkerRole::Resolver, id, handle, &mut resolvers, &mut failures);
        }

        debug_assert_eq!(buffer.active_producers(), 0);
        debug_assert!(buffer.is_empty() || resolvers.len() < self.options.resolvers);
        let unclaimed = dispenser.remaining();
        if unclaimed > 0 {
            event!(target: APP_NAME, Level::WARN, "{unclaimed} data files were never claimed");
        }

        let report = RunReport {
            started_at,
            requester_threads: self.options.requesters,
            resolver_threads: self.options.resolvers,
            requesters,
            resolvers,
            failures,
            elapsed: start.elapsed(),
        };

        for failure in &report.failures {
            event!(target: APP_NAME, Level::ERROR, "{failure}");
        }
        event!(
            target: APP_NAME,
            Level::INFO,
            "run finished in {:.6}s: {} files, {} hostnames, {} resolved, {} failed",
            report.elapsed.as_secs_f64(),
            report.files_serviced(),
            report.hostnames(),
            report.resolved(),
            report.failed()
        );

        report
    }
}

fn spawn_worker<T, F>(role: WorkerRole, id: usize, f: F) -> Result<JoinHandle<T>, WorkerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{role}-{id}"))
        .spawn(f)
        .map_err(|source| WorkerError::Spawn { role, id, source })
}

fn join_worker<S>(
    role: WorkerRole,
    id: usize,
    handle: JoinHandle<WorkerReport<S>>,
    summaries: &mut Vec<S>,
    failures: &mut Vec<WorkerError>,
) {
    match handle.join() {
        Ok(report) => {
            summaries.push(report.summary);
            failures.extend(report.errors);
        }
        Err(payload) => failures.push(WorkerError::Panicked {
            role,
            id,
            message: panic_message(&*payload),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
