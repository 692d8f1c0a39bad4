use std::io::Write;
use std::sync::Arc;

use tracing::{Level, event};

use crate::core::common::{ResolverSummary, ResultRecord};
use crate::core::error::{WorkerError, WorkerRole};
use crate::core::konst::APP_NAME;
use crate::dns::lookup::{Lookup, resolve};
use crate::pipeline::WorkerReport;
use crate::pipeline::buffer::ConsumerSlot;
use crate::pipeline::log::RecordLog;
use crate::util::message::invalid_hostname_msg;

/// Consumer: drains the buffer, resolves each hostname once and appends the
/// result record to the resolver log.
pub struct Resolver<W: Write> {
    pub id: usize,
    pub slot: ConsumerSlot,
    pub lookup: Arc<dyn Lookup>,
    pub log: Arc<RecordLog<W>>,
    pub address_capacity: usize,
}

impl<W: Write> Resolver<W> {
    /// Run until every producer is gone and the buffer is drained.
    pub fn run(self) -> WorkerReport<ResolverSummary> {
        event!(target: APP_NAME, Level::DEBUG, "resolver {} started", self.id);

        let mut summary = ResolverSummary {
            id: self.id,
            ..Default::default()
        };
        let mut errors = Vec::new();

        while let Some(hostname) = self.slot.buffer().pop() {
            let address = match resolve(self.lookup.as_ref(), &hostname, self.address_capacity) {
                Ok(address) => {
                    summary.resolved += 1;
                    Some(address)
                }
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("{}", invalid_hostname_msg(&hostname));
                    event!(target: APP_NAME, Level::WARN, "{e}");
                    None
                }
            };

            let record = ResultRecord { hostname, address };
            if let Err(source) = self.log.append_line(&record) {
                // One report per worker is enough, the log is likely gone.
                if errors.is_empty() {
                    errors.push(WorkerError::LogWrite {
                        role: WorkerRole::Resolver,
                        id: self.id,
                        source,
                    });
                }
            }
        }

        event!(
            target: APP_NAME,
            Level::DEBUG,
            "resolver {} finished: {} resolved, {} failed",
            self.id,
            summary.resolved,
            summary.failed
        );

        WorkerReport { summary, errors }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::core::common::BufferOrder;
    use crate::dns::lookup::fake::StaticLookup;
    use crate::pipeline::buffer::StagingBuffer;

    #[test]
    fn writes_one_record_per_hostname() {
        let buffer = Arc::new(StagingBuffer::new(4, BufferOrder::Fifo));
        let log = Arc::new(RecordLog::new(Vec::new()));
        let resolver = Resolver {
            id: 0,
            slot: buffer.register_consumer(),
            lookup: Arc::new(StaticLookup::new(&[("good.example", "192.0.2.10")])),
            log: Arc::clone(&log),
            address_capacity: 46,
        };

        for name in ["good.example", "bogus.invalid"] {
            buffer.push(name.to_owned()).unwrap();
        }
        let report = resolver.run();

        assert_eq!(report.summary.resolved, 1);
        assert_eq!(report.summary.failed, 1);
        assert!(report.errors.is_empty());
        assert_eq!(log.lines(), vec!["good.example,192.0.2.10", "bogus.invalid,"]);
    }

    #[test]
    fn waits_for_producer_then_exits() {
        let buffer = Arc::new(StagingBuffer::new(2, BufferOrder::Fifo));
        let producer = buffer.register_producer();
        let log = Arc::new(RecordLog::new(Vec::new()));
        let resolver = Resolver {
            id: 5,
            slot: buffer.register_consumer(),
            lookup: Arc::new(StaticLookup::new(&[("late.example", "2001:db8::5")])),
            log: Arc::clone(&log),
            address_capacity: 46,
        };

        let handle = thread::spawn(move || resolver.run());
        producer.buffer().push("late.example".to_owned()).unwrap();
        drop(producer);

        let report = handle.join().unwrap();
        assert_eq!(report.summary.resolved, 1);
        assert_eq!(log.lines(), vec!["late.example,2001:db8::5"]);
    }

    #[test]
    fn address_over_capacity_is_recorded_as_failure() {
        let buffer = Arc::new(StagingBuffer::new(1, BufferOrder::Fifo));
        let log = Arc::new(RecordLog::new(Vec::new()));
        let resolver = Resolver {
            id: 0,
            slot: buffer.register_consumer(),
            lookup: Arc::new(StaticLookup::new(&[("v6.example", "2001:db8:aaaa:bbbb:cccc:dddd:eeee:1")])),
            log: Arc::clone(&log),
            address_capacity: 16,
        };

        buffer.push("v6.example".to_owned()).unwrap();
        let report = resolver.run();

        assert_eq!(report.summary.failed, 1);
        assert_eq!(log.lines(), vec!["v6.example,"]);
    }
}
