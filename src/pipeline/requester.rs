use std::io::{self, BufRead, Read, Write};
use std::sync::Arc;

use tracing::{Level, event};

use crate::core::common::WorkSummary;
use crate::core::error::{WorkerError, WorkerRole};
use crate::core::konst::APP_NAME;
use crate::pipeline::WorkerReport;
use crate::pipeline::buffer::ProducerSlot;
use crate::pipeline::dispenser::{FileDispenser, InputFile};
use crate::pipeline::log::RecordLog;
use crate::util::parser::parse_hostname_line;

/// How a single claimed file was streamed into the buffer.
enum FileOutcome {
    Complete { hostnames: usize },
    ReadFailed { hostnames: usize, error: WorkerError },
    BufferClosed { hostnames: usize, error: WorkerError },
}

/// Producer: claims data files and streams their hostnames into the buffer.
pub struct Requester<W: Write> {
    pub id: usize,
    pub dispenser: Arc<FileDispenser>,
    pub slot: ProducerSlot,
    pub log: Arc<RecordLog<W>>,
    pub max_name_length: usize,
}

impl<W: Write> Requester<W> {
    /// Run until no file is left to claim. Writes the work summary line and
    /// then releases the producer slot.
    pub fn run(self) -> WorkerReport<WorkSummary> {
        event!(target: APP_NAME, Level::DEBUG, "requester {} started", self.id);

        let mut summary = WorkSummary {
            id: self.id,
            files_serviced: 0,
            hostnames: 0,
        };
        let mut errors = Vec::new();

        while let Some(file) = self.dispenser.claim_next() {
            event!(
                target: APP_NAME,
                Level::DEBUG,
                "requester {} claimed `{}`",
                self.id,
                file.path().display()
            );

            match self.service_file(file) {
                FileOutcome::Complete { hostnames } => {
                    summary.files_serviced += 1;
                    summary.hostnames += hostnames;
                }
                FileOutcome::ReadFailed { hostnames, error } => {
                    summary.hostnames += hostnames;
                    errors.push(error);
                }
                FileOutcome::BufferClosed { hostnames, error } => {
                    summary.hostnames += hostnames;
                    errors.push(error);
                    break;
                }
            }
        }

        if let Err(source) = self.log.append_line(summary) {
            errors.push(WorkerError::LogWrite {
                role: WorkerRole::Requester,
                id: self.id,
                source,
            });
        }

        event!(
            target: APP_NAME,
            Level::DEBUG,
            "requester {} finished: {} files, {} hostnames",
            self.id,
            summary.files_serviced,
            summary.hostnames
        );

        // `self.slot` drops here, after the summary line is written.
        WorkerReport { summary, errors }
    }

    fn service_file(&self, file: InputFile) -> FileOutcome {
        let path = file.path().display().to_string();
        let mut reader = file.into_reader();
        let mut line = Vec::new();
        let mut hostnames = 0;

        loop {
            line.clear();
            match read_bounded_line(&mut reader, &mut line, self.max_name_length) {
                Ok(0) => return FileOutcome::Complete { hostnames },
                Ok(_) => {}
                Err(source) => {
                    return FileOutcome::ReadFailed {
                        hostnames,
                        error: WorkerError::Read {
                            role: WorkerRole::Requester,
                            id: self.id,
                            path,
                            source,
                        },
                    };
                }
            }

            let Some(parsed) = parse_hostname_line(&line, self.max_name_length) else {
                continue;
            };
            if parsed.truncated {
                event!(
                    target: APP_NAME,
                    Level::WARN,
                    "hostname in `{path}` truncated to {} characters",
                    self.max_name_length
                );
            }

            if self.slot.buffer().push(parsed.hostname).is_err() {
                return FileOutcome::BufferClosed {
                    hostnames,
                    error: WorkerError::NoResolvers { id: self.id, path },
                };
            }
            hostnames += 1;
        }
    }
}

/// Read one line into `buf`, keeping at most enough bytes for `max_chars`
/// characters plus a `\r\n`. The rest of an over-long line is skipped.
/// Returns the number of bytes consumed from `reader`.
fn read_bounded_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, max_chars: usize) -> io::Result<usize> {
    let limit = max_chars.saturating_mul(4).saturating_add(2) as u64;
    let read = reader.by_ref().take(limit).read_until(b'\n', buf)?;
    if read as u64 == limit && buf.last() != Some(&b'\n') {
        return Ok(read + reader.skip_until(b'\n')?);
    }
    Ok(read)
}
