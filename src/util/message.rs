use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::core::konst::BIN_NAME;
use crate::pipeline::coordinator::RunReport;
use crate::util::time::{format_secs, time_now_utc};

#[derive(Tabled)]
struct WorkerRow {
    #[tabled(rename = "Worker")]
    worker: String,
    #[tabled(rename = "Files")]
    files: String,
    #[tabled(rename = "Hostnames")]
    hostnames: String,
    #[tabled(rename = "Resolved")]
    resolved: String,
    #[tabled(rename = "Failed")]
    failed: String,
}

pub fn run_header_msg(requesters: usize, resolvers: usize, files: usize) -> String {
    format!(
        "{BIN_NAME}: resolving {files} data files with {requesters} requester and {resolvers} resolver threads ({})",
        time_now_utc()
    )
}

/// Printed on stderr for every failed lookup, regardless of `--quiet`.
pub fn invalid_hostname_msg(hostname: &str) -> String {
    format!("invalid hostname: {hostname}")
}

pub fn total_time_msg(report: &RunReport) -> String {
    format!("total time is {} seconds", format_secs(report.elapsed))
}

/// Lines appended to the performance file after each run.
pub fn performance_report_msg(report: &RunReport, requester_log: &str) -> String {
    let mut msg = format!(
        "Number of requester threads is {}\nNumber of resolver threads is {}\n",
        report.requester_threads, report.resolver_threads
    );
    msg.push_str(requester_log);
    if !requester_log.is_empty() && !requester_log.ends_with('\n') {
        msg.push('\n');
    }
    for failure in &report.failures {
        msg.push_str(&format!("Worker failure: {failure}\n"));
    }
    msg.push_str(&total_time_msg(report));
    msg.push('\n');
    msg
}

pub fn summary_table_msg(report: &RunReport) -> String {
    let mut rows = Vec::new();
    for r in &report.requesters {
        rows.push(WorkerRow {
            worker: format!("requester-{}", r.id),
            files: r.files_serviced.to_string(),
            hostnames: r.hostnames.to_string(),
            resolved: "-".to_owned(),
            failed: "-".to_owned(),
        });
    }
    for r in &report.resolvers {
        rows.push(WorkerRow {
            worker: format!("resolver-{}", r.id),
            files: "-".to_owned(),
            hostnames: (r.resolved + r.failed).to_string(),
            resolved: r.resolved.to_string(),
            failed: r.failed.to_string(),
        });
    }
    rows.push(WorkerRow {
        worker: "total".to_owned(),
        files: report.files_serviced().to_string(),
        hostnames: report.hostnames().to_string(),
        resolved: report.resolved().to_string(),
        failed: report.failed().to_string(),
    });

    Table::new(rows).with(Style::modern()).to_string()
}
