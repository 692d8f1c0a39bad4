use std::fs::{OpenOptions, read_to_string};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser};
use tokio::runtime::Handle;
use tracing::{Level, event};
use tracing_appender::rolling;

use crate::core::common::{
    BufferOptions, BufferOrder, IpProtocol, LoggingOptions, LookupBackend, LookupOptions, PerformanceOptions,
};
use crate::core::config::Config;
use crate::core::konst::{
    APP_NAME, BIN_NAME, BUFFER_CAPACITY, CONFIG_FILE, CURRENT_DIR, LOGFILE_NAME, LOGGING_JSON, LOGGING_QUIET,
    LOOKUP_TIMEOUT, MAX_BUFFER_CAPACITY, MAX_INPUT_FILES, MAX_IP_LENGTH, MAX_NAME_LENGTH, MAX_REQUESTER_THREADS,
    MAX_RESOLVER_THREADS, PERFORMANCE_FILE,
};
use crate::dns::client::build_lookup;
use crate::pipeline::coordinator::{Coordinator, RunOptions};
use crate::pipeline::log::FileLog;
use crate::util::message::{performance_report_msg, run_header_msg, summary_table_msg, total_time_msg};
use crate::util::parser::parse_nameserver;
use crate::util::validate::{
    open_data_files, validate_capacity, validate_data_file_count, validate_directory, validate_output_path,
    validate_thread_count,
};

#[derive(Clone, Debug, Args, PartialEq)]
pub struct RunFlags {
    /// Staging buffer capacity (1-10000)
    #[clap(long, default_value_t = BUFFER_CAPACITY, display_order = 120)]
    pub capacity: usize,

    /// Order in which buffered hostnames are handed to resolvers
    #[clap(long, default_value_t = BufferOrder::default(), display_order = 121)]
    pub order: BufferOrder,

    /// Lookup backend
    #[clap(short = 'B', long, default_value_t = LookupBackend::default(), display_order = 122)]
    pub backend: LookupBackend,

    /// IP Protocol to resolve
    #[clap(short = 'I', long, default_value_t = IpProtocol::V4, display_order = 123)]
    pub ip_proto: IpProtocol,

    /// Lookup timeout (in milliseconds)
    #[clap(short, long, default_value_t = LOOKUP_TIMEOUT, display_order = 124)]
    pub timeout: u16,

    /// Name server for the hickory backend, may be repeated
    #[clap(short, long = "nameserver", value_parser = parse_nameserver, display_order = 125)]
    pub nameservers: Vec<SocketAddr>,

    /// Performance summary file, appended after every run
    #[clap(long, default_value = PERFORMANCE_FILE, display_order = 126)]
    pub performance: String,

    /// Config filename.
    /// Search Path: $CWD/multi-lookup.toml
    #[clap(short, long, default_value = CONFIG_FILE, display_order = 127)]
    pub config: String,

    /// Print the default configuration and exit
    #[clap(long, default_value_t = false, display_order = 128)]
    pub generate_config: bool,

    // Logging options
    // --------------
    /// Logging directory
    #[clap(long, default_value = CURRENT_DIR, display_order = 320)]
    pub dir: String,

    /// Logging filename
    #[clap(long, default_value = LOGFILE_NAME, display_order = 321)]
    pub file: String,

    /// Log to file in JSON format and print the run report as JSON
    #[clap(long, default_value_t = false, display_order = 322)]
    pub json: bool,

    /// Silence terminal output, apart from errors and failed lookups
    #[clap(long, default_value_t = false, display_order = 323)]
    pub quiet: bool,
}

#[derive(Debug, Parser)]
#[command(name = BIN_NAME)]
#[command(bin_name = BIN_NAME)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve hostnames from data files with pools of requester and resolver threads", long_about = None)]
#[command(after_help = format_examples(&[
    "multi-lookup 2 3 serviced.txt results.txt names1.txt names2.txt",
    "multi-lookup 1 5 serviced.txt results.txt names*.txt --order lifo",
    "multi-lookup 3 3 serviced.txt results.txt names.txt -B hickory -n 9.9.9.9",
]))]
pub struct Cli {
    /// Number of requester threads (1-5)
    #[clap(required_unless_present = "generate_config")]
    pub requesters: Option<usize>,

    /// Number of resolver threads (1-10)
    #[clap(required_unless_present = "generate_config")]
    pub resolvers: Option<usize>,

    /// Requester log, one line per requester thread
    #[clap(required_unless_present = "generate_config")]
    pub requester_log: Option<String>,

    /// Resolver log, one line per hostname
    #[clap(required_unless_present = "generate_config")]
    pub resolver_log: Option<String>,

    /// Data files with one hostname per line
    #[clap(required_unless_present = "generate_config", num_args = 1..)]
    pub datafiles: Vec<String>,

    #[clap(flatten)]
    pub flags: RunFlags,
}

impl Cli {
    pub fn init() -> Result<Cli, clap::Error> {
        Cli::try_parse()
    }

    pub async fn run(self) -> Result<()> {
        let flags = self.flags;

        if flags.generate_config {
            return Config::generate();
        }

        let config = match Path::new(&flags.config).exists() {
            true => Config::load(&flags.config)
                .with_context(|| format!("configuration file `{}` is invalid", flags.config))?,
            false if flags.config != CONFIG_FILE => bail!("configuration file `{}` not found", flags.config),
            false => Config::default(),
        };

        // CLI options should override config file options.
        // If a CLI option is NOT the same as the default,
        // the option was set from the CLI. Therefore we should
        // use the CLI option. Otherwise use the config file option.
        #[rustfmt::skip]
        let buffer_options = BufferOptions {
            capacity: if flags.capacity != BUFFER_CAPACITY { flags.capacity } else { config.buffer_options.capacity },
            order: if flags.order != BufferOrder::default() { flags.order } else { config.buffer_options.order },
        };

        #[rustfmt::skip]
        let lookup_options = LookupOptions {
            backend: if flags.backend != LookupBackend::default() { flags.backend } else { config.lookup_options.backend },
            ip_protocol: if flags.ip_proto != IpProtocol::V4 { flags.ip_proto } else { config.lookup_options.ip_protocol },
            timeout: if flags.timeout != LOOKUP_TIMEOUT { flags.timeout } else { config.lookup_options.timeout },
            nameservers: if !flags.nameservers.is_empty() { flags.nameservers } else { config.lookup_options.nameservers },
        };

        #[rustfmt::skip]
        let logging_options = LoggingOptions {
            file: if flags.file != LOGFILE_NAME { flags.file } else { config.logging_options.file },
            dir: if flags.dir != CURRENT_DIR { flags.dir } else { config.logging_options.dir },
            json: if flags.json != LOGGING_JSON { flags.json } else { config.logging_options.json },
            quiet: if flags.quiet != LOGGING_QUIET { flags.quiet } else { config.logging_options.quiet },
        };

        #[rustfmt::skip]
        let performance_options = PerformanceOptions {
            file: if flags.performance != PERFORMANCE_FILE { flags.performance } else { config.performance_options.file },
        };

        // region:    ===== validators ===== //

        // Nothing is created or truncated until every check has passed.
        let requesters = self.requesters.context("missing number of requester threads")?;
        let resolvers = self.resolvers.context("missing number of resolver threads")?;
        let requester_log_path = self.requester_log.context("missing requester log")?;
        let resolver_log_path = self.resolver_log.context("missing resolver log")?;

        validate_thread_count("requester", requesters, MAX_REQUESTER_THREADS)?;
        validate_thread_count("resolver", resolvers, MAX_RESOLVER_THREADS)?;
        validate_data_file_count(self.datafiles.len(), MAX_INPUT_FILES)?;
        validate_capacity(buffer_options.capacity, MAX_BUFFER_CAPACITY)?;
        validate_output_path("requester log", &requester_log_path)?;
        validate_output_path("resolver log", &resolver_log_path)?;
        validate_output_path("performance file", &performance_options.file)?;
        validate_directory("logging directory", &logging_options.dir)?;
        let files = open_data_files(&self.datafiles)?;

        // endregion: ===== validators ===== //

        let file_appender = rolling::never(&logging_options.dir, &logging_options.file);
        let (logfile, _guard) = tracing_appender::non_blocking(file_appender);

        let tracer = tracing_subscriber::fmt()
            .with_env_filter(std::env::var("MULTI_LOOKUP_LOG").unwrap_or_else(|_| format!("{APP_NAME}=info")))
            .with_writer(logfile)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true);

        if logging_options.json {
            tracer.json().init()
        } else {
            tracer.init()
        }

        if !logging_options.quiet {
            println!("{}", run_header_msg(requesters, resolvers, files.len()));
        }

        let requester_log = Arc::new(
            FileLog::create(&requester_log_path)
                .with_context(|| format!("failed to create requester log `{requester_log_path}`"))?,
        );
        let resolver_log = Arc::new(
            FileLog::create(&resolver_log_path)
                .with_context(|| format!("failed to create resolver log `{resolver_log_path}`"))?,
        );

        let run_options = RunOptions {
            requesters,
            resolvers,
            buffer_options,
            max_name_length: MAX_NAME_LENGTH,
            address_capacity: MAX_IP_LENGTH,
        };
        let coordinator = Coordinator::new(run_options, build_lookup(Handle::current(), &lookup_options));

        // Workers block on lookups through the runtime handle, so the pools
        // run off the async threads.
        let (report, requester_log, resolver_log) = tokio::task::spawn_blocking(move || {
            let report = coordinator.run(files, &requester_log, &resolver_log);
            (report, requester_log, resolver_log)
        })
        .await?;

        requester_log
            .flush()
            .with_context(|| format!("failed to write requester log `{requester_log_path}`"))?;
        resolver_log
            .flush()
            .with_context(|| format!("failed to write resolver log `{resolver_log_path}`"))?;

        let requester_log_contents = read_to_string(&requester_log_path)
            .with_context(|| format!("failed to read requester log `{requester_log_path}`"))?;
        let mut performance = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&performance_options.file)
            .with_context(|| format!("failed to open performance file `{}`", performance_options.file))?;
        performance.write_all(performance_report_msg(&report, &requester_log_contents).as_bytes())?;

        println!("{BIN_NAME}: {}", total_time_msg(&report));
        if logging_options.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if !logging_options.quiet {
            println!("{}", summary_table_msg(&report));
        }

        for failure in &report.failures {
            eprintln!("{failure}");
        }
        event!(
            target: APP_NAME,
            Level::INFO,
            "wrote performance report to `{}`",
            performance_options.file
        );

        Ok(())
    }
}

/// Format example commands
fn format_examples(examples: &[&str]) -> String {
    let mut result = String::from("\x1B[1;4mExamples:\x1B[0m\n");
    for example in examples {
        result.push_str(&format!("  {}\n", example));
    }
    // Forces visible blank new line.
    // Otherwise, clap strips out raw trailing whitespace.
    result.push_str("\x1B[0m\n");
    result
}
