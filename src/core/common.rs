use std::fmt::Display;
use std::net::SocketAddr;

use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};

use crate::core::konst::{
    BUFFER_CAPACITY, CURRENT_DIR, LOGFILE_NAME, LOGGING_JSON, LOGGING_QUIET, LOOKUP_TIMEOUT, PERFORMANCE_FILE,
};

/// Order in which the staging buffer hands hostnames to resolvers.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferOrder {
    /// First in, first out.
    #[default]
    Fifo,
    /// Last in, first out. The most recently pushed hostname is popped next.
    Lifo,
}

impl Display for BufferOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferOrder::Fifo => write!(f, "fifo"),
            BufferOrder::Lifo => write!(f, "lifo"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupBackend {
    /// Platform resolver (getaddrinfo)
    #[default]
    System,
    /// Hickory DNS stub resolver
    Hickory,
}

impl Display for LookupBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupBackend::System => write!(f, "system"),
            LookupBackend::Hickory => write!(f, "hickory"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    All,
    #[default]
    V4,
    V6,
}

impl Display for IpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpProtocol::All => write!(f, "all"),
            IpProtocol::V4 => write!(f, "v4"),
            IpProtocol::V6 => write!(f, "v6"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferOptions {
    pub capacity: usize,
    pub order: BufferOrder,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            capacity: BUFFER_CAPACITY,
            order: BufferOrder::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupOptions {
    pub backend: LookupBackend,
    pub ip_protocol: IpProtocol,
    /// Per-query timeout in milliseconds.
    pub timeout: u16,
    /// Name servers for the hickory backend. Empty uses the resolver defaults.
    pub nameservers: Vec<SocketAddr>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            backend: LookupBackend::default(),
            ip_protocol: IpProtocol::default(),
            timeout: LOOKUP_TIMEOUT,
            nameservers: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub dir: String,
    pub file: String,
    pub json: bool,
    pub quiet: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            dir: CURRENT_DIR.to_owned(),
            file: LOGFILE_NAME.to_owned(),
            json: LOGGING_JSON,
            quiet: LOGGING_QUIET,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceOptions {
    pub file: String,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            file: PERFORMANCE_FILE.to_owned(),
        }
    }
}

/// Files serviced by a single requester worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WorkSummary {
    pub id: usize,
    pub files_serviced: usize,
    pub hostnames: usize,
}

impl Display for WorkSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thread {} serviced {} files", self.id, self.files_serviced)
    }
}

/// Hostnames processed by a single resolver worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolverSummary {
    pub id: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// A hostname and the address it resolved to, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRecord {
    pub hostname: String,
    pub address: Option<String>,
}

impl Display for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{},{}", self.hostname, address),
            None => write!(f, "{},", self.hostname),
        }
    }
}
