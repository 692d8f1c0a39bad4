pub const APP_NAME: &str = "multilookup";
pub const BIN_NAME: &str = "multi-lookup";

// Worker pool limits
pub const MAX_REQUESTER_THREADS: usize = 5;
pub const MAX_RESOLVER_THREADS: usize = 10;
pub const MAX_INPUT_FILES: usize = 100;

// Hostnames and addresses
pub const MAX_NAME_LENGTH: usize = 1024;
/// INET6_ADDRSTRLEN
pub const MAX_IP_LENGTH: usize = 46;

// Staging buffer
pub const BUFFER_CAPACITY: usize = 20;
pub const MAX_BUFFER_CAPACITY: usize = 10_000;

// Lookups
pub const LOOKUP_TIMEOUT: u16 = 5000;

// Files
pub const CONFIG_FILE: &str = "multi-lookup.toml";
pub const CURRENT_DIR: &str = ".";
pub const LOGFILE_NAME: &str = "multi-lookup.log";
pub const PERFORMANCE_FILE: &str = "performance.txt";

// Logging defaults
pub const LOGGING_JSON: bool = false;
pub const LOGGING_QUIET: bool = false;
