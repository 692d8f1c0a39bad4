use std::net::IpAddr;

use crate::core::common::IpProtocol;
use crate::core::error::LookupError;

/// Resolves a hostname to a single address.
///
/// Implementations are shared by every resolver thread and make exactly one
/// attempt per call.
pub trait Lookup: Send + Sync {
    fn lookup(&self, hostname: &str) -> Result<IpAddr, LookupError>;
}

/// Resolve `hostname` to its address string. The address must fit in
/// `capacity` characters including a terminator, as with `INET6_ADDRSTRLEN`.
pub fn resolve(lookup: &dyn Lookup, hostname: &str, capacity: usize) -> Result<String, LookupError> {
    let address = lookup.lookup(hostname)?.to_string();
    if address.len() >= capacity {
        return Err(LookupError::AddressTooLong { address, capacity });
    }
    Ok(address)
}

/// Pick the first address allowed by `protocol`.
pub fn select_address(addrs: impl IntoIterator<Item = IpAddr>, protocol: IpProtocol) -> Option<IpAddr> {
    addrs.into_iter().find(|ip| match protocol {
        IpProtocol::All => true,
        IpProtocol::V4 => ip.is_ipv4(),
        IpProtocol::V6 => ip.is_ipv6(),
    })
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::thread;
    use std::time::Duration;

    use super::Lookup;
    use crate::core::common::IpProtocol;
    use crate::core::error::LookupError;

    /// In-memory lookup table for tests.
    #[derive(Debug, Default)]
    pub struct StaticLookup {
        table: HashMap<String, IpAddr>,
        delay: Option<Duration>,
    }

    impl StaticLookup {
        pub fn new(entries: &[(&str, &str)]) -> Self {
            let table = entries
                .iter()
                .map(|(host, ip)| (host.to_string(), ip.parse().unwrap()))
                .collect();
            Self { table, delay: None }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl Lookup for StaticLookup {
        fn lookup(&self, hostname: &str) -> Result<IpAddr, LookupError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            self.table.get(hostname).copied().ok_or_else(|| LookupError::NotFound {
                hostname: hostname.to_owned(),
                protocol: IpProtocol::All,
            })
        }
    }
}
