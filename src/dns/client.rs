use hickory_resolver::Resolver;
use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{Level, event};

use crate::core::common::{IpProtocol, LookupBackend, LookupOptions};
use crate::core::error::LookupError;
use crate::core::konst::APP_NAME;
use crate::dns::lookup::{Lookup, select_address};

/// Build the lookup backend selected in `options`.
///
/// Lookups run on the runtime behind `handle`. Callers must be plain threads,
/// not runtime workers, since every lookup blocks on the handle.
pub fn build_lookup(handle: Handle, options: &LookupOptions) -> Arc<dyn Lookup> {
    event!(
        target: APP_NAME,
        Level::DEBUG,
        "using {} lookup backend, protocol {}, timeout {}ms",
        options.backend,
        options.ip_protocol,
        options.timeout
    );
    match options.backend {
        LookupBackend::System => Arc::new(SystemLookup::new(handle, options)),
        LookupBackend::Hickory => Arc::new(HickoryLookup::new(handle, options)),
    }
}

/// Platform resolver, the equivalent of `getaddrinfo`.
pub struct SystemLookup {
    handle: Handle,
    ip_protocol: IpProtocol,
    timeout: u16,
}

impl SystemLookup {
    pub fn new(handle: Handle, options: &LookupOptions) -> Self {
        Self {
            handle,
            ip_protocol: options.ip_protocol,
            timeout: options.timeout,
        }
    }
}

impl Lookup for SystemLookup {
    fn lookup(&self, hostname: &str) -> Result<IpAddr, LookupError> {
        let result = self.handle.block_on(async {
            tokio::time::timeout(
                Duration::from_millis(self.timeout as u64),
                tokio::net::lookup_host((hostname, 0)),
            )
            .await
        });

        match result {
            Ok(Ok(addrs)) => select_address(addrs.map(|socket| socket.ip()), self.ip_protocol).ok_or_else(|| {
                LookupError::NotFound {
                    hostname: hostname.to_owned(),
                    protocol: self.ip_protocol,
                }
            }),
            Ok(Err(e)) => Err(LookupError::Resolver {
                hostname: hostname.to_owned(),
                message: e.to_string(),
            }),
            Err(_) => Err(LookupError::Timeout {
                hostname: hostname.to_owned(),
                timeout: self.timeout,
            }),
        }
    }
}

/// Stub resolver talking to the configured name servers directly.
pub struct HickoryLookup {
    handle: Handle,
    resolver: Resolver<TokioConnectionProvider>,
    ip_protocol: IpProtocol,
    timeout: u16,
}

impl HickoryLookup {
    pub fn new(handle: Handle, options: &LookupOptions) -> Self {
        let config = match options.nameservers.is_empty() {
            true => ResolverConfig::google(),
            false => {
                let mut config = ResolverConfig::new();
                for socket_addr in &options.nameservers {
                    config.add_name_server(NameServerConfig::new(*socket_addr, Protocol::Udp));
                }
                config
            }
        };

        // The connection provider spawns onto the current runtime.
        let resolver = {
            let _guard = handle.enter();
            Resolver::builder_with_config(config, TokioConnectionProvider::default()).build()
        };

        Self {
            handle,
            resolver,
            ip_protocol: options.ip_protocol,
            timeout: options.timeout,
        }
    }
}

impl Lookup for HickoryLookup {
    fn lookup(&self, hostname: &str) -> Result<IpAddr, LookupError> {
        // Hickory's own timeout applies per name server; bound the whole lookup.
        let result = self.handle.block_on(async {
            tokio::time::timeout(
                Duration::from_millis(self.timeout as u64),
                self.resolver.lookup_ip(hostname),
            )
            .await
        });

        match result {
            Ok(Ok(lookup)) => select_address(lookup.iter(), self.ip_protocol).ok_or_else(|| LookupError::NotFound {
                hostname: hostname.to_owned(),
                protocol: self.ip_protocol,
            }),
            Ok(Err(e)) => Err(LookupError::Resolver {
                hostname: hostname.to_owned(),
                message: e.to_string(),
            }),
            Err(_) => Err(LookupError::Timeout {
                hostname: hostname.to_owned(),
                timeout: self.timeout,
            }),
        }
    }
}
