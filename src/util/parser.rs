use std::net::SocketAddr;

use anyhow::{Result, bail};

/// A hostname read from a data file.
#[derive(Debug, PartialEq, Eq)]
pub struct HostnameLine {
    pub hostname: String,
    /// The line was longer than the maximum hostname length and was cut.
    pub truncated: bool,
}

/// Parse one raw line of a data file into a hostname.
///
/// The trailing `\n` or `\r\n` is stripped and the result is cut to
/// `max_length` characters. Bytes that are not valid UTF-8 are replaced.
/// Blank lines yield `None`.
pub fn parse_hostname_line(line: &[u8], max_length: usize) -> Option<HostnameLine> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let text = String::from_utf8_lossy(line);
    if text.trim().is_empty() {
        return None;
    }

    match text.char_indices().nth(max_length) {
        Some((cut, _)) => Some(HostnameLine {
            hostname: text[..cut].to_owned(),
            truncated: true,
        }),
        None => Some(HostnameLine {
            hostname: text.into_owned(),
            truncated: false,
        }),
    }
}

/// Parse a name server address, defaulting to port 53.
pub fn parse_nameserver(s: &str) -> Result<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    match s.parse::<std::net::IpAddr>() {
        Ok(ip) => Ok(SocketAddr::new(ip, 53)),
        Err(_) => bail!("name server: `{s}` is invalid"),
    }
}
