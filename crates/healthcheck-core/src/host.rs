//! `host[:port]` address helpers and hostname resolution.

use crate::HealthCheckError;
use std::net::{IpAddr, Ipv6Addr};
use tracing::trace;

fn invalid(host: &str, reason: &'static str) -> HealthCheckError {
    HealthCheckError::InvalidAddress {
        host: host.to_string(),
        reason,
    }
}

fn parse_port(addr: &str, port: &str) -> Result<u16, HealthCheckError> {
    port.parse::<u16>().map_err(|_| invalid(addr, "invalid port"))
}

/// Splits `host[:port]` into its host and optional port.
///
/// Bracketed IPv6 (`[::1]:80`) and bare IPv6 literals (`::1`) are accepted.
pub fn split_host_port(addr: &str) -> Result<(String, Option<u16>), HealthCheckError> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| invalid(addr, "missing ']' in address"))?;
        if after.is_empty() {
            return Ok((host.to_string(), None));
        }
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| invalid(addr, "unexpected characters after ']'"))?;
        return Ok((host.to_string(), Some(parse_port(addr, port)?)));
    }

    if addr.parse::<Ipv6Addr>().is_ok() {
        return Ok((addr.to_string(), None));
    }

    match addr.rsplit_once(':') {
        None => Ok((addr.to_string(), None)),
        Some((host, _)) if host.contains(':') => Err(invalid(addr, "too many colons in address")),
        Some((host, port)) => Ok((host.to_string(), Some(parse_port(addr, port)?))),
    }
}

/// Splits `host:port`, failing when the port is missing.
pub fn split_host_port_required(addr: &str) -> Result<(String, u16), HealthCheckError> {
    match split_host_port(addr)? {
        (host, Some(port)) => Ok((host, port)),
        (_, None) => Err(invalid(addr, "missing port in address")),
    }
}

/// Joins a host and a port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Replaces the port of `host` with `alt_port` when one is given.
///
/// `host` must carry a port either way.
pub fn format_host(host: &str, alt_port: Option<u16>) -> Result<String, HealthCheckError> {
    let (name, port) = split_host_port_required(host)?;
    Ok(join_host_port(&name, alt_port.unwrap_or(port)))
}

/// Resolves a hostname (or IP literal) with the platform resolver.
///
/// The order of the returned addresses is the platform's.
pub async fn resolve_host(host: &str) -> Result<Vec<IpAddr>, HealthCheckError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|source| HealthCheckError::ResolutionFailed {
            host: host.to_string(),
            source,
        })?;

    let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
    trace!(host, count = ips.len(), "Resolved host");
    Ok(ips)
}

/// Resolves a host and returns its first address.
pub async fn resolve_first(host: &str) -> Result<IpAddr, HealthCheckError> {
    resolve_host(host)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| HealthCheckError::NoAddressFound {
            host: host.to_string(),
        })
}
