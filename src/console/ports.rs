//! Published port address resolution
//!
//! A port bound to a wildcard address (`0.0.0.0`, `::`) or to no address at all
//! is reached through the node's container base URL when one is configured, and
//! through the console origin's host otherwise. A port bound to a concrete
//! address is reached at that address directly, with the console's scheme.

use std::net::IpAddr;

use reqwest::Url;

use crate::core::{NodeHead, PortBinding};

/// Scheme and hostname the operator reaches the console at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOrigin {
    /// Scheme without the trailing colon, e.g. `https`
    pub scheme: String,
    /// Hostname without port; IPv6 literals keep their brackets
    pub hostname: String,
}

impl ConsoleOrigin {
    pub fn new(scheme: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            hostname: hostname.into(),
        }
    }

    /// Take scheme and host from a URL, dropping its port and path
    pub fn from_url(url: &Url) -> Option<Self> {
        let hostname = url.host_str()?;
        Some(Self::new(url.scheme(), hostname))
    }

    pub fn parse(url: &str) -> Option<Self> {
        Url::parse(url).ok().as_ref().and_then(Self::from_url)
    }

    /// `{scheme}://{hostname}`
    pub fn prefix(&self) -> String {
        format!("{}://{}", self.scheme, self.hostname)
    }
}

/// Whether the bind address means "all interfaces"
pub fn is_wildcard(ip: &str) -> bool {
    ip.parse::<IpAddr>()
        .map(|addr| addr.is_unspecified())
        .unwrap_or(false)
}

/// Host form of a concrete bind address
fn host_for(ip: &str) -> String {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{}]", ip),
        _ => ip.to_string(),
    }
}

/// Compute the reachable URL of a published port.
///
/// Returns `None` when the binding has no public port.
pub fn resolve_port_url(
    binding: &PortBinding,
    node_base_url: Option<&str>,
    origin: &ConsoleOrigin,
) -> Option<String> {
    let public_port = binding.public_port?;

    let concrete_ip = binding
        .ip
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty() && !is_wildcard(ip));

    let prefix = match concrete_ip {
        Some(ip) => format!("{}://{}", origin.scheme, host_for(ip)),
        None => match node_base_url.filter(|url| !url.is_empty()) {
            Some(base) => base.to_string(),
            None => origin.prefix(),
        },
    };

    Some(format!("{}:{}", prefix, public_port))
}

/// `ip:publicPort->privatePort/type`, each part only when its field is present
pub fn port_display_text(binding: &PortBinding) -> String {
    let mut text = String::new();

    if let Some(ip) = binding.ip.as_deref().filter(|ip| !ip.is_empty()) {
        text.push_str(ip);
        text.push(':');
    }
    if let Some(public_port) = binding.public_port {
        text.push_str(&format!("{}->", public_port));
    }
    if binding.private_port != 0 {
        text.push_str(&binding.private_port.to_string());
    }
    if let Some(protocol) = binding.protocol.as_deref().filter(|p| !p.is_empty()) {
        text.push('/');
        text.push_str(protocol);
    }

    text
}

/// A port as rendered in a container row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortLink {
    pub text: String,
    pub url: Option<String>,
}

impl PortLink {
    pub fn is_clickable(&self) -> bool {
        self.url.is_some()
    }
}

/// Resolve every binding of a container against the node head and origin
pub fn port_links(
    ports: &[PortBinding],
    node_head: Option<&NodeHead>,
    origin: &ConsoleOrigin,
) -> Vec<PortLink> {
    let base_url = node_head.and_then(NodeHead::base_url_override);
    ports
        .iter()
        .map(|binding| PortLink {
            text: port_display_text(binding),
            url: resolve_port_url(binding, base_url, origin),
        })
        .collect()
}
