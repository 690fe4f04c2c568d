//! Lenient URL splitter: scheme, authority, hostname, path, query, fragment.
//!
//! Follows generic URL syntax without normalizing anything beyond lower-casing the
//! scheme and hostname. Scheme-less input keeps everything in `path`; a malformed
//! bracketed authority is the only failure, and [`split_lossy`] turns it into empty parts.

use std::net::Ipv6Addr;
use thiserror::Error;

/// Schemes whose last path segment may carry `;params`
const USES_PARAMS: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("invalid IPv6 authority: {0}")]
    InvalidIpv6(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    /// Raw authority (`user@host:port`), empty when the URL has no `//`
    pub netloc: String,
    /// Authority host, lower-cased, without user-info or port
    pub hostname: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// Host if the URL has an authority, otherwise the host-like first path segment;
    /// lower-cased, user-info and port removed either way.
    pub fn domain_candidate(&self) -> String {
        if !self.netloc.is_empty() {
            return self.hostname.clone();
        }
        let segment = self.path.split('/').next().unwrap_or("");
        let host = segment.rsplit('@').next().unwrap_or(segment);
        host.split(':').next().unwrap_or(host).to_lowercase()
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

fn sanitize(url: &str) -> String {
    url.trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect()
}

fn check_bracketed_host(host: &str) -> Result<(), SplitError> {
    let valid = if let Some(rest) = host.strip_prefix('v') {
        // IPvFuture: v<hex>.<anything>
        match rest.split_once('.') {
            Some((ver, tail)) => {
                !ver.is_empty() && ver.chars().all(|c| c.is_ascii_hexdigit()) && !tail.is_empty()
            }
            None => false,
        }
    } else {
        // Scoped literal: fe80::1%eth0, zone must be non-empty
        let (addr, zone_ok) = match host.split_once('%') {
            Some((addr, zone)) => (addr, !zone.is_empty() && !zone.contains('%')),
            None => (host, true),
        };
        zone_ok && addr.parse::<Ipv6Addr>().is_ok()
    };
    if valid {
        Ok(())
    } else {
        Err(SplitError::InvalidIpv6(host.to_string()))
    }
}

fn check_netloc(netloc: &str) -> Result<(), SplitError> {
    let has_open = netloc.contains('[');
    let has_close = netloc.contains(']');
    if has_open != has_close {
        return Err(SplitError::InvalidIpv6(netloc.to_string()));
    }
    if !has_open {
        return Ok(());
    }
    let host_port = netloc.rsplit_once('@').map_or(netloc, |(_, h)| h);
    if let Some((before, bracketed)) = host_port.split_once('[') {
        if !before.is_empty() {
            return Err(SplitError::InvalidIpv6(netloc.to_string()));
        }
        let (host, port) = bracketed.split_once(']').unwrap_or((bracketed, ""));
        if !port.is_empty() && !port.starts_with(':') {
            return Err(SplitError::InvalidIpv6(netloc.to_string()));
        }
        check_bracketed_host(host)?;
    }
    Ok(())
}

fn hostname_of(netloc: &str) -> String {
    let host_info = netloc.rsplit_once('@').map_or(netloc, |(_, h)| h);
    let host = match host_info.split_once('[') {
        Some((_, bracketed)) => bracketed.split_once(']').map_or(bracketed, |(h, _)| h),
        None => host_info.split_once(':').map_or(host_info, |(h, _)| h),
    };
    // Zone ids after '%' keep their case
    match host.split_once('%') {
        Some((addr, zone)) => format!("{}%{}", addr.to_lowercase(), zone),
        None => host.to_lowercase(),
    }
}

fn strip_params<'a>(scheme: &str, path: &'a str) -> &'a str {
    if !USES_PARAMS.contains(&scheme) || !path.contains(';') {
        return path;
    }
    let from = path.rfind('/').unwrap_or(0);
    match path[from..].find(';') {
        Some(i) => &path[..from + i],
        None => path,
    }
}

/// Split a URL into its components.
pub fn split(url: &str) -> Result<UrlParts, SplitError> {
    let clean = sanitize(url);
    let mut rest: &str = &clean;
    let mut parts = UrlParts::default();

    if let Some(i) = rest.find(':') {
        let candidate = &rest[..i];
        let starts_alpha = candidate
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if i > 0 && starts_alpha && candidate.chars().all(is_scheme_char) {
            parts.scheme = candidate.to_ascii_lowercase();
            rest = &rest[i + 1..];
        }
    }

    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(['/', '?', '#']).unwrap_or(after.len());
        let netloc = &after[..end];
        check_netloc(netloc)?;
        parts.netloc = netloc.to_string();
        parts.hostname = hostname_of(netloc);
        rest = &after[end..];
    }

    if let Some((before, fragment)) = rest.split_once('#') {
        parts.fragment = fragment.to_string();
        rest = before;
    }
    if let Some((before, query)) = rest.split_once('?') {
        parts.query = query.to_string();
        rest = before;
    }
    parts.path = strip_params(&parts.scheme, rest).to_string();
    Ok(parts)
}

/// Never fails: an unsplittable URL degrades to empty hostname and path.
pub fn split_lossy(url: &str) -> UrlParts {
    split(url).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_full_url() {
        let p = split("HTTPS://User:pw@WWW.Example.COM:8443/a/b;x=1?q=2&r=3#frag").unwrap();
        assert_eq!(p.scheme, "https");
        assert_eq!(p.netloc, "User:pw@WWW.Example.COM:8443");
        assert_eq!(p.hostname, "www.example.com");
        assert_eq!(p.path, "/a/b");
        assert_eq!(p.query, "q=2&r=3");
        assert_eq!(p.fragment, "frag");
    }

    #[test]
    fn root_url_has_empty_path() {
        let p = split("https://google.com").unwrap();
        assert_eq!(p.hostname, "google.com");
        assert_eq!(p.path, "");
    }

    #[test]
    fn schemeless_input_is_all_path() {
        let p = split("google.com/search").unwrap();
        assert_eq!(p.scheme, "");
        assert_eq!(p.hostname, "");
        assert_eq!(p.path, "google.com/search");
        assert_eq!(p.domain_candidate(), "google.com");
    }

    #[test]
    fn host_with_port_is_not_a_scheme() {
        // "localhost" is a valid scheme token, so the remainder is the path
        let p = split("localhost:8080/x").unwrap();
        assert_eq!(p.scheme, "localhost");
        assert_eq!(p.path, "8080/x");
        let p = split("1.2.3.4:80/x").unwrap();
        assert_eq!(p.scheme, "");
        assert_eq!(p.path, "1.2.3.4:80/x");
    }

    #[test]
    fn ipv6_literal_host() {
        let p = split("http://[2001:DB8::1]:8080/index").unwrap();
        assert_eq!(p.hostname, "2001:db8::1");
        assert_eq!(p.path, "/index");
    }

    #[test]
    fn ipv6_zone_id_is_kept() {
        let p = split("http://[FE80::1%eth0]:80/x").unwrap();
        assert_eq!(p.hostname, "fe80::1%eth0");
        assert_eq!(p.path, "/x");
        assert!(split("http://[fe80::1%]/x").is_err());
        assert!(split("http://[1.2.3.4%eth0]/x").is_err());
    }

    #[test]
    fn domain_candidate_ignores_userinfo_and_port() {
        let p = split("https://google.com@evil-login.xyz/verify").unwrap();
        assert_eq!(p.domain_candidate(), "evil-login.xyz");
        let p = split("http://user:pw@Mail.Google.COM:8443/inbox").unwrap();
        assert_eq!(p.domain_candidate(), "mail.google.com");
        let p = split("google.com@evil.xyz/verify").unwrap();
        assert_eq!(p.domain_candidate(), "evil.xyz");
    }

    #[test]
    fn malformed_ipv6_fails_and_degrades() {
        assert!(split("http://[::1/path").is_err());
        assert!(split("http://[not-an-ip]/path").is_err());
        assert!(split("http://x[::1]/").is_err());
        let p = split_lossy("http://[::1/path");
        assert_eq!(p.hostname, "");
        assert_eq!(p.path, "");
    }

    #[test]
    fn strips_control_chars() {
        let p = split("  \thttp://exa\nmple.com/p\r").unwrap();
        assert_eq!(p.hostname, "example.com");
        assert_eq!(p.path, "/p");
    }

    #[test]
    fn params_only_on_last_segment() {
        let p = split("http://h/a;b/c;d").unwrap();
        assert_eq!(p.path, "/a;b/c");
        let p = split("mailto:x;y").unwrap();
        assert_eq!(p.path, "x;y");
    }

    #[test]
    fn empty_input() {
        assert_eq!(split("").unwrap(), UrlParts::default());
    }
}
