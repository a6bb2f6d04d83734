use anyhow::{anyhow, Result};
use regex::Regex;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::OnceLock,
};

const DEFAULT_SCHEME: &str = "http";

const REGEX_PATTERNS_HOST: &str =
    r"^((?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://)?(?P<host>[^:/\?\#]*)(:(?P<port>\d+))?/*$";

fn host_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REGEX_PATTERNS_HOST).ok()).as_ref()
}

/// Scheme, host and port taken from the host slot, e.g. `localhost`,
/// `example.com:8080` or `https://api.example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = host_regex()
            .and_then(|re| re.captures(s.trim()))
            .ok_or_else(|| format!("not a host: {s}"))?;

        let scheme = caps
            .name("scheme")
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        let host = caps
            .name("host")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let port = match caps.name("port") {
            Some(m) => Some(
                m.as_str()
                    .parse::<u16>()
                    .map_err(|e| format!("invalid port {}: {e}", m.as_str()))?,
            ),
            None => None,
        };

        Ok(Endpoint { scheme, host, port })
    }
}

impl Endpoint {
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).map_err(|e| anyhow!("Failed to parse host '{}': {}", s, e))
    }

    #[allow(dead_code)]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[allow(dead_code)]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[allow(dead_code)]
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// Joins the draft's host text, path and query string into an absolute URL.
///
/// Host text that does not parse is passed through untouched so the transport
/// reports the problem when the request is sent.
pub fn compose(host: &str, path: &str, query: &str) -> String {
    let mut url = match Endpoint::parse(host) {
        Ok(endpoint) => endpoint.to_string(),
        Err(_) => format!("{DEFAULT_SCHEME}://{host}"),
    };

    if !path.is_empty() {
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
    }

    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }

    url
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_should_default_scheme_to_http() {
        let endpoint = Endpoint::parse("localhost").unwrap();
        assert_eq!(endpoint.scheme(), "http");
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.port(), None);
    }

    #[test]
    fn parse_should_keep_scheme_and_port() {
        let endpoint = Endpoint::parse("HTTPS://api.example.com:8443").unwrap();
        assert_eq!(endpoint.scheme(), "https");
        assert_eq!(endpoint.host(), "api.example.com");
        assert_eq!(endpoint.port(), Some(8443));
        assert_eq!(endpoint.to_string(), "https://api.example.com:8443");
    }

    #[test]
    fn parse_should_reject_out_of_range_port() {
        assert!(Endpoint::parse("example.com:70000").is_err());
    }

    #[test]
    fn parse_should_tolerate_trailing_slash() {
        let endpoint = Endpoint::parse("example.com/").unwrap();
        assert_eq!(endpoint.to_string(), "http://example.com");
    }

    #[test]
    fn compose_with_host_only() {
        assert_eq!(compose("localhost", "", ""), "http://localhost");
    }

    #[test]
    fn compose_adds_leading_slash_to_path() {
        assert_eq!(
            compose("example.com:8080", "api/v1", "page=2"),
            "http://example.com:8080/api/v1?page=2"
        );
        assert_eq!(
            compose("example.com", "/search", "q=rust"),
            "http://example.com/search?q=rust"
        );
    }

    #[test]
    fn compose_passes_unparsable_host_through() {
        assert_eq!(compose("bad host/x", "/", ""), "http://bad host/x/");
    }
}
