use reqwest::Url;

use super::errors::InitiatorError;

/// The parts of the page location the namespace URL is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme with its trailing colon, e.g. `http:`
    pub protocol: String,
    pub hostname: String,
    /// Always explicit. A page on a default port announces `host:443`,
    /// never the bare `host:` an empty browser port would give.
    pub port: u16,
}

impl PageLocation {
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            port,
        }
    }

    /// Parses an origin such as `http://127.0.0.1:5000`.
    /// A missing port falls back to the scheme's default.
    pub fn parse(origin: &str) -> Result<Self, InitiatorError> {
        let url = Url::parse(origin).map_err(|e| InitiatorError::Location(e.to_string()))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| InitiatorError::Location(format!("{origin} has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| InitiatorError::Location(format!("{origin} has no port")))?;

        Ok(Self::new(format!("{}:", url.scheme()), hostname, port))
    }

    /// `<protocol>//<hostname>:<port><namespace>`
    pub fn namespace_url(&self, namespace: &str) -> String {
        format!(
            "{}//{}:{}{}",
            self.protocol, self.hostname, self.port, namespace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://127.0.0.1:5000", "http://127.0.0.1:5000/room")]
    #[case("http://localhost", "http://localhost:80/room")]
    #[case("https://watch.example.com", "https://watch.example.com:443/room")]
    #[case("https://watch.example.com:8443/some/page", "https://watch.example.com:8443/room")]
    fn test_namespace_url(#[case] origin: &str, #[case] expected: &str) {
        let location = PageLocation::parse(origin).unwrap();
        assert_eq!(location.namespace_url("/room"), expected);
    }

    #[test]
    fn test_default_port_is_written_out() {
        let location = PageLocation::parse("https://watch.example.com/").unwrap();
        assert_eq!(location.port, 443);

        let url = location.namespace_url("/room");
        assert_eq!(url, "https://watch.example.com:443/room");
        assert!(!url.contains(":/room"));
    }

    #[test]
    fn test_new_location() {
        let location = PageLocation::new("http:", "10.0.0.2", 8080);
        assert_eq!(location.namespace_url("/room"), "http://10.0.0.2:8080/room");
    }

    #[rstest]
    #[case("not a url")]
    #[case("unix:/run/socket")]
    fn test_invalid_origin(#[case] origin: &str) {
        assert!(matches!(
            PageLocation::parse(origin),
            Err(InitiatorError::Location(_))
        ));
    }
}
