use std::fmt;

use crate::probe::{HttpMethod, ProbeTarget};

const TLS_PORTS: &[u16] = &[443, 8443];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn scheme_for_port(port: u16) -> Scheme {
    if TLS_PORTS.contains(&port) {
        Scheme::Https
    } else {
        Scheme::Http
    }
}

pub fn probe_url(host: &str, port: u16) -> String {
    format!("{}://{}:{}", scheme_for_port(port), host, port)
}

/// Every host paired with every port, hosts outermost.
pub fn build_targets(hosts: &[String], ports: &[u16], method: HttpMethod) -> Vec<ProbeTarget> {
    hosts
        .iter()
        .flat_map(|host| {
            ports.iter().map(move |port| ProbeTarget {
                host: host.clone(),
                port: *port,
                method,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_only_on_443_and_8443() {
        assert_eq!(scheme_for_port(443), Scheme::Https);
        assert_eq!(scheme_for_port(8443), Scheme::Https);
        assert_eq!(scheme_for_port(80), Scheme::Http);
        assert_eq!(scheme_for_port(8080), Scheme::Http);
        assert_eq!(scheme_for_port(4443), Scheme::Http);
    }

    #[test]
    fn urls_carry_scheme_and_port() {
        assert_eq!(probe_url("example.com", 80), "http://example.com:80");
        assert_eq!(probe_url("example.com", 8443), "https://example.com:8443");
    }

    #[test]
    fn targets_are_the_cartesian_product() {
        let hosts = vec!["host1".to_string(), "host2".to_string()];
        let targets = build_targets(&hosts, &[80, 443], HttpMethod::Head);

        let pairs: Vec<(&str, u16)> = targets.iter().map(|t| (t.host.as_str(), t.port)).collect();
        assert_eq!(
            pairs,
            vec![("host1", 80), ("host1", 443), ("host2", 80), ("host2", 443)]
        );
        assert!(targets.iter().all(|t| t.method == HttpMethod::Head));
    }
}
