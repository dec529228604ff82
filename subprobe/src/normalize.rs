use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Error;

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,63}$").expect("domain pattern is valid")
});

/// A validated, lowercased fully-qualified domain name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let candidate = input.trim().to_ascii_lowercase();
        if is_valid_domain(&candidate) {
            Ok(Domain(candidate))
        } else {
            Err(Error::InvalidDomain(input.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::parse(s)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_domain(candidate: &str) -> bool {
    DOMAIN_PATTERN.is_match(candidate)
}

/// Turns a raw provider finding into a subdomain of `domain`.
///
/// Whitespace and a leading `*.` are removed first. The result is kept only
/// if it is a strict child of `domain` and is itself a well-formed name.
pub fn normalize(raw: &str, domain: &Domain) -> Option<String> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix("*.").unwrap_or(trimmed).trim();
    let cleaned = cleaned.to_ascii_lowercase();

    let suffix = format!(".{}", domain.as_str());
    if cleaned.len() > suffix.len() && cleaned.ends_with(&suffix) && is_valid_domain(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    #[test]
    fn domain_accepts_well_formed_names() {
        assert!(Domain::parse("example.com").is_ok());
        assert!(Domain::parse("  sub-1.Example.CO.uk ").is_ok());
        assert_eq!(Domain::parse("Example.COM").unwrap().as_str(), "example.com");
    }

    #[test]
    fn domain_rejects_malformed_names() {
        for bad in ["", "localhost", "example.c", "exa mple.com", "example.123", "-.", "a..com"] {
            assert!(Domain::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn strips_wildcard_and_whitespace() {
        assert_eq!(
            normalize("  *.api.example.com\t", &example()),
            Some("api.example.com".to_string())
        );
    }

    #[test]
    fn lowercases_findings() {
        assert_eq!(
            normalize("WWW.Example.com", &example()),
            Some("www.example.com".to_string())
        );
    }

    #[test]
    fn rejects_the_domain_itself_and_lookalikes() {
        let domain = example();
        assert_eq!(normalize("example.com", &domain), None);
        assert_eq!(normalize("*.example.com", &domain), None);
        assert_eq!(normalize("badexample.com", &domain), None);
        assert_eq!(normalize("a.example.com.evil.org", &domain), None);
        assert_eq!(normalize("a.example.org", &domain), None);
    }

    #[test]
    fn rejects_names_failing_the_pattern() {
        let domain = example();
        assert_eq!(normalize("foo_bar.example.com", &domain), None);
        assert_eq!(normalize("a b.example.com", &domain), None);
        assert_eq!(normalize("**.example.com", &domain), None);
        assert_eq!(normalize(".example.com", &domain), None);
    }

    #[test]
    fn accepted_values_always_match_the_suffix_rule() {
        let domain = example();
        let samples = [
            "a.example.com",
            "*.b.example.com",
            "c.example.com\n",
            "example.com",
            "d.example.net",
            "",
            "*.",
            "x.y.z.example.com",
        ];
        for raw in samples {
            if let Some(sub) = normalize(raw, &domain) {
                assert!(sub.ends_with(".example.com"));
                assert!(is_valid_domain(&sub));
            }
        }
    }
}
