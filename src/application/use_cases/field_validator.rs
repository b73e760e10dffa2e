//! Email and URL checks, and the header heuristics that decide which
//! columns they apply to.
//!
//! A header is normalized by lowercasing it and dropping every character that
//! is not alphanumeric, so `E-Mail Address` and `work_email` both become
//! email columns. Empty cells always pass.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];
const URL_HEADER_MARKERS: &[&str] = &["url", "website", "homepage", "link"];

/// Semantic role of a column, inferred from its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Email,
    Url,
}

impl FieldRole {
    /// Role for a header name, if any. Email takes precedence.
    pub fn detect(header: &str) -> Option<Self> {
        let normalized: String = header
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        if normalized.contains("email") || normalized == "mail" {
            return Some(FieldRole::Email);
        }
        if URL_HEADER_MARKERS
            .iter()
            .any(|marker| normalized.contains(marker))
            || normalized == "web"
            || normalized == "site"
        {
            return Some(FieldRole::Url);
        }
        None
    }

    pub fn is_valid(&self, value: &str) -> bool {
        match self {
            FieldRole::Email => is_valid_email(value),
            FieldRole::Url => is_valid_url(value),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    value.is_empty() || EMAIL_PATTERN.is_match(value)
}

/// Absolute http(s)/ftp(s) URL with a host
pub fn is_valid_url(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match Url::parse(value) {
        Ok(url) => {
            URL_SCHEMES.contains(&url.scheme())
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_detection() {
        assert_eq!(FieldRole::detect("Email"), Some(FieldRole::Email));
        assert_eq!(FieldRole::detect("E-Mail Address"), Some(FieldRole::Email));
        assert_eq!(FieldRole::detect("work_email"), Some(FieldRole::Email));
        assert_eq!(FieldRole::detect("Website"), Some(FieldRole::Url));
        assert_eq!(FieldRole::detect("LinkedIn Profile"), Some(FieldRole::Url));
        assert_eq!(FieldRole::detect("Image URL"), Some(FieldRole::Url));
        assert_eq!(FieldRole::detect("Web"), Some(FieldRole::Url));
        assert_eq!(FieldRole::detect("Name"), None);
        assert_eq!(FieldRole::detect("Company"), None);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("JOHN@X.COM"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(is_valid_email(""));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("john@localhost"));
        assert!(!is_valid_email("john @x.com"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/path?q=1"));
        assert!(is_valid_url("ftp://files.example.com"));
        assert!(is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("mailto:john@x.com"));
        assert!(!is_valid_url("not a url"));
    }
}
