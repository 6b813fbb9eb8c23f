//! Hostname normalization.
//!
//! Accepts whatever shape a user or environment hands us (full URLs, bare
//! hosts, hosts with ports, quoted values) and produces a canonical
//! lowercase DNS name, or nothing. IP literals and single-label names are
//! never accepted: the result is used as a durable license binding.

use url::{Host, Url};

/// Maximum length of a full hostname.
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// Normalizes `input` into a canonical hostname.
///
/// - `"https://Sub.Example.com:3000/path?q#f"` becomes `"sub.example.com"`
/// - `"sub.example.com"` stays `"sub.example.com"`
/// - `"localhost"`, `"10.0.0.1"`, `"::1"` and blank input give `None`
#[must_use]
pub fn normalize_hostname(input: &str) -> Option<String> {
    let candidate = strip_quotes(input.trim());
    if candidate.is_empty() {
        return None;
    }

    let parsed = if candidate.contains("://") {
        Url::parse(candidate)
    } else {
        Url::parse(&format!("https://{candidate}"))
    };

    match parsed {
        Ok(url) => host_from_url(&url),
        Err(_) => manual_strip(candidate),
    }
}

/// Optional-input form of [`normalize_hostname`].
#[must_use]
pub fn normalize(input: Option<&str>) -> Option<String> {
    input.and_then(normalize_hostname)
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    let raw = raw.strip_suffix(['"', '\'']).unwrap_or(raw);
    raw.trim()
}

fn host_from_url(url: &Url) -> Option<String> {
    let host = match url.host()? {
        Host::Domain(domain) => domain.trim().to_ascii_lowercase(),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };
    accept(host)
}

/// Textual fallback for input the URL parser rejects.
fn manual_strip(candidate: &str) -> Option<String> {
    let without_scheme = match candidate.find("://") {
        Some(idx) if is_scheme(&candidate[..idx]) => &candidate[idx + 3..],
        _ => candidate,
    };
    let end = without_scheme
        .find(['/', '?', '#', ':'])
        .unwrap_or(without_scheme.len());

    accept(without_scheme[..end].trim().to_ascii_lowercase())
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn accept(host: String) -> Option<String> {
    if host.is_empty() || is_ip_address(&host) || !is_valid_hostname(&host) {
        return None;
    }
    Some(host)
}

/// True for dotted-quad IPv4 literals and anything that looks like IPv6.
#[must_use]
pub fn is_ip_address(host: &str) -> bool {
    let ipv4 = {
        let groups: Vec<&str> = host.split('.').collect();
        groups.len() == 4
            && groups
                .iter()
                .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
    };
    let ipv6 = host.contains(':') && host.chars().all(|c| c == ':' || c.is_ascii_hexdigit());
    ipv4 || ipv6
}

/// DNS-label syntax check on an already-lowercased host.
#[must_use]
pub fn is_valid_hostname(host: &str) -> bool {
    if !host.contains('.') || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(
            normalize_hostname("\"app.example.com\"").as_deref(),
            Some("app.example.com")
        );
        assert_eq!(
            normalize_hostname("  'app.example.com'  ").as_deref(),
            Some("app.example.com")
        );
    }

    #[test]
    fn unparseable_url_falls_back_to_textual_strip() {
        // Port out of range makes the URL parser give up.
        assert_eq!(
            normalize_hostname("https://shop.example.com:99999/cart").as_deref(),
            Some("shop.example.com")
        );
    }

    #[test]
    fn fallback_still_validates() {
        assert_eq!(normalize_hostname("https://bad host.com:99999"), None);
    }

    #[test]
    fn scheme_detection() {
        assert!(is_scheme("https"));
        assert!(is_scheme("git+ssh"));
        assert!(!is_scheme("1http"));
        assert!(!is_scheme(""));
    }
}
