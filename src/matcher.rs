// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Wildcard URL Matcher
 * Matches CSP source patterns against known bypass URL lists
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][+a-zA-Z0-9.-]*://").expect("static regex"));

static BASE_URL: Lazy<Url> =
    Lazy::new(|| Url::parse("https://example.com").expect("static base URL"));

/// Strip a `scheme://` or protocol-relative `//` prefix from a source value.
pub fn scheme_free_url(url: &str) -> String {
    let url = SCHEME_RE.replace(url, "");
    url.trim_start_matches("//").to_string()
}

/// Hostname of a CSP source value, lowercased, without userinfo or port.
/// Wildcard hosts (`*.example.com`) pass through unchanged, which is why
/// this does not go through a WHATWG URL parser.
pub fn hostname_of(value: &str) -> String {
    split_host_path(value).0
}

/// Split a source pattern into (lowercased host, path). Accepts absolute,
/// protocol-relative and bare `host/path` forms; query and fragment are not
/// part of the path. Port wildcards (`:*`) and concrete ports are dropped
/// like a URL parser would.
fn split_host_path(pattern: &str) -> (String, String) {
    let rest = scheme_free_url(pattern);
    let rest = match rest.find(|c| c == '?' || c == '#') {
        Some(i) => &rest[..i],
        None => rest.as_str(),
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = match host.rfind(':') {
        Some(i) if host[i + 1..].chars().all(|c| c.is_ascii_digit() || c == '*') => &host[..i],
        _ => host,
    };
    (host.to_lowercase(), path.to_string())
}

/// Match a source pattern (host possibly prefixed with `*.`, optional path)
/// against a list of concrete candidate URLs, returning the first match.
///
/// A candidate's domain must end with the wildcard-free host string, and
/// unless the pattern carried a subdomain wildcard the domains must be
/// exactly equal. A pattern path ending in `/` is a directory prefix; any
/// other path must match exactly. List order is the tie-break for which
/// candidate is reported.
pub fn match_wildcard_urls(pattern: &str, candidates: &[&str]) -> Option<Url> {
    let (host, path) = split_host_path(pattern);
    let host_has_wildcard = host.starts_with("*.");
    // Keep the dot: "*.google.com" must match "www.google.com" as a suffix
    // but never "evilgoogle.com".
    let wildcard_free_host = host.strip_prefix('*').unwrap_or(&host);
    let has_path = !path.is_empty() && path != "/";

    for candidate in candidates {
        let url = match parse_candidate(candidate) {
            Some(url) => url,
            None => continue,
        };
        let domain = match url.host_str() {
            Some(domain) => domain,
            None => continue,
        };
        if !domain.ends_with(wildcard_free_host) {
            continue;
        }
        if !host_has_wildcard && host != domain {
            continue;
        }
        if has_path {
            if path.ends_with('/') {
                if !url.path().starts_with(&path) {
                    continue;
                }
            } else if url.path() != path {
                continue;
            }
        }
        return Some(url);
    }
    None
}

fn parse_candidate(candidate: &str) -> Option<Url> {
    Url::parse(candidate).ok().or_else(|| BASE_URL.join(candidate).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &[&str] = &[
        "//www.google.com/jsapi",
        "//ajax.googleapis.com/ajax/libs/angularjs/1.2.0/angular.js",
        "//cdn.example.org/lib/",
    ];

    #[test]
    fn test_exact_host_match() {
        let matched = match_wildcard_urls("//www.google.com", CANDIDATES).unwrap();
        assert_eq!(matched.host_str(), Some("www.google.com"));
    }

    #[test]
    fn test_host_without_wildcard_never_matches_other_host() {
        assert!(match_wildcard_urls("//google.com", CANDIDATES).is_none());
    }

    #[test]
    fn test_subdomain_wildcard_matches() {
        let matched = match_wildcard_urls("//*.google.com", CANDIDATES).unwrap();
        assert_eq!(matched.host_str(), Some("www.google.com"));
    }

    #[test]
    fn test_wildcard_is_not_a_bare_suffix_match() {
        // "evilgoogle.com" must not satisfy "*.google.com"
        assert!(match_wildcard_urls("//*.google.com", &["//evilgoogle.com/jsapi"]).is_none());
    }

    #[test]
    fn test_path_mismatch_despite_host_match() {
        assert!(match_wildcard_urls("//*.google.com/wrongPath", &["//www.google.com/jsapi"]).is_none());
    }

    #[test]
    fn test_exact_path_match() {
        let matched = match_wildcard_urls("//*.google.com/jsapi", CANDIDATES).unwrap();
        assert_eq!(matched.path(), "/jsapi");
    }

    #[test]
    fn test_directory_prefix_path_match() {
        let matched =
            match_wildcard_urls("//cdn.example.org/lib/", &["//cdn.example.org/lib/flash.swf"]).unwrap();
        assert_eq!(matched.path(), "/lib/flash.swf");
        // Non-slash-terminated pattern requires exact equality
        assert!(match_wildcard_urls("//cdn.example.org/lib", &["//cdn.example.org/lib/flash.swf"]).is_none());
    }

    #[test]
    fn test_first_candidate_wins() {
        let matched = match_wildcard_urls(
            "//*.googleapis.com",
            &[
                "//ajax.googleapis.com/first",
                "//maps.googleapis.com/second",
            ],
        )
        .unwrap();
        assert_eq!(matched.host_str(), Some("ajax.googleapis.com"));
    }

    #[test]
    fn test_host_matching_is_case_insensitive() {
        let matched = match_wildcard_urls("//WWW.Google.COM/jsapi", CANDIDATES).unwrap();
        assert_eq!(matched.host_str(), Some("www.google.com"));
    }

    #[test]
    fn test_port_and_scheme_are_tolerated_in_pattern() {
        assert!(match_wildcard_urls("https://www.google.com:443/jsapi", CANDIDATES).is_some());
        assert!(match_wildcard_urls("//www.google.com:*/jsapi", CANDIDATES).is_some());
    }

    #[test]
    fn test_scheme_free_url() {
        assert_eq!(scheme_free_url("https://example.com/x"), "example.com/x");
        assert_eq!(scheme_free_url("//example.com"), "example.com");
        assert_eq!(scheme_free_url("example.com"), "example.com");
        assert_eq!(scheme_free_url("chrome-extension://abc"), "abc");
    }

    #[test]
    fn test_hostname_of() {
        assert_eq!(hostname_of("https://example.com:8080/x"), "example.com");
        assert_eq!(hostname_of("*.Example.com/path"), "*.example.com");
        assert_eq!(hostname_of("127.0.0.1:5000"), "127.0.0.1");
        assert_eq!(hostname_of("user@example.com"), "example.com");
    }
}
