// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Header Parser
 * Turns raw Content-Security-Policy header text into policy collections
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use tracing::debug;

use crate::policy::{is_keyword, is_url_scheme, Policy, PolicyCollection};

/// Parse an ordered list of header strings (one per HTTP header instance)
/// into a collection of simultaneously enforced policies. Each string is
/// additionally split on the legacy RFC2616-style `", "` delimiter, which
/// allowed several policies per header; every resulting policy is appended
/// in encounter order.
pub fn parse_headers<S: AsRef<str>>(headers: &[S]) -> PolicyCollection {
    let mut collection = PolicyCollection::default();
    for header in headers {
        for raw in header.as_ref().split(", ") {
            collection.push(parse_policy_string(raw));
        }
    }
    collection
}

/// Parse one header string. Legacy comma-separated multi-policy syntax
/// within the string still produces multiple collection members.
pub fn parse_header(header: &str) -> PolicyCollection {
    parse_headers(&[header])
}

/// Parse a single raw policy string (no multi-policy splitting).
///
/// Tokens that are empty or contain bytes outside the Latin-1 range are
/// skipped. A directive name that was already seen causes the whole token to
/// be dropped (first occurrence wins); that is a recoverable condition, not
/// an error, and is only logged.
pub fn parse_policy_string(raw: &str) -> Policy {
    let mut policy = Policy::new();

    for token in raw.split(';') {
        let token = token.trim();
        if token.is_empty() || !is_latin1(token) {
            continue;
        }

        let mut words = token.split_whitespace();
        let name = match words.next() {
            Some(word) => word.to_lowercase(),
            None => continue,
        };

        let mut values: Vec<String> = Vec::new();
        for word in words {
            let value = normalize_directive_value(word);
            if !values.contains(&value) {
                values.push(value);
            }
        }

        if !policy.insert(name.clone(), values) {
            debug!(directive = %name, "duplicate directive, ignoring all but the first occurrence");
        }
    }

    policy
}

/// Normalize one directive value: trim whitespace, and lowercase it iff the
/// lowercased form is a recognized keyword or URL scheme. Host and path
/// tokens keep their original case.
pub fn normalize_directive_value(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();
    if is_keyword(&lower) || is_url_scheme(trimmed) {
        lower
    } else {
        trimmed.to_string()
    }
}

fn is_latin1(token: &str) -> bool {
    token.chars().all(|c| (c as u32) <= 0xFF)
}
