// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Syntax Checks
 * Best-effort detection of typos the parser tolerates
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::CheckContext;
use crate::finding::{Finding, FindingType, Severity};
use crate::policy::{
    is_directive, is_hash, is_keyword, is_nonce, PolicyCollection, KEYWORDS, REQUIRE_TRUSTED_TYPES_FOR,
    TRUSTED_TYPES,
};

static UNQUOTED_HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(sha256|sha384|sha512)-").expect("static regex"));

/// Flag directive names the vocabulary does not know. A name ending in a
/// colon almost always means the header was pasted with the scheme-style
/// colon attached.
pub fn check_unknown_directive(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        for directive in csp.directive_names() {
            if is_directive(directive) {
                continue;
            }
            if directive.ends_with(':') {
                findings.push(Finding::new(
                    FindingType::UnknownDirective,
                    "CSP directives don't end with a colon.",
                    Severity::Syntax,
                    directive,
                ));
            } else {
                findings.push(Finding::new(
                    FindingType::UnknownDirective,
                    format!("Directive \"{}\" is not a known CSP directive.", directive),
                    Severity::Syntax,
                    directive,
                ));
            }
        }
    }
    findings
}

/// A directive value that itself is a known directive name is almost
/// certainly a forgotten semicolon.
pub fn check_missing_semicolon(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    super::for_each_directive(csps, |directive, values| {
        for value in values {
            if is_directive(value) {
                findings.push(Finding::with_value(
                    FindingType::MissingSemicolon,
                    format!(
                        "Did you forget the semicolon? \"{}\" seems to be a directive, not a value.",
                        value
                    ),
                    Severity::Syntax,
                    directive,
                    value,
                ));
            }
        }
    });
    findings
}

/// Flag values that look like keywords, nonces or hashes without their
/// single-ticks, and quoted values that are no recognized keyword at all.
pub fn check_invalid_keyword(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let keywords_no_ticks: Vec<String> =
        KEYWORDS.iter().map(|k| k.replace('\'', "")).collect();

    let mut findings = Vec::new();
    super::for_each_directive(csps, |directive, values| {
        for value in values {
            if keywords_no_ticks.iter().any(|k| k == value)
                || value.starts_with("nonce-")
                || UNQUOTED_HASH_RE.is_match(value)
            {
                findings.push(Finding::with_value(
                    FindingType::InvalidKeyword,
                    format!("Did you forget to surround \"{}\" with single-ticks?", value),
                    Severity::Syntax,
                    directive,
                    value,
                ));
                continue;
            }

            if !value.starts_with('\'') {
                continue;
            }

            // Trusted Types carry their own quoted literals.
            if directive == REQUIRE_TRUSTED_TYPES_FOR && value == "'script'" {
                continue;
            }
            if directive == TRUSTED_TYPES && (value == "'allow-duplicates'" || value == "'none'") {
                continue;
            }

            if is_keyword(value) || is_hash(value, false) || is_nonce(value, false) {
                continue;
            }

            findings.push(Finding::with_value(
                FindingType::InvalidKeyword,
                format!("{} seems to be an invalid CSP keyword.", value),
                Severity::Syntax,
                directive,
                value,
            ));
        }
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    fn ctx() -> CheckContext {
        CheckContext::default()
    }

    #[test]
    fn test_unknown_directive_reported() {
        let csps = parse_header("scripts-src 'self'");
        let findings = check_unknown_directive(&csps, &ctx());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Syntax);
        assert!(findings[0].description.contains("scripts-src"));
    }

    #[test]
    fn test_directive_with_colon_reported_distinctly() {
        let csps = parse_header("script-src: 'self'");
        let findings = check_unknown_directive(&csps, &ctx());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].description, "CSP directives don't end with a colon.");
    }

    #[test]
    fn test_known_directives_pass() {
        let csps = parse_header("default-src 'self'; script-src 'self'; upgrade-insecure-requests");
        assert!(check_unknown_directive(&csps, &ctx()).is_empty());
    }

    #[test]
    fn test_missing_semicolon_detected() {
        let csps = parse_header("default-src 'self' script-src 'none'");
        let findings = check_missing_semicolon(&csps, &ctx());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].value.as_deref(), Some("script-src"));
        assert_eq!(findings[0].severity, Severity::Syntax);
    }

    #[test]
    fn test_unquoted_keyword_detected() {
        let csps = parse_header("script-src self unsafe-inline");
        let findings = check_invalid_keyword(&csps, &ctx());
        assert_eq!(findings.len(), 2);
        assert!(findings[0].description.contains("single-ticks"));
    }

    #[test]
    fn test_unquoted_nonce_and_hash_detected() {
        let csps = parse_header("script-src nonce-abc123 sha256-foobar");
        let findings = check_invalid_keyword(&csps, &ctx());
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.description.contains("single-ticks")));
    }

    #[test]
    fn test_invalid_quoted_keyword_detected() {
        let csps = parse_header("script-src 'invalid-keyword'");
        let findings = check_invalid_keyword(&csps, &ctx());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("invalid CSP keyword"));
    }

    #[test]
    fn test_valid_quoted_values_pass() {
        let csps = parse_header("script-src 'self' 'unsafe-inline' 'nonce-abc' 'sha256-foobar'");
        assert!(check_invalid_keyword(&csps, &ctx()).is_empty());
    }

    #[test]
    fn test_trusted_types_literals_allowed() {
        let csps = parse_header("require-trusted-types-for 'script'; trusted-types 'allow-duplicates' 'none' myPolicy");
        assert!(check_invalid_keyword(&csps, &ctx()).is_empty());
    }

    #[test]
    fn test_trusted_types_literal_invalid_elsewhere() {
        let csps = parse_header("script-src 'script'");
        let findings = check_invalid_keyword(&csps, &ctx());
        assert_eq!(findings.len(), 1);
    }
}
