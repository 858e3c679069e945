// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Effective Policy Resolver
 * Computes the policy subset a browser of a given CSP version enforces
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use tracing::debug;

use crate::finding::{Finding, FindingType, Severity};
use crate::policy::{
    Policy, PolicyCollection, Version, MANIFEST_SRC, REPORT_TO, REQUIRE_TRUSTED_TYPES_FOR, SCRIPT_SRC,
    SELF, STRICT_DYNAMIC, TRUSTED_TYPES, UNSAFE_INLINE, WORKER_SRC,
};

/// Directives introduced by CSP3 with no meaning to older user agents.
const CSP3_ONLY_DIRECTIVES: &[&str] = &[
    REPORT_TO,
    WORKER_SRC,
    MANIFEST_SRC,
    TRUSTED_TYPES,
    REQUIRE_TRUSTED_TYPES_FOR,
];

/// Derive the effective collection for `version`. Every policy is resolved
/// independently; entries a compliant user agent would disregard are removed
/// from the returned clone and reported as IGNORED findings (severity NONE).
/// The input collection is never mutated.
pub fn effective_collection(
    csps: &PolicyCollection,
    version: Version,
) -> (PolicyCollection, Vec<Finding>) {
    let mut findings = Vec::new();
    let effective = PolicyCollection::new(
        csps.iter()
            .map(|csp| effective_policy(csp, version, &mut findings))
            .collect(),
    );
    (effective, findings)
}

/// Derive the effective policy for one policy at `version`.
///
/// All membership tests run against the original pre-mutation values while
/// removals apply to the clone, so the override rules cannot influence each
/// other's decisions within one pass.
pub fn effective_policy(csp: &Policy, version: Version, findings: &mut Vec<Finding>) -> Policy {
    let mut effective = csp.clone();

    let directive = csp.effective_directive(SCRIPT_SRC);
    let values: Vec<String> = csp.get(directive).map(<[String]>::to_vec).unwrap_or_default();

    // Nonces and hashes make browsers from CSP2 on disregard 'unsafe-inline';
    // browsers below CSP2 don't understand nonces/hashes at all.
    if csp.has_script_nonces() || csp.has_script_hashes() {
        if version >= Version::Csp2 {
            if values.iter().any(|v| v == UNSAFE_INLINE) {
                effective.remove_value(directive, UNSAFE_INLINE);
                findings.push(Finding::with_value(
                    FindingType::Ignored,
                    "unsafe-inline is ignored if a nonce or a hash is present. (CSP2 and above)",
                    Severity::None,
                    directive,
                    UNSAFE_INLINE,
                ));
            }
        } else {
            for value in &values {
                if value.starts_with("'nonce-") || value.starts_with("'sha") {
                    debug!(%directive, %value, "stripping nonce/hash source unsupported before CSP2");
                    effective.remove_value(directive, value);
                }
            }
        }
    }

    // 'strict-dynamic' makes browsers from CSP3 on disregard host/scheme
    // allowlists together with 'self' and 'unsafe-inline'; browsers below
    // CSP3 don't understand the keyword itself.
    if csp.has_strict_dynamic() {
        if version >= Version::Csp3 {
            for value in &values {
                if !value.starts_with('\'') || value == SELF || value == UNSAFE_INLINE {
                    effective.remove_value(directive, value);
                    findings.push(Finding::with_value(
                        FindingType::Ignored,
                        "Because of strict-dynamic this entry is ignored in CSP3 and above",
                        Severity::None,
                        directive,
                        value,
                    ));
                }
            }
        } else {
            effective.remove_value(directive, STRICT_DYNAMIC);
        }
    }

    if version < Version::Csp3 {
        for csp3_directive in CSP3_ONLY_DIRECTIVES {
            effective.remove_directive(csp3_directive);
        }
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;
    use crate::policy::DEFAULT_SRC;

    const VERSIONED_POLICY: &str = "default-src 'unsafe-inline' 'strict-dynamic' 'nonce-123' \
         'sha256-foobar' 'self'; report-to foo.bar; worker-src *; manifest-src *";

    fn values(csps: &PolicyCollection, directive: &str) -> Vec<String> {
        csps.get(0).unwrap().get(directive).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_effective_csp1() {
        let csps = parse_header(VERSIONED_POLICY);
        let (effective, findings) = effective_collection(&csps, Version::Csp1);

        assert_eq!(values(&effective, DEFAULT_SRC), vec!["'unsafe-inline'", "'self'"]);
        assert!(findings.is_empty());
        let policy = effective.get(0).unwrap();
        assert!(!policy.contains(REPORT_TO));
        assert!(!policy.contains(WORKER_SRC));
        assert!(!policy.contains(MANIFEST_SRC));
    }

    #[test]
    fn test_effective_csp2() {
        let csps = parse_header(VERSIONED_POLICY);
        let (effective, findings) = effective_collection(&csps, Version::Csp2);

        assert_eq!(
            values(&effective, DEFAULT_SRC),
            vec!["'nonce-123'", "'sha256-foobar'", "'self'"]
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].finding_type, FindingType::Ignored);
        assert_eq!(findings[0].severity, Severity::None);
        assert_eq!(findings[0].value.as_deref(), Some(UNSAFE_INLINE));
        assert_eq!(findings[0].directive, DEFAULT_SRC);
        let policy = effective.get(0).unwrap();
        assert!(!policy.contains(REPORT_TO));
        assert!(!policy.contains(WORKER_SRC));
        assert!(!policy.contains(MANIFEST_SRC));
    }

    #[test]
    fn test_effective_csp3() {
        let csps = parse_header(VERSIONED_POLICY);
        let (effective, findings) = effective_collection(&csps, Version::Csp3);

        assert_eq!(
            values(&effective, DEFAULT_SRC),
            vec!["'strict-dynamic'", "'nonce-123'", "'sha256-foobar'"]
        );
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| f.finding_type == FindingType::Ignored));
        assert!(findings.iter().all(|f| f.severity == Severity::None));
        let policy = effective.get(0).unwrap();
        assert_eq!(policy.get(REPORT_TO).unwrap(), &["foo.bar".to_string()]);
        assert_eq!(policy.get(WORKER_SRC).unwrap(), &["*".to_string()]);
        assert_eq!(policy.get(MANIFEST_SRC).unwrap(), &["*".to_string()]);
    }

    #[test]
    fn test_input_collection_untouched() {
        let csps = parse_header(VERSIONED_POLICY);
        let before = csps.clone();
        let _ = effective_collection(&csps, Version::Csp3);
        assert_eq!(csps, before);
    }

    #[test]
    fn test_strict_dynamic_stripped_without_nonce_below_csp3() {
        let csps = parse_header("script-src 'strict-dynamic' example.com");
        let (effective, findings) = effective_collection(&csps, Version::Csp2);
        assert_eq!(values(&effective, SCRIPT_SRC), vec!["example.com"]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_plain_allowlist_unchanged_at_csp3() {
        let csps = parse_header("script-src 'self' example.com https:");
        let (effective, findings) = effective_collection(&csps, Version::Csp3);
        assert_eq!(values(&effective, SCRIPT_SRC), vec!["'self'", "example.com", "https:"]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_policies_resolved_independently() {
        let csps = parse_header("script-src 'nonce-aaa' 'unsafe-inline', script-src 'unsafe-inline'");
        let (effective, findings) = effective_collection(&csps, Version::Csp3);
        // Only the nonce-carrying policy drops 'unsafe-inline'
        assert_eq!(
            effective.get(0).unwrap().get(SCRIPT_SRC).unwrap(),
            &["'nonce-aaa'".to_string()]
        );
        assert_eq!(
            effective.get(1).unwrap().get(SCRIPT_SRC).unwrap(),
            &["'unsafe-inline'".to_string()]
        );
        assert_eq!(findings.len(), 1);
    }
}
