// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Evaluation Engine
 * Runs the check batches over raw and effective policy collections
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error};

use crate::checks::{Check, CheckContext, NamedCheck, DEFAULT_CHECKS, PARSER_CHECKS, STRICTCSP_CHECKS};
use crate::effective::effective_collection;
use crate::finding::{Finding, FindingType, Severity};
use crate::policy::{PolicyCollection, Version};

/// Result of one evaluation pass: every finding in engine order, plus the
/// effective collection the version-dependent checks ran against.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub findings: Vec<Finding>,
    pub effective: PolicyCollection,
}

impl Evaluation {
    /// Worst severity across all findings; `Severity::None` when clean.
    pub fn worst_severity(&self) -> Severity {
        Finding::worst_severity(&self.findings)
    }
}

/// Evaluates policy collections for a fixed CSP version. The default check
/// set runs the syntax and strict-CSP batches against the raw collection and
/// the security batch against the effective collection; resolver findings
/// about ignored entries sit between the two batches.
#[derive(Debug, Clone)]
pub struct Evaluator {
    version: Version,
    context: CheckContext,
}

impl Evaluator {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            context: CheckContext::default(),
        }
    }

    /// Evaluator with caller-supplied check configuration (e.g. refreshed
    /// bypass datasets).
    pub fn with_context(version: Version, context: CheckContext) -> Self {
        Self { version, context }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Run the default check set.
    pub fn evaluate(&self, csps: &PolicyCollection) -> Evaluation {
        let raw_checks: Vec<NamedCheck> = PARSER_CHECKS
            .iter()
            .chain(STRICTCSP_CHECKS)
            .copied()
            .collect();
        self.evaluate_with_checks(csps, &raw_checks, DEFAULT_CHECKS)
    }

    /// Run caller-selected check batches: `raw_checks` against the raw
    /// collection, then `effective_checks` against the effective collection
    /// for this evaluator's version. Batch order and each check's internal
    /// finding order are preserved; nothing is de-duplicated or re-sorted.
    pub fn evaluate_with_checks(
        &self,
        csps: &PolicyCollection,
        raw_checks: &[NamedCheck],
        effective_checks: &[NamedCheck],
    ) -> Evaluation {
        let mut findings = Vec::new();

        for (name, check) in raw_checks {
            findings.extend(self.run_check(name, *check, csps));
        }

        let (effective, ignored) = effective_collection(csps, self.version);
        debug!(
            version = %self.version,
            ignored = ignored.len(),
            "computed effective policy collection"
        );
        findings.extend(ignored);

        for (name, check) in effective_checks {
            findings.extend(self.run_check(name, *check, &effective));
        }

        Evaluation { findings, effective }
    }

    /// Checks must be total, but a buggy one must not take the whole
    /// evaluation down with it: a panic becomes an INTERNAL_ERROR finding.
    fn run_check(&self, name: &str, check: Check, csps: &PolicyCollection) -> Vec<Finding> {
        match catch_unwind(AssertUnwindSafe(|| check(csps, &self.context))) {
            Ok(findings) => findings,
            Err(_) => {
                error!(check = name, "check panicked, reporting as internal error");
                vec![Finding::new(
                    FindingType::InternalError,
                    format!("Check {} did not run to completion.", name),
                    Severity::Info,
                    "",
                )]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;
    use crate::policy::SCRIPT_SRC;

    #[test]
    fn test_unsafe_inline_suppressed_by_nonce_at_csp3() {
        let csps = parse_header("script-src 'unsafe-inline' 'nonce-foobar'");

        let v1 = Evaluator::new(Version::Csp1).evaluate(&csps);
        let inline_v1: Vec<_> = v1
            .findings
            .iter()
            .filter(|f| f.finding_type == FindingType::ScriptUnsafeInline)
            .collect();
        assert_eq!(inline_v1.len(), 1);

        let v3 = Evaluator::new(Version::Csp3).evaluate(&csps);
        let inline_v3: Vec<_> = v3
            .findings
            .iter()
            .filter(|f| f.finding_type == FindingType::ScriptUnsafeInline)
            .collect();
        assert!(inline_v3.is_empty());
    }

    #[test]
    fn test_batch_order_raw_then_ignored_then_effective() {
        let csps = parse_header("scripts-src foo; script-src 'unsafe-inline' 'nonce-foobar' http://x.com");
        let evaluation = Evaluator::new(Version::Csp3).evaluate(&csps);

        let syntax_pos = evaluation
            .findings
            .iter()
            .position(|f| f.finding_type == FindingType::UnknownDirective)
            .expect("syntax finding expected");
        let ignored_pos = evaluation
            .findings
            .iter()
            .position(|f| f.finding_type == FindingType::Ignored)
            .expect("ignored finding expected");
        let security_pos = evaluation
            .findings
            .iter()
            .position(|f| f.finding_type == FindingType::SrcHttp)
            .expect("security finding expected");

        assert!(syntax_pos < ignored_pos);
        assert!(ignored_pos < security_pos);
    }

    #[test]
    fn test_panicking_check_is_isolated() {
        fn exploding_check(_: &PolicyCollection, _: &CheckContext) -> Vec<Finding> {
            panic!("boom");
        }

        let csps = parse_header("default-src 'self'");
        let evaluator = Evaluator::new(Version::Csp3);
        let evaluation =
            evaluator.evaluate_with_checks(&csps, &[("exploding_check", exploding_check)], &[]);

        assert_eq!(evaluation.findings.len(), 1);
        assert_eq!(evaluation.findings[0].finding_type, FindingType::InternalError);
        assert!(evaluation.findings[0].description.contains("exploding_check"));
    }

    #[test]
    fn test_effective_collection_exposed() {
        let csps = parse_header("script-src 'unsafe-inline' 'nonce-foobar'");
        let evaluation = Evaluator::new(Version::Csp3).evaluate(&csps);
        assert_eq!(
            evaluation.effective.get(0).unwrap().get(SCRIPT_SRC).unwrap(),
            &["'nonce-foobar'".to_string()]
        );
    }

    #[test]
    fn test_worst_severity() {
        let clean = parse_header("");
        let evaluation = Evaluator::new(Version::Csp3)
            .evaluate_with_checks(&clean, &[], &[]);
        assert_eq!(evaluation.worst_severity(), Severity::None);

        let weak = parse_header("script-src 'unsafe-inline'");
        let evaluation = Evaluator::new(Version::Csp1).evaluate(&weak);
        assert_eq!(evaluation.worst_severity(), Severity::High);
    }
}
