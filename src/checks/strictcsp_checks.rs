// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Strict CSP Checks
 * Adoption and backward-compatibility advice for nonce/hash based policies
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::CheckContext;
use crate::finding::{Finding, FindingType, Severity};
use crate::policy::{PolicyCollection, REQUIRE_TRUSTED_TYPES_FOR, SCRIPT_SRC, STRICT_DYNAMIC, UNSAFE_INLINE};

/// Host and scheme allowlists are frequently bypassable; 'strict-dynamic'
/// with nonces or hashes is the robust alternative.
pub fn check_strict_dynamic(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        let scheme_or_host_present = values.iter().any(|v| !v.starts_with('\''));
        if scheme_or_host_present && !values.iter().any(|v| v == STRICT_DYNAMIC) {
            findings.push(Finding::new(
                FindingType::StrictDynamic,
                "Host allowlists can frequently be bypassed. Consider using 'strict-dynamic' in combination with CSP nonces or hashes.",
                Severity::StrictCsp,
                directive,
            ));
        }
    }
    findings
}

/// 'strict-dynamic' trusts scripts added by already-trusted scripts; without
/// any nonce or hash nothing is trusted to begin with.
pub fn check_strict_dynamic_not_standalone(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if values.iter().any(|v| v == STRICT_DYNAMIC)
            && !csps.has_script_nonces()
            && !csps.has_script_hashes()
        {
            findings.push(Finding::new(
                FindingType::StrictDynamicNotStandalone,
                "'strict-dynamic' without a CSP nonce/hash will block all scripts.",
                Severity::Info,
                directive,
            ));
        }
    }
    findings
}

/// Browsers without nonce/hash support ignore those sources entirely and
/// fall back to the remaining allowlist; without 'unsafe-inline' they would
/// block every inline script.
pub fn check_unsafe_inline_fallback(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    if !csps.has_script_nonces() && !csps.has_script_hashes() {
        return Vec::new();
    }
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if !values.iter().any(|v| v == UNSAFE_INLINE) {
            findings.push(Finding::new(
                FindingType::UnsafeInlineFallback,
                "Consider adding 'unsafe-inline' (ignored by browsers supporting nonces/hashes) to be backward compatible with older browsers.",
                Severity::StrictCsp,
                directive,
            ));
        }
    }
    findings
}

/// Browsers without 'strict-dynamic' support ignore the keyword and enforce
/// the allowlist; without any scheme or host entry they would allow nothing.
pub fn check_allowlist_fallback(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if !values.iter().any(|v| v == STRICT_DYNAMIC) {
            continue;
        }
        let has_fallback = values
            .iter()
            .any(|v| v == "http:" || v == "https:" || v == "*" || v.contains('.'));
        if !has_fallback {
            findings.push(Finding::new(
                FindingType::AllowlistFallback,
                "Consider adding https: and http: url schemes (ignored by browsers supporting 'strict-dynamic') to be backward compatible with older browsers.",
                Severity::StrictCsp,
                directive,
            ));
        }
    }
    findings
}

/// Trusted Types for scripts lock down the DOM XSS injection sinks.
pub fn check_requires_trusted_types_for_scripts(
    csps: &PolicyCollection,
    _ctx: &CheckContext,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(REQUIRE_TRUSTED_TYPES_FOR);
        let values = csp.get(directive).unwrap_or(&[]);
        if !values.iter().any(|v| v == "'script'") {
            findings.push(Finding::new(
                FindingType::RequireTrustedTypesForScripts,
                "Consider requiring Trusted Types for scripts to lock down DOM XSS injection sinks. You can do this by adding \"require-trusted-types-for 'script'\" to your policy.",
                Severity::Info,
                REQUIRE_TRUSTED_TYPES_FOR,
            ));
        }
    }
    findings
}
