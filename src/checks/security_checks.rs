// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Security Checks
 * Detects configurations that leave XSS mitigation ineffective
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::CheckContext;
use crate::finding::{Finding, FindingType, Severity};
use crate::matcher::{hostname_of, match_wildcard_urls, scheme_free_url};
use crate::policy::{
    is_url_scheme, PolicyCollection, BASE_URI, DEFAULT_SRC, DISOWN_OPENER, NONE, OBJECT_SRC,
    PLUGIN_TYPES, REFERRER, REFLECTED_XSS, REPORT_URI, SCRIPT_SRC, SELF, UNSAFE_EVAL, UNSAFE_INLINE,
};

static NONCE_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'nonce-(.+)'$").expect("static regex"));
static IP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("static regex"));

/// URL schemes that reduce script-src to no protection at all.
const RISKY_URL_SCHEMES: &[&str] = &["data:", "http:", "https:"];

/// 'unsafe-inline' in the effective script-src voids XSS protection.
pub fn check_script_unsafe_inline(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if values.iter().any(|v| v == UNSAFE_INLINE) {
            findings.push(Finding::with_value(
                FindingType::ScriptUnsafeInline,
                "'unsafe-inline' allows the execution of unsafe in-page scripts and event handlers.",
                Severity::High,
                directive,
                UNSAFE_INLINE,
            ));
        }
    }
    findings
}

/// 'unsafe-eval' in the effective script-src enables string-to-code sinks.
pub fn check_script_unsafe_eval(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if values.iter().any(|v| v == UNSAFE_EVAL) {
            findings.push(Finding::with_value(
                FindingType::ScriptUnsafeEval,
                "'unsafe-eval' allows the execution of code injected into DOM APIs such as eval().",
                Severity::MediumMaybe,
                directive,
                UNSAFE_EVAL,
            ));
        }
    }
    findings
}

/// Plain URL schemes in the XSS-relevant directives allow loading from any
/// origin using that scheme.
pub fn check_plain_url_schemes(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        for directive in csp.effective_directives(&[SCRIPT_SRC, OBJECT_SRC, BASE_URI]) {
            let values = csp.get(directive).unwrap_or(&[]);
            for value in values {
                if RISKY_URL_SCHEMES.contains(&value.as_str()) {
                    findings.push(Finding::with_value(
                        FindingType::PlainUrlSchemes,
                        format!("{} URI in {} allows the execution of unsafe scripts.", value, directive),
                        Severity::High,
                        directive,
                        value,
                    ));
                }
            }
        }
    }
    findings
}

/// A bare wildcard source in the XSS-relevant directives.
pub fn check_wildcards(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        for directive in csp.effective_directives(&[SCRIPT_SRC, OBJECT_SRC, BASE_URI]) {
            let values = csp.get(directive).unwrap_or(&[]);
            for value in values {
                if scheme_free_url(value) == "*" {
                    findings.push(Finding::with_value(
                        FindingType::PlainWildcard,
                        format!("{} should not allow '*' as source.", directive),
                        Severity::High,
                        directive,
                        value,
                    ));
                }
            }
        }
    }
    findings
}

/// Absent XSS-relevant directives. The exact branching matters: with
/// default-src present only object-src and base-uri can still be gaps, and a
/// present base-uri settles the policy entirely. Without default-src,
/// base-uri is only worth flagging when nonces (or hashes with
/// strict-dynamic) would otherwise be undermined by base tag injection.
pub fn check_missing_directives(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        let mut directives_to_check: &[&str] = &[SCRIPT_SRC, OBJECT_SRC, BASE_URI];

        if csp.contains(DEFAULT_SRC) {
            let default_src_values = csp.get(DEFAULT_SRC).unwrap_or(&[]);
            if !csp.contains(OBJECT_SRC) && !default_src_values.iter().any(|v| v == NONE) {
                findings.push(Finding::new(
                    FindingType::MissingDirectives,
                    "Missing object-src allows the injection of plugins which can execute JavaScript. Can you set it to 'none'?",
                    Severity::HighMaybe,
                    OBJECT_SRC,
                ));
            }
            if csp.contains(BASE_URI) {
                continue;
            }
            directives_to_check = &[BASE_URI];
        }

        for directive in directives_to_check {
            if csp.contains(directive) {
                continue;
            }
            if *directive == BASE_URI {
                if !csps.has_script_nonces() && !(csps.has_script_hashes() && csps.has_strict_dynamic()) {
                    continue;
                }
                findings.push(Finding::new(
                    FindingType::MissingDirectives,
                    "Missing base-uri allows the injection of base tags. They can be used to set the base URL for all relative (script) URLs to an attacker controlled domain. Can you set it to 'none' or 'self'?",
                    Severity::High,
                    BASE_URI,
                ));
            } else {
                findings.push(Finding::new(
                    FindingType::MissingDirectives,
                    format!("{} directive is missing.", directive),
                    Severity::High,
                    *directive,
                ));
            }
        }
    }
    findings
}

/// Match allowlisted script origins against the known JSONP and Angular
/// bypass datasets.
pub fn check_script_allowlist_bypass(csps: &PolicyCollection, ctx: &CheckContext) -> Vec<Finding> {
    let jsonp_urls: Vec<&str> = ctx.bypasses.jsonp_urls.iter().map(String::as_str).collect();
    let angular_urls: Vec<&str> = ctx.bypasses.angular_urls.iter().map(String::as_str).collect();

    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(SCRIPT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);
        if values.iter().any(|v| v == NONE) {
            continue;
        }

        for value in values {
            if value == SELF {
                findings.push(Finding::with_value(
                    FindingType::ScriptAllowlistBypass,
                    "'self' can be problematic if you host JSONP, Angular or user uploaded files.",
                    Severity::MediumMaybe,
                    directive,
                    value,
                ));
                continue;
            }
            // Keywords, nonces and hashes are no host sources.
            if value.starts_with('\'') {
                continue;
            }
            if is_url_scheme(value) || !value.contains('.') {
                continue;
            }

            let url = format!("//{}", scheme_free_url(value));
            let angular_bypass = match_wildcard_urls(&url, &angular_urls);
            let mut jsonp_bypass = match_wildcard_urls(&url, &jsonp_urls);

            // Some JSONP bypasses only yield script execution when eval is
            // allowed in the very same value list.
            if let Some(bypass) = &jsonp_bypass {
                let eval_required = bypass
                    .host_str()
                    .map(|host| ctx.bypasses.jsonp_needs_eval.iter().any(|h| h == host))
                    .unwrap_or(false);
                let eval_present = values.iter().any(|v| v == UNSAFE_EVAL);
                if eval_required && !eval_present {
                    jsonp_bypass = None;
                }
            }

            if jsonp_bypass.is_some() || angular_bypass.is_some() {
                let mut bypass_domain = String::new();
                let mut bypass_txt = String::new();
                if let Some(bypass) = &jsonp_bypass {
                    bypass_domain = bypass.host_str().unwrap_or_default().to_string();
                    bypass_txt.push_str(" JSONP endpoints");
                }
                if let Some(bypass) = &angular_bypass {
                    bypass_domain = bypass.host_str().unwrap_or_default().to_string();
                    if !bypass_txt.is_empty() {
                        bypass_txt.push_str(" and");
                    }
                    bypass_txt.push_str(" Angular libraries");
                }
                findings.push(Finding::with_value(
                    FindingType::ScriptAllowlistBypass,
                    format!("{} is known to host{} which allow to bypass this CSP.", bypass_domain, bypass_txt),
                    Severity::High,
                    directive,
                    value,
                ));
            } else {
                findings.push(Finding::with_value(
                    FindingType::ScriptAllowlistBypass,
                    "No bypass found; make sure that this URL doesn't serve JSONP replies or Angular libraries.",
                    Severity::MediumMaybe,
                    directive,
                    value,
                ));
            }
        }
    }
    findings
}

/// Match allowlisted object origins against known Flash file hosts.
pub fn check_flash_object_allowlist_bypass(csps: &PolicyCollection, ctx: &CheckContext) -> Vec<Finding> {
    let flash_urls: Vec<&str> = ctx.bypasses.flash_urls.iter().map(String::as_str).collect();

    let mut findings = Vec::new();
    for csp in csps.iter() {
        let directive = csp.effective_directive(OBJECT_SRC);
        let values = csp.get(directive).unwrap_or(&[]);

        // Flash is only reachable when plugin-types doesn't exclude it.
        if let Some(plugin_types) = csp.get(PLUGIN_TYPES) {
            if !plugin_types.iter().any(|v| v == "application/x-shockwave-flash") {
                continue;
            }
        }

        for value in values {
            if value == NONE {
                break;
            }
            let url = format!("//{}", scheme_free_url(value));
            if let Some(bypass) = match_wildcard_urls(&url, &flash_urls) {
                findings.push(Finding::with_value(
                    FindingType::ObjectAllowlistBypass,
                    format!(
                        "{} is known to host Flash files which allow to bypass this CSP.",
                        bypass.host_str().unwrap_or_default()
                    ),
                    Severity::High,
                    directive,
                    value,
                ));
            } else if directive == OBJECT_SRC {
                findings.push(Finding::with_value(
                    FindingType::ObjectAllowlistBypass,
                    "Can you restrict object-src to 'none' only?",
                    Severity::MediumMaybe,
                    directive,
                    value,
                ));
            }
        }
    }
    findings
}

/// Literal IP addresses as sources. Loopback usually means a forgotten dev
/// entry; everything else is ignored by browsers anyway.
pub fn check_ip_source(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    super::for_each_directive(csps, |directive, values| {
        for value in values {
            let host = hostname_of(value);
            if !IP_RE.is_match(&host) {
                continue;
            }
            if host == "127.0.0.1" {
                findings.push(Finding::with_value(
                    FindingType::IpSource,
                    format!(
                        "{} directive allows localhost as source. Please make sure to remove this in production environments.",
                        directive
                    ),
                    Severity::Info,
                    directive,
                    value,
                ));
            } else {
                findings.push(Finding::with_value(
                    FindingType::IpSource,
                    format!(
                        "{} directive has an IP-Address as source: {} (will be ignored by browsers!).",
                        directive, host
                    ),
                    Severity::Info,
                    directive,
                    value,
                ));
            }
        }
    });
    findings
}

/// Nonces below 8 characters are brute-forceable; a non-base64 charset hints
/// at a home-grown generator.
pub fn check_nonce_length(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    super::for_each_directive(csps, |directive, values| {
        for value in values {
            let captures = match NONCE_VALUE_RE.captures(value) {
                Some(captures) => captures,
                None => continue,
            };
            let nonce = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            if nonce.len() < 8 {
                findings.push(Finding::with_value(
                    FindingType::NonceLength,
                    "Nonces should be at least 8 characters long.",
                    Severity::Medium,
                    directive,
                    value,
                ));
            }
            if !crate::policy::is_nonce(value, true) {
                findings.push(Finding::with_value(
                    FindingType::NonceCharset,
                    "Nonces should only use the base64 charset.",
                    Severity::Info,
                    directive,
                    value,
                ));
            }
        }
    });
    findings
}

/// Sources fetched over plain HTTP.
pub fn check_src_http(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    super::for_each_directive(csps, |directive, values| {
        for value in values {
            if !value.starts_with("http://") {
                continue;
            }
            let description = if directive == REPORT_URI {
                "Use HTTPS to send violation reports securely."
            } else {
                "Allow only resources downloaded over HTTPS."
            };
            findings.push(Finding::with_value(
                FindingType::SrcHttp,
                description,
                Severity::Medium,
                directive,
                value,
            ));
        }
    });
    findings
}

/// Directives dropped by later CSP versions.
pub fn check_deprecated_directive(csps: &PolicyCollection, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for csp in csps.iter() {
        if csp.contains(REFLECTED_XSS) {
            findings.push(Finding::new(
                FindingType::DeprecatedDirective,
                "reflected-xss is deprecated since CSP2. Please, use the X-XSS-Protection header instead.",
                Severity::Info,
                REFLECTED_XSS,
            ));
        }
        if csp.contains(REFERRER) {
            findings.push(Finding::new(
                FindingType::DeprecatedDirective,
                "referrer is deprecated since CSP2. Please, use the Referrer-Policy header instead.",
                Severity::Info,
                REFERRER,
            ));
        }
        if csp.contains(DISOWN_OPENER) {
            findings.push(Finding::new(
                FindingType::DeprecatedDirective,
                "disown-opener is deprecated since CSP3. Please, use the Cross Origin Opener Policy header instead.",
                Severity::Info,
                DISOWN_OPENER,
            ));
        }
    }
    findings
}
