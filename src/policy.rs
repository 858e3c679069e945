// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Policy Model
 * Directive vocabulary, value classification and the parsed policy types
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::CspError;

/// CSP directive names used throughout the checks
pub const DEFAULT_SRC: &str = "default-src";
pub const SCRIPT_SRC: &str = "script-src";
pub const STYLE_SRC: &str = "style-src";
pub const OBJECT_SRC: &str = "object-src";
pub const BASE_URI: &str = "base-uri";
pub const WORKER_SRC: &str = "worker-src";
pub const MANIFEST_SRC: &str = "manifest-src";
pub const PLUGIN_TYPES: &str = "plugin-types";
pub const REPORT_URI: &str = "report-uri";
pub const REPORT_TO: &str = "report-to";
pub const TRUSTED_TYPES: &str = "trusted-types";
pub const REQUIRE_TRUSTED_TYPES_FOR: &str = "require-trusted-types-for";
pub const REFLECTED_XSS: &str = "reflected-xss";
pub const REFERRER: &str = "referrer";
pub const DISOWN_OPENER: &str = "disown-opener";

/// CSP source keywords (quoted literals)
pub const SELF: &str = "'self'";
pub const NONE: &str = "'none'";
pub const UNSAFE_INLINE: &str = "'unsafe-inline'";
pub const UNSAFE_EVAL: &str = "'unsafe-eval'";
pub const STRICT_DYNAMIC: &str = "'strict-dynamic'";

/// Fetch directives fall back to `default-src` when absent from a policy.
/// Document, navigation and reporting directives never fall back.
pub const FETCH_DIRECTIVES: &[&str] = &[
    "child-src",
    "connect-src",
    "default-src",
    "font-src",
    "frame-src",
    "img-src",
    "manifest-src",
    "media-src",
    "object-src",
    "prefetch-src",
    "script-src",
    "script-src-attr",
    "script-src-elem",
    "style-src",
    "style-src-attr",
    "style-src-elem",
    "worker-src",
];

/// Every known directive: fetch, document, navigation, reporting and
/// miscellaneous (including deprecated ones, which a parser must still
/// recognize to avoid flagging them as unknown).
pub const DIRECTIVES: &[&str] = &[
    // Fetch directives
    "child-src",
    "connect-src",
    "default-src",
    "font-src",
    "frame-src",
    "img-src",
    "manifest-src",
    "media-src",
    "object-src",
    "prefetch-src",
    "script-src",
    "script-src-attr",
    "script-src-elem",
    "style-src",
    "style-src-attr",
    "style-src-elem",
    "worker-src",
    // Document directives
    "base-uri",
    "plugin-types",
    "sandbox",
    "disown-opener",
    // Navigation directives
    "form-action",
    "frame-ancestors",
    "navigate-to",
    // Reporting directives
    "report-to",
    "report-uri",
    // Other directives
    "block-all-mixed-content",
    "upgrade-insecure-requests",
    "reflected-xss",
    "referrer",
    "require-sri-for",
    "require-trusted-types-for",
    "trusted-types",
    "webrtc",
];

/// Quoted keyword literals with special meaning as source values
pub const KEYWORDS: &[&str] = &[
    "'self'",
    "'none'",
    "'unsafe-inline'",
    "'unsafe-eval'",
    "'wasm-eval'",
    "'wasm-unsafe-eval'",
    "'strict-dynamic'",
    "'unsafe-hashed-attributes'",
    "'unsafe-hashes'",
    "'report-sample'",
    "'block'",
    "'allow'",
];

static URL_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][+a-zA-Z0-9.-]*:$").expect("static regex"));
static NONCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'nonce-(.+)'$").expect("static regex"));
static STRICT_NONCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'nonce-[a-zA-Z0-9+/_-]+={0,2}'$").expect("static regex"));
static HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'(sha256|sha384|sha512)-(.+)'$").expect("static regex"));
static STRICT_HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'(sha256|sha384|sha512)-[a-zA-Z0-9+/]+={0,2}'$").expect("static regex"));

/// True iff `name` case-sensitively matches a known directive token.
pub fn is_directive(name: &str) -> bool {
    DIRECTIVES.contains(&name)
}

/// True iff `value` exactly matches a quoted keyword literal.
pub fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value)
}

/// True iff `value` is a URL scheme token such as `https:` (colon-terminated,
/// no path).
pub fn is_url_scheme(value: &str) -> bool {
    URL_SCHEME_RE.is_match(value)
}

/// True iff `value` is a nonce source. With `strict`, the payload must also
/// use the base64url alphabet.
pub fn is_nonce(value: &str, strict: bool) -> bool {
    let re = if strict { &STRICT_NONCE_RE } else { &NONCE_RE };
    re.is_match(value)
}

/// True iff `value` is a hash source. With `strict`, the payload must also
/// use the standard base64 alphabet.
pub fn is_hash(value: &str, strict: bool) -> bool {
    let re = if strict { &STRICT_HASH_RE } else { &HASH_RE };
    re.is_match(value)
}

/// CSP specification version used for effective-policy computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Version {
    Csp1,
    Csp2,
    Csp3,
}

impl Version {
    /// Build a version from its numeric ordinal. Anything outside 1..=3 is a
    /// hard error: the ordinal drives semantically load-bearing branching and
    /// must never silently degrade.
    pub fn from_ordinal(ordinal: u32) -> Result<Self, CspError> {
        match ordinal {
            1 => Ok(Version::Csp1),
            2 => Ok(Version::Csp2),
            3 => Ok(Version::Csp3),
            other => Err(CspError::InvalidVersion(other)),
        }
    }

    pub fn ordinal(self) -> u32 {
        match self {
            Version::Csp1 => 1,
            Version::Csp2 => 2,
            Version::Csp3 => 3,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CSP{}", self.ordinal())
    }
}

/// One directive with its ordered, de-duplicated value list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveEntry {
    pub name: String,
    pub values: Vec<String>,
}

/// A single parsed policy: an insertion-ordered mapping from lowercase
/// directive name to its value list. Directive names are unique within a
/// policy (first occurrence wins). Immutable after parse; the effective
/// policy resolver mutates clones only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    directives: Vec<DirectiveEntry>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// True iff a directive of this name is present. `name` is expected in
    /// lowercase, as stored.
    pub fn contains(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.directives
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.values.as_slice())
    }

    /// Insert a directive. Returns false (and leaves the policy unchanged)
    /// when the name is already present: first occurrence wins.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.directives.push(DirectiveEntry { name, values });
        true
    }

    pub(crate) fn remove_directive(&mut self, name: &str) {
        self.directives.retain(|d| d.name != name);
    }

    /// Remove one value from a directive, preserving the order of the rest.
    pub(crate) fn remove_value(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.directives.iter_mut().find(|d| d.name == name) {
            entry.values.retain(|v| v != value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirectiveEntry> {
        self.directives.iter()
    }

    pub fn directive_names(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(|d| d.name.as_str())
    }

    /// The directive a user agent actually consults for `directive`: fetch
    /// directives absent from this policy substitute `default-src`; all other
    /// directives are returned unchanged whether present or not.
    pub fn effective_directive<'a>(&self, directive: &'a str) -> &'a str {
        if !self.contains(directive) && FETCH_DIRECTIVES.contains(&directive) {
            DEFAULT_SRC
        } else {
            directive
        }
    }

    /// Effective directives for a list of requested names, de-duplicated
    /// (several absent fetch directives collapse onto `default-src`).
    pub fn effective_directives<'a>(&self, directives: &[&'a str]) -> Vec<&'a str> {
        let mut result: Vec<&str> = Vec::new();
        for directive in directives {
            let effective = self.effective_directive(directive);
            if !result.contains(&effective) {
                result.push(effective);
            }
        }
        result
    }

    /// Values of the effective directive for `directive`; empty when neither
    /// the directive nor its fallback is present.
    pub fn effective_values(&self, directive: &str) -> &[String] {
        self.get(self.effective_directive(directive)).unwrap_or(&[])
    }

    /// True iff the effective script-src of this policy carries a nonce.
    pub fn has_script_nonces(&self) -> bool {
        self.effective_values(SCRIPT_SRC).iter().any(|v| is_nonce(v, false))
    }

    /// True iff the effective script-src of this policy carries a hash.
    pub fn has_script_hashes(&self) -> bool {
        self.effective_values(SCRIPT_SRC).iter().any(|v| is_hash(v, false))
    }

    /// True iff the effective script-src of this policy carries
    /// `'strict-dynamic'`.
    pub fn has_strict_dynamic(&self) -> bool {
        self.effective_values(SCRIPT_SRC).iter().any(|v| v == STRICT_DYNAMIC)
    }
}

impl std::fmt::Display for Policy {
    /// Re-serializes as `name value1 value2; ` per directive, insertion
    /// order preserved. The exact shape (including the trailing separator)
    /// is relied on by the collection round-trip.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.directives {
            write!(f, "{}", entry.name)?;
            for value in &entry.values {
                write!(f, " {}", value)?;
            }
            write!(f, "; ")?;
        }
        Ok(())
    }
}

/// An ordered sequence of policies that are simultaneously enforced: a
/// resource load must satisfy every member (AND semantics). Order is stable
/// and significant for reproducing the original multi-header form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyCollection {
    policies: Vec<Policy>,
}

impl PolicyCollection {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn get(&self, index: usize) -> Option<&Policy> {
        self.policies.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    pub(crate) fn push(&mut self, policy: Policy) {
        self.policies.push(policy);
    }

    /// True iff any policy in the collection uses script nonces, judged
    /// through each policy's own effective script-src.
    pub fn has_script_nonces(&self) -> bool {
        self.policies.iter().any(Policy::has_script_nonces)
    }

    pub fn has_script_hashes(&self) -> bool {
        self.policies.iter().any(Policy::has_script_hashes)
    }

    pub fn has_strict_dynamic(&self) -> bool {
        self.policies.iter().any(Policy::has_strict_dynamic)
    }
}

impl std::fmt::Display for PolicyCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, policy) in self.policies.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", policy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_directive() {
        assert!(is_directive("script-src"));
        assert!(is_directive("default-src"));
        assert!(is_directive("upgrade-insecure-requests"));
        assert!(is_directive("reflected-xss"));
        assert!(!is_directive("Script-Src"));
        assert!(!is_directive("script-src:"));
        assert!(!is_directive("foobar-src"));
    }

    #[test]
    fn test_is_keyword() {
        assert!(is_keyword("'self'"));
        assert!(is_keyword("'strict-dynamic'"));
        assert!(is_keyword("'unsafe-hashes'"));
        assert!(!is_keyword("self"));
        assert!(!is_keyword("'nonce-abc'"));
    }

    #[test]
    fn test_is_url_scheme() {
        assert!(is_url_scheme("https:"));
        assert!(is_url_scheme("data:"));
        assert!(is_url_scheme("chrome-extension:"));
        assert!(is_url_scheme("web+app:"));
        assert!(!is_url_scheme("https"));
        assert!(!is_url_scheme("https://example.com"));
        assert!(!is_url_scheme("1http:"));
    }

    #[test]
    fn test_is_nonce() {
        assert!(is_nonce("'nonce-Rc4s5Zm0'", false));
        assert!(is_nonce("'nonce-Rc4s5Zm0'", true));
        assert!(is_nonce("'nonce-lorem ipsum'", false));
        assert!(!is_nonce("'nonce-lorem ipsum'", true));
        assert!(!is_nonce("nonce-Rc4s5Zm0", false));
        assert!(!is_nonce("'nonce-'", false));
    }

    #[test]
    fn test_is_hash() {
        assert!(is_hash("'sha256-Abc123+/='", false));
        assert!(is_hash("'sha256-Abc123+/='", true));
        assert!(is_hash("'sha384-foo'", false));
        assert!(is_hash("'sha512-foo'", false));
        assert!(!is_hash("'sha1-foo'", false));
        assert!(is_hash("'sha256-foo bar'", false));
        assert!(!is_hash("'sha256-foo bar'", true));
    }

    #[test]
    fn test_version_from_ordinal() {
        assert_eq!(Version::from_ordinal(1).unwrap(), Version::Csp1);
        assert_eq!(Version::from_ordinal(3).unwrap(), Version::Csp3);
        assert!(Version::from_ordinal(0).is_err());
        assert!(Version::from_ordinal(4).is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::Csp1 < Version::Csp2);
        assert!(Version::Csp2 < Version::Csp3);
    }

    #[test]
    fn test_policy_first_occurrence_wins() {
        let mut policy = Policy::new();
        assert!(policy.insert("script-src", vec!["'self'".to_string()]));
        assert!(!policy.insert("script-src", vec!["'none'".to_string()]));
        assert_eq!(policy.get("script-src").unwrap(), &["'self'".to_string()]);
    }

    #[test]
    fn test_effective_directive_fallback() {
        let mut policy = Policy::new();
        policy.insert("default-src", vec![SELF.to_string()]);
        policy.insert("script-src", vec![NONE.to_string()]);

        // Absent fetch directive falls back to default-src
        assert_eq!(policy.effective_directive("style-src"), DEFAULT_SRC);
        // Present directive is consulted directly
        assert_eq!(policy.effective_directive("script-src"), SCRIPT_SRC);
        // Non-fetch directives never fall back
        assert_eq!(policy.effective_directive("base-uri"), BASE_URI);
        assert_eq!(policy.effective_directive("form-action"), "form-action");
    }

    #[test]
    fn test_effective_directives_dedup() {
        let policy = Policy::new();
        let effective = policy.effective_directives(&[SCRIPT_SRC, OBJECT_SRC, BASE_URI]);
        // Both absent fetch directives collapse onto default-src
        assert_eq!(effective, vec![DEFAULT_SRC, BASE_URI]);
    }

    #[test]
    fn test_policy_display_round_shape() {
        let mut policy = Policy::new();
        policy.insert("default-src", vec![SELF.to_string(), "https:".to_string()]);
        policy.insert("object-src", vec![NONE.to_string()]);
        assert_eq!(policy.to_string(), "default-src 'self' https:; object-src 'none'; ");
    }

    #[test]
    fn test_collection_predicates_scan_all_policies() {
        let mut first = Policy::new();
        first.insert("script-src", vec![SELF.to_string()]);
        let mut second = Policy::new();
        second.insert("default-src", vec!["'nonce-abcdefgh'".to_string()]);
        let collection = PolicyCollection::new(vec![first, second]);

        assert!(collection.has_script_nonces());
        assert!(!collection.has_script_hashes());
        assert!(!collection.has_strict_dynamic());
    }
}
