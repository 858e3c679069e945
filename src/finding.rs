// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Finding Model
 * Diagnostic records produced by policy checks
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};

/// Severity of a finding. The declaration order is the severity order:
/// smaller means worse, so `High` is the worst possible outcome and `None`
/// the most harmless. Aggregating "worst of a set" is therefore a plain
/// minimum over this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Syntax,
    Medium,
    HighMaybe,
    StrictCsp,
    MediumMaybe,
    Info,
    None,
}

impl Severity {
    /// Numeric band of this severity. The bands are spaced so that related
    /// tooling can insert intermediate levels without renumbering.
    pub fn value(self) -> u8 {
        match self {
            Severity::High => 10,
            Severity::Syntax => 20,
            Severity::Medium => 30,
            Severity::HighMaybe => 40,
            Severity::StrictCsp => 45,
            Severity::MediumMaybe => 50,
            Severity::Info => 60,
            Severity::None => 100,
        }
    }

    /// Worst severity present in `iter`. An empty set has no defect, so it
    /// aggregates to `Severity::None`.
    pub fn worst<I>(iter: I) -> Severity
    where
        I: IntoIterator<Item = Severity>,
    {
        iter.into_iter().min().unwrap_or(Severity::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Syntax => "SYNTAX",
            Severity::Medium => "MEDIUM",
            Severity::HighMaybe => "HIGH_MAYBE",
            Severity::StrictCsp => "STRICT_CSP",
            Severity::MediumMaybe => "MEDIUM_MAYBE",
            Severity::Info => "INFO",
            Severity::None => "NONE",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed enumeration of finding types, grouped by check family. Severity is
/// never derived from the type; every check assigns it explicitly per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingType {
    // Parser checks
    MissingSemicolon,
    UnknownDirective,
    InvalidKeyword,
    NonceCharset,

    // Security checks
    MissingDirectives,
    ScriptUnsafeInline,
    ScriptUnsafeEval,
    PlainUrlSchemes,
    PlainWildcard,
    ScriptAllowlistBypass,
    ObjectAllowlistBypass,
    NonceLength,
    IpSource,
    DeprecatedDirective,
    SrcHttp,

    // Strict CSP / backward compatibility checks
    StrictDynamic,
    StrictDynamicNotStandalone,
    UnsafeInlineFallback,
    AllowlistFallback,
    Ignored,
    RequireTrustedTypesForScripts,

    // Engine
    InternalError,
}

/// A single diagnostic emitted by a check or by the effective-policy
/// resolver. `value` is set only when the finding concerns one specific
/// directive value rather than the directive as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub description: String,
    pub severity: Severity,
    pub directive: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Finding {
    pub fn new(
        finding_type: FindingType,
        description: impl Into<String>,
        severity: Severity,
        directive: impl Into<String>,
    ) -> Self {
        Self {
            finding_type,
            description: description.into(),
            severity,
            directive: directive.into(),
            value: None,
        }
    }

    pub fn with_value(
        finding_type: FindingType,
        description: impl Into<String>,
        severity: Severity,
        directive: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            finding_type,
            description: description.into(),
            severity,
            directive: directive.into(),
            value: Some(value.into()),
        }
    }

    /// Worst severity across `findings`; `Severity::None` for an empty list.
    pub fn worst_severity(findings: &[Finding]) -> Severity {
        Severity::worst(findings.iter().map(|f| f.severity))
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(
                f,
                "[{}] {} {}: {}",
                self.severity, self.directive, value, self.description
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.directive, self.description),
        }
    }
}
