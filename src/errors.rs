// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use thiserror::Error;

/// Errors surfaced by the CSP analyzer library.
///
/// Malformed policy text is never an error: the parser degrades it into
/// recoverable skips and the checkers into SYNTAX findings. The only
/// programmer-facing failure mode is selecting a CSP version that does not
/// exist, which drives load-bearing branching and must fail fast.
#[derive(Error, Debug)]
pub enum CspError {
    #[error("invalid CSP version: {0} (supported versions: 1, 2, 3)")]
    InvalidVersion(u32),
}

/// Result type for analyzer operations
pub type CspResult<T> = Result<T, CspError>;
