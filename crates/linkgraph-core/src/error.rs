use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripts and CI wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidPattern,
    UnknownKindTag,
    FactFileUnreadable,
    FactFileMalformed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidPattern => "E1002",
            Self::UnknownKindTag => "E1003",
            Self::FactFileUnreadable => "E2001",
            Self::FactFileMalformed => "E2002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Filter config parse error",
            Self::InvalidPattern => "Invalid filter pattern",
            Self::UnknownKindTag => "Unknown library kind tag",
            Self::FactFileUnreadable => "Fact file unreadable",
            Self::FactFileMalformed => "Fact file malformed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the filter config file and retry."),
            Self::InvalidPattern => Some("Check the regular expression syntax of the pattern."),
            Self::UnknownKindTag => {
                Some("Use one of: .a, .dylib, .tbd, .framework, spm (or static, dynamic, stub, package).")
            }
            Self::FactFileUnreadable => Some("Check that the fact file exists and is readable."),
            Self::FactFileMalformed => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A filter predicate that could not be compiled.
///
/// These are produced while turning a [`crate::FilterConfig`] into a
/// [`crate::graph::filter::FilterSpec`]; the offending entry is skipped and
/// the rest of the configuration stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("invalid {field} pattern '{pattern}': {reason}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        reason: String,
    },
    #[error("unknown {field} kind tag '{tag}'")]
    UnknownKindTag { field: &'static str, tag: String },
    #[error("failed to parse filter config: {0}")]
    Config(String),
}

impl FilterError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::UnknownKindTag { .. } => ErrorCode::UnknownKindTag,
            Self::Config(_) => ErrorCode::ConfigParseError,
        }
    }
}

/// Failure loading a fact file.
#[derive(Debug, thiserror::Error)]
pub enum FactError {
    #[error("failed to read fact file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed fact file: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FactError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::FactFileUnreadable,
            Self::Malformed(_) => ErrorCode::FactFileMalformed,
        }
    }
}
