use strum::Display;

/// The grammar a converter was asked to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ValueKind {
    Color,
    Dimension,
    Shadow,
    Duration,
    TimingFunction,
    FontFamily,
    FontWeight,
    LineHeight,
    BorderStyle,
}

/// A single raw value did not match its domain grammar.
///
/// Never fatal: the extractor that hit it logs a warning and skips that observation only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty {kind} value")]
    Empty { kind: ValueKind },

    #[error("invalid {kind} value '{raw}': {reason}")]
    Invalid { kind: ValueKind, raw: String, reason: &'static str },

    #[error("{kind} value '{raw}' does not resolve to a concrete value")]
    Unresolved { kind: ValueKind, raw: String },
}

impl ParseError {
    pub(crate) fn invalid(kind: ValueKind, raw: &str, reason: &'static str) -> Self {
        Self::Invalid {
            kind,
            raw: raw.to_string(),
            reason,
        }
    }

    pub(crate) fn unresolved(kind: ValueKind, raw: &str) -> Self {
        Self::Unresolved { kind, raw: raw.to_string() }
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Empty { kind } | Self::Invalid { kind, .. } | Self::Unresolved { kind, .. } => *kind,
        }
    }
}
