use {
    derive_more::Display,
    ldseal_protocol::{EnvelopeError, PasswordError},
    std::fmt,
    thiserror::Error,
};

/// Kinds of blocks supervised while a document is rendered.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    #[display("exercise")]
    Exercise,
    #[display("solution")]
    Solution,
    #[display("presenter note")]
    PresenterNote,
}

/// Violations of the block nesting rules. Each of them aborts the conversion,
/// otherwise content meant to be sealed could end up in the output in clear text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("exercise `{outer}` contains another exercise")]
    NestedExercise { outer: String },
    #[error("solution is not placed inside an exercise")]
    SolutionOutsideExercise,
    #[error("solution of exercise `{label}` contains another solution")]
    NestedSolution { label: String },
    #[error("exercise `{label}` already has a solution")]
    DuplicateSolution { label: String },
    #[error("presenter note contains another presenter note")]
    NestedNote,
    #[error("presenter notes require a master password in the document metadata")]
    MissingMasterPassword,
    #[error("{0} exited without being entered")]
    UnbalancedExit(BlockKind),
    #[error("{0} is still open at the end of the document")]
    UnclosedBlock(BlockKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encryption,
    /// Wrong password or modified envelope. No plaintext is released.
    #[error("authentication failed: wrong password or corrupted data")]
    AuthenticationFailure,
    #[error("malformed envelope: {0}")]
    Envelope(#[from] EnvelopeError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{violation}{line}")]
    Structural {
        violation: StructuralError,
        line: SourceLine,
    },
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("invalid document: {0}")]
    Configuration(String),
    #[error("failed to serialize password manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Line of the source document where a block was declared, if the parser reported it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLine(pub Option<u32>);

impl fmt::Display for SourceLine {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, " (line {line})"),
            None => Ok(()),
        }
    }
}

impl Error {
    /// Attaches a source line to a structural error that doesn't have one yet.
    #[must_use]
    #[inline]
    pub fn at_line(self, line: Option<u32>) -> Self {
        match self {
            Self::Structural {
                violation,
                line: SourceLine(None),
            } => Self::Structural {
                violation,
                line: SourceLine(line),
            },
            other => other,
        }
    }

    #[must_use]
    #[inline]
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            Self::Structural { violation, .. } => Some(violation),
            Self::Password(_) | Self::Crypto(_) | Self::Configuration(_) | Self::Json(_) => None,
        }
    }
}

impl From<StructuralError> for Error {
    #[inline]
    fn from(violation: StructuralError) -> Self {
        Self::Structural {
            violation,
            line: SourceLine::default(),
        }
    }
}
