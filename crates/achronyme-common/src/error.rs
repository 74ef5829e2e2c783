//! Engine error representation shared by every layer of the stack.
//!
//! - **`EngineErrorKind`** : the canonical set of failure categories
//! - **`EngineError`**     : kind + optional human-readable context
//!
//! New categories get a new `EngineErrorKind` variant; callers that only
//! match on the kinds they care about keep compiling.

use std::{error::Error, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised failure categories.
///
/// Names are CamelCase (idiomatic Rust) while `Display` renders the
/// canonical codes the host sees (`ParseError`, `ShapeError`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    Parse,
    Name,
    Arity,
    TypeMismatch,
    Shape,
    InvalidHandle,
    SingularMatrix,
    NotPositiveDefinite,
    NonRealResult,
    Overflow,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "ParseError",
            Self::Name => "NameError",
            Self::Arity => "ArityError",
            Self::TypeMismatch => "TypeMismatch",
            Self::Shape => "ShapeError",
            Self::InvalidHandle => "InvalidHandle",
            Self::SingularMatrix => "SingularMatrix",
            Self::NotPositiveDefinite => "NotPositiveDefinite",
            Self::NonRealResult => "NonRealResult",
            Self::Overflow => "Overflow",
        })
    }
}

/// The single error struct the whole engine passes around.
///
/// * **kind**    – mandatory failure category
/// * **message** – optional human explanation (operand shapes, names, …)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: Option<String>,
}

impl From<EngineErrorKind> for EngineError {
    fn from(kind: EngineErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl EngineError {
    /// Basic constructor (no message).
    pub fn new(kind: EngineErrorKind) -> Self {
        kind.into()
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for EngineError {}

impl From<EngineError> for String {
    fn from(error: EngineError) -> Self {
        format!("{error}")
    }
}

impl PartialEq<str> for EngineErrorKind {
    fn eq(&self, other: &str) -> bool {
        format!("{self}") == other
    }
}
