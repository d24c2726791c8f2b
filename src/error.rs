//! Error taxonomy for the parse engine and the object model.
//!
//! Sub-parsers never swallow failures: they return [`Fault`], and the public
//! entry points on [`crate::FeedParser`] convert it into a [`ParseError`] in a
//! single place. Callers therefore see one failure shape no matter how deep in
//! the document the problem was found.
use thiserror::Error;

// ============================================================================
// Top-level Error
// ============================================================================

/// The error returned by every public parse entry point.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be bound. The original cause is available
    /// through [`std::error::Error::source`] and [`ParseError::fault`].
    #[error("parsing failed: {0}")]
    Failed(#[source] Fault),

    /// A parser routine was called in a state its contract does not allow.
    /// This indicates a bug in the calling code, not a malformed document.
    #[error("parser misuse: {0}")]
    Misuse(UsageError),
}

impl ParseError {
    /// Returns the data-driven cause, if this is not a contract violation.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            ParseError::Failed(fault) => Some(fault),
            ParseError::Misuse(_) => None,
        }
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self, ParseError::Misuse(_))
    }
}

impl From<Fault> for ParseError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Usage(usage) => ParseError::Misuse(usage),
            other => ParseError::Failed(other),
        }
    }
}

// ============================================================================
// Internal Causes
// ============================================================================

/// Everything that can go wrong while walking a document.
#[derive(Debug, Error)]
pub enum Fault {
    /// Ill-formed XML, bad escape, undeclared prefix, or a broken attribute.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Reading the underlying stream failed.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid timestamp {value:?} in <{element}>")]
    InvalidTimestamp {
        element: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid number {value:?} in <{element}>")]
    InvalidNumber {
        element: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("namespace prefix {0:?} is not declared")]
    UndeclaredPrefix(String),

    #[error("unknown text construct type {0:?}")]
    InvalidTextType(String),

    /// SEC-003: Element nesting exceeds the configured limit.
    #[error("element nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    #[error("document exceeds maximum size of {0} bytes")]
    DocumentTooLarge(u64),

    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error(transparent)]
    Construct(#[from] ConstructError),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Grammar violations detected while building a single construct.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructError {
    #[error("<{element}> is missing required attribute {field}")]
    MissingField {
        element: &'static str,
        field: &'static str,
    },

    #[error("<{element}> starts at {start} but ends earlier at {end}")]
    Ordering {
        element: &'static str,
        start: String,
        end: String,
    },

    #[error("a reminder needs a recurrence or a <when> to attach to")]
    NoReminderTarget,
}

/// Invariant violations raised by the typed collections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("the entry is already part of this feed")]
    DuplicateEntry,

    #[error("collection holds {expected} values, refusing a {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} is out of bounds for a collection of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Programming-contract violations. These are bugs in the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("cursor is not positioned on <{expected}> (found {found:?})")]
    NotPositioned {
        expected: &'static str,
        found: Option<String>,
    },

    #[error("cursor is not positioned on an element")]
    NoCurrentElement,
}
