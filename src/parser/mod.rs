//! The parse entry point.
//!
//! [`FeedParser`] owns the name table, the extension registry and the
//! limits. One parser can be reused for any number of documents; each call
//! walks one document to completion before returning.
//!
//! ```
//! use atombind::{Feed, FeedParser};
//!
//! let parser = FeedParser::new();
//! let mut feed = Feed::new();
//! parser
//!     .parse_str(
//!         r#"<feed xmlns="http://www.w3.org/2005/Atom">
//!              <title>Example</title>
//!              <entry><id>urn:1</id></entry>
//!            </feed>"#,
//!         &mut feed,
//!     )
//!     .unwrap();
//! assert_eq!(feed.title.as_ref().map(|t| t.text.as_str()), Some("Example"));
//! assert_eq!(feed.entries().len(), 1);
//! ```
mod constructs;
mod engine;

use std::io::Read;

pub use constructs::{parse_number, parse_timestamp_value, Constructs};

use crate::config::ParserConfig;
use crate::error::{Fault, ParseError};
use crate::extension::{ExtensionHandler, ExtensionRegistry, RawCapture};
use crate::model::{Entry, Feed, Source};
use crate::xml::{NameTable, XmlCursor};
use engine::Engine;

// ============================================================================
// Notifications
// ============================================================================

/// What to do with an entry once it has been parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryDisposition {
    /// Attach it to the target feed.
    #[default]
    Keep,
    /// Drop it; the observer has taken what it needs.
    Discard,
}

/// Callbacks fired while a document is parsed, for callers that consume a
/// feed incrementally.
pub trait ParseObserver {
    /// An `<entry>`'s embedded `<source>` is complete.
    fn on_source(&mut self, _source: &Source) {}

    /// An entry is complete and about to be attached to the feed.
    fn on_entry(&mut self, _entry: &Entry) -> EntryDisposition {
        EntryDisposition::Keep
    }

    /// The feed header and all its entries are complete.
    fn on_feed(&mut self, _feed: &Feed) {}

    /// The root element has been handled. Fires once per successful parse,
    /// whatever the root was.
    fn on_done(&mut self) {}
}

/// Keeps every entry and ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepAll;

impl ParseObserver for KeepAll {}

/// Which root element the document had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootKind {
    Feed,
    Entry,
    /// Anything else. Nothing was parsed.
    Other(String),
}

/// Summary of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub root: RootKind,
    /// The root's `version` attribute, if present.
    pub version: Option<String>,
}

// ============================================================================
// Parser
// ============================================================================

pub struct FeedParser {
    names: NameTable,
    registry: ExtensionRegistry,
    config: ParserConfig,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FeedParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedParser")
            .field("names", &self.names.len())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let mut registry = ExtensionRegistry::default();
        if config.capture_unknown {
            registry.set_fallback(Box::new(RawCapture));
        }
        Self {
            names: NameTable::new(),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Registers a handler for its namespace.
    pub fn register<H: ExtensionHandler + 'static>(&mut self, handler: H) {
        let namespace = self.names.intern(handler.namespace());
        tracing::debug!(
            namespace = handler.namespace(),
            "Registered extension handler"
        );
        self.registry.insert(namespace, Box::new(handler));
    }

    /// Registers a handler built against this parser's name table, so it can
    /// intern the names it dispatches on.
    pub fn register_with<H, F>(&mut self, build: F)
    where
        H: ExtensionHandler + 'static,
        F: FnOnce(&mut NameTable) -> H,
    {
        let handler = build(&mut self.names);
        self.register(handler);
    }

    /// Parses `input` into `feed`. A feed document fills in the feed and its
    /// entries; an entry document adds one entry.
    pub fn parse<R: Read>(&self, input: R, feed: &mut Feed) -> Result<ParseOutcome, ParseError> {
        self.parse_with(input, feed, &mut KeepAll)
    }

    pub fn parse_str(&self, xml: &str, feed: &mut Feed) -> Result<ParseOutcome, ParseError> {
        self.parse_with(xml.as_bytes(), feed, &mut KeepAll)
    }

    /// Like [`FeedParser::parse`], reporting progress to `observer`.
    pub fn parse_with<R: Read>(
        &self,
        input: R,
        feed: &mut Feed,
        observer: &mut dyn ParseObserver,
    ) -> Result<ParseOutcome, ParseError> {
        let run = || -> Result<ParseOutcome, Fault> {
            let document = self.read_document(input)?;
            let mut cursor = XmlCursor::new(&document, &self.names, self.config.max_depth);
            let constructs = Constructs::new(&self.names, &self.registry);
            Engine::new(constructs, observer).parse_document(&mut cursor, feed)
        };
        run().map_err(|fault| {
            tracing::debug!(error = %fault, "Parsing failed");
            ParseError::from(fault)
        })
    }

    fn read_document<R: Read>(&self, input: R) -> Result<Vec<u8>, Fault> {
        let limit = self.config.max_document_bytes;
        let mut document = Vec::new();
        input.take(limit.saturating_add(1)).read_to_end(&mut document)?;
        if document.len() as u64 > limit {
            return Err(Fault::DocumentTooLarge(limit));
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_size_limit() {
        let parser = FeedParser::with_config(ParserConfig {
            max_document_bytes: 16,
            ..ParserConfig::default()
        });
        let mut feed = Feed::new();
        let err = parser
            .parse_str("<feed><title>far too long</title></feed>", &mut feed)
            .unwrap_err();
        assert!(matches!(err.fault(), Some(Fault::DocumentTooLarge(16))));
    }

    #[test]
    fn test_capture_unknown_installs_fallback() {
        let parser = FeedParser::with_config(ParserConfig {
            capture_unknown: true,
            ..ParserConfig::default()
        });
        assert_eq!(parser.registry.len(), 1);
        assert!(FeedParser::new().registry.is_empty());
    }
}
