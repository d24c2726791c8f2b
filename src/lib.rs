//! Streaming Atom binding with pluggable schema extensions.
//!
//! A [`FeedParser`] walks one Atom document (a `<feed>` or a bare `<entry>`)
//! and fills in a caller-supplied [`Feed`]. Elements outside the Atom
//! vocabulary are offered to [`extension::ExtensionHandler`]s registered per
//! namespace, so product schemas such as [`extension::calendar`] extend the
//! object model without the core knowing about them.
pub mod collections;
pub mod config;
pub mod error;
pub mod extension;
pub mod model;
pub mod parser;
pub mod util;
pub mod xml;

pub use config::{ConfigError, ParserConfig};
pub use error::{CollectionError, ConstructError, Fault, ParseError, UsageError};
pub use model::{Entry, Feed, Source};
pub use parser::{EntryDisposition, FeedParser, ParseObserver, ParseOutcome, RootKind};
