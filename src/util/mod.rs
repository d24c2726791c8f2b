//! Utility functions shared by the parser and the object model.
//!
//! - **Timestamps**: the single, locale-independent date format used for
//!   every date-valued element and attribute
//! - **URIs**: resolution of references against an inherited `xml:base`
//!
//! # Examples
//!
//! ```
//! use atombind::util::{parse_timestamp, resolve_uri};
//!
//! let ts = parse_timestamp("2006-01-01T00:00:00Z").unwrap();
//! assert_eq!(ts.timestamp(), 1136073600);
//!
//! let url = resolve_uri(Some("https://example.com/feeds/"), "entry/1").unwrap();
//! assert_eq!(url.as_str(), "https://example.com/feeds/entry/1");
//! ```

mod timestamp;
mod uri;

pub use timestamp::{has_time_of_day, parse_timestamp, Timestamp};
pub use uri::resolve_uri;
