//! The object graph a parse produces.
//!
//! Every entity embeds an [`AtomBase`] and implements [`Extensible`], which
//! is the handle extension handlers populate.
mod base;
mod construct;
mod entry;
mod feed;

pub use base::{
    AtomBase, EntityKind, Extensible, ExtensionElement, ExtensionElements, ExtensionObject,
};
pub use construct::{
    BaseLink, Category, Content, Generator, Link, Person, PersonKind, TextConstruct, TextType,
};
pub use entry::Entry;
pub use feed::{Feed, FeedId, FeedRef, Source};
