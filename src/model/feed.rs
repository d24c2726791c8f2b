use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use super::base::{impl_extensible, AtomBase, EntityKind, Extensible};
use super::construct::{BaseLink, Generator, PersonKind, TextConstruct};
use super::entry::Entry;
use crate::collections::{CategoryCollection, EntryCollection, LinkCollection, PersonCollection};
use crate::error::CollectionError;
use crate::util::Timestamp;

// ============================================================================
// Feed Identity
// ============================================================================

static NEXT_FEED_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one live [`Feed`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedId(u64);

impl FeedId {
    fn next() -> Self {
        Self(NEXT_FEED_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What an entry remembers about the feed it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRef {
    id: FeedId,
    atom_id: Option<String>,
}

impl FeedRef {
    pub fn id(&self) -> FeedId {
        self.id
    }

    /// The feed's `<id>` at the time of binding.
    pub fn atom_id(&self) -> Option<&str> {
        self.atom_id.as_deref()
    }

    pub fn same_instance(&self, other: &FeedRef) -> bool {
        self.id == other.id
    }

    /// Same instance, or both feeds carry the same non-empty `<id>`.
    pub fn is_identical(&self, other: &FeedRef) -> bool {
        if self.same_instance(other) {
            return true;
        }
        match (self.atom_id(), other.atom_id()) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FeedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.atom_id {
            Some(atom_id) => write!(f, "feed#{} ({atom_id})", self.id.0),
            None => write!(f, "feed#{}", self.id.0),
        }
    }
}

// ============================================================================
// Source
// ============================================================================

/// Feed header metadata. Also embedded in entries aggregated from elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub id: Option<BaseLink>,
    pub title: Option<TextConstruct>,
    pub subtitle: Option<TextConstruct>,
    pub rights: Option<TextConstruct>,
    pub icon: Option<BaseLink>,
    pub logo: Option<BaseLink>,
    pub updated: Option<Timestamp>,
    pub generator: Option<Generator>,
    pub links: LinkCollection,
    pub categories: CategoryCollection,
    pub authors: PersonCollection,
    pub contributors: PersonCollection,
    pub base: AtomBase,
}

impl Default for Source {
    fn default() -> Self {
        Self::new()
    }
}

impl Source {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            subtitle: None,
            rights: None,
            icon: None,
            logo: None,
            updated: None,
            generator: None,
            links: LinkCollection::new(),
            categories: CategoryCollection::new(),
            authors: PersonCollection::new(PersonKind::Author),
            contributors: PersonCollection::new(PersonKind::Contributor),
            base: AtomBase::default(),
        }
    }
}

impl_extensible! {
    Source => EntityKind::Source,
}

// ============================================================================
// Feed
// ============================================================================

/// A [`Source`] plus pagination and the entries it owns.
///
/// Cloning a feed yields a new feed identity; the cloned entries are bound
/// to the clone.
#[derive(Debug)]
pub struct Feed {
    identity: FeedId,
    source: Source,
    pub total_results: Option<u32>,
    pub start_index: Option<u32>,
    pub items_per_page: Option<u32>,
    entries: EntryCollection,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed {
    pub fn new() -> Self {
        let identity = FeedId::next();
        Self {
            identity,
            source: Source::new(),
            total_results: None,
            start_index: None,
            items_per_page: None,
            entries: EntryCollection::new(FeedRef {
                id: identity,
                atom_id: None,
            }),
        }
    }

    pub fn feed_id(&self) -> FeedId {
        self.identity
    }

    pub fn feed_ref(&self) -> FeedRef {
        FeedRef {
            id: self.identity,
            atom_id: self.source.id.as_ref().map(|id| id.uri.clone()),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    /// Mutable access to the entries. The owner binding is refreshed first
    /// so placement sees the feed's current `<id>`.
    pub fn entries_mut(&mut self) -> &mut EntryCollection {
        let owner = self.feed_ref();
        if self.entries.owner() != &owner {
            self.entries.set_owner(owner);
        }
        &mut self.entries
    }

    pub fn add_entry(&mut self, entry: Entry) -> Result<(), CollectionError> {
        self.entries_mut().add(entry)
    }

    /// Same instance, or both feeds carry the same non-empty `<id>`.
    pub fn is_identical(&self, other: &Feed) -> bool {
        self.feed_ref().is_identical(&other.feed_ref())
    }
}

impl Clone for Feed {
    fn clone(&self) -> Self {
        let mut feed = Self {
            identity: FeedId::next(),
            source: self.source.clone(),
            total_results: self.total_results,
            start_index: self.start_index,
            items_per_page: self.items_per_page,
            entries: self.entries.clone(),
        };
        let owner = feed.feed_ref();
        feed.entries.set_owner(owner);
        feed
    }
}

/// Equal when every populated field is equal; identity is ignored.
impl PartialEq for Feed {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.total_results == other.total_results
            && self.start_index == other.start_index
            && self.items_per_page == other.items_per_page
            && self.entries == other.entries
    }
}

impl Deref for Feed {
    type Target = Source;

    fn deref(&self) -> &Source {
        &self.source
    }
}

impl DerefMut for Feed {
    fn deref_mut(&mut self) -> &mut Source {
        &mut self.source
    }
}

impl Extensible for Feed {
    fn base(&self) -> &AtomBase {
        &self.source.base
    }

    fn base_mut(&mut self) -> &mut AtomBase {
        &mut self.source.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Feed
    }
}
