use super::base::{impl_extensible, AtomBase, EntityKind};
use super::construct::{BaseLink, Content, PersonKind, TextConstruct};
use super::feed::{FeedRef, Source};
use crate::collections::{CategoryCollection, LinkCollection, PersonCollection};
use crate::util::Timestamp;

/// One item of a feed.
///
/// An entry knows which feed it is bound to; only entry collections change
/// that. Equality compares content and ignores the binding.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: Option<BaseLink>,
    pub title: Option<TextConstruct>,
    pub summary: Option<TextConstruct>,
    pub rights: Option<TextConstruct>,
    pub content: Option<Content>,
    /// Header of the feed this entry was aggregated from.
    pub source: Option<Source>,
    pub updated: Option<Timestamp>,
    pub published: Option<Timestamp>,
    pub links: LinkCollection,
    pub categories: CategoryCollection,
    pub authors: PersonCollection,
    pub contributors: PersonCollection,
    pub base: AtomBase,
    feed: Option<FeedRef>,
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.summary == other.summary
            && self.rights == other.rights
            && self.content == other.content
            && self.source == other.source
            && self.updated == other.updated
            && self.published == other.published
            && self.links == other.links
            && self.categories == other.categories
            && self.authors == other.authors
            && self.contributors == other.contributors
            && self.base == other.base
    }
}

impl Entry {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            summary: None,
            rights: None,
            content: None,
            source: None,
            updated: None,
            published: None,
            links: LinkCollection::new(),
            categories: CategoryCollection::new(),
            authors: PersonCollection::new(PersonKind::Author),
            contributors: PersonCollection::new(PersonKind::Contributor),
            base: AtomBase::default(),
            feed: None,
        }
    }

    /// The feed this entry is bound to, if any.
    pub fn feed(&self) -> Option<&FeedRef> {
        self.feed.as_ref()
    }

    /// Deep copy of `other` that is not bound to any feed.
    pub fn import_from_feed(other: &Entry) -> Entry {
        let mut entry = other.clone();
        entry.feed = None;
        entry
    }

    pub(crate) fn bind(&mut self, feed: FeedRef) {
        self.feed = Some(feed);
    }

    pub(crate) fn unbind(&mut self) {
        self.feed = None;
    }
}

impl_extensible! {
    Entry => EntityKind::Entry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Feed};

    #[test]
    fn test_import_detaches_copy() {
        let mut feed = Feed::new();
        let mut entry = Entry::new();
        entry.id = Some(BaseLink::new("urn:e"));
        entry.categories.add(Category::new("x", None));
        feed.add_entry(entry).unwrap();

        let bound = &feed.entries()[0];
        let copy = Entry::import_from_feed(bound);
        assert!(copy.feed().is_none());
        assert!(bound.feed().is_some());
        assert_eq!(&copy, bound);
    }
}
