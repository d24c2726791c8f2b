use crate::error::CollectionError;
use crate::model::{Entry, FeedRef};

/// What adding an entry to a feed's collection should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Unbound, or bound to a feed identical to the owner: bind as is.
    Bind,
    /// Bound to another feed: bind a detached copy instead.
    CopyAndBind,
    /// Already bound to this very feed.
    Reject,
}

/// Decides how `entry` joins the feed identified by `owner`.
pub fn decide_placement(owner: &FeedRef, entry: &Entry) -> Placement {
    match entry.feed() {
        None => Placement::Bind,
        Some(bound) if bound.same_instance(owner) => Placement::Reject,
        Some(bound) if bound.is_identical(owner) => Placement::Bind,
        Some(_) => Placement::CopyAndBind,
    }
}

/// The entries of one feed. Every entry in it is bound to the owner.
#[derive(Debug, Clone)]
pub struct EntryCollection {
    owner: FeedRef,
    entries: Vec<Entry>,
}

impl PartialEq for EntryCollection {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl EntryCollection {
    pub(crate) fn new(owner: FeedRef) -> Self {
        Self {
            owner,
            entries: Vec::new(),
        }
    }

    pub fn owner(&self) -> &FeedRef {
        &self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: FeedRef) {
        for entry in &mut self.entries {
            entry.bind(owner.clone());
        }
        self.owner = owner;
    }

    /// Appends `entry`, binding it to the owning feed.
    ///
    /// An entry bound to a different, non-identical feed is copied first;
    /// the copy is what gets stored. An entry already bound to the owner is
    /// [`CollectionError::DuplicateEntry`].
    pub fn add(&mut self, entry: Entry) -> Result<(), CollectionError> {
        let entry = self.place(entry)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Like [`EntryCollection::add`], at `index`.
    pub fn insert(&mut self, index: usize, entry: Entry) -> Result<(), CollectionError> {
        if index > self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        let entry = self.place(entry)?;
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Replaces the entry at `index`, returning the old one unbound. The new
    /// entry is bound to the owner whatever it was bound to before.
    pub fn set(&mut self, index: usize, mut entry: Entry) -> Result<Entry, CollectionError> {
        if index >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        entry.bind(self.owner.clone());
        let mut old = std::mem::replace(&mut self.entries[index], entry);
        old.unbind();
        Ok(old)
    }

    /// Removes and unbinds the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Entry, CollectionError> {
        if index >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        let mut entry = self.entries.remove(index);
        entry.unbind();
        Ok(entry)
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content equality; the feed binding is not compared.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains(entry)
    }

    pub fn index_of(&self, entry: &Entry) -> Option<usize> {
        self.entries.iter().position(|candidate| candidate == entry)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entry> {
        self.entries.iter_mut()
    }

    fn place(&self, entry: Entry) -> Result<Entry, CollectionError> {
        let mut entry = match decide_placement(&self.owner, &entry) {
            Placement::Bind => entry,
            Placement::CopyAndBind => {
                tracing::debug!(
                    owner = %self.owner,
                    "Entry belongs to another feed, binding a copy"
                );
                Entry::import_from_feed(&entry)
            }
            Placement::Reject => return Err(CollectionError::DuplicateEntry),
        };
        entry.bind(self.owner.clone());
        Ok(entry)
    }

    fn out_of_bounds(&self, index: usize) -> CollectionError {
        CollectionError::IndexOutOfBounds {
            index,
            len: self.entries.len(),
        }
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::ops::Index<usize> for EntryCollection {
    type Output = Entry;

    fn index(&self, index: usize) -> &Entry {
        &self.entries[index]
    }
}
