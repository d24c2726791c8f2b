//! Ordered containers that enforce a per-kind insertion rule.
//!
//! | Collection             | Rule on insert                                   |
//! |------------------------|--------------------------------------------------|
//! | [`LinkCollection`]     | replaces the link with the same `(rel, type)`    |
//! | [`CategoryCollection`] | replaces the category with the same `term`       |
//! | [`PersonCollection`]   | rejects a person of the other role               |
//! | [`EntryCollection`]    | binds, copies or rejects based on feed ownership |
//!
//! Replaced values are removed and the new value is appended, so the most
//! recent write is always last. Everything else keeps insertion order.
mod entries;

pub use entries::{decide_placement, EntryCollection, Placement};

use crate::error::CollectionError;
use crate::model::{Category, Link, Person, PersonKind};

// ============================================================================
// Generic Collection
// ============================================================================

/// Plain ordered collection with index-checked mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        if index > self.items.len() {
            return Err(self.out_of_bounds(index));
        }
        self.items.insert(index, item);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T, CollectionError> {
        if index >= self.items.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn position(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(|item| predicate(item))
    }

    /// Inserts `item` at `index` after removing the value at `replaced`.
    /// `index` addresses the collection as it was before the removal.
    fn insert_replacing(
        &mut self,
        index: usize,
        item: T,
        replaced: Option<usize>,
    ) -> Result<(), CollectionError> {
        if index > self.items.len() {
            return Err(self.out_of_bounds(index));
        }
        let index = match replaced {
            Some(old) => {
                self.items.remove(old);
                if old < index {
                    index - 1
                } else {
                    index
                }
            }
            None => index,
        };
        self.items.insert(index, item);
        Ok(())
    }

    fn out_of_bounds(&self, index: usize) -> CollectionError {
        CollectionError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        }
    }
}

impl<T: PartialEq> Collection<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.position(|candidate| candidate == item)
    }

    /// Removes the first value equal to `item`.
    pub fn remove_item(&mut self, item: &T) -> Option<T> {
        let index = self.index_of(item)?;
        Some(self.items.remove(index))
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> std::ops::Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

// ============================================================================
// Links
// ============================================================================

/// Links, at most one per `(rel, type)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCollection {
    items: Collection<Link>,
}

impl LinkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `link`, first removing any link with the same rel and type.
    pub fn add(&mut self, link: Link) {
        if let Some(index) = self.same_key(&link) {
            // Index came from position(), so it is in bounds.
            let _ = self.items.remove(index);
        }
        self.items.push(link);
    }

    /// Places `link` at `index`, removing any link with the same rel and type.
    pub fn insert(&mut self, index: usize, link: Link) -> Result<(), CollectionError> {
        let replaced = self.same_key(&link);
        self.items.insert_replacing(index, link, replaced)
    }

    pub fn contains(&self, link: &Link) -> bool {
        self.items.contains(link)
    }

    pub fn index_of(&self, link: &Link) -> Option<usize> {
        self.items.index_of(link)
    }

    /// Exact `(rel, type)` match; an absent value only matches an absent value.
    fn same_key(&self, link: &Link) -> Option<usize> {
        let (rel, content_type) = (link.rel.as_deref(), link.content_type.as_deref());
        self.items
            .position(|l| l.rel.as_deref() == rel && l.content_type.as_deref() == content_type)
    }

    /// First link matching `rel` and `content_type`. `None` matches any value.
    pub fn find_service(&self, rel: Option<&str>, content_type: Option<&str>) -> Option<&Link> {
        self.items.iter().find(|link| {
            rel.map_or(true, |rel| link.rel.as_deref() == Some(rel))
                && content_type.map_or(true, |ty| link.content_type.as_deref() == Some(ty))
        })
    }

    /// `href` of the first link with the given rel, if any.
    pub fn href_for(&self, rel: &str) -> Option<&str> {
        self.find_service(Some(rel), None)
            .and_then(|link| link.href.as_deref())
    }

    pub fn remove(&mut self, index: usize) -> Result<Link, CollectionError> {
        self.items.remove(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Link> {
        self.items.get(index)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Categories, at most one per term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCollection {
    items: Collection<Category>,
}

impl CategoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `category`, first removing any category with the same term.
    pub fn add(&mut self, category: Category) {
        if let Some(index) = self.items.position(|c| c.term == category.term) {
            let _ = self.items.remove(index);
        }
        self.items.push(category);
    }

    /// Places `category` at `index`, removing any category with the same term.
    pub fn insert(&mut self, index: usize, category: Category) -> Result<(), CollectionError> {
        let replaced = self.items.position(|c| c.term == category.term);
        self.items.insert_replacing(index, category, replaced)
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.items.contains(category)
    }

    pub fn index_of(&self, category: &Category) -> Option<usize> {
        self.items.index_of(category)
    }

    pub fn find(&self, term: &str) -> Option<&Category> {
        self.items.iter().find(|c| c.term == term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.find(term).is_some()
    }

    pub fn remove(&mut self, index: usize) -> Result<Category, CollectionError> {
        self.items.remove(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.items.get(index)
    }
}

// ============================================================================
// People
// ============================================================================

/// Authors or contributors. The role is fixed when the collection is made.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonCollection {
    kind: PersonKind,
    items: Collection<Person>,
}

impl PersonCollection {
    pub fn new(kind: PersonKind) -> Self {
        Self {
            kind,
            items: Collection::new(),
        }
    }

    pub fn kind(&self) -> PersonKind {
        self.kind
    }

    pub fn push(&mut self, person: Person) -> Result<(), CollectionError> {
        self.check(&person)?;
        self.items.push(person);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, person: Person) -> Result<(), CollectionError> {
        self.check(&person)?;
        self.items.insert(index, person)
    }

    pub fn remove(&mut self, index: usize) -> Result<Person, CollectionError> {
        self.items.remove(index)
    }

    pub fn remove_item(&mut self, person: &Person) -> Option<Person> {
        self.items.remove_item(person)
    }

    pub fn contains(&self, person: &Person) -> bool {
        self.items.contains(person)
    }

    pub fn index_of(&self, person: &Person) -> Option<usize> {
        self.items.index_of(person)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Person> {
        self.items.get(index)
    }

    fn check(&self, person: &Person) -> Result<(), CollectionError> {
        if person.kind != self.kind {
            return Err(CollectionError::KindMismatch {
                expected: self.kind.as_str(),
                found: person.kind.as_str(),
            });
        }
        Ok(())
    }
}
