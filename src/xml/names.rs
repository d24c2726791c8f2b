//! Name interning for the element dispatch.
//!
//! Every local name and namespace URI the engine knows about is registered
//! once, when the [`NameTable`] is built. The cursor maps each name it reads
//! to an [`Atom`], so element dispatch is a handful of integer comparisons
//! instead of string comparisons. Extension modules may register further
//! names before parsing starts; after that the table is read-only.
use std::collections::HashMap;

/// An interned name. Two atoms from the same table are equal exactly when
/// the names they stand for are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

macro_rules! vocabulary {
    ($($konst:ident = $idx:literal => $text:literal,)*) => {
        /// Pre-registered atoms for the base vocabulary.
        pub mod atoms {
            use super::Atom;
            $(pub const $konst: Atom = Atom($idx);)*
        }

        const VOCABULARY: &[(Atom, &str)] = &[$((atoms::$konst, $text),)*];
    };
}

vocabulary! {
    ATOM_NS = 0 => "http://www.w3.org/2005/Atom",
    OPENSEARCH_RSS_NS = 1 => "http://a9.com/-/spec/opensearchrss/1.0/",
    OPENSEARCH_NS = 2 => "http://a9.com/-/spec/opensearch/1.1/",
    XML_NS = 3 => "http://www.w3.org/XML/1998/namespace",
    FEED = 4 => "feed",
    ENTRY = 5 => "entry",
    SOURCE = 6 => "source",
    TITLE = 7 => "title",
    SUBTITLE = 8 => "subtitle",
    RIGHTS = 9 => "rights",
    SUMMARY = 10 => "summary",
    CONTENT = 11 => "content",
    ID = 12 => "id",
    ICON = 13 => "icon",
    LOGO = 14 => "logo",
    UPDATED = 15 => "updated",
    PUBLISHED = 16 => "published",
    LINK = 17 => "link",
    CATEGORY = 18 => "category",
    AUTHOR = 19 => "author",
    CONTRIBUTOR = 20 => "contributor",
    GENERATOR = 21 => "generator",
    NAME = 22 => "name",
    URI = 23 => "uri",
    EMAIL = 24 => "email",
    TOTAL_RESULTS = 25 => "totalResults",
    START_INDEX = 26 => "startIndex",
    ITEMS_PER_PAGE = 27 => "itemsPerPage",
    BASE = 28 => "base",
    LANG = 29 => "lang",
    HREF = 30 => "href",
    REL = 31 => "rel",
    TYPE = 32 => "type",
    HREFLANG = 33 => "hreflang",
    LENGTH = 34 => "length",
    TERM = 35 => "term",
    SCHEME = 36 => "scheme",
    LABEL = 37 => "label",
    SRC = 38 => "src",
    VERSION = 39 => "version",
}

/// Typed tag for every element the engine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Feed,
    Entry,
    Source,
    Title,
    Subtitle,
    Rights,
    Summary,
    Content,
    Id,
    Icon,
    Logo,
    Updated,
    Published,
    Link,
    Category,
    Author,
    Contributor,
    Generator,
    Name,
    Uri,
    Email,
    TotalResults,
    StartIndex,
    ItemsPerPage,
}

const ATOM_TERMS: &[(Atom, Term)] = &[
    (atoms::FEED, Term::Feed),
    (atoms::ENTRY, Term::Entry),
    (atoms::SOURCE, Term::Source),
    (atoms::TITLE, Term::Title),
    (atoms::SUBTITLE, Term::Subtitle),
    (atoms::RIGHTS, Term::Rights),
    (atoms::SUMMARY, Term::Summary),
    (atoms::CONTENT, Term::Content),
    (atoms::ID, Term::Id),
    (atoms::ICON, Term::Icon),
    (atoms::LOGO, Term::Logo),
    (atoms::UPDATED, Term::Updated),
    (atoms::PUBLISHED, Term::Published),
    (atoms::LINK, Term::Link),
    (atoms::CATEGORY, Term::Category),
    (atoms::AUTHOR, Term::Author),
    (atoms::CONTRIBUTOR, Term::Contributor),
    (atoms::GENERATOR, Term::Generator),
    (atoms::NAME, Term::Name),
    (atoms::URI, Term::Uri),
    (atoms::EMAIL, Term::Email),
];

const SEARCH_TERMS: &[(Atom, Term)] = &[
    (atoms::TOTAL_RESULTS, Term::TotalResults),
    (atoms::START_INDEX, Term::StartIndex),
    (atoms::ITEMS_PER_PAGE, Term::ItemsPerPage),
];

/// Namespace part of a resolved [`Name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsRef {
    /// No prefix and no default namespace in scope.
    Unqualified,
    Interned(Atom),
    Foreign(Box<str>),
}

/// A namespace-resolved element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub(crate) namespace: NsRef,
    pub(crate) local: Option<Atom>,
    pub(crate) local_name: Box<str>,
}

impl Name {
    pub fn local(&self) -> Option<Atom> {
        self.local
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> &NsRef {
        &self.namespace
    }

    pub fn namespace_atom(&self) -> Option<Atom> {
        match self.namespace {
            NsRef::Interned(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn is_unqualified(&self) -> bool {
        self.namespace == NsRef::Unqualified
    }

    /// True when the name sits in `namespace` and is the local name `local`.
    pub fn is(&self, namespace: Atom, local: Atom) -> bool {
        self.namespace_atom() == Some(namespace) && self.local == Some(local)
    }

    pub fn namespace_uri<'t>(&'t self, names: &'t NameTable) -> Option<&'t str> {
        match &self.namespace {
            NsRef::Unqualified => None,
            NsRef::Interned(atom) => Some(names.text(*atom)),
            NsRef::Foreign(uri) => Some(uri),
        }
    }
}

/// Interning table scoped to one parser instance.
#[derive(Debug, Clone)]
pub struct NameTable {
    atoms: HashMap<Box<[u8]>, Atom>,
    texts: Vec<Box<str>>,
    terms: HashMap<(Atom, Atom), Term>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    /// Builds a table holding the base vocabulary.
    pub fn new() -> Self {
        let mut table = Self {
            atoms: HashMap::with_capacity(VOCABULARY.len() * 2),
            texts: Vec::with_capacity(VOCABULARY.len() * 2),
            terms: HashMap::new(),
        };
        for (atom, text) in VOCABULARY {
            let interned = table.intern(text);
            debug_assert_eq!(interned, *atom, "vocabulary indices out of order");
        }
        for (local, term) in ATOM_TERMS {
            table.terms.insert((atoms::ATOM_NS, *local), *term);
        }
        for namespace in [atoms::OPENSEARCH_RSS_NS, atoms::OPENSEARCH_NS] {
            for (local, term) in SEARCH_TERMS {
                table.terms.insert((namespace, *local), *term);
            }
        }
        table
    }

    /// Registers `name`, returning the existing atom if it is already known.
    pub fn intern(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.atoms.get(name.as_bytes()) {
            return *atom;
        }
        let atom = Atom(self.texts.len() as u32);
        self.atoms.insert(name.as_bytes().into(), atom);
        self.texts.push(name.into());
        atom
    }

    pub fn get(&self, name: &[u8]) -> Option<Atom> {
        self.atoms.get(name).copied()
    }

    /// The text an atom stands for. Atoms from another table yield `""`.
    pub fn text(&self, atom: Atom) -> &str {
        self.texts.get(atom.0 as usize).map_or("", |text| text)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Maps a resolved element name to its typed tag.
    ///
    /// Unqualified names are looked up in the Atom namespace, so documents
    /// that omit the namespace declaration still bind.
    pub fn classify(&self, name: &Name) -> Option<Term> {
        let namespace = match name.namespace {
            NsRef::Unqualified => atoms::ATOM_NS,
            NsRef::Interned(atom) => atom,
            NsRef::Foreign(_) => return None,
        };
        self.terms.get(&(namespace, name.local?)).copied()
    }
}
