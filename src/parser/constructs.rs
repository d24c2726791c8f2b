//! Leaf sub-parsers shared by the feed, source and entry grammars.
//!
//! Extension handlers receive a [`Constructs`] so that a schema module can
//! read a nested construct of the same shape (a person, a link, a text
//! construct) exactly the way the core does.
use crate::error::Fault;
use crate::extension::{Disposition, ExtensionRegistry};
use crate::model::{
    BaseLink, Category, Content, Extensible, Generator, Link, Person, PersonKind, TextConstruct,
    TextType,
};
use crate::util::{parse_timestamp, Timestamp};
use crate::xml::{atoms, Attribute, NameTable, Term, XmlCursor};

/// Handle to the sub-parsers and the extension dispatch of one parse.
#[derive(Clone, Copy)]
pub struct Constructs<'p> {
    names: &'p NameTable,
    registry: &'p ExtensionRegistry,
}

impl<'p> Constructs<'p> {
    pub(crate) fn new(names: &'p NameTable, registry: &'p ExtensionRegistry) -> Self {
        Self { names, registry }
    }

    pub fn names(&self) -> &'p NameTable {
        self.names
    }

    // ========================================================================
    // Attributes and extension dispatch
    // ========================================================================

    /// Consumes `xml:base` and `xml:lang` into `target` and returns every
    /// other attribute of the current element.
    pub fn base_attributes(
        &self,
        cursor: &XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<Vec<Attribute>, Fault> {
        let mut rest = Vec::new();
        for attr in cursor.attributes()? {
            if attr.name.is(atoms::XML_NS, atoms::BASE) {
                target.base_mut().xml_base = Some(attr.value);
            } else if attr.name.is(atoms::XML_NS, atoms::LANG) {
                target.base_mut().xml_lang = Some(attr.value);
            } else {
                rest.push(attr);
            }
        }
        Ok(rest)
    }

    /// Base attributes into `target`, everything else to the extensions.
    pub fn common_attributes(
        &self,
        cursor: &XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<(), Fault> {
        for attr in self.base_attributes(cursor, target)? {
            self.offer_attribute(cursor, &attr, target)?;
        }
        Ok(())
    }

    /// Gives the extension handlers their one chance at `attr`.
    pub fn offer_attribute(
        &self,
        cursor: &XmlCursor<'_>,
        attr: &Attribute,
        target: &mut dyn Extensible,
    ) -> Result<(), Fault> {
        if let Disposition::Declined = self.registry.dispatch_attribute(cursor, attr, target)? {
            tracing::trace!(
                attribute = attr.name.local_name(),
                element = cursor.local_name(),
                "Ignoring unclaimed attribute"
            );
        }
        Ok(())
    }

    /// Handles an element the calling grammar does not own.
    ///
    /// Unknown names in the Atom namespace are skipped. Anything else goes
    /// to the extension handlers; if none claims it, it is skipped.
    pub fn offer_element(
        &self,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<(), Fault> {
        let name = cursor.name()?;
        if name.is_unqualified() || name.namespace_atom() == Some(atoms::ATOM_NS) {
            tracing::debug!(
                element = name.local_name(),
                parent = target.kind().as_str(),
                "Skipping unknown Atom element"
            );
            return cursor.skip();
        }
        match self.registry.dispatch_element(self, cursor, target)? {
            Disposition::Consumed => Ok(()),
            Disposition::Declined => {
                tracing::debug!(
                    element = cursor.local_name(),
                    namespace = cursor.namespace_uri().unwrap_or_default(),
                    "Skipping unclaimed extension element"
                );
                cursor.skip()
            }
        }
    }

    /// Offers every child of the current element to the extensions.
    pub fn extension_children(
        &self,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<(), Fault> {
        let mut level = -1;
        while cursor.next_child(&mut level)? {
            self.offer_element(cursor, target)?;
        }
        Ok(())
    }

    // ========================================================================
    // Constructs
    // ========================================================================

    /// `<title>`, `<subtitle>`, `<rights>`, `<summary>`.
    pub fn text_construct(&self, cursor: &mut XmlCursor<'_>) -> Result<TextConstruct, Fault> {
        let mut construct = TextConstruct::default();
        for attr in self.base_attributes(cursor, &mut construct)? {
            if attr.is_plain(atoms::TYPE) {
                construct.text_type = TextType::parse(&attr.value)
                    .ok_or_else(|| Fault::InvalidTextType(attr.value.clone()))?;
            } else {
                self.offer_attribute(cursor, &attr, &mut construct)?;
            }
        }
        construct.text = match construct.text_type {
            TextType::Text => cursor.read_text()?,
            TextType::Html | TextType::Xhtml => cursor.read_inner_xml()?,
        };
        Ok(construct)
    }

    pub fn link(&self, cursor: &mut XmlCursor<'_>) -> Result<Link, Fault> {
        let mut link = Link::default();
        for attr in self.base_attributes(cursor, &mut link)? {
            match attr.name.local() {
                Some(atoms::HREF) if attr.name.is_unqualified() => link.href = Some(attr.value),
                Some(atoms::REL) if attr.name.is_unqualified() => link.rel = Some(attr.value),
                Some(atoms::TYPE) if attr.name.is_unqualified() => {
                    link.content_type = Some(attr.value)
                }
                Some(atoms::HREFLANG) if attr.name.is_unqualified() => {
                    link.hreflang = Some(attr.value)
                }
                Some(atoms::TITLE) if attr.name.is_unqualified() => link.title = Some(attr.value),
                Some(atoms::LENGTH) if attr.name.is_unqualified() => {
                    link.length = Some(parse_number("link", &attr.value)?)
                }
                _ => self.offer_attribute(cursor, &attr, &mut link)?,
            }
        }
        self.extension_children(cursor, &mut link)?;
        Ok(link)
    }

    pub fn category(&self, cursor: &mut XmlCursor<'_>) -> Result<Category, Fault> {
        let mut category = Category::default();
        for attr in self.base_attributes(cursor, &mut category)? {
            if attr.is_plain(atoms::TERM) {
                category.term = attr.value;
            } else if attr.is_plain(atoms::SCHEME) {
                category.scheme = Some(attr.value);
            } else if attr.is_plain(atoms::LABEL) {
                category.label = Some(attr.value);
            } else {
                self.offer_attribute(cursor, &attr, &mut category)?;
            }
        }
        self.extension_children(cursor, &mut category)?;
        Ok(category)
    }

    /// `<author>` or `<contributor>`, depending on `kind`.
    pub fn person(&self, cursor: &mut XmlCursor<'_>, kind: PersonKind) -> Result<Person, Fault> {
        let mut person = Person::new(kind);
        self.common_attributes(cursor, &mut person)?;

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            let term = self.names.classify(cursor.name()?);
            match term {
                Some(Term::Name) => person.name = Some(cursor.read_text()?),
                Some(Term::Uri) => person.uri = Some(cursor.read_text()?),
                Some(Term::Email) => person.email = Some(cursor.read_text()?),
                _ => self.offer_element(cursor, &mut person)?,
            }
        }
        Ok(person)
    }

    pub fn generator(&self, cursor: &mut XmlCursor<'_>) -> Result<Generator, Fault> {
        let mut generator = Generator::default();
        for attr in self.base_attributes(cursor, &mut generator)? {
            if attr.is_plain(atoms::URI) {
                generator.uri = Some(attr.value);
            } else if attr.is_plain(atoms::VERSION) {
                generator.version = Some(attr.value);
            } else {
                self.offer_attribute(cursor, &attr, &mut generator)?;
            }
        }
        generator.text = cursor.read_text()?;
        Ok(generator)
    }

    /// `<content>`. Text content is read as characters, anything else as
    /// raw markup.
    pub fn content(&self, cursor: &mut XmlCursor<'_>) -> Result<Content, Fault> {
        let mut content = Content::default();
        for attr in self.base_attributes(cursor, &mut content)? {
            if attr.is_plain(atoms::TYPE) {
                content.content_type = Some(attr.value);
            } else if attr.is_plain(atoms::SRC) {
                content.src = Some(attr.value);
            } else {
                self.offer_attribute(cursor, &attr, &mut content)?;
            }
        }
        content.body = if content.is_text() {
            cursor.read_text()?
        } else {
            cursor.read_inner_xml()?
        };
        Ok(content)
    }

    /// `<id>`, `<icon>`, `<logo>`.
    pub fn base_link(&self, cursor: &mut XmlCursor<'_>) -> Result<BaseLink, Fault> {
        let mut link = BaseLink::default();
        self.common_attributes(cursor, &mut link)?;
        link.uri = cursor.read_text()?;
        Ok(link)
    }

    /// Character content of the current element as a timestamp.
    pub fn timestamp(&self, cursor: &mut XmlCursor<'_>) -> Result<Timestamp, Fault> {
        let element = cursor.local_name().to_owned();
        let text = cursor.read_text()?;
        parse_timestamp_value(&element, &text)
    }

    /// Character content of the current element as a non-negative integer.
    pub fn number(&self, cursor: &mut XmlCursor<'_>) -> Result<u32, Fault> {
        let element = cursor.local_name().to_owned();
        let text = cursor.read_text()?;
        parse_number(&element, &text)
    }
}

/// Parses a timestamp found in `element`, mapping failure to
/// [`Fault::InvalidTimestamp`].
pub fn parse_timestamp_value(element: &str, value: &str) -> Result<Timestamp, Fault> {
    parse_timestamp(value.trim()).map_err(|source| Fault::InvalidTimestamp {
        element: element.to_owned(),
        value: value.to_owned(),
        source,
    })
}

/// Parses an integer found in `element`, mapping failure to
/// [`Fault::InvalidNumber`].
pub fn parse_number<T>(element: &str, value: &str) -> Result<T, Fault>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value.trim().parse().map_err(|source| Fault::InvalidNumber {
        element: element.to_owned(),
        value: value.to_owned(),
        source,
    })
}
