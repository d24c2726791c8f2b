//! Source, feed and entry grammars.
use super::{Constructs, EntryDisposition, ParseObserver, ParseOutcome, RootKind};
use crate::error::Fault;
use crate::model::{Entry, Extensible, Feed, PersonKind, Source};
use crate::xml::{atoms, Term, XmlCursor};

/// Where `<source>`-shaped children go: the feed being parsed, or the
/// header embedded in an entry.
enum SourceTarget<'t> {
    Feed(&'t mut Feed),
    Embedded(&'t mut Source),
}

impl SourceTarget<'_> {
    fn source(&mut self) -> &mut Source {
        match self {
            SourceTarget::Feed(feed) => &mut ***feed,
            SourceTarget::Embedded(source) => &mut **source,
        }
    }

    fn extensible(&mut self) -> &mut dyn Extensible {
        match self {
            SourceTarget::Feed(feed) => &mut **feed,
            SourceTarget::Embedded(source) => &mut **source,
        }
    }
}

pub(super) struct Engine<'p, 'o> {
    constructs: Constructs<'p>,
    observer: &'o mut dyn ParseObserver,
}

impl<'p, 'o> Engine<'p, 'o> {
    pub(super) fn new(constructs: Constructs<'p>, observer: &'o mut dyn ParseObserver) -> Self {
        Self {
            constructs,
            observer,
        }
    }

    /// Positions on the root and parses whatever it is into `feed`.
    ///
    /// A root other than `feed` or `entry` is accepted and left untouched,
    /// so callers can probe documents of unknown shape.
    pub(super) fn parse_document(
        &mut self,
        cursor: &mut XmlCursor<'_>,
        feed: &mut Feed,
    ) -> Result<ParseOutcome, Fault> {
        if !cursor.move_to_root()? {
            return Err(Fault::UnexpectedEof);
        }
        let version = cursor
            .attributes()?
            .into_iter()
            .find(|attr| attr.is_plain(atoms::VERSION))
            .map(|attr| attr.value);

        let term = self.constructs.names().classify(cursor.name()?);
        let root = match term {
            Some(Term::Feed) => {
                tracing::debug!("Found feed document");
                self.parse_feed(cursor, feed)?;
                RootKind::Feed
            }
            Some(Term::Entry) => {
                tracing::debug!("Found entry document");
                let entry = self.parse_entry(cursor)?;
                self.route(entry, feed)?;
                RootKind::Entry
            }
            _ => {
                let name = cursor.local_name().to_owned();
                tracing::debug!(root = %name, "Root is neither feed nor entry, nothing parsed");
                RootKind::Other(name)
            }
        };
        self.observer.on_done();
        Ok(ParseOutcome { root, version })
    }

    /// `<feed>`: the header, pagination, then every entry in order.
    pub(super) fn parse_feed(
        &mut self,
        cursor: &mut XmlCursor<'_>,
        feed: &mut Feed,
    ) -> Result<(), Fault> {
        cursor.expect_open(atoms::FEED)?;
        self.parse_source(cursor, SourceTarget::Feed(&mut *feed))?;
        self.observer.on_feed(feed);
        Ok(())
    }

    /// `<entry>`. The cursor must be on an unread entry element.
    pub(super) fn parse_entry(&mut self, cursor: &mut XmlCursor<'_>) -> Result<Entry, Fault> {
        cursor.expect_open(atoms::ENTRY)?;
        let c = self.constructs;
        let mut entry = Entry::new();
        c.common_attributes(cursor, &mut entry)?;

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            let term = c.names().classify(cursor.name()?);
            match term {
                Some(Term::Id) => entry.id = Some(c.base_link(cursor)?),
                Some(Term::Title) => entry.title = Some(c.text_construct(cursor)?),
                Some(Term::Summary) => entry.summary = Some(c.text_construct(cursor)?),
                Some(Term::Rights) => entry.rights = Some(c.text_construct(cursor)?),
                Some(Term::Content) => entry.content = Some(c.content(cursor)?),
                Some(Term::Updated) => entry.updated = Some(c.timestamp(cursor)?),
                Some(Term::Published) => entry.published = Some(c.timestamp(cursor)?),
                Some(Term::Link) => entry.links.add(c.link(cursor)?),
                Some(Term::Category) => entry.categories.add(c.category(cursor)?),
                Some(Term::Author) => entry.authors.push(c.person(cursor, PersonKind::Author)?)?,
                Some(Term::Contributor) => entry
                    .contributors
                    .push(c.person(cursor, PersonKind::Contributor)?)?,
                Some(Term::Source) => {
                    let mut source = Source::new();
                    self.parse_source(cursor, SourceTarget::Embedded(&mut source))?;
                    self.observer.on_source(&source);
                    entry.source = Some(source);
                }
                _ => c.offer_element(cursor, &mut entry)?,
            }
        }
        Ok(entry)
    }

    fn parse_source(
        &mut self,
        cursor: &mut XmlCursor<'_>,
        mut target: SourceTarget<'_>,
    ) -> Result<(), Fault> {
        let c = self.constructs;
        c.common_attributes(cursor, target.extensible())?;

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            let term = c.names().classify(cursor.name()?);

            if let SourceTarget::Feed(feed) = &mut target {
                match term {
                    Some(Term::Entry) => {
                        let entry = self.parse_entry(cursor)?;
                        self.route(entry, feed)?;
                        continue;
                    }
                    Some(Term::TotalResults) => {
                        feed.total_results = Some(c.number(cursor)?);
                        continue;
                    }
                    Some(Term::StartIndex) => {
                        feed.start_index = Some(c.number(cursor)?);
                        continue;
                    }
                    Some(Term::ItemsPerPage) => {
                        feed.items_per_page = Some(c.number(cursor)?);
                        continue;
                    }
                    _ => {}
                }
            }

            let source = target.source();
            match term {
                Some(Term::Id) => source.id = Some(c.base_link(cursor)?),
                Some(Term::Icon) => source.icon = Some(c.base_link(cursor)?),
                Some(Term::Logo) => source.logo = Some(c.base_link(cursor)?),
                Some(Term::Title) => source.title = Some(c.text_construct(cursor)?),
                Some(Term::Subtitle) => source.subtitle = Some(c.text_construct(cursor)?),
                Some(Term::Rights) => source.rights = Some(c.text_construct(cursor)?),
                Some(Term::Updated) => source.updated = Some(c.timestamp(cursor)?),
                Some(Term::Generator) => source.generator = Some(c.generator(cursor)?),
                Some(Term::Link) => source.links.add(c.link(cursor)?),
                Some(Term::Category) => source.categories.add(c.category(cursor)?),
                Some(Term::Author) => source.authors.push(c.person(cursor, PersonKind::Author)?)?,
                Some(Term::Contributor) => source
                    .contributors
                    .push(c.person(cursor, PersonKind::Contributor)?)?,
                _ => c.offer_element(cursor, target.extensible())?,
            }
        }
        Ok(())
    }

    /// Hands a finished entry to the observer and attaches it unless the
    /// observer discards it.
    fn route(&mut self, entry: Entry, feed: &mut Feed) -> Result<(), Fault> {
        match self.observer.on_entry(&entry) {
            EntryDisposition::Keep => feed.add_entry(entry)?,
            EntryDisposition::Discard => {
                tracing::debug!(
                    id = entry.id.as_ref().map_or("", |id| id.uri.as_str()),
                    "Observer discarded entry"
                );
            }
        }
        Ok(())
    }
}
