use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::names::{atoms, Atom, Name, NameTable, NsRef};
use crate::error::{Fault, UsageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    /// Self-closing tag that nothing has read yet.
    Empty,
    Closed,
}

/// The element the cursor is positioned on.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    start: BytesStart<'a>,
    name: Name,
    depth: usize,
    state: State,
    /// Byte offset just past the start tag.
    content_start: usize,
}

impl Element<'_> {
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Nesting level, 1 for the document root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// False once the element has been read through its end.
    pub fn is_open(&self) -> bool {
        self.state != State::Closed
    }
}

/// One attribute of the current element, namespace-resolved and unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub value: String,
}

impl Attribute {
    /// True for an attribute without a prefix whose local name is `local`.
    pub fn is_plain(&self, local: Atom) -> bool {
        self.name.is_unqualified() && self.name.local() == Some(local)
    }
}

enum Step {
    Start,
    End,
    Eof,
    Other,
}

/// Pull cursor over a namespace-aware XML token stream.
///
/// The cursor is always either before the root, on an element (open or
/// already read), or past the end of the document. Element-level reads
/// ([`XmlCursor::read_text`], [`XmlCursor::read_inner_xml`],
/// [`XmlCursor::skip`]) consume the current element through its end tag.
pub struct XmlCursor<'a> {
    input: &'a [u8],
    reader: NsReader<&'a [u8]>,
    names: &'a NameTable,
    current: Option<Element<'a>>,
    depth: usize,
    max_depth: usize,
}

impl<'a> XmlCursor<'a> {
    pub fn new(input: &'a [u8], names: &'a NameTable, max_depth: usize) -> Self {
        Self {
            input,
            reader: NsReader::from_reader(input),
            names,
            current: None,
            depth: 0,
            max_depth,
        }
    }

    pub fn names(&self) -> &'a NameTable {
        self.names
    }

    /// Number of elements whose start tag has been read but not their end.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn element(&self) -> Result<&Element<'a>, UsageError> {
        self.current.as_ref().ok_or(UsageError::NoCurrentElement)
    }

    pub fn name(&self) -> Result<&Name, UsageError> {
        self.element().map(Element::name)
    }

    /// Local name of the current element, or `""` before the root.
    pub fn local_name(&self) -> &str {
        self.current.as_ref().map_or("", |el| el.name.local_name())
    }

    /// Namespace URI of the current element, if it has one.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.current
            .as_ref()
            .and_then(|el| el.name.namespace_uri(self.names))
    }

    /// Fails with [`UsageError::NotPositioned`] unless the cursor is on an
    /// unread `<local>` element.
    pub fn expect_open(&self, local: Atom) -> Result<(), UsageError> {
        match &self.current {
            Some(el) if el.is_open() && el.name.local() == Some(local) => Ok(()),
            other => Err(UsageError::NotPositioned {
                expected: static_text(local),
                found: other.as_ref().map(|el| el.name.local_name().to_owned()),
            }),
        }
    }

    /// Advances to the first element of the document. Returns `false` for a
    /// document without elements.
    pub fn move_to_root(&mut self) -> Result<bool, Fault> {
        if self.current.is_some() {
            return Ok(true);
        }
        loop {
            match self.step()? {
                Step::Start => return Ok(true),
                Step::Eof => return Ok(false),
                Step::End | Step::Other => {}
            }
        }
    }

    /// Iterates the children of the element the cursor was on when `level`
    /// was last `-1`.
    ///
    /// Seed `level` with `-1`; the first call pins it to the depth of the
    /// current element. Each `true` leaves the cursor on the next direct
    /// child, skipping whatever the caller left unread of the previous one.
    /// Returns `false` exactly once, after consuming the parent's end tag.
    ///
    /// ```ignore
    /// let mut level = -1;
    /// while cursor.next_child(&mut level)? {
    ///     // cursor is on a child element
    /// }
    /// ```
    pub fn next_child(&mut self, level: &mut i32) -> Result<bool, Fault> {
        if *level < 0 {
            let el = self.current.as_mut().ok_or(UsageError::NoCurrentElement)?;
            match el.state {
                State::Open => *level = el.depth as i32,
                State::Empty => {
                    el.state = State::Closed;
                    return Ok(false);
                }
                State::Closed => return Ok(false),
            }
        }
        let parent_depth = *level as usize;

        while self.depth > parent_depth {
            if let Step::Eof = self.step()? {
                return Err(Fault::UnexpectedEof);
            }
        }
        if self.depth < parent_depth {
            return Ok(false);
        }

        loop {
            match self.step()? {
                Step::Start => return Ok(true),
                Step::End => return Ok(false),
                Step::Eof => return Err(Fault::UnexpectedEof),
                Step::Other => {}
            }
        }
    }

    /// Attributes of the current element, in document order.
    ///
    /// Namespace declarations are not attributes and are left out.
    pub fn attributes(&self) -> Result<Vec<Attribute>, Fault> {
        let el = self.element()?;
        let decoder = self.reader.decoder();
        let mut attributes = Vec::new();
        for attr in el.start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            let namespace = match resolved {
                ResolveResult::Unbound => NsRef::Unqualified,
                ResolveResult::Bound(ns) => ns_ref(self.names, ns.as_ref()),
                ResolveResult::Unknown(prefix) if prefix == b"xml" => {
                    NsRef::Interned(atoms::XML_NS)
                }
                ResolveResult::Unknown(prefix) => {
                    return Err(Fault::UndeclaredPrefix(
                        String::from_utf8_lossy(&prefix).into_owned(),
                    ))
                }
            };
            let name = Name {
                namespace,
                local: self.names.get(local.as_ref()),
                local_name: String::from_utf8_lossy(local.as_ref()).into(),
            };
            let value = attr.decode_and_unescape_value(decoder)?.into_owned();
            attributes.push(Attribute { name, value });
        }
        Ok(attributes)
    }

    /// Reads the character content of the current element through its end
    /// tag, unescaped. Text inside nested elements is included; the markup
    /// itself is dropped.
    pub fn read_text(&mut self) -> Result<String, Fault> {
        let Some(depth) = self.claim()? else {
            return Ok(String::new());
        };
        let mut text = String::new();
        while self.depth >= depth {
            match self.reader.read_event()? {
                Event::Text(t) => {
                    text.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
                }
                Event::CData(c) => {
                    text.push_str(&c.decode().map_err(quick_xml::Error::from)?);
                }
                Event::Start(_) => self.enter()?,
                Event::Empty(_) => self.check_nested_empty()?,
                Event::End(_) => self.leave(),
                Event::Eof => return Err(Fault::UnexpectedEof),
                _ => {}
            }
        }
        Ok(text)
    }

    /// Reads the raw markup between the current element's start and end tags,
    /// exactly as it appears in the document (entities are not expanded).
    ///
    /// The markup is walked event by event, so namespace scopes opened inside
    /// it are closed again and the depth limit applies.
    pub fn read_inner_xml(&mut self) -> Result<String, Fault> {
        let Some(depth) = self.claim()? else {
            return Ok(String::new());
        };
        let start = match &self.current {
            Some(el) if self.depth == depth => el.content_start,
            _ => {
                return Err(UsageError::NotPositioned {
                    expected: "unread element",
                    found: Some(self.local_name().to_owned()),
                }
                .into())
            }
        };

        let mut end = start;
        while self.depth >= depth {
            end = self.reader.buffer_position() as usize;
            match self.reader.read_event()? {
                Event::Start(_) => self.enter()?,
                Event::Empty(_) => self.check_nested_empty()?,
                Event::End(_) => self.leave(),
                Event::Eof => return Err(Fault::UnexpectedEof),
                _ => {}
            }
        }

        let inner = self.input.get(start..end).unwrap_or_default();
        let text = self
            .reader
            .decoder()
            .decode(inner)
            .map_err(quick_xml::Error::from)?;
        Ok(text.into_owned())
    }

    /// Consumes the rest of the current element. A no-op when it has
    /// already been read.
    pub fn skip(&mut self) -> Result<(), Fault> {
        let depth = match self.current.as_mut() {
            Some(el) if el.state == State::Open => el.depth,
            Some(el) => {
                el.state = State::Closed;
                return Ok(());
            }
            None => return Ok(()),
        };
        while self.depth >= depth {
            match self.reader.read_event()? {
                Event::Start(_) => self.enter()?,
                Event::Empty(_) => self.check_nested_empty()?,
                Event::End(_) => self.leave(),
                Event::Eof => return Err(Fault::UnexpectedEof),
                _ => {}
            }
        }
        Ok(())
    }

    /// Marks the current element as being read. Returns its depth when it
    /// still has content to consume, `None` for an unread self-closing tag.
    fn claim(&mut self) -> Result<Option<usize>, Fault> {
        match self.current.as_mut() {
            Some(el) => match el.state {
                State::Open => Ok(Some(el.depth)),
                State::Empty => {
                    el.state = State::Closed;
                    Ok(None)
                }
                State::Closed => Err(UsageError::NotPositioned {
                    expected: "unread element",
                    found: Some(el.name.local_name().to_owned()),
                }
                .into()),
            },
            None => Err(UsageError::NoCurrentElement.into()),
        }
    }

    fn step(&mut self) -> Result<Step, Fault> {
        let (namespace, event) = {
            let (resolved, event) = self.reader.read_resolved_event()?;
            (resolve(self.names, resolved), event)
        };
        let (start, state) = match event {
            Event::Start(start) => (start, State::Open),
            Event::Empty(start) => (start, State::Empty),
            Event::End(_) => {
                self.leave();
                return Ok(Step::End);
            }
            Event::Eof => return Ok(Step::Eof),
            _ => return Ok(Step::Other),
        };

        let local = start.local_name();
        let name = Name {
            namespace: namespace?,
            local: self.names.get(local.as_ref()),
            local_name: String::from_utf8_lossy(local.as_ref()).into(),
        };
        let depth = self.depth + 1;
        if state == State::Open {
            self.enter()?;
        } else {
            self.check_nested_empty()?;
        }
        self.current = Some(Element {
            start,
            name,
            depth,
            state,
            content_start: self.reader.buffer_position() as usize,
        });
        Ok(Step::Start)
    }

    fn enter(&mut self) -> Result<(), Fault> {
        self.depth += 1;
        // SEC-003: Reject excessively nested documents
        if self.depth > self.max_depth {
            return Err(Fault::MaxDepthExceeded(self.max_depth));
        }
        Ok(())
    }

    /// A self-closing tag one level below the current depth.
    fn check_nested_empty(&self) -> Result<(), Fault> {
        if self.depth + 1 > self.max_depth {
            return Err(Fault::MaxDepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(el) = self.current.as_mut() {
            if el.state == State::Open && el.depth == self.depth {
                el.state = State::Closed;
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }
}

fn resolve(names: &NameTable, resolved: ResolveResult<'_>) -> Result<NsRef, Fault> {
    match resolved {
        ResolveResult::Unbound => Ok(NsRef::Unqualified),
        ResolveResult::Bound(ns) => Ok(ns_ref(names, ns.as_ref())),
        ResolveResult::Unknown(prefix) => Err(Fault::UndeclaredPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn ns_ref(names: &NameTable, uri: &[u8]) -> NsRef {
    match names.get(uri) {
        Some(atom) => NsRef::Interned(atom),
        None => NsRef::Foreign(String::from_utf8_lossy(uri).into()),
    }
}

fn static_text(atom: Atom) -> &'static str {
    match atom {
        atoms::FEED => "feed",
        atoms::ENTRY => "entry",
        atoms::SOURCE => "source",
        atoms::AUTHOR => "author",
        atoms::CONTRIBUTOR => "contributor",
        atoms::LINK => "link",
        atoms::CATEGORY => "category",
        atoms::GENERATOR => "generator",
        atoms::CONTENT => "content",
        _ => "element",
    }
}
