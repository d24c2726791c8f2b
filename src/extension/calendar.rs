//! Calendar event schema (`http://schemas.google.com/g/2005`).
//!
//! Registering [`CalendarExtension`] teaches a parser the event elements:
//! `when`, `where`, `who`, `reminder`, `recurrence`, `originalEvent`,
//! `eventStatus`, `visibility` and `transparency`. They are attached to the
//! entry they appear in as extension values; [`EventEntry`] reads them back.
//!
//! ```
//! use atombind::extension::calendar::{CalendarExtension, EventEntry};
//! use atombind::{Feed, FeedParser};
//!
//! let mut parser = FeedParser::new();
//! parser.register_with(CalendarExtension::new);
//!
//! let mut feed = Feed::new();
//! parser
//!     .parse_str(
//!         r#"<entry xmlns="http://www.w3.org/2005/Atom"
//!                   xmlns:gd="http://schemas.google.com/g/2005">
//!              <gd:when startTime="2006-01-01"/>
//!            </entry>"#,
//!         &mut feed,
//!     )
//!     .unwrap();
//!
//! let event = EventEntry::from_entry(feed.entries()[0].clone());
//! assert!(event.times().next().is_some_and(|w| w.all_day));
//! ```
use std::collections::HashMap;

use super::{Disposition, ExtensionHandler};
use crate::error::{ConstructError, Fault};
use crate::model::{Category, EntityKind, Entry, Extensible, ExtensionElement};
use crate::parser::{parse_number, parse_timestamp_value, Constructs};
use crate::util::{has_time_of_day, Timestamp};
use crate::xml::{atoms, Atom, Attribute, NameTable, XmlCursor};

pub const NAMESPACE: &str = "http://schemas.google.com/g/2005";

/// Category scheme that marks the kind of an entry.
pub const KIND_SCHEME: &str = "http://schemas.google.com/g/2005#kind";

/// Category term of an event entry.
pub const EVENT_KIND: &str = "http://schemas.google.com/g/2005#event";

// ============================================================================
// Value Enumerations
// ============================================================================

/// An element whose whole meaning is one `value` attribute drawn from a
/// fixed set of URIs.
pub trait ValueConstruct: Sized {
    /// Local name of the element carrying the value.
    const ELEMENT: &'static str;

    fn from_value(value: &str) -> Self;
    fn value(&self) -> &str;
}

macro_rules! value_construct {
    (
        $(#[$meta:meta])*
        $name:ident = $element:literal {
            $($variant:ident => $uri:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)*
            /// A value outside the known set, kept verbatim.
            Other(String),
        }

        impl ValueConstruct for $name {
            const ELEMENT: &'static str = $element;

            fn from_value(value: &str) -> Self {
                match value {
                    $($uri => Self::$variant,)*
                    other => Self::Other(other.to_owned()),
                }
            }

            fn value(&self) -> &str {
                match self {
                    $(Self::$variant => $uri,)*
                    Self::Other(value) => value,
                }
            }
        }

        impl ExtensionElement for $name {
            fn namespace(&self) -> &str {
                NAMESPACE
            }

            fn local_name(&self) -> &str {
                Self::ELEMENT
            }
        }
    };
}

value_construct! {
    /// `<gd:eventStatus>`.
    EventStatus = "eventStatus" {
        Confirmed => "http://schemas.google.com/g/2005#event.confirmed",
        Tentative => "http://schemas.google.com/g/2005#event.tentative",
        Canceled => "http://schemas.google.com/g/2005#event.canceled",
    }
}

value_construct! {
    /// `<gd:visibility>`.
    Visibility = "visibility" {
        Default => "http://schemas.google.com/g/2005#event.default",
        Public => "http://schemas.google.com/g/2005#event.public",
        Confidential => "http://schemas.google.com/g/2005#event.confidential",
        Private => "http://schemas.google.com/g/2005#event.private",
    }
}

value_construct! {
    /// `<gd:transparency>`: whether the event blocks time.
    Transparency = "transparency" {
        Opaque => "http://schemas.google.com/g/2005#event.opaque",
        Transparent => "http://schemas.google.com/g/2005#event.transparent",
    }
}

value_construct! {
    /// `<gd:attendeeStatus>` inside a `<gd:who>`.
    AttendeeStatus = "attendeeStatus" {
        Accepted => "http://schemas.google.com/g/2005#event.accepted",
        Declined => "http://schemas.google.com/g/2005#event.declined",
        Invited => "http://schemas.google.com/g/2005#event.invited",
        Tentative => "http://schemas.google.com/g/2005#event.tentative",
    }
}

value_construct! {
    /// `<gd:attendeeType>` inside a `<gd:who>`.
    AttendeeType = "attendeeType" {
        Required => "http://schemas.google.com/g/2005#event.required",
        Optional => "http://schemas.google.com/g/2005#event.optional",
    }
}

/// How a reminder is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderMethod {
    Alert,
    Email,
    Sms,
    None,
    Other(String),
}

impl ReminderMethod {
    pub fn parse(value: &str) -> Self {
        match value {
            "alert" => ReminderMethod::Alert,
            "email" => ReminderMethod::Email,
            "sms" => ReminderMethod::Sms,
            "none" => ReminderMethod::None,
            other => ReminderMethod::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReminderMethod::Alert => "alert",
            ReminderMethod::Email => "email",
            ReminderMethod::Sms => "sms",
            ReminderMethod::None => "none",
            ReminderMethod::Other(value) => value,
        }
    }
}

// ============================================================================
// Constructs
// ============================================================================

/// `<gd:when>`: the time span of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct When {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    /// Neither boundary carries a time of day.
    pub all_day: bool,
    pub value_string: Option<String>,
    /// Reminder of a single, non-recurring event.
    pub reminder: Option<Reminder>,
}

impl When {
    /// A span from `start` to `end`. Fails when `end` is before `start`.
    pub fn new(start: Timestamp, end: Option<Timestamp>) -> Result<Self, ConstructError> {
        if let Some(end) = end {
            if end < start {
                return Err(ConstructError::Ordering {
                    element: "when",
                    start: start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }
        Ok(Self {
            start,
            end,
            all_day: false,
            value_string: None,
            reminder: None,
        })
    }
}

impl ExtensionElement for When {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "when"
    }
}

/// `<gd:where>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Where {
    pub value_string: Option<String>,
    pub label: Option<String>,
    pub rel: Option<String>,
}

impl ExtensionElement for Where {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "where"
    }
}

/// `<gd:who>`: a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Who {
    pub email: Option<String>,
    pub rel: Option<String>,
    pub value_string: Option<String>,
    pub attendee_status: Option<AttendeeStatus>,
    pub attendee_type: Option<AttendeeType>,
}

impl ExtensionElement for Who {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "who"
    }
}

/// `<gd:reminder>`. Either an offset before the event or an absolute time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reminder {
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
    pub absolute_time: Option<Timestamp>,
    pub method: Option<ReminderMethod>,
}

impl ExtensionElement for Reminder {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "reminder"
    }
}

/// `<gd:recurrence>`: an iCalendar recurrence rule, kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recurrence {
    pub rule: String,
}

impl ExtensionElement for Recurrence {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "recurrence"
    }
}

/// `<gd:originalEvent>`: the recurring event an exception belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalEvent {
    pub id: Option<String>,
    pub href: Option<String>,
    pub original_start: Option<When>,
}

impl ExtensionElement for OriginalEvent {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn local_name(&self) -> &str {
        "originalEvent"
    }
}

// ============================================================================
// Handler
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    When,
    Where,
    Who,
    Reminder,
    Recurrence,
    OriginalEvent,
    EventStatus,
    Visibility,
    Transparency,
}

/// Interned names the handler dispatches on.
#[derive(Debug)]
struct Vocabulary {
    namespace: Atom,
    elements: HashMap<Atom, Element>,
    when: Atom,
    reminder: Atom,
    attendee_status: Atom,
    attendee_type: Atom,
    start_time: Atom,
    end_time: Atom,
    value_string: Atom,
    label: Atom,
    days: Atom,
    hours: Atom,
    minutes: Atom,
    absolute_time: Atom,
    method: Atom,
    value: Atom,
}

impl Vocabulary {
    fn new(names: &mut NameTable) -> Self {
        let when = names.intern("when");
        let reminder = names.intern("reminder");
        let elements = HashMap::from([
            (when, Element::When),
            (names.intern("where"), Element::Where),
            (names.intern("who"), Element::Who),
            (reminder, Element::Reminder),
            (names.intern("recurrence"), Element::Recurrence),
            (names.intern("originalEvent"), Element::OriginalEvent),
            (names.intern(EventStatus::ELEMENT), Element::EventStatus),
            (names.intern(Visibility::ELEMENT), Element::Visibility),
            (names.intern(Transparency::ELEMENT), Element::Transparency),
        ]);
        Self {
            namespace: names.intern(NAMESPACE),
            elements,
            when,
            reminder,
            attendee_status: names.intern(AttendeeStatus::ELEMENT),
            attendee_type: names.intern(AttendeeType::ELEMENT),
            start_time: names.intern("startTime"),
            end_time: names.intern("endTime"),
            value_string: names.intern("valueString"),
            label: names.intern("label"),
            days: names.intern("days"),
            hours: names.intern("hours"),
            minutes: names.intern("minutes"),
            absolute_time: names.intern("absoluteTime"),
            method: names.intern("method"),
            value: names.intern("value"),
        }
    }

    fn is_child(&self, cursor: &XmlCursor<'_>, local: Atom) -> Result<bool, Fault> {
        Ok(cursor.name()?.is(self.namespace, local))
    }
}

/// Handler for the calendar namespace. Only entries carry event data;
/// calendar elements anywhere else are declined.
#[derive(Debug)]
pub struct CalendarExtension {
    vocab: Vocabulary,
}

impl CalendarExtension {
    pub fn new(names: &mut NameTable) -> Self {
        Self {
            vocab: Vocabulary::new(names),
        }
    }

    fn parse_when(&self, cursor: &mut XmlCursor<'_>) -> Result<When, Fault> {
        let v = &self.vocab;
        let (mut start, mut end, mut value_string) = (None, None, None);
        for attr in cursor.attributes()? {
            if attr.is_plain(v.start_time) {
                start = Some(attr.value);
            } else if attr.is_plain(v.end_time) {
                end = Some(attr.value);
            } else if attr.is_plain(v.value_string) {
                value_string = Some(attr.value);
            }
        }

        let start_raw = start.ok_or(ConstructError::MissingField {
            element: "when",
            field: "startTime",
        })?;
        let start = parse_timestamp_value("when", &start_raw)?;
        let end_ts = end
            .as_deref()
            .map(|raw| parse_timestamp_value("when", raw))
            .transpose()?;

        let mut when = When::new(start, end_ts)?;
        when.all_day =
            !has_time_of_day(&start_raw) && end.as_deref().map_or(true, |e| !has_time_of_day(e));
        when.value_string = value_string;

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            if v.is_child(cursor, v.reminder)? {
                when.reminder = Some(self.parse_reminder(cursor)?);
            }
        }
        Ok(when)
    }

    fn parse_reminder(&self, cursor: &mut XmlCursor<'_>) -> Result<Reminder, Fault> {
        let v = &self.vocab;
        let mut reminder = Reminder::default();
        for attr in cursor.attributes()? {
            let Attribute { name, value } = &attr;
            if !name.is_unqualified() {
                continue;
            }
            match name.local() {
                Some(a) if a == v.days => reminder.days = Some(parse_number("reminder", value)?),
                Some(a) if a == v.hours => reminder.hours = Some(parse_number("reminder", value)?),
                Some(a) if a == v.minutes => {
                    reminder.minutes = Some(parse_number("reminder", value)?)
                }
                Some(a) if a == v.absolute_time => {
                    reminder.absolute_time = Some(parse_timestamp_value("reminder", value)?)
                }
                Some(a) if a == v.method => reminder.method = Some(ReminderMethod::parse(value)),
                _ => {}
            }
        }
        cursor.skip()?;
        Ok(reminder)
    }

    fn parse_where(&self, cursor: &mut XmlCursor<'_>) -> Result<Where, Fault> {
        let v = &self.vocab;
        let mut place = Where::default();
        for attr in cursor.attributes()? {
            if attr.is_plain(v.value_string) {
                place.value_string = Some(attr.value);
            } else if attr.is_plain(v.label) {
                place.label = Some(attr.value);
            } else if attr.is_plain(atoms::REL) {
                place.rel = Some(attr.value);
            }
        }
        cursor.skip()?;
        Ok(place)
    }

    fn parse_who(&self, cursor: &mut XmlCursor<'_>) -> Result<Who, Fault> {
        let v = &self.vocab;
        let mut who = Who::default();
        for attr in cursor.attributes()? {
            if attr.is_plain(atoms::EMAIL) {
                who.email = Some(attr.value);
            } else if attr.is_plain(atoms::REL) {
                who.rel = Some(attr.value);
            } else if attr.is_plain(v.value_string) {
                who.value_string = Some(attr.value);
            }
        }

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            if v.is_child(cursor, v.attendee_status)? {
                who.attendee_status = Some(self.parse_value(cursor)?);
            } else if v.is_child(cursor, v.attendee_type)? {
                who.attendee_type = Some(self.parse_value(cursor)?);
            }
        }
        Ok(who)
    }

    fn parse_original_event(&self, cursor: &mut XmlCursor<'_>) -> Result<OriginalEvent, Fault> {
        let v = &self.vocab;
        let mut original = OriginalEvent::default();
        for attr in cursor.attributes()? {
            if attr.is_plain(atoms::ID) {
                original.id = Some(attr.value);
            } else if attr.is_plain(atoms::HREF) {
                original.href = Some(attr.value);
            }
        }

        let mut level = -1;
        while cursor.next_child(&mut level)? {
            if v.is_child(cursor, v.when)? {
                original.original_start = Some(self.parse_when(cursor)?);
            }
        }
        Ok(original)
    }

    /// Reads the `value` attribute of a [`ValueConstruct`] element.
    fn parse_value<T: ValueConstruct>(&self, cursor: &mut XmlCursor<'_>) -> Result<T, Fault> {
        let value = cursor
            .attributes()?
            .into_iter()
            .find(|attr| attr.is_plain(self.vocab.value))
            .map(|attr| attr.value)
            .ok_or(ConstructError::MissingField {
                element: T::ELEMENT,
                field: "value",
            })?;
        cursor.skip()?;
        Ok(T::from_value(&value))
    }
}

impl ExtensionHandler for CalendarExtension {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn on_element(
        &self,
        _constructs: &Constructs<'_>,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        if target.kind() != EntityKind::Entry {
            return Ok(Disposition::Declined);
        }
        let element = match cursor.name()?.local() {
            Some(local) => self.vocab.elements.get(&local).copied(),
            None => None,
        };
        let Some(element) = element else {
            return Ok(Disposition::Declined);
        };

        let extensions = target.extensions_mut();
        match element {
            Element::When => extensions.push(self.parse_when(cursor)?),
            Element::Where => extensions.push(self.parse_where(cursor)?),
            Element::Who => extensions.push(self.parse_who(cursor)?),
            Element::Reminder => extensions.push(self.parse_reminder(cursor)?),
            Element::Recurrence => extensions.push(Recurrence {
                rule: cursor.read_text()?,
            }),
            Element::OriginalEvent => extensions.push(self.parse_original_event(cursor)?),
            Element::EventStatus => extensions.push(self.parse_value::<EventStatus>(cursor)?),
            Element::Visibility => extensions.push(self.parse_value::<Visibility>(cursor)?),
            Element::Transparency => extensions.push(self.parse_value::<Transparency>(cursor)?),
        }
        Ok(Disposition::Consumed)
    }
}

// ============================================================================
// Event Entry
// ============================================================================

/// An entry with the event kind category.
pub fn new_event_entry() -> Entry {
    let mut entry = Entry::new();
    entry
        .categories
        .add(Category::new(EVENT_KIND, Some(KIND_SCHEME)));
    entry
}

/// Typed view over an entry holding calendar data.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    entry: Entry,
}

impl Default for EventEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEntry {
    pub fn new() -> Self {
        Self {
            entry: new_event_entry(),
        }
    }

    pub fn from_entry(entry: Entry) -> Self {
        Self { entry }
    }

    /// True when `entry` carries the event kind category.
    pub fn is_event(entry: &Entry) -> bool {
        entry
            .categories
            .find(EVENT_KIND)
            .is_some_and(|c| c.scheme.as_deref() == Some(KIND_SCHEME))
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut Entry {
        &mut self.entry
    }

    pub fn into_entry(self) -> Entry {
        self.entry
    }

    pub fn times(&self) -> impl Iterator<Item = &When> {
        self.entry.base.extensions.find_all::<When>()
    }

    pub fn add_time(&mut self, when: When) {
        self.entry.base.extensions.push(when);
    }

    pub fn locations(&self) -> impl Iterator<Item = &Where> {
        self.entry.base.extensions.find_all::<Where>()
    }

    pub fn add_location(&mut self, place: Where) {
        self.entry.base.extensions.push(place);
    }

    pub fn participants(&self) -> impl Iterator<Item = &Who> {
        self.entry.base.extensions.find_all::<Who>()
    }

    pub fn add_participant(&mut self, who: Who) {
        self.entry.base.extensions.push(who);
    }

    pub fn status(&self) -> Option<&EventStatus> {
        self.entry.base.extensions.find()
    }

    pub fn set_status(&mut self, status: EventStatus) {
        self.replace(status);
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.entry.base.extensions.find()
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.replace(visibility);
    }

    pub fn transparency(&self) -> Option<&Transparency> {
        self.entry.base.extensions.find()
    }

    pub fn set_transparency(&mut self, transparency: Transparency) {
        self.replace(transparency);
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.entry.base.extensions.find()
    }

    pub fn set_recurrence(&mut self, recurrence: Recurrence) {
        self.replace(recurrence);
    }

    pub fn original_event(&self) -> Option<&OriginalEvent> {
        self.entry.base.extensions.find()
    }

    pub fn set_original_event(&mut self, original: OriginalEvent) {
        self.replace(original);
    }

    /// The entry-level reminder of a recurring event, otherwise the reminder
    /// of the first `when`.
    pub fn reminder(&self) -> Option<&Reminder> {
        if self.recurrence().is_some() {
            return self.entry.base.extensions.find();
        }
        self.times().next().and_then(|when| when.reminder.as_ref())
    }

    /// Sets the reminder where [`EventEntry::reminder`] reads it from.
    pub fn set_reminder(&mut self, reminder: Reminder) -> Result<(), ConstructError> {
        if self.recurrence().is_some() {
            self.replace(reminder);
            return Ok(());
        }
        match self.entry.base.extensions.find_mut::<When>() {
            Some(when) => {
                when.reminder = Some(reminder);
                Ok(())
            }
            None => Err(ConstructError::NoReminderTarget),
        }
    }

    fn replace<T: ExtensionElement>(&mut self, value: T) {
        let extensions = &mut self.entry.base.extensions;
        extensions.remove_all::<T>();
        extensions.push(value);
    }
}
