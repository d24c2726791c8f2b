//! Integration tests for the parse pass: feed and entry documents, the
//! observer protocol, unknown markup and the failure shape.
//!
//! Every test parses an in-memory document with a fresh parser.

use atombind::collections::{CategoryCollection, LinkCollection, PersonCollection};
use atombind::extension::RawElement;
use atombind::model::{
    AtomBase, BaseLink, Category, Extensible, Link, Person, TextConstruct, TextType,
};
use atombind::{
    Entry, EntryDisposition, Fault, Feed, FeedParser, ParseError, ParseObserver, ParserConfig,
    RootKind, Source,
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const ATOM: &str = "http://www.w3.org/2005/Atom";

fn parse(xml: &str) -> Result<Feed, ParseError> {
    let mut feed = Feed::new();
    FeedParser::new().parse_str(xml, &mut feed)?;
    Ok(feed)
}

fn entry_xml(id: &str) -> String {
    format!("<entry><id>{id}</id><title>{id}</title></entry>")
}

// ============================================================================
// Feed Documents
// ============================================================================

#[test]
fn test_feed_header_and_pagination() {
    let feed = parse(
        r#"<feed xmlns="http://www.w3.org/2005/Atom"
                 xmlns:os="http://a9.com/-/spec/opensearch/1.1/"
                 xml:lang="en" xml:base="https://example.com/">
             <id>urn:feed</id>
             <title type="html">A &amp;lt;b&amp;gt; feed</title>
             <subtitle>Sub</subtitle>
             <updated>2006-01-01T00:00:00Z</updated>
             <generator uri="https://gen.example" version="2.1">Gen</generator>
             <link href="/a" rel="alternate" type="text/html"/>
             <link href="/self" rel="self"/>
             <category term="tech" label="Technology"/>
             <author><name>Ann</name><email>ann@example.com</email></author>
             <os:totalResults>42</os:totalResults>
             <os:startIndex>1</os:startIndex>
             <os:itemsPerPage>25</os:itemsPerPage>
           </feed>"#,
    )
    .unwrap();

    assert_eq!(feed.id.as_ref().map(|id| id.uri.as_str()), Some("urn:feed"));
    assert_eq!(feed.subtitle.as_ref().map(|t| t.text.as_str()), Some("Sub"));
    assert_eq!(
        feed.updated,
        Some(Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap().fixed_offset())
    );
    let generator = feed.generator.as_ref().unwrap();
    assert_eq!(generator.text, "Gen");
    assert_eq!(generator.version.as_deref(), Some("2.1"));
    assert_eq!(feed.links.len(), 2);
    assert_eq!(feed.links.href_for("self"), Some("/self"));
    assert!(feed.categories.contains_term("tech"));
    assert_eq!(feed.authors.get(0).and_then(|p| p.name.as_deref()), Some("Ann"));
    assert_eq!(feed.base.xml_lang.as_deref(), Some("en"));
    assert_eq!(feed.base.xml_base.as_deref(), Some("https://example.com/"));
    assert_eq!(feed.total_results, Some(42));
    assert_eq!(feed.start_index, Some(1));
    assert_eq!(feed.items_per_page, Some(25));
    assert!(feed.entries().is_empty());
}

#[test]
fn test_legacy_opensearch_namespace() {
    let feed = parse(
        r#"<feed xmlns="http://www.w3.org/2005/Atom"
                 xmlns:os="http://a9.com/-/spec/opensearchrss/1.0/">
             <os:totalResults>7</os:totalResults>
           </feed>"#,
    )
    .unwrap();
    assert_eq!(feed.total_results, Some(7));
}

#[test]
fn test_bare_entry_document() {
    let feed = parse(
        "<entry><id>urn:x</id><title>T</title><updated>2006-01-01T00:00:00Z</updated></entry>",
    )
    .unwrap();

    assert_eq!(feed.entries().len(), 1);
    let entry = &feed.entries()[0];
    assert_eq!(entry.id.as_ref().map(|id| id.uri.as_str()), Some("urn:x"));
    assert_eq!(entry.title.as_ref().map(|t| t.text.as_str()), Some("T"));
    assert_eq!(
        entry.updated,
        Some(Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap().fixed_offset())
    );
    assert!(entry.feed().unwrap().same_instance(&feed.feed_ref()));
}

#[test]
fn test_entry_with_embedded_source() {
    let feed = parse(&format!(
        r#"<feed xmlns="{ATOM}"><entry>
             <id>urn:e</id>
             <source><id>urn:origin</id><title>Origin</title></source>
             <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Hi</div></content>
           </entry></feed>"#
    ))
    .unwrap();

    let entry = &feed.entries()[0];
    let source = entry.source.as_ref().unwrap();
    assert_eq!(source.id.as_ref().map(|id| id.uri.as_str()), Some("urn:origin"));
    let content = entry.content.as_ref().unwrap();
    assert!(!content.is_text());
    assert!(content.body.contains("<div"));
}

#[test]
fn test_unrecognized_root_is_a_no_op() {
    let mut feed = Feed::new();
    let outcome = FeedParser::new()
        .parse_str("<rss version=\"2.0\"><channel/></rss>", &mut feed)
        .unwrap();
    assert_eq!(outcome.root, RootKind::Other("rss".into()));
    assert_eq!(outcome.version.as_deref(), Some("2.0"));
    assert_eq!(feed, Feed::new());
}

#[test]
fn test_root_version_is_reported() {
    let mut feed = Feed::new();
    let outcome = FeedParser::new()
        .parse_str(&format!("<feed xmlns=\"{ATOM}\" version=\"1.0\"/>"), &mut feed)
        .unwrap();
    assert_eq!(outcome.root, RootKind::Feed);
    assert_eq!(outcome.version.as_deref(), Some("1.0"));
}

// ============================================================================
// Ordering
// ============================================================================

proptest! {
    #[test]
    fn prop_entries_keep_document_order(ids in prop::collection::vec("[a-z]{1,8}", 0..12)) {
        let body: String = ids.iter().map(|id| entry_xml(&format!("urn:{id}"))).collect();
        let feed = parse(&format!("<feed xmlns=\"{ATOM}\">{body}</feed>")).unwrap();

        let parsed: Vec<String> = feed
            .entries()
            .iter()
            .map(|e| e.id.as_ref().map(|id| id.uri.clone()).unwrap_or_default())
            .collect();
        let expected: Vec<String> = ids.iter().map(|id| format!("urn:{id}")).collect();
        prop_assert_eq!(parsed, expected);
    }
}

// ============================================================================
// Unknown Markup
// ============================================================================

#[test]
fn test_unknown_elements_are_skipped() {
    let plain = parse(&format!(
        "<feed xmlns=\"{ATOM}\"><title>T</title>{}</feed>",
        entry_xml("urn:1")
    ))
    .unwrap();
    let noisy = parse(&format!(
        "<feed xmlns=\"{ATOM}\" xmlns:x=\"urn:x\" x:flag=\"1\">\
           <x:meta><x:deep>ignored</x:deep></x:meta>\
           <title>T</title>\
           <frobnicate>atom-namespaced but unknown</frobnicate>\
           <entry><x:note/><id>urn:1</id><title>urn:1</title></entry>\
         </feed>"
    ))
    .unwrap();
    assert_eq!(noisy, plain);
}

#[test]
fn test_capture_unknown_keeps_foreign_markup() {
    let parser = FeedParser::with_config(ParserConfig {
        capture_unknown: true,
        ..ParserConfig::default()
    });
    let mut feed = Feed::new();
    parser
        .parse_str(
            &format!(
                "<feed xmlns=\"{ATOM}\" xmlns:x=\"urn:x\">\
                   <x:meta kind=\"a\"><x:b>hi</x:b></x:meta>\
                 </feed>"
            ),
            &mut feed,
        )
        .unwrap();

    let raw = feed.extensions().find::<RawElement>().unwrap();
    assert_eq!(raw.namespace, "urn:x");
    assert_eq!(raw.local_name, "meta");
    assert_eq!(raw.attributes.len(), 1);
    assert_eq!(raw.inner_xml, "<x:b>hi</x:b>");
}

// ============================================================================
// Observer
// ============================================================================

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    discard: bool,
}

impl ParseObserver for Recorder {
    fn on_source(&mut self, source: &Source) {
        let id = source.id.as_ref().map_or("", |id| id.uri.as_str());
        self.events.push(format!("source {id}"));
    }

    fn on_entry(&mut self, entry: &Entry) -> EntryDisposition {
        let id = entry.id.as_ref().map_or("", |id| id.uri.as_str());
        self.events.push(format!("entry {id}"));
        if self.discard {
            EntryDisposition::Discard
        } else {
            EntryDisposition::Keep
        }
    }

    fn on_feed(&mut self, feed: &Feed) {
        self.events.push(format!("feed {}", feed.entries().len()));
    }

    fn on_done(&mut self) {
        self.events.push("done".into());
    }
}

#[test]
fn test_observer_sees_events_in_order() {
    let xml = format!(
        "<feed xmlns=\"{ATOM}\">\
           <entry><id>urn:1</id><source><id>urn:s</id></source></entry>\
           {}\
         </feed>",
        entry_xml("urn:2")
    );
    let mut recorder = Recorder::default();
    let mut feed = Feed::new();
    FeedParser::new()
        .parse_with(xml.as_bytes(), &mut feed, &mut recorder)
        .unwrap();

    assert_eq!(
        recorder.events,
        ["source urn:s", "entry urn:1", "entry urn:2", "feed 2", "done"]
    );
}

#[test]
fn test_discarded_entries_are_not_attached() {
    let xml = format!("<feed xmlns=\"{ATOM}\">{}{}</feed>", entry_xml("a"), entry_xml("b"));
    let mut recorder = Recorder {
        discard: true,
        ..Recorder::default()
    };
    let mut feed = Feed::new();
    FeedParser::new()
        .parse_with(xml.as_bytes(), &mut feed, &mut recorder)
        .unwrap();

    assert!(feed.entries().is_empty());
    assert_eq!(recorder.events, ["entry a", "entry b", "feed 0", "done"]);
}

#[test]
fn test_on_done_fires_for_unrecognized_root() {
    let mut recorder = Recorder::default();
    let mut feed = Feed::new();
    FeedParser::new()
        .parse_with("<html/>".as_bytes(), &mut feed, &mut recorder)
        .unwrap();
    assert_eq!(recorder.events, ["done"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_bad_timestamp_is_wrapped() {
    let err = parse("<entry><updated>last tuesday</updated></entry>").unwrap_err();
    assert!(!err.is_misuse());
    match err.fault() {
        Some(Fault::InvalidTimestamp { element, value, .. }) => {
            assert_eq!(element, "updated");
            assert_eq!(value, "last tuesday");
        }
        other => panic!("unexpected fault: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_bad_number_is_wrapped() {
    let err = parse(
        "<feed xmlns:os=\"http://a9.com/-/spec/opensearch/1.1/\">\
           <os:totalResults>many</os:totalResults></feed>",
    )
    .unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::InvalidNumber { .. })));
}

#[test]
fn test_malformed_xml_is_wrapped() {
    let err = parse("<feed><title>T</feed>").unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::Xml(_))));
}

#[test]
fn test_truncated_document() {
    let err = parse("<feed><entry><id>urn:1</id>").unwrap_err();
    assert!(err.fault().is_some());
}

#[test]
fn test_empty_document() {
    let err = parse("").unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::UnexpectedEof)));
}

#[test]
fn test_nesting_limit() {
    let parser = FeedParser::with_config(ParserConfig {
        max_depth: 8,
        ..ParserConfig::default()
    });
    let xml = format!("<feed>{}{}</feed>", "<x>".repeat(10), "</x>".repeat(10));
    let mut feed = Feed::new();
    let err = parser.parse_str(&xml, &mut feed).unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::MaxDepthExceeded(8))));
}

#[test]
fn test_nesting_limit_inside_markup_text() {
    let parser = FeedParser::with_config(ParserConfig {
        max_depth: 8,
        ..ParserConfig::default()
    });
    let xml = format!(
        "<feed xmlns=\"{ATOM}\"><title type=\"xhtml\">{}{}</title></feed>",
        "<x>".repeat(50),
        "</x>".repeat(50)
    );
    let mut feed = Feed::new();
    let err = parser.parse_str(&xml, &mut feed).unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::MaxDepthExceeded(8))));
}

// ============================================================================
// Namespace Scoping
// ============================================================================

#[test]
fn test_markup_title_does_not_leak_namespaces() {
    let feed = parse(&format!(
        "<feed xmlns=\"{ATOM}\">\
           <a:title xmlns:a=\"{ATOM}\" xmlns=\"urn:other\" type=\"html\">x</a:title>\
           <subtitle>S</subtitle>\
         </feed>"
    ))
    .unwrap();
    assert_eq!(feed.title.as_ref().map(|t| t.text.as_str()), Some("x"));
    assert_eq!(feed.subtitle.as_ref().map(|t| t.text.as_str()), Some("S"));
}

#[test]
fn test_markup_content_does_not_leak_namespaces() {
    let feed = parse(&format!(
        "<feed xmlns=\"{ATOM}\"><entry>\
           <content type=\"xhtml\"><div xmlns=\"http://www.w3.org/1999/xhtml\"><p>Hi</p></div></content>\
           <title>After</title>\
         </entry><title>Feed</title></feed>"
    ))
    .unwrap();
    let entry = &feed.entries()[0];
    assert_eq!(entry.title.as_ref().map(|t| t.text.as_str()), Some("After"));
    assert_eq!(feed.title.as_ref().map(|t| t.text.as_str()), Some("Feed"));
}

#[test]
fn test_captured_element_does_not_leak_namespaces() {
    let parser = FeedParser::with_config(ParserConfig {
        capture_unknown: true,
        ..ParserConfig::default()
    });
    let mut feed = Feed::new();
    parser
        .parse_str(
            &format!(
                "<feed xmlns=\"{ATOM}\" xmlns:x=\"urn:x\">\
                   <x:meta xmlns=\"urn:other\">v</x:meta>\
                   <title>T</title>\
                 </feed>"
            ),
            &mut feed,
        )
        .unwrap();

    assert_eq!(feed.title.as_ref().map(|t| t.text.as_str()), Some("T"));
    let captured: Vec<&RawElement> = feed.extensions().find_all::<RawElement>().collect();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].namespace, "urn:x");
    assert_eq!(captured[0].local_name, "meta");
    assert_eq!(captured[0].inner_xml, "v");
}

// ============================================================================
// Round Trip
// ============================================================================

const XHTML: &str = "http://www.w3.org/1999/xhtml";

fn push_base(start: &mut BytesStart<'_>, base: &AtomBase) {
    if let Some(xml_base) = &base.xml_base {
        start.push_attribute(("xml:base", xml_base.as_str()));
    }
    if let Some(xml_lang) = &base.xml_lang {
        start.push_attribute(("xml:lang", xml_lang.as_str()));
    }
}

fn text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) {
    w.write_event(Event::Start(BytesStart::new(name))).unwrap();
    w.write_event(Event::Text(BytesText::new(text))).unwrap();
    w.write_event(Event::End(BytesEnd::new(name))).unwrap();
}

fn write_text_construct(w: &mut Writer<Vec<u8>>, name: &str, construct: &TextConstruct) {
    let mut start = BytesStart::new(name);
    if construct.text_type != TextType::Text {
        start.push_attribute(("type", construct.text_type.as_str()));
    }
    push_base(&mut start, &construct.base);
    w.write_event(Event::Start(start)).unwrap();
    let body = match construct.text_type {
        TextType::Text => BytesText::new(&construct.text),
        // Markup constructs hold their body exactly as it is written.
        TextType::Html | TextType::Xhtml => BytesText::from_escaped(construct.text.as_str()),
    };
    w.write_event(Event::Text(body)).unwrap();
    w.write_event(Event::End(BytesEnd::new(name))).unwrap();
}

fn write_links(w: &mut Writer<Vec<u8>>, links: &LinkCollection) {
    for link in links.iter() {
        let mut start = BytesStart::new("link");
        start.push_attribute(("href", link.href.as_deref().unwrap_or_default()));
        let optional = [
            ("rel", link.rel.as_deref()),
            ("type", link.content_type.as_deref()),
            ("hreflang", link.hreflang.as_deref()),
            ("title", link.title.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                start.push_attribute((key, value));
            }
        }
        let length = link.length.map(|l| l.to_string());
        if let Some(length) = &length {
            start.push_attribute(("length", length.as_str()));
        }
        push_base(&mut start, &link.base);
        w.write_event(Event::Empty(start)).unwrap();
    }
}

fn write_categories(w: &mut Writer<Vec<u8>>, categories: &CategoryCollection) {
    for category in categories.iter() {
        let mut start = BytesStart::new("category");
        start.push_attribute(("term", category.term.as_str()));
        if let Some(scheme) = &category.scheme {
            start.push_attribute(("scheme", scheme.as_str()));
        }
        if let Some(label) = &category.label {
            start.push_attribute(("label", label.as_str()));
        }
        w.write_event(Event::Empty(start)).unwrap();
    }
}

fn write_people(w: &mut Writer<Vec<u8>>, name: &str, people: &PersonCollection) {
    for person in people.iter() {
        let mut start = BytesStart::new(name);
        push_base(&mut start, &person.base);
        w.write_event(Event::Start(start)).unwrap();
        if let Some(person_name) = &person.name {
            text_element(w, "name", person_name);
        }
        if let Some(uri) = &person.uri {
            text_element(w, "uri", uri);
        }
        if let Some(email) = &person.email {
            text_element(w, "email", email);
        }
        w.write_event(Event::End(BytesEnd::new(name))).unwrap();
    }
}

fn write_header(w: &mut Writer<Vec<u8>>, source: &Source) {
    if let Some(id) = &source.id {
        text_element(w, "id", &id.uri);
    }
    if let Some(title) = &source.title {
        write_text_construct(w, "title", title);
    }
    if let Some(subtitle) = &source.subtitle {
        write_text_construct(w, "subtitle", subtitle);
    }
    if let Some(updated) = &source.updated {
        text_element(w, "updated", &updated.to_rfc3339());
    }
    write_links(w, &source.links);
    write_categories(w, &source.categories);
    write_people(w, "author", &source.authors);
    write_people(w, "contributor", &source.contributors);
}

fn write_feed(feed: &Feed) -> String {
    let mut w = Writer::new(Vec::new());
    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM));
    push_base(&mut root, &feed.base);
    w.write_event(Event::Start(root)).unwrap();
    write_header(&mut w, feed.source());
    for entry in feed.entries() {
        let mut start = BytesStart::new("entry");
        push_base(&mut start, &entry.base);
        w.write_event(Event::Start(start)).unwrap();
        if let Some(id) = &entry.id {
            text_element(&mut w, "id", &id.uri);
        }
        if let Some(title) = &entry.title {
            write_text_construct(&mut w, "title", title);
        }
        if let Some(summary) = &entry.summary {
            write_text_construct(&mut w, "summary", summary);
        }
        if let Some(updated) = &entry.updated {
            text_element(&mut w, "updated", &updated.to_rfc3339());
        }
        write_links(&mut w, &entry.links);
        write_categories(&mut w, &entry.categories);
        write_people(&mut w, "author", &entry.authors);
        w.write_event(Event::End(BytesEnd::new("entry"))).unwrap();
    }
    w.write_event(Event::End(BytesEnd::new("feed"))).unwrap();
    String::from_utf8(w.into_inner()).unwrap()
}

fn markup(text_type: TextType, text: &str) -> TextConstruct {
    TextConstruct {
        text_type,
        ..TextConstruct::text(text)
    }
}

fn lang(tag: &str) -> AtomBase {
    AtomBase {
        xml_lang: Some(tag.into()),
        ..AtomBase::default()
    }
}

#[test]
fn test_written_feed_parses_back_equal() {
    let updated = Utc.with_ymd_and_hms(2006, 3, 15, 10, 0, 0).unwrap().fixed_offset();
    let mut feed = Feed::new();
    feed.base = AtomBase {
        xml_base: Some("https://example.com/".into()),
        xml_lang: Some("en".into()),
        ..AtomBase::default()
    };
    feed.id = Some(BaseLink::new("urn:feed"));
    feed.title = Some(markup(
        TextType::Xhtml,
        &format!("<div xmlns=\"{XHTML}\"><b>Fish</b> &amp; Chips</div>"),
    ));
    feed.subtitle = Some(TextConstruct {
        base: lang("en-GB"),
        ..markup(TextType::Html, "&lt;i&gt;daily&lt;/i&gt;")
    });
    feed.updated = Some(updated);

    let mut home = Link::new("/", Some("alternate"), Some("text/html"));
    home.hreflang = Some("en".into());
    home.title = Some("Home & away".into());
    home.length = Some(1024);
    home.base.xml_base = Some("https://mirror.example.com/".into());
    feed.links.add(home);
    feed.links.add(Link::new("/feed", Some("self"), None));

    let mut food = Category::new("food", Some("urn:topics"));
    food.label = Some("Food & Drink".into());
    feed.categories.add(food);

    let mut ann = Person::author("Ann");
    ann.uri = Some("https://ann.example".into());
    ann.email = Some("ann@example.com".into());
    feed.authors.push(ann).unwrap();
    let mut bob = Person::contributor("Bob");
    bob.base = lang("de");
    feed.contributors.push(bob).unwrap();

    for i in 0..3 {
        let mut entry = Entry::new();
        entry.base = lang("fr");
        entry.id = Some(BaseLink::new(format!("urn:entry:{i}")));
        entry.title = Some(markup(TextType::Html, &format!("Entry &lt;{i}&gt;")));
        entry.summary = Some(TextConstruct::text(format!("Summary {i} < {}", i + 1)));
        entry.updated = Some(updated);
        entry
            .links
            .add(Link::new(format!("/entry/{i}"), Some("alternate"), None));
        entry.categories.add(Category::new(format!("tag{i}"), None));
        entry.authors.push(Person::author(format!("Writer {i}"))).unwrap();
        feed.add_entry(entry).unwrap();
    }

    let xml = write_feed(&feed);
    let reparsed = parse(&xml).unwrap();
    assert_eq!(reparsed, feed);
    assert_ne!(reparsed.feed_id(), feed.feed_id());
    assert!(reparsed.is_identical(&feed));
}
