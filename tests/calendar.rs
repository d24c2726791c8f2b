//! Integration tests for the calendar schema plugged into a parser.

use atombind::extension::calendar::{
    new_event_entry, AttendeeStatus, CalendarExtension, EventEntry, EventStatus, Transparency,
    Visibility, When,
};
use atombind::extension::RawElement;
use atombind::model::Extensible;
use atombind::{ConstructError, Fault, Feed, FeedParser, ParserConfig};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn calendar_parser() -> FeedParser {
    let mut parser = FeedParser::new();
    parser.register_with(CalendarExtension::new);
    parser
}

fn event_doc(body: &str) -> String {
    format!(
        r#"<entry xmlns="http://www.w3.org/2005/Atom"
                  xmlns:gd="http://schemas.google.com/g/2005">
             <id>urn:event</id>
             <category scheme="http://schemas.google.com/g/2005#kind"
                       term="http://schemas.google.com/g/2005#event"/>
             {body}
           </entry>"#
    )
}

fn parse_event(body: &str) -> Result<EventEntry, atombind::ParseError> {
    let mut feed = Feed::new();
    calendar_parser().parse_str(&event_doc(body), &mut feed)?;
    Ok(EventEntry::from_entry(feed.entries()[0].clone()))
}

#[test]
fn test_full_event() {
    let event = parse_event(
        r#"<gd:when startTime="2006-03-15T10:00:00.000-08:00"
                    endTime="2006-03-15T11:00:00.000-08:00">
             <gd:reminder minutes="10"/>
           </gd:when>
           <gd:where valueString="Room 4"/>
           <gd:who email="bob@example.com">
             <gd:attendeeStatus value="http://schemas.google.com/g/2005#event.invited"/>
           </gd:who>
           <gd:eventStatus value="http://schemas.google.com/g/2005#event.confirmed"/>
           <gd:visibility value="http://schemas.google.com/g/2005#event.private"/>
           <gd:transparency value="http://schemas.google.com/g/2005#event.opaque"/>"#,
    )
    .unwrap();

    assert!(EventEntry::is_event(event.entry()));
    let when: Vec<&When> = event.times().collect();
    assert_eq!(when.len(), 1);
    assert_eq!(
        when[0].start,
        Utc.with_ymd_and_hms(2006, 3, 15, 18, 0, 0).unwrap()
    );
    assert!(!when[0].all_day);
    assert_eq!(event.reminder().and_then(|r| r.minutes), Some(10));
    assert_eq!(
        event.locations().next().and_then(|w| w.value_string.as_deref()),
        Some("Room 4")
    );
    let who = event.participants().next().unwrap();
    assert_eq!(who.attendee_status, Some(AttendeeStatus::Invited));
    assert_eq!(event.status(), Some(&EventStatus::Confirmed));
    assert_eq!(event.visibility(), Some(&Visibility::Private));
    assert_eq!(event.transparency(), Some(&Transparency::Opaque));
}

#[test]
fn test_all_day_event() {
    let event = parse_event(r#"<gd:when startTime="2006-01-01"/>"#).unwrap();
    let when = event.times().next().unwrap();
    assert!(when.all_day);
    assert_eq!(when.start, Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_end_before_start_fails_the_parse() {
    let err = parse_event(r#"<gd:when startTime="2006-01-02" endTime="2006-01-01"/>"#)
        .unwrap_err();
    assert!(matches!(
        err.fault(),
        Some(Fault::Construct(ConstructError::Ordering { element: "when", .. }))
    ));
}

#[test]
fn test_bad_start_time() {
    let err = parse_event(r#"<gd:when startTime="soon"/>"#).unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::InvalidTimestamp { .. })));
}

#[test]
fn test_recurring_event_reminder() {
    let event = parse_event(
        r#"<gd:recurrence>DTSTART;VALUE=DATE:20060101
RRULE:FREQ=YEARLY</gd:recurrence>
           <gd:reminder days="1" method="alert"/>"#,
    )
    .unwrap();
    assert!(event.recurrence().unwrap().rule.contains("FREQ=YEARLY"));
    assert_eq!(event.reminder().and_then(|r| r.days), Some(1));
}

#[test]
fn test_original_event() {
    let event = parse_event(
        r#"<gd:originalEvent id="orig" href="https://example.com/orig">
             <gd:when startTime="2006-01-01T09:00:00Z"/>
           </gd:originalEvent>"#,
    )
    .unwrap();
    let original = event.original_event().unwrap();
    assert_eq!(original.id.as_deref(), Some("orig"));
    assert!(original.original_start.is_some());
}

#[test]
fn test_calendar_elements_on_a_feed_are_declined() {
    let parser = {
        let mut parser = FeedParser::with_config(ParserConfig {
            capture_unknown: true,
            ..ParserConfig::default()
        });
        parser.register_with(CalendarExtension::new);
        parser
    };
    let mut feed = Feed::new();
    parser
        .parse_str(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"
                     xmlns:gd="http://schemas.google.com/g/2005">
                 <gd:where valueString="Nowhere"/>
               </feed>"#,
            &mut feed,
        )
        .unwrap();
    // Declined by the namespace handler, so it is skipped rather than captured.
    assert!(feed.extensions().is_empty());
    assert!(feed.extensions().find::<RawElement>().is_none());
}

#[test]
fn test_without_registration_calendar_markup_is_ignored() {
    let mut feed = Feed::new();
    FeedParser::new()
        .parse_str(&event_doc(r#"<gd:when startTime="2006-01-01"/>"#), &mut feed)
        .unwrap();
    let event = EventEntry::from_entry(feed.entries()[0].clone());
    assert!(event.times().next().is_none());
}

#[test]
fn test_new_event_entry_is_an_event() {
    assert!(EventEntry::is_event(&new_event_entry()));
    assert!(!EventEntry::is_event(&atombind::Entry::new()));
}
