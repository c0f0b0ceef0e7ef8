//! # Calendar Normalization
//!
//! Converts raw iCalendar documents into [`Event`]s: picks out VEVENT components,
//! expands recurrence rules into a bounded number of future occurrences and
//! normalizes every bound to UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::parser::{Component, Property, read_calendar, unfold};
use rrule::RRuleSet;

use crate::application::events::event::Event;
use crate::domain::error::{BotError, BotResult};
use crate::domain::types::EventSource;

const UNTITLED: &str = "(No title)";

/// A DTSTART/DTEND/EXDATE value as written in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
enum IcalTime {
    Date(NaiveDate),
    Utc(DateTime<Utc>),
    Zoned(NaiveDateTime, Tz),
    /// No zone given; interpreted in the display timezone.
    Floating(NaiveDateTime),
}

impl IcalTime {
    fn parse_value(value: &str, tzid: Option<&str>, is_date: bool) -> Option<Self> {
        let value = value.trim();
        if is_date || value.len() == 8 {
            return NaiveDate::parse_from_str(value, "%Y%m%d").ok().map(Self::Date);
        }
        if let Some(utc) = value.strip_suffix('Z') {
            return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| Self::Utc(dt.and_utc()));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
        match tzid.and_then(|id| id.parse::<Tz>().ok()) {
            Some(tz) => Some(Self::Zoned(naive, tz)),
            None => Some(Self::Floating(naive)),
        }
    }

    /// All comma-separated values of a property (EXDATE may carry several).
    fn parse_property(prop: &Property) -> Vec<Self> {
        let tzid = param(prop, "TZID");
        let is_date = param(prop, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"));
        prop.val
            .as_ref()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| Self::parse_value(s, tzid.as_deref(), is_date))
            .collect()
    }

    /// Instant of the value; bare dates start at midnight UTC.
    fn to_utc(self, display: Tz) -> DateTime<Utc> {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
            Self::Utc(dt) => dt,
            Self::Zoned(naive, tz) => localize(naive, tz),
            Self::Floating(naive) => localize(naive, display),
        }
    }

    /// Like `to_utc`, but bare dates extend to the last instant of the day.
    fn to_utc_end(self, display: Tz) -> DateTime<Utc> {
        match self {
            Self::Date(date) => {
                let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
                date.and_time(last).and_utc()
            }
            other => other.to_utc(display),
        }
    }

    /// Renders the value as an iCalendar line understood by `rrule`.
    fn to_rrule_line(self, name: &str, display: Tz) -> String {
        match self {
            Self::Date(d) => format!("{name}:{}T000000Z", d.format("%Y%m%d")),
            Self::Utc(dt) => format!("{name}:{}", dt.format("%Y%m%dT%H%M%SZ")),
            Self::Zoned(naive, tz) => {
                format!("{name};TZID={}:{}", tz.name(), naive.format("%Y%m%dT%H%M%S"))
            }
            Self::Floating(naive) => {
                format!("{name};TZID={}:{}", display.name(), naive.format("%Y%m%dT%H%M%S"))
            }
        }
    }
}

fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    // Times inside a DST gap do not exist locally; read them as UTC wall time instead.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

fn param(prop: &Property, key: &str) -> Option<String> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()))
}

/// Undoes RFC 5545 TEXT escaping (`\,` `\;` `\\` `\n`).
fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The date part of an UNTIL value, if it has one.
fn until_date(value: &str) -> Option<&str> {
    value.get(..8).filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
}

/// The UNTIL bound is reduced to midnight UTC of its date. Unreadable values are
/// left alone for `rrule` to reject.
fn normalize_rrule(rule: &str) -> String {
    rule.split(';')
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => match until_date(value) {
                Some(date) => format!("UNTIL={date}T000000Z"),
                None => part.to_string(),
            },
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Midnight UTC of the rule's UNTIL date.
fn until_bound(rule: &str) -> Option<DateTime<Utc>> {
    rule.split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("UNTIL"))
        .and_then(|(_, value)| until_date(value))
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y%m%d").ok())
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn collect_vevents<'b, 'a>(components: &'b [Component<'a>], out: &mut Vec<&'b Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

/// Normalizes calendar documents for one display timezone.
#[derive(Debug, Clone, Copy)]
pub struct CalendarNormalizer {
    pub display_tz: Tz,
    pub max_recurring: usize,
}

impl CalendarNormalizer {
    pub fn new(display_tz: Tz, max_recurring: usize) -> Self {
        Self {
            display_tz,
            max_recurring,
        }
    }

    /// Every future event of `raw`, tagged with `source`.
    pub fn normalize(
        &self,
        raw: &[u8],
        source: EventSource,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<Event>> {
        let parse_error = |reason: String| BotError::CalendarParse {
            origin: source,
            reason,
        };

        let text = std::str::from_utf8(raw).map_err(|e| parse_error(e.to_string()))?;
        let unfolded = unfold(text);
        let calendar = read_calendar(&unfolded).map_err(|e| parse_error(e.to_string()))?;

        let mut vevents = Vec::new();
        collect_vevents(&calendar.components, &mut vevents);

        let mut events = Vec::new();
        for vevent in vevents {
            let Some(start) = vevent
                .find_prop("DTSTART")
                .and_then(|p| IcalTime::parse_property(p).into_iter().next())
            else {
                tracing::warn!("Skipping {} VEVENT without a readable DTSTART", source);
                continue;
            };
            let end = vevent
                .find_prop("DTEND")
                .and_then(|p| IcalTime::parse_property(p).into_iter().next());

            let summary = vevent
                .find_prop("SUMMARY")
                .map(|p| unescape_text(p.val.as_ref()))
                .unwrap_or_else(|| UNTITLED.to_string());
            let location = vevent
                .find_prop("LOCATION")
                .map(|p| unescape_text(p.val.as_ref()));

            match vevent.find_prop("RRULE") {
                Some(rrule) => {
                    let exdates: Vec<IcalTime> = vevent
                        .properties
                        .iter()
                        .filter(|p| p.name == "EXDATE")
                        .flat_map(IcalTime::parse_property)
                        .collect();
                    let occurrences = match self.occurrences(start, rrule.val.as_ref(), &exdates, now) {
                        Ok(occurrences) => occurrences,
                        Err(reason) => {
                            tracing::warn!("Skipping {} series '{}': {}", source, summary, reason);
                            continue;
                        }
                    };

                    let duration = end.map_or(Duration::zero(), |end| {
                        end.to_utc(self.display_tz) - start.to_utc(self.display_tz)
                    });
                    events.extend(occurrences.into_iter().map(|occurrence| {
                        Event::from_calendar(
                            source,
                            occurrence,
                            occurrence + duration,
                            location.clone(),
                            &summary,
                            true,
                        )
                    }));
                }
                None => {
                    let start_utc = start.to_utc(self.display_tz);
                    if start_utc <= now {
                        continue;
                    }
                    let end_utc = end
                        .unwrap_or(start)
                        .to_utc_end(self.display_tz);
                    events.push(Event::from_calendar(
                        source, start_utc, end_utc, location, &summary, false,
                    ));
                }
            }
        }

        tracing::debug!("Normalized {} events from {} calendar", events.len(), source);
        Ok(events)
    }

    /// The first `max_recurring` occurrences strictly after `now`, in order.
    fn occurrences(
        &self,
        start: IcalTime,
        rule: &str,
        exdates: &[IcalTime],
        now: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, String> {
        // Truncating UNTIL can move it before DTSTART, which leaves an empty series.
        if until_bound(rule).is_some_and(|until| until < start.to_utc(self.display_tz)) {
            return Ok(Vec::new());
        }

        let mut lines = vec![
            start.to_rrule_line("DTSTART", self.display_tz),
            format!("RRULE:{}", normalize_rrule(rule)),
        ];
        lines.extend(
            exdates
                .iter()
                .map(|ex| ex.to_rrule_line("EXDATE", self.display_tz)),
        );

        let set: RRuleSet = lines
            .join("\n")
            .parse()
            .map_err(|e| format!("invalid recurrence rule '{rule}': {e}"))?;

        // One spare in case `after` is inclusive of `now`.
        let limit = u16::try_from(self.max_recurring + 1).unwrap_or(u16::MAX);
        let tz: rrule::Tz = Utc.into();
        let result = set.after(now.with_timezone(&tz)).all(limit);

        Ok(result
            .dates
            .iter()
            .map(|dt| dt.with_timezone(&Utc))
            .filter(|dt| *dt > now)
            .take(self.max_recurring)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Australia::Brisbane;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn calendar(body: &str) -> Vec<u8> {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\n{body}END:VCALENDAR\r\n"
        )
        .into_bytes()
    }

    fn normalizer() -> CalendarNormalizer {
        CalendarNormalizer::new(Brisbane, 3)
    }

    #[test]
    fn test_single_event_keeps_its_bounds() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "UID:one@test\r\n",
            "DTSTART:20240305T080000Z\r\n",
            "DTEND:20240305T100000Z\r\n",
            "SUMMARY:Games Night\r\n",
            "LOCATION:Hawken\\, Room 2\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
        assert_eq!(event.summary, "Games Night");
        assert_eq!(event.location, "Hawken, Room 2");
        assert!(!event.recurring);
    }

    #[test]
    fn test_zoned_times_are_converted_to_utc() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART;TZID=Australia/Brisbane:20240305T180000\r\n",
            "DTEND;TZID=Australia/Brisbane:20240305T200000\r\n",
            "SUMMARY:Talk\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
        assert_eq!(events[0].location, "TBA");
    }

    #[test]
    fn test_past_events_are_dropped() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240201T080000Z\r\n",
            "DTEND:20240201T100000Z\r\n",
            "SUMMARY:Old\r\n",
            "END:VEVENT\r\n",
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240301T000000Z\r\n",
            "DTEND:20240301T010000Z\r\n",
            "SUMMARY:Exactly now\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_all_day_bounds() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART;VALUE=DATE:20240310\r\n",
            "DTEND;VALUE=DATE:20240311\r\n",
            "SUMMARY:O-Week\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        let event = &events[0];
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(
            event.end,
            NaiveDate::from_ymd_opt(2024, 3, 11)
                .unwrap()
                .and_hms_micro_opt(23, 59, 59, 999_999)
                .unwrap()
                .and_utc()
        );
    }

    #[test]
    fn test_external_events_are_prefixed() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240305T080000Z\r\n",
            "DTEND:20240305T100000Z\r\n",
            "SUMMARY:Careers Fair\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::External, now())
            .unwrap();
        assert_eq!(events[0].summary, "[External] Careers Fair");
        assert_eq!(events[0].source, EventSource::External);
    }

    #[test]
    fn test_non_event_components_are_ignored() {
        let raw = calendar(concat!(
            "BEGIN:VTODO\r\n",
            "DTSTART:20240305T080000Z\r\n",
            "SUMMARY:Chores\r\n",
            "END:VTODO\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_recurrence_is_capped_and_future_only() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "DTEND:20240103T100000Z\r\n",
            "RRULE:FREQ=WEEKLY\r\n",
            "SUMMARY:Weekly Hack\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.start > now() && e.recurring));
        assert!(events.iter().all(|e| e.end - e.start == Duration::hours(2)));
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap());
        assert_eq!(events[2].start, Utc.with_ymd_and_hms(2024, 3, 20, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_recurrence_cap_is_configurable() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "DTEND:20240103T100000Z\r\n",
            "RRULE:FREQ=DAILY\r\n",
            "SUMMARY:Daily\r\n",
            "END:VEVENT\r\n",
        ));
        let events = CalendarNormalizer::new(Brisbane, 5)
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_recurrence_respects_exdate_and_until() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "DTEND:20240103T090000Z\r\n",
            "RRULE:FREQ=WEEKLY;UNTIL=20240314T235959Z\r\n",
            "EXDATE:20240306T080000Z\r\n",
            "SUMMARY:Short Series\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        // 6 March excluded, series ends at midnight of 14 March.
        let starts: Vec<_> = events.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![Utc.with_ymd_and_hms(2024, 3, 13, 8, 0, 0).unwrap()]);
    }

    #[test]
    fn test_finished_series_yields_nothing() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20230103T080000Z\r\n",
            "DTEND:20230103T090000Z\r\n",
            "RRULE:FREQ=WEEKLY;COUNT=4\r\n",
            "SUMMARY:Done\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_series_ending_on_its_first_day_is_empty() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "DTEND:20240103T090000Z\r\n",
            "RRULE:FREQ=DAILY;UNTIL=20240103T235959Z\r\n",
            "SUMMARY:One Day Only\r\n",
            "END:VEVENT\r\n",
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240305T080000Z\r\n",
            "DTEND:20240305T100000Z\r\n",
            "SUMMARY:Still On\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Still On");
    }

    #[test]
    fn test_unreadable_rule_skips_only_that_series() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "RRULE:FREQ=DAILY;UNTIL=2024010\u{e9}\r\n",
            "SUMMARY:Broken\r\n",
            "END:VEVENT\r\n",
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T080000Z\r\n",
            "RRULE:FREQ=SOMETIMES\r\n",
            "SUMMARY:Also Broken\r\n",
            "END:VEVENT\r\n",
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240305T080000Z\r\n",
            "DTEND:20240305T100000Z\r\n",
            "SUMMARY:Still On\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::External, now())
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "[External] Still On");
    }

    #[test]
    fn test_zoned_series_with_zoned_exdate() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART;TZID=Australia/Brisbane:20240103T180000\r\n",
            "DTEND;TZID=Australia/Brisbane:20240103T200000\r\n",
            "RRULE:FREQ=WEEKLY;UNTIL=20240320T235959Z\r\n",
            "EXDATE;TZID=Australia/Brisbane:20240306T180000\r\n",
            "SUMMARY:Weekly Talk\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        // 18:00 Brisbane is 08:00 UTC; 6 March excluded, 20 March 08:00 UTC is past UNTIL.
        let starts: Vec<_> = events.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![Utc.with_ymd_and_hms(2024, 3, 13, 8, 0, 0).unwrap()]);
        assert_eq!(events[0].end - events[0].start, Duration::hours(2));
    }

    #[test]
    fn test_floating_series_uses_display_timezone() {
        let raw = calendar(concat!(
            "BEGIN:VEVENT\r\n",
            "DTSTART:20240103T180000\r\n",
            "DTEND:20240103T190000\r\n",
            "RRULE:FREQ=WEEKLY;COUNT=20\r\n",
            "SUMMARY:Floating\r\n",
            "END:VEVENT\r\n",
        ));
        let events = normalizer()
            .normalize(&raw, EventSource::Primary, now())
            .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = normalizer()
            .normalize(&[0xff, 0xfe, 0x00], EventSource::Primary, now())
            .unwrap_err();
        assert!(matches!(err, BotError::CalendarParse { origin: EventSource::Primary, .. }));
    }

    #[test]
    fn test_normalize_rrule_truncates_until() {
        assert_eq!(
            normalize_rrule("FREQ=WEEKLY;UNTIL=20240601T135959Z;BYDAY=WE"),
            "FREQ=WEEKLY;UNTIL=20240601T000000Z;BYDAY=WE"
        );
        assert_eq!(normalize_rrule("FREQ=DAILY;COUNT=2"), "FREQ=DAILY;COUNT=2");
        assert_eq!(
            normalize_rrule("FREQ=DAILY;UNTIL=2024010\u{e9}"),
            "FREQ=DAILY;UNTIL=2024010\u{e9}"
        );
        assert_eq!(normalize_rrule("FREQ=DAILY;UNTIL=2024"), "FREQ=DAILY;UNTIL=2024");
    }

    #[test]
    fn test_until_bound() {
        assert_eq!(
            until_bound("FREQ=DAILY;UNTIL=20240103T235959Z"),
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(until_bound("FREQ=DAILY;COUNT=3"), None);
        assert_eq!(until_bound("FREQ=DAILY;UNTIL=2024010\u{e9}"), None);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text(r"a\, b\; c\\d\ne"), "a, b; c\\d\ne");
    }
}
