use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

use super::MeetingSpan;
use crate::error::ValidationError;
use crate::timer::{minute_of_day, WorkHoursConfig};

/// Hosts and words that mark an event as a call.
const MEETING_KEYWORDS: &[&str] = &[
    "zoom.us",
    "meet.google.com",
    "teams.microsoft.com",
    "webex.com",
    "whereby.com",
    "around.co",
    "meeting",
    "standup",
    "stand-up",
    "sync",
    "1:1",
    "1-on-1",
    "interview",
    "call",
    "review",
    "retro",
];

/// Titles of time blocks a user puts on their own calendar.
const PERSONAL_BLOCK_KEYWORDS: &[&str] = &[
    "focus time",
    "focus block",
    "deep work",
    "do not book",
    "lunch",
    "busy",
    "blocked",
    "hold",
    "personal",
    "ooo",
    "out of office",
    "commute",
];

/// Raw event as delivered by a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub title: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    #[serde(default)]
    pub is_all_day: bool,
    /// Attendees other than the user.
    #[serde(default)]
    pub other_attendees: u32,
    #[serde(default)]
    pub call_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CalendarEntry {
    pub fn new(title: impl Into<String>, start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            is_all_day: false,
            other_attendees: 0,
            call_url: None,
            location: None,
            notes: None,
        }
    }

    pub fn with_attendees(mut self, count: u32) -> Self {
        self.other_attendees = count;
        self
    }

    pub fn with_call_url(mut self, url: impl Into<String>) -> Self {
        self.call_url = Some(url.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeRange` unless the entry ends
    /// after it starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn span(&self) -> MeetingSpan {
        MeetingSpan::new(self.start, self.end)
    }

    /// A real meeting has other people or a call link. Without either, the
    /// title and location decide: personal blocks are dropped, platform
    /// hosts and meeting words count. All-day events never count.
    pub fn is_real_meeting(&self) -> bool {
        if self.is_all_day || self.end <= self.start {
            return false;
        }
        if self.other_attendees > 0 || self.call_url.is_some() {
            return true;
        }
        !self.is_personal_block() && self.mentions_meeting_platform()
    }

    fn is_personal_block(&self) -> bool {
        let title = words(&self.title);
        PERSONAL_BLOCK_KEYWORDS
            .iter()
            .any(|kw| contains_phrase(&title, kw))
    }

    fn mentions_meeting_platform(&self) -> bool {
        [Some(&self.title), self.location.as_ref(), self.notes.as_ref()]
            .into_iter()
            .flatten()
            .map(|text| words(text))
            .any(|text| MEETING_KEYWORDS.iter().any(|kw| contains_phrase(&text, kw)))
    }

    /// Whether the entry overlaps the daily work window on its own day.
    pub(crate) fn overlaps_work_window(&self, window: &WorkHoursConfig) -> bool {
        if !window.is_work_day(self.start.weekday()) {
            return false;
        }
        let start = minute_of_day(self.start.time());
        let end = if self.end.date_naive() > self.start.date_naive() {
            u16::MAX
        } else {
            minute_of_day(self.end.time())
        };
        start < window.end_minute && end > window.start_minute
    }
}

/// Lowercased alphanumeric runs of `text`.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `phrase` appears in `text` as whole consecutive words.
fn contains_phrase(text: &[String], phrase: &str) -> bool {
    let phrase = words(phrase);
    !phrase.is_empty() && text.windows(phrase.len()).any(|w| w == phrase.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 14, h, m, 0).single().unwrap()
    }

    #[test]
    fn attendees_make_a_meeting() {
        let entry = CalendarEntry::new("Quarterly planning", at(10, 0), at(11, 0)).with_attendees(4);
        assert!(entry.is_real_meeting());
    }

    #[test]
    fn call_link_makes_a_meeting() {
        let entry = CalendarEntry::new("Chat with Sam", at(10, 0), at(10, 30))
            .with_call_url("https://example.zoom.us/j/123");
        assert!(entry.is_real_meeting());
    }

    #[test]
    fn platform_keyword_in_location_makes_a_meeting() {
        let entry = CalendarEntry::new("Catch up", at(10, 0), at(10, 30))
            .with_location("https://meet.google.com/abc-defg-hij");
        assert!(entry.is_real_meeting());
        assert!(CalendarEntry::new("Team standup", at(9, 30), at(9, 45)).is_real_meeting());
    }

    #[test]
    fn solo_event_without_signals_is_not_a_meeting() {
        assert!(!CalendarEntry::new("Dentist", at(10, 0), at(11, 0)).is_real_meeting());
    }

    #[test]
    fn personal_blocks_and_all_day_events_are_excluded() {
        let focus = CalendarEntry::new("Focus time", at(13, 0), at(15, 0));
        let lunch = CalendarEntry::new("Lunch before review", at(12, 0), at(13, 0));
        let offsite = CalendarEntry::new("Offsite meeting", at(0, 0), at(23, 0))
            .with_attendees(10)
            .all_day();
        assert!(!focus.is_real_meeting());
        assert!(!lunch.is_real_meeting());
        assert!(!offsite.is_real_meeting());
    }

    #[test]
    fn attendees_and_call_link_outrank_title_keywords() {
        let stakeholder = CalendarEntry::new("Stakeholder review", at(10, 0), at(11, 0))
            .with_attendees(6)
            .with_call_url("https://zoom.us/j/1");
        let lunch_call = CalendarEntry::new("Team lunch", at(12, 0), at(13, 0)).with_attendees(4);
        assert!(stakeholder.is_real_meeting());
        assert!(lunch_call.is_real_meeting());
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert!(!CalendarEntry::new("Async recall", at(10, 0), at(10, 30)).is_real_meeting());
        assert!(!CalendarEntry::new("Callback prep", at(10, 0), at(10, 30)).is_real_meeting());
        assert!(CalendarEntry::new("Weekly sync", at(10, 0), at(10, 30)).is_real_meeting());
        assert!(CalendarEntry::new("1:1 with Ana", at(10, 0), at(10, 30)).is_real_meeting());
        assert!(CalendarEntry::new("Stand-up", at(9, 30), at(9, 45)).is_real_meeting());
        // Personal-block words inside longer words do not hide a meeting.
        assert!(CalendarEntry::new("Stakeholder review", at(10, 0), at(11, 0)).is_real_meeting());
    }

    #[test]
    fn inverted_entry_fails_validation() {
        let entry = CalendarEntry::new("Sync", at(11, 0), at(10, 0));
        assert!(matches!(
            entry.validate(),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
        assert!(!entry.is_real_meeting());
    }

    #[test]
    fn work_window_overlap() {
        let window = WorkHoursConfig::weekdays(9 * 60, 17 * 60).unwrap();
        assert!(CalendarEntry::new("x", at(8, 30), at(9, 15)).overlaps_work_window(&window));
        assert!(!CalendarEntry::new("x", at(8, 0), at(9, 0)).overlaps_work_window(&window));
        assert!(!CalendarEntry::new("x", at(17, 0), at(18, 0)).overlaps_work_window(&window));
    }
}
