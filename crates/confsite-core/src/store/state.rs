use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::countdown::CountdownDuration;
use crate::models::{PageContent, Record};

/// Accent colour pages start with until one sets its own
const DEFAULT_ACCENT_COLOR: &str = "orange";

/// Everything the store has fetched, plus the site's UI flags.
///
/// Reads are public; writes are limited to the append/set operations the
/// store performs, so collections only ever grow and cached pages are never
/// replaced.
#[derive(Debug, Clone)]
pub struct StoreState {
    pages: PageContent,
    sponsors: Vec<Record>,
    attendees: Vec<Record>,
    schedule: Vec<Record>,
    accent_color: String,
    time_to_event: Option<CountdownDuration>,
    countdown_started: bool,
    youtube_api_ready: bool,
    last_loaded: Option<DateTime<Utc>>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            pages: PageContent::new(),
            sponsors: Vec::new(),
            attendees: Vec::new(),
            schedule: Vec::new(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            time_to_event: None,
            countdown_started: false,
            youtube_api_ready: false,
            last_loaded: None,
        }
    }
}

impl StoreState {
    pub fn pages(&self) -> &PageContent {
        &self.pages
    }

    pub fn page(&self, slug: &str) -> Option<&Map<String, Value>> {
        self.pages.get(slug)
    }

    pub fn sponsors(&self) -> &[Record] {
        &self.sponsors
    }

    pub fn attendees(&self) -> &[Record] {
        &self.attendees
    }

    pub fn schedule(&self) -> &[Record] {
        &self.schedule
    }

    pub fn accent_color(&self) -> &str {
        &self.accent_color
    }

    pub fn time_to_event(&self) -> Option<CountdownDuration> {
        self.time_to_event
    }

    pub fn countdown_started(&self) -> bool {
        self.countdown_started
    }

    pub fn youtube_api_ready(&self) -> bool {
        self.youtube_api_ready
    }

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.last_loaded
    }

    /// Minutes since the last completed load, if there was one
    pub fn load_age_minutes(&self) -> Option<i64> {
        self.last_loaded.map(|at| (Utc::now() - at).num_minutes())
    }

    // ===== Mutations =====

    /// Cache a page unless one is already stored under `slug`.
    /// Returns true if the page was inserted.
    pub(crate) fn set_page_if_absent(&mut self, slug: String, fields: Map<String, Value>) -> bool {
        if self.pages.contains_key(&slug) {
            return false;
        }
        self.pages.insert(slug, fields);
        true
    }

    pub(crate) fn push_sponsor(&mut self, record: Record) {
        self.sponsors.push(record);
    }

    pub(crate) fn push_attendee(&mut self, record: Record) {
        self.attendees.push(record);
    }

    pub(crate) fn push_schedule_item(&mut self, record: Record) {
        self.schedule.push(record);
    }

    pub(crate) fn set_accent_color(&mut self, color: String) {
        self.accent_color = color;
    }

    pub(crate) fn set_youtube_api_ready(&mut self, ready: bool) {
        self.youtube_api_ready = ready;
    }

    /// Store the initial countdown and mark it started
    pub(crate) fn start_countdown(&mut self, duration: CountdownDuration) {
        self.time_to_event = Some(duration);
        self.countdown_started = true;
    }

    /// Subtract `millis` from the countdown, if one is set. No clamp at zero.
    pub(crate) fn tick_countdown(&mut self, millis: i64) {
        if let Some(duration) = self.time_to_event {
            self.time_to_event = Some(duration.minus_millis(millis));
        }
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.last_loaded = Some(Utc::now());
    }
}
