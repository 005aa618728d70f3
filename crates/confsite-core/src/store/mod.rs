//! The conference data store.
//!
//! `ConferenceStore` owns the fetched collections and UI flags, runs the
//! fetches that fill them, serves derived views, and starts the event
//! countdown. It is cheap to clone; clones share the same state, so one
//! store can be built at startup and handed to every request.

pub mod derive;
pub mod error;
pub mod state;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::api::{CmsClient, PageSource, SheetsClient, TableSource};
use crate::config::{Config, TableConfig};
use crate::countdown::{parse_event_time, CountdownDuration, CountdownHandle, EventTimeObject, TICK};
use crate::models::{PageContent, Record, ScheduleSlot};

pub use error::{FetchTarget, StoreError};
pub use state::StoreState;

/// Field selector passed to the CMS: every field on the page
const ALL_FIELDS: &str = "*";

#[derive(Clone)]
pub struct ConferenceStore {
    config: Arc<Config>,
    pages: Arc<dyn PageSource>,
    tables: Arc<dyn TableSource>,
    state: Arc<RwLock<StoreState>>,
    initialized: Arc<AtomicBool>,
}

impl ConferenceStore {
    pub fn new(config: Config, pages: Arc<dyn PageSource>, tables: Arc<dyn TableSource>) -> Self {
        Self {
            config: Arc::new(config),
            pages,
            tables,
            state: Arc::new(RwLock::new(StoreState::default())),
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a store backed by the HTTP clients described in `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let pages = Arc::new(CmsClient::new(&config.cms)?);
        let tables = Arc::new(SheetsClient::new(&config.sheets)?);
        Ok(Self::new(config, pages, tables))
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Load all data the first time it is called; later calls do nothing.
    pub async fn init(&self) -> Result<(), StoreError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Store already initialized");
            return Ok(());
        }
        self.load_data().await
    }

    /// Fetch sponsors, attendees, schedule, and every configured page at
    /// once. Waits for all of them; one failing does not stop the others.
    pub async fn load_data(&self) -> Result<(), StoreError> {
        info!(pages = self.config.pages.len(), "Loading conference data");

        let page_fetches =
            futures::future::join_all(self.config.pages.iter().map(|slug| self.get_page(slug)));

        let (sponsors_res, attendees_res, schedule_res, page_results) = tokio::join!(
            self.get_sponsors(),
            self.get_attendees(),
            self.get_schedule(),
            page_fetches,
        );

        let results: Vec<Result<(), StoreError>> = [sponsors_res, attendees_res, schedule_res]
            .into_iter()
            .chain(page_results)
            .collect();
        let total = results.len();
        let failed: Vec<FetchTarget> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .filter_map(|e| e.fetch_target().cloned())
            .collect();

        self.state.write().await.mark_loaded();

        if failed.is_empty() {
            info!(total, "Conference data loaded");
            Ok(())
        } else {
            warn!(total, failed = failed.len(), "Conference data partially loaded");
            Err(StoreError::LoadIncomplete { failed, total })
        }
    }

    // =========================================================================
    // Fetch Actions
    // =========================================================================

    /// Fetch a CMS page and cache it under the slug the CMS reports, unless a
    /// page is already cached there.
    pub async fn get_page(&self, slug: &str) -> Result<(), StoreError> {
        match self.pages.retrieve(ALL_FIELDS, slug).await {
            Ok(page) => {
                let cms_slug = page.slug.clone();
                let inserted = self.state.write().await.set_page_if_absent(page.slug, page.fields);
                debug!(requested = slug, slug = %cms_slug, inserted, "Page fetched");
                Ok(())
            }
            Err(e) => {
                error!(page = slug, error = %e, "Failed to fetch page");
                Err(StoreError::Fetch {
                    target: FetchTarget::Page(slug.to_string()),
                    source: e,
                })
            }
        }
    }

    /// Fetch sponsors, keeping only rows with a confirmed commitment
    pub async fn get_sponsors(&self) -> Result<(), StoreError> {
        let confirmed = self.config.fields.commitment_confirmed.clone();
        self.each_page(FetchTarget::Sponsors, &self.config.sponsors_table, |state, record| {
            if record.is_true(&confirmed) {
                state.push_sponsor(record);
                true
            } else {
                false
            }
        })
        .await
    }

    pub async fn get_attendees(&self) -> Result<(), StoreError> {
        self.each_page(FetchTarget::Attendees, &self.config.attendees_table, |state, record| {
            state.push_attendee(record);
            true
        })
        .await
    }

    pub async fn get_schedule(&self) -> Result<(), StoreError> {
        self.each_page(FetchTarget::Schedule, &self.config.schedule_table, |state, record| {
            state.push_schedule_item(record);
            true
        })
        .await
    }

    /// Walk every page of `table` in order, handing each row to `commit`
    /// (which returns whether it kept the row). Rows are committed page by
    /// page, so an error partway through leaves earlier pages in place.
    async fn each_page<F>(&self, target: FetchTarget, table: &TableConfig, mut commit: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut StoreState, Record) -> bool,
    {
        let query = table.query();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;
        let mut committed = 0usize;

        loop {
            let page = match self.tables.select_page(&table.name, &query, offset.take()).await {
                Ok(page) => page,
                Err(e) => {
                    error!(table = %table.name, pages, committed, error = %e, "Failed to fetch {}", target);
                    return Err(StoreError::Fetch { target, source: e });
                }
            };
            pages += 1;

            {
                let mut state = self.state.write().await;
                for record in page.records {
                    if commit(&mut *state, record) {
                        committed += 1;
                    }
                }
            }

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(table = %table.name, pages, committed, "Fetched {}", target);
        Ok(())
    }

    // =========================================================================
    // Countdown
    // =========================================================================

    /// Start counting down to `event_time` (`YYYY-M-D H:mm`, local time).
    ///
    /// Only the first successful call starts a countdown; it returns the
    /// handle that keeps the ticker alive. Later calls return `Ok(None)` and
    /// leave the running countdown alone.
    pub async fn set_event_time(&self, event_time: &str) -> Result<Option<CountdownHandle>, StoreError> {
        {
            let mut state = self.state.write().await;
            if state.countdown_started() {
                debug!(event_time, "Countdown already started, ignoring");
                return Ok(None);
            }
            let starts_at = parse_event_time(event_time)
                .ok_or_else(|| StoreError::InvalidEventTime(event_time.to_string()))?;
            let duration = CountdownDuration::between(&Local::now(), &starts_at);
            state.start_countdown(duration);
            info!(event_time, remaining_ms = duration.as_millis(), "Countdown started");
        }

        let tick_millis = TICK.as_millis() as i64;
        let state = Arc::clone(&self.state);
        Ok(Some(CountdownHandle::spawn(move || {
            let state = Arc::clone(&state);
            async move {
                state.write().await.tick_countdown(tick_millis);
            }
        })))
    }

    // =========================================================================
    // UI Flags
    // =========================================================================

    pub async fn set_accent_color(&self, color: impl Into<String>) {
        self.state.write().await.set_accent_color(color.into());
    }

    pub async fn set_youtube_api_ready(&self, ready: bool) {
        self.state.write().await.set_youtube_api_ready(ready);
    }

    // =========================================================================
    // Reads and Derived Views
    // =========================================================================

    /// A copy of the current state
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub async fn pages(&self) -> PageContent {
        self.state.read().await.pages().clone()
    }

    pub async fn event_time_object(&self) -> Option<EventTimeObject> {
        derive::event_time_object(self.state.read().await.time_to_event())
    }

    pub async fn premier_sponsors(&self) -> BTreeMap<String, Record> {
        derive::premier_sponsors(self.state.read().await.sponsors(), &self.config.fields)
    }

    pub async fn sponsors(&self) -> BTreeMap<String, Record> {
        derive::sponsors(self.state.read().await.sponsors(), &self.config.fields)
    }

    pub async fn supporters(&self) -> BTreeMap<String, Record> {
        derive::supporters(self.state.read().await.sponsors(), &self.config.fields)
    }

    pub async fn directory_attendees(&self) -> BTreeMap<String, Record> {
        derive::directory_attendees(self.state.read().await.attendees(), &self.config.fields)
    }

    pub async fn schedule_by_time(&self) -> Vec<ScheduleSlot> {
        derive::schedule_by_time(self.state.read().await.schedule(), &self.config.fields)
    }
}
