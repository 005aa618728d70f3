//! Core library for the conference site.
//!
//! Fetches sponsor, attendee, and schedule rows from a spreadsheet API and
//! page content from a headless CMS, keeps them in an in-memory store, and
//! derives the grouped views the site renders. Also drives the event
//! countdown shown on the homepage.

pub mod api;
pub mod config;
pub mod countdown;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiError, CmsClient, PageSource, SheetsClient, TableSource};
pub use config::{Config, FieldNames};
pub use countdown::{CountdownDuration, CountdownHandle, EventTimeObject};
pub use models::{CmsPage, PageContent, Record, RecordPage, ScheduleSlot, SelectQuery};
pub use store::{ConferenceStore, FetchTarget, StoreError, StoreState};
