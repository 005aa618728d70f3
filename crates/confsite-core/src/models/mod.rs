//! Data models for conference site content.
//!
//! - `Record`: an open-ended spreadsheet row (sponsor, attendee, schedule item)
//! - `CmsPage`, `PageContent`: CMS page fields keyed by slug
//! - `SelectQuery`, `RecordPage`: paginated spreadsheet selects
//! - `ScheduleSlot`: schedule rows grouped by time slot

pub mod page;
pub mod record;
pub mod table;

pub use page::{CmsPage, PageContent};
pub use record::{Record, ScheduleSlot};
pub use table::{RecordPage, SelectQuery};
