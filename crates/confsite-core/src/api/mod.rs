//! Clients for the two external data sources.
//!
//! The store talks to the CMS through [`PageSource`] and to the spreadsheet
//! service through [`TableSource`]. `CmsClient` and `SheetsClient` are the
//! HTTP implementations used in production; tests substitute in-memory fakes.

pub mod cms;
pub mod error;
mod http;
pub mod sheets;
#[cfg(test)]
mod test_server;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CmsPage, RecordPage, SelectQuery};

pub use cms::CmsClient;
pub use error::ApiError;
pub use sheets::SheetsClient;

/// Headless CMS collaborator.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieve the page identified by `slug`, selecting fields with `fields`
    /// (`"*"` for all of them).
    async fn retrieve(&self, fields: &str, slug: &str) -> Result<CmsPage>;
}

/// Spreadsheet collaborator exposing named, paginated views of rows.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch one page of `table`. Pass the previous page's `offset` to continue;
    /// a returned page with no `offset` is the last one.
    async fn select_page(
        &self,
        table: &str,
        query: &SelectQuery,
        offset: Option<String>,
    ) -> Result<RecordPage>;
}
