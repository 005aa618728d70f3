//! HTTP client for the spreadsheet API.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{join_segments, HttpClient};
use super::{ApiError, TableSource};
use crate::config::SheetsConfig;
use crate::models::{Record, RecordPage, SelectQuery};

#[derive(Debug, Deserialize)]
struct SelectResponse {
    #[serde(default)]
    records: Vec<SheetRow>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(default)]
    fields: Record,
}

/// Reads table rows (`GET {base}/{base_id}/{table}?maxRecords=&view=&offset=`).
#[derive(Clone)]
pub struct SheetsClient {
    http: HttpClient,
    base_url: String,
    base_id: String,
    api_key: String,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ApiError::MissingCredential("spreadsheet API key"))?;
        let base_id = config
            .base_id
            .clone()
            .ok_or(ApiError::MissingCredential("spreadsheet base id"))?;
        Ok(Self {
            http: HttpClient::new()?,
            base_url: config.base_url.clone(),
            base_id,
            api_key,
        })
    }
}

#[async_trait]
impl TableSource for SheetsClient {
    async fn select_page(
        &self,
        table: &str,
        query: &SelectQuery,
        offset: Option<String>,
    ) -> Result<RecordPage> {
        let mut url = join_segments(&self.base_url, &[&self.base_id, table])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("maxRecords", &query.max_records.to_string())
                .append_pair("view", &query.view);
            if let Some(ref offset) = offset {
                pairs.append_pair("offset", offset);
            }
        }

        let response: SelectResponse = self.http.get(url, Some(&self.api_key)).await?;
        debug!(table, rows = response.records.len(), more = response.offset.is_some(), "Table page received");
        Ok(RecordPage {
            records: response.records.into_iter().map(|row| row.fields).collect(),
            offset: response.offset,
        })
    }
}
