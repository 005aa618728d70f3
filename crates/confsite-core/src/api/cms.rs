//! HTTP client for the headless CMS page API.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{join_segments, HttpClient};
use super::{ApiError, PageSource};
use crate::config::CmsConfig;
use crate::models::CmsPage;

#[derive(Debug, Deserialize)]
struct PageResponse {
    data: CmsPage,
}

/// Reads pages from the CMS (`GET {base}/pages/{type}/{slug}/?auth_token=`).
#[derive(Clone)]
pub struct CmsClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let token = config
            .api_token
            .clone()
            .ok_or(ApiError::MissingCredential("CMS API token"))?;
        Ok(Self {
            http: HttpClient::new()?,
            base_url: config.base_url.clone(),
            token,
        })
    }
}

#[async_trait]
impl PageSource for CmsClient {
    async fn retrieve(&self, fields: &str, slug: &str) -> Result<CmsPage> {
        let mut url = join_segments(&self.base_url, &["pages", fields, slug, ""])?;
        url.query_pairs_mut().append_pair("auth_token", &self.token);

        let response: PageResponse = self.http.get(url, None).await?;
        debug!(requested = slug, slug = %response.data.slug, fields = response.data.fields.len(), "Page retrieved");
        Ok(response.data)
    }
}
