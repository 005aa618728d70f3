//! Application configuration management.
//!
//! Holds the spreadsheet table names, CMS page slugs, and the column names the
//! store reads from each row. Column names change from year to year (the
//! sponsorship level column is year-scoped), so they live here rather than in
//! code.
//!
//! Configuration is stored at `~/.config/confsite/config.json`. API
//! credentials are normally supplied through the environment instead.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::SelectQuery;

/// Application name used for config directory paths
const APP_NAME: &str = "confsite";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding the CMS read token
pub const ENV_CMS_TOKEN: &str = "CONFSITE_CMS_TOKEN";

/// Environment variable holding the spreadsheet API key
pub const ENV_SHEETS_KEY: &str = "CONFSITE_SHEETS_KEY";

/// Environment variable holding the spreadsheet base id
pub const ENV_SHEETS_BASE: &str = "CONFSITE_SHEETS_BASE";

const DEFAULT_CMS_BASE_URL: &str = "https://api.buttercms.com/v2";
const DEFAULT_SHEETS_BASE_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_VIEW: &str = "Grid view";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cms: CmsConfig,
    pub sheets: SheetsConfig,
    pub sponsors_table: TableConfig,
    pub attendees_table: TableConfig,
    pub schedule_table: TableConfig,
    /// CMS pages fetched on startup
    pub pages: Vec<String>,
    pub fields: FieldNames,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub base_url: String,
    pub base_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub view: String,
    pub max_records: u32,
}

impl TableConfig {
    fn new(name: &str, max_records: u32) -> Self {
        Self {
            name: name.to_string(),
            view: DEFAULT_VIEW.to_string(),
            max_records,
        }
    }

    pub fn query(&self) -> SelectQuery {
        SelectQuery::new(self.max_records, self.view.clone())
    }
}

/// Column names read from spreadsheet rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub sponsor_name: String,
    pub sponsorship_level: String,
    pub commitment_confirmed: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub directory_permission: String,
    pub schedule_time: String,
    /// Column added to directory entries holding the email fingerprint
    pub avatar_key: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            sponsor_name: "Sponsor".to_string(),
            sponsorship_level: "2018 Sponsorship Level".to_string(),
            commitment_confirmed: "Commitment confirmed".to_string(),
            attendee_name: "Guest Name".to_string(),
            attendee_email: "Email".to_string(),
            directory_permission: "Directory Permission".to_string(),
            schedule_time: "Time".to_string(),
            avatar_key: "key".to_string(),
        }
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CMS_BASE_URL.to_string(),
            api_token: None,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            base_id: None,
            api_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cms: CmsConfig::default(),
            sheets: SheetsConfig::default(),
            sponsors_table: TableConfig::new("Past & Potential Sponsors", 99),
            attendees_table: TableConfig::new("Guests", 999),
            schedule_table: TableConfig::new("2018 Saturday Schedule", 999),
            pages: ["homepage", "faqs", "schedule", "history", "attendees", "sponsors"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fields: FieldNames::default(),
        }
    }
}

impl Config {
    /// Load the config file (or defaults if there is none), then apply
    /// credential overrides from the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Replace credentials with values found by `lookup`. Empty values are
    /// ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = lookup(ENV_CMS_TOKEN) {
            self.cms.api_token = Some(token);
        }
        if let Some(key) = lookup(ENV_SHEETS_KEY) {
            self.sheets.api_key = Some(key);
        }
        if let Some(base) = lookup(ENV_SHEETS_BASE) {
            self.sheets.base_id = Some(base);
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
