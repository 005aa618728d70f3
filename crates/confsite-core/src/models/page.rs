use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name → value for a single CMS page.
pub type PageFields = Map<String, Value>;

/// Page slug → page fields, as cached by the store.
pub type PageContent = BTreeMap<String, PageFields>;

/// A page as returned by the CMS. `slug` is the CMS's own slug for the page,
/// which is what the store keys its cache by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsPage {
    pub slug: String,
    #[serde(default)]
    pub fields: PageFields,
}
