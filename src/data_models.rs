use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metatag keys consulted, in order, when deriving a result's published date.
pub const DATE_METATAG_KEYS: [&str; 3] = ["article:published_time", "og:updated_time", "date"];

/// One hit as returned by the search collaborator.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagemap: Option<PageMap>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PageMap {
    #[serde(default)]
    pub metatags: Vec<HashMap<String, Value>>,
}

impl SearchHit {
    pub fn new(title: &str, link: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
            pagemap: None,
        }
    }

    pub fn with_metatag(mut self, key: &str, value: &str) -> SearchHit {
        let pagemap = self.pagemap.get_or_insert_with(PageMap::default);
        if pagemap.metatags.is_empty() {
            pagemap.metatags.push(HashMap::new());
        }
        pagemap.metatags[0].insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// First non-empty date found in the leading metatag bag, if any.
    pub fn published_date(&self) -> Option<String> {
        let tags = self.pagemap.as_ref()?.metatags.first()?;
        DATE_METATAG_KEYS
            .iter()
            .filter_map(|key| match tags.get(*key)? {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .next()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl From<SearchHit> for ResultItem {
    fn from(hit: SearchHit) -> Self {
        let published_date = hit.published_date();
        ResultItem {
            title: hit.title,
            link: hit.link,
            snippet: hit.snippet,
            published_date,
        }
    }
}

/// A single message pushed to the client over the event stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Frame {
    Data {
        results: Vec<ResultItem>,
        #[serde(rename = "isLast")]
        is_last: bool,
    },
    Error {
        error: String,
    },
}

impl Frame {
    pub fn item(item: ResultItem, is_last: bool) -> Frame {
        Frame::Data {
            results: vec![item],
            is_last,
        }
    }

    pub fn empty() -> Frame {
        Frame::Data {
            results: Vec::new(),
            is_last: true,
        }
    }

    pub fn error(message: impl Into<String>) -> Frame {
        Frame::Error {
            error: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Frame::Data { is_last, .. } => *is_last,
            Frame::Error { .. } => true,
        }
    }
}
