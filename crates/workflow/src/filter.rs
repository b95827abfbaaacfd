//! Query parameters of a list view.
//!
//! A `FilterSpec` is always replaced as a whole: callers describe a change as
//! a `FilterPatch`, and applying any patch moves the page cursor back to the
//! first page.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

pub const PAGE_KEY: &str = "Page";
pub const PAGE_SIZE_KEY: &str = "PageSize";
pub const STATUS_KEY: &str = "Status";

/// Status filter value meaning "do not filter by status".
pub const ALL_STATUSES: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Integer(n) => write!(f, "{n}"),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

/// A set of field changes. `None` removes the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    changes: Vec<(String, Option<FilterValue>)>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.changes.push((key.into(), Some(value.into())));
        self
    }

    pub fn clear(mut self, key: impl Into<String>) -> Self {
        self.changes.push((key.into(), None));
        self
    }

    /// Set `key` when `value` is present, remove it otherwise.
    pub fn set_opt<V: Into<FilterValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self.clear(key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    page: u32,
    page_size: Option<u32>,
    fields: BTreeMap<String, FilterValue>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            fields: BTreeMap::new(),
        }
    }
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `patch` and return to the first page.
    pub fn apply(&mut self, patch: FilterPatch) {
        for (key, value) in patch.changes {
            match value {
                Some(value) => {
                    self.fields.insert(key, value);
                }
                None => {
                    self.fields.remove(&key);
                }
            }
        }
        self.page = 1;
    }

    /// Move the page cursor, leaving every other field untouched.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Query pairs for the list request. A status of `all` is left out.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![(PAGE_KEY.to_string(), self.page.to_string())];
        if let Some(size) = self.page_size {
            query.push((PAGE_SIZE_KEY.to_string(), size.to_string()));
        }
        for (key, value) in &self.fields {
            if key == STATUS_KEY
                && matches!(value, FilterValue::Text(s) if s.eq_ignore_ascii_case(ALL_STATUSES))
            {
                continue;
            }
            query.push((key.clone(), value.to_string()));
        }
        query
    }
}
