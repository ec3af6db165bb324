use std::collections::BTreeMap;

use partilha_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::status::StatusValue;

/// Query parameter carrying the requested page size.
pub const PAGE_SIZE_PARAM: &str = "limit";

const RESERVED_KEYS: &[&str] = &[
    "search",
    "status",
    "regional",
    "state",
    "category",
    "flag",
    "page",
    PAGE_SIZE_PARAM,
];

/// Optional listing constraints supplied by a consumer.
///
/// Every field is optional; an absent or empty field applies no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    /// Free-text search.
    pub search: Option<String>,
    /// Status wire value.
    pub status: Option<String>,
    /// Regional territory identifier or code.
    pub regional: Option<String>,
    /// Two-letter state code.
    pub state: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Entity-specific flag filter.
    pub flag: Option<String>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Requested page size.
    pub page_size: Option<u32>,
    /// Entity-specific scalar filters, emitted in key order.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl FilterSet {
    /// Sets the free-text search.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the status filter from a declared status value.
    #[must_use]
    pub fn with_status<S: StatusValue>(mut self, status: S) -> Self {
        self.status = Some(status.as_str().to_owned());
        self
    }

    /// Sets the page number.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Adds an entity-specific filter.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Builds a filter set from `key=value` style pairs.
    ///
    /// Unknown keys become entity-specific filters.
    pub fn from_pairs<I, K, V>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "search" => filter.search = Some(value),
                "status" => filter.status = Some(value),
                "regional" => filter.regional = Some(value),
                "state" => filter.state = Some(value),
                "category" => filter.category = Some(value),
                "flag" => filter.flag = Some(value),
                "page" => filter.page = Some(parse_number("page", value.as_str())?),
                "limit" | "page_size" => {
                    filter.page_size = Some(parse_number("limit", value.as_str())?);
                }
                other => {
                    filter.extra.insert(other.to_owned(), value);
                }
            }
        }

        Ok(filter)
    }
}

fn parse_number(name: &str, value: &str) -> AppResult<u32> {
    value.trim().parse::<u32>().map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })
}

/// Canonical, ordered query parameters produced from a [`FilterSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    params: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Builds the descriptor for one filter set.
    ///
    /// Parameter order is fixed and empty values are omitted.
    #[must_use]
    pub fn build(filter: &FilterSet) -> Self {
        let mut params = Vec::new();
        let text_fields = [
            ("search", &filter.search),
            ("status", &filter.status),
            ("regional", &filter.regional),
            ("state", &filter.state),
            ("category", &filter.category),
            ("flag", &filter.flag),
        ];

        for (key, value) in text_fields {
            if let Some(value) = value.as_deref().filter(|value| !value.trim().is_empty()) {
                params.push((key.to_owned(), value.to_owned()));
            }
        }

        if let Some(page) = filter.page {
            params.push(("page".to_owned(), page.to_string()));
        }
        if let Some(page_size) = filter.page_size {
            params.push((PAGE_SIZE_PARAM.to_owned(), page_size.to_string()));
        }

        for (key, value) in &filter.extra {
            if key.trim().is_empty()
                || RESERVED_KEYS.contains(&key.as_str())
                || value.trim().is_empty()
            {
                continue;
            }
            params.push((key.clone(), value.clone()));
        }

        Self { params }
    }

    /// Returns the ordered parameters.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns the value of one parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the requested page, when present.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.get("page").and_then(|value| value.parse().ok())
    }

    /// Returns the requested page size, when present.
    #[must_use]
    pub fn page_size(&self) -> Option<u32> {
        self.get(PAGE_SIZE_PARAM).and_then(|value| value.parse().ok())
    }
}
