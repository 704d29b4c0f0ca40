//! Query-string encoding of [`FilterState`].
//!
//! The same encoding is used for the address bar and for listing requests:
//!
//! | Key | Value |
//! |---|---|
//! | `category_id` | comma-joined ids |
//! | `vendor_id` | comma-joined ids |
//! | `condition` | comma-joined `nuevo` / `usado` |
//! | `max_price` | decimal amount |
//! | `is_new`, `has_discount` | `true`, omitted otherwise |
//! | `search` | trimmed text, omitted when empty |
//! | `page` | omitted when 1 |

use std::fmt;
use std::str::FromStr;

use fatmac_core::{Price, VendorId};
use url::form_urlencoded;

use super::filters::{FilterState, ProductFilters};
use super::selection::Selection;

pub const CATEGORY_KEY: &str = "category_id";
pub const VENDOR_KEY: &str = "vendor_id";
pub const CONDITION_KEY: &str = "condition";
pub const MAX_PRICE_KEY: &str = "max_price";
pub const IS_NEW_KEY: &str = "is_new";
pub const HAS_DISCOUNT_KEY: &str = "has_discount";
pub const SEARCH_KEY: &str = "search";
pub const PAGE_KEY: &str = "page";

/// An ordered query-string mapping.
///
/// Keys are unique; setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2`, with or without a leading `?`.
    ///
    /// Repeated keys keep the first value.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if params.get(&key).is_none() {
                params.pairs.push((key.into_owned(), value.into_owned()));
            }
        }
        params
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key.to_owned(), value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        f.write_str(&serializer.finish())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(&key.into(), value);
        }
        params
    }
}

// =============================================================================
// FilterState <-> QueryParams
// =============================================================================

impl FilterState {
    /// Encode as query parameters. Unset fields are omitted.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let filters = &self.filters;

        if let Some(ids) = join(&filters.category) {
            params.set(CATEGORY_KEY, ids);
        }
        if let Some(ids) = join(&filters.vendor) {
            params.set(VENDOR_KEY, ids);
        }
        if let Some(labels) = join(&filters.condition) {
            params.set(CONDITION_KEY, labels);
        }
        if let Some(max_price) = filters.max_price {
            params.set(MAX_PRICE_KEY, max_price.amount().normalize().to_string());
        }
        if filters.is_new {
            params.set(IS_NEW_KEY, "true");
        }
        if filters.has_discount {
            params.set(HAS_DISCOUNT_KEY, "true");
        }

        let search = self.search.trim();
        if !search.is_empty() {
            params.set(SEARCH_KEY, search);
        }
        if self.page > 1 {
            params.set(PAGE_KEY, self.page.to_string());
        }
        params
    }

    /// Decode query parameters. Anything unparsable is treated as unset.
    #[must_use]
    pub fn from_query(params: &QueryParams) -> Self {
        let max_price = params
            .get(MAX_PRICE_KEY)
            .and_then(|raw| raw.parse::<Price>().ok());

        let filters = ProductFilters {
            category: split(params.get(CATEGORY_KEY)),
            vendor: split::<VendorId>(params.get(VENDOR_KEY)),
            condition: split(params.get(CONDITION_KEY)),
            max_price: None,
            is_new: is_true(params.get(IS_NEW_KEY)),
            has_discount: is_true(params.get(HAS_DISCOUNT_KEY)),
        }
        .with_max_price(max_price);

        let page = params
            .get(PAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);

        Self::new(filters, params.get(SEARCH_KEY).unwrap_or_default(), page)
    }
}

fn join<T: fmt::Display + PartialEq>(selection: &Selection<T>) -> Option<String> {
    let values = selection.as_slice();
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Comma-split a multi-value parameter, dropping fragments that fail to parse.
fn split<T: FromStr + PartialEq>(raw: Option<&str>) -> Selection<T> {
    raw.map_or(Selection::None, |raw| {
        Selection::from_values(raw.split(',').filter_map(|part| part.trim().parse().ok()))
    })
}

fn is_true(raw: Option<&str>) -> bool {
    raw == Some("true")
}
