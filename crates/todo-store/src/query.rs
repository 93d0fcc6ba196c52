//! Search query builder.
//!
//! A [`SearchQuery`] is a conjunction of typed [`Filter`]s plus a page. It is
//! built either directly or from the string map the HTTP layer receives, and
//! [`SearchQuery::build`] turns it into SQL with positional `?` placeholders.
//! Filter values never appear in the SQL text.

use std::collections::HashMap;

use rusqlite::types::Value;
use todo_core::search::{
    ADDED_ON_FROM, ADDED_ON_TO, DUE_BY_FROM, DUE_BY_TO, ID, PAGE, PER_PAGE, STATUS,
};

use crate::error::{Result, StoreError};
use crate::pagination::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, normalize_page, normalize_per_page, offset, page_or_default,
    per_page_or_default,
};

/// One search predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// `id = ?`
    Id(i64),
    /// `status = ?`
    Status(String),
    /// `addedOn >= ?`
    AddedOnFrom(i64),
    /// `addedOn <= ?`
    AddedOnTo(i64),
    /// `dueBy >= ?`
    DueByFrom(i64),
    /// `dueBy <= ?`
    DueByTo(i64),
}

impl Filter {
    /// Parse a single `key=value` pair.
    ///
    /// Returns `Ok(None)` for keys that are not filters (unknown keys and the
    /// pagination keys).
    pub fn from_param(key: &str, value: &str) -> Result<Option<Self>> {
        let filter = match key {
            ID => Self::Id(parse_i64(key, value)?),
            STATUS => Self::Status(value.to_string()),
            ADDED_ON_FROM => Self::AddedOnFrom(parse_i64(key, value)?),
            ADDED_ON_TO => Self::AddedOnTo(parse_i64(key, value)?),
            DUE_BY_FROM => Self::DueByFrom(parse_i64(key, value)?),
            DUE_BY_TO => Self::DueByTo(parse_i64(key, value)?),
            _ => return Ok(None),
        };
        Ok(Some(filter))
    }

    /// SQL fragment and the value bound to its placeholder.
    pub fn predicate(&self) -> (&'static str, Value) {
        match self {
            Self::Id(v) => ("id = ?", Value::Integer(*v)),
            Self::Status(v) => ("status = ?", Value::Text(v.clone())),
            Self::AddedOnFrom(v) => ("addedOn >= ?", Value::Integer(*v)),
            Self::AddedOnTo(v) => ("addedOn <= ?", Value::Integer(*v)),
            Self::DueByFrom(v) => ("dueBy >= ?", Value::Integer(*v)),
            Self::DueByTo(v) => ("dueBy <= ?", Value::Integer(*v)),
        }
    }
}

fn parse_i64(key: &str, value: &str) -> Result<i64> {
    value.parse().map_err(|_| StoreError::InvalidFilter {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Keys turned into filters by [`SearchQuery::from_params`], in predicate order.
const FILTER_KEYS: [&str; 6] = [ID, STATUS, ADDED_ON_FROM, ADDED_ON_TO, DUE_BY_FROM, DUE_BY_TO];

/// A paginated conjunction of filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    /// Predicates, joined with `AND`.
    pub filters: Vec<Filter>,
    /// Zero-indexed page.
    pub page: i64,
    /// Page size.
    pub per_page: i64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchQuery {
    /// Empty query: every task, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the page, normalizing out-of-range values.
    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.page = page_or_default(page);
        self
    }

    /// Set the page size, normalizing out-of-range values.
    #[must_use]
    pub fn per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page_or_default(per_page);
        self
    }

    /// Build from the string map received at the HTTP boundary.
    ///
    /// Unknown keys are ignored. A numeric filter that does not parse is
    /// [`StoreError::InvalidFilter`]. Missing or malformed `page`/`perPage`
    /// fall back to their defaults.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let mut filters = Vec::new();
        for key in FILTER_KEYS {
            if let Some(value) = params.get(key) {
                if let Some(filter) = Filter::from_param(key, value)? {
                    filters.push(filter);
                }
            }
        }

        Ok(Self {
            filters,
            page: params.get(PAGE).map_or(DEFAULT_PAGE, |v| normalize_page(v)),
            per_page: params
                .get(PER_PAGE)
                .map_or(DEFAULT_PER_PAGE, |v| normalize_per_page(v)),
        })
    }

    /// Render the statement and its bound values.
    pub fn build(&self) -> BuiltQuery {
        let mut conditions: Vec<&'static str> = Vec::with_capacity(self.filters.len());
        let mut params: Vec<Value> = Vec::with_capacity(self.filters.len() + 2);

        for filter in &self.filters {
            let (sql, value) = filter.predicate();
            conditions.push(sql);
            params.push(value);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let page = page_or_default(self.page);
        let per_page = per_page_or_default(self.per_page);
        params.push(Value::Integer(per_page));
        params.push(Value::Integer(offset(page, per_page)));

        BuiltQuery {
            sql: format!("SELECT * FROM tasks{where_clause} LIMIT ? OFFSET ?"),
            params,
        }
    }
}

/// SQL text with its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltQuery {
    /// Statement with `?` placeholders.
    pub sql: String,
    /// One value per placeholder, in order.
    pub params: Vec<Value>,
}
