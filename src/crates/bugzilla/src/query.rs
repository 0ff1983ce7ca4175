//! Uniform, generation-agnostic query requests and how to build them.

use crate::error::{BugzillaError, Result};
use reqwest::Url;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Status groups accepted in place of a literal `--bug_status` value.
const STATUS_GROUPS: &[(&str, &[&str])] = &[
    (
        "DEV",
        &["NEW", "ASSIGNED", "NEEDINFO", "ON_DEV", "MODIFIED", "POST", "REOPENED"],
    ),
    ("QE", &["ASSIGNED", "ON_QA", "FAILS_QA", "PASSES_QA"]),
    ("EOL", &["VERIFIED", "RELEASE_PENDING", "CLOSED"]),
    (
        "OPEN",
        &[
            "NEW",
            "ASSIGNED",
            "MODIFIED",
            "ON_DEV",
            "ON_QA",
            "VERIFIED",
            "RELEASE_PENDING",
            "POST",
        ],
    ),
];

/// A query, independent of the server generation that will run it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub product: BTreeSet<String>,
    pub component: BTreeSet<String>,
    pub version: BTreeSet<String>,
    pub bug_status: BTreeSet<String>,
    pub bug_id: BTreeSet<String>,
    pub fixed_in: Option<String>,
    /// Server-native parameters replayed verbatim.
    pub saved_search: Option<SavedSearch>,
}

impl QueryRequest {
    pub fn is_saved_search(&self) -> bool {
        self.saved_search.is_some()
    }
}

/// Query-string parameters of a saved-search URL, in URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSearch {
    pairs: Vec<(String, String)>,
}

impl SavedSearch {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// RPC parameter struct. Keys keep first-appearance order; a key that
    /// appears more than once becomes an array of its values.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        for (key, value) in &self.pairs {
            let value = Value::String(value.clone());
            match params.get_mut(key) {
                None => {
                    params.insert(key.clone(), value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        params
    }
}

/// CLI-level filter options, one `Vec` per repeatable flag.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub product: Vec<String>,
    pub component: Vec<String>,
    pub version: Vec<String>,
    pub bug_status: Option<String>,
    pub bug_id: Vec<String>,
    pub fixed_in: Option<String>,
}

/// Builds [`QueryRequest`]s. The default status set is deployment
/// configuration supplied by the caller.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_status: BTreeSet<String>,
}

impl QueryBuilder {
    pub fn new<I, S>(default_status: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for status in default_status {
            set.extend(split_values(status.as_ref()));
        }
        Self {
            default_status: set,
        }
    }

    pub fn default_status(&self) -> &BTreeSet<String> {
        &self.default_status
    }

    /// Map CLI options onto a request. Repeated and comma-separated values
    /// accumulate into sets.
    pub fn from_options(&self, options: &QueryOptions) -> QueryRequest {
        QueryRequest {
            product: collect(&options.product),
            component: collect(&options.component),
            version: collect(&options.version),
            bug_status: self.status_filter(options.bug_status.as_deref()),
            bug_id: collect(&options.bug_id),
            fixed_in: options
                .fixed_in
                .as_ref()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty()),
            saved_search: None,
        }
    }

    /// Decode a saved-search URL. Parameters are taken verbatim; nothing is
    /// validated and no default status is applied.
    pub fn from_url(&self, url: &str) -> Result<QueryRequest> {
        let parsed = Url::parse(url)
            .map_err(|e| BugzillaError::InvalidRequest(format!("bad URL {}: {}", url, e)))?;

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if pairs.is_empty() {
            return Err(BugzillaError::InvalidRequest(format!(
                "URL has no query parameters: {}",
                url
            )));
        }

        Ok(QueryRequest {
            saved_search: Some(SavedSearch { pairs }),
            ..QueryRequest::default()
        })
    }

    fn status_filter(&self, requested: Option<&str>) -> BTreeSet<String> {
        let Some(requested) = requested.map(str::trim) else {
            return self.default_status.clone();
        };

        if requested.eq_ignore_ascii_case("ALL") {
            return BTreeSet::new();
        }

        if let Some((_, statuses)) = STATUS_GROUPS
            .iter()
            .find(|(group, _)| group.eq_ignore_ascii_case(requested))
        {
            return statuses.iter().map(|s| s.to_string()).collect();
        }

        split_values(requested).collect()
    }
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn collect(values: &[String]) -> BTreeSet<String> {
    values.iter().flat_map(|value| split_values(value)).collect()
}
