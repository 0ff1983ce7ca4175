//! Bugzilla 4.x and later.

use super::{products, uniform_search_params, Dialect};
use crate::bug::FieldTable;
use crate::error::Result;
use crate::generation::Generation;
use crate::query::QueryRequest;
use crate::transport::Transport;
use serde_json::{Map, Value};

pub(crate) const FIXED_IN_FIELD: &str = "cf_fixed_in";

const FIELDS: FieldTable = FieldTable::new(&[
    ("id", "id"),
    ("summary", "summary"),
    ("status", "status"),
    ("resolution", "resolution"),
    ("product", "product"),
    ("component", "component"),
    ("version", "version"),
    ("platform", "platform"),
    ("op_sys", "op_sys"),
    ("severity", "severity"),
    ("priority", "priority"),
    ("assigned_to", "assigned_to"),
    ("reporter", "creator"),
    ("qa_contact", "qa_contact"),
    ("target_milestone", "target_milestone"),
    ("keywords", "keywords"),
    ("cc", "cc"),
    ("blocks", "blocks"),
    ("depends_on", "depends_on"),
    ("url", "url"),
    ("whiteboard", "whiteboard"),
    ("fixed_in", FIXED_IN_FIELD),
    ("creation_time", "creation_time"),
    ("last_change_time", "last_change_time"),
]);

#[derive(Debug, Clone, Copy, Default)]
pub struct Bugzilla4;

/// Search parameters for 4.x servers. A saved search is replayed as-is and
/// replaces every other filter.
pub(crate) fn modern_search_params(request: &QueryRequest) -> Map<String, Value> {
    match &request.saved_search {
        Some(saved) => saved.to_params(),
        None => uniform_search_params(request, Some(FIXED_IN_FIELD)),
    }
}

pub(crate) fn modern_product_names(rpc: &dyn Transport) -> Result<Vec<String>> {
    let found = products::accessible_products(rpc, "Product.get", Some(&["name"][..]))?;
    products::names("Product.get", &found)
}

pub(crate) fn modern_nested_names(
    rpc: &dyn Transport,
    product: &str,
    key: &str,
) -> Result<Vec<String>> {
    match products::product_by_name(rpc, product, &["name", key])? {
        Some(record) => products::nested_names(&record, key),
        None => Ok(Vec::new()),
    }
}

impl Dialect for Bugzilla4 {
    fn generation(&self) -> Generation {
        Generation::G3
    }

    fn field_table(&self) -> &'static FieldTable {
        &FIELDS
    }

    fn search_params(&self, request: &QueryRequest) -> Result<Map<String, Value>> {
        Ok(modern_search_params(request))
    }

    fn product_names(&self, rpc: &dyn Transport) -> Result<Vec<String>> {
        modern_product_names(rpc)
    }

    fn component_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        modern_nested_names(rpc, product, "components")
    }

    fn version_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        modern_nested_names(rpc, product, "versions")
    }
}
