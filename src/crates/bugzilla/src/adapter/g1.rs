//! Bugzilla 3.0 / 3.2.

use super::{products, Dialect};
use crate::bug::FieldTable;
use crate::error::Result;
use crate::generation::Generation;
use crate::transport::Transport;

/// Canonical-to-native names for 3.x servers, shared with [`super::Bugzilla34`].
pub(crate) const LEGACY_FIELDS: FieldTable = FieldTable::new(&[
    ("id", "id"),
    ("summary", "summary"),
    ("status", "bug_status"),
    ("resolution", "resolution"),
    ("version", "version"),
    ("platform", "rep_platform"),
    ("op_sys", "op_sys"),
    ("severity", "bug_severity"),
    ("priority", "priority"),
    ("assigned_to", "assigned_to"),
    ("reporter", "reporter"),
    ("target_milestone", "target_milestone"),
    ("url", "bug_file_loc"),
    ("whiteboard", "status_whiteboard"),
    ("creation_time", "creation_time"),
    ("last_change_time", "last_change_time"),
]);

const GET_PRODUCTS: &str = "Product.get_products";

/// G1 dialect. No `Bug.search`; the product catalogue is all it offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bugzilla32;

impl Dialect for Bugzilla32 {
    fn generation(&self) -> Generation {
        Generation::G1
    }

    fn field_table(&self) -> &'static FieldTable {
        &LEGACY_FIELDS
    }

    fn product_names(&self, rpc: &dyn Transport) -> Result<Vec<String>> {
        let found = products::accessible_products(rpc, GET_PRODUCTS, None)?;
        products::names(GET_PRODUCTS, &found)
    }

    fn component_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        match products::find_accessible(rpc, GET_PRODUCTS, product)? {
            Some(record) => products::legal_values(rpc, "component", &record),
            None => Ok(Vec::new()),
        }
    }

    // 3.2 has no version listing RPC; some servers still put one on the
    // product record.
    fn version_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        match products::find_accessible(rpc, GET_PRODUCTS, product)? {
            Some(record) => products::nested_names(&record, "versions"),
            None => Ok(Vec::new()),
        }
    }
}
