//! Red Hat's extended Bugzilla.
//!
//! Same RPC surface as 4.x, plus flags, three extra whiteboards and a
//! per-component default assignee.

use super::g3::{modern_nested_names, modern_product_names, modern_search_params, FIXED_IN_FIELD};
use super::{products, Dialect};
use crate::bug::FieldTable;
use crate::error::Result;
use crate::generation::Generation;
use crate::query::QueryRequest;
use crate::transport::Transport;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

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
    ("devel_whiteboard", "devel_whiteboard"),
    ("internal_whiteboard", "internal_whiteboard"),
    ("qa_whiteboard", "qa_whiteboard"),
    ("fixed_in", FIXED_IN_FIELD),
    ("flags", "flags"),
    ("creation_time", "creation_time"),
    ("last_change_time", "last_change_time"),
]);

#[derive(Debug, Clone, Copy, Default)]
pub struct RhBugzilla;

impl Dialect for RhBugzilla {
    fn generation(&self) -> Generation {
        Generation::Gx
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

    fn component_owners(
        &self,
        rpc: &dyn Transport,
        product: &str,
    ) -> Result<BTreeMap<String, String>> {
        let Some(record) = products::product_by_name(rpc, product, &["name", "components"])? else {
            return Ok(BTreeMap::new());
        };

        let components = match record.get("components") {
            None | Some(Value::Null) => return Ok(BTreeMap::new()),
            Some(Value::Array(components)) => components,
            Some(_) => return Err(products::malformed("Product.get", "components")),
        };

        components
            .iter()
            .map(|component| {
                let name = component.get("name").and_then(Value::as_str);
                let owner = component.get("default_assigned_to").and_then(Value::as_str);
                match (name, owner) {
                    (Some(name), Some(owner)) => Ok((name.to_string(), owner.to_string())),
                    _ => Err(products::malformed("Product.get", "components")),
                }
            })
            .collect()
    }
}
