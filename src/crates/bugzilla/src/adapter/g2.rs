//! Bugzilla 3.4 / 3.6.
//!
//! `Bug.search` exists, but most columns come back inside an `internals`
//! struct that mirrors the database row.

use super::g1::LEGACY_FIELDS;
use super::{bug_structs, products, uniform_search_params, Dialect};
use crate::bug::FieldTable;
use crate::error::{BugzillaError, Result};
use crate::generation::{Generation, Operation};
use crate::query::QueryRequest;
use crate::transport::Transport;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct Bugzilla34;

impl Dialect for Bugzilla34 {
    fn generation(&self) -> Generation {
        Generation::G2
    }

    fn field_table(&self) -> &'static FieldTable {
        &LEGACY_FIELDS
    }

    fn search_params(&self, request: &QueryRequest) -> Result<Map<String, Value>> {
        if request.fixed_in.is_some() {
            return Err(BugzillaError::unsupported(
                Operation::FixedInFilter,
                self.generation(),
            ));
        }
        if request.saved_search.is_some() {
            return Err(BugzillaError::unsupported(
                Operation::SavedSearchReplay,
                self.generation(),
            ));
        }
        Ok(uniform_search_params(request, None))
    }

    fn native_bugs(&self, response: Value) -> Result<Vec<Map<String, Value>>> {
        Ok(bug_structs(response)?.into_iter().map(flatten).collect())
    }

    fn product_names(&self, rpc: &dyn Transport) -> Result<Vec<String>> {
        let found = products::accessible_products(rpc, "Product.get", None)?;
        products::names("Product.get", &found)
    }

    fn component_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        match products::find_accessible(rpc, "Product.get", product)? {
            Some(record) => products::legal_values(rpc, "component", &record),
            None => Ok(Vec::new()),
        }
    }

    fn version_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>> {
        match products::find_accessible(rpc, "Product.get", product)? {
            Some(record) => products::legal_values(rpc, "version", &record),
            None => Ok(Vec::new()),
        }
    }
}

/// Merge `internals` into the top level. Top-level members win on conflict
/// and keep their position; internal-only members follow in their own order.
fn flatten(bug: Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    let mut internals = Map::new();
    for (key, value) in bug {
        match value {
            Value::Object(inner) if key == "internals" => internals = inner,
            value => {
                flat.insert(key, value);
            }
        }
    }
    for (key, value) in internals {
        if !flat.contains_key(&key) {
            flat.insert(key, value);
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ProtocolAdapter;
    use crate::testing::{fixtures, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn gnome_transport() -> Arc<MockTransport> {
        Arc::new(
            MockTransport::new()
                .respond("Product.get_accessible_products", json!({"ids": [463, 464]}))
                .respond(
                    "Product.get",
                    json!({"products": [
                        {"id": 463, "name": "dogtail"},
                        {"id": 464, "name": "gnome-panel"}
                    ]}),
                )
                .respond("Bug.legal_values", json!({"values": ["Sniff", "general"]}))
                .respond("Bug.legal_values", json!({"values": ["0.5.x", "CVS HEAD"]})),
        )
    }

    #[test]
    fn test_flatten_merges_internals() {
        let response = json!({"bugs": [{
            "id": 321654,
            "summary": "Sniff",
            "internals": {
                "bug_id": "321654",
                "summary": "ignored",
                "bug_status": "RESOLVED",
                "version": "CVS HEAD"
            }
        }]});

        let bugs = Bugzilla34.native_bugs(response).unwrap();
        let keys: Vec<&str> = bugs[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "summary", "bug_id", "bug_status", "version"]);
        assert_eq!(bugs[0]["summary"], json!("Sniff"));
        assert_eq!(bugs[0]["version"], json!("CVS HEAD"));
    }

    #[test]
    fn test_query_sub_features_rejected() {
        let fixed_in = QueryRequest {
            fixed_in: Some("1.0".into()),
            ..QueryRequest::default()
        };
        let err = Bugzilla34.search_params(&fixed_in).unwrap_err();
        assert!(matches!(
            err,
            BugzillaError::UnsupportedOperation {
                operation: Operation::FixedInFilter,
                ..
            }
        ));
    }

    #[test]
    fn test_search_params_without_fixed_in() {
        let request = QueryRequest {
            product: ["gnome-panel".to_string()].into(),
            bug_status: ["RESOLVED".to_string()].into(),
            ..QueryRequest::default()
        };
        let params = Bugzilla34.search_params(&request).unwrap();
        assert_eq!(
            Value::Object(params),
            json!({"product": ["gnome-panel"], "status": ["RESOLVED"]})
        );
    }

    #[test]
    fn test_info_lookups_go_through_legal_values() {
        let transport = gnome_transport();
        let adapter = ProtocolAdapter::new(Generation::G2, fixtures::GNOME_URL, transport.clone());

        assert_eq!(adapter.info_products().unwrap(), vec!["dogtail", "gnome-panel"]);
        assert_eq!(adapter.info_components("dogtail").unwrap(), vec!["Sniff", "general"]);
        assert_eq!(adapter.info_versions("dogtail").unwrap(), vec!["0.5.x", "CVS HEAD"]);

        let calls = transport.calls();
        assert_eq!(calls[1], ("Product.get".to_string(), json!({"ids": [463, 464]})));
        let legal: Vec<&Value> = calls
            .iter()
            .filter(|(method, _)| method == "Bug.legal_values")
            .map(|(_, params)| params)
            .collect();
        assert_eq!(
            legal,
            vec![
                &json!({"field": "component", "product_id": 463}),
                &json!({"field": "version", "product_id": 463})
            ]
        );
    }

    #[test]
    fn test_info_unknown_product_is_empty() {
        let transport = gnome_transport();
        let adapter = ProtocolAdapter::new(Generation::G2, fixtures::GNOME_URL, transport.clone());

        assert!(adapter.info_components("no-such-product").unwrap().is_empty());
        assert!(adapter.info_versions("no-such-product").unwrap().is_empty());
        assert!(!transport.methods().iter().any(|m| m == "Bug.legal_values"));
    }
}
