//! Product, component and version lookups shared between dialects.
//!
//! Two families exist. Pre-4.0 servers only know products by id, so a name
//! has to be resolved against the accessible product list first and
//! components/versions come from `Bug.legal_values`. 4.x servers accept
//! product names in `Product.get` and return components and versions inline.

use crate::error::{BugzillaError, Result};
use crate::transport::Transport;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Ids of every product the caller can see.
fn accessible_product_ids(rpc: &dyn Transport) -> Result<Vec<Value>> {
    let response = rpc.call("Product.get_accessible_products", json!({}))?;
    match response.get("ids") {
        Some(Value::Array(ids)) => Ok(ids.clone()),
        _ => Err(malformed("Product.get_accessible_products", "ids")),
    }
}

/// Full product structs for every accessible product.
///
/// `get_method` is `Product.get_products` on 3.0/3.2 and `Product.get`
/// afterwards.
pub(crate) fn accessible_products(
    rpc: &dyn Transport,
    get_method: &str,
    include_fields: Option<&[&str]>,
) -> Result<Vec<Map<String, Value>>> {
    let ids = accessible_product_ids(rpc)?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut params = Map::new();
    params.insert("ids".to_string(), Value::Array(ids));
    if let Some(fields) = include_fields {
        params.insert("include_fields".to_string(), json!(fields));
    }

    let response = rpc.call(get_method, Value::Object(params))?;
    products_of(get_method, response)
}

/// Names of a list of product structs, in response order.
pub(crate) fn names(method: &str, products: &[Map<String, Value>]) -> Result<Vec<String>> {
    products
        .iter()
        .map(|product| {
            product
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| malformed(method, "name"))
        })
        .collect()
}

/// Look a product up by name among the accessible ones.
pub(crate) fn find_accessible(
    rpc: &dyn Transport,
    get_method: &str,
    name: &str,
) -> Result<Option<Map<String, Value>>> {
    let found = accessible_products(rpc, get_method, None)?
        .into_iter()
        .find(|product| product.get("name").and_then(Value::as_str) == Some(name));
    if found.is_none() {
        debug!(product = name, "Product not found among accessible products");
    }
    Ok(found)
}

/// `Bug.legal_values` for a field of one product.
pub(crate) fn legal_values(
    rpc: &dyn Transport,
    field: &str,
    product: &Map<String, Value>,
) -> Result<Vec<String>> {
    let product_id = product
        .get("id")
        .cloned()
        .ok_or_else(|| malformed("Product.get", "id"))?;

    let response = rpc.call(
        "Bug.legal_values",
        json!({"field": field, "product_id": product_id}),
    )?;

    match response.get("values") {
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed("Bug.legal_values", "values"))
            })
            .collect(),
        _ => Err(malformed("Bug.legal_values", "values")),
    }
}

/// One product fetched by name with `Product.get` (4.x servers).
pub(crate) fn product_by_name(
    rpc: &dyn Transport,
    name: &str,
    include_fields: &[&str],
) -> Result<Option<Map<String, Value>>> {
    let response = rpc.call(
        "Product.get",
        json!({"names": [name], "include_fields": include_fields}),
    )?;
    let found = products_of("Product.get", response)?
        .into_iter()
        .find(|product| product.get("name").and_then(Value::as_str) == Some(name));
    if found.is_none() {
        debug!(product = name, "Product.get returned no matching product");
    }
    Ok(found)
}

/// `name` of each struct in a product's nested list (`components`,
/// `versions`). A missing list is treated as empty.
pub(crate) fn nested_names(product: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match product.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                Value::Object(entry) => entry
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| malformed("Product.get", key)),
                Value::String(name) => Ok(name.clone()),
                _ => Err(malformed("Product.get", key)),
            })
            .collect(),
        Some(_) => Err(malformed("Product.get", key)),
    }
}

fn products_of(method: &str, response: Value) -> Result<Vec<Map<String, Value>>> {
    match response {
        Value::Object(mut response) => match response.remove("products") {
            Some(Value::Array(products)) => products
                .into_iter()
                .map(|product| match product {
                    Value::Object(product) => Ok(product),
                    _ => Err(malformed(method, "products")),
                })
                .collect(),
            _ => Err(malformed(method, "products")),
        },
        _ => Err(malformed(method, "products")),
    }
}

pub(crate) fn malformed(method: &str, field: &str) -> BugzillaError {
    BugzillaError::MalformedResponse(format!("{} response lacks a usable {}", method, field))
}
