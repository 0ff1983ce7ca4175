//! Protocol adapters, one dialect per server generation.
//!
//! Every generation speaks a slightly different XML-RPC surface. The
//! differences live in [`Dialect`] implementations:
//! - **G1** ([`Bugzilla32`]) - product/component listings only, no search
//! - **G2** ([`Bugzilla34`]) - `Bug.search`, bug data as a flattened raw dump
//! - **G3** ([`Bugzilla4`]) - full filter set, `fixed_in`, saved-search replay
//! - **GX** ([`RhBugzilla`]) - G3 plus flags, extra whiteboards and the
//!   component owner directory
//!
//! Callers only ever hold a [`ProtocolAdapter`], which picks its dialect once
//! at construction and refuses unsupported operations before any RPC is sent.

pub mod g1;
pub mod g2;
pub mod g3;
pub mod gx;
mod products;

pub use g1::Bugzilla32;
pub use g2::Bugzilla34;
pub use g3::Bugzilla4;
pub use gx::RhBugzilla;

use crate::bug::{BugRecord, FieldTable};
use crate::error::{BugzillaError, Result};
use crate::generation::{CapabilitySet, Generation, Operation};
use crate::query::QueryRequest;
use crate::transport::Transport;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Generation-specific request shaping and response parsing.
pub trait Dialect: Send + Sync {
    fn generation(&self) -> Generation;

    fn capabilities(&self) -> CapabilitySet {
        self.generation().capabilities()
    }

    /// Canonical-to-native field translation for bug records.
    fn field_table(&self) -> &'static FieldTable;

    /// `Bug.search` parameters for a uniform request.
    fn search_params(&self, _request: &QueryRequest) -> Result<Map<String, Value>> {
        Err(BugzillaError::unsupported(Operation::Query, self.generation()))
    }

    /// Native attribute maps of the bugs in a `Bug.search` response.
    fn native_bugs(&self, response: Value) -> Result<Vec<Map<String, Value>>> {
        bug_structs(response)
    }

    fn product_names(&self, rpc: &dyn Transport) -> Result<Vec<String>>;

    fn component_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>>;

    fn version_names(&self, rpc: &dyn Transport, product: &str) -> Result<Vec<String>>;

    fn component_owners(
        &self,
        _rpc: &dyn Transport,
        _product: &str,
    ) -> Result<BTreeMap<String, String>> {
        Err(BugzillaError::unsupported(
            Operation::InfoComponentOwners,
            self.generation(),
        ))
    }
}

static G1: Bugzilla32 = Bugzilla32;
static G2: Bugzilla34 = Bugzilla34;
static G3: Bugzilla4 = Bugzilla4;
static GX: RhBugzilla = RhBugzilla;

/// The dialect implementing a generation.
pub fn dialect(generation: Generation) -> &'static dyn Dialect {
    match generation {
        Generation::G1 => &G1,
        Generation::G2 => &G2,
        Generation::G3 => &G3,
        Generation::Gx => &GX,
    }
}

impl Generation {
    pub fn dialect(self) -> &'static dyn Dialect {
        dialect(self)
    }
}

/// A Bugzilla server bound to one generation's dialect.
///
/// Built once per target server and reusable for any number of calls; it
/// holds no mutable state.
pub struct ProtocolAdapter {
    url: String,
    dialect: &'static dyn Dialect,
    transport: Box<dyn Transport>,
}

impl ProtocolAdapter {
    /// Create an adapter for `url` speaking `generation`'s dialect.
    pub fn new<T>(generation: Generation, url: impl Into<String>, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            url: url.into(),
            dialect: generation.dialect(),
            transport: Box::new(transport),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> Generation {
        self.dialect.generation()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.dialect.capabilities()
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.capabilities().contains(operation)
    }

    fn require(&self, operation: Operation) -> Result<()> {
        if self.supports(operation) {
            Ok(())
        } else {
            Err(BugzillaError::unsupported(operation, self.generation()))
        }
    }

    /// Run a search and return the matching bugs in server order.
    pub fn query(&self, request: &QueryRequest) -> Result<Vec<BugRecord>> {
        self.require(Operation::Query)?;
        if request.fixed_in.is_some() {
            self.require(Operation::FixedInFilter)?;
        }
        if request.saved_search.is_some() {
            self.require(Operation::SavedSearchReplay)?;
        }

        let params = self.dialect.search_params(request)?;
        let response = self.transport.call("Bug.search", Value::Object(params))?;
        let natives = self.dialect.native_bugs(response)?;

        let table = self.dialect.field_table();
        let mut seen = HashSet::with_capacity(natives.len());
        let mut bugs = Vec::with_capacity(natives.len());
        for native in natives {
            let bug = BugRecord::from_native(native, table)?;
            if !seen.insert(bug.id()) {
                return Err(BugzillaError::MalformedResponse(format!(
                    "bug {} returned twice",
                    bug.id()
                )));
            }
            bugs.push(bug);
        }

        debug!(
            generation = %self.generation(),
            count = bugs.len(),
            "Normalized search results"
        );
        Ok(bugs)
    }

    /// Names of all products visible to the caller.
    pub fn info_products(&self) -> Result<Vec<String>> {
        self.require(Operation::InfoProducts)?;
        self.dialect.product_names(self.transport.as_ref())
    }

    /// Components of a product; empty when the product is unknown.
    pub fn info_components(&self, product: &str) -> Result<Vec<String>> {
        self.require(Operation::InfoComponents)?;
        self.dialect
            .component_names(self.transport.as_ref(), product)
    }

    /// Versions of a product; empty when the product is unknown.
    pub fn info_versions(&self, product: &str) -> Result<Vec<String>> {
        self.require(Operation::InfoVersions)?;
        self.dialect.version_names(self.transport.as_ref(), product)
    }

    /// Default assignee of each component of a product.
    pub fn info_component_owners(&self, product: &str) -> Result<BTreeMap<String, String>> {
        self.require(Operation::InfoComponentOwners)?;
        self.dialect
            .component_owners(self.transport.as_ref(), product)
    }
}

impl std::fmt::Debug for ProtocolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolAdapter")
            .field("url", &self.url)
            .field("generation", &self.generation())
            .finish()
    }
}

/// Search parameters shared by every generation that can search.
pub(crate) fn uniform_search_params(
    request: &QueryRequest,
    fixed_in_field: Option<&str>,
) -> Map<String, Value> {
    let mut params = Map::new();
    let lists = [
        ("product", &request.product),
        ("component", &request.component),
        ("version", &request.version),
        ("status", &request.bug_status),
    ];
    for (name, values) in lists {
        if !values.is_empty() {
            params.insert(
                name.to_string(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
    }

    if !request.bug_id.is_empty() {
        let ids = request
            .bug_id
            .iter()
            .map(|id| match id.parse::<i64>() {
                Ok(numeric) => Value::from(numeric),
                Err(_) => Value::String(id.clone()),
            })
            .collect();
        params.insert("id".to_string(), Value::Array(ids));
    }

    if let (Some(field), Some(fixed_in)) = (fixed_in_field, &request.fixed_in) {
        params.insert(field.to_string(), Value::String(fixed_in.clone()));
    }

    params
}

/// The `bugs` array of a search response, each entry a struct.
pub(crate) fn bug_structs(response: Value) -> Result<Vec<Map<String, Value>>> {
    let Value::Object(mut response) = response else {
        return Err(BugzillaError::MalformedResponse(
            "search response is not a struct".to_string(),
        ));
    };

    let Some(Value::Array(bugs)) = response.remove("bugs") else {
        return Err(BugzillaError::MalformedResponse(
            "search response has no bugs array".to_string(),
        ));
    };

    bugs.into_iter()
        .map(|bug| match bug {
            Value::Object(bug) => Ok(bug),
            other => Err(BugzillaError::MalformedResponse(format!(
                "bug entry is not a struct: {}",
                other
            ))),
        })
        .collect()
}
