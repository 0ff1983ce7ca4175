//! Runs uniform query requests against an adapter.

use crate::adapter::ProtocolAdapter;
use crate::bug::BugRecord;
use crate::error::{BugzillaError, Result};
use crate::generation::Operation;
use crate::query::QueryRequest;
use std::time::Instant;
use tracing::{debug, info};

/// Executes queries through one adapter. Holds no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    adapter: &'a ProtocolAdapter,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(adapter: &'a ProtocolAdapter) -> Self {
        Self { adapter }
    }

    /// Run `request` and return the bugs in the order the server sent them.
    pub fn execute(&self, request: QueryRequest) -> Result<Vec<BugRecord>> {
        if !self.adapter.supports(Operation::Query) {
            return Err(BugzillaError::unsupported(
                Operation::Query,
                self.adapter.generation(),
            ));
        }

        debug!(
            url = self.adapter.url(),
            saved_search = request.is_saved_search(),
            "Executing query"
        );
        let started = Instant::now();
        let bugs = self.adapter.query(&request)?;

        info!(
            count = bugs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query returned"
        );
        Ok(bugs)
    }
}
