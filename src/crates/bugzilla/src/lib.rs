//! # bugzilla - Multi-generation Bugzilla XML-RPC client
//!
//! Talks to Bugzilla servers spanning several protocol generations through a
//! single interface. Each server is bound to one [`Generation`] up front and
//! every operation is checked against that generation's capabilities before
//! anything goes over the wire.
//!
//! ## Generations
//!
//! - **G1** - Bugzilla 3.0/3.2: product, component and version listings
//! - **G2** - Bugzilla 3.4/3.6: adds `Bug.search`
//! - **G3** - Bugzilla 4.x: adds `fixed_in` filtering and saved-search replay
//! - **GX** - Red Hat Bugzilla: adds flags, extra whiteboards, component owners
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bugzilla::{
//!     format, AdapterResolver, HttpTransport, OutputMode, QueryBuilder, QueryExecutor,
//!     QueryOptions, TransportConfig,
//! };
//!
//! # fn example() -> bugzilla::Result<()> {
//! let url = "https://bugzilla.redhat.com/xmlrpc.cgi";
//! let resolver = AdapterResolver::new();
//! let transport = HttpTransport::new(TransportConfig::new(url))?;
//! let adapter = resolver.resolve(url, None, transport)?;
//!
//! let builder = QueryBuilder::new(resolver.closed_status_for(url)?);
//! let request = builder.from_options(&QueryOptions {
//!     product: vec!["Fedora".into()],
//!     component: vec!["python-bugzilla".into()],
//!     ..QueryOptions::default()
//! });
//!
//! let bugs = QueryExecutor::new(&adapter).execute(request)?;
//! print!("{}", format::render(&bugs, &OutputMode::Normal));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod bug;
pub mod config;
pub mod error;
pub mod executor;
pub mod format;
pub mod generation;
pub mod info;
pub mod query;
pub mod resolver;
pub mod testing;
pub mod transport;

pub use adapter::{Dialect, ProtocolAdapter};
pub use bug::{BugRecord, FieldKind, FieldSpec, FieldValue, FIELDS};
pub use config::TransportConfig;
pub use error::{BugzillaError, Result};
pub use executor::QueryExecutor;
pub use format::{render, OutputMode};
pub use generation::{CapabilitySet, Generation, Operation};
pub use info::{lookup, InfoRequest, InfoResult};
pub use query::{QueryBuilder, QueryOptions, QueryRequest, SavedSearch};
pub use resolver::{endpoint_url, origin_endpoint, server_host, AdapterResolver, Deployment};
pub use transport::{HttpTransport, Transport};
