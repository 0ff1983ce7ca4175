//! Command line surface and command dispatch.
//!
//! Handlers render their whole output into a `String`; the binary writes it
//! to stdout only once the command has succeeded.

pub mod info;
pub mod query;

use crate::config::BugzillaConfig;
use crate::error::{CliError, Result};
use bugzilla::{
    endpoint_url, origin_endpoint, server_host, AdapterResolver, BugzillaError, Generation,
    HttpTransport, ProtocolAdapter, Transport,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

pub use info::InfoArgs;
pub use query::{OutputArgs, QueryArgs};

#[derive(Parser, Debug)]
#[command(name = "bugzilla")]
#[command(about = "Query Bugzilla servers from the command line", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = crate::version::LONG_VERSION)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after the subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Bugzilla server: a host name or an XML-RPC URL
    #[arg(long = "bugzilla", env = "BUGZILLA_URL", global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Skip detection and use this protocol generation (g1, g2, g3, gx)
    #[arg(long, global = true, value_name = "GENERATION")]
    pub generation: Option<Generation>,

    /// Extra configuration file, applied last
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products, components, versions or component owners
    Info(InfoArgs),

    /// Search for bugs
    Query(QueryArgs),
}

impl Command {
    /// The saved-search URL being replayed, if any.
    pub fn saved_search_url(&self) -> Option<&str> {
        match self {
            Command::Query(args) => args.from_url.as_deref(),
            Command::Info(_) => None,
        }
    }
}

/// A resolved server: adapter plus the resolver that picked it.
pub struct Session {
    url: String,
    resolver: AdapterResolver,
    adapter: ProtocolAdapter,
}

impl Session {
    /// Connect over HTTP to the server `command` should talk to.
    pub fn connect(global: &GlobalArgs, command: &Command, config: &BugzillaConfig) -> Result<Self> {
        let url = server_url(global, config, command.saved_search_url())?;
        let transport = HttpTransport::new(config.transport_config(&url, global.timeout))?;
        Self::open(url, global.generation, config, transport)
    }

    /// Same as [`Session::connect`] over a caller-supplied transport.
    pub fn with_transport<T>(
        global: &GlobalArgs,
        command: &Command,
        config: &BugzillaConfig,
        transport: T,
    ) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let url = server_url(global, config, command.saved_search_url())?;
        Self::open(url, global.generation, config, transport)
    }

    fn open<T>(
        url: String,
        generation: Option<Generation>,
        config: &BugzillaConfig,
        transport: T,
    ) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let resolver = config.resolver();
        let adapter = resolver.resolve(&url, generation, transport)?;
        Ok(Self {
            url,
            resolver,
            adapter,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn adapter(&self) -> &ProtocolAdapter {
        &self.adapter
    }

    /// Statuses applied when a query names none.
    pub fn closed_status(&self) -> Result<Vec<String>> {
        Ok(self.resolver.closed_status_for(&self.url)?)
    }
}

/// The XML-RPC endpoint to talk to.
///
/// `--bugzilla` wins, then the server a replayed saved search came from,
/// then `default_url`. A `--bugzilla` naming another host than the saved
/// search is rejected rather than replaying foreign parameters.
pub fn server_url(
    global: &GlobalArgs,
    config: &BugzillaConfig,
    saved_search: Option<&str>,
) -> Result<String> {
    let explicit = non_blank(global.url.as_deref());
    let origin = saved_search.map(origin_endpoint).transpose()?;

    let url = match (explicit, origin) {
        (Some(explicit), Some(origin)) => {
            let url = endpoint_url(explicit)?;
            if server_host(&url)? != server_host(&origin)? {
                return Err(BugzillaError::InvalidRequest(format!(
                    "saved search belongs to {}, not {}",
                    origin, url
                ))
                .into());
            }
            url
        }
        (Some(explicit), None) => endpoint_url(explicit)?,
        (None, Some(origin)) => origin,
        (None, None) => {
            let configured = non_blank(config.default_url.as_deref()).ok_or(CliError::NoServer)?;
            endpoint_url(configured)?
        }
    };
    debug!(url = %url, "Using Bugzilla endpoint");
    Ok(url)
}

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.filter(|url| !url.trim().is_empty())
}

/// Run a parsed command and return what it prints.
pub fn run(command: &Command, session: &Session) -> anyhow::Result<String> {
    match command {
        Command::Info(args) => info::handle(session, args),
        Command::Query(args) => query::handle(session, args),
    }
}
