//! `bugzilla query`

use crate::cli::Session;
use anyhow::Context;
use bugzilla::{format, OutputMode, QueryBuilder, QueryExecutor, QueryOptions};
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Product name (repeatable, comma-separated)
    #[arg(short = 'p', long)]
    pub product: Vec<String>,

    /// Component name (repeatable, comma-separated)
    #[arg(short = 'c', long)]
    pub component: Vec<String>,

    /// Product version (repeatable, comma-separated)
    #[arg(short = 'v', long)]
    pub version: Vec<String>,

    /// Status list, or one of ALL, OPEN, DEV, QE, EOL
    #[arg(short = 's', long = "bug_status", value_name = "STATUS")]
    pub bug_status: Option<String>,

    /// Bug id or alias (repeatable, comma-separated)
    #[arg(short = 'b', long = "bug_id", value_name = "ID")]
    pub bug_id: Vec<String>,

    /// Package build the bug was fixed in
    #[arg(long = "fixed_in", value_name = "TAG")]
    pub fixed_in: Option<String>,

    /// Replay the search encoded in a buglist.cgi URL
    #[arg(long = "from-url", alias = "from_url", value_name = "URL", conflicts_with_all = ["product", "component", "version", "bug_status", "bug_id", "fixed_in"])]
    pub from_url: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output mode flags; at most one may be given.
#[derive(Args, Debug, Clone, Default)]
#[group(id = "output_mode", multiple = false)]
pub struct OutputArgs {
    /// Print only bug ids
    #[arg(long)]
    pub ids: bool,

    /// Print every field of each bug
    #[arg(long)]
    pub full: bool,

    /// Print one line per bug plus populated extra fields
    #[arg(long)]
    pub extra: bool,

    /// Print the attributes exactly as the server sent them
    #[arg(long)]
    pub raw: bool,

    /// Print a header and one compact line per bug
    #[arg(long)]
    pub oneline: bool,

    /// Print each bug through a template such as "%{bug_id} %{summary}"
    #[arg(long, value_name = "FORMAT")]
    pub outputformat: Option<String>,
}

impl OutputArgs {
    pub fn mode(&self) -> OutputMode {
        if let Some(template) = &self.outputformat {
            OutputMode::Template(template.clone())
        } else if self.ids {
            OutputMode::Ids
        } else if self.full {
            OutputMode::Full
        } else if self.extra {
            OutputMode::Extra
        } else if self.raw {
            OutputMode::Raw
        } else if self.oneline {
            OutputMode::Oneline
        } else {
            OutputMode::Normal
        }
    }
}

impl QueryArgs {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            product: self.product.clone(),
            component: self.component.clone(),
            version: self.version.clone(),
            bug_status: self.bug_status.clone(),
            bug_id: self.bug_id.clone(),
            fixed_in: self.fixed_in.clone(),
        }
    }
}

/// Run the query and render the result.
pub fn handle(session: &Session, args: &QueryArgs) -> anyhow::Result<String> {
    let builder = QueryBuilder::new(session.closed_status()?);
    let request = match &args.from_url {
        Some(url) => builder
            .from_url(url)
            .with_context(|| format!("Cannot replay saved search {}", url))?,
        None => builder.from_options(&args.options()),
    };

    let bugs = QueryExecutor::new(session.adapter())
        .execute(request)
        .with_context(|| format!("Query against {} failed", session.url()))?;

    Ok(format::render(&bugs, &args.output.mode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn query_args(args: &[&str]) -> QueryArgs {
        let argv = ["bugzilla", "query"].iter().chain(args.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Query(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_repeatable_filters() {
        let args = query_args(&[
            "--product", "Fedora", "--component", "python-bugzilla", "-c", "virt-manager",
            "--version", "14", "--bug_status", "OPEN",
        ]);
        let options = args.options();
        assert_eq!(options.product, vec!["Fedora"]);
        assert_eq!(options.component, vec!["python-bugzilla", "virt-manager"]);
        assert_eq!(options.version, vec!["14"]);
        assert_eq!(options.bug_status.as_deref(), Some("OPEN"));
        assert_eq!(args.output.mode(), OutputMode::Normal);
    }

    #[test]
    fn test_output_modes() {
        assert_eq!(query_args(&["--ids"]).output.mode(), OutputMode::Ids);
        assert_eq!(query_args(&["--full"]).output.mode(), OutputMode::Full);
        assert_eq!(query_args(&["--extra"]).output.mode(), OutputMode::Extra);
        assert_eq!(query_args(&["--raw"]).output.mode(), OutputMode::Raw);
        assert_eq!(query_args(&["--oneline"]).output.mode(), OutputMode::Oneline);
        assert_eq!(
            query_args(&["--outputformat", "%{bug_id}"]).output.mode(),
            OutputMode::Template("%{bug_id}".into())
        );
    }

    #[test]
    fn test_output_modes_are_exclusive() {
        let err = Cli::try_parse_from(["bugzilla", "query", "--ids", "--full"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let err = Cli::try_parse_from(["bugzilla", "query", "--raw", "--outputformat", "%{id}"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_from_url_excludes_filters() {
        let err = Cli::try_parse_from([
            "bugzilla",
            "query",
            "--from-url",
            "https://bugzilla.redhat.com/buglist.cgi?product=Fedora",
            "--product",
            "RHEL",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let args = query_args(&["--from_url", "https://bugzilla.redhat.com/buglist.cgi?product=Fedora"]);
        assert!(args.from_url.is_some());
    }
}
