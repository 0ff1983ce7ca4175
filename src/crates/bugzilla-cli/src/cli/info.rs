//! `bugzilla info`

use crate::cli::Session;
use anyhow::Context;
use bugzilla::{info, InfoRequest};
use clap::Args;

/// Exactly one lookup per invocation.
#[derive(Args, Debug, Clone, Default)]
#[group(id = "lookup", required = true, multiple = false)]
pub struct InfoArgs {
    /// List product names
    #[arg(long)]
    pub products: bool,

    /// List the components of a product
    #[arg(long, value_name = "PRODUCT")]
    pub components: Option<String>,

    /// List the versions of a product
    #[arg(long, value_name = "PRODUCT")]
    pub versions: Option<String>,

    /// List the default assignee of each component of a product
    #[arg(long = "component_owners", value_name = "PRODUCT")]
    pub component_owners: Option<String>,
}

impl InfoArgs {
    pub fn request(&self) -> InfoRequest {
        if let Some(product) = &self.components {
            InfoRequest::Components(product.clone())
        } else if let Some(product) = &self.versions {
            InfoRequest::Versions(product.clone())
        } else if let Some(product) = &self.component_owners {
            InfoRequest::ComponentOwners(product.clone())
        } else {
            InfoRequest::Products
        }
    }
}

/// Run the lookup and render one entry per line.
pub fn handle(session: &Session, args: &InfoArgs) -> anyhow::Result<String> {
    let request = args.request();
    let result = info::lookup(session.adapter(), &request)
        .with_context(|| format!("Info lookup against {} failed", session.url()))?;
    Ok(result.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn info_args(args: &[&str]) -> InfoArgs {
        let argv = ["bugzilla", "info"].iter().chain(args.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Info(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_requests() {
        assert_eq!(info_args(&["--products"]).request(), InfoRequest::Products);
        assert_eq!(
            info_args(&["--components", "Virtualization Tools"]).request(),
            InfoRequest::Components("Virtualization Tools".into())
        );
        assert_eq!(
            info_args(&["--versions", "Fedora"]).request(),
            InfoRequest::Versions("Fedora".into())
        );
        assert_eq!(
            info_args(&["--component_owners", "Fedora"]).request(),
            InfoRequest::ComponentOwners("Fedora".into())
        );
    }

    #[test]
    fn test_exactly_one_lookup() {
        assert!(Cli::try_parse_from(["bugzilla", "info"]).is_err());
        assert!(Cli::try_parse_from(["bugzilla", "info", "--products", "--versions", "Fedora"]).is_err());
    }
}
