//! Protocol generations and the operations each one supports.

use crate::error::{BugzillaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A version tier of the Bugzilla XML-RPC surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Bugzilla 3.0 / 3.2. No server-side search.
    G1,
    /// Bugzilla 3.4 / 3.6. Search, but bug data comes back as a raw dump.
    G2,
    /// Bugzilla 4.x and later.
    G3,
    /// Red Hat's extended Bugzilla.
    Gx,
}

impl Generation {
    pub const ALL: [Generation; 4] = [
        Generation::G1,
        Generation::G2,
        Generation::G3,
        Generation::Gx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3 => "G3",
            Self::Gx => "GX",
        }
    }

    /// Operations this generation can perform. Fixed per generation; never
    /// negotiated with the server.
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Self::G1 => CapabilitySet(&[
                Operation::InfoProducts,
                Operation::InfoComponents,
                Operation::InfoVersions,
            ]),
            Self::G2 => CapabilitySet(&[
                Operation::Query,
                Operation::InfoProducts,
                Operation::InfoComponents,
                Operation::InfoVersions,
            ]),
            Self::G3 => CapabilitySet(&[
                Operation::Query,
                Operation::FixedInFilter,
                Operation::SavedSearchReplay,
                Operation::InfoProducts,
                Operation::InfoComponents,
                Operation::InfoVersions,
            ]),
            Self::Gx => CapabilitySet(&[
                Operation::Query,
                Operation::FixedInFilter,
                Operation::SavedSearchReplay,
                Operation::InfoProducts,
                Operation::InfoComponents,
                Operation::InfoVersions,
                Operation::InfoComponentOwners,
            ]),
        }
    }

    /// Map a `Bugzilla.version` string to a generation.
    ///
    /// The vendor generation cannot be recognized from a version number, so
    /// this only ever yields G1, G2 or G3.
    pub fn from_server_version(version: &str) -> Result<Self> {
        let mut parts = version.trim().split(|c: char| c == '.' || c == '-' || c == '+');
        let major = parts.next().and_then(|p| p.parse::<u32>().ok());
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(0);

        match (major, minor) {
            (Some(3), minor) if minor < 4 => Ok(Self::G1),
            (Some(3), _) => Ok(Self::G2),
            (Some(major), _) if major >= 4 => Ok(Self::G3),
            (Some(_), _) => Err(BugzillaError::InvalidRequest(format!(
                "Bugzilla {} has no XML-RPC interface",
                version
            ))),
            (None, _) => Err(BugzillaError::InvalidRequest(format!(
                "Unrecognized server version: {:?}",
                version
            ))),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Generation {
    type Err = BugzillaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "g1" | "bugzilla32" | "bugzilla3" => Ok(Self::G1),
            "g2" | "bugzilla34" => Ok(Self::G2),
            "g3" | "bugzilla4" => Ok(Self::G3),
            "gx" | "rhbugzilla" | "redhat" => Ok(Self::Gx),
            other => Err(BugzillaError::InvalidRequest(format!(
                "Unknown generation: {}",
                other
            ))),
        }
    }
}

/// Operations an adapter may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    /// `fixed_in` filtering inside a query.
    FixedInFilter,
    /// Replaying a saved-search URL inside a query.
    SavedSearchReplay,
    InfoProducts,
    InfoComponents,
    InfoVersions,
    InfoComponentOwners,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::FixedInFilter => "fixed_in filtering",
            Self::SavedSearchReplay => "saved-search replay",
            Self::InfoProducts => "product listing",
            Self::InfoComponents => "component listing",
            Self::InfoVersions => "version listing",
            Self::InfoComponentOwners => "component owner listing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed list of operations one generation supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet(&'static [Operation]);

impl CapabilitySet {
    pub fn contains(&self, operation: Operation) -> bool {
        self.0.contains(&operation)
    }

    pub fn operations(&self) -> &'static [Operation] {
        self.0
    }
}
