//! Product, component, version and owner lookups.

use crate::adapter::ProtocolAdapter;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

/// What to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoRequest {
    Products,
    Components(String),
    Versions(String),
    ComponentOwners(String),
}

/// Result of an info lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoResult {
    /// Names in server order.
    Names(Vec<String>),
    /// Component to default assignee, sorted by component.
    Owners(BTreeMap<String, String>),
}

impl InfoResult {
    pub fn len(&self) -> usize {
        match self {
            InfoResult::Names(names) => names.len(),
            InfoResult::Owners(owners) => owners.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One entry per line; owners as `component: owner`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            InfoResult::Names(names) => {
                for name in names {
                    let _ = writeln!(out, "{}", name);
                }
            }
            InfoResult::Owners(owners) => {
                for (component, owner) in owners {
                    let _ = writeln!(out, "{}: {}", component, owner);
                }
            }
        }
        out
    }
}

/// Run one info lookup.
pub fn lookup(adapter: &ProtocolAdapter, request: &InfoRequest) -> Result<InfoResult> {
    let result = match request {
        InfoRequest::Products => InfoResult::Names(adapter.info_products()?),
        InfoRequest::Components(product) => InfoResult::Names(adapter.info_components(product)?),
        InfoRequest::Versions(product) => InfoResult::Names(adapter.info_versions(product)?),
        InfoRequest::ComponentOwners(product) => {
            InfoResult::Owners(adapter.info_component_owners(product)?)
        }
    };
    debug!(request = ?request, entries = result.len(), "Info lookup complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Generation;
    use crate::testing::{fixtures, MockTransport};

    #[test]
    fn test_owner_rendering() {
        let transport = MockTransport::new().respond("Product.get", fixtures::redhat_virt_tools());
        let adapter = ProtocolAdapter::new(Generation::Gx, fixtures::REDHAT_URL, transport);

        let result = lookup(
            &adapter,
            &InfoRequest::ComponentOwners("Virtualization Tools".into()),
        )
        .unwrap();
        let rendered = result.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "libvirt: Libvirt Maintainers",
                "virt-manager: crobinso@redhat.com",
                "virtinst: crobinso@redhat.com"
            ]
        );
    }

    #[test]
    fn test_kernel_products_and_owners() {
        let transport = MockTransport::new()
            .respond("Product.get_accessible_products", fixtures::accessible_products(&[1, 2, 3]))
            .respond("Product.get_products", fixtures::kernel_products());
        let adapter = ProtocolAdapter::new(Generation::G1, fixtures::KERNEL_URL, transport);

        let products = lookup(&adapter, &InfoRequest::Products).unwrap();
        assert!(products.render().lines().any(|line| line == "Virtualization"));

        let err = lookup(&adapter, &InfoRequest::ComponentOwners("Virtualization".into()))
            .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_fedora_versions() {
        let transport = MockTransport::new().respond("Product.get", fixtures::redhat_fedora_versions());
        let adapter = ProtocolAdapter::new(Generation::Gx, fixtures::REDHAT_URL, transport);

        let versions = lookup(&adapter, &InfoRequest::Versions("Fedora".into())).unwrap();
        assert_eq!(versions.render(), "rawhide\n14\n13\n12\n");
    }

    #[test]
    fn test_empty_result_renders_nothing() {
        assert_eq!(InfoResult::Names(Vec::new()).render(), "");
        assert!(InfoResult::Owners(BTreeMap::new()).is_empty());
    }
}
