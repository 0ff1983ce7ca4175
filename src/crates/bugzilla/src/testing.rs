//! Test support: an in-memory transport and canned responses captured from
//! the four reference deployments.
//!
//! ```
//! use bugzilla::testing::{fixtures, MockTransport};
//! use bugzilla::{Generation, ProtocolAdapter, QueryRequest};
//!
//! let transport = MockTransport::new().respond("Bug.search", fixtures::freedesktop_3450());
//! let adapter = ProtocolAdapter::new(Generation::G3, fixtures::FREEDESKTOP_URL, transport);
//! let bugs = adapter.query(&QueryRequest::default()).unwrap();
//! assert_eq!(bugs[0].id(), 3450);
//! ```

use crate::error::{BugzillaError, Result};
use crate::transport::Transport;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Fault { code: i64, message: String },
}

/// Transport answering from canned replies and recording every call.
///
/// Replies queued for the same method are handed out in order; the last one
/// keeps answering once the others are used up. Methods with no reply fail
/// with a fault, the way a server rejects an unknown method.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `method`.
    pub fn respond(self, method: &str, response: Value) -> Self {
        self.push(method, Reply::Value(response));
        self
    }

    /// Queue a fault reply for `method`.
    pub fn fail(self, method: &str, code: i64, message: &str) -> Self {
        self.push(
            method,
            Reply::Fault {
                code,
                message: message.to_string(),
            },
        );
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    /// Names of the methods called so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    fn push(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, method: &str) -> Option<Reply> {
        let mut replies = self.replies.lock();
        let queue = replies.get_mut(method)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for MockTransport {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.calls.lock().push((method.to_string(), params));

        match self.next_reply(method) {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Fault { code, message }) => Err(BugzillaError::Fault { code, message }),
            None => Err(BugzillaError::Fault {
                code: -32601,
                message: format!("Unknown method: {}", method),
            }),
        }
    }
}

/// Responses modeled on what the reference servers return.
pub mod fixtures {
    use serde_json::{json, Value};

    pub const KERNEL_URL: &str = "https://bugzilla.kernel.org/xmlrpc.cgi";
    pub const GNOME_URL: &str = "https://bugzilla.gnome.org/xmlrpc.cgi";
    pub const FREEDESKTOP_URL: &str = "https://bugzilla.freedesktop.org/xmlrpc.cgi";
    pub const REDHAT_URL: &str = "https://bugzilla.redhat.com/xmlrpc.cgi";

    /// `Bug.search` on bugzilla.gnome.org for dogtail/sniff, 3.4 style with
    /// the database row under `internals`.
    pub fn gnome_321654() -> Value {
        json!({"bugs": [{
            "id": 321654,
            "alias": "",
            "summary": "Sniff",
            "creation_time": "2005-11-16 19:46:43",
            "last_change_time": "2006-02-28 17:33:54",
            "internals": {
                "bug_id": "321654",
                "short_desc": "Sniff",
                "product_id": "463",
                "component_id": "4287",
                "bug_status": "RESOLVED",
                "resolution": "FIXED",
                "version": "CVS HEAD",
                "rep_platform": "Other",
                "op_sys": "Linux",
                "bug_severity": "normal",
                "priority": "Normal",
                "assigned_to": "dogtail-maint@gnome.bugs",
                "reporter": "zcerza@redhat.com",
                "target_milestone": "---",
                "bug_file_loc": "",
                "status_whiteboard": "",
                "keywords": "",
                "everconfirmed": "1",
                "reporter_accessible": "1",
                "cclist_accessible": "1",
                "estimated_time": "0.00",
                "remaining_time": "0.00",
                "deadline": null
            }
        }]})
    }

    /// `Bug.search` on bugzilla.freedesktop.org for avahi bug 3450.
    pub fn freedesktop_3450() -> Value {
        json!({"bugs": [{
            "id": 3450,
            "alias": [],
            "summary": "Error compiling avahi-glib with --disable-gtk",
            "status": "RESOLVED",
            "resolution": "FIXED",
            "product": "avahi",
            "component": "libavahi",
            "version": "unspecified",
            "platform": "x86 (IA32)",
            "op_sys": "Linux (All)",
            "severity": "normal",
            "priority": "medium",
            "assigned_to": "daniel@fooishbar.org",
            "creator": "daniel@fooishbar.org",
            "qa_contact": "",
            "target_milestone": "---",
            "keywords": [],
            "cc": ["lennart@poettering.net"],
            "blocks": [],
            "depends_on": [],
            "url": "",
            "whiteboard": "",
            "is_open": false,
            "creation_time": "2005-06-07 21:04:37",
            "last_change_time": "2005-07-25 12:10:02"
        }]})
    }

    /// `Bug.search` on bugzilla.redhat.com for bug 307471, which still
    /// carries an open needinfo request.
    pub fn redhat_307471() -> Value {
        json!({"bugs": [{
            "id": 307471,
            "summary": "bugzilla command line tool should support --bug_status ALL",
            "status": "CLOSED",
            "resolution": "NEXTRELEASE",
            "product": "Fedora",
            "component": "python-bugzilla",
            "version": "7",
            "platform": "All",
            "op_sys": "Linux",
            "severity": "low",
            "priority": "low",
            "assigned_to": "wwoods@redhat.com",
            "creator": "wwoods@redhat.com",
            "qa_contact": "extras-qa@fedoraproject.org",
            "target_milestone": "---",
            "keywords": ["FutureFeature"],
            "cc": ["crobinso@redhat.com"],
            "blocks": [],
            "depends_on": [],
            "url": "",
            "whiteboard": " bzcl34nup",
            "devel_whiteboard": "",
            "internal_whiteboard": "",
            "qa_whiteboard": "",
            "cf_fixed_in": "",
            "flags": [{"name": "needinfo", "status": "?", "setter": "crobinso@redhat.com"}],
            "creation_time": "2007-09-26 15:10:04",
            "last_change_time": "2010-02-09 20:31:19"
        }]})
    }

    /// `Bug.search` on bugzilla.redhat.com for bug 663674.
    pub fn redhat_663674() -> Value {
        json!({"bugs": [{
            "id": 663674,
            "summary": "test bug for whiteboard handling",
            "status": "NEW",
            "resolution": "",
            "product": "Fedora",
            "component": "python-bugzilla",
            "assigned_to": "crobinso@redhat.com",
            "creator": "crobinso@redhat.com",
            "target_milestone": "---",
            "whiteboard": "whiteboard test",
            "devel_whiteboard": "devel test",
            "internal_whiteboard": "",
            "qa_whiteboard": "",
            "flags": []
        }]})
    }

    /// `Bug.search` on bugzilla.redhat.com replaying a saved python-bugzilla
    /// search.
    pub fn redhat_saved_search() -> Value {
        json!({"bugs": [
            {"id": 553878, "summary": "python-bugzilla: query fails on RHEL5",
             "status": "CLOSED", "assigned_to": "wwoods@redhat.com",
             "component": "python-bugzilla", "target_milestone": "---", "flags": []},
            {"id": 557446, "summary": "bugzilla login should prompt for password",
             "status": "CLOSED", "assigned_to": "wwoods@redhat.com",
             "component": "python-bugzilla", "target_milestone": "---", "flags": []},
            {"id": 621030, "summary": "bugzilla modify --cc does not work",
             "status": "CLOSED", "assigned_to": "crobinso@redhat.com",
             "component": "python-bugzilla", "target_milestone": "---", "flags": []}
        ]})
    }

    /// `Product.get_accessible_products` reply.
    pub fn accessible_products(ids: &[i64]) -> Value {
        json!({"ids": ids})
    }

    /// Product listing on bugzilla.kernel.org (`Product.get_products`).
    pub fn kernel_products() -> Value {
        json!({"products": [
            {"id": 1, "name": "ACPI", "description": "ACPI subsystem"},
            {"id": 2, "name": "Drivers", "description": "Device drivers"},
            {"id": 3, "name": "Virtualization", "description": "KVM, lguest and Xen"}
        ]})
    }

    /// `Product.get` on bugzilla.redhat.com for the virt tools product.
    pub fn redhat_virt_tools() -> Value {
        json!({"products": [{
            "id": 185,
            "name": "Virtualization Tools",
            "components": [
                {"name": "virt-manager", "default_assigned_to": "crobinso@redhat.com"},
                {"name": "libvirt", "default_assigned_to": "Libvirt Maintainers"},
                {"name": "virtinst", "default_assigned_to": "crobinso@redhat.com"}
            ]
        }]})
    }

    /// `Product.get` on bugzilla.redhat.com for Fedora versions.
    pub fn redhat_fedora_versions() -> Value {
        json!({"products": [{
            "id": 49,
            "name": "Fedora",
            "versions": [
                {"name": "rawhide"}, {"name": "14"}, {"name": "13"}, {"name": "12"}
            ]
        }]})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replies_handed_out_in_order() {
        let transport = MockTransport::new()
            .respond("Bugzilla.version", json!({"version": "3.2"}))
            .respond("Bugzilla.version", json!({"version": "4.2"}));

        let first = transport.call("Bugzilla.version", json!({})).unwrap();
        let second = transport.call("Bugzilla.version", json!({})).unwrap();
        let third = transport.call("Bugzilla.version", json!({})).unwrap();

        assert_eq!(first["version"], json!("3.2"));
        assert_eq!(second["version"], json!("4.2"));
        assert_eq!(third["version"], json!("4.2"));
        assert_eq!(transport.calls().len(), 3);
    }

    #[test]
    fn test_unknown_method_faults() {
        let transport = MockTransport::new().fail("Bug.search", 51, "Invalid product");

        let err = transport.call("Bug.search", json!({})).unwrap_err();
        assert!(matches!(err, BugzillaError::Fault { code: 51, .. }));

        let err = transport.call("Bug.get", json!({})).unwrap_err();
        assert!(err.is_remote());
        assert_eq!(transport.methods(), vec!["Bug.search", "Bug.get"]);
    }
}
