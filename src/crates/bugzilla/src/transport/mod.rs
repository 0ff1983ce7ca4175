//! The RPC seam between adapters and the wire.
//!
//! Adapters only ever see [`Transport::call`]: a method name, one struct of
//! parameters, and a parsed response tree. Values travel as
//! [`serde_json::Value`] so struct member order survives the round trip.

pub mod http;
pub mod xmlrpc;

use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

pub use http::HttpTransport;

/// Something that can issue one XML-RPC call and return its parsed result.
pub trait Transport: Send + Sync {
    /// Call `method` with a single struct parameter (or none when `params`
    /// is null).
    fn call(&self, method: &str, params: Value) -> Result<Value>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        (**self).call(method, params)
    }
}
