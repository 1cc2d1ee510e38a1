//! Parameters from request-scoped context storage.
//!
//! Context values are already typed, so coercion is a kind check. The few conversions:
//! byte strings read as (lossy UTF-8) strings, ints and floats convert into each other,
//! and strings parse as RFC 3339 for time targets. Objects are never served from here.
use serde_json::Value;

use super::expect;
use super::{invalid, invalid_with_cause};
use crate::request::ContextValue;
use crate::traits::{ParamInput, ParamSource};
use crate::types::RpcResult;
use crate::Timestamp;

/// Reads parameters from the request's [`RequestContext`](crate::RequestContext).
#[derive(Debug, Clone, Copy, Default)]
pub struct FromContext;

impl ParamSource for FromContext {
    fn name(&self) -> &'static str {
        "context"
    }

    fn get_string(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<String>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::String(text)) if text.is_empty() => Ok(None),
            Some(ContextValue::String(text)) => Ok(Some(text.clone())),
            Some(ContextValue::Bytes(raw)) if raw.is_empty() => Ok(None),
            Some(ContextValue::Bytes(raw)) => Ok(Some(String::from_utf8_lossy(raw).into_owned())),
            Some(other) => Err(invalid(key, expect::STRING, other)),
        }
    }

    fn get_string_list(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Vec<String>>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::StringList(items)) => Ok(Some(items.clone())),
            Some(other) => Err(invalid(key, expect::STRING_LIST, other)),
        }
    }

    fn get_int(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<i64>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::Int(n)) => Ok(Some(*n)),
            Some(ContextValue::Float(f)) => Ok(Some(*f as i64)),
            Some(other) => Err(invalid(key, expect::INT, other)),
        }
    }

    fn get_float(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<f64>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::Float(f)) => Ok(Some(*f)),
            Some(ContextValue::Int(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(invalid(key, expect::FLOAT, other)),
        }
    }

    fn get_bool(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<bool>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::Bool(flag)) => Ok(Some(*flag)),
            Some(other) => Err(invalid(key, expect::BOOL, other)),
        }
    }

    fn get_time(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Timestamp>> {
        match req.context_value(key) {
            None => Ok(None),
            Some(ContextValue::Time(at)) => Ok(Some(*at)),
            Some(ContextValue::String(text)) => Timestamp::parse_from_rfc3339(text)
                .map(Some)
                .map_err(|err| invalid_with_cause(key, expect::TIME, text, err)),
            Some(other) => Err(invalid(key, expect::TIME, other)),
        }
    }

    fn get_object(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Value>> {
        Ok(None)
    }
}
