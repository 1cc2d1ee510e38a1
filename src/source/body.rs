//! Parameters from the decoded JSON body.
//!
//! Coercion rules:
//! - `null` counts as absent, as does an empty string for string targets
//! - numeric targets accept any JSON number; ints truncate floats toward zero
//! - list targets need an array whose every element is a string
//! - bool targets need a JSON boolean; time targets need an RFC 3339 string
//! - object targets accept JSON objects and arrays
use serde_json::{Number, Value};

use super::expect;
use super::{invalid, invalid_with_cause};
use crate::traits::{ParamInput, ParamSource};
use crate::types::RpcResult;
use crate::Timestamp;

/// Reads parameters from the request's JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromBody;

fn lookup<'a>(req: &'a dyn ParamInput, key: &str) -> RpcResult<Option<&'a Value>> {
    Ok(req.body_map()?.get(key).filter(|value| !value.is_null()))
}

fn number_to_int(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| number.as_f64().map(|f| f as i64))
}

impl ParamSource for FromBody {
    fn name(&self) -> &'static str {
        "body"
    }

    fn get_string(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<String>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(Value::String(text)) if text.is_empty() => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => Err(invalid(key, expect::STRING, other)),
        }
    }

    fn get_string_list(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Vec<String>>> {
        let Some(value) = lookup(req, key)? else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(invalid(key, expect::STRING_LIST, value));
        };
        items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or_else(|| invalid(key, expect::STRING_LIST, value))
    }

    fn get_int(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<i64>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(Value::Number(number)) => number_to_int(number)
                .map(Some)
                .ok_or_else(|| invalid(key, expect::INT, number)),
            Some(other) => Err(invalid(key, expect::INT, other)),
        }
    }

    fn get_float(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<f64>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(Value::Number(number)) => {
                number.as_f64().map(Some).ok_or_else(|| invalid(key, expect::FLOAT, number))
            },
            Some(other) => Err(invalid(key, expect::FLOAT, other)),
        }
    }

    fn get_bool(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<bool>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(other) => Err(invalid(key, expect::BOOL, other)),
        }
    }

    fn get_time(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Timestamp>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(Value::String(text)) => Timestamp::parse_from_rfc3339(text)
                .map(Some)
                .map_err(|err| invalid_with_cause(key, expect::TIME, text, err)),
            Some(other) => Err(invalid(key, expect::TIME, other)),
        }
    }

    fn get_object(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Value>> {
        match lookup(req, key)? {
            None => Ok(None),
            Some(value @ (Value::Object(_) | Value::Array(_))) => Ok(Some(value.clone())),
            Some(other) => Err(invalid(key, expect::OBJECT, other)),
        }
    }
}
