//! Source that always yields the zero value of the requested type.
use serde_json::Value;

use crate::traits::{ParamInput, ParamSource};
use crate::types::RpcResult;
use crate::Timestamp;

/// Yields `""`, `[]`, `0`, `0.0`, `false`, the Unix epoch, or `null`, whatever the key.
///
/// Put it last in a source list to make a parameter optional.
///
/// ```
/// use rpc_rail::source::FromEmpty;
/// use rpc_rail::Request;
///
/// let req = Request::builder().build().unwrap();
/// let page = req.get_int("page", &[&FromEmpty]).unwrap();
/// assert_eq!(page, 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FromEmpty;

impl ParamSource for FromEmpty {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn get_string(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<String>> {
        Ok(Some(String::new()))
    }

    fn get_string_list(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Vec<String>>> {
        Ok(Some(Vec::new()))
    }

    fn get_int(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<i64>> {
        Ok(Some(0))
    }

    fn get_float(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<f64>> {
        Ok(Some(0.0))
    }

    fn get_bool(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<bool>> {
        Ok(Some(false))
    }

    fn get_time(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Timestamp>> {
        Ok(Some(Timestamp::default()))
    }

    fn get_object(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Value>> {
        Ok(Some(Value::Null))
    }
}
