//! Parameters from form fields and the query string.
//!
//! Form values are text: numbers, booleans and times are parsed from it, and lists are
//! the comma-separated parts of the first value. An empty value counts as absent.
use super::expect;
use super::{invalid, invalid_with_cause};
use crate::traits::{ParamInput, ParamSource};
use crate::types::RpcResult;
use crate::Timestamp;

/// Reads parameters from form fields (body first, then query string).
#[derive(Debug, Clone, Copy, Default)]
pub struct FromForm;

fn lookup<'a>(req: &'a dyn ParamInput, key: &str) -> Option<&'a str> {
    req.form_value(key).filter(|text| !text.is_empty())
}

impl ParamSource for FromForm {
    fn name(&self) -> &'static str {
        "form"
    }

    fn get_string(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<String>> {
        Ok(lookup(req, key).map(str::to_owned))
    }

    fn get_string_list(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Vec<String>>> {
        Ok(lookup(req, key).map(|text| text.split(',').map(str::to_owned).collect()))
    }

    fn get_int(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<i64>> {
        lookup(req, key)
            .map(|text| text.parse::<i64>().map_err(|err| invalid_with_cause(key, expect::INT, text, err)))
            .transpose()
    }

    fn get_float(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<f64>> {
        lookup(req, key)
            .map(|text| {
                text.parse::<f64>().map_err(|err| invalid_with_cause(key, expect::FLOAT, text, err))
            })
            .transpose()
    }

    fn get_bool(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<bool>> {
        let Some(text) = lookup(req, key) else {
            return Ok(None);
        };
        if text.eq_ignore_ascii_case("true") {
            Ok(Some(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(Some(false))
        } else {
            Err(invalid(key, expect::BOOL, text))
        }
    }

    fn get_time(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Timestamp>> {
        lookup(req, key)
            .map(|text| {
                Timestamp::parse_from_rfc3339(text)
                    .map_err(|err| invalid_with_cause(key, expect::TIME, text, err))
            })
            .transpose()
    }
}
