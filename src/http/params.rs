//! Query parameter parsing for the scenario handlers.

use serde::Deserialize;

use crate::http::error::HandlerError;

/// Raw `len` / `num` query parameters.
///
/// Kept as strings so a malformed value produces our own error message
/// rather than a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ScenarioQuery {
    pub len: Option<String>,
    pub num: Option<String>,
}

impl ScenarioQuery {
    /// Requested payload length.
    pub fn len(&self) -> Result<usize, HandlerError> {
        parse_param("len", self.len.as_deref())
    }

    /// Requested repetition count.
    pub fn num(&self) -> Result<usize, HandlerError> {
        parse_param("num", self.num.as_deref())
    }
}

/// Parse a required non-negative integer parameter.
pub fn parse_param(name: &'static str, raw: Option<&str>) -> Result<usize, HandlerError> {
    let raw = raw.ok_or(HandlerError::MissingParameter(name))?;
    raw.trim()
        .parse::<usize>()
        .map_err(|_| HandlerError::InvalidParameter {
            name,
            value: raw.to_string(),
        })
}
