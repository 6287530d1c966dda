//! API models for the REG.RU API2
//!
//! Responses are kept as raw JSON objects: the executor hands them back
//! unmodified and callers pick out the parts they render.

use crate::error::{RegruError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of the `result` field on a successful call.
pub const RESULT_SUCCESS: &str = "success";

/// Error code used when an error response carries none.
pub const DEFAULT_ERROR_CODE: &str = "API_ERROR";

/// Error text used when an error response carries none.
pub const DEFAULT_ERROR_TEXT: &str = "REG.RU API returned an error.";

/// Method kinds accepted by `zone add`, mapped to `zone/add_<kind>`.
pub const ZONE_RECORD_KINDS: [&str; 9] = [
    "alias", "aaaa", "cname", "txt", "mx", "ns", "srv", "caa", "https",
];

/// Strip leading slashes and surrounding whitespace from a method name.
pub fn normalize_method(method: &str) -> String {
    method.trim_start_matches('/').trim().to_string()
}

/// Refuse any method that touches the reseller namespace.
pub fn ensure_non_reseller(method: &str) -> Result<()> {
    if normalize_method(method).to_lowercase().contains("reseller") {
        return Err(RegruError::Policy(
            "Reseller methods are intentionally not supported by regru-cli.".to_string(),
        ));
    }
    Ok(())
}

/// Decoded JSON body returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    pub fn new(body: Map<String, Value>) -> Self {
        Self(body)
    }

    /// Value of the `result` discriminant, if it is a string.
    pub fn result(&self) -> Option<&str> {
        self.0.get("result").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.result() == Some(RESULT_SUCCESS)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.0.get("error_code").and_then(Value::as_str)
    }

    pub fn error_text(&self) -> Option<&str> {
        self.0.get("error_text").and_then(Value::as_str)
    }

    /// The `answer` object of a successful response.
    pub fn answer(&self) -> Option<&Map<String, Value>> {
        self.0.get("answer").and_then(Value::as_object)
    }

    /// Fail with an [`RegruError::Api`] unless `result` is `success`.
    ///
    /// The whole body travels with the error so JSON-mode rendering can
    /// show it.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let code = self.error_code().unwrap_or(DEFAULT_ERROR_CODE).to_string();
        let text = self.error_text().unwrap_or(DEFAULT_ERROR_TEXT).to_string();
        Err(RegruError::Api {
            code,
            text,
            body: Value::Object(self.0),
        })
    }

    /// Service entries from `answer.services`.
    ///
    /// Entries that are not objects or lack a `service_id` are skipped.
    pub fn services(&self) -> Vec<ServiceItem> {
        self.answer_array("services")
            .iter()
            .filter(|item| item.get("service_id").is_some())
            .filter_map(|item| ServiceItem::deserialize(item).ok())
            .collect()
    }

    /// Service entries of type `domain`, with or without a `service_id`.
    pub fn domains(&self) -> Vec<ServiceItem> {
        self.answer_array("services")
            .iter()
            .filter(|item| item.get("servtype").and_then(Value::as_str) == Some("domain"))
            .filter_map(|item| ServiceItem::deserialize(item).ok())
            .collect()
    }

    /// Resource records from `answer.rrs`.
    pub fn resource_records(&self) -> &[Value] {
        self.answer_array("rrs")
    }

    fn answer_array(&self, key: &str) -> &[Value] {
        self.answer()
            .and_then(|answer| answer.get(key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ApiResponse {
    fn from(body: Map<String, Value>) -> Self {
        Self(body)
    }
}

/// One entry of a `service/get_list` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    #[serde(default)]
    pub service_id: Value,
    #[serde(default)]
    pub dname: String,
    #[serde(default)]
    pub servtype: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub expiration_date: String,
}

impl ServiceItem {
    /// Service id rendered without JSON string quotes; empty when absent.
    pub fn id(&self) -> String {
        match &self.service_id {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
