//! Request description and rate-limit keys
//!
//! An [`ApiRequest`] is the transport-independent form of one vendor call.
//! Two keys are derived from it:
//!
//! - the **endpoint key** `METHOD:url`, shared by every call to the same URL
//! - the **identical key** `METHOD:url:params:body`, where params are sorted
//!   by name and the JSON body is rendered with object keys sorted at every
//!   depth, so logically equal requests map to the same key

use reqwest::Method;
use serde_json::Value;

/// One vendor API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query parameters, in insertion order
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `METHOD:url`
    pub fn endpoint_key(&self) -> String {
        format!("{}:{}", self.method.as_str(), self.url)
    }

    /// `METHOD:url:canonical(params):canonical(body)`
    ///
    /// Headers are not part of the key.
    pub fn identical_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.endpoint_key(),
            self.canonical_params(),
            self.canonical_body()
        )
    }

    fn canonical_params(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let mut sorted: Vec<&(String, String)> = self.params.iter().collect();
        sorted.sort();
        serde_json::to_string(&sorted).unwrap_or_default()
    }

    fn canonical_body(&self) -> String {
        match &self.body {
            None | Some(Value::Null) => String::new(),
            Some(Value::Object(map)) if map.is_empty() => String::new(),
            Some(value) => canonical_json(value),
        }
    }
}

/// Renders `value` as compact JSON with object keys sorted recursively.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
