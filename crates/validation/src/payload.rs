use serde::Serialize;
use serde_json::{Map, Value};

/// Where a validated field comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
    Query,
}

/// Everything a rule set can look at for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub body: Value,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
}

impl Payload {
    pub fn from_body(body: Value) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.query.insert(k.into(), Value::String(v.into()));
        }
        self
    }

    pub fn get(&self, location: Location, field: &str) -> Option<&Value> {
        match location {
            Location::Body => self.body.as_object().and_then(|o| o.get(field)),
            Location::Params => self.params.get(field),
            Location::Query => self.query.get(field),
        }
    }
}
