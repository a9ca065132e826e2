use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Stable identifier of a posting. The backend may send numbers or strings;
/// `5` and `"5"` are distinct ids. Numbers keep their JSON form, so unsigned
/// ids past `i64::MAX` and fractional ids round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(Number),
    Text(String),
}

impl JobId {
    /// Parses user input, preferring the numeric form.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let number = raw
            .parse::<i64>()
            .map(Number::from)
            .ok()
            .or_else(|| raw.parse::<u64>().ok().map(Number::from))
            .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64));
        Some(match number {
            Some(number) => JobId::Number(number),
            None => JobId::Text(raw.to_owned()),
        })
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(number) => f.pad(&number.to_string()),
            JobId::Text(text) => f.pad(text),
        }
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        JobId::Number(value.into())
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId::Text(value.to_owned())
    }
}

/// A fetched job posting. Only `id` is interpreted; every other field is
/// carried through untouched for display and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JobPosting {
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.text_field("title")
    }

    pub fn company(&self) -> Option<&str> {
        self.text_field("company")
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}
