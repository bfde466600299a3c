//! Dynamically typed page metadata decoded from frontmatter.
//!
//! Accessors never fail: a missing key and a value of the wrong type both
//! produce the accessor's zero value.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Time layouts tried, in order, after RFC 3339 when a timestamp is stored as
/// a string. Date-only and zone-less layouts are interpreted as UTC.
pub const DEFAULT_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d"];

/// A single frontmatter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Time(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(Metadata),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Time(t)
    }
}

/// Mapping from case-sensitive keys to frontmatter values
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String value for `key`, or "" if absent or not a string.
    pub fn get_string(&self, key: &str) -> &str {
        match self.get(key) {
            Some(Value::String(s)) => s,
            _ => "",
        }
    }

    /// Boolean value for `key`. String values are parsed leniently; anything
    /// else is false.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => parse_bool(s).unwrap_or(false),
            _ => false,
        }
    }

    /// Integer value for `key`, or `None` if absent or not an integer.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(Value::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Timestamp for `key` using [`DEFAULT_TIME_FORMATS`].
    pub fn get_time(&self, key: &str) -> Option<DateTime<FixedOffset>> {
        self.get_time_in(key, DEFAULT_TIME_FORMATS)
    }

    /// Timestamp for `key`, parsing string values with `formats`.
    pub fn get_time_in<S: AsRef<str>>(
        &self,
        key: &str,
        formats: &[S],
    ) -> Option<DateTime<FixedOffset>> {
        match self.get(key) {
            Some(Value::Time(t)) => Some(*t),
            Some(Value::String(s)) => parse_time(s, formats),
            _ => None,
        }
    }

    /// Convert to a TOML table for re-encoding.
    pub fn to_toml(&self) -> toml::Table {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), value_to_toml(v)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<toml::Table> for Metadata {
    fn from(table: toml::Table) -> Self {
        table
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => {
                let raw = dt.to_string();
                match parse_time(&raw, DEFAULT_TIME_FORMATS) {
                    Some(t) => Value::Time(t),
                    // Local times without a date cannot become a timestamp.
                    None => Value::String(raw),
                }
            }
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(t) => Value::Map(Metadata::from(t)),
        }
    }
}

impl Metadata {
    /// Build metadata from a decoded YAML mapping. Null values and non-string
    /// keys are dropped.
    pub fn from_yaml(mapping: serde_yaml::Mapping) -> Self {
        mapping
            .into_iter()
            .filter_map(|(k, v)| {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    _ => return None,
                };
                Some((key, yaml_to_value(v)?))
            })
            .collect()
    }
}

fn yaml_to_value(value: serde_yaml::Value) -> Option<Value> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::Bool(b) => Some(Value::Bool(b)),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Int(i)),
            None => n.as_f64().map(Value::Float),
        },
        serde_yaml::Value::String(s) => Some(Value::String(s)),
        serde_yaml::Value::Sequence(items) => Some(Value::List(
            items.into_iter().filter_map(yaml_to_value).collect(),
        )),
        serde_yaml::Value::Mapping(m) => Some(Value::Map(Metadata::from_yaml(m))),
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

fn value_to_toml(value: &Value) -> toml::Value {
    match value {
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::Time(t) => match t.to_rfc3339().parse::<toml::value::Datetime>() {
            Ok(dt) => toml::Value::Datetime(dt),
            Err(_) => toml::Value::String(t.to_rfc3339()),
        },
        Value::List(items) => toml::Value::Array(items.iter().map(value_to_toml).collect()),
        Value::Map(m) => toml::Value::Table(m.to_toml()),
    }
}

/// Parse a timestamp as RFC 3339, then with each of `formats` in turn.
pub fn parse_time<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t);
    }

    let utc = FixedOffset::east_opt(0)?;
    for format in formats {
        let format = format.as_ref();
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().with_timezone(&utc));
        }
    }
    None
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
