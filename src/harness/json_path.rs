//! Dot-separated field paths over JSON response bodies.
//!
//! A name segment applied to an array projects over every element, so `name`
//! against a list of branches yields the list of branch names.
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Parsed field path. The empty path addresses the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let segments = raw
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                Err(_) => Segment::Key(segment.to_string()),
            })
            .collect();
        FieldPath {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn root() -> Self {
        FieldPath::parse("")
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        if self.raw.is_empty() {
            "$"
        } else {
            &self.raw
        }
    }

    /// Resolve the path; `None` means the path is structurally absent.
    pub fn lookup(&self, root: &Value) -> Option<Value> {
        let mut current = root.clone();
        for segment in &self.segments {
            current = step(current, segment)?;
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        FieldPath::parse(raw)
    }
}

fn step(value: Value, segment: &Segment) -> Option<Value> {
    match (value, segment) {
        (Value::Array(mut items), Segment::Index(index)) => {
            if *index < items.len() {
                Some(items.swap_remove(*index))
            } else {
                None
            }
        }
        (Value::Array(items), Segment::Key(key)) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
                    _ => Value::Null,
                })
                .collect(),
        )),
        (Value::Object(mut map), Segment::Key(key)) => map.remove(key),
        (Value::Object(mut map), Segment::Index(index)) => map.remove(&index.to_string()),
        _ => None,
    }
}
