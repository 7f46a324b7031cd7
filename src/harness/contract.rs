//! Response contracts and the validator that checks them.
//!
//! Status is checked first; field assertions run in declaration order and the
//! first failure is the only one reported.
use super::error::HarnessError;
use super::json_path::FieldPath;
use super::transport::ResponseOutcome;
use crate::util::truncate_string;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Terminal outcome of one scenario attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail(String),
    Skipped(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(reason) | Verdict::Skipped(reason) => Some(reason),
        }
    }
}

impl From<Result<(), HarnessError>> for Verdict {
    fn from(result: Result<(), HarnessError>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(HarnessError::PrerequisiteUnmet(reason)) => Verdict::Skipped(reason),
            Err(err) => Verdict::Fail(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldAssertion {
    Equals(FieldPath, Value),
    NotNull(FieldPath),
    AnyOf(FieldPath, Vec<Value>),
    MemberPresent(FieldPath),
}

impl FieldAssertion {
    pub fn path(&self) -> &FieldPath {
        match self {
            FieldAssertion::Equals(path, _)
            | FieldAssertion::NotNull(path)
            | FieldAssertion::AnyOf(path, _)
            | FieldAssertion::MemberPresent(path) => path,
        }
    }

    fn evaluate(&self, body: &Value) -> Result<(), FieldFailure> {
        let path = self.path();
        let Some(observed) = path.lookup(body) else {
            return Err(FieldFailure::Absent(path.clone()));
        };
        match self {
            FieldAssertion::Equals(_, expected) => {
                if json_eq(expected, &observed) {
                    Ok(())
                } else {
                    Err(FieldFailure::Mismatch {
                        path: path.clone(),
                        expected: expected.to_string(),
                        observed,
                    })
                }
            }
            FieldAssertion::NotNull(_) => {
                if observed.is_null() {
                    Err(FieldFailure::Null(path.clone()))
                } else {
                    Ok(())
                }
            }
            FieldAssertion::AnyOf(_, allowed) => {
                if allowed.iter().any(|candidate| json_eq(candidate, &observed)) {
                    Ok(())
                } else {
                    Err(FieldFailure::Mismatch {
                        path: path.clone(),
                        expected: format!("one of {}", Value::Array(allowed.clone())),
                        observed,
                    })
                }
            }
            FieldAssertion::MemberPresent(_) => Ok(()),
        }
    }
}

const MAX_OBSERVED_BYTES: usize = 256;

#[derive(Debug)]
enum FieldFailure {
    Absent(FieldPath),
    Null(FieldPath),
    Mismatch {
        path: FieldPath,
        expected: String,
        observed: Value,
    },
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFailure::Absent(path) => write!(f, "field `{path}` is absent from the response"),
            FieldFailure::Null(path) => write!(f, "field `{path}` is present but null"),
            FieldFailure::Mismatch {
                path,
                expected,
                observed,
            } => write!(
                f,
                "field `{path}` has wrong value: expected {expected}, observed {}",
                truncate_string(&observed.to_string(), MAX_OBSERVED_BYTES)
            ),
        }
    }
}

/// Expected response shape: accepted statuses plus ordered field assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    accepted: BTreeSet<u16>,
    assertions: Vec<FieldAssertion>,
}

impl Contract {
    pub fn status(code: u16) -> Self {
        Contract::any_status([code])
    }

    pub fn any_status(codes: impl IntoIterator<Item = u16>) -> Self {
        Contract {
            accepted: codes.into_iter().collect(),
            assertions: Vec::new(),
        }
    }

    pub fn equals(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.assertions
            .push(FieldAssertion::Equals(FieldPath::parse(path), value.into()));
        self
    }

    pub fn not_null(mut self, path: &str) -> Self {
        self.assertions
            .push(FieldAssertion::NotNull(FieldPath::parse(path)));
        self
    }

    pub fn any_of<V: Into<Value>>(mut self, path: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.assertions.push(FieldAssertion::AnyOf(
            FieldPath::parse(path),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn member_present(mut self, path: &str) -> Self {
        self.assertions
            .push(FieldAssertion::MemberPresent(FieldPath::parse(path)));
        self
    }

    pub fn validate(&self, outcome: &ResponseOutcome) -> Verdict {
        Verdict::from(self.check(outcome))
    }

    pub fn check(&self, outcome: &ResponseOutcome) -> Result<(), HarnessError> {
        if !self.accepted.contains(&outcome.status) {
            return Err(HarnessError::contract(format!(
                "expected status {}, observed {}",
                self.describe_accepted(),
                outcome.status
            )));
        }
        if self.assertions.is_empty() {
            return Ok(());
        }
        let body = outcome.json_body().map_err(|err| {
            HarnessError::contract(format!("response body is not valid JSON: {err}"))
        })?;
        for assertion in &self.assertions {
            assertion
                .evaluate(body)
                .map_err(|failure| HarnessError::contract(failure.to_string()))?;
        }
        Ok(())
    }

    fn describe_accepted(&self) -> String {
        let codes: Vec<String> = self.accepted.iter().map(u16::to_string).collect();
        match codes.as_slice() {
            [single] => single.clone(),
            _ => format!("one of [{}]", codes.join(", ")),
        }
    }
}

/// Value equality with JSON numbers compared numerically.
fn json_eq(expected: &Value, observed: &Value) -> bool {
    match (expected, observed) {
        (Value::Number(left), Value::Number(right)) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => left == right,
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => left == right,
                _ => left == right,
            },
        },
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, l)| right.get(key).is_some_and(|r| json_eq(l, r)))
        }
        _ => expected == observed,
    }
}
