//! Transport seam and the blocking `ureq` implementation.
use super::error::{TransportError, TransportErrorKind};
use super::request::{Method, RequestSpec};
use serde_json::Value;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Received response. The JSON view is parsed on first use and cached.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    parsed: OnceCell<Result<Value, String>>,
}

impl ResponseOutcome {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: impl Into<String>) -> Self {
        ResponseOutcome {
            status,
            headers,
            body: body.into(),
            parsed: OnceCell::new(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        ResponseOutcome::new(status, headers, body.to_string())
    }

    /// Structured view of the body, or the parse error text.
    pub fn json_body(&self) -> Result<&Value, &str> {
        self.parsed
            .get_or_init(|| serde_json::from_str(&self.body).map_err(|err| err.to_string()))
            .as_ref()
            .map_err(String::as_str)
    }
}

/// Sends one request and returns the complete response or a classified error.
pub trait Transport {
    fn send(&self, request: &RequestSpec) -> Result<ResponseOutcome, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &RequestSpec) -> Result<ResponseOutcome, TransportError> {
        (**self).send(request)
    }
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        UreqTransport {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn dispatch(
        &self,
        request: &RequestSpec,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let url = request.url();
        let body = request.body_bytes();
        match request.method {
            Method::Get => decorate(self.agent.get(&url), request).call(),
            Method::Delete => {
                let builder = decorate(self.agent.delete(&url), request);
                match body {
                    Some(bytes) => builder.force_send_body().send(bytes),
                    None => builder.call(),
                }
            }
            Method::Post => send_with_body(decorate(self.agent.post(&url), request), body),
            Method::Put => send_with_body(decorate(self.agent.put(&url), request), body),
            Method::Patch => send_with_body(decorate(self.agent.patch(&url), request), body),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &RequestSpec) -> Result<ResponseOutcome, TransportError> {
        let start = Instant::now();
        let mut response = self.dispatch(request).map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(classify)?;
        tracing::debug!(
            method = request.method.as_str(),
            target = %request.target(),
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_bytes = body.len(),
            "http exchange complete"
        );
        Ok(ResponseOutcome::new(status, headers, body))
    }
}

fn decorate<B>(mut builder: ureq::RequestBuilder<B>, request: &RequestSpec) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<Vec<u8>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

fn classify(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
            TransportErrorKind::Connect
        }
        _ => TransportErrorKind::Protocol,
    };
    TransportError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_is_parsed_once_and_cached() {
        let outcome = ResponseOutcome::json(200, &json!({"full_name": "o/r"}));
        let first = outcome.json_body().unwrap();
        let second = outcome.json_body().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(outcome.headers.get("content-type").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let outcome = ResponseOutcome::new(200, BTreeMap::new(), "<html>");
        assert!(outcome.json_body().is_err());
    }

    #[test]
    fn unreachable_host_is_classified_as_transport_error() {
        let transport = UreqTransport::new(Duration::from_secs(2));
        let request = crate::harness::request::RequestTemplate::new("http://127.0.0.1:9")
            .build(Method::Get, "/repos/o/r", &[])
            .unwrap();
        let err = transport.send(&request).unwrap_err();
        assert_ne!(err.kind, TransportErrorKind::Timeout);
        assert!(!err.message.is_empty());
    }
}
