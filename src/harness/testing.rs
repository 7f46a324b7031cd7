//! Scripted transport shared by unit tests.
use super::error::{TransportError, TransportErrorKind};
use super::request::RequestSpec;
use super::transport::{ResponseOutcome, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays queued responses in order and records every request sent.
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Result<ResponseOutcome, TransportError>>>,
    sent: RefCell<Vec<RequestSpec>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<ResponseOutcome, TransportError>>) -> Self {
        ScriptedTransport {
            script: RefCell::new(script.into()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<RequestSpec> {
        self.sent.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &RequestSpec) -> Result<ResponseOutcome, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        self.script.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(TransportError::new(
                TransportErrorKind::Protocol,
                format!("no scripted response for {}", request.target()),
            ))
        })
    }
}

pub fn connection_reset() -> Result<ResponseOutcome, TransportError> {
    Err(TransportError::new(
        TransportErrorKind::Connect,
        "connection reset by peer",
    ))
}
